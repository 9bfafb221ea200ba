//! Owner moderation panel.
//!
//! The pin is only stored after the API has accepted it with a real
//! `owner_list` call. Every mutation is followed by a reload so the table
//! always reflects the backend, and a reload refused as unauthorized drops
//! the session.

use serde::Serialize;
use stay_engine::{Booking, BookingStatus, PricingPolicy, PricingQuote, UnitId};
use tracing::{debug, warn};

use crate::api::{BookingApi, Decision};
use crate::error::{ClientError, Result};
use crate::message::{guest_message, whatsapp_url, StayNotes};
use crate::transport::Transport;

/// Where the owner pin survives between panel instances.
pub trait SessionStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, pin: &str);
    fn clear(&mut self);
}

/// Session store that lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    pin: Option<String>,
}

impl MemorySessionStore {
    pub fn with_pin(pin: impl Into<String>) -> Self {
        Self {
            pin: Some(pin.into()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<String> {
        self.pin.clone()
    }

    fn save(&mut self, pin: &str) {
        self.pin = Some(pin.to_string());
    }

    fn clear(&mut self) {
        self.pin = None;
    }
}

/// Table filters. `None` (or an all-whitespace term) matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerFilter {
    pub unit: Option<String>,
    pub status: Option<BookingStatus>,
    pub term: Option<String>,
}

impl OwnerFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(unit) = &self.unit {
            if booking.unit() != UnitId::normalize(unit) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if booking.estado != status {
                return false;
            }
        }
        match self.term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                search_text(booking).contains(&term.to_lowercase())
            }
            _ => true,
        }
    }
}

fn search_text(booking: &Booking) -> String {
    [
        booking.nombre.as_str(),
        booking.telefono.as_str(),
        booking.cabana.as_str(),
        booking.checkin.as_str(),
        booking.checkout.as_str(),
        booking.estado.as_str(),
        booking.created_at.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// One line of the moderation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRow {
    pub booking: Booking,
    /// Recomputed with the configured policy; `None` when the dates do not
    /// describe a stay.
    pub quote: Option<PricingQuote>,
    pub message: String,
    pub whatsapp_url: String,
}

pub struct OwnerPanel<T, S> {
    api: BookingApi<T>,
    store: S,
    policy: PricingPolicy,
    notes: StayNotes,
    pin: Option<String>,
    all: Vec<Booking>,
}

impl<T: Transport, S: SessionStore> OwnerPanel<T, S> {
    pub fn new(api: BookingApi<T>, store: S, policy: PricingPolicy, notes: StayNotes) -> Self {
        Self {
            api,
            store,
            policy,
            notes,
            pin: None,
            all: Vec::new(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.pin.is_some()
    }

    /// Every reservation as of the last successful load.
    pub fn bookings(&self) -> &[Booking] {
        &self.all
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check `pin` against the API and start a session with it.
    ///
    /// # Errors
    /// Any failure leaves the panel logged out with the stored pin cleared.
    pub async fn login(&mut self, pin: &str) -> Result<()> {
        let pin = pin.trim();
        if pin.is_empty() {
            return Err(ClientError::Validation("enter the owner pin".to_string()));
        }
        match self.api.owner_list(pin).await {
            Ok(list) => {
                debug!(reservations = list.len(), "owner logged in");
                self.store.save(pin);
                self.pin = Some(pin.to_string());
                self.all = list;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "owner login refused");
                self.clear_auth();
                Err(err)
            }
        }
    }

    /// Resume a stored session. Returns `Ok(false)` when nothing was stored.
    pub async fn restore(&mut self) -> Result<bool> {
        match self.store.load() {
            Some(pin) => self.login(&pin).await.map(|()| true),
            None => Ok(false),
        }
    }

    pub fn logout(&mut self) {
        self.clear_auth();
    }

    /// Refetch every reservation.
    ///
    /// # Errors
    /// `ClientError::Auth` ends the session; other failures keep it and the
    /// previous list.
    pub async fn reload(&mut self) -> Result<()> {
        let pin = self.require_pin()?;
        match self.api.owner_list(&pin).await {
            Ok(list) => {
                self.all = list;
                Ok(())
            }
            Err(err @ ClientError::Auth(_)) => {
                warn!(error = %err, "owner session rejected; logging out");
                self.clear_auth();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn decide(&mut self, id: &str, decision: Decision) -> Result<()> {
        let pin = self.require_pin()?;
        let outcome = self.api.owner_decide(&pin, id, decision).await;
        self.finish_mutation(outcome).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let pin = self.require_pin()?;
        let outcome = self.api.owner_delete(&pin, id).await;
        self.finish_mutation(outcome).await
    }

    /// Delete every reservation.
    pub async fn reset(&mut self) -> Result<()> {
        let pin = self.require_pin()?;
        let outcome = self.api.owner_reset(&pin).await;
        self.finish_mutation(outcome).await
    }

    /// Filtered table rows, in backend order.
    pub fn rows(&self, filter: &OwnerFilter) -> Vec<OwnerRow> {
        self.all
            .iter()
            .filter(|b| filter.matches(b))
            .map(|b| self.row(b))
            .collect()
    }

    pub fn status_line(&self, filter: &OwnerFilter) -> String {
        let shown = self.all.iter().filter(|b| filter.matches(b)).count();
        format!("showing {} of {} reservations", shown, self.all.len())
    }

    fn row(&self, booking: &Booking) -> OwnerRow {
        let quote = self
            .policy
            .quote(&booking.checkin, &booking.checkout)
            .ok()
            .flatten();
        let message = guest_message(
            booking,
            quote.as_ref(),
            &self.notes,
            self.policy.deposit_fraction,
        );
        OwnerRow {
            whatsapp_url: whatsapp_url(&booking.telefono, &message),
            booking: booking.clone(),
            quote,
            message,
        }
    }

    /// Reload after a mutation. The mutation's own error takes precedence.
    async fn finish_mutation(&mut self, outcome: Result<()>) -> Result<()> {
        if let Err(err) = &outcome {
            warn!(error = %err, "owner action failed");
        }
        let reloaded = self.reload().await;
        outcome.and(reloaded)
    }

    fn require_pin(&self) -> Result<String> {
        self.pin
            .clone()
            .ok_or_else(|| ClientError::Auth("not logged in".to_string()))
    }

    fn clear_auth(&mut self) {
        self.store.clear();
        self.pin = None;
        self.all.clear();
    }
}
