//! Typed actions of the reservation API.
//!
//! Every action is a single GET with an `action` parameter. Public actions
//! (`availability`, `create`) need nothing else; owner actions carry the shared
//! pin and a version tag that keeps intermediaries from serving a stale list.

use serde::Deserialize;
use serde_json::Value;
use stay_engine::Booking;
use tracing::warn;

use crate::error::{ClientError, Result};
use crate::reservation::ReservationRequest;
use crate::transport::Transport;

/// Owner verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Confirm => "confirm",
            Decision::Reject => "reject",
        }
    }
}

/// `{ ok, error? }` acknowledgement returned by mutating actions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Client for the reservation API over any [`Transport`].
#[derive(Debug, Clone)]
pub struct BookingApi<T> {
    transport: T,
    version: String,
}

impl<T: Transport> BookingApi<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the version tag sent with owner requests.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Confirmed bookings of every unit.
    ///
    /// A payload that is not a list is treated as "no bookings" so a broken
    /// deployment still renders an empty calendar.
    pub async fn availability(&self) -> Result<Vec<Booking>> {
        let value = self.transport.call(&[param("action", "availability")]).await?;
        match value {
            Value::Array(_) => Ok(serde_json::from_value(value)?),
            other => {
                warn!(payload = %other, "availability returned a non-list payload; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Submit a reservation request for owner review.
    pub async fn create(&self, request: &ReservationRequest) -> Result<()> {
        let mut params = vec![param("action", "create")];
        params.extend(request.params());
        let value = self.transport.call(&params).await?;
        ack(value)
    }

    /// Every reservation, any status. Doubles as the pin check.
    ///
    /// # Errors
    /// Returns `ClientError::Auth` when the payload is not a list, which is how
    /// the API reports a wrong or expired pin.
    pub async fn owner_list(&self, pin: &str) -> Result<Vec<Booking>> {
        let value = self.owner_call("owner_list", pin, Vec::new()).await?;
        match value {
            Value::Array(_) => Ok(serde_json::from_value(value)?),
            other => Err(ClientError::Auth(
                error_text(&other).unwrap_or_else(|| "invalid pin".to_string()),
            )),
        }
    }

    pub async fn owner_decide(&self, pin: &str, id: &str, decision: Decision) -> Result<()> {
        let extra = vec![param("id", id), param("decision", decision.as_str())];
        ack(self.owner_call("owner_decide", pin, extra).await?)
    }

    pub async fn owner_delete(&self, pin: &str, id: &str) -> Result<()> {
        ack(self.owner_call("owner_delete", pin, vec![param("id", id)]).await?)
    }

    /// Wipe every reservation.
    pub async fn owner_reset(&self, pin: &str) -> Result<()> {
        ack(self.owner_call("owner_reset", pin, Vec::new()).await?)
    }

    async fn owner_call(
        &self,
        action: &str,
        pin: &str,
        extra: Vec<(String, String)>,
    ) -> Result<Value> {
        let mut params = vec![param("action", action), param("pin", pin)];
        params.extend(extra);
        params.push(param("_v", &self.version));
        self.transport.call(&params).await
    }
}

pub(crate) fn param(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn ack(value: Value) -> Result<()> {
    if !value.is_object() {
        return Err(ClientError::Application("request failed".to_string()));
    }
    let ack: Ack = serde_json::from_value(value)?;
    if ack.ok {
        Ok(())
    } else {
        Err(ClientError::Application(
            ack.error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "request failed".to_string()),
        ))
    }
}

fn error_text(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
