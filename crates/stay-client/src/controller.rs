//! Guest booking page controller.
//!
//! Holds the state every page handler reads (the confirmed feed, the selected
//! unit's occupancy, the picker selection) and exposes each handler as a
//! method. The feed is only ever replaced wholesale by [`BookingController::reload`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use chrono_tz::Tz;
use stay_engine::date::today_in;
use stay_engine::occupancy::ranges_for_unit;
use stay_engine::{
    bookings_for_unit, find_overlaps, month_days, Booking, CalendarDay, DayStatus, Occupancy,
    PricingPolicy, PricingQuote, StaySelection, UnitId,
};
use tracing::{debug, warn};

use crate::api::BookingApi;
use crate::error::{ClientError, Result};
use crate::reservation::{ReservationForm, ReservationRequest};
use crate::transport::Transport;

/// Everything the page shows, as of the last reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Confirmed bookings of every unit.
    pub all_confirmed: Vec<Booking>,
    /// Occupied ranges of the selected unit.
    pub occupancy: Occupancy,
    pub selection: StaySelection,
}

pub struct BookingController<T> {
    api: BookingApi<T>,
    policy: PricingPolicy,
    timezone: Tz,
    fixed_today: Option<NaiveDate>,
    state: Mutex<ViewState>,
    submitting: AtomicBool,
}

impl<T: Transport> BookingController<T> {
    pub fn new(api: BookingApi<T>, policy: PricingPolicy, timezone: Tz) -> Self {
        Self {
            api,
            policy,
            timezone,
            fixed_today: None,
            state: Mutex::new(ViewState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    /// Pin "today" instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| today_in(self.timezone))
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// A copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.state().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Fetch the confirmed feed and rebuild the view from it.
    ///
    /// On failure the previous view is kept. The selection is re-checked
    /// against the fresh ranges.
    pub async fn reload(&self) -> Result<()> {
        let bookings = self.api.availability().await?;
        let today = self.today();
        let mut state = self.state();

        let occupancy = match state.occupancy.unit.clone() {
            Some(unit) => build_occupancy(&bookings, unit)?,
            None => Occupancy::default(),
        };
        debug!(
            bookings = bookings.len(),
            unit_ranges = occupancy.ranges.len(),
            "availability reloaded"
        );

        let mut selection = state.selection;
        selection.revalidate(today, &occupancy.ranges);
        if selection != state.selection {
            debug!(?selection, "selection trimmed after reload");
        }

        *state = ViewState {
            all_confirmed: bookings,
            occupancy,
            selection,
        };
        Ok(())
    }

    /// Switch the calendar to another unit using the already loaded feed.
    /// Dates that do not fit the new unit are dropped from the selection.
    pub fn select_unit(&self, label: &str) -> Result<()> {
        let today = self.today();
        let mut state = self.state();
        let occupancy = build_occupancy(&state.all_confirmed, UnitId::normalize(label))?;
        state.selection.revalidate(today, &occupancy.ranges);
        state.occupancy = occupancy;
        Ok(())
    }

    /// Picker predicate for arrival cells.
    pub fn can_select_arrival(&self, day: NaiveDate) -> bool {
        self.state().occupancy.can_select_arrival(day, self.today())
    }

    /// Picker predicate for departure cells, relative to the chosen arrival.
    pub fn can_select_departure(&self, day: NaiveDate) -> bool {
        let state = self.state();
        state
            .occupancy
            .can_select_departure(day, self.today(), state.selection.arrival())
    }

    pub fn day_status(&self, day: NaiveDate) -> DayStatus {
        self.state().occupancy.day_status(day, self.today())
    }

    pub fn month(&self, year: i32, month: u32) -> Result<Vec<CalendarDay>> {
        let state = self.state();
        Ok(month_days(year, month, self.today(), &state.occupancy.ranges)?)
    }

    pub fn select_arrival(&self, day: NaiveDate) -> bool {
        let today = self.today();
        let mut state = self.state();
        let ViewState {
            occupancy,
            selection,
            ..
        } = &mut *state;
        selection.set_arrival(day, today, &occupancy.ranges)
    }

    pub fn select_departure(&self, day: NaiveDate) -> bool {
        let today = self.today();
        let mut state = self.state();
        let ViewState {
            occupancy,
            selection,
            ..
        } = &mut *state;
        selection.set_departure(day, today, &occupancy.ranges)
    }

    pub fn clear_selection(&self) {
        self.state().selection.clear();
    }

    /// Price of the current selection, once both dates are chosen.
    pub fn quote(&self) -> Option<PricingQuote> {
        let stay = self.state().selection.range()?;
        self.policy.quote_dates(stay.checkin, stay.checkout)
    }

    /// Confirmed stays of the selected unit, in check-in order.
    pub fn confirmed_list(&self) -> Vec<Booking> {
        let state = self.state();
        match &state.occupancy.unit {
            Some(unit) => bookings_for_unit(&state.all_confirmed, unit)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Validate and send a reservation request.
    ///
    /// While the request is in flight further submissions are refused. The
    /// feed is reloaded afterwards whether or not the request succeeded.
    pub async fn submit(&self, form: &ReservationForm) -> Result<ReservationRequest> {
        let request = {
            let state = self.state();
            let ranges = ranges_for_unit(&state.all_confirmed, &UnitId::normalize(&form.unit))?;
            form.validate(&ranges)?
        };

        let outcome = {
            let _guard = SubmitGuard::acquire(&self.submitting)?;
            self.api.create(&request).await
        };

        if outcome.is_ok() {
            self.clear_selection();
        }
        if let Err(err) = self.reload().await {
            warn!(error = %err, "reload after reservation submit failed");
        }

        outcome.map(|()| request)
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_occupancy(bookings: &[Booking], unit: UnitId) -> Result<Occupancy> {
    let occupancy = Occupancy::for_unit(bookings, unit)?;
    for overlap in find_overlaps(&occupancy.ranges) {
        warn!(
            unit = ?occupancy.unit,
            first = ?overlap.first,
            second = ?overlap.second,
            shared_nights = overlap.shared_nights,
            "confirmed bookings overlap"
        );
    }
    Ok(occupancy)
}

/// Advisory single-submission flag, released on drop.
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClientError::Validation(
                "submission already in progress".to_string(),
            ));
        }
        Ok(Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
