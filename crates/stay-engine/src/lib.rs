//! # stay-engine
//!
//! Night-based availability, calendar rules and pricing for small cabin rentals.
//!
//! A booking occupies the half-open span `[checkin, checkout)`: the guest
//! sleeps every night from check-in up to, but not including, the checkout
//! day. Everything here follows from that rule: which days a date picker may
//! offer, whether a proposed stay jumps over someone else's nights, and how
//! many nights to charge for.
//!
//! ## Modules
//!
//! - [`date`]: Strict ISO date parsing and night arithmetic
//! - [`unit`]: Normalized unit identifiers ("Cabaña 2" == 2)
//! - [`booking`]: Booking records, status, half-open night ranges
//! - [`occupancy`]: Per-unit occupied ranges and the occupancy predicate
//! - [`calendar`]: Arrival/departure picker rules, day painting, month grid
//! - [`overlap`]: Detect stays that share nights
//! - [`pricing`]: Configurable nightly rates, totals and deposits
//! - [`error`]: Error types

pub mod booking;
pub mod calendar;
pub mod date;
pub mod error;
pub mod occupancy;
pub mod overlap;
pub mod pricing;
pub mod unit;

pub use booking::{Booking, BookingStatus, DateRange};
pub use calendar::{
    can_select_arrival, can_select_departure, crosses_occupied, day_status, month_days,
    CalendarDay, DayStatus, StaySelection,
};
pub use date::{nights_between, nights_between_dates, parse_iso_date};
pub use error::EngineError;
pub use occupancy::{bookings_for_unit, is_occupied, ranges_for_unit, Occupancy};
pub use overlap::{find_overlaps, stay_conflicts, Overlap};
pub use pricing::{quote, rate_for_nights, PricingPolicy, PricingQuote};
pub use unit::UnitId;
