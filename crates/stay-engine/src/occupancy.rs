//! Per-unit occupancy built from the confirmed booking feed.
//!
//! The availability feed lists confirmed stays for every unit at once. This
//! module narrows it to one unit and answers the basic question the calendar
//! asks for every day cell: is the night starting on this day taken?

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::{Booking, DateRange};
use crate::calendar::{self, DayStatus};
use crate::error::Result;
use crate::unit::UnitId;

/// Whether the night starting on `day` is occupied by any range.
///
/// The check is inclusive at check-in and exclusive at checkout, so a
/// departure day is free and can be the arrival day of the next guest.
pub fn is_occupied(day: NaiveDate, ranges: &[DateRange]) -> bool {
    ranges.iter().any(|r| r.contains(day))
}

/// The occupied ranges of one unit, sorted by check-in.
///
/// # Errors
/// Returns the first `EngineError` hit while parsing a booking of the unit.
/// Bookings of other units are not inspected.
pub fn ranges_for_unit(bookings: &[Booking], unit: &UnitId) -> Result<Vec<DateRange>> {
    let mut ranges = bookings
        .iter()
        .filter(|b| b.unit() == *unit)
        .map(DateRange::try_from)
        .collect::<Result<Vec<_>>>()?;
    ranges.sort();
    Ok(ranges)
}

/// The bookings of one unit in check-in order, for listing under the calendar.
pub fn bookings_for_unit<'a>(bookings: &'a [Booking], unit: &UnitId) -> Vec<&'a Booking> {
    let mut items: Vec<&Booking> = bookings.iter().filter(|b| b.unit() == *unit).collect();
    items.sort_by(|a, b| a.checkin.cmp(&b.checkin));
    items
}

/// The occupied ranges of the currently selected unit.
///
/// Rebuilt from scratch whenever the feed is reloaded or the unit changes;
/// never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Occupancy {
    pub unit: Option<UnitId>,
    pub ranges: Vec<DateRange>,
}

impl Occupancy {
    pub fn for_unit(bookings: &[Booking], unit: UnitId) -> Result<Self> {
        let ranges = ranges_for_unit(bookings, &unit)?;
        Ok(Self {
            unit: Some(unit),
            ranges,
        })
    }

    pub fn is_occupied(&self, day: NaiveDate) -> bool {
        is_occupied(day, &self.ranges)
    }

    pub fn can_select_arrival(&self, day: NaiveDate, today: NaiveDate) -> bool {
        calendar::can_select_arrival(day, today, &self.ranges)
    }

    pub fn can_select_departure(
        &self,
        day: NaiveDate,
        today: NaiveDate,
        arrival: Option<NaiveDate>,
    ) -> bool {
        calendar::can_select_departure(day, today, arrival, &self.ranges)
    }

    pub fn day_status(&self, day: NaiveDate, today: NaiveDate) -> DayStatus {
        calendar::day_status(day, today, &self.ranges)
    }
}
