//! Date-picker rules for arrival and departure calendars.
//!
//! The picker widget asks, for every day cell it draws, whether the day may be
//! chosen. Arrivals may land on any free night from today on. Departures must
//! follow the chosen arrival by at least one night and must not jump over an
//! occupied night; the departure day itself is never checked, which lets a
//! guest leave on the morning another guest arrives.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::booking::DateRange;
use crate::date::nights;
use crate::error::{EngineError, Result};
use crate::occupancy::is_occupied;

/// Whether `day` may be picked as an arrival date.
pub fn can_select_arrival(day: NaiveDate, today: NaiveDate, ranges: &[DateRange]) -> bool {
    day >= today && !is_occupied(day, ranges)
}

/// Whether `day` may be picked as a departure date for the given arrival.
///
/// With no arrival chosen every departure is rejected, forcing the guest to
/// pick the arrival first.
pub fn can_select_departure(
    day: NaiveDate,
    today: NaiveDate,
    arrival: Option<NaiveDate>,
    ranges: &[DateRange],
) -> bool {
    if day < today {
        return false;
    }
    let Some(arrival) = arrival else {
        return false;
    };
    if day <= arrival {
        return false;
    }
    !crosses_occupied(arrival, day, ranges)
}

/// Whether any night of `[arrival, departure)` is occupied.
pub fn crosses_occupied(arrival: NaiveDate, departure: NaiveDate, ranges: &[DateRange]) -> bool {
    nights(arrival, departure).any(|night| is_occupied(night, ranges))
}

/// How a calendar cell is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Past,
    Booked,
    Free,
}

/// Paint state of a single day. Past days are never shown as booked.
pub fn day_status(day: NaiveDate, today: NaiveDate, ranges: &[DateRange]) -> DayStatus {
    if day < today {
        DayStatus::Past
    } else if is_occupied(day, ranges) {
        DayStatus::Booked
    } else {
        DayStatus::Free
    }
}

/// One cell of a month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// Every day of a month with its paint state.
///
/// # Errors
/// Returns `EngineError::InvalidDate` if `year`/`month` do not name a month.
pub fn month_days(
    year: i32,
    month: u32,
    today: NaiveDate,
    ranges: &[DateRange],
) -> Result<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::InvalidDate(format!("no such month: {}-{:02}", year, month)))?;

    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            status: day_status(date, today, ranges),
        })
        .collect())
}

/// The arrival/departure pair a guest is building in the two pickers.
///
/// Keeps the pickers coupled: changing the arrival drops a departure that is
/// no longer valid for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaySelection {
    arrival: Option<NaiveDate>,
    departure: Option<NaiveDate>,
}

impl StaySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrival(&self) -> Option<NaiveDate> {
        self.arrival
    }

    pub fn departure(&self) -> Option<NaiveDate> {
        self.departure
    }

    /// Earliest departure the picker should offer (one night after arrival).
    /// `None` when there is no arrival or no calendar day follows it.
    pub fn min_departure(&self) -> Option<NaiveDate> {
        self.arrival.and_then(|a| a.succ_opt())
    }

    /// Choose an arrival. Returns `false` and leaves the selection untouched
    /// when the day is not selectable.
    pub fn set_arrival(&mut self, day: NaiveDate, today: NaiveDate, ranges: &[DateRange]) -> bool {
        if !can_select_arrival(day, today, ranges) {
            return false;
        }
        self.arrival = Some(day);
        if let Some(out) = self.departure {
            if !can_select_departure(out, today, self.arrival, ranges) {
                self.departure = None;
            }
        }
        true
    }

    /// Choose a departure. Returns `false` and leaves the selection untouched
    /// when the day is not selectable for the current arrival.
    pub fn set_departure(
        &mut self,
        day: NaiveDate,
        today: NaiveDate,
        ranges: &[DateRange],
    ) -> bool {
        if !can_select_departure(day, today, self.arrival, ranges) {
            return false;
        }
        self.departure = Some(day);
        true
    }

    /// Re-check both ends against fresh ranges or a new day. An arrival that
    /// is no longer selectable drops the whole selection; a departure that no
    /// longer fits the arrival is dropped on its own.
    pub fn revalidate(&mut self, today: NaiveDate, ranges: &[DateRange]) {
        match self.arrival {
            Some(arrival) if !can_select_arrival(arrival, today, ranges) => self.clear(),
            _ => {
                if let Some(out) = self.departure {
                    if !can_select_departure(out, today, self.arrival, ranges) {
                        self.departure = None;
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.arrival = None;
        self.departure = None;
    }

    /// The selected stay, once both ends are chosen.
    pub fn range(&self) -> Option<DateRange> {
        match (self.arrival, self.departure) {
            (Some(a), Some(d)) => DateRange::new(a, d).ok(),
            _ => None,
        }
    }
}
