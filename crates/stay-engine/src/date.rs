//! Calendar-day parsing and night arithmetic.
//!
//! All stays are counted in nights between two calendar days. Working on
//! [`NaiveDate`] keeps the arithmetic free of time-of-day and UTC offsets, so a
//! stay spanning a DST change still counts the right number of nights.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Parse a strict ISO calendar date (`YYYY-MM-DD`).
///
/// Surrounding whitespace is ignored (the spreadsheet backend is not careful
/// about it). Unpadded components, datetimes, and impossible days such as
/// `2025-02-30` are rejected.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    let bytes = trimmed.as_bytes();

    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_formed {
        return Err(EngineError::InvalidDate(format!(
            "'{}' is not a YYYY-MM-DD date",
            trimmed
        )));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDate(format!("'{}': {}", trimmed, e)))
}

/// Format a day the way the backend stores it.
pub fn to_iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Whole nights between two days, clamped at zero.
pub fn nights_between_dates(checkin: NaiveDate, checkout: NaiveDate) -> i64 {
    (checkout - checkin).num_days().max(0)
}

/// Whole nights between two ISO dates, clamped at zero.
///
/// # Errors
/// Returns `EngineError::InvalidDate` if either side does not parse.
pub fn nights_between(checkin: &str, checkout: &str) -> Result<i64> {
    let a = parse_iso_date(checkin)?;
    let b = parse_iso_date(checkout)?;
    Ok(nights_between_dates(a, b))
}

/// Every night of the half-open span `[checkin, checkout)`, in order.
pub fn nights(checkin: NaiveDate, checkout: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    checkin.iter_days().take_while(move |d| *d < checkout)
}

/// Resolve an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// The current calendar day in the given zone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
