//! Booking records and the half-open night ranges they occupy.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date::{nights_between_dates, parse_iso_date};
use crate::error::{EngineError, Result};
use crate::unit::UnitId;

/// A reservation row as the booking sheet returns it.
///
/// Dates stay as the raw strings the backend sent; they are only trusted once
/// converted into a [`DateRange`]. The owner-only fields are empty in the
/// public availability feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Unit label exactly as entered (e.g. "Cabaña 2").
    #[serde(default, deserialize_with = "string_or_number")]
    pub cabana: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub checkin: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub checkout: String,
    /// Guest count. Display only.
    #[serde(default, deserialize_with = "string_or_number")]
    pub personas: String,
    #[serde(default)]
    pub estado: BookingStatus,
    #[serde(default, deserialize_with = "string_or_number")]
    pub nombre: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub telefono: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub created_at: String,
}

impl Booking {
    /// The normalized unit this booking belongs to.
    pub fn unit(&self) -> UnitId {
        UnitId::normalize(&self.cabana)
    }

    /// The nights this booking occupies.
    pub fn range(&self) -> Result<DateRange> {
        DateRange::try_from(self)
    }
}

/// Lifecycle state of a reservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum BookingStatus {
    /// Awaiting an owner decision. Also used for blank or unknown values.
    #[default]
    Pendiente,
    Confirmada,
    Rechazada,
    Cancelada,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pendiente => "PENDIENTE",
            BookingStatus::Confirmada => "CONFIRMADA",
            BookingStatus::Rechazada => "RECHAZADA",
            BookingStatus::Cancelada => "CANCELADA",
        }
    }

    /// Lenient parse: anything unrecognized is pending.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl FromStr for BookingStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDIENTE" => Ok(BookingStatus::Pendiente),
            "CONFIRMADA" => Ok(BookingStatus::Confirmada),
            "RECHAZADA" => Ok(BookingStatus::Rechazada),
            "CANCELADA" => Ok(BookingStatus::Cancelada),
            other => Err(EngineError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = string_or_number(deserializer)?;
        Ok(BookingStatus::from_label(&raw))
    }
}

/// Half-open span of occupied nights: `checkin` is occupied, `checkout` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateRange {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

impl DateRange {
    /// Build a range of at least one night.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRange` when `checkout <= checkin`.
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> Result<Self> {
        if checkout <= checkin {
            return Err(EngineError::InvalidRange { checkin, checkout });
        }
        Ok(Self { checkin, checkout })
    }

    /// Build a range from two ISO date strings.
    pub fn parse(checkin: &str, checkout: &str) -> Result<Self> {
        Self::new(parse_iso_date(checkin)?, parse_iso_date(checkout)?)
    }

    /// Whether the night starting on `day` falls inside this range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.checkin <= day && day < self.checkout
    }

    pub fn nights(&self) -> i64 {
        nights_between_dates(self.checkin, self.checkout)
    }

    /// Whether two ranges share at least one night. Touching ranges do not.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.checkin < other.checkout && other.checkin < self.checkout
    }
}

impl TryFrom<&Booking> for DateRange {
    type Error = EngineError;

    fn try_from(booking: &Booking) -> Result<Self> {
        DateRange::parse(&booking.checkin, &booking.checkout)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Null,
}

/// Accept a string, number, bool or null and render it as a trimmed string.
///
/// Spreadsheet cells come back typed by whatever the sheet guessed: a phone
/// number or unit label may arrive as a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Loose::deserialize(deserializer)? {
        Loose::Text(s) => s.trim().to_string(),
        Loose::Number(n) => n.to_string(),
        Loose::Flag(b) => b.to_string(),
        Loose::Null => String::new(),
    };
    Ok(value)
}
