//! Guest reservation form validation.

use stay_engine::calendar::crosses_occupied;
use stay_engine::date::to_iso;
use stay_engine::{parse_iso_date, DateRange};

use crate::api::param;
use crate::error::{ClientError, Result};

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

/// Raw values as typed into the reservation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationForm {
    pub unit: String,
    pub guests: String,
    pub name: String,
    pub phone: String,
    pub checkin: String,
    pub checkout: String,
}

/// A form that passed validation and can be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub unit: String,
    pub guests: String,
    pub name: String,
    /// Digits only.
    pub phone: String,
    pub stay: DateRange,
}

impl ReservationRequest {
    pub fn nights(&self) -> i64 {
        self.stay.nights()
    }

    /// Query parameters for the `create` action.
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            param("cabana", &self.unit),
            param("personas", &self.guests),
            param("nombre", &self.name),
            param("telefono", &self.phone),
            param("checkin", &to_iso(self.stay.checkin)),
            param("checkout", &to_iso(self.stay.checkout)),
        ]
    }
}

impl ReservationForm {
    /// Validate the form against the occupied ranges of its unit.
    ///
    /// Checks run in order and the first failure is returned: both dates
    /// present, a name, a 10-15 digit phone, at least one night, and no
    /// occupied night inside the stay.
    pub fn validate(&self, ranges: &[DateRange]) -> Result<ReservationRequest> {
        if self.checkin.trim().is_empty() || self.checkout.trim().is_empty() {
            return Err(ClientError::Validation(
                "select check-in and check-out dates".to_string(),
            ));
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("enter your name".to_string()));
        }

        let phone = digits(&self.phone);
        if !is_valid_phone(&phone) {
            return Err(ClientError::Validation(format!(
                "invalid phone: use {} to {} digits, e.g. 3515555555",
                PHONE_MIN_DIGITS, PHONE_MAX_DIGITS
            )));
        }

        let checkin = parse_iso_date(&self.checkin)?;
        let checkout = parse_iso_date(&self.checkout)?;
        if checkout <= checkin {
            return Err(ClientError::Validation(
                "a reservation must be at least one night".to_string(),
            ));
        }

        if crosses_occupied(checkin, checkout, ranges) {
            return Err(ClientError::Validation(
                "the selected dates include a night that is already booked".to_string(),
            ));
        }

        Ok(ReservationRequest {
            unit: self.unit.trim().to_string(),
            guests: self.guests.trim().to_string(),
            name: name.to_string(),
            phone,
            stay: DateRange::new(checkin, checkout)?,
        })
    }
}

/// Live filter for the phone input: digits only, at most 15 of them.
pub fn sanitize_phone(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_MAX_DIGITS)
        .collect()
}

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn is_valid_phone(digits: &str) -> bool {
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len())
}
