//! Nightly pricing with a long-stay discount and an upfront deposit.
//!
//! Deployments disagree on where the long-stay discount starts (three nights
//! on one page, four on another), so every number here comes from a
//! [`PricingPolicy`] instead of a constant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{nights_between_dates, parse_iso_date};
use crate::error::{EngineError, Result};

/// Rate table for one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Stays of at least this many nights get `long_rate`.
    pub long_stay_from_nights: u32,
    /// Nightly rate below the threshold.
    pub short_rate: u64,
    /// Nightly rate at or above the threshold.
    pub long_rate: u64,
    /// Share of the total due upfront, in `[0, 1]`.
    pub deposit_fraction: f64,
}

impl PricingPolicy {
    /// Build a validated policy.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidPolicy` for a zero threshold or a deposit
    /// fraction outside `[0, 1]`.
    pub fn new(
        long_stay_from_nights: u32,
        short_rate: u64,
        long_rate: u64,
        deposit_fraction: f64,
    ) -> Result<Self> {
        let policy = Self {
            long_stay_from_nights,
            short_rate,
            long_rate,
            deposit_fraction,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check a policy that was deserialized rather than built with [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if self.long_stay_from_nights == 0 {
            return Err(EngineError::InvalidPolicy(
                "long-stay threshold must be at least one night".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.deposit_fraction) {
            return Err(EngineError::InvalidPolicy(format!(
                "deposit fraction {} is outside [0, 1]",
                self.deposit_fraction
            )));
        }
        Ok(())
    }

    /// Nightly rate for a stay of `nights` nights.
    pub fn rate_for_nights(&self, nights: u32) -> u64 {
        if nights >= self.long_stay_from_nights {
            self.long_rate
        } else {
            self.short_rate
        }
    }

    /// Price a stay given as ISO dates.
    ///
    /// Returns `Ok(None)` when the stay has no nights (checkout on or before
    /// check-in).
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDate` if either date does not parse.
    pub fn quote(&self, checkin: &str, checkout: &str) -> Result<Option<PricingQuote>> {
        let a = parse_iso_date(checkin)?;
        let b = parse_iso_date(checkout)?;
        Ok(self.quote_dates(a, b))
    }

    /// Price a stay given as calendar days.
    pub fn quote_dates(&self, checkin: NaiveDate, checkout: NaiveDate) -> Option<PricingQuote> {
        let nights = nights_between_dates(checkin, checkout);
        if nights <= 0 {
            return None;
        }
        let nights = u32::try_from(nights).unwrap_or(u32::MAX);
        let nightly_rate = self.rate_for_nights(nights);
        let total = u64::from(nights).saturating_mul(nightly_rate);

        Some(PricingQuote {
            nights,
            nightly_rate,
            total,
            deposit_due: total as f64 * self.deposit_fraction,
        })
    }
}

/// Price of a candidate stay. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    pub nights: u32,
    pub nightly_rate: u64,
    pub total: u64,
    pub deposit_due: f64,
}

/// Nightly rate for `nights` under `policy`.
pub fn rate_for_nights(nights: u32, policy: &PricingPolicy) -> u64 {
    policy.rate_for_nights(nights)
}

/// Price a stay given as ISO dates under `policy`.
pub fn quote(checkin: &str, checkout: &str, policy: &PricingPolicy) -> Result<Option<PricingQuote>> {
    policy.quote(checkin, checkout)
}
