//! Per-deployment site configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file);
//! front ends layer their own overrides on top.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use stay_engine::date::parse_timezone;
use stay_engine::PricingPolicy;

use crate::message::StayNotes;
use crate::transport::{JsonpTransport, DEFAULT_TIMEOUT};

pub const DEFAULT_SHORT_RATE: u64 = 85_000;
pub const DEFAULT_LONG_RATE: u64 = 75_000;
pub const DEFAULT_LONG_FROM_NIGHTS: u32 = 4;
pub const DEFAULT_DEPOSIT_FRACTION: f64 = 0.5;
pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Cordoba";

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// Reservation API endpoint. Required for anything that talks to it.
    pub api_base: Option<String>,
    pub policy: PricingPolicy,
    pub notes: StayNotes,
    /// Tag sent with owner requests.
    pub version: String,
    pub timeout: Duration,
    pub timezone: Tz,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            policy: PricingPolicy {
                long_stay_from_nights: DEFAULT_LONG_FROM_NIGHTS,
                short_rate: DEFAULT_SHORT_RATE,
                long_rate: DEFAULT_LONG_RATE,
                deposit_fraction: DEFAULT_DEPOSIT_FRACTION,
            },
            notes: StayNotes::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: DEFAULT_TIMEOUT,
            timezone: chrono_tz::America::Argentina::Cordoba,
        }
    }
}

impl SiteConfig {
    /// Load from `CABINS_*` environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Absent keys keep their defaults; a
    /// present key that does not parse is an error naming the key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let policy = PricingPolicy::new(
            parse_var(&lookup, "CABINS_LONG_FROM_NIGHTS", defaults.policy.long_stay_from_nights)?,
            parse_var(&lookup, "CABINS_SHORT_RATE", defaults.policy.short_rate)?,
            parse_var(&lookup, "CABINS_LONG_RATE", defaults.policy.long_rate)?,
            parse_var(&lookup, "CABINS_DEPOSIT_FRACTION", defaults.policy.deposit_fraction)?,
        )
        .context("building pricing policy from CABINS_* variables")?;

        let timezone = match lookup("CABINS_TIMEZONE") {
            Some(name) => parse_timezone(name.trim())
                .with_context(|| format!("parsing CABINS_TIMEZONE value `{}`", name))?,
            None => defaults.timezone,
        };

        let timeout_secs: u64 =
            parse_var(&lookup, "CABINS_TIMEOUT_SECS", defaults.timeout.as_secs())?;
        if timeout_secs == 0 {
            anyhow::bail!("CABINS_TIMEOUT_SECS must be at least 1 second");
        }

        Ok(Self {
            api_base: lookup("CABINS_API_BASE")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            policy,
            notes: StayNotes {
                checkin_time: lookup("CABINS_CHECKIN_TIME").unwrap_or(defaults.notes.checkin_time),
                checkout_time: lookup("CABINS_CHECKOUT_TIME")
                    .unwrap_or(defaults.notes.checkout_time),
                reminder: lookup("CABINS_REMINDER").unwrap_or(defaults.notes.reminder),
            },
            version: lookup("CABINS_VERSION").unwrap_or(defaults.version),
            timeout: Duration::from_secs(timeout_secs),
            timezone,
        })
    }

    /// The API endpoint, or an error explaining how to set it.
    pub fn require_api_base(&self) -> Result<&str> {
        self.api_base
            .as_deref()
            .context("no API endpoint configured: set CABINS_API_BASE or pass --api-base")
    }

    /// A callback transport pointed at the configured endpoint.
    pub fn transport(&self) -> Result<JsonpTransport> {
        Ok(JsonpTransport::new(self.require_api_base()?, self.timeout))
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("parsing {} value `{}`", key, raw)),
        None => Ok(default),
    }
}
