//! Error types for stay-engine operations.
//!
//! Every variant is a validation failure: the engine has no I/O, so the only
//! way to fail is to be handed input that does not describe a real stay.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid range: checkout {checkout} is not after checkin {checkin}")]
    InvalidRange {
        checkin: NaiveDate,
        checkout: NaiveDate,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),

    #[error("Invalid pricing policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
