//! Error types for stay-client operations.

use std::time::Duration;

use stay_engine::EngineError;
use thiserror::Error;

/// Everything that can go wrong between a page handler and the booking sheet.
///
/// None of these are fatal: callers show the message and let the user retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced a callback (network failure, bad script body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// No callback arrived before the deadline.
    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    /// User input was rejected before anything was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The owner pin was refused.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API answered `{ ok: false, error }`.
    #[error("Request rejected: {0}")]
    Application(String),

    /// The API answered with a payload of the wrong shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ClientError {
    /// Whether the failure came from user input (form or date validation).
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_) | ClientError::Engine(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
