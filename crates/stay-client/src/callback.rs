//! One-shot named callbacks with a deadline.
//!
//! The booking API answers by invoking a uniquely named callback with its JSON
//! payload instead of returning a plain response body. Each call registers a
//! name here, the transport resolves that name when the script body arrives,
//! and the caller waits for whichever comes first: the payload, a transport
//! failure, or the deadline.
//!
//! A name resolves at most once. Deliveries for a name that already resolved,
//! timed out or was never registered are dropped and reported as `false`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ClientError, Result};

type Outcome = Result<Value>;

/// Table of callback names still waiting for a response.
///
/// Cheap to clone; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    waiting: Arc<Mutex<HashMap<String, oneshot::Sender<Outcome>>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh callback name and start waiting on it.
    pub fn register(&self) -> PendingCall {
        let name = format!("cb_{}", Uuid::new_v4().simple());
        let (tx, rx) = oneshot::channel();
        self.table().insert(name.clone(), tx);

        PendingCall {
            name,
            rx,
            registry: self.clone(),
        }
    }

    /// Resolve `name` with a payload. Returns `false` if nothing was waiting.
    pub fn deliver(&self, name: &str, payload: Value) -> bool {
        self.resolve(name, Ok(payload))
    }

    /// Resolve `name` with a failure. Returns `false` if nothing was waiting.
    pub fn fail(&self, name: &str, error: ClientError) -> bool {
        self.resolve(name, Err(error))
    }

    /// Number of calls still waiting.
    pub fn pending(&self) -> usize {
        self.table().len()
    }

    fn resolve(&self, name: &str, outcome: Outcome) -> bool {
        let sender = self.table().remove(name);
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => {
                debug!(callback = name, "discarding response for unknown or settled callback");
                false
            }
        }
    }

    /// Forget `name`. Safe to call any number of times.
    fn release(&self, name: &str) {
        self.table().remove(name);
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<String, oneshot::Sender<Outcome>>> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered callback that has not been awaited yet.
///
/// Dropping it without waiting unregisters the name.
#[derive(Debug)]
pub struct PendingCall {
    name: String,
    rx: oneshot::Receiver<Outcome>,
    registry: CallbackRegistry,
}

impl PendingCall {
    /// The callback name to send along with the request.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the outcome, giving up after `timeout`.
    ///
    /// # Errors
    /// Returns the delivered failure, `ClientError::Timeout` when the deadline
    /// passes first, or `ClientError::Transport` if the registry entry vanished.
    pub async fn wait(mut self, timeout: Duration) -> Result<Value> {
        let outcome = match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(ClientError::Transport(
                "callback released without a response".to_string(),
            )),
            Err(_) => {
                debug!(callback = %self.name, ?timeout, "callback deadline passed");
                Err(ClientError::Timeout(timeout))
            }
        };
        self.registry.release(&self.name);
        outcome
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.registry.release(&self.name);
    }
}
