//! Request/response seam between the API client and the wire.
//!
//! The booking sheet is published as a script endpoint that answers
//! `GET ?action=...&callback=NAME` with a script body `NAME({...})`. The
//! [`JsonpTransport`] speaks that protocol over HTTP and turns it back into a
//! single awaitable call; anything else that can answer a query with JSON can
//! stand in behind [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::callback::CallbackRegistry;
use crate::error::{ClientError, Result};

/// Deadline for a single call when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// A one-shot query against the booking API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the query parameters and return the JSON payload of the response.
    async fn call(&self, params: &[(String, String)]) -> Result<Value>;
}

/// Callback-style cross-origin transport over HTTP GET.
#[derive(Debug, Clone)]
pub struct JsonpTransport {
    client: Client,
    base: String,
    timeout: Duration,
    registry: CallbackRegistry,
}

impl JsonpTransport {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), base, timeout)
    }

    pub fn with_client(client: Client, base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base: base.into(),
            timeout,
            registry: CallbackRegistry::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The callbacks this transport is still waiting on.
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }
}

#[async_trait]
impl Transport for JsonpTransport {
    async fn call(&self, params: &[(String, String)]) -> Result<Value> {
        let pending = self.registry.register();
        let name = pending.name().to_string();
        let action = params
            .iter()
            .find(|(k, _)| k == "action")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        let mut query = params.to_vec();
        query.push(("callback".to_string(), name.clone()));
        let request = self.client.get(&self.base).query(&query);

        debug!(%action, callback = %name, "sending callback request");

        let registry = self.registry.clone();
        let _task = AbortOnDrop(tokio::spawn(async move {
            match fetch_script(request).await.and_then(|body| unwrap_callback(&body, &name)) {
                Ok(payload) => registry.deliver(&name, payload),
                Err(err) => registry.fail(&name, err),
            };
        }));

        let outcome = pending.wait(self.timeout).await;
        debug!(%action, ok = outcome.is_ok(), "callback request settled");
        outcome
    }
}

/// Aborts the in-flight request once the call has settled.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn fetch_script(request: RequestBuilder) -> Result<String> {
    let response = request.send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Extract the JSON argument of `name(...)` from a script body.
///
/// A bare JSON body is accepted too, so the same transport keeps working if
/// the backend ever drops the callback wrapper.
pub fn unwrap_callback(body: &str, name: &str) -> Result<Value> {
    let body = body.trim();

    if body.starts_with('{') || body.starts_with('[') {
        return Ok(serde_json::from_str(body)?);
    }

    let Some(rest) = body.strip_prefix(name) else {
        return Err(ClientError::Transport(format!(
            "response did not invoke callback {}",
            name
        )));
    };

    let inner = rest
        .trim_start()
        .strip_prefix('(')
        .map(|s| s.trim_end().trim_end_matches(';').trim_end())
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ClientError::Transport(format!("malformed callback body for {}", name)))?;

    Ok(serde_json::from_str(inner)?)
}
