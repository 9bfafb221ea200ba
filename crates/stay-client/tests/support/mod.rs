//! Shared test helpers for `stay-client` integration tests.
//!
//! `FakeTransport` answers each API action from a per-action script and
//! records every call, so tests can assert on what was sent without a server.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use stay_client::error::{ClientError, Result};
use stay_client::Transport;

type Script = HashMap<String, VecDeque<Result<Value>>>;

/// Scripted transport. Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct FakeTransport {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one response for `action`. The last queued response repeats.
    pub fn respond(&self, action: &str, outcome: Result<Value>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .entry(action.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Hold every answer to `action` for `delay` before replying.
    pub fn delay(&self, action: &str, delay: Duration) -> &Self {
        self.delays
            .lock()
            .unwrap()
            .insert(action.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls.lock().unwrap().clone()
    }

    /// Actions called so far, in order.
    pub fn actions(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|params| param(params, "action").unwrap_or_default())
            .collect()
    }

    pub fn last_call(&self, action: &str) -> Option<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .rev()
            .find(|params| param(params, "action").as_deref() == Some(action))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(&self, params: &[(String, String)]) -> Result<Value> {
        self.calls.lock().unwrap().push(params.to_vec());
        let action = param(params, "action").unwrap_or_default();

        let delay = self.delays.lock().unwrap().get(&action).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock().unwrap();
        let queue = script.get_mut(&action).ok_or_else(|| {
            ClientError::Transport(format!("no scripted response for {}", action))
        })?;
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

pub fn param(params: &[(String, String)], key: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

pub fn booking_json(id: &str, cabana: &str, checkin: &str, checkout: &str, estado: &str) -> Value {
    json!({
        "id": id,
        "cabana": cabana,
        "checkin": checkin,
        "checkout": checkout,
        "personas": 2,
        "estado": estado,
        "nombre": "Ana Pérez",
        "telefono": "3515555555",
        "createdAt": "2025-01-02 10:00"
    })
}

pub fn ok() -> Result<Value> {
    Ok(json!({ "ok": true }))
}
