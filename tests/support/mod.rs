//! Shared fakes for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use storyboard_dispatch::DispatchError;
use storyboard_dispatch::config::{MemorySettingsStore, SETTINGS_KEY};
use storyboard_dispatch::dispatch::Dispatcher;
use storyboard_dispatch::execution::http::{
    HttpTransport, HttpTransportRequest, HttpTransportResponse,
};
use storyboard_dispatch::retry::RetryPolicy;

/// A request as seen by the transport, with the (tokio) time it arrived.
#[derive(Debug, Clone)]
pub struct Seen {
    pub at: Instant,
    pub request: HttpTransportRequest,
}

/// Scripted transport: pops responses in order, then repeats the fallback.
/// Each call takes `latency` and is tracked for overlap.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpTransportResponse, DispatchError>>>,
    fallback: HttpTransportResponse,
    latency: Duration,
    seen: Mutex<Vec<Seen>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(fallback: HttpTransportResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            latency: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn ok_json(body: serde_json::Value) -> Self {
        Self::new(HttpTransportResponse::json(200, &body))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn then(self, response: HttpTransportResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn then_status(self, status: u16) -> Self {
        self.then(HttpTransportResponse::new(status, format!("status {status}")))
    }

    pub fn then_error(self, error: DispatchError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, DispatchError> {
        self.seen.lock().unwrap().push(Seen {
            at: Instant::now(),
            request,
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Dispatcher over `transport` with the given persisted settings JSON.
pub fn dispatcher(
    settings: &str,
    transport: Arc<ScriptedTransport>,
    policy: RetryPolicy,
) -> Dispatcher {
    Dispatcher::builder()
        .settings_store(Arc::new(MemorySettingsStore::with_entry(
            SETTINGS_KEY,
            settings,
        )))
        .transport(transport)
        .retry_policy(policy)
        .build()
        .unwrap()
}

/// `generateContent` body carrying a single inline PNG part.
pub fn image_body() -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgoAAAAA" } }
        ]}}]
    })
}

pub fn text_body(text: &str) -> serde_json::Value {
    serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}
