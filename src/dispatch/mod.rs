//! Request routing and dispatch.
//!
//! One dispatch resolves configuration, builds the outbound request, picks a
//! lane, and runs the call through the backoff fetcher inside that lane.

pub mod classify;
pub mod endpoint;
pub mod errors;

pub use classify::{IMAGE_MODEL_MARKER, classify_workload};
pub use endpoint::{API_VERSION, build_call_url, normalize_model_id, resolve_base_url};
pub use errors::{api_error_from_response, extract_error_detail};

use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{
    ConfigResolver, Configuration, EnvOverrides, MemorySettingsStore, SettingsStore,
};
use crate::error::DispatchError;
use crate::execution::http::{
    HttpTransport, HttpTransportRequest, HttpTransportResponse, ReqwestTransport,
    build_dispatch_headers,
};
use crate::execution::{Lanes, Workload};
use crate::observability::{format_headers_for_logging, redact_url};
use crate::retry::{BackoffFetcher, RetryPolicy};
use crate::types::{GenerateContentRequest, GenerateContentResponse, HttpConfig};

/// Fully resolved outbound call.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
    pub workload: Workload,
}

struct DispatcherInner {
    resolver: ConfigResolver,
    fetcher: BackoffFetcher,
    lanes: Arc<Lanes>,
    extra_headers: HashMap<String, String>,
}

/// Routes generation calls onto the image and text lanes.
///
/// Cheap to clone; clones share lanes, transport and settings store.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lanes", &self.inner.lanes)
            .field("retry_policy", self.inner.fetcher.policy())
            .finish()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn lanes(&self) -> &Arc<Lanes> {
        &self.inner.lanes
    }

    /// Current configuration snapshot, read from the settings store.
    pub async fn resolve_config(&self) -> Configuration {
        self.inner.resolver.resolve().await
    }

    /// Build the outbound request for one call without sending it.
    pub fn prepare(
        &self,
        config: &Configuration,
        model: &str,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<DispatchRequest, DispatchError> {
        let model = normalize_model_id(model);
        if model.is_empty() {
            return Err(DispatchError::InvalidInput(
                "model id must not be empty".to_string(),
            ));
        }
        let action = action.trim();
        if action.is_empty() {
            return Err(DispatchError::InvalidInput(
                "action must not be empty".to_string(),
            ));
        }

        let base = resolve_base_url(&config.api_host);
        let url = build_call_url(&base, model, action, config.api_key());
        let headers = build_dispatch_headers(config.api_key(), &self.inner.extra_headers)?;
        let workload = classify_workload(model, &payload);
        Ok(DispatchRequest {
            url,
            headers,
            body: payload,
            workload,
        })
    }

    /// Send `payload` to `model:action` and return the decoded JSON body.
    ///
    /// Fails with `ApiError` (status plus best-effort upstream message) on a
    /// non-success status, including one left over after retries.
    pub async fn dispatch(
        &self,
        model: &str,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, DispatchError> {
        let config = self.inner.resolver.resolve().await;
        let prepared = self.prepare(&config, model, action, payload)?;
        let request_id = uuid::Uuid::new_v4().to_string();
        let workload = prepared.workload;

        tracing::info!(
            request_id = %request_id,
            model = %normalize_model_id(model),
            action = %action,
            lane = %workload,
            "Dispatching generation request"
        );
        tracing::debug!(
            request_id = %request_id,
            url = %redact_url(&prepared.url),
            headers = %format_headers_for_logging(&prepared.headers),
            "Outbound request"
        );

        let request = HttpTransportRequest {
            request_id: request_id.clone(),
            url: prepared.url,
            headers: prepared.headers,
            body: prepared.body,
        };
        let fetcher = self.inner.fetcher.clone();
        let result = self
            .inner
            .lanes
            .lane(workload)
            .enqueue(move || async move {
                let response = fetcher.send(request).await?;
                decode_response(&response)
            })
            .await;

        match &result {
            Ok(_) => tracing::info!(request_id = %request_id, lane = %workload, "Dispatch completed"),
            Err(e) => tracing::warn!(
                request_id = %request_id,
                lane = %workload,
                status = e.status_code(),
                error = %e,
                "Dispatch failed"
            ),
        }
        result
    }

    /// Typed `generateContent` call.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, DispatchError> {
        let payload = serde_json::to_value(request).map_err(|e| {
            DispatchError::InternalError(format!("Cannot serialize request: {e}"))
        })?;
        let body = self.dispatch(model, "generateContent", payload).await?;
        serde_json::from_value(body)
            .map_err(|e| DispatchError::ParseError(format!("Unexpected response shape: {e}")))
    }
}

fn decode_response(response: &HttpTransportResponse) -> Result<serde_json::Value, DispatchError> {
    if !response.is_success() {
        return Err(api_error_from_response(response));
    }
    serde_json::from_slice(&response.body).map_err(|e| {
        DispatchError::ParseError(format!("Response body is not valid JSON: {e}"))
    })
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    env_overrides: Option<EnvOverrides>,
    transport: Option<Arc<dyn HttpTransport>>,
    http_config: Option<HttpConfig>,
    retry_policy: Option<RetryPolicy>,
    lanes: Option<Arc<Lanes>>,
    extra_headers: HashMap<String, String>,
}

impl DispatcherBuilder {
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn env_overrides(mut self, env: EnvOverrides) -> Self {
        self.env_overrides = Some(env);
        self
    }

    /// Use a custom transport instead of the reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Ignored when a custom transport is set.
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = Some(config);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Share lanes with other dispatchers in the same process context.
    pub fn lanes(mut self, lanes: Arc<Lanes>) -> Self {
        self.lanes = Some(lanes);
        self
    }

    /// Extra header sent with every call.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        // Reject bad header names up front instead of on first dispatch.
        build_dispatch_headers("", &self.extra_headers)?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(
                &self.http_config.unwrap_or_default(),
            )?),
        };
        let store = self
            .settings_store
            .unwrap_or_else(|| Arc::new(MemorySettingsStore::new()));
        let resolver = ConfigResolver::new(store).with_env(self.env_overrides.unwrap_or_default());

        Ok(Dispatcher {
            inner: Arc::new(DispatcherInner {
                resolver,
                fetcher: BackoffFetcher::new(transport, self.retry_policy.unwrap_or_default()),
                lanes: self.lanes.unwrap_or_default(),
                extra_headers: self.extra_headers,
            }),
        })
    }
}
