//! HTTP transport abstraction.
//!
//! The dispatcher never talks to `reqwest` directly; it goes through an
//! injectable `HttpTransport` ("custom fetch"). `ReqwestTransport` is the
//! production implementation, tests substitute scripted fakes.

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::DispatchError;
use crate::types::HttpConfig;

/// Transport-level request data for JSON POST requests.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    /// Correlates log lines of one dispatch across retries.
    pub request_id: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpTransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Custom HTTP transport for JSON requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, DispatchError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Option<String>,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, DispatchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                DispatchError::ConfigurationError(format!("Invalid proxy '{proxy}': {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if !config.headers.is_empty() {
            let defaults = super::headers::HttpHeaderBuilder::new()
                .with_custom_headers(&config.headers)?
                .build();
            builder = builder.default_headers(defaults);
        }
        let client = builder.build().map_err(|e| {
            DispatchError::ConfigurationError(format!("Cannot build HTTP client: {e}"))
        })?;
        Ok(Self {
            client,
            origin: config.origin.clone(),
        })
    }

    /// Wrap an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Turn a same-origin relative URL into an absolute one.
    fn absolute_url(&self, url: &str) -> Result<String, DispatchError> {
        if !url.starts_with('/') {
            return Ok(url.to_string());
        }
        match &self.origin {
            Some(origin) => Ok(format!("{}{}", origin.trim_end_matches('/'), url)),
            None => Err(DispatchError::ConfigurationError(format!(
                "relative endpoint '{url}' needs an origin; set HttpConfig::origin"
            ))),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, DispatchError> {
        let url = self.absolute_url(&request.url)?;
        let resp = self
            .client
            .post(&url)
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| map_transport_error(&request.request_id, e))?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| map_transport_error(&request.request_id, e))?;
        Ok(HttpTransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn map_transport_error(request_id: &str, err: reqwest::Error) -> DispatchError {
    if err.is_timeout() {
        tracing::error!(request_id = %request_id, error = %err, "Request timed out");
        return DispatchError::TimeoutError(err.to_string());
    }
    tracing::error!(
        request_id = %request_id,
        error = %err,
        hint = "check network connectivity, proxy settings, or the configured API host",
        "Network request failed"
    );
    DispatchError::ConnectionError(err.to_string())
}
