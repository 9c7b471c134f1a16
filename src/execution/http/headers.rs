//! HTTP header construction for outbound generation calls.

use crate::error::DispatchError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// Provider-specific API key header.
pub const GOOG_API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP header builder for API requests
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Add Bearer token authorization
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self, DispatchError> {
        let auth_value = format!("Bearer {token}");
        self.headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| {
                DispatchError::ConfigurationError(format!("Invalid API key format: {e}"))
            })?,
        );
        Ok(self)
    }

    /// Add JSON content type
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, DispatchError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            DispatchError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        self.headers.insert(
            header_name,
            HeaderValue::from_str(value).map_err(|e| {
                DispatchError::ConfigurationError(format!("Invalid value for header '{name}': {e}"))
            })?,
        );
        Ok(self)
    }

    /// Add multiple custom headers; later entries override earlier ones.
    pub fn with_custom_headers(
        mut self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, DispatchError> {
        for (key, value) in custom_headers {
            self = self.with_header(key, value)?;
        }
        Ok(self)
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

impl Default for HttpHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Headers for one dispatch.
///
/// The key is sent both as `x-goog-api-key` and as a bearer token: relays and
/// reverse proxies in front of the upstream disagree on which one they read.
/// Revisit this first if the upstream auth contract changes.
pub fn build_dispatch_headers(
    api_key: &str,
    extra_headers: &HashMap<String, String>,
) -> Result<HeaderMap, DispatchError> {
    let mut builder = HttpHeaderBuilder::new().with_json_content_type();
    if !api_key.is_empty() {
        builder = builder
            .with_header(GOOG_API_KEY_HEADER, api_key)?
            .with_bearer_auth(api_key)?;
    }
    builder = builder.with_custom_headers(extra_headers)?;
    Ok(builder.build())
}
