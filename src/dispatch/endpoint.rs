//! Endpoint resolution and call URL composition.

use crate::config::DEFAULT_API_ORIGIN;

/// API version path segment.
pub const API_VERSION: &str = "v1beta";

/// Effective base endpoint for a configured host.
///
/// - empty ⇒ the public upstream origin
/// - leading `/` ⇒ same-origin relative base, kept as a path (reverse proxies)
/// - otherwise ⇒ absolute, `https://` added when no scheme is present
///
/// Trailing slashes are always removed.
pub fn resolve_base_url(host: &str) -> String {
    let host = host.trim();
    if host.is_empty() {
        return DEFAULT_API_ORIGIN.to_string();
    }
    if host.starts_with('/') {
        return host.trim_end_matches('/').to_string();
    }
    let absolute = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    absolute.trim_end_matches('/').to_string()
}

/// Accept both bare ids and resource-style `models/<id>` names.
pub fn normalize_model_id(model: &str) -> &str {
    let model = model.trim();
    model.strip_prefix("models/").unwrap_or(model)
}

/// `{base}/v1beta/models/{model}:{action}?key={api_key}`
pub fn build_call_url(base: &str, model: &str, action: &str, api_key: &str) -> String {
    format!(
        "{}/{}/models/{}:{}?key={}",
        base,
        API_VERSION,
        normalize_model_id(model),
        action,
        urlencoding::encode(api_key)
    )
}
