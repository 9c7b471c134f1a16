//! Log formatting helpers that keep API keys out of log output.

use reqwest::header::HeaderMap;
use std::collections::BTreeMap;

/// Mask a secret, keeping just enough to tell keys apart.
pub fn mask_sensitive_value(value: &str) -> String {
    if let Some(token) = value.strip_prefix("Bearer ") {
        return format!("Bearer {}", mask_sensitive_value(token));
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else if value.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}

fn is_sensitive_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("authorization") || name.contains("key") || name.contains("token")
}

/// Render headers as a JSON object with credentials masked.
pub fn format_headers_for_logging(headers: &HeaderMap) -> String {
    let map: BTreeMap<&str, String> = headers
        .iter()
        .map(|(k, v)| {
            let value = v.to_str().unwrap_or("<invalid>");
            let shown = if is_sensitive_header(k.as_str()) {
                mask_sensitive_value(value)
            } else {
                value.to_string()
            };
            (k.as_str(), shown)
        })
        .collect();
    serde_json::to_string(&map).unwrap_or_else(|_| format!("{map:?}"))
}

/// Mask the `key` query parameter of a call URL.
pub fn redact_url(url: &str) -> String {
    let Some((path, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let query: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) if k.eq_ignore_ascii_case("key") => {
                format!("{k}={}", mask_sensitive_value(v))
            }
            _ => pair.to_string(),
        })
        .collect();
    format!("{path}?{}", query.join("&"))
}
