//! Normalization of failed upstream responses.

use crate::error::DispatchError;
use crate::execution::http::HttpTransportResponse;

/// Longest raw body excerpt kept in an error message.
const MAX_RAW_DETAIL_CHARS: usize = 500;

/// Best-effort error detail: structured `{"error": {"message"}}` first, then
/// raw text. `None` when the body is empty.
pub fn extract_error_detail(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(text) {
        let structured = json
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .or_else(|| json.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.trim().is_empty());
        if let Some(message) = structured {
            return Some(message.to_string());
        }
    }
    Some(text.chars().take(MAX_RAW_DETAIL_CHARS).collect())
}

/// Compose the dispatch failure for a non-success response.
pub fn api_error_from_response(resp: &HttpTransportResponse) -> DispatchError {
    let detail = extract_error_detail(&resp.body)
        .or_else(|| {
            reqwest::StatusCode::from_u16(resp.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "request failed".to_string());

    let details = match serde_json::from_slice::<serde_json::Value>(&resp.body) {
        Ok(json) => serde_json::json!({ "status": resp.status, "response": json }),
        Err(_) => serde_json::json!({ "status": resp.status, "raw": resp.text() }),
    };
    DispatchError::api_error_with_details(
        resp.status,
        format!("HTTP {}: {}", resp.status, detail),
        details,
    )
}
