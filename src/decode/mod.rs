//! Response decoders.
//!
//! An image call that returns no image is a valid outcome (`Ok(None)`), not a
//! failure; models sometimes answer with text only.

pub mod resource;

pub use resource::{ImageResource, RESOURCE_SCHEME, ResourceHandle, ResourceId, ResourceRegistry};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::DispatchError;
use crate::types::{Blob, GenerateContentResponse};

/// Returned by [`extract_text`] when the response carries no text.
pub const NO_DESCRIPTION_PLACEHOLDER: &str = "No description available.";

/// First inline image among the first candidate's parts.
pub fn extract_inline_image(response: &GenerateContentResponse) -> Option<&Blob> {
    response
        .first_candidate_parts()
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|blob| !blob.data.is_empty())
}

/// Decode the first inline image and register it.
pub fn decode_image(
    response: &GenerateContentResponse,
    registry: &ResourceRegistry,
) -> Result<Option<ResourceHandle>, DispatchError> {
    let Some(blob) = extract_inline_image(response) else {
        tracing::debug!("Response carries no inline image");
        return Ok(None);
    };
    let bytes = STANDARD
        .decode(blob.data.trim())
        .map_err(|e| DispatchError::ParseError(format!("Inline image is not valid base64: {e}")))?;
    Ok(Some(registry.register(bytes, Some(&blob.mime_type))))
}

/// First non-empty text part of the first candidate, or the placeholder.
pub fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .first_candidate_parts()
        .iter()
        .filter_map(|p| p.text.as_deref())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_DESCRIPTION_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(raw: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn first_inline_image_wins() {
        let resp = response(json!({ "candidates": [{ "content": { "parts": [
            { "text": "here you go" },
            { "inlineData": { "mimeType": "image/jpeg", "data": "AQID" } },
            { "inlineData": { "mimeType": "image/png", "data": "BAUG" } }
        ]}}]}));
        let registry = ResourceRegistry::new();
        let handle = decode_image(&resp, &registry).unwrap().unwrap();
        assert_eq!(handle.mime_type, "image/jpeg");
        assert_eq!(&*registry.get(&handle.id).unwrap().bytes, &[1, 2, 3]);
    }

    #[test]
    fn only_first_candidate_is_scanned() {
        let resp = response(json!({ "candidates": [
            { "content": { "parts": [{ "text": "no image" }] } },
            { "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "AQID" } }] } }
        ]}));
        assert!(extract_inline_image(&resp).is_none());
    }

    #[test]
    fn no_image_is_absence_not_error() {
        let registry = ResourceRegistry::new();
        let resp = response(json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] }));
        assert_eq!(decode_image(&resp, &registry).unwrap(), None);
        assert_eq!(decode_image(&response(json!({})), &registry).unwrap(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_base64_is_parse_error() {
        let resp = response(json!({ "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": "image/png", "data": "***" } }
        ]}}]}));
        assert!(matches!(
            decode_image(&resp, &ResourceRegistry::new()),
            Err(DispatchError::ParseError(_))
        ));
    }

    #[test]
    fn text_falls_back_to_placeholder() {
        let resp = response(json!({ "candidates": [{ "content": { "parts": [
            { "text": "  " }, { "text": "A red kite over a beach." }
        ]}}]}));
        assert_eq!(extract_text(&resp), "A red kite over a beach.");
        assert_eq!(extract_text(&response(json!({}))), NO_DESCRIPTION_PLACEHOLDER);
    }
}
