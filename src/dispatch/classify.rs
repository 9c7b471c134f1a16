//! Workload classification (image lane vs text lane).

use crate::execution::Workload;

/// Substring marking an image-capable model id ("…-image", "imagen-…").
pub const IMAGE_MODEL_MARKER: &str = "image";

/// Image when the model id carries the image marker or the payload asks for
/// an image generation config block; text otherwise.
pub fn classify_workload(model: &str, payload: &serde_json::Value) -> Workload {
    if model.to_ascii_lowercase().contains(IMAGE_MODEL_MARKER) || requests_image_config(payload) {
        Workload::Image
    } else {
        Workload::Text
    }
}

fn requests_image_config(payload: &serde_json::Value) -> bool {
    let generation_config = payload
        .get("generationConfig")
        .or_else(|| payload.get("generation_config"));
    generation_config
        .and_then(|gc| gc.get("imageConfig").or_else(|| gc.get("image_config")))
        .is_some_and(|ic| !ic.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_marker_in_model_id() {
        assert_eq!(
            classify_workload("gemini-2.5-flash-image", &json!({})),
            Workload::Image
        );
        assert_eq!(
            classify_workload("imagen-4.0-generate-001", &json!({})),
            Workload::Image
        );
        assert_eq!(
            classify_workload("Gemini-3-Pro-IMAGE-preview", &json!({})),
            Workload::Image
        );
    }

    #[test]
    fn image_config_block_in_payload() {
        let payload = json!({ "generationConfig": { "imageConfig": { "aspectRatio": "1:1" } } });
        assert_eq!(classify_workload("relay-model", &payload), Workload::Image);
    }

    #[test]
    fn text_otherwise() {
        assert_eq!(classify_workload("gemini-2.5-flash", &json!({})), Workload::Text);
        let payload = json!({ "generationConfig": { "temperature": 0.2, "imageConfig": null } });
        assert_eq!(classify_workload("gemini-2.5-flash", &payload), Workload::Text);
    }
}
