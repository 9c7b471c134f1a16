//! Request bodies for the editor-facing operations.

use crate::error::DispatchError;
use crate::types::{
    Content, FrameLayout, GenerateContentRequest, GenerationConfig, ImageAsset, ImageConfig,
    ImageSize, Part,
};

pub(crate) const ANALYZE_INSTRUCTION: &str =
    "Describe this image in one or two short sentences, focusing on the subject and setting.";
pub(crate) const MASK_INSTRUCTION: &str =
    "The second image is a mask: change only the white region and keep everything else identical.";
pub(crate) const REFINE_INSTRUCTION: &str = "Re-render the first image at higher clarity and detail without changing its composition. The remaining images show the characters; keep their appearance consistent.";
pub(crate) const CONNECTION_PROBE: &str = "ping";

fn require_text(value: &str, what: &str) -> Result<String, DispatchError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DispatchError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(value.to_string())
}

fn image_output(image_config: ImageConfig) -> GenerationConfig {
    GenerationConfig {
        response_modalities: Some(vec!["IMAGE".to_string()]),
        image_config: Some(image_config),
        ..Default::default()
    }
}

pub fn frame_request(
    prompt: &str,
    references: &[ImageAsset],
    layout: &FrameLayout,
) -> Result<GenerateContentRequest, DispatchError> {
    let mut parts = vec![Part::text(require_text(prompt, "prompt")?)];
    parts.extend(references.iter().map(|r| Part::inline(r.to_blob())));
    Ok(GenerateContentRequest {
        contents: vec![Content::user(parts)],
        generation_config: Some(image_output(ImageConfig {
            aspect_ratio: Some(layout.aspect_ratio.clone()),
            image_size: layout.image_size.map(|s| s.as_str().to_string()),
        })),
    })
}

pub fn edit_request(
    image: &ImageAsset,
    instruction: &str,
    mask: Option<&ImageAsset>,
) -> Result<GenerateContentRequest, DispatchError> {
    let instruction = require_text(instruction, "instruction")?;
    let mut parts = vec![Part::inline(image.to_blob())];
    let text = match mask {
        Some(mask) => {
            parts.push(Part::inline(mask.to_blob()));
            format!("{MASK_INSTRUCTION}\n{instruction}")
        }
        None => instruction,
    };
    parts.push(Part::text(text));
    Ok(GenerateContentRequest {
        contents: vec![Content::user(parts)],
        generation_config: Some(image_output(ImageConfig::default())),
    })
}

pub fn refine_request(
    image: &ImageAsset,
    characters: &[ImageAsset],
    target: ImageSize,
) -> GenerateContentRequest {
    let mut parts = vec![Part::inline(image.to_blob())];
    parts.extend(characters.iter().map(|c| Part::inline(c.to_blob())));
    parts.push(Part::text(REFINE_INSTRUCTION));
    GenerateContentRequest {
        contents: vec![Content::user(parts)],
        generation_config: Some(image_output(ImageConfig {
            aspect_ratio: None,
            image_size: Some(target.as_str().to_string()),
        })),
    }
}

pub fn analyze_request(image: &ImageAsset) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![
            Part::inline(image.to_blob()),
            Part::text(ANALYZE_INSTRUCTION),
        ])],
        generation_config: None,
    }
}

pub fn connection_probe() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(CONNECTION_PROBE)])],
        generation_config: Some(GenerationConfig {
            max_output_tokens: Some(8),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn png() -> ImageAsset {
        ImageAsset::new("image/png", "AQID")
    }

    #[test]
    fn frame_puts_prompt_first_then_references() {
        let layout = FrameLayout::new("9:16").with_image_size(ImageSize::TwoK);
        let req = frame_request("  a lighthouse at dusk ", &[png()], &layout).unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "a lighthouse at dusk");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "AQID");
        assert_eq!(
            body["generationConfig"],
            json!({
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "9:16", "imageSize": "2K" }
            })
        );
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert!(matches!(
            frame_request(" ", &[], &FrameLayout::default()),
            Err(DispatchError::InvalidInput(_))
        ));
        assert!(edit_request(&png(), "", None).is_err());
    }

    #[test]
    fn edit_with_mask_sends_image_mask_then_text() {
        let mask = ImageAsset::new("image/png", "BAUG");
        let req = edit_request(&png(), "make it rain", Some(&mask)).unwrap();
        let parts = &req.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "BAUG");
        assert!(parts[2].text.as_deref().unwrap().ends_with("make it rain"));
    }

    #[test]
    fn edit_payload_is_classified_as_image_work() {
        let req = edit_request(&png(), "crop", None).unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert!(body["generationConfig"].get("imageConfig").is_some());
    }

    #[test]
    fn refine_sets_target_size() {
        let req = refine_request(&png(), &[png(), png()], ImageSize::FourK);
        assert_eq!(req.contents[0].parts.len(), 4);
        let ic = req.generation_config.unwrap().image_config.unwrap();
        assert_eq!(ic.image_size.as_deref(), Some("4K"));
        assert_eq!(ic.aspect_ratio, None);
    }
}
