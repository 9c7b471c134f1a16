//! Caller-side image assets and frame layout options.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::content::Blob;
use crate::error::DispatchError;
use crate::utils::guess_image_mime;

/// An image supplied by the editor: a reference, a frame to edit, or a mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

impl ImageAsset {
    pub fn new(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64_data.into(),
        }
    }

    /// Encode raw bytes; the mime type is sniffed when not given.
    pub fn from_bytes(bytes: &[u8], mime_type: Option<&str>) -> Self {
        let mime_type = match mime_type {
            Some(m) => m.to_string(),
            None => guess_image_mime(bytes, None),
        };
        Self {
            mime_type,
            data: STANDARD.encode(bytes),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL as produced by browsers.
    pub fn from_data_url(url: &str) -> Result<Self, DispatchError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| DispatchError::InvalidInput("not a data URL".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| DispatchError::InvalidInput("data URL has no payload".to_string()))?;
        let mime_type = meta.strip_suffix(";base64").ok_or_else(|| {
            DispatchError::InvalidInput("only base64 data URLs are supported".to_string())
        })?;
        if payload.is_empty() {
            return Err(DispatchError::InvalidInput("data URL payload is empty".to_string()));
        }
        let mime_type = if mime_type.is_empty() {
            let bytes = STANDARD
                .decode(payload)
                .map_err(|e| DispatchError::InvalidInput(format!("invalid base64: {e}")))?;
            guess_image_mime(&bytes, None)
        } else {
            mime_type.to_string()
        };
        Ok(Self {
            mime_type,
            data: payload.to_string(),
        })
    }

    /// Read an image from disk, detecting its type from content or extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DispatchError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DispatchError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        let mime_type = guess_image_mime(&bytes, path.to_str());
        Ok(Self::from_bytes(&bytes, Some(&mime_type)))
    }

    pub fn to_blob(&self) -> Blob {
        Blob {
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }
}

/// Output resolution tier understood by image models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout options for a generated frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub aspect_ratio: String,
    pub image_size: Option<ImageSize>,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            image_size: None,
        }
    }
}

impl FrameLayout {
    pub fn new(aspect_ratio: impl Into<String>) -> Self {
        Self {
            aspect_ratio: aspect_ratio.into(),
            image_size: None,
        }
    }

    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_is_split_into_mime_and_payload() {
        let asset = ImageAsset::from_data_url("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(asset.mime_type, "image/jpeg");
        assert_eq!(asset.data, "aGVsbG8=");
    }

    #[test]
    fn data_url_rejects_non_base64_and_plain_strings() {
        assert!(ImageAsset::from_data_url("data:text/plain,hello").is_err());
        assert!(ImageAsset::from_data_url("https://example.com/a.png").is_err());
        assert!(ImageAsset::from_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn from_bytes_sniffs_png() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let asset = ImageAsset::from_bytes(&png, None);
        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&asset.data).unwrap(), png);
    }

    #[tokio::test]
    async fn from_path_reads_and_encodes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.jpg");
        tokio::fs::write(&path, b"not really a jpeg").await.unwrap();

        let asset = ImageAsset::from_path(&path).await.unwrap();
        assert_eq!(asset.mime_type, "image/jpeg");
        assert_eq!(STANDARD.decode(&asset.data).unwrap(), b"not really a jpeg");
    }

    #[test]
    fn image_size_serializes_as_tier_label() {
        assert_eq!(serde_json::to_value(ImageSize::FourK).unwrap(), "4K");
        assert_eq!(FrameLayout::default().aspect_ratio, "16:9");
    }
}
