//! Image MIME detection

/// Fallback when neither bytes nor file name identify the image format.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Guess an image MIME by inspecting magic numbers.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<String> {
    infer::get(bytes)
        .filter(|k| k.matcher_type() == infer::MatcherType::Image)
        .map(|k| k.mime_type().to_string())
}

/// Guess a MIME by file extension.
pub fn mime_from_path(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first_raw()
        .map(|s| s.to_string())
}

/// Prefer bytes, fall back to the file name, otherwise `image/png`.
pub fn guess_image_mime(bytes: &[u8], path: Option<&str>) -> String {
    if let Some(m) = sniff_image_mime(bytes) {
        return m;
    }
    if let Some(p) = path
        && let Some(m) = mime_from_path(p)
    {
        return m;
    }
    DEFAULT_IMAGE_MIME.to_string()
}
