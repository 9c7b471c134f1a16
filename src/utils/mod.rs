//! Small shared helpers

pub mod mime;

pub use mime::{DEFAULT_IMAGE_MIME, guess_image_mime};
