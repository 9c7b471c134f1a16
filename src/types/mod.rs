//! Shared data types: wire format, HTTP configuration, caller assets.

pub mod asset;
pub mod content;
pub mod http;

pub use asset::{FrameLayout, ImageAsset, ImageSize};
pub use content::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, Part,
};
pub use http::{HttpConfig, HttpConfigBuilder};
