//! storyboard-dispatch
//!
//! Queuing and resilient dispatch for generation API calls made by a
//! storyboard editor: two bounded lanes (image and text), status-aware
//! backoff, endpoint routing, and response decoding.
#![deny(unsafe_code)]

pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod generation;
pub mod observability;
pub mod retry;
pub mod types;
pub mod utils;

pub use error::DispatchError;

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::config::{
        ConfigResolver, Configuration, EnvOverrides, FileSettingsStore, MemorySettingsStore,
        SETTINGS_KEY, SettingsStore,
    };
    pub use crate::decode::{ResourceHandle, ResourceRegistry};
    pub use crate::dispatch::{Dispatcher, DispatcherBuilder};
    pub use crate::error::{DispatchError, ErrorCategory};
    pub use crate::execution::http::{
        HttpTransport, HttpTransportRequest, HttpTransportResponse, ReqwestTransport,
    };
    pub use crate::execution::{Lanes, TaskQueue, Workload};
    pub use crate::generation::GenerationService;
    pub use crate::retry::RetryPolicy;
    pub use crate::types::{FrameLayout, HttpConfig, ImageAsset, ImageSize};
}
