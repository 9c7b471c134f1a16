//! Observability: subscriber setup and credential-safe log formatting.

pub mod logging;
pub mod subscriber;

pub use logging::{format_headers_for_logging, mask_sensitive_value, redact_url};
pub use subscriber::{
    OutputFormat, SubscriberConfig, SubscriberConfigBuilder, init_from_env, init_subscriber,
};
