//! Error Handling Module
//!
//! - Core error type (`DispatchError`) and coarse `ErrorCategory`
//! - User-facing summaries and re-authentication hints
//!
//! # Example
//!
//! ```rust,ignore
//! use storyboard_dispatch::error::{DispatchError, ErrorCategory};
//!
//! let error = DispatchError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert!(!error.is_retryable());
//! ```

pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;
