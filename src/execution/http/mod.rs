//! HTTP Utilities
//!
//! - Header construction (dual-convention auth)
//! - Injectable transport and its reqwest implementation

pub mod headers;
pub mod transport;

pub use headers::{GOOG_API_KEY_HEADER, HttpHeaderBuilder, build_dispatch_headers};
pub use transport::{HttpTransport, HttpTransportRequest, HttpTransportResponse, ReqwestTransport};
