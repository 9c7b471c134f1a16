use thiserror::Error;

/// Error returned by every dispatch-layer operation.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Upstream answered with a non-success HTTP status.
    #[error("{message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Transport-level failure (DNS, connection reset, TLS, ...).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The transport gave up waiting for the upstream.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Endpoint, header or client configuration is unusable.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Caller supplied an unusable asset or argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The queued task panicked or was dropped before reporting a result.
    #[error("Task aborted: {0}")]
    TaskAborted(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse classification used for presentation and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Client,
    Server,
    Network,
    Parsing,
    Validation,
    Internal,
}

impl DispatchError {
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn api_error_with_details(
        code: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Upstream HTTP status, when the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError { code, .. } => match *code {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::ConnectionError(_) | Self::TimeoutError(_) => ErrorCategory::Network,
            Self::ParseError(_) => ErrorCategory::Parsing,
            Self::ConfigurationError(_) | Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::TaskAborted(_) | Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the failure is transient from the upstream's point of view.
    ///
    /// The fetcher only retries on HTTP status; network failures report
    /// `true` here so callers can decide to resubmit themselves.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Server | ErrorCategory::Network
        )
    }

    /// Whether the caller should prompt the user to pick or re-enter credentials.
    ///
    /// The upstream reports an unknown key/project as a 404 carrying
    /// "Requested entity was not found".
    pub fn requires_reauth(&self) -> bool {
        match self {
            Self::ApiError { code, message, .. } => {
                *code == 401
                    || message
                        .to_ascii_lowercase()
                        .contains("requested entity was not found")
            }
            _ => false,
        }
    }
}
