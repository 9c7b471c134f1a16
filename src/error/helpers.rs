//! User-facing error summaries.
//!
//! The dispatch layer only reports failures; the UI decides how to show them.
//! `summarize_error` gives it a stable, structured view plus fix suggestions.

use super::types::{DispatchError, ErrorCategory};

/// Structured error summary for UI consumption.
#[derive(Debug, Clone)]
pub struct ErrorSummary {
    pub category: ErrorCategory,
    pub status: Option<u16>,
    /// Raw composed message (status + upstream detail when available).
    pub message: String,
    /// Whether the caller should ask the user to re-select credentials.
    pub requires_reauth: bool,
    pub suggestions: Vec<String>,
}

pub fn summarize_error(err: &DispatchError) -> ErrorSummary {
    ErrorSummary {
        category: err.category(),
        status: err.status_code(),
        message: err.to_string(),
        requires_reauth: err.requires_reauth(),
        suggestions: suggest_fixes(err),
    }
}

pub fn suggest_fixes(err: &DispatchError) -> Vec<String> {
    let mut tips = Vec::new();
    if err.requires_reauth() {
        tips.push("Re-enter or re-select the API key in settings".to_string());
    }
    match err.category() {
        ErrorCategory::Authentication => {
            tips.push("Verify the API key and that the relay accepts it".to_string());
        }
        ErrorCategory::RateLimit => {
            tips.push("Wait a moment before generating again".to_string());
        }
        ErrorCategory::Client => {
            tips.push("Check the model ids configured in settings".to_string());
        }
        ErrorCategory::Server => {
            tips.push("The upstream is struggling; retry later".to_string());
        }
        ErrorCategory::Network => {
            tips.push(
                "Check network connectivity, proxy settings, or the configured API host"
                    .to_string(),
            );
        }
        ErrorCategory::Parsing => {
            tips.push("The endpoint did not return model JSON; check the API host".to_string());
        }
        ErrorCategory::Validation => {
            tips.push("Check the API host and the supplied images".to_string());
        }
        ErrorCategory::Internal => {}
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_flags_reauth_for_entity_not_found() {
        let err = DispatchError::api_error(404, "HTTP 404: Requested entity was not found.");
        let summary = summarize_error(&err);
        assert_eq!(summary.status, Some(404));
        assert!(summary.requires_reauth);
        assert!(summary.suggestions[0].contains("API key"));
    }

    #[test]
    fn network_summary_points_at_host() {
        let summary = summarize_error(&DispatchError::ConnectionError("reset".into()));
        assert_eq!(summary.category, ErrorCategory::Network);
        assert_eq!(summary.status, None);
        assert!(summary.suggestions.iter().any(|s| s.contains("API host")));
    }
}
