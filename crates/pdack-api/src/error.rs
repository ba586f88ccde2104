//! Error types for the PagerDuty API client.

use thiserror::Error;

/// PagerDuty API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API key was rejected while resolving the current user
    #[error("Authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    /// Non-success status from the API
    #[error("API request failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// Request exceeded the per-call timeout
    #[error("Network timeout after {0}s")]
    Timeout(u64),

    /// Transport-level failure (DNS, connect, reset, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Malformed API response: {0}")]
    Decode(String),

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl ApiError {
    /// Classify a reqwest error raised while sending or reading a request.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout_secs)
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// Check if this error is a network-related error.
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Timeout(_) | ApiError::Network(_))
    }

    /// Check if this error means the credential was rejected.
    pub fn is_auth_error(&self) -> bool {
        match self {
            ApiError::Auth { .. } => true,
            ApiError::Status { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Check if this error may clear up without operator action.
    ///
    /// The daemon retries every in-loop failure either way; this only tells
    /// the log whether a retry is expected to help.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) | ApiError::Decode(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Auth { .. } | ApiError::Client(_) => false,
        }
    }

    /// Get suggested action for this error.
    pub fn suggested_action(&self) -> &'static str {
        match self {
            ApiError::Auth { .. } => "Check pagerduty_api_key in your config file.",
            ApiError::Status { status: 401 | 403, .. } => {
                "Check pagerduty_api_key in your config file."
            }
            ApiError::Status { status: 429, .. } => "Rate limited. The next cycle will retry.",
            ApiError::Timeout(_) | ApiError::Network(_) => {
                "Check your network connection to api.pagerduty.com."
            }
            _ => "Try again or check the logs for details.",
        }
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_are_transient() {
        assert!(ApiError::Timeout(30).is_transient());
        assert!(ApiError::Timeout(30).is_network_error());
        assert!(ApiError::Network("connection reset".into()).is_transient());
        assert!(ApiError::Decode("missing field".into()).is_transient());
        assert!(!ApiError::Decode("missing field".into()).is_network_error());
    }

    #[test]
    fn test_status_classification() {
        let server = ApiError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        assert!(server.is_transient());
        assert!(!server.is_auth_error());

        let forbidden = ApiError::Status {
            status: 403,
            body: "forbidden".into(),
        };
        assert!(!forbidden.is_transient());
        assert!(forbidden.is_auth_error());
        assert!(forbidden.suggested_action().contains("pagerduty_api_key"));
    }

    #[test]
    fn test_auth_error_message() {
        let err = ApiError::Auth {
            status: 401,
            body: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "Authentication failed (401): Unauthorized");
        assert!(err.is_auth_error());
        assert!(!err.is_transient());
    }
}
