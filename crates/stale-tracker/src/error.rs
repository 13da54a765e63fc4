//! Error types for tracker collaborators

use thiserror::Error;

/// Errors surfaced by a tracker transport.
///
/// Any of these aborts the sweep that triggered it; transports do not retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The request never produced a response
    #[error("tracker transport failed: {0}")]
    Transport(String),

    /// The tracker answered with a non-success status
    #[error("tracker API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("failed to decode tracker response: {0}")]
    Decode(String),

    /// The referenced item does not exist
    #[error("item #{number} not found")]
    NotFound { number: u64 },

    /// Failure injected by a test fake
    #[error("injected failure: {0}")]
    Injected(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Decode(err.to_string())
    }
}

/// Result type for tracker operations
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = TrackerError::Api {
            status: 403,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "tracker API returned 403: rate limited");
    }

    #[test]
    fn serde_errors_map_to_decode() {
        let err: TrackerError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, TrackerError::Decode(_)));
    }
}
