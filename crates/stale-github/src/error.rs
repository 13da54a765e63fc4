//! Error types for the GitHub transport

use stale_tracker::TrackerError;
use thiserror::Error;

/// Errors raised while talking to GitHub
#[derive(Error, Debug)]
pub enum GithubError {
    /// Repository slug is not `owner/name`
    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    /// API base URL could not be parsed
    #[error("invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    /// Required environment variable missing
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// Token contains characters not allowed in a header
    #[error("invalid authorization header")]
    InvalidToken,

    /// Request could not be sent or the response not read
    #[error("HTTP error: {0}")]
    Http(String),

    /// GitHub answered with a non-success status
    #[error("GitHub {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("failed to decode GitHub {operation}: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Http(err.to_string())
    }
}

impl From<GithubError> for TrackerError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Status { status, body, .. } => TrackerError::Api {
                status,
                message: body,
            },
            GithubError::Decode { .. } => TrackerError::Decode(err.to_string()),
            other => TrackerError::Transport(other.to_string()),
        }
    }
}
