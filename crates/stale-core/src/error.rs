//! Error taxonomy for a sweep.

use stale_tracker::TrackerError;

/// Errors that abort a sweep.
#[derive(Debug, thiserror::Error)]
pub enum StaleError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("tracker call failed: {0}")]
    Tracker(#[from] TrackerError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for sweep operations.
pub type Result<T> = std::result::Result<T, StaleError>;
