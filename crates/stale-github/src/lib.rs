//! Stale-GitHub: GitHub REST transport for the stale sweeper
//!
//! Implements the `stale-tracker` collaborator traits against the GitHub
//! issues API. Pull requests come back from the issues endpoint and are told
//! apart by their `pull_request` field.
//!
//! No retries, no rate-limit handling: a failed call is returned to the
//! caller, which aborts the sweep.

mod client;
mod config;
mod error;
mod wire;

pub use client::GithubClient;
pub use config::{GithubConfig, RepoRef, DEFAULT_API_URL};
pub use error::GithubError;

/// Result type for GitHub transport operations
pub type Result<T> = std::result::Result<T, GithubError>;
