//! Collaborator trait definitions for the stale sweeper
//!
//! These traits define the external capabilities the sweeper consumes:
//! - `ItemSource`: paginated listing of open items
//! - `ItemHistory`: comments and label timeline for one item
//! - `ItemMutator`: writes against one item
//!
//! All traits are async and transport-agnostic. Implementations are
//! stateless request/response services: no retries, no partial application.
//! An in-memory fake is provided for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TrackerResult;
use crate::model::{Comment, Item, LabelEvent, Mutation};

/// Paginated source of open items.
///
/// Guarantees:
/// - Pages are 1-indexed.
/// - Order is stable across pages within one sweep.
/// - An empty page signals the end of data.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch one page of open items, optionally restricted to items carrying
    /// all labels in the comma-separated `only_labels` filter.
    async fn fetch_open_items(
        &self,
        page: u32,
        per_page: u32,
        only_labels: Option<&str>,
    ) -> TrackerResult<Vec<Item>>;
}

/// Read-only history of a single item.
#[async_trait]
pub trait ItemHistory: Send + Sync {
    /// Comments created at or after `since`.
    async fn fetch_comments_since(
        &self,
        number: u64,
        since: DateTime<Utc>,
    ) -> TrackerResult<Vec<Comment>>;

    /// Full event timeline, oldest first.
    async fn fetch_label_events(&self, number: u64) -> TrackerResult<Vec<LabelEvent>>;
}

/// Writes against a single item. Each call fully applies or fails.
#[async_trait]
pub trait ItemMutator: Send + Sync {
    async fn mutate(&self, number: u64, mutation: Mutation) -> TrackerResult<()>;
}

/// Everything the sweeper needs from a tracker.
pub trait IssueTracker: ItemSource + ItemHistory + ItemMutator {}

impl<T> IssueTracker for T where T: ItemSource + ItemHistory + ItemMutator {}
