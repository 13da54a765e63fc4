//! Stale Core Library
//!
//! Decides, item by item, whether an open issue or pull request is stale and
//! whether a stale item has waited long enough to be closed, then drives that
//! decision across a paginated item source under a per-run operation budget.

pub mod budget;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod obs;
pub mod predicates;
pub mod report;
pub mod telemetry;

pub use budget::{Operation, RunCounters};
pub use config::{KindSettings, RunConfiguration};
pub use driver::PAGE_SIZE;
pub use engine::{ItemOutcome, SkipReason, StaleProcessor};
pub use error::{Result, StaleError};
pub use predicates::{
    clean_label, days_ago, is_label_equal, is_labeled, parse_comma_separated, updated_since,
    MILLIS_PER_DAY,
};
pub use report::{ItemSummary, RunReport};
pub use telemetry::init_tracing;

pub use stale_tracker::{
    Author, Comment, IssueTracker, Item, ItemKind, ItemState, LabelEvent, Mutation, TrackerError,
};
