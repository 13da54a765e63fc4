//! Operation budget and per-run bookkeeping.

use chrono::{DateTime, Utc};
use stale_tracker::Item;

/// An external call charged against the operation budget.
///
/// Comment reads are not listed: the cost table prices page fetches,
/// label-event reads and the three writes only, so `has_comments_since`
/// runs free of charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchPage,
    /// Stale label and stale comment, issued together.
    MarkStale,
    /// Close, including the optional close comment.
    Close,
    RemoveLabel,
    FetchLabelEvents,
}

impl Operation {
    pub const fn cost(self) -> i64 {
        match self {
            Operation::MarkStale => 2,
            Operation::FetchPage
            | Operation::Close
            | Operation::RemoveLabel
            | Operation::FetchLabelEvents => 1,
        }
    }
}

/// Mutable state of a single run: the remaining budget and the items touched.
///
/// The budget only ever decreases. It is charged when a call is attempted,
/// before its outcome is known.
#[derive(Debug, Clone)]
pub struct RunCounters {
    run_id: String,
    started_at: DateTime<Utc>,
    operations_limit: i64,
    operations_left: i64,
    staled: Vec<Item>,
    closed: Vec<Item>,
    unstaled: Vec<Item>,
}

impl RunCounters {
    pub fn new(operations_per_run: i64) -> Self {
        RunCounters {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            operations_limit: operations_per_run,
            operations_left: operations_per_run,
            staled: Vec::new(),
            closed: Vec::new(),
            unstaled: Vec::new(),
        }
    }

    /// Charge `op` and return the remaining budget.
    pub fn consume(&mut self, op: Operation) -> i64 {
        self.operations_left -= op.cost();
        self.operations_left
    }

    pub fn is_exhausted(&self) -> bool {
        self.operations_left <= 0
    }

    pub fn operations_left(&self) -> i64 {
        self.operations_left
    }

    pub fn operations_consumed(&self) -> i64 {
        self.operations_limit - self.operations_left
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn record_staled(&mut self, item: &Item) {
        self.staled.push(item.clone());
    }

    pub fn record_closed(&mut self, item: &Item) {
        self.closed.push(item.clone());
    }

    pub fn record_unstaled(&mut self, item: &Item) {
        self.unstaled.push(item.clone());
    }

    pub fn staled(&self) -> &[Item] {
        &self.staled
    }

    pub fn closed(&self) -> &[Item] {
        &self.closed
    }

    /// Items whose stale label was removed after new activity.
    pub fn unstaled(&self) -> &[Item] {
        &self.unstaled
    }
}
