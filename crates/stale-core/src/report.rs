//! Serializable summary of a finished run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stale_tracker::{Item, ItemKind};

use crate::budget::RunCounters;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub number: u64,
    pub kind: ItemKind,
    pub title: String,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        ItemSummary {
            number: item.number,
            kind: item.kind,
            title: item.title.clone(),
        }
    }
}

/// What a run did, for humans and for CI artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub operations_consumed: i64,
    pub operations_left: i64,
    pub staled: Vec<ItemSummary>,
    pub closed: Vec<ItemSummary>,
    pub unstaled: Vec<ItemSummary>,
}

impl RunReport {
    pub fn from_counters(counters: &RunCounters, dry_run: bool) -> Self {
        let summarize = |items: &[Item]| items.iter().map(ItemSummary::from).collect();
        RunReport {
            run_id: counters.run_id().to_string(),
            started_at: counters.started_at(),
            dry_run,
            operations_consumed: counters.operations_consumed(),
            operations_left: counters.operations_left(),
            staled: summarize(counters.staled()),
            closed: summarize(counters.closed()),
            unstaled: summarize(counters.unstaled()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One line per list, e.g. `staled: #12, #40`.
    pub fn render_text(&self) -> String {
        let line = |name: &str, items: &[ItemSummary]| {
            let numbers: Vec<String> = items.iter().map(|i| format!("#{}", i.number)).collect();
            if numbers.is_empty() {
                format!("{name}: none")
            } else {
                format!("{name}: {}", numbers.join(", "))
            }
        };
        let mode = if self.dry_run { " (dry run)" } else { "" };
        format!(
            "run {}{mode}\n{}\n{}\n{}\noperations: {} used, {} left",
            self.run_id,
            line("staled", &self.staled),
            line("closed", &self.closed),
            line("unstaled", &self.unstaled),
            self.operations_consumed,
            self.operations_left,
        )
    }
}
