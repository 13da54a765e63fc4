//! Decision engine: evaluates one item against the stale/close state machine.
//!
//! ```text
//! Active ──(idle > days_before_stale)──▶ Staled ──(human comment)──▶ Unstaled
//!                                          │
//!                                          └──(no activity for days_before_close)──▶ Closed
//! ```
//!
//! When an item is marked stale its in-memory `updated_at` is rewritten to
//! `now - days_before_stale`. The close check in the same pass, and the label
//! timestamp fallback, rely on that rewrite: grace is counted from when the
//! item crossed the stale boundary, not from when the sweep noticed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stale_tracker::{IssueTracker, Item, ItemState, Mutation};

use crate::budget::{Operation, RunCounters};
use crate::config::{KindSettings, RunConfiguration};
use crate::error::Result;
use crate::obs;
use crate::predicates::{
    days_ago, is_label_equal, is_labeled, parse_comma_separated, updated_since,
};

/// Why an item was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "label", rename_all = "snake_case")]
pub enum SkipReason {
    EmptyStaleMessage,
    Closed,
    Locked,
    Exempt(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyStaleMessage => write!(f, "empty stale message"),
            SkipReason::Closed => write!(f, "closed"),
            SkipReason::Locked => write!(f, "locked"),
            SkipReason::Exempt(label) => write!(f, "exempt label '{label}'"),
        }
    }
}

/// What happened to one item during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub skipped: Option<SkipReason>,
    pub marked_stale: bool,
    pub unstaled: bool,
    pub closed: bool,
}

impl ItemOutcome {
    fn skipped(reason: SkipReason) -> Self {
        ItemOutcome {
            skipped: Some(reason),
            ..Default::default()
        }
    }
}

/// Applies the stale/close policy to items fetched from a tracker.
pub struct StaleProcessor {
    pub(crate) tracker: Arc<dyn IssueTracker>,
    pub(crate) config: RunConfiguration,
    now: DateTime<Utc>,
}

impl StaleProcessor {
    /// Validate `config` and pin the evaluation clock to the current time.
    pub fn new(tracker: Arc<dyn IssueTracker>, config: RunConfiguration) -> Result<Self> {
        config.validate()?;
        Ok(StaleProcessor {
            tracker,
            config,
            now: Utc::now(),
        })
    }

    /// Evaluate every item as of `now`.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Evaluate one item and issue whatever mutations its new state needs.
    ///
    /// Skipped items cost nothing. Any tracker failure is returned as-is;
    /// mutations already issued stay applied.
    pub async fn process_item(
        &self,
        counters: &mut RunCounters,
        mut item: Item,
    ) -> Result<ItemOutcome> {
        obs::emit_item_found(&item);

        let settings = self.config.settings_for(item.kind);
        if let Some(reason) = skip_reason(&item, settings) {
            obs::emit_item_skipped(&item, &reason);
            return Ok(ItemOutcome::skipped(reason));
        }

        let mut outcome = ItemOutcome::default();
        let mut is_stale = is_labeled(&item, &settings.stale_label);
        let should_be_stale =
            !updated_since(item.updated_at, self.config.days_before_stale, self.now);

        if !is_stale && should_be_stale && self.config.marks_stale() {
            obs::emit_marking_stale(&item);
            self.mark_stale(counters, &mut item, settings).await?;
            outcome.marked_stale = true;
            is_stale = true;
        }

        if is_stale {
            obs::emit_stale_found(&item);
            self.process_stale_item(counters, &mut item, settings, &mut outcome)
                .await?;
        }

        Ok(outcome)
    }

    async fn process_stale_item(
        &self,
        counters: &mut RunCounters,
        item: &mut Item,
        settings: &KindSettings,
        outcome: &mut ItemOutcome,
    ) -> Result<()> {
        let mut labeled_at = self
            .label_applied_at(counters, item, &settings.stale_label)
            .await?;
        if outcome.marked_stale && self.config.dry_run {
            // The suppressed label write would have been recorded now.
            labeled_at = Some(self.now);
        }
        let marked_stale_on = labeled_at.unwrap_or(item.updated_at);
        obs::emit_marked_stale_on(item, marked_stale_on, labeled_at.is_some());

        let has_comments = self.has_comments_since(item, Some(marked_stale_on)).await?;
        let has_update = updated_since(item.updated_at, self.config.close_window_days(), self.now);
        obs::emit_activity(item, has_comments, has_update);

        if self.config.remove_stale_when_updated && has_comments {
            self.remove_stale_label(counters, item, &settings.stale_label)
                .await?;
            outcome.unstaled = true;
        }

        if !self.config.closes_stale() {
            obs::emit_close_disabled(item);
            return Ok(());
        }

        if !has_comments && !has_update {
            obs::emit_closing(item);
            self.close(counters, item, settings).await?;
            outcome.closed = true;
        } else {
            obs::emit_not_closing(item, has_comments, has_update);
        }
        Ok(())
    }

    async fn mark_stale(
        &self,
        counters: &mut RunCounters,
        item: &mut Item,
        settings: &KindSettings,
    ) -> Result<()> {
        counters.consume(Operation::MarkStale);
        item.labels.push(settings.stale_label.clone());
        item.updated_at = days_ago(self.now, self.config.days_before_stale);
        counters.record_staled(item);

        self.apply(item.number, Mutation::AddComment(settings.stale_message.clone()))
            .await?;
        self.apply(item.number, Mutation::AddLabel(settings.stale_label.clone()))
            .await
    }

    async fn remove_stale_label(
        &self,
        counters: &mut RunCounters,
        item: &mut Item,
        stale_label: &str,
    ) -> Result<()> {
        counters.consume(Operation::RemoveLabel);
        // Remove the label under the exact name the tracker knows it by.
        let existing = item
            .labels
            .iter()
            .find(|l| is_label_equal(l, stale_label))
            .cloned()
            .unwrap_or_else(|| stale_label.to_string());
        item.labels.retain(|l| !is_label_equal(l, stale_label));
        counters.record_unstaled(item);
        obs::emit_unstaled(item, &existing);

        self.apply(item.number, Mutation::RemoveLabel(existing)).await
    }

    async fn close(
        &self,
        counters: &mut RunCounters,
        item: &mut Item,
        settings: &KindSettings,
    ) -> Result<()> {
        counters.consume(Operation::Close);
        item.state = ItemState::Closed;
        counters.record_closed(item);

        if !settings.close_message.is_empty() {
            self.apply(item.number, Mutation::AddComment(settings.close_message.clone()))
                .await?;
        }
        self.apply(item.number, Mutation::Close).await
    }

    /// When `label` was most recently applied, per the item's event timeline.
    pub async fn label_applied_at(
        &self,
        counters: &mut RunCounters,
        item: &Item,
        label: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        counters.consume(Operation::FetchLabelEvents);
        let events = self.tracker.fetch_label_events(item.number).await?;
        Ok(events
            .iter()
            .rev()
            .find(|e| {
                e.is_labeled()
                    && e.label
                        .as_deref()
                        .map(|l| is_label_equal(l, label))
                        .unwrap_or(false)
            })
            .map(|e| e.created_at))
    }

    /// Whether a human other than the sweeper's actor commented since `since`.
    ///
    /// An unknown `since` counts as activity so that nothing is closed on a
    /// guess.
    pub async fn has_comments_since(
        &self,
        item: &Item,
        since: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let Some(since) = since else {
            return Ok(true);
        };
        let comments = self.tracker.fetch_comments_since(item.number, since).await?;
        let qualifying = comments
            .iter()
            .filter(|c| c.author.is_human() && c.author.login != self.config.actor)
            .count();
        obs::emit_comment_activity(item.number, qualifying);
        Ok(qualifying > 0)
    }

    async fn apply(&self, number: u64, mutation: Mutation) -> Result<()> {
        if self.config.dry_run {
            obs::emit_mutation_suppressed(number, &mutation);
            return Ok(());
        }
        self.tracker.mutate(number, mutation).await?;
        Ok(())
    }
}

fn skip_reason(item: &Item, settings: &KindSettings) -> Option<SkipReason> {
    if settings.stale_message.is_empty() {
        return Some(SkipReason::EmptyStaleMessage);
    }
    if !item.is_open() {
        return Some(SkipReason::Closed);
    }
    if item.locked {
        return Some(SkipReason::Locked);
    }
    parse_comma_separated(&settings.exempt_labels)
        .into_iter()
        .find(|exempt| is_labeled(item, exempt))
        .map(SkipReason::Exempt)
}
