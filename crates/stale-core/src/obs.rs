//! Structured narration for sweep decisions.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - Emission functions for every per-item decision point and the page loop
//!
//! Events are emitted at `info!` level unless noted (configurable via `RUST_LOG`).

use chrono::{DateTime, Utc};
use stale_tracker::{Item, Mutation};
use tracing::{debug, info, warn};

use crate::engine::SkipReason;

/// Span tagging everything logged during one sweep with its run id.
///
/// Attach with `tracing::Instrument` so the span survives `.await` points.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("stale.run", run_id = %run_id)
}

pub fn emit_run_started(operations_per_run: i64, dry_run: bool) {
    info!(event = "run.started", operations_per_run, dry_run);
}

pub fn emit_run_finished(staled: usize, closed: usize, unstaled: usize, operations_left: i64) {
    info!(
        event = "run.finished",
        staled = staled,
        closed = closed,
        unstaled = unstaled,
        operations_left = operations_left,
    );
}

pub fn emit_page_fetched(page: u32, items: usize, operations_left: i64) {
    info!(event = "page.fetched", page, items, operations_left);
}

pub fn emit_no_more_items(page: u32) {
    info!(event = "page.empty", page, "No more items found to process. Exiting.");
}

pub fn emit_budget_exhausted(page: u32, operations_left: i64) {
    warn!(
        event = "run.budget_exhausted",
        page,
        operations_left,
        "Reached max number of operations to process. Exiting."
    );
}

pub fn emit_item_found(item: &Item) {
    info!(
        event = "item.found",
        number = item.number,
        kind = %item.kind,
        title = %item.title,
        updated_at = %item.updated_at,
    );
}

pub fn emit_item_skipped(item: &Item, reason: &SkipReason) {
    info!(event = "item.skipped", number = item.number, kind = %item.kind, reason = %reason);
}

pub fn emit_marking_stale(item: &Item) {
    info!(
        event = "item.marking_stale",
        number = item.number,
        kind = %item.kind,
        updated_at = %item.updated_at,
        "Marking stale: last updated too long ago and no stale label"
    );
}

pub fn emit_stale_found(item: &Item) {
    info!(event = "item.stale", number = item.number, kind = %item.kind);
}

pub fn emit_marked_stale_on(item: &Item, marked_stale_on: DateTime<Utc>, from_events: bool) {
    info!(
        event = "item.marked_stale_on",
        number = item.number,
        marked_stale_on = %marked_stale_on,
        from_events,
    );
}

pub fn emit_comment_activity(number: u64, qualifying_comments: usize) {
    info!(event = "item.comments", number, qualifying_comments);
}

pub fn emit_activity(item: &Item, has_comments: bool, has_update: bool) {
    info!(
        event = "item.activity",
        number = item.number,
        has_comments,
        has_update,
    );
}

pub fn emit_unstaled(item: &Item, label: &str) {
    info!(
        event = "item.unstaled",
        number = item.number,
        label = %label,
        "No longer stale. Removing stale label."
    );
}

pub fn emit_close_disabled(item: &Item) {
    debug!(event = "item.close_disabled", number = item.number);
}

pub fn emit_closing(item: &Item) {
    info!(
        event = "item.closing",
        number = item.number,
        kind = %item.kind,
        updated_at = %item.updated_at,
    );
}

pub fn emit_not_closing(item: &Item, has_comments: bool, has_update: bool) {
    info!(
        event = "item.not_closing",
        number = item.number,
        has_comments,
        has_update,
        "Stale item is not old enough to close yet"
    );
}

pub fn emit_mutation_suppressed(number: u64, mutation: &Mutation) {
    info!(event = "mutation.suppressed", number, op = mutation.name(), "dry run");
}
