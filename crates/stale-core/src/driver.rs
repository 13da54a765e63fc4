//! Batch driver: walks the item source page by page under the operation budget.

use tracing::Instrument;

use crate::budget::{Operation, RunCounters};
use crate::engine::StaleProcessor;
use crate::error::Result;
use crate::obs;

/// Items requested per page.
pub const PAGE_SIZE: u32 = 100;

impl StaleProcessor {
    /// Sweep all open items with a fresh budget of `operations_per_run`.
    pub async fn run(&self) -> Result<RunCounters> {
        self.run_with(RunCounters::new(self.config.operations_per_run))
            .await
    }

    /// Sweep all open items, charging `counters`.
    ///
    /// Stops on an empty page, or after a page during which the budget ran
    /// out. A page already fetched is always evaluated to the end; the budget
    /// is only checked between pages.
    pub async fn run_with(&self, counters: RunCounters) -> Result<RunCounters> {
        let span = obs::run_span(counters.run_id());
        self.sweep(counters).instrument(span).await
    }

    async fn sweep(&self, mut counters: RunCounters) -> Result<RunCounters> {
        obs::emit_run_started(counters.operations_left(), self.config.dry_run);

        let mut page = 1u32;
        loop {
            counters.consume(Operation::FetchPage);
            let items = self
                .tracker
                .fetch_open_items(page, PAGE_SIZE, self.config.label_filter())
                .await?;
            obs::emit_page_fetched(page, items.len(), counters.operations_left());

            if items.is_empty() {
                obs::emit_no_more_items(page);
                break;
            }

            for item in items {
                self.process_item(&mut counters, item).await?;
            }

            if counters.is_exhausted() {
                obs::emit_budget_exhausted(page, counters.operations_left());
                break;
            }
            page += 1;
        }

        obs::emit_run_finished(
            counters.staled().len(),
            counters.closed().len(),
            counters.unstaled().len(),
            counters.operations_left(),
        );
        Ok(counters)
    }
}
