//! Run configuration with per-kind settings.

use serde::{Deserialize, Serialize};
use stale_tracker::ItemKind;

use crate::error::{Result, StaleError};

pub const DEFAULT_STALE_LABEL: &str = "Stale";

/// Settings that differ between issues and pull requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindSettings {
    /// Comment posted when marking stale. Empty opts this kind out entirely.
    pub stale_message: String,
    pub stale_label: String,
    /// Raw comma-separated list of labels that exempt an item.
    pub exempt_labels: String,
    /// Comment posted right before closing. Empty posts nothing.
    pub close_message: String,
}

impl Default for KindSettings {
    fn default() -> Self {
        KindSettings {
            stale_message: String::new(),
            stale_label: DEFAULT_STALE_LABEL.to_string(),
            exempt_labels: String::new(),
            close_message: String::new(),
        }
    }
}

/// Immutable input to a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfiguration {
    pub issue: KindSettings,
    pub pull_request: KindSettings,
    /// Idle days before an item is marked stale. Negative disables marking.
    pub days_before_stale: f64,
    /// Days a stale item waits before closing. Negative disables closing.
    pub days_before_close: f64,
    /// Label filter forwarded verbatim to the item source.
    pub only_labels: Option<String>,
    /// Maximum external calls per run.
    pub operations_per_run: i64,
    pub remove_stale_when_updated: bool,
    /// Decide and record everything, but issue no writes.
    pub dry_run: bool,
    /// Login the sweeper acts as; its comments never count as activity.
    pub actor: String,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            issue: KindSettings::default(),
            pull_request: KindSettings::default(),
            days_before_stale: 60.0,
            days_before_close: 7.0,
            only_labels: None,
            operations_per_run: 30,
            remove_stale_when_updated: true,
            dry_run: false,
            actor: String::new(),
        }
    }
}

impl RunConfiguration {
    pub fn settings_for(&self, kind: ItemKind) -> &KindSettings {
        match kind {
            ItemKind::Issue => &self.issue,
            ItemKind::PullRequest => &self.pull_request,
        }
    }

    /// Whether new stale transitions may happen this run.
    pub fn marks_stale(&self) -> bool {
        self.days_before_stale >= 0.0
    }

    pub fn closes_stale(&self) -> bool {
        self.days_before_close >= 0.0
    }

    /// Age, in days, past which a stale item with no activity is closed.
    pub fn close_window_days(&self) -> f64 {
        self.days_before_close + self.days_before_stale.max(0.0)
    }

    /// The filter to forward to the item source, if any.
    pub fn label_filter(&self) -> Option<&str> {
        self.only_labels.as_deref().filter(|f| !f.trim().is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        for (kind, settings) in [
            (ItemKind::Issue, &self.issue),
            (ItemKind::PullRequest, &self.pull_request),
        ] {
            if settings.stale_label.trim().is_empty() {
                return Err(StaleError::Config(format!(
                    "stale label for {kind} must not be empty"
                )));
            }
        }
        if !self.days_before_stale.is_finite() || !self.days_before_close.is_finite() {
            return Err(StaleError::Config(
                "day thresholds must be finite numbers".to_string(),
            ));
        }
        if self.operations_per_run <= 0 {
            return Err(StaleError::Config(format!(
                "operations per run must be positive, got {}",
                self.operations_per_run
            )));
        }
        Ok(())
    }
}
