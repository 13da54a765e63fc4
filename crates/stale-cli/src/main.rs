//! Stale sweeper CLI
//!
//! The `stale` command sweeps a repository's open issues and pull requests
//! once: items idle for too long are labeled stale, stale items that see no
//! activity are closed, and stale items that came back to life are unlabeled.
//!
//! Every flag can also be supplied through the environment, so the binary
//! drops into a scheduled CI job with nothing but `GITHUB_TOKEN` and
//! `GITHUB_REPOSITORY` set.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use stale_core::{IssueTracker, KindSettings, RunConfiguration, RunReport, StaleProcessor};
use stale_github::{GithubClient, GithubConfig, DEFAULT_API_URL};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "stale")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mark idle issues and pull requests stale, then close them", long_about = None)]
struct Cli {
    /// Repository to sweep, as `owner/name`
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// Token used to authenticate against the API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// REST API base URL (set for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Login the sweeper acts as; its own comments are not activity
    #[arg(long, env = "GITHUB_ACTOR", default_value = "")]
    actor: String,

    /// Comment posted when an issue is marked stale (empty skips issues)
    #[arg(long, env = "STALE_ISSUE_MESSAGE", default_value = "")]
    stale_issue_message: String,

    /// Comment posted when a pull request is marked stale (empty skips pull requests)
    #[arg(long, env = "STALE_PR_MESSAGE", default_value = "")]
    stale_pr_message: String,

    /// Comment posted before closing a stale issue
    #[arg(long, env = "STALE_CLOSE_ISSUE_MESSAGE", default_value = "")]
    close_issue_message: String,

    /// Comment posted before closing a stale pull request
    #[arg(long, env = "STALE_CLOSE_PR_MESSAGE", default_value = "")]
    close_pr_message: String,

    /// Label applied to stale issues
    #[arg(long, env = "STALE_ISSUE_LABEL", default_value = "Stale")]
    stale_issue_label: String,

    /// Label applied to stale pull requests
    #[arg(long, env = "STALE_PR_LABEL", default_value = "Stale")]
    stale_pr_label: String,

    /// Comma-separated labels that exempt an issue
    #[arg(long, env = "STALE_EXEMPT_ISSUE_LABELS", default_value = "")]
    exempt_issue_labels: String,

    /// Comma-separated labels that exempt a pull request
    #[arg(long, env = "STALE_EXEMPT_PR_LABELS", default_value = "")]
    exempt_pr_labels: String,

    /// Idle days before an item is marked stale (negative disables marking)
    #[arg(long, env = "STALE_DAYS_BEFORE_STALE", default_value_t = 60.0, allow_negative_numbers = true)]
    days_before_stale: f64,

    /// Days a stale item waits before it is closed (negative disables closing)
    #[arg(long, env = "STALE_DAYS_BEFORE_CLOSE", default_value_t = 7.0, allow_negative_numbers = true)]
    days_before_close: f64,

    /// Only sweep items carrying all of these comma-separated labels
    #[arg(long, env = "STALE_ONLY_LABELS")]
    only_labels: Option<String>,

    /// Maximum number of API calls per run
    #[arg(long, env = "STALE_OPERATIONS_PER_RUN", default_value_t = 30)]
    operations_per_run: i64,

    /// Remove the stale label when a stale item sees activity
    #[arg(
        long,
        env = "STALE_REMOVE_STALE_WHEN_UPDATED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    remove_stale_when_updated: bool,

    /// Decide everything but issue no writes
    #[arg(long, env = "STALE_DRY_RUN")]
    dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long, env = "STALE_REPORT")]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn run_configuration(&self) -> RunConfiguration {
        RunConfiguration {
            issue: KindSettings {
                stale_message: self.stale_issue_message.clone(),
                stale_label: self.stale_issue_label.clone(),
                exempt_labels: self.exempt_issue_labels.clone(),
                close_message: self.close_issue_message.clone(),
            },
            pull_request: KindSettings {
                stale_message: self.stale_pr_message.clone(),
                stale_label: self.stale_pr_label.clone(),
                exempt_labels: self.exempt_pr_labels.clone(),
                close_message: self.close_pr_message.clone(),
            },
            days_before_stale: self.days_before_stale,
            days_before_close: self.days_before_close,
            only_labels: self.only_labels.clone().filter(|l| !l.trim().is_empty()),
            operations_per_run: self.operations_per_run,
            remove_stale_when_updated: self.remove_stale_when_updated,
            dry_run: self.dry_run,
            actor: self.actor.clone(),
        }
    }

    fn github_config(&self) -> Result<GithubConfig> {
        let mut config = GithubConfig::new(&self.repo)
            .with_context(|| format!("Invalid repository: {}", self.repo))?
            .with_api_url(&self.api_url);
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    stale_core::init_tracing(cli.json, level);

    let config = cli.run_configuration();
    let github = cli.github_config()?;
    info!(repository = %github.repository, dry_run = config.dry_run, "starting sweep");
    if github.token.is_none() && !config.dry_run {
        warn!("no token configured; write calls will be rejected");
    }

    let client = GithubClient::new(github).context("Failed to build GitHub client")?;
    let report = cmd_sweep(Arc::new(client), config).await?;

    println!("{}", report.render_text());
    if let Some(path) = &cli.report {
        write_report(path, &report)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// Run one sweep against `tracker` and summarize it.
async fn cmd_sweep(tracker: Arc<dyn IssueTracker>, config: RunConfiguration) -> Result<RunReport> {
    let dry_run = config.dry_run;
    let processor =
        StaleProcessor::new(tracker, config).context("Invalid sweep configuration")?;
    let counters = processor.run().await.context("Sweep aborted")?;
    Ok(RunReport::from_counters(&counters, dry_run))
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {:?}", parent))?;
    }
    let json = report.to_json().context("Failed to serialize run report")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))?;
    Ok(())
}
