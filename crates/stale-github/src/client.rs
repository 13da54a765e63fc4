//! GitHub issues API client
//!
//! Provides the transport behind `ItemSource`, `ItemHistory` and
//! `ItemMutator`. Every method issues plain requests; errors are mapped to
//! `TrackerError` at the trait boundary.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use stale_tracker::{
    Comment, Item, ItemHistory, ItemMutator, ItemSource, LabelEvent, Mutation, TrackerResult,
};
use tracing::debug;

use crate::config::GithubConfig;
use crate::error::GithubError;
use crate::wire::{CommentWire, EventWire, IssueWire};
use crate::Result;

/// Page size used when walking comment and event lists.
const HISTORY_PAGE_SIZE: usize = 100;

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 800;

/// GitHub REST client bound to one repository
#[derive(Debug, Clone)]
pub struct GithubClient {
    config: GithubConfig,
    base: Url,
    http: reqwest::Client,
}

impl GithubClient {
    /// Create a new GitHub client
    pub fn new(config: GithubConfig) -> Result<Self> {
        let base = Url::parse(&config.api_url).map_err(|e| GithubError::InvalidApiUrl {
            url: config.api_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|_| GithubError::InvalidToken)?,
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| GithubError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(GithubClient { config, base, http })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GithubConfig::from_env()?)
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// `{base}/repos/{owner}/{name}/issues/{segments...}`, each segment
    /// percent-encoded.
    fn issues_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(
                [
                    "repos",
                    self.config.repository.owner.as_str(),
                    self.config.repository.name.as_str(),
                    "issues",
                ]
                .iter()
                .chain(segments.iter()),
            );
        }
        url
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GithubError::Status {
            operation,
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(operation, request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GithubError::Decode {
            operation,
            reason: e.to_string(),
        })
    }

    /// Fetch every page of a history listing.
    async fn get_all<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
        extra_query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut page = 1u32;
        let mut rows = Vec::new();
        loop {
            let request = self
                .http
                .get(url.clone())
                .query(extra_query)
                .query(&[
                    ("per_page", HISTORY_PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                ]);
            let chunk: Vec<T> = self.get_json(operation, request).await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < HISTORY_PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(rows)
    }

    pub async fn list_open_issues(
        &self,
        page: u32,
        per_page: u32,
        labels: Option<&str>,
    ) -> Result<Vec<Item>> {
        let mut request = self.http.get(self.issues_url(&[])).query(&[
            ("state", "open".to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ]);
        if let Some(labels) = labels {
            request = request.query(&[("labels", labels)]);
        }
        let rows: Vec<IssueWire> = self.get_json("list issues", request).await?;
        debug!(page, count = rows.len(), "listed open issues");
        Ok(rows.into_iter().map(Item::from).collect())
    }

    pub async fn list_comments_since(
        &self,
        number: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>> {
        let number = number.to_string();
        let url = self.issues_url(&[number.as_str(), "comments"]);
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let rows: Vec<CommentWire> = self
            .get_all("list comments", url, &[("since", since)])
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    pub async fn list_events(&self, number: u64) -> Result<Vec<LabelEvent>> {
        let number = number.to_string();
        let url = self.issues_url(&[number.as_str(), "events"]);
        let rows: Vec<EventWire> = self.get_all("list events", url, &[]).await?;
        Ok(rows.into_iter().map(LabelEvent::from).collect())
    }

    pub async fn apply(&self, number: u64, mutation: &Mutation) -> Result<()> {
        let number = number.to_string();
        let (operation, request) = match mutation {
            Mutation::AddComment(body) => (
                "create comment",
                self.http
                    .post(self.issues_url(&[number.as_str(), "comments"]))
                    .json(&json!({ "body": body })),
            ),
            Mutation::AddLabel(label) => (
                "add label",
                self.http
                    .post(self.issues_url(&[number.as_str(), "labels"]))
                    .json(&json!({ "labels": [label] })),
            ),
            Mutation::RemoveLabel(label) => (
                "remove label",
                self.http
                    .delete(self.issues_url(&[number.as_str(), "labels", label.as_str()])),
            ),
            Mutation::Close => (
                "close issue",
                self.http
                    .patch(self.issues_url(&[number.as_str()]))
                    .json(&json!({ "state": "closed" })),
            ),
        };
        self.send(operation, request).await?;
        debug!(number = %number, op = mutation.name(), "applied mutation");
        Ok(())
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl ItemSource for GithubClient {
    async fn fetch_open_items(
        &self,
        page: u32,
        per_page: u32,
        only_labels: Option<&str>,
    ) -> TrackerResult<Vec<Item>> {
        Ok(self.list_open_issues(page, per_page, only_labels).await?)
    }
}

#[async_trait]
impl ItemHistory for GithubClient {
    async fn fetch_comments_since(
        &self,
        number: u64,
        since: DateTime<Utc>,
    ) -> TrackerResult<Vec<Comment>> {
        Ok(self.list_comments_since(number, since).await?)
    }

    async fn fetch_label_events(&self, number: u64) -> TrackerResult<Vec<LabelEvent>> {
        Ok(self.list_events(number).await?)
    }
}

#[async_trait]
impl ItemMutator for GithubClient {
    async fn mutate(&self, number: u64, mutation: Mutation) -> TrackerResult<()> {
        Ok(self.apply(number, &mutation).await?)
    }
}
