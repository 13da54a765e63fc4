//! In-memory fake tracker (testing only)
//!
//! Provides `MemoryTracker`, which satisfies every collaborator trait without
//! any network access, records each call it receives, applies mutations to its
//! own item store, and can be told to fail a given kind of call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{TrackerError, TrackerResult};
use crate::model::{Author, Comment, Item, ItemState, LabelEvent, Mutation};
use crate::tracker_traits::*;

/// Login used for comments the fake writes on behalf of the sweeper.
pub const FAKE_BOT_LOGIN: &str = "stale-sweeper[bot]";

/// A call observed by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    FetchPage { page: u32, per_page: u32, only_labels: Option<String> },
    FetchComments { number: u64, since: DateTime<Utc> },
    FetchLabelEvents { number: u64 },
    Mutate { number: u64, mutation: Mutation },
}

/// Which call family an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    FetchPage,
    FetchComments,
    FetchLabelEvents,
    Mutate,
}

impl TrackerCall {
    fn kind(&self) -> CallKind {
        match self {
            TrackerCall::FetchPage { .. } => CallKind::FetchPage,
            TrackerCall::FetchComments { .. } => CallKind::FetchComments,
            TrackerCall::FetchLabelEvents { .. } => CallKind::FetchLabelEvents,
            TrackerCall::Mutate { .. } => CallKind::Mutate,
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    items: Vec<Item>,
    comments: HashMap<u64, Vec<Comment>>,
    events: HashMap<u64, Vec<LabelEvent>>,
    calls: Vec<TrackerCall>,
    fail_on: Option<CallKind>,
}

/// In-memory tracker backed by an ordered item list.
#[derive(Debug)]
pub struct MemoryTracker {
    state: Mutex<TrackerState>,
    clock: DateTime<Utc>,
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTracker {
    pub fn new() -> Self {
        MemoryTracker {
            state: Mutex::new(TrackerState::default()),
            clock: Utc::now(),
        }
    }

    /// Timestamp stamped on events and comments created by mutations.
    pub fn at(mut self, clock: DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_items(self, items: impl IntoIterator<Item = Item>) -> Self {
        self.state.lock().unwrap().items.extend(items);
        self
    }

    pub fn insert_item(&self, item: Item) {
        self.state.lock().unwrap().items.push(item);
    }

    pub fn add_comment(&self, number: u64, author: Author, created_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        state
            .comments
            .entry(number)
            .or_default()
            .push(Comment { author, created_at });
    }

    pub fn add_label_event(&self, number: u64, event: LabelEvent) {
        let mut state = self.state.lock().unwrap();
        state.events.entry(number).or_default().push(event);
    }

    /// Make every subsequent call of `kind` fail.
    pub fn fail_on(&self, kind: CallKind) {
        self.state.lock().unwrap().fail_on = Some(kind);
    }

    pub fn item(&self, number: u64) -> Option<Item> {
        let state = self.state.lock().unwrap();
        state.items.iter().find(|i| i.number == number).cloned()
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Mutations received so far, in order.
    pub fn mutations(&self) -> Vec<(u64, Mutation)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::Mutate { number, mutation } => Some((number, mutation)),
                _ => None,
            })
            .collect()
    }

    pub fn page_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.kind() == CallKind::FetchPage)
            .count()
    }

    fn record(&self, call: TrackerCall) -> TrackerResult<()> {
        let mut state = self.state.lock().unwrap();
        let kind = call.kind();
        state.calls.push(call);
        if state.fail_on == Some(kind) {
            return Err(TrackerError::Injected(format!("{kind:?}")));
        }
        Ok(())
    }
}

fn has_all_labels(item: &Item, filter: &str) -> bool {
    filter
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .all(|wanted| item.labels.iter().any(|l| l.eq_ignore_ascii_case(wanted)))
}

#[async_trait]
impl ItemSource for MemoryTracker {
    async fn fetch_open_items(
        &self,
        page: u32,
        per_page: u32,
        only_labels: Option<&str>,
    ) -> TrackerResult<Vec<Item>> {
        self.record(TrackerCall::FetchPage {
            page,
            per_page,
            only_labels: only_labels.map(str::to_string),
        })?;
        let state = self.state.lock().unwrap();
        let skip = (page.saturating_sub(1) as usize) * per_page as usize;
        Ok(state
            .items
            .iter()
            .filter(|i| i.is_open())
            .filter(|i| only_labels.map(|f| has_all_labels(i, f)).unwrap_or(true))
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ItemHistory for MemoryTracker {
    async fn fetch_comments_since(
        &self,
        number: u64,
        since: DateTime<Utc>,
    ) -> TrackerResult<Vec<Comment>> {
        self.record(TrackerCall::FetchComments { number, since })?;
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .get(&number)
            .map(|comments| {
                comments
                    .iter()
                    .filter(|c| c.created_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_label_events(&self, number: u64) -> TrackerResult<Vec<LabelEvent>> {
        self.record(TrackerCall::FetchLabelEvents { number })?;
        let state = self.state.lock().unwrap();
        Ok(state.events.get(&number).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ItemMutator for MemoryTracker {
    async fn mutate(&self, number: u64, mutation: Mutation) -> TrackerResult<()> {
        self.record(TrackerCall::Mutate {
            number,
            mutation: mutation.clone(),
        })?;
        let clock = self.clock;
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(TrackerError::NotFound { number })?;
        item.updated_at = clock;

        match mutation {
            Mutation::AddComment(_) => {
                state.comments.entry(number).or_default().push(Comment {
                    author: Author::bot(FAKE_BOT_LOGIN),
                    created_at: clock,
                });
            }
            Mutation::AddLabel(label) => {
                if !item.labels.contains(&label) {
                    item.labels.push(label.clone());
                }
                state
                    .events
                    .entry(number)
                    .or_default()
                    .push(LabelEvent::labeled(label, clock));
            }
            Mutation::RemoveLabel(label) => {
                item.labels.retain(|l| l != &label);
                state.events.entry(number).or_default().push(LabelEvent {
                    event: "unlabeled".to_string(),
                    label: Some(label),
                    created_at: clock,
                });
            }
            Mutation::Close => item.state = ItemState::Closed,
        }
        tracing::debug!(number, "fake tracker applied mutation");
        Ok(())
    }
}
