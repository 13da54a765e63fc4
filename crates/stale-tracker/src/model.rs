//! Item model shared by every tracker transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminant for the unified item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    /// Short name used in log narration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pr",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open/closed state of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Open,
    Closed,
}

/// An issue or pull request as seen by the sweeper.
///
/// `updated_at` and `labels` are mutated in place during evaluation so the
/// close check in the same pass sees the post-transition view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub number: u64,
    pub title: String,
    pub kind: ItemKind,
    pub state: ItemState,
    pub locked: bool,
    pub labels: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Open, unlocked, unlabelled issue.
    pub fn new(number: u64, title: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Item {
            number,
            title: title.into(),
            kind: ItemKind::Issue,
            state: ItemState::Open,
            locked: false,
            labels: Vec::new(),
            updated_at,
        }
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn closed(mut self) -> Self {
        self.state = ItemState::Closed;
        self
    }

    pub fn is_open(&self) -> bool {
        self.state == ItemState::Open
    }
}

/// Account type of a comment author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorType {
    User,
    Bot,
    Organization,
}

/// Who wrote a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub login: String,
    pub account_type: AuthorType,
}

impl Author {
    pub fn user(login: impl Into<String>) -> Self {
        Author {
            login: login.into(),
            account_type: AuthorType::User,
        }
    }

    pub fn bot(login: impl Into<String>) -> Self {
        Author {
            login: login.into(),
            account_type: AuthorType::Bot,
        }
    }

    /// Whether the account belongs to a person rather than an automation.
    pub fn is_human(&self) -> bool {
        self.account_type == AuthorType::User
    }
}

/// A comment on an item. Only the author matters to the sweeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

/// One entry of an item's event timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEvent {
    /// Event kind as reported by the tracker ("labeled", "unlabeled", ...)
    pub event: String,
    /// Label involved, if the event concerns a label
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LabelEvent {
    pub const LABELED: &'static str = "labeled";

    pub fn labeled(label: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        LabelEvent {
            event: Self::LABELED.to_string(),
            label: Some(label.into()),
            created_at,
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.event == Self::LABELED
    }
}

/// A write against a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Mutation {
    AddComment(String),
    AddLabel(String),
    RemoveLabel(String),
    Close,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddComment(_) => "add_comment",
            Mutation::AddLabel(_) => "add_label",
            Mutation::RemoveLabel(_) => "remove_label",
            Mutation::Close => "close",
        }
    }
}
