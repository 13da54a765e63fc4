//! GitHub REST payloads and their mapping onto the tracker model.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use stale_tracker::{Author, AuthorType, Comment, Item, ItemKind, ItemState, LabelEvent};

#[derive(Debug, Deserialize)]
pub(crate) struct IssueWire {
    number: u64,
    title: String,
    state: String,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    labels: Vec<LabelWire>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelWire {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserWire {
    login: String,
    #[serde(rename = "type")]
    account_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentWire {
    user: Option<UserWire>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventWire {
    event: String,
    #[serde(default)]
    label: Option<LabelWire>,
    created_at: DateTime<Utc>,
}

impl From<IssueWire> for Item {
    fn from(wire: IssueWire) -> Self {
        Item {
            number: wire.number,
            title: wire.title,
            kind: if wire.pull_request.is_some() {
                ItemKind::PullRequest
            } else {
                ItemKind::Issue
            },
            state: if wire.state == "closed" {
                ItemState::Closed
            } else {
                ItemState::Open
            },
            locked: wire.locked,
            labels: wire.labels.into_iter().map(|l| l.name).collect(),
            updated_at: wire.updated_at,
        }
    }
}

impl From<UserWire> for Author {
    fn from(wire: UserWire) -> Self {
        let account_type = match wire.account_type.as_str() {
            "User" => AuthorType::User,
            "Organization" => AuthorType::Organization,
            _ => AuthorType::Bot,
        };
        Author {
            login: wire.login,
            account_type,
        }
    }
}

impl From<CommentWire> for Comment {
    fn from(wire: CommentWire) -> Self {
        // Deleted accounts come back without a user. Nobody is left to revive
        // the item, so "ghost" is not treated as a human.
        let author = wire
            .user
            .map(Author::from)
            .unwrap_or_else(|| Author::bot("ghost"));
        Comment {
            author,
            created_at: wire.created_at,
        }
    }
}

impl From<EventWire> for LabelEvent {
    fn from(wire: EventWire) -> Self {
        LabelEvent {
            event: wire.event,
            label: wire.label.map(|l| l.name),
            created_at: wire.created_at,
        }
    }
}
