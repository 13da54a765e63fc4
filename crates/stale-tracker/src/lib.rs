//! Stale-Tracker: issue tracker contracts for the stale sweeper
//!
//! This crate describes what the sweeper needs from an issue tracker and
//! nothing more. Concrete transports (GitHub REST, in-memory fakes) implement
//! the traits in [`tracker_traits`].
//!
//! ## Layer 0 - Data/Collaborators
//!
//! Focus: a unified item model and stateless request/response capabilities.
//!
//! ## Key Components
//!
//! - `Item`: an issue or pull request, discriminated by `ItemKind`
//! - `ItemSource` / `ItemHistory` / `ItemMutator`: the external capabilities
//! - `MemoryTracker`: in-memory fake for tests

mod error;
pub mod fakes;
mod model;
pub mod tracker_traits;

pub use error::{TrackerError, TrackerResult};
pub use model::{Author, AuthorType, Comment, Item, ItemKind, ItemState, LabelEvent, Mutation};
pub use tracker_traits::{IssueTracker, ItemHistory, ItemMutator, ItemSource};
