//! store
//!
//! Gateway to the remote content-addressed object store.
//!
//! # Architecture
//!
//! The [`ObjectStore`] trait defines the eight primitive operations the sync
//! pipeline consumes: read/create references, commits, trees, and blobs, plus
//! pull request creation. The pipeline never talks HTTP directly; it is
//! written against the trait, which keeps the tree-reconstruction logic
//! testable without a network.
//!
//! # Modules
//!
//! - `types`: the object model (blobs, trees, commits, references)
//! - `traits`: the `ObjectStore` trait and `StoreError`
//! - [`github`]: GitHub implementation over the Git Data API
//! - [`mock`]: in-memory implementation for deterministic testing

pub mod github;
pub mod mock;
mod traits;
mod types;

pub use traits::{NewPullRequest, ObjectStore, StoreError};
pub use types::{Commit, EntryKind, FileMode, PullRequest, Reference, Tree, TreeEntry};
