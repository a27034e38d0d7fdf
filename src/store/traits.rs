//! store::traits
//!
//! ObjectStore trait definition for the remote content-addressed store.
//!
//! # Design
//!
//! The `ObjectStore` trait is async because every operation involves network
//! I/O. All methods return `Result` and the pipeline fails fast on the first
//! error: blobs, trees, and commits are write-once and content-addressed, so
//! objects created before a failure are inert orphans and re-running a sync
//! is always safe.
//!
//! Two error conditions are distinguished because callers recover from them:
//! - `NotFound` on a reference read (branch auto-create flow)
//! - `AlreadyExists` on pull request creation (idempotent re-sync)
//!
//! Everything else propagates verbatim.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Commit, PullRequest, Reference, Tree, TreeEntry};

/// Errors from object store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested object or reference was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource already exists (pull request duplicate).
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Request to create a pull request.
#[derive(Debug, Clone)]
pub struct NewPullRequest {
    /// Head branch name (the branch with changes)
    pub head: String,
    /// Base branch name (the branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
}

/// The gateway to a remote content-addressed, versioned tree store.
///
/// Blobs, trees, and commits are immutable and identified by content hash;
/// creating identical content yields the same hash with no duplication.
/// Branch references are the single mutation point and are only ever
/// advanced after the commit they point at exists.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get the store name (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// Read a reference, e.g. `heads/main`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the reference does not exist, a recoverable condition
    /// for callers that create the branch on demand.
    async fn get_reference(&self, ref_name: &str) -> Result<Reference, StoreError>;

    /// Create a reference pointing at an existing commit.
    async fn create_reference(&self, ref_name: &str, sha: &str) -> Result<Reference, StoreError>;

    /// Advance an existing reference to a new commit.
    async fn update_reference(&self, ref_name: &str, sha: &str) -> Result<Reference, StoreError>;

    /// Read a commit object.
    async fn get_commit(&self, sha: &str) -> Result<Commit, StoreError>;

    /// Create a commit object pointing at a root tree.
    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<Commit, StoreError>;

    /// Read a tree object.
    async fn get_tree(&self, sha: &str) -> Result<Tree, StoreError>;

    /// Create a tree from a canonical entry set.
    ///
    /// Two calls with entry sets identical by path/mode/type/sha return the
    /// same hash.
    async fn create_tree(&self, entries: &[TreeEntry]) -> Result<Tree, StoreError>;

    /// Create a blob from raw bytes, returning its content hash.
    async fn create_blob(&self, content: &[u8]) -> Result<String, StoreError>;

    /// Create a pull request.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if an open PR for the same head/base pair exists,
    /// a recoverable condition for idempotent re-syncs.
    async fn create_pull_request(&self, request: NewPullRequest)
        -> Result<PullRequest, StoreError>;
}
