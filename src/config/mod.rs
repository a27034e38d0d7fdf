//! config
//!
//! Typed sync configuration.
//!
//! # Design
//!
//! Required fields are taken by the constructor, defaults (branch and base
//! branch `master`) are applied once at construction, and [`SyncOptions::validate`]
//! rejects missing values and contradictory flag combinations before any
//! network call is made.
//!
//! The credential is deliberately absent: it binds to the store client at
//! construction (see [`crate::store::github::GitHubStore`]), so options can
//! be logged and passed around freely.
//!
//! # Example
//!
//! ```
//! use canopy::config::SyncOptions;
//!
//! let options = SyncOptions::new("octocat", "site", "./public", "assets", "Publish assets")
//!     .branch("deploy")
//!     .create_branch(true)
//!     .preserve_repo_files(true);
//!
//! assert!(options.validate().is_ok());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Default branch and base branch name.
const DEFAULT_BRANCH: &str = "master";

/// Errors from option validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required option is empty.
    #[error("missing required option: {0}")]
    MissingOption(&'static str),

    /// Branch and base branch are the same while an operation between them
    /// was requested.
    #[error("branch and base branch are both '{0}'; creating the branch or a pull request from itself is contradictory")]
    BranchConflict(String),
}

/// Options accepted by the sync entry point.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Repository owner (user or organization).
    pub user: String,
    /// Repository name.
    pub repo: String,
    /// Local flat directory to read.
    pub local_path: PathBuf,
    /// Slash-separated target path inside the store.
    pub repo_path: String,
    /// Commit message; its first line becomes the PR title.
    pub message: String,
    /// Target branch.
    pub branch: String,
    /// Base for branch creation and PR base.
    pub base_branch: String,
    /// Create `branch` from `base_branch` if absent.
    pub create_branch: bool,
    /// Open a PR from `branch` to `base_branch` after syncing.
    pub create_pull_request: bool,
    /// Additive merge instead of whole-directory replace at `repo_path`.
    pub preserve_repo_files: bool,
    /// Enable debug trace output.
    pub debug: bool,
    /// Minimal output.
    pub quiet: bool,
}

impl SyncOptions {
    /// Create options from the required fields, with defaults applied.
    pub fn new(
        user: impl Into<String>,
        repo: impl Into<String>,
        local_path: impl Into<PathBuf>,
        repo_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            repo: repo.into(),
            local_path: local_path.into(),
            repo_path: repo_path.into(),
            message: message.into(),
            branch: DEFAULT_BRANCH.to_string(),
            base_branch: DEFAULT_BRANCH.to_string(),
            create_branch: false,
            create_pull_request: false,
            preserve_repo_files: false,
            debug: false,
            quiet: false,
        }
    }

    /// Set the target branch.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the base branch.
    pub fn base_branch(mut self, base_branch: impl Into<String>) -> Self {
        self.base_branch = base_branch.into();
        self
    }

    /// Create the branch from the base branch if it does not exist.
    pub fn create_branch(mut self, create: bool) -> Self {
        self.create_branch = create;
        self
    }

    /// Open a pull request after syncing.
    pub fn create_pull_request(mut self, create: bool) -> Self {
        self.create_pull_request = create;
        self
    }

    /// Keep existing remote files that are absent locally.
    pub fn preserve_repo_files(mut self, preserve: bool) -> Self {
        self.preserve_repo_files = preserve;
        self
    }

    /// Enable debug trace output.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Minimal output.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Pre-flight validation; runs before any I/O.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingOption`] if a required field is empty
    /// - [`ConfigError::BranchConflict`] if `base_branch == branch` while
    ///   `create_branch` or `create_pull_request` is set: both would be
    ///   no-ops or contradictions
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user.is_empty() {
            return Err(ConfigError::MissingOption("user"));
        }
        if self.repo.is_empty() {
            return Err(ConfigError::MissingOption("repo"));
        }
        if self.local_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingOption("local_path"));
        }
        if self.repo_path.is_empty() {
            return Err(ConfigError::MissingOption("repo_path"));
        }
        if self.message.is_empty() {
            return Err(ConfigError::MissingOption("message"));
        }
        if self.branch.is_empty() {
            return Err(ConfigError::MissingOption("branch"));
        }
        if self.base_branch.is_empty() {
            return Err(ConfigError::MissingOption("base_branch"));
        }
        if self.branch == self.base_branch && (self.create_branch || self.create_pull_request) {
            return Err(ConfigError::BranchConflict(self.branch.clone()));
        }
        Ok(())
    }
}
