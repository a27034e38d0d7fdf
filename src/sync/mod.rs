//! sync
//!
//! The tree-reconstruction pipeline.
//!
//! # Architecture
//!
//! [`sync`] composes the stages in strict dependency order, failing fast on
//! the first error:
//!
//! 1. validate options (before any I/O)
//! 2. resolve or create the branch reference ([`branch`])
//! 3. fetch the head commit and root tree
//! 4. resolve the target path to its existing ancestor chain ([`resolver`])
//! 5. build the leaf tree from the local directory ([`snapshot`])
//! 6. fold the leaf back up into a new root ([`rebuild`])
//! 7. publish a commit and advance the reference, skipped entirely when
//!    the new root hash equals the old one ([`publish`])
//! 8. optionally open a pull request ([`publish`])
//!
//! Objects created before a failure are unreferenced and content-addressed,
//! so a failed sync leaves no visible state and is safe to re-run.

pub mod branch;
pub mod cache;
pub mod publish;
pub mod rebuild;
pub mod resolver;
pub mod snapshot;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ConfigError, SyncOptions};
use crate::store::{ObjectStore, PullRequest, StoreError, Tree};
use crate::ui::output;
use crate::ui::Verbosity;

pub use cache::TreeCache;

/// Errors from the sync pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid option combination, raised before any I/O.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The target (or base) branch does not exist and could not be used.
    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    /// A path segment required to exist is missing.
    #[error("path '{0}' not found in repository tree")]
    PathNotFound(String),

    /// A local file or directory could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    LocalRead {
        /// The local path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A local file name cannot be represented as a store path.
    #[error("file name at '{}' is not valid unicode", .0.display())]
    InvalidFileName(PathBuf),

    /// Ancestor chain and path segments disagree in length.
    #[error("ancestor chain of {trees} trees does not match {segments} path segments")]
    ChainMismatch {
        /// Trees supplied
        trees: usize,
        /// Segments supplied
        segments: usize,
    },

    /// Any other failure from the remote store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    pub(crate) fn local_read(path: &Path, source: std::io::Error) -> Self {
        SyncError::LocalRead {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of a completed sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The branch that was synced.
    pub branch: String,
    /// Hash of the (possibly pre-existing) root tree after the sync.
    pub root_tree: String,
    /// Hash of the published commit; `None` when the sync was a no-op.
    pub commit: Option<String>,
    /// The pull request, when one was requested and newly created.
    pub pull_request: Option<PullRequest>,
}

impl SyncOutcome {
    /// Whether the sync changed nothing remotely.
    pub fn unchanged(&self) -> bool {
        self.commit.is_none()
    }
}

/// Synchronize a local flat directory into `repo_path` on a branch.
///
/// See the module docs for stage ordering. Re-running with unchanged local
/// content performs zero remote mutations: the recomputed root hash matches
/// and commit publication is skipped.
pub async fn sync(
    store: &dyn ObjectStore,
    options: &SyncOptions,
) -> Result<SyncOutcome, SyncError> {
    options.validate()?;
    let verbosity = Verbosity::from_flags(options.quiet, options.debug);

    let reference = branch::resolve_branch(
        store,
        &options.branch,
        &options.base_branch,
        options.create_branch,
    )
    .await?;
    output::debug(
        format!("branch {} at {}", reference.ref_name, reference.sha),
        verbosity,
    );

    let head = store.get_commit(&reference.sha).await?;
    let root = store.get_tree(&head.tree).await?;
    let original_root = root.sha.clone();

    let segments = resolver::split_segments(&options.repo_path);
    let mut cache = TreeCache::new();
    let mut chain = resolver::resolve_chain(store, &mut cache, &root, &segments).await?;
    output::debug(
        format!(
            "path '{}' resolved: {} of {} levels exist",
            options.repo_path,
            chain.len() - 1,
            segments.len()
        ),
        verbosity,
    );

    // The pre-existing leaf never enters the rebuild; the snapshot is its
    // replacement (and its merge source in preserve mode).
    let existing_leaf = if chain.len() == segments.len() + 1 {
        chain.pop()
    } else {
        None
    };

    let leaf = snapshot::build_snapshot(
        store,
        &options.local_path,
        existing_leaf.as_ref(),
        options.preserve_repo_files,
        verbosity,
    )
    .await?;
    output::debug(
        format!("snapshot tree {} ({} entries)", leaf.sha, leaf.entries.len()),
        verbosity,
    );

    // Levels that do not exist remotely yet materialize from empty trees.
    while chain.len() < segments.len() {
        chain.push(Tree::empty());
    }
    chain.push(leaf);

    let new_root = rebuild::rebuild_chain(store, chain, &segments).await?;
    output::debug(format!("new root tree {}", new_root.sha), verbosity);

    let commit = if new_root.sha == original_root {
        output::debug("no change detected; skipping commit", verbosity);
        None
    } else {
        let commit = publish::publish_commit(
            store,
            &options.branch,
            &options.message,
            &new_root.sha,
            &reference.sha,
        )
        .await?;
        output::debug(format!("published commit {}", commit.sha), verbosity);
        Some(commit.sha)
    };

    let pull_request = if options.create_pull_request {
        publish::ensure_pull_request(
            store,
            &options.branch,
            &options.base_branch,
            &options.message,
            verbosity,
        )
        .await?
    } else {
        None
    };

    Ok(SyncOutcome {
        branch: options.branch.clone(),
        root_tree: new_root.sha,
        commit,
        pull_request,
    })
}
