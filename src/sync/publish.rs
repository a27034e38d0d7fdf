//! sync::publish
//!
//! Commit publication and pull request creation.
//!
//! # Design
//!
//! Publication is two steps, create the commit object then advance the
//! branch reference, and is not atomic from the store's perspective. A
//! crash between the steps leaves an orphaned, unreferenced commit, which is
//! harmless under content addressing; re-running the whole sync is the
//! recovery path. The reference is only ever moved to a commit that already
//! exists.

use crate::store::{Commit, NewPullRequest, ObjectStore, PullRequest, StoreError};
use crate::ui::output;
use crate::ui::Verbosity;

use super::branch::branch_ref;
use super::SyncError;

/// Create the commit for `root_tree` and advance the branch to it.
pub async fn publish_commit(
    store: &dyn ObjectStore,
    branch: &str,
    message: &str,
    root_tree: &str,
    parent: &str,
) -> Result<Commit, SyncError> {
    let commit = store
        .create_commit(message, root_tree, &[parent.to_string()])
        .await?;
    store
        .update_reference(&branch_ref(branch), &commit.sha)
        .await?;
    Ok(commit)
}

/// Open a pull request from `branch` into `base_branch`.
///
/// Title is the first line of the commit message, body the remainder. An
/// "already exists" response is success: re-running a sync must not fail on
/// its own earlier PR. Returns `None` in that case.
pub async fn ensure_pull_request(
    store: &dyn ObjectStore,
    branch: &str,
    base_branch: &str,
    message: &str,
    verbosity: Verbosity,
) -> Result<Option<PullRequest>, SyncError> {
    let (title, body) = split_message(message);
    let request = NewPullRequest {
        head: branch.to_string(),
        base: base_branch.to_string(),
        title: title.to_string(),
        body: body.map(|b| b.to_string()),
    };

    match store.create_pull_request(request).await {
        Ok(pr) => Ok(Some(pr)),
        Err(StoreError::AlreadyExists(message)) => {
            output::warn(
                format!("pull request not created: {}", message),
                verbosity,
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Split a commit message into PR title and optional body.
fn split_message(message: &str) -> (&str, Option<&str>) {
    match message.split_once('\n') {
        Some((title, rest)) => {
            let body = rest.trim_start_matches('\n');
            if body.is_empty() {
                (title, None)
            } else {
                (title, Some(body))
            }
        }
        None => (message, None),
    }
}
