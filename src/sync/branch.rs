//! sync::branch
//!
//! Branch reference resolution and bootstrap.

use crate::store::{ObjectStore, Reference, StoreError};

use super::SyncError;

/// Short reference name for a branch.
pub fn branch_ref(branch: &str) -> String {
    format!("heads/{}", branch)
}

/// Read a branch reference, mapping absence to `None`.
///
/// Only the store's "not found" condition is recoverable here; every other
/// failure propagates.
pub async fn get_branch_or_null(
    store: &dyn ObjectStore,
    branch: &str,
) -> Result<Option<Reference>, SyncError> {
    match store.get_reference(&branch_ref(branch)).await {
        Ok(reference) => Ok(Some(reference)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the target branch, creating it from the base branch if allowed.
///
/// # Errors
///
/// - [`SyncError::BranchNotFound`] for the target branch when it is absent
///   and creation was not requested, surfaced before any write occurs
/// - [`SyncError::BranchNotFound`] for the base branch when creation was
///   requested but the base is absent
pub async fn resolve_branch(
    store: &dyn ObjectStore,
    branch: &str,
    base_branch: &str,
    create_branch: bool,
) -> Result<Reference, SyncError> {
    if let Some(reference) = get_branch_or_null(store, branch).await? {
        return Ok(reference);
    }

    if !create_branch {
        return Err(SyncError::BranchNotFound(branch.to_string()));
    }

    let base = match store.get_reference(&branch_ref(base_branch)).await {
        Ok(reference) => reference,
        Err(StoreError::NotFound(_)) => {
            return Err(SyncError::BranchNotFound(base_branch.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let created = store
        .create_reference(&branch_ref(branch), &base.sha)
        .await?;
    Ok(created)
}
