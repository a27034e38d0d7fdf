//! sync::snapshot
//!
//! Builds the leaf tree from a local flat directory.
//!
//! # Design
//!
//! One directory level only: nested directories are skipped with a warning,
//! never recursed into. Each file becomes a blob; sibling blob creations are
//! fanned out concurrently since each produces an independent
//! content-addressed object, and the final tree is assembled from the full
//! entry set, so completion order cannot affect the result.
//!
//! In preserve mode every entry of the existing remote tree whose name does
//! not collide with a local file is carried over verbatim: additive-only
//! semantics. A colliding name is always superseded by the local version.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;

use crate::store::{FileMode, ObjectStore, Tree, TreeEntry};
use crate::ui::output;
use crate::ui::Verbosity;

use super::SyncError;

/// Build the new leaf tree for `local_path`.
///
/// `existing` is the remote tree currently at the target path, if any; with
/// `preserve` set, its non-colliding entries are merged into the result.
/// Without `preserve` the new tree contains exactly the local files.
pub async fn build_snapshot(
    store: &dyn ObjectStore,
    local_path: &Path,
    existing: Option<&Tree>,
    preserve: bool,
    verbosity: Verbosity,
) -> Result<Tree, SyncError> {
    let files = list_files(local_path, verbosity).await?;

    let blob_futures = files.into_iter().map(|file| async move {
        let content = tokio::fs::read(&file.path)
            .await
            .map_err(|e| SyncError::local_read(&file.path, e))?;
        let sha = store.create_blob(&content).await?;
        Ok::<TreeEntry, SyncError>(TreeEntry::blob(file.name, file.mode, sha))
    });

    let mut entries = try_join_all(blob_futures).await?;

    if preserve {
        if let Some(existing) = existing {
            let local_names: HashSet<&str> =
                entries.iter().map(|e| e.path.as_str()).collect();
            let kept: Vec<TreeEntry> = existing
                .entries
                .iter()
                .filter(|e| !local_names.contains(e.path.as_str()))
                .cloned()
                .collect();
            entries.extend(kept);
        }
    }

    let tree = store.create_tree(&entries).await?;
    Ok(tree)
}

/// A local file slated for upload.
struct LocalFile {
    name: String,
    path: PathBuf,
    mode: FileMode,
}

/// List the files of `local_path`, one level deep.
async fn list_files(
    local_path: &Path,
    verbosity: Verbosity,
) -> Result<Vec<LocalFile>, SyncError> {
    let mut dir = tokio::fs::read_dir(local_path)
        .await
        .map_err(|e| SyncError::local_read(local_path, e))?;

    let mut files = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| SyncError::local_read(local_path, e))?
    {
        let path = entry.path();
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| SyncError::local_read(&path, e))?;

        if metadata.is_dir() {
            output::warn(
                format!(
                    "skipping directory {} (subdirectories are not synced)",
                    path.display()
                ),
                verbosity,
            );
            continue;
        }

        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| SyncError::InvalidFileName(path.clone()))?;

        files.push(LocalFile {
            name,
            path,
            mode: mode_for(&metadata),
        });
    }

    Ok(files)
}

/// File mode for a local file: executables keep their execute bit.
#[cfg(unix)]
fn mode_for(metadata: &std::fs::Metadata) -> FileMode {
    use std::os::unix::fs::PermissionsExt;
    if metadata.permissions().mode() & 0o111 != 0 {
        FileMode::Executable
    } else {
        FileMode::File
    }
}

#[cfg(not(unix))]
fn mode_for(_metadata: &std::fs::Metadata) -> FileMode {
    FileMode::File
}
