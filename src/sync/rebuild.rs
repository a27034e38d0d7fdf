//! sync::rebuild
//!
//! Bottom-up reconstruction of the ancestor chain.
//!
//! # Design
//!
//! Merkle immutability means a changed leaf changes every tree on the path
//! up to the root, and nothing else. The fold here walks deepest to
//! shallowest: at each step the already-finalized child hash is upserted
//! into its parent's entry set under the connecting path segment, the parent
//! is submitted as a new tree, and its resulting hash becomes the child of
//! the next step. Subtrees off the path are carried by hash, never
//! recreated. Structural sharing falls out of leaving their entries
//! untouched.
//!
//! Ancestor levels that do not exist remotely are supplied by the caller as
//! empty trees; growing their entry set and submitting them materializes the
//! missing directories.

use crate::store::{ObjectStore, Tree, TreeEntry};

use super::SyncError;

/// Fold the chain back up into a new root tree.
///
/// `chain` is the ancestor chain from the root downward with the new,
/// already-created leaf tree as its final element; `segments` holds the
/// connecting path segments, one fewer than the chain is long (the root has
/// no segment). Entry sets are rebuilt from canonical fields only, so
/// whatever extra metadata the store attached on read never leaks into the
/// created trees.
///
/// Returns the new root. With no segments the leaf IS the root and is
/// returned unchanged.
pub async fn rebuild_chain(
    store: &dyn ObjectStore,
    chain: Vec<Tree>,
    segments: &[String],
) -> Result<Tree, SyncError> {
    if chain.len() != segments.len() + 1 {
        return Err(SyncError::ChainMismatch {
            trees: chain.len(),
            segments: segments.len(),
        });
    }

    let mut levels = chain.into_iter().rev();
    let mut child = match levels.next() {
        Some(leaf) => leaf,
        None => {
            return Err(SyncError::ChainMismatch {
                trees: 0,
                segments: segments.len(),
            })
        }
    };

    for (mut parent, segment) in levels.zip(segments.iter().rev()) {
        match parent.entries.iter_mut().find(|e| e.path == *segment) {
            Some(entry) => {
                *entry = TreeEntry::subtree(segment.clone(), child.sha.clone());
            }
            None => {
                parent
                    .entries
                    .push(TreeEntry::subtree(segment.clone(), child.sha.clone()));
            }
        }
        child = store.create_tree(&parent.entries).await?;
    }

    Ok(child)
}
