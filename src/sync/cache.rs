//! sync::cache
//!
//! Sync-scoped tree cache.
//!
//! # Design
//!
//! One cache lives for the duration of a single sync and maps tree hash to
//! the tree as fetched from the store, so shared subtrees encountered more
//! than once cost one read. Lookups hand out clones: the rebuild step edits
//! entry lists in place, and the same hash may be reachable from several
//! points of one sync, so the cached original must never be aliased.

use std::collections::HashMap;

use crate::store::Tree;

/// Ephemeral mapping from tree hash to a previously fetched tree.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: HashMap<String, Tree>,
}

impl TreeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }

    /// Look up a tree by hash.
    ///
    /// Returns a clone; the cached original stays untouched by whatever the
    /// caller mutates later.
    pub fn get(&self, sha: &str) -> Option<Tree> {
        self.trees.get(sha).cloned()
    }

    /// Insert a fetched tree, keyed by its hash.
    pub fn insert(&mut self, tree: Tree) {
        self.trees.insert(tree.sha.clone(), tree);
    }

    /// Number of cached trees.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
