//! sync::resolver
//!
//! Path resolution against the remote tree graph.
//!
//! # Design
//!
//! [`resolve_chain`] walks a root tree down a slash-split path and returns
//! the ordered chain of trees that exist along it, stopping at the first
//! missing segment: a partial chain is a valid result meaning "this
//! directory does not exist yet", not an error. [`resolve_chain_strict`] is
//! the variant for callers that require the full path to pre-exist and
//! treats a missing segment as fatal.
//!
//! Every previously unseen tree is fetched once and cached before
//! descending, so shared subtrees reachable from several points of one sync
//! cost a single read.

use crate::store::{ObjectStore, Tree};

use super::cache::TreeCache;
use super::SyncError;

/// Split a slash-separated repository path into segments.
///
/// Empty segments (leading, trailing, or doubled slashes) are discarded, so
/// `"/site//assets/"` resolves the same as `"site/assets"`.
pub fn split_segments(repo_path: &str) -> Vec<String> {
    repo_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Walk `root` down `segments`, returning the chain of existing trees.
///
/// The chain always starts with `root` and has between 1 and
/// `segments.len() + 1` elements; it stops early at the first segment with
/// no subtree entry.
pub async fn resolve_chain(
    store: &dyn ObjectStore,
    cache: &mut TreeCache,
    root: &Tree,
    segments: &[String],
) -> Result<Vec<Tree>, SyncError> {
    let mut chain = Vec::with_capacity(segments.len() + 1);
    chain.push(root.clone());

    for segment in segments {
        let sha = match chain.last().and_then(|tree| tree.subtree_sha(segment)) {
            Some(sha) => sha.to_string(),
            None => break,
        };
        let tree = fetch_cached(store, cache, &sha).await?;
        chain.push(tree);
    }

    Ok(chain)
}

/// Like [`resolve_chain`], but the full path must exist.
///
/// # Errors
///
/// [`SyncError::PathNotFound`] if any segment is missing.
pub async fn resolve_chain_strict(
    store: &dyn ObjectStore,
    cache: &mut TreeCache,
    root: &Tree,
    segments: &[String],
) -> Result<Vec<Tree>, SyncError> {
    let chain = resolve_chain(store, cache, root, segments).await?;
    if chain.len() != segments.len() + 1 {
        return Err(SyncError::PathNotFound(segments.join("/")));
    }
    Ok(chain)
}

/// Fetch a tree through the cache.
async fn fetch_cached(
    store: &dyn ObjectStore,
    cache: &mut TreeCache,
    sha: &str,
) -> Result<Tree, SyncError> {
    if let Some(tree) = cache.get(sha) {
        return Ok(tree);
    }
    let tree = store.get_tree(sha).await?;
    cache.insert(tree.clone());
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{MockOperation, MockStore};
    use crate::store::{FileMode, TreeEntry};

    /// Seed `root -> x -> y` plus a blob named like a directory.
    fn seed_nested(store: &MockStore) -> Tree {
        let y = store.seed_tree(vec![TreeEntry::blob("file.txt", FileMode::File, "b1")]);
        let x = store.seed_tree(vec![
            TreeEntry::subtree("y", &y),
            TreeEntry::blob("z", FileMode::File, "b2"),
        ]);
        let root_sha = store.seed_tree(vec![TreeEntry::subtree("x", &x)]);
        let entries = store.tree_entries(&root_sha).unwrap();
        Tree {
            sha: root_sha,
            entries,
        }
    }

    #[tokio::test]
    async fn full_path_resolves_to_full_chain() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        let segments = split_segments("x/y");
        let chain = resolve_chain(&store, &mut cache, &root, &segments)
            .await
            .unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].sha, root.sha);
        assert_eq!(chain[1].subtree_sha("y"), Some(chain[2].sha.as_str()));
    }

    #[tokio::test]
    async fn missing_segment_yields_partial_chain() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        let segments = split_segments("x/missing/deeper");
        let chain = resolve_chain(&store, &mut cache, &root, &segments)
            .await
            .unwrap();

        // root and x exist; the walk stops there.
        assert_eq!(chain.len(), 2);
    }

    #[tokio::test]
    async fn blob_with_matching_name_does_not_count_as_directory() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        // "x/z" exists but is a blob, not a tree.
        let segments = split_segments("x/z");
        let chain = resolve_chain(&store, &mut cache, &root, &segments)
            .await
            .unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[tokio::test]
    async fn strict_resolution_fails_on_missing_segment() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        let segments = split_segments("x/missing");
        let result = resolve_chain_strict(&store, &mut cache, &root, &segments).await;

        match result {
            Err(SyncError::PathNotFound(path)) => assert_eq!(path, "x/missing"),
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn strict_resolution_passes_on_existing_path() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        let segments = split_segments("x/y");
        let chain = resolve_chain_strict(&store, &mut cache, &root, &segments)
            .await
            .unwrap();
        assert_eq!(chain.len(), 3);
    }

    #[tokio::test]
    async fn repeated_resolution_hits_cache() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        let segments = split_segments("x/y");
        resolve_chain(&store, &mut cache, &root, &segments)
            .await
            .unwrap();
        resolve_chain(&store, &mut cache, &root, &segments)
            .await
            .unwrap();

        // x and y fetched exactly once each despite two walks.
        let fetches = store.count_operations(|op| matches!(op, MockOperation::GetTree { .. }));
        assert_eq!(fetches, 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn empty_segments_resolve_to_root_only() {
        let store = MockStore::new();
        let root = seed_nested(&store);
        let mut cache = TreeCache::new();

        let chain = resolve_chain(&store, &mut cache, &root, &[]).await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].sha, root.sha);
    }

    #[test]
    fn split_discards_empty_segments() {
        assert_eq!(split_segments("site/assets"), vec!["site", "assets"]);
        assert_eq!(split_segments("/site//assets/"), vec!["site", "assets"]);
        assert!(split_segments("/").is_empty());
        assert!(split_segments("").is_empty());
    }
}
