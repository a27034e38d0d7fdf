//! store::mock
//!
//! Mock object store for deterministic testing.
//!
//! # Design
//!
//! The mock store keeps all objects in memory and hashes them itself, so the
//! content-addressing properties the sync pipeline relies on hold exactly:
//! identical blobs and identical (path-sorted) entry sets receive identical
//! ids. Failure scenarios can be injected per operation and every call is
//! recorded for verification.
//!
//! # Example
//!
//! ```
//! use canopy::store::mock::MockStore;
//! use canopy::store::{ObjectStore, StoreError};
//!
//! # tokio_test::block_on(async {
//! let store = MockStore::new();
//!
//! let sha = store.create_blob(b"hello").await.unwrap();
//! let again = store.create_blob(b"hello").await.unwrap();
//! assert_eq!(sha, again);
//!
//! let missing = store.get_tree("0000").await;
//! assert!(matches!(missing, Err(StoreError::NotFound(_))));
//! # });
//! ```

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{NewPullRequest, ObjectStore, StoreError};
use super::types::{Commit, PullRequest, Reference, Tree, TreeEntry};

/// Mock object store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockStoreInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockStoreInner {
    /// Blobs by content hash.
    blobs: HashMap<String, Vec<u8>>,
    /// Trees by content hash, entries kept path-sorted.
    trees: HashMap<String, Vec<TreeEntry>>,
    /// Commits by content hash.
    commits: HashMap<String, Commit>,
    /// References by short name (`heads/<branch>`).
    refs: HashMap<String, String>,
    /// Open pull requests, keyed by (head, base).
    prs: HashMap<(String, String), PullRequest>,
    /// Next PR number to assign.
    next_pr_number: u64,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get_reference with the given error.
    GetReference(StoreError),
    /// Fail create_reference with the given error.
    CreateReference(StoreError),
    /// Fail update_reference with the given error.
    UpdateReference(StoreError),
    /// Fail get_commit with the given error.
    GetCommit(StoreError),
    /// Fail create_commit with the given error.
    CreateCommit(StoreError),
    /// Fail get_tree with the given error.
    GetTree(StoreError),
    /// Fail create_tree with the given error.
    CreateTree(StoreError),
    /// Fail create_blob with the given error.
    CreateBlob(StoreError),
    /// Fail create_pull_request with the given error.
    CreatePullRequest(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum MockOperation {
    GetReference { ref_name: String },
    CreateReference { ref_name: String, sha: String },
    UpdateReference { ref_name: String, sha: String },
    GetCommit { sha: String },
    CreateCommit { message: String, tree: String, parents: Vec<String> },
    GetTree { sha: String },
    CreateTree { paths: Vec<String> },
    CreateBlob { len: usize },
    CreatePullRequest { head: String, base: String, title: String },
}

impl MockStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockStoreInner {
                blobs: HashMap::new(),
                trees: HashMap::new(),
                commits: HashMap::new(),
                refs: HashMap::new(),
                prs: HashMap::new(),
                next_pr_number: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    // ----------------------------------------------------------------------
    // Seeding helpers (set up pre-existing remote state without going
    // through the async trait, and without being recorded)
    // ----------------------------------------------------------------------

    /// Insert a blob, returning its id.
    pub fn seed_blob(&self, content: &[u8]) -> String {
        let sha = blob_id(content);
        let mut inner = self.inner.lock().unwrap();
        inner.blobs.insert(sha.clone(), content.to_vec());
        sha
    }

    /// Insert a tree, returning its id.
    ///
    /// # Panics
    ///
    /// Panics if two entries share a path; tests should never seed an
    /// invalid tree.
    pub fn seed_tree(&self, entries: Vec<TreeEntry>) -> String {
        assert!(
            unique_paths(&entries),
            "seeded tree has duplicate entry paths"
        );
        let mut entries = entries;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        let sha = tree_id(&entries);
        let mut inner = self.inner.lock().unwrap();
        inner.trees.insert(sha.clone(), entries);
        sha
    }

    /// Insert a commit, returning its id.
    pub fn seed_commit(&self, message: &str, tree: &str, parents: &[&str]) -> String {
        let parents: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
        let sha = commit_id(message, tree, &parents);
        let commit = Commit {
            sha: sha.clone(),
            tree: tree.to_string(),
            parents,
            message: message.to_string(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.commits.insert(sha.clone(), commit);
        sha
    }

    /// Point a reference at a commit.
    pub fn seed_reference(&self, ref_name: &str, sha: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.refs.insert(ref_name.to_string(), sha.to_string());
    }

    // ----------------------------------------------------------------------
    // Inspection helpers
    // ----------------------------------------------------------------------

    /// Current target of a reference (for test verification).
    pub fn reference_sha(&self, ref_name: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.refs.get(ref_name).cloned()
    }

    /// Entries of a stored tree (for test verification).
    pub fn tree_entries(&self, sha: &str) -> Option<Vec<TreeEntry>> {
        let inner = self.inner.lock().unwrap();
        inner.trees.get(sha).cloned()
    }

    /// A stored commit (for test verification).
    pub fn commit(&self, sha: &str) -> Option<Commit> {
        let inner = self.inner.lock().unwrap();
        inner.commits.get(sha).cloned()
    }

    /// A stored blob (for test verification).
    pub fn blob(&self, sha: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.blobs.get(sha).cloned()
    }

    /// Number of open pull requests.
    pub fn pr_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.prs.len()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Count recorded operations matching a predicate.
    pub fn count_operations(&self, pred: impl Fn(&MockOperation) -> bool) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.operations.iter().filter(|op| pred(op)).count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), StoreError> {
        let inner = self.inner.lock().unwrap();
        let err = match &inner.fail_on {
            Some(FailOn::GetReference(e)) if expected == "get_reference" => Some(e),
            Some(FailOn::CreateReference(e)) if expected == "create_reference" => Some(e),
            Some(FailOn::UpdateReference(e)) if expected == "update_reference" => Some(e),
            Some(FailOn::GetCommit(e)) if expected == "get_commit" => Some(e),
            Some(FailOn::CreateCommit(e)) if expected == "create_commit" => Some(e),
            Some(FailOn::GetTree(e)) if expected == "get_tree" => Some(e),
            Some(FailOn::CreateTree(e)) if expected == "create_tree" => Some(e),
            Some(FailOn::CreateBlob(e)) if expected == "create_blob" => Some(e),
            Some(FailOn::CreatePullRequest(e)) if expected == "create_pull_request" => Some(e),
            _ => None,
        };
        match err {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_reference(&self, ref_name: &str) -> Result<Reference, StoreError> {
        self.record(MockOperation::GetReference {
            ref_name: ref_name.to_string(),
        });
        self.check_fail("get_reference")?;

        let inner = self.inner.lock().unwrap();
        inner
            .refs
            .get(ref_name)
            .map(|sha| Reference {
                ref_name: ref_name.to_string(),
                sha: sha.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(ref_name.to_string()))
    }

    async fn create_reference(&self, ref_name: &str, sha: &str) -> Result<Reference, StoreError> {
        self.record(MockOperation::CreateReference {
            ref_name: ref_name.to_string(),
            sha: sha.to_string(),
        });
        self.check_fail("create_reference")?;

        let mut inner = self.inner.lock().unwrap();
        if inner.refs.contains_key(ref_name) {
            return Err(StoreError::ApiError {
                status: 422,
                message: format!("Reference {} already exists", ref_name),
            });
        }
        inner.refs.insert(ref_name.to_string(), sha.to_string());
        Ok(Reference {
            ref_name: ref_name.to_string(),
            sha: sha.to_string(),
        })
    }

    async fn update_reference(&self, ref_name: &str, sha: &str) -> Result<Reference, StoreError> {
        self.record(MockOperation::UpdateReference {
            ref_name: ref_name.to_string(),
            sha: sha.to_string(),
        });
        self.check_fail("update_reference")?;

        let mut inner = self.inner.lock().unwrap();
        match inner.refs.get_mut(ref_name) {
            Some(target) => {
                *target = sha.to_string();
                Ok(Reference {
                    ref_name: ref_name.to_string(),
                    sha: sha.to_string(),
                })
            }
            None => Err(StoreError::NotFound(ref_name.to_string())),
        }
    }

    async fn get_commit(&self, sha: &str) -> Result<Commit, StoreError> {
        self.record(MockOperation::GetCommit {
            sha: sha.to_string(),
        });
        self.check_fail("get_commit")?;

        let inner = self.inner.lock().unwrap();
        inner
            .commits
            .get(sha)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("commit {}", sha)))
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<Commit, StoreError> {
        self.record(MockOperation::CreateCommit {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
        });
        self.check_fail("create_commit")?;

        let sha = commit_id(message, tree, parents);
        let commit = Commit {
            sha: sha.clone(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
            message: message.to_string(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.commits.insert(sha, commit.clone());
        Ok(commit)
    }

    async fn get_tree(&self, sha: &str) -> Result<Tree, StoreError> {
        self.record(MockOperation::GetTree {
            sha: sha.to_string(),
        });
        self.check_fail("get_tree")?;

        let inner = self.inner.lock().unwrap();
        inner
            .trees
            .get(sha)
            .map(|entries| Tree {
                sha: sha.to_string(),
                entries: entries.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(format!("tree {}", sha)))
    }

    async fn create_tree(&self, entries: &[TreeEntry]) -> Result<Tree, StoreError> {
        self.record(MockOperation::CreateTree {
            paths: entries.iter().map(|e| e.path.clone()).collect(),
        });
        self.check_fail("create_tree")?;

        if !unique_paths(entries) {
            return Err(StoreError::ApiError {
                status: 422,
                message: "tree entries have duplicate paths".into(),
            });
        }

        let mut entries = entries.to_vec();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        let sha = tree_id(&entries);

        let mut inner = self.inner.lock().unwrap();
        inner.trees.insert(sha.clone(), entries.clone());
        Ok(Tree { sha, entries })
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, StoreError> {
        self.record(MockOperation::CreateBlob {
            len: content.len(),
        });
        self.check_fail("create_blob")?;

        let sha = blob_id(content);
        let mut inner = self.inner.lock().unwrap();
        inner.blobs.insert(sha.clone(), content.to_vec());
        Ok(sha)
    }

    async fn create_pull_request(
        &self,
        request: NewPullRequest,
    ) -> Result<PullRequest, StoreError> {
        self.record(MockOperation::CreatePullRequest {
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
        });
        self.check_fail("create_pull_request")?;

        let mut inner = self.inner.lock().unwrap();
        let key = (request.head.clone(), request.base.clone());
        if inner.prs.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!(
                "A pull request already exists for {}.",
                request.head
            )));
        }

        let number = inner.next_pr_number;
        inner.next_pr_number += 1;
        let pr = PullRequest {
            number,
            url: format!("https://github.com/mock/repo/pull/{}", number),
            title: request.title,
        };
        inner.prs.insert(key, pr.clone());
        Ok(pr)
    }
}

/// Whether every entry path is unique within the set.
fn unique_paths(entries: &[TreeEntry]) -> bool {
    let mut seen = std::collections::HashSet::new();
    entries.iter().all(|e| seen.insert(e.path.as_str()))
}

/// Content id of a blob.
fn blob_id(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"blob:");
    hasher.update(content);
    hex::encode(&hasher.finalize()[..20])
}

/// Content id of a tree over its path-sorted canonical entries.
///
/// Order-insensitive: the caller sorts, so two entry sets identical by
/// path/mode/type/sha always hash the same.
fn tree_id(sorted_entries: &[TreeEntry]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"tree:");
    for entry in sorted_entries {
        hasher.update(entry.path.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.mode.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.kind.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.sha.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(&hasher.finalize()[..20])
}

/// Content id of a commit.
fn commit_id(message: &str, tree: &str, parents: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"commit:");
    hasher.update(tree.as_bytes());
    for parent in parents {
        hasher.update(b"\0");
        hasher.update(parent.as_bytes());
    }
    hasher.update(b"\0");
    hasher.update(message.as_bytes());
    hex::encode(&hasher.finalize()[..20])
}
