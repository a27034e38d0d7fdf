//! store::types
//!
//! Domain types for the content-addressed object model.
//!
//! # Design
//!
//! These mirror Git's object model as exposed by the Git Data API: immutable
//! blobs, trees, and commits identified by content hash, plus mutable branch
//! references. `TreeEntry` carries exactly the four canonical fields the
//! store hashes over (path, mode, type, sha); anything else a remote attaches
//! on read (sizes, URLs) is dropped at the deserialization boundary so that
//! rebuilt trees are always submitted in canonical form.

use serde::{Deserialize, Serialize};

/// File mode of a tree entry, serialized as Git's literal mode string.
///
/// The snapshot builder only ever emits `File`, `Executable`, and
/// `Directory`; the remaining variants exist so reading arbitrary remote
/// trees (symlinks, submodules) never fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileMode {
    /// Regular file (`100644`)
    #[serde(rename = "100644")]
    File,
    /// Executable file (`100755`)
    #[serde(rename = "100755")]
    Executable,
    /// Symbolic link (`120000`)
    #[serde(rename = "120000")]
    Symlink,
    /// Directory / subtree (`040000`)
    #[serde(rename = "040000")]
    Directory,
    /// Submodule commit (`160000`)
    #[serde(rename = "160000")]
    Submodule,
}

impl FileMode {
    /// The literal mode string as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::File => "100644",
            FileMode::Executable => "100755",
            FileMode::Symlink => "120000",
            FileMode::Directory => "040000",
            FileMode::Submodule => "160000",
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// File content
    Blob,
    /// Nested directory
    Tree,
    /// Submodule pointer
    Commit,
}

impl EntryKind {
    /// The lowercase kind string as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
            EntryKind::Commit => "commit",
        }
    }
}

/// A single named entry of a tree.
///
/// `path` is one path segment, unique within its owning tree, never a
/// slash-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Entry name (single segment)
    pub path: String,
    /// File mode
    pub mode: FileMode,
    /// Blob, tree, or submodule commit
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Content hash of the referenced object
    pub sha: String,
}

impl TreeEntry {
    /// Entry pointing at a blob.
    pub fn blob(path: impl Into<String>, mode: FileMode, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            kind: EntryKind::Blob,
            sha: sha.into(),
        }
    }

    /// Entry pointing at a subtree.
    pub fn subtree(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: FileMode::Directory,
            kind: EntryKind::Tree,
            sha: sha.into(),
        }
    }
}

/// An immutable, content-addressed directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Content hash computed by the store from the entry set
    pub sha: String,
    /// Entries; order carries no meaning
    #[serde(rename = "tree")]
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// A tree with no entries and no hash yet.
    ///
    /// Used for ancestor levels that do not exist remotely; the rebuild
    /// step materializes them by submitting their (grown) entry set.
    pub fn empty() -> Self {
        Self {
            sha: String::new(),
            entries: Vec::new(),
        }
    }

    /// Hash of the subtree entry named `segment`, if one exists.
    pub fn subtree_sha(&self, segment: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.kind == EntryKind::Tree && e.path == segment)
            .map(|e| e.sha.as_str())
    }
}

/// An immutable commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Content hash of the commit
    pub sha: String,
    /// Hash of the root tree
    pub tree: String,
    /// Parent commit hashes
    pub parents: Vec<String>,
    /// Commit message
    pub message: String,
}

/// A mutable branch reference, the only mutable entity in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Reference name, e.g. `heads/main`
    pub ref_name: String,
    /// Commit hash the reference points at
    pub sha: String,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for viewing
    pub url: String,
    /// PR title
    pub title: String,
}
