//! Data types for git repository state.
//!
//! These types are designed for serialization over IPC and match the
//! corresponding types in the desktop application. Everything is recomputed
//! fresh per call; nothing here is cached or mutated in place.

use serde::{Deserialize, Serialize};

/// Status of a single changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    Conflicted,
}

impl FileChangeStatus {
    /// Map a porcelain v2 status letter. Unknown letters are treated as a
    /// plain modification rather than rejected.
    pub(crate) fn from_code(code: char) -> Self {
        match code {
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            'U' => Self::Conflicted,
            _ => Self::Modified,
        }
    }
}

/// One changed path, in either the index or the working tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub path: String,
    /// Previous path, set only for renames and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub status: FileChangeStatus,
    /// `true` when the change lives in the index (staged half of the XY
    /// pair), `false` when it lives in the working tree.
    pub staged: bool,
}

/// A local or remote-tracking branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Short name, e.g. `main` or `origin/main`.
    pub name: String,
    /// Whether this is the currently checked out branch.
    ///
    /// At most one branch is current; none is when HEAD is detached.
    pub is_current: bool,
    pub is_remote: bool,
    /// Remote the branch belongs to, for remote-tracking branches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Configured upstream, local branches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahead: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behind: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_message: Option<String>,
}

/// Snapshot of the working tree and index.
///
/// A non-repository path is modeled as the trivially clean snapshot
/// (`is_repo: false`), not as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoStatus {
    pub is_repo: bool,
    /// Computed: `true` iff staged, unstaged and untracked are all empty.
    pub is_clean: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
    pub staged: Vec<FileChange>,
    pub unstaged: Vec<FileChange>,
    pub untracked: Vec<String>,
    pub has_conflicts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicted_files: Option<Vec<String>>,
    pub is_rebasing: bool,
    pub is_merging: bool,
    pub stash_count: u32,
    /// Commits ahead of upstream, from the `# branch.ab` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahead: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behind: Option<u32>,
    /// Upstream ref from the `# branch.upstream` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}

impl RepoStatus {
    /// The canonical snapshot for a path that is not a repository.
    pub(crate) fn not_a_repository() -> Self {
        Self {
            is_repo: false,
            is_clean: true,
            current_branch: None,
            root_path: None,
            staged: Vec::new(),
            unstaged: Vec::new(),
            untracked: Vec::new(),
            has_conflicts: false,
            conflicted_files: None,
            is_rebasing: false,
            is_merging: false,
            stash_count: 0,
            ahead: None,
            behind: None,
            upstream: None,
        }
    }
}

/// A commit record decoded from the NUL-delimited log format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full SHA hash.
    pub hash: String,
    /// Abbreviated hash.
    pub short_hash: String,
    /// First line of the commit message.
    pub subject: String,
    /// Message body, absent (not empty) when the commit has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub author_name: String,
    pub author_email: String,
    /// Strict ISO-8601 author date.
    pub author_date: String,
    pub committer_name: String,
    pub committer_email: String,
    pub commit_date: String,
    /// Parent hashes. Empty for a root commit, two or more for a merge.
    pub parents: Vec<String>,
    /// Decoration labels (branch/tag refs pointing at this commit).
    ///
    /// Absent when the commit carries no labels; never an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refs: Option<Vec<String>>,
}

/// A configured remote with its merged fetch/push URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteInfo {
    pub name: String,
    pub fetch_url: String,
    pub push_url: String,
    /// Branch heads advertised by the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
}

/// User identity at a config scope.
///
/// A `None` field means "unset at that scope", which is distinct from an
/// empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitUserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
