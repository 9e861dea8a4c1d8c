//! # Git CLI Ops
//!
//! Structured git repository state for the Unbound daemon, reconstructed by
//! invoking the `git` CLI and parsing its heterogeneous text output.
//!
//! The crate owns process execution, timeout control, output parsing, and
//! error normalization for every repository read and the small set of
//! mutations the desktop surface needs. Nothing is cached: every call
//! reflects live on-disk state.
//!
//! ## Key Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | [`GitClient::get_status`] | Staged/unstaged/untracked/conflict snapshot |
//! | [`GitClient::get_branches`] | Branch list with tracking enrichment |
//! | [`GitClient::get_commit_log`] | Structured commit history |
//! | [`GitClient::get_remotes`] | Remotes with merged URLs and heads |
//! | [`GitClient::checkout`] | Switch branches (validated input) |
//! | [`GitClient::get_user_config`] | Read user identity per scope |
//!
//! ## Parsing posture
//!
//! The git CLI exposes incompatible output dialects, quotes output
//! differently per shell, and silently ignores some format flags on certain
//! builds. The parsers here strip shell quoting artifacts, fall back to
//! alternative listing strategies, and drop unrecognized lines instead of
//! failing whole calls. Timeouts and invalid ref names always propagate.

mod branches;
mod client;
mod command_runner;
mod error;
mod identity;
mod log;
mod refname;
mod remotes;
mod status;
mod types;

pub use client::GitClient;
pub use command_runner::{GitCommandOutput, GitCommandRunner, DEFAULT_TIMEOUT_MS};
pub use error::GitOpsError;
pub use refname::is_valid as is_valid_ref_name;
pub use types::{
    BranchInfo, CommitInfo, FileChange, FileChangeStatus, GitUserConfig, RemoteInfo, RepoStatus,
};
