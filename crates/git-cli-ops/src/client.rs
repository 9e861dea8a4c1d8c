//! Composed client surface consumed by the transport layer.
//!
//! One value holds the command runner as an explicit collaborator; there is
//! no ambient registry. Every read tolerates a non-repository path, zero
//! commits, zero remotes, mid-rebase/merge state, and detached HEAD. Every
//! mutating operation validates its name-like inputs before any process
//! spawns.

use crate::command_runner::{GitCommandRunner, DEFAULT_TIMEOUT_MS};
use crate::types::{BranchInfo, CommitInfo, GitUserConfig, RemoteInfo, RepoStatus};
use crate::{branches, identity, log, refname, remotes, status, GitOpsError};
use std::path::Path;
use tracing::debug;

/// Longer budget for operations that touch the network.
const NETWORK_TIMEOUT_MS: u64 = 120_000;

/// Facade over all repository-state operations.
#[derive(Debug, Clone, Default)]
pub struct GitClient {
    runner: GitCommandRunner,
}

impl GitClient {
    pub fn new() -> Self {
        Self {
            runner: GitCommandRunner::new(),
        }
    }

    /// Build a client around an existing runner (shared executable
    /// resolution, test doubles).
    pub fn with_runner(runner: GitCommandRunner) -> Self {
        Self { runner }
    }

    // Reads

    pub async fn is_repo(&self, path: &Path) -> bool {
        identity::is_repo(&self.runner, path).await
    }

    pub async fn get_root(&self, path: &Path) -> Result<Option<String>, GitOpsError> {
        identity::get_root(&self.runner, path).await
    }

    pub async fn get_branches(&self, path: &Path) -> Result<Vec<BranchInfo>, GitOpsError> {
        branches::get_branches(&self.runner, path).await
    }

    pub async fn get_current_branch(&self, path: &Path) -> Result<String, GitOpsError> {
        branches::get_current_branch(&self.runner, path).await
    }

    pub async fn get_status(&self, path: &Path) -> Result<RepoStatus, GitOpsError> {
        status::get_status(&self.runner, path).await
    }

    pub async fn get_commit_log(
        &self,
        path: &Path,
        limit: u32,
        all_branches: bool,
    ) -> Result<Vec<CommitInfo>, GitOpsError> {
        log::get_commit_log(&self.runner, path, limit, all_branches).await
    }

    pub async fn get_remotes(&self, path: &Path) -> Result<Vec<RemoteInfo>, GitOpsError> {
        remotes::get_remotes(&self.runner, path).await
    }

    pub async fn get_user_config(&self, path: &Path) -> GitUserConfig {
        identity::get_user_config(&self.runner, path).await
    }

    // Mutations

    pub async fn set_user_config(
        &self,
        path: &Path,
        name: Option<&str>,
        email: Option<&str>,
        global: bool,
    ) -> Result<(), GitOpsError> {
        identity::set_user_config(&self.runner, path, name, email, global).await
    }

    pub async fn checkout(&self, path: &Path, branch: &str) -> Result<(), GitOpsError> {
        validate_ref(branch)?;
        debug!("Checking out {}", branch);
        self.runner
            .run_checked(path, &["checkout", branch], DEFAULT_TIMEOUT_MS)
            .await?;
        Ok(())
    }

    pub async fn create_branch(
        &self,
        path: &Path,
        name: &str,
        start_point: Option<&str>,
    ) -> Result<(), GitOpsError> {
        validate_ref(name)?;
        if let Some(start) = start_point {
            validate_ref(start)?;
        }
        let mut args = vec!["branch", name];
        if let Some(start) = start_point {
            args.push(start);
        }
        self.runner
            .run_checked(path, &args, DEFAULT_TIMEOUT_MS)
            .await?;
        Ok(())
    }

    pub async fn push(
        &self,
        path: &Path,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<(), GitOpsError> {
        self.remote_op(path, "push", remote, branch).await
    }

    pub async fn pull(
        &self,
        path: &Path,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<(), GitOpsError> {
        self.remote_op(path, "pull", remote, branch).await
    }

    pub async fn fetch(
        &self,
        path: &Path,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<(), GitOpsError> {
        self.remote_op(path, "fetch", remote, branch).await
    }

    /// Stage the given paths. Paths go after a literal `--` so they can
    /// never be read as options.
    pub async fn stage_files(&self, path: &Path, files: &[&str]) -> Result<(), GitOpsError> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(files);
        self.runner
            .run_checked(path, &args, DEFAULT_TIMEOUT_MS)
            .await?;
        Ok(())
    }

    /// Remove the given paths from the index, leaving the working tree
    /// untouched.
    pub async fn unstage_files(&self, path: &Path, files: &[&str]) -> Result<(), GitOpsError> {
        let mut args = vec!["reset", "HEAD", "--"];
        args.extend_from_slice(files);
        self.runner
            .run_checked(path, &args, DEFAULT_TIMEOUT_MS)
            .await?;
        Ok(())
    }

    /// Create a commit from the current index.
    pub async fn commit(&self, path: &Path, message: &str) -> Result<(), GitOpsError> {
        self.runner
            .run_checked(path, &["commit", "-m", message], DEFAULT_TIMEOUT_MS)
            .await?;
        Ok(())
    }

    async fn remote_op(
        &self,
        path: &Path,
        subcommand: &str,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<(), GitOpsError> {
        if let Some(remote) = remote {
            validate_ref(remote)?;
        }
        if let Some(branch) = branch {
            validate_ref(branch)?;
        }
        let mut args = vec![subcommand];
        if let Some(remote) = remote {
            args.push(remote);
            // A branch without a remote is ambiguous; only pass it when the
            // remote is present.
            if let Some(branch) = branch {
                args.push(branch);
            }
        }
        debug!("Running {} with args {:?}", subcommand, args);
        self.runner
            .run_checked(path, &args, NETWORK_TIMEOUT_MS)
            .await?;
        Ok(())
    }
}

fn validate_ref(name: &str) -> Result<(), GitOpsError> {
    if refname::is_valid(name) {
        Ok(())
    } else {
        Err(GitOpsError::InvalidRefName {
            name: name.to_string(),
        })
    }
}
