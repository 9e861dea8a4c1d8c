//! Working-tree status reconstruction from porcelain v2 output.
//!
//! One `git status --porcelain=v2 --branch` call carries the branch
//! headers, ordinary/rename/unmerged entries, and untracked paths. The
//! rebase/merge/stash probes are auxiliary: each degrades to a safe default
//! instead of failing an otherwise successful status call.

use crate::command_runner::{GitCommandRunner, DEFAULT_TIMEOUT_MS};
use crate::types::{FileChange, FileChangeStatus, RepoStatus};
use crate::{branches, identity};
use crate::GitOpsError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Build the full status snapshot for `path`.
///
/// A path outside any repository returns the canonical clean snapshot with
/// `is_repo: false`; it is data, not an error.
pub async fn get_status(runner: &GitCommandRunner, path: &Path) -> Result<RepoStatus, GitOpsError> {
    if !identity::is_repo(runner, path).await {
        return Ok(RepoStatus::not_a_repository());
    }

    let root_path = identity::get_root(runner, path).await.unwrap_or_default();
    // Detached HEAD reports the literal `HEAD` token, which is not a branch.
    let current_branch = match branches::get_current_branch(runner, path).await {
        Ok(name) if !name.is_empty() && name != "HEAD" => Some(name),
        _ => None,
    };

    let output = runner
        .run(
            path,
            &["status", "--porcelain=v2", "--branch", "--untracked-files=all"],
            DEFAULT_TIMEOUT_MS,
        )
        .await?;
    let snapshot = parse_porcelain_v2(&output.stdout);

    let git_dir = resolve_git_dir(runner, path).await;
    let is_rebasing = git_dir
        .as_ref()
        .map(|dir| dir.join("rebase-merge").exists() || dir.join("rebase-apply").exists())
        .unwrap_or(false);
    let is_merging = git_dir
        .as_ref()
        .map(|dir| dir.join("MERGE_HEAD").exists())
        .unwrap_or(false);
    let stash_count = stash_count(runner, path).await;

    let is_clean =
        snapshot.staged.is_empty() && snapshot.unstaged.is_empty() && snapshot.untracked.is_empty();
    let has_conflicts = !snapshot.conflicted.is_empty();

    debug!(
        staged = snapshot.staged.len(),
        unstaged = snapshot.unstaged.len(),
        untracked = snapshot.untracked.len(),
        "Reconstructed status"
    );

    Ok(RepoStatus {
        is_repo: true,
        is_clean,
        current_branch,
        root_path,
        staged: snapshot.staged,
        unstaged: snapshot.unstaged,
        untracked: snapshot.untracked,
        has_conflicts,
        conflicted_files: if snapshot.conflicted.is_empty() {
            None
        } else {
            Some(snapshot.conflicted)
        },
        is_rebasing,
        is_merging,
        stash_count,
        ahead: snapshot.ahead,
        behind: snapshot.behind,
        upstream: snapshot.upstream,
    })
}

async fn resolve_git_dir(runner: &GitCommandRunner, path: &Path) -> Option<PathBuf> {
    let output = runner
        .run(path, &["rev-parse", "--git-dir"], DEFAULT_TIMEOUT_MS)
        .await
        .ok()?;
    let dir = output.stdout.trim();
    if dir.is_empty() || dir.starts_with("fatal:") {
        return None;
    }
    let dir = PathBuf::from(dir);
    if dir.is_absolute() {
        Some(dir)
    } else {
        Some(path.join(dir))
    }
}

async fn stash_count(runner: &GitCommandRunner, path: &Path) -> u32 {
    match runner
        .run(path, &["stash", "list"], DEFAULT_TIMEOUT_MS)
        .await
    {
        Ok(output) => output
            .stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count() as u32,
        Err(err) => {
            warn!("stash probe failed, defaulting to 0: {}", err);
            0
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PorcelainSnapshot {
    pub staged: Vec<FileChange>,
    pub unstaged: Vec<FileChange>,
    pub untracked: Vec<String>,
    pub conflicted: Vec<String>,
    pub ahead: Option<u32>,
    pub behind: Option<u32>,
    pub upstream: Option<String>,
}

/// Parse `status --porcelain=v2 --branch` output line by line.
///
/// Lines that do not match any expected shape are informational and are
/// dropped without failing the call.
pub(crate) fn parse_porcelain_v2(output: &str) -> PorcelainSnapshot {
    let mut snapshot = PorcelainSnapshot::default();

    for line in output.lines() {
        if let Some(header) = line.strip_prefix("# ") {
            parse_branch_header(header, &mut snapshot);
        } else if let Some(rest) = line.strip_prefix("1 ") {
            parse_ordinary_entry(rest, &mut snapshot);
        } else if let Some(rest) = line.strip_prefix("2 ") {
            parse_rename_entry(rest, &mut snapshot);
        } else if let Some(rest) = line.strip_prefix("u ") {
            // Unmerged entry: path follows nine fixed fields.
            let parts: Vec<&str> = rest.splitn(10, ' ').collect();
            if parts.len() == 10 {
                snapshot.conflicted.push(parts[9].to_string());
            }
        } else if let Some(rest) = line.strip_prefix("? ") {
            snapshot.untracked.push(rest.to_string());
        }
    }

    snapshot
}

fn parse_branch_header(header: &str, snapshot: &mut PorcelainSnapshot) {
    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.first() {
        Some(&"branch.ab") if parts.len() >= 3 => {
            snapshot.ahead = parts[1].trim_start_matches('+').parse().ok();
            snapshot.behind = parts[2].trim_start_matches('-').parse().ok();
        }
        Some(&"branch.upstream") if parts.len() >= 2 => {
            // The value after the keyword is the upstream ref.
            snapshot.upstream = Some(parts[1].to_string());
        }
        _ => {}
    }
}

/// `<XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>` — path may contain spaces.
fn parse_ordinary_entry(rest: &str, snapshot: &mut PorcelainSnapshot) {
    let parts: Vec<&str> = rest.splitn(8, ' ').collect();
    if parts.len() < 8 {
        return;
    }
    let path = parts[7];
    push_xy_changes(parts[0], path, None, snapshot);
}

/// `<XY> <sub> <mH> <mI> <mW> <hH> <hI> <Xscore> <newPath>\t<oldPath>`.
fn parse_rename_entry(rest: &str, snapshot: &mut PorcelainSnapshot) {
    let parts: Vec<&str> = rest.splitn(9, ' ').collect();
    if parts.len() < 9 {
        return;
    }
    let (new_path, old_path) = match parts[8].split_once('\t') {
        Some((new_path, old_path)) => (new_path, Some(old_path.to_string())),
        None => (parts[8], None),
    };
    push_xy_changes(parts[0], new_path, old_path, snapshot);
}

/// Expand a two-character XY pair into staged and unstaged changes.
///
/// X is the index half, Y the worktree half; `.` means no change in that
/// half. A path with both halves set lands in both lists.
fn push_xy_changes(
    xy: &str,
    path: &str,
    old_path: Option<String>,
    snapshot: &mut PorcelainSnapshot,
) {
    let mut chars = xy.chars();
    let (Some(x), Some(y)) = (chars.next(), chars.next()) else {
        return;
    };
    if x != '.' {
        snapshot.staged.push(FileChange {
            path: path.to_string(),
            old_path: old_path.clone(),
            status: FileChangeStatus::from_code(x),
            staged: true,
        });
    }
    if y != '.' {
        snapshot.unstaged.push(FileChange {
            path: path.to_string(),
            old_path,
            status: FileChangeStatus::from_code(y),
            staged: false,
        });
    }
}
