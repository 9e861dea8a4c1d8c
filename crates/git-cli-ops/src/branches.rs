//! Branch enumeration with tracking enrichment.
//!
//! The skeleton comes from one `git branch -a` call with a structured
//! format. Some git builds ignore the format flag and print nothing usable;
//! when the primary call yields zero branches the enumerator falls back to
//! two scoped listing calls. A second pass enriches the skeleton with
//! per-ref hash/subject/upstream/tracking data and is never fatal.

use crate::command_runner::{GitCommandRunner, DEFAULT_TIMEOUT_MS};
use crate::types::BranchInfo;
use crate::GitOpsError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const BRANCH_FORMAT: &str = "%(HEAD)|%(refname:short)|%(refname)";
const ENRICH_FORMAT: &str =
    "%(refname:short)|%(objectname:short)|%(subject)|%(upstream:short)|%(upstream:track)";

static AHEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"ahead (\d+)").expect("ahead pattern"));
static BEHIND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"behind (\d+)").expect("behind pattern"));

/// Name of the currently checked out branch.
///
/// Returns `HEAD` when detached; the caller decides how to render that.
pub async fn get_current_branch(
    runner: &GitCommandRunner,
    path: &Path,
) -> Result<String, GitOpsError> {
    let output = runner
        .run(path, &["rev-parse", "--abbrev-ref", "HEAD"], DEFAULT_TIMEOUT_MS)
        .await?;
    let first_line = output.stdout.lines().next().unwrap_or("");
    Ok(strip_quotes(first_line.trim()).to_string())
}

/// List all local and remote branches with tracking info.
pub async fn get_branches(
    runner: &GitCommandRunner,
    path: &Path,
) -> Result<Vec<BranchInfo>, GitOpsError> {
    let primary = runner
        .run(path, &["branch", "-a", &format!("--format={BRANCH_FORMAT}")], DEFAULT_TIMEOUT_MS)
        .await?;
    let mut branches = parse_branch_lines(&primary.stdout);

    if branches.is_empty() {
        // Format flag unsupported on this build; list local and remote refs
        // with two scoped calls instead.
        warn!("branch -a format yielded no branches, falling back to scoped listing");
        let local = runner
            .run(path, &["branch", &format!("--format={BRANCH_FORMAT}")], DEFAULT_TIMEOUT_MS)
            .await?;
        let remote = runner
            .run(path, &["branch", "-r", &format!("--format={BRANCH_FORMAT}")], DEFAULT_TIMEOUT_MS)
            .await?;
        branches = parse_branch_lines(&local.stdout);
        branches.extend(parse_branch_lines(&remote.stdout));
    }

    let current = get_current_branch(runner, path).await.unwrap_or_default();

    if !branches.iter().any(|b| !b.is_remote) {
        // An unborn branch appears in no listing, even though remote-tracking
        // refs may already exist after a fetch; synthesize the local branch
        // from the symbolic HEAD.
        if let Some(name) = unborn_branch_name(runner, path).await {
            branches.push(BranchInfo {
                name,
                is_current: true,
                is_remote: false,
                remote: None,
                upstream: None,
                ahead: None,
                behind: None,
                last_commit_hash: None,
                last_commit_message: None,
            });
        }
    }

    if branches.is_empty() {
        return Ok(branches);
    }

    enrich_branches(runner, path, &mut branches).await;

    for branch in &mut branches {
        if !branch.is_remote && !current.is_empty() && current != "HEAD" && branch.name == current {
            // Agreement check between `branch` head markers and `rev-parse`.
            branch.is_current = true;
        }
    }

    debug!("Enumerated {} branches", branches.len());
    Ok(branches)
}

/// Merge per-ref hash/subject/upstream/track details onto the skeleton.
///
/// Always attempted; a failing call degrades to the bare skeleton.
async fn enrich_branches(runner: &GitCommandRunner, path: &Path, branches: &mut [BranchInfo]) {
    let mut details: HashMap<String, RefDetail> = HashMap::new();

    for scope in ["refs/heads", "refs/remotes"] {
        match runner
            .run(path, &["for-each-ref", scope, &format!("--format={ENRICH_FORMAT}")], DEFAULT_TIMEOUT_MS)
            .await
        {
            Ok(output) => {
                for detail in parse_enrichment_lines(&output.stdout) {
                    details.insert(detail.name.clone(), detail);
                }
            }
            Err(err) => warn!("branch enrichment for {} failed: {}", scope, err),
        }
    }

    for branch in branches.iter_mut() {
        let Some(detail) = details.get(&branch.name) else {
            continue;
        };
        branch.last_commit_hash = Some(detail.short_hash.clone());
        branch.last_commit_message = Some(detail.subject.clone());
        if !branch.is_remote {
            // Remote-tracking branches never carry upstream or counts.
            branch.upstream = detail.upstream.clone();
            let (ahead, behind) = parse_track(detail.track.as_deref().unwrap_or(""));
            branch.ahead = ahead;
            branch.behind = behind;
        }
    }
}

async fn unborn_branch_name(runner: &GitCommandRunner, path: &Path) -> Option<String> {
    let output = runner
        .run(path, &["symbolic-ref", "--short", "HEAD"], DEFAULT_TIMEOUT_MS)
        .await
        .ok()?;
    let name = strip_quotes(output.stdout.trim()).to_string();
    if name.is_empty() || name.starts_with("fatal:") {
        None
    } else {
        Some(name)
    }
}

/// Parse `head-marker|short-name|full-refname` lines into branch skeletons.
fn parse_branch_lines(output: &str) -> Vec<BranchInfo> {
    let mut branches = Vec::new();
    for raw_line in output.lines() {
        let line = strip_quotes(raw_line.trim());
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('|').map(strip_quotes).collect();
        if parts.len() < 3 {
            continue;
        }
        let head_marker = parts[0].trim();
        let name = parts[1].trim();
        let full_ref = parts[2].trim();

        // Skip symbolic pointers (origin/HEAD) and detached placeholders.
        if name.is_empty() || name == "HEAD" || name.ends_with("/HEAD") || name.starts_with('(') {
            continue;
        }

        let is_remote = full_ref.contains("remotes");
        let remote = if is_remote {
            name.split('/').next().map(str::to_string)
        } else {
            None
        };

        branches.push(BranchInfo {
            name: name.to_string(),
            is_current: head_marker == "*",
            is_remote,
            remote,
            upstream: None,
            ahead: None,
            behind: None,
            last_commit_hash: None,
            last_commit_message: None,
        });
    }
    branches
}

struct RefDetail {
    name: String,
    short_hash: String,
    subject: String,
    upstream: Option<String>,
    track: Option<String>,
}

/// Parse `name|hash|subject|upstream|track` enrichment lines.
///
/// The subject may itself contain `|`, so the outer fields are taken from
/// the ends and the middle is rejoined.
fn parse_enrichment_lines(output: &str) -> Vec<RefDetail> {
    let mut details = Vec::new();
    for raw_line in output.lines() {
        let line = strip_quotes(raw_line.trim());
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('|').map(strip_quotes).collect();
        if parts.len() < 5 {
            continue;
        }
        let name = parts[0].trim();
        if name.is_empty() {
            continue;
        }
        let track = parts[parts.len() - 1].trim();
        let upstream = parts[parts.len() - 2].trim();
        let subject = parts[2..parts.len() - 2].join("|");

        details.push(RefDetail {
            name: name.to_string(),
            short_hash: parts[1].trim().to_string(),
            subject,
            upstream: if upstream.is_empty() {
                None
            } else {
                Some(upstream.to_string())
            },
            track: if track.is_empty() {
                None
            } else {
                Some(track.to_string())
            },
        });
    }
    details
}

/// Extract ahead/behind counts from upstream tracking text.
///
/// Either, both, or neither token may be present; `[ahead 2, behind 1]`,
/// `[ahead 3]`, `[gone]`, and empty text are all valid inputs.
pub(crate) fn parse_track(track: &str) -> (Option<u32>, Option<u32>) {
    let ahead = AHEAD_RE
        .captures(track)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());
    let behind = BEHIND_RE
        .captures(track)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());
    (ahead, behind)
}

/// Strip one matching pair of quotes some shells wrap around a whole line
/// or an individual field.
pub(crate) fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
