//! Remote discovery and per-remote branch listing.

use crate::command_runner::{GitCommandRunner, DEFAULT_TIMEOUT_MS};
use crate::types::RemoteInfo;
use crate::GitOpsError;
use futures_util::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// `<name>\t<url> (fetch|push)` as printed by `git remote -v`.
static REMOTE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\t(.+) \((fetch|push)\)$").expect("remote line pattern"));

/// Per-remote listings hit the network; keep the fan-out bounded.
const REMOTE_LIST_CONCURRENCY: usize = 4;

/// List configured remotes with merged fetch/push URLs and their advertised
/// branch heads.
pub async fn get_remotes(
    runner: &GitCommandRunner,
    path: &Path,
) -> Result<Vec<RemoteInfo>, GitOpsError> {
    let output = runner
        .run(path, &["remote", "-v"], DEFAULT_TIMEOUT_MS)
        .await?;
    let mut remotes = parse_remote_lines(&output.stdout);

    // Independent per-remote calls; safe to run concurrently. Timeouts
    // still propagate so callers can tell "empty" from "hung".
    let listings: Vec<Result<(String, Vec<String>), GitOpsError>> = stream::iter(
        remotes
            .keys()
            .cloned()
            .map(|name| async move {
                let branch_names = list_remote_branches(runner, path, &name).await?;
                Ok::<_, GitOpsError>((name, branch_names))
            })
            .collect::<Vec<_>>(),
    )
    .buffer_unordered(REMOTE_LIST_CONCURRENCY)
    .collect()
    .await;

    for listing in listings {
        let (name, branch_names) = listing?;
        if let Some(remote) = remotes.get_mut(&name) {
            remote.branches = Some(branch_names);
        }
    }

    debug!("Enumerated {} remotes", remotes.len());
    Ok(remotes.into_values().collect())
}

async fn list_remote_branches(
    runner: &GitCommandRunner,
    path: &Path,
    name: &str,
) -> Result<Vec<String>, GitOpsError> {
    // An unreachable remote prints its refusal to stderr and parses to an
    // empty list; only timeouts and spawn failures surface as errors.
    let output = runner
        .run(path, &["ls-remote", "--heads", name], DEFAULT_TIMEOUT_MS)
        .await?;
    Ok(parse_ls_remote_heads(&output.stdout))
}

/// Accumulate `remote -v` lines into a name-keyed map, writing fetch or
/// push URL per direction. Non-matching lines are informational and skipped.
pub(crate) fn parse_remote_lines(output: &str) -> BTreeMap<String, RemoteInfo> {
    let mut remotes: BTreeMap<String, RemoteInfo> = BTreeMap::new();
    for line in output.lines() {
        let Some(captures) = REMOTE_LINE_RE.captures(line.trim_end()) else {
            continue;
        };
        let name = &captures[1];
        let url = captures[2].to_string();
        let entry = remotes
            .entry(name.to_string())
            .or_insert_with(|| RemoteInfo {
                name: name.to_string(),
                fetch_url: String::new(),
                push_url: String::new(),
                branches: None,
            });
        match &captures[3] {
            "fetch" => entry.fetch_url = url,
            _ => entry.push_url = url,
        }
    }
    remotes
}

/// Extract bare branch names from `ls-remote --heads` output.
pub(crate) fn parse_ls_remote_heads(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            line.split_once("refs/heads/")
                .map(|(_, name)| name.trim().to_string())
        })
        .filter(|name| !name.is_empty())
        .collect()
}
