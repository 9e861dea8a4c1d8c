//! Commit history decoding.
//!
//! The log format joins twelve fixed fields with a NUL byte: commit text
//! may contain any visible character but never NUL, which makes it an
//! unambiguous field delimiter. Records are terminated with an ASCII record
//! separator (0x1e) rather than a newline, so commit bodies containing
//! literal newlines stay inside one record.

use crate::branches::strip_quotes;
use crate::command_runner::{GitCommandRunner, DEFAULT_TIMEOUT_MS};
use crate::types::CommitInfo;
use crate::GitOpsError;
use std::path::Path;
use tracing::debug;

/// Twelve NUL-joined fields, one RS-terminated record per commit.
const LOG_FORMAT: &str = "%H%x00%h%x00%s%x00%b%x00%an%x00%ae%x00%aI%x00%cn%x00%ce%x00%cI%x00%P%x00%D%x1e";

const FIELD_COUNT: usize = 12;

const RECORD_SEPARATOR: char = '\u{1e}';

/// Fetch up to `limit` commits, from all branches when `all_branches` is set.
///
/// An empty repository (zero commits) yields an empty list, not an error.
pub async fn get_commit_log(
    runner: &GitCommandRunner,
    path: &Path,
    limit: u32,
    all_branches: bool,
) -> Result<Vec<CommitInfo>, GitOpsError> {
    let limit_arg = limit.to_string();
    let format_arg = format!("--pretty=format:{LOG_FORMAT}");
    let mut args: Vec<&str> = vec!["log", &format_arg, "--date=iso-strict", "-n", &limit_arg];
    if all_branches {
        args.push("--all");
    }

    let output = runner.run(path, &args, DEFAULT_TIMEOUT_MS).await?;
    let commits = parse_log_output(&output.stdout);
    debug!("Parsed {} commits", commits.len());
    Ok(commits)
}

/// Decode raw log output into commit records.
///
/// Records with fewer than twelve fields are dropped individually; their
/// valid siblings still parse.
pub(crate) fn parse_log_output(output: &str) -> Vec<CommitInfo> {
    let mut commits = Vec::new();
    for raw_record in output.split(RECORD_SEPARATOR) {
        let record = strip_quotes(raw_record.trim_matches(['\n', '\r', ' ']));
        if record.is_empty() {
            continue;
        }
        if let Some(commit) = parse_record(record) {
            commits.push(commit);
        }
    }
    commits
}

fn parse_record(record: &str) -> Option<CommitInfo> {
    let fields: Vec<&str> = record.split('\0').collect();
    if fields.len() < FIELD_COUNT {
        return None;
    }

    let body = fields[3].trim_end_matches('\n');
    let parents: Vec<String> = fields[10]
        .split(' ')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    let refs: Vec<String> = fields[11]
        .split(", ")
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    Some(CommitInfo {
        hash: fields[0].to_string(),
        short_hash: fields[1].to_string(),
        subject: fields[2].to_string(),
        body: if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        },
        author_name: fields[4].to_string(),
        author_email: fields[5].to_string(),
        author_date: fields[6].to_string(),
        committer_name: fields[7].to_string(),
        committer_email: fields[8].to_string(),
        commit_date: fields[9].to_string(),
        parents,
        refs: if refs.is_empty() { None } else { Some(refs) },
    })
}
