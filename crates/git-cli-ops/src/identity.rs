//! Repository detection, root discovery, and user config access.

use crate::command_runner::{GitCommandRunner, DEFAULT_TIMEOUT_MS};
use crate::types::GitUserConfig;
use crate::GitOpsError;
use std::path::Path;
use tracing::debug;

/// Whether `path` lives inside a git working tree.
pub async fn is_repo(runner: &GitCommandRunner, path: &Path) -> bool {
    match runner
        .run(path, &["rev-parse", "--is-inside-work-tree"], DEFAULT_TIMEOUT_MS)
        .await
    {
        Ok(output) => output.stdout.trim() == "true",
        Err(_) => false,
    }
}

/// Top-level directory of the working tree containing `path`.
pub async fn get_root(
    runner: &GitCommandRunner,
    path: &Path,
) -> Result<Option<String>, GitOpsError> {
    let output = runner
        .run(path, &["rev-parse", "--show-toplevel"], DEFAULT_TIMEOUT_MS)
        .await?;
    let root = output.stdout.trim();
    if root.is_empty() || root.starts_with("fatal:") {
        return Ok(None);
    }
    Ok(Some(root.to_string()))
}

/// Read `user.name` and `user.email` as two independent single-key probes.
///
/// A field is set only when its read succeeds with non-blank text. A missing
/// key is not an error; it surfaces as `None`, which is distinct from an
/// empty string set at some scope.
pub async fn get_user_config(runner: &GitCommandRunner, path: &Path) -> GitUserConfig {
    GitUserConfig {
        name: read_config_key(runner, path, "user.name").await,
        email: read_config_key(runner, path, "user.email").await,
    }
}

async fn read_config_key(runner: &GitCommandRunner, path: &Path, key: &str) -> Option<String> {
    let output = runner
        .run_checked(path, &["config", "--get", key], DEFAULT_TIMEOUT_MS)
        .await
        .ok()?;
    let value = output.stdout.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Write, unset, or skip `user.name` / `user.email` independently.
///
/// Per field: a non-empty value sets the key, an explicit empty string
/// unsets it at the same scope, and `None` leaves it untouched.
pub async fn set_user_config(
    runner: &GitCommandRunner,
    path: &Path,
    name: Option<&str>,
    email: Option<&str>,
    global: bool,
) -> Result<(), GitOpsError> {
    debug!(global, "Updating user config");
    if let Some(value) = name {
        write_config_key(runner, path, "user.name", value, global).await?;
    }
    if let Some(value) = email {
        write_config_key(runner, path, "user.email", value, global).await?;
    }
    Ok(())
}

async fn write_config_key(
    runner: &GitCommandRunner,
    path: &Path,
    key: &str,
    value: &str,
    global: bool,
) -> Result<(), GitOpsError> {
    let mut args: Vec<&str> = vec!["config"];
    if global {
        args.push("--global");
    }
    if value.is_empty() {
        args.push("--unset");
        args.push(key);
        // Unsetting a key that was never set exits non-zero; that is the
        // requested end state, not a failure.
        match runner.run_checked(path, &args, DEFAULT_TIMEOUT_MS).await {
            Ok(_) => Ok(()),
            Err(GitOpsError::CommandFailed { exit_code: Some(5), .. }) => Ok(()),
            Err(err) => Err(err),
        }
    } else {
        args.push(key);
        args.push(value);
        runner.run_checked(path, &args, DEFAULT_TIMEOUT_MS).await?;
        Ok(())
    }
}
