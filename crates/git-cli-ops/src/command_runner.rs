use crate::GitOpsError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default per-invocation budget.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Output beyond this is discarded and reported as a failure.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Raw output from a git subprocess.
///
/// Both streams are verbatim, trailing newline included: porcelain paths may
/// begin or end with whitespace. Callers reading a scalar value trim at the
/// use site.
#[derive(Debug, Clone)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Responsible for locating and executing the git CLI.
#[derive(Debug, Clone)]
pub struct GitCommandRunner {
    executable: String,
}

impl Default for GitCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommandRunner {
    pub fn new() -> Self {
        Self {
            executable: resolve_git_executable(),
        }
    }

    /// Run one git subcommand in `repo_path`.
    ///
    /// A non-zero exit that still produced stdout or stderr text is returned
    /// as success: many plumbing probes signal "not found" through the exit
    /// code while emitting a body the caller must parse. A non-zero exit
    /// with an empty body is a [`GitOpsError::CommandFailed`].
    pub async fn run(
        &self,
        repo_path: &Path,
        args: &[&str],
        timeout_ms: u64,
    ) -> Result<GitCommandOutput, GitOpsError> {
        let output = self.spawn(repo_path, args, timeout_ms).await?;

        if !output.status_success
            && output.stdout.trim().is_empty()
            && output.stderr.trim().is_empty()
        {
            return Err(GitOpsError::CommandFailed {
                message: format!(
                    "git {} exited with code {:?} and no output",
                    args.join(" "),
                    output.exit_code
                ),
                exit_code: output.exit_code,
                stderr: String::new(),
                stdout: String::new(),
            });
        }

        Ok(GitCommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Run one git subcommand, treating any non-zero exit as failure.
    ///
    /// Used by mutating operations, where the lenient contract of [`run`]
    /// would swallow a real refusal printed to stderr.
    ///
    /// [`run`]: GitCommandRunner::run
    pub async fn run_checked(
        &self,
        repo_path: &Path,
        args: &[&str],
        timeout_ms: u64,
    ) -> Result<GitCommandOutput, GitOpsError> {
        let output = self.spawn(repo_path, args, timeout_ms).await?;

        if !output.status_success {
            return Err(GitOpsError::CommandFailed {
                message: non_empty(
                    &output.stderr,
                    &output.stdout,
                    &format!(
                        "git {} failed with exit code {:?}",
                        args.join(" "),
                        output.exit_code
                    ),
                ),
                exit_code: output.exit_code,
                stderr: output.stderr,
                stdout: output.stdout,
            });
        }

        Ok(GitCommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn spawn(
        &self,
        repo_path: &Path,
        args: &[&str],
        timeout_ms: u64,
    ) -> Result<RawOutput, GitOpsError> {
        let command_repr = format!("{} {}", self.executable, args.join(" "));
        debug!("Running: {}", command_repr);

        let mut cmd = Command::new(&self.executable);
        cmd.args(args);
        cmd.current_dir(repo_path);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        apply_non_interactive_env(&mut cmd);

        let output = match timeout(Duration::from_millis(timeout_ms), cmd.output()).await {
            // Dropping the future kills the child; partial output is discarded.
            Err(_) => {
                return Err(GitOpsError::Timeout {
                    command: command_repr,
                    timeout_ms,
                });
            }
            Ok(Err(err)) => {
                return if err.kind() == std::io::ErrorKind::NotFound {
                    Err(GitOpsError::GitNotInstalled)
                } else {
                    Err(GitOpsError::CommandFailed {
                        message: format!("failed to execute git command: {err}"),
                        exit_code: None,
                        stderr: String::new(),
                        stdout: String::new(),
                    })
                };
            }
            Ok(Ok(output)) => output,
        };

        if output.stdout.len() > MAX_OUTPUT_BYTES || output.stderr.len() > MAX_OUTPUT_BYTES {
            return Err(GitOpsError::CommandFailed {
                message: format!(
                    "git {} produced more than {} bytes of output",
                    args.join(" "),
                    MAX_OUTPUT_BYTES
                ),
                exit_code: output.status.code(),
                stderr: String::new(),
                stdout: String::new(),
            });
        }

        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status_success: output.status.success(),
            exit_code: output.status.code(),
        })
    }
}

struct RawOutput {
    stdout: String,
    stderr: String,
    status_success: bool,
    exit_code: Option<i32>,
}

/// Disable credential prompts and pin the locale so dates and messages are
/// stable across platforms.
fn apply_non_interactive_env(cmd: &mut Command) {
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("GIT_ASKPASS", "echo");
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
}

fn resolve_git_executable() -> String {
    if let Ok(path) = std::env::var("GIT_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    for candidate in ["/opt/homebrew/bin/git", "/usr/local/bin/git", "/usr/bin/git"] {
        if Path::new(candidate).exists() {
            return candidate.to_string();
        }
    }

    "git".to_string()
}

fn non_empty(primary: &str, secondary: &str, fallback: &str) -> String {
    if !primary.trim().is_empty() {
        primary.to_string()
    } else if !secondary.trim().is_empty() {
        secondary.to_string()
    } else {
        fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_honors_git_path_env() {
        // Only checks precedence logic indirectly; the resolver must never
        // return an empty executable.
        let exe = resolve_git_executable();
        assert!(!exe.is_empty());
    }

    #[test]
    fn non_empty_prefers_primary() {
        assert_eq!(non_empty("stderr text", "stdout text", "fallback"), "stderr text");
        assert_eq!(non_empty("  ", "stdout text", "fallback"), "stdout text");
        assert_eq!(non_empty("", "", "fallback"), "fallback");
    }

    #[tokio::test]
    async fn lenient_run_returns_probe_output_on_nonzero_exit() {
        let runner = GitCommandRunner::new();
        let dir = std::env::temp_dir();
        // `rev-parse --is-inside-work-tree` outside a repo exits non-zero
        // but prints a fatal line; the lenient contract returns it.
        let result = runner
            .run(&dir, &["rev-parse", "--is-inside-work-tree"], DEFAULT_TIMEOUT_MS)
            .await;
        match result {
            Ok(output) => assert_ne!(output.stdout.trim(), "true"),
            Err(GitOpsError::GitNotInstalled) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_as_timeout() {
        let runner = GitCommandRunner::new();
        let dir = std::env::temp_dir();
        // A zero budget elapses before any child can respond; the error must
        // be distinct from an empty result and carry the command text.
        let err = runner
            .run(&dir, &["status"], 0)
            .await
            .expect_err("zero budget must time out");
        assert_eq!(err.code(), "timeout");
        let text = err.to_string();
        assert!(text.contains("status"), "missing command text: {text}");
        assert!(text.contains("0ms"), "missing budget: {text}");
    }

    #[tokio::test]
    async fn output_is_returned_verbatim() {
        let runner = GitCommandRunner::new();
        let dir = std::env::temp_dir();
        match runner.run(&dir, &["version"], DEFAULT_TIMEOUT_MS).await {
            Ok(output) => {
                assert!(output.stdout.starts_with("git version"));
                assert!(output.stdout.ends_with('\n'));
            }
            Err(GitOpsError::GitNotInstalled) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn checked_run_fails_on_nonzero_exit() {
        let runner = GitCommandRunner::new();
        let dir = std::env::temp_dir();
        let result = runner
            .run_checked(&dir, &["rev-parse", "--show-toplevel"], DEFAULT_TIMEOUT_MS)
            .await;
        match result {
            Err(GitOpsError::CommandFailed { .. }) | Err(GitOpsError::GitNotInstalled) => {}
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
