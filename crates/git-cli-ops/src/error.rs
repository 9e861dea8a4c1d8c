use thiserror::Error;

/// Error taxonomy for git CLI orchestration.
///
/// A path that is not a repository is not an error; it surfaces as
/// structured data (`RepoStatus { is_repo: false, .. }`). Lines that do not
/// match an expected pattern are dropped by the parsers rather than failing
/// the whole call.
#[derive(Debug, Error)]
pub enum GitOpsError {
    #[error("git is not installed")]
    GitNotInstalled,

    #[error("git command timed out after {timeout_ms}ms: {command}")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("git command failed: {message}")]
    CommandFailed {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("invalid ref name: {name}")]
    InvalidRefName { name: String },
}

impl GitOpsError {
    /// Stable machine-readable error code for IPC and remote command clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::GitNotInstalled => "git_not_installed",
            Self::Timeout { .. } => "timeout",
            Self::CommandFailed { .. } => "command_failed",
            Self::InvalidRefName { .. } => "invalid_ref_name",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_carries_command_and_budget() {
        let err = GitOpsError::Timeout {
            command: "git status --porcelain=v2".to_string(),
            timeout_ms: 30_000,
        };
        let text = err.to_string();
        assert!(text.contains("30000ms"));
        assert!(text.contains("git status --porcelain=v2"));
    }

    #[test]
    fn command_failed_display_uses_message() {
        let err = GitOpsError::CommandFailed {
            message: "fatal: bad revision".to_string(),
            exit_code: Some(128),
            stderr: String::new(),
            stdout: String::new(),
        };
        assert_eq!(err.to_string(), "git command failed: fatal: bad revision");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(GitOpsError::GitNotInstalled.code(), "git_not_installed");
        assert_eq!(
            GitOpsError::InvalidRefName {
                name: "..".to_string()
            }
            .code(),
            "invalid_ref_name"
        );
    }
}
