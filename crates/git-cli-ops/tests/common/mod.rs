#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Keep fixture repos isolated from the developer's global/system config.
fn isolate_git_env() {
    std::env::set_var("GIT_CONFIG_GLOBAL", "/dev/null");
    std::env::set_var("GIT_CONFIG_SYSTEM", "/dev/null");
}

/// Run a git command in the fixture repo and panic on failure.
pub fn git(repo_path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command that is allowed to fail (conflicting merges).
pub fn git_allow_fail(repo_path: &Path, args: &[&str]) {
    let _ = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("failed to spawn git");
}

/// Create an empty repository on a deterministic `main` branch with a
/// local test identity, but no commits.
pub fn init_empty_repo() -> (TempDir, PathBuf) {
    isolate_git_env();
    let dir = TempDir::new().expect("failed to create temp dir");
    let repo_path = dir.path().to_path_buf();
    git(&repo_path, &["init", "-q"]);
    git(&repo_path, &["checkout", "-q", "-b", "main"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);
    (dir, repo_path)
}

/// Create a repo with a single committed `README.md` on `main`.
pub fn init_test_repo() -> (TempDir, PathBuf) {
    let (dir, repo_path) = init_empty_repo();
    create_file(&repo_path, "README.md", "# Test Repo\n");
    git(&repo_path, &["add", "README.md"]);
    git(&repo_path, &["commit", "-q", "-m", "Initial commit"]);
    (dir, repo_path)
}

/// Create a file in the repo working tree with the given content.
pub fn create_file(repo_path: &Path, name: &str, content: &str) {
    let file_path = repo_path.join(name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dirs");
    }
    fs::write(&file_path, content).expect("failed to write file");
}

/// Stage all changes and create a commit with the given message.
pub fn commit_all(repo_path: &Path, message: &str) {
    git(repo_path, &["add", "-A"]);
    git(repo_path, &["commit", "-q", "-m", message]);
}

/// Create a repo with N sequential commits after the initial commit.
pub fn init_repo_with_commits(n: usize) -> (TempDir, PathBuf) {
    let (dir, repo_path) = init_test_repo();
    for i in 0..n {
        create_file(
            &repo_path,
            &format!("file_{}.txt", i),
            &format!("content {}\n", i),
        );
        commit_all(&repo_path, &format!("Commit {}", i + 1));
    }
    (dir, repo_path)
}

/// Create a bare repository usable as a local remote.
pub fn init_bare_remote() -> (TempDir, PathBuf) {
    isolate_git_env();
    let dir = TempDir::new().expect("failed to create temp dir");
    let remote_path = dir.path().to_path_buf();
    git(&remote_path, &["init", "-q", "--bare"]);
    (dir, remote_path)
}

/// Wire `repo` to a bare remote under `name` and push `main` with tracking.
pub fn add_remote_and_push(repo_path: &Path, name: &str, remote_path: &Path) {
    git(
        repo_path,
        &["remote", "add", name, remote_path.to_str().expect("utf8 path")],
    );
    git(repo_path, &["push", "-q", "-u", name, "main"]);
}
