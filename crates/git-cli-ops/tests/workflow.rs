mod common;

use git_cli_ops::{FileChangeStatus, GitClient};

#[tokio::test]
async fn stage_commit_roundtrip_leaves_clean_tree() {
    let (_dir, repo_path) = common::init_test_repo();
    common::create_file(&repo_path, "src/app.ts", "export {};\n");
    let client = GitClient::new();

    client
        .stage_files(&repo_path, &["src/app.ts"])
        .await
        .expect("stage_files");

    let staged = client.get_status(&repo_path).await.expect("get_status");
    assert!(!staged.is_clean);
    assert_eq!(staged.staged.len(), 1);
    assert_eq!(staged.staged[0].status, FileChangeStatus::Added);
    assert!(staged.untracked.is_empty());

    client
        .commit(&repo_path, "Add app module")
        .await
        .expect("commit");

    let committed = client.get_status(&repo_path).await.expect("get_status");
    assert!(committed.is_clean);

    let commits = client
        .get_commit_log(&repo_path, 1, false)
        .await
        .expect("get_commit_log");
    assert_eq!(commits[0].subject, "Add app module");
}

#[tokio::test]
async fn unstage_returns_file_to_untracked() {
    let (_dir, repo_path) = common::init_test_repo();
    common::create_file(&repo_path, "notes.txt", "draft\n");
    let client = GitClient::new();

    client
        .stage_files(&repo_path, &["notes.txt"])
        .await
        .expect("stage_files");
    client
        .unstage_files(&repo_path, &["notes.txt"])
        .await
        .expect("unstage_files");

    let status = client.get_status(&repo_path).await.expect("get_status");
    assert!(status.staged.is_empty());
    assert_eq!(status.untracked, vec!["notes.txt".to_string()]);
}

#[tokio::test]
async fn commit_with_nothing_staged_fails() {
    let (_dir, repo_path) = common::init_test_repo();
    let client = GitClient::new();

    let err = client
        .commit(&repo_path, "Nothing to commit")
        .await
        .expect_err("commit must fail");
    assert_eq!(err.code(), "command_failed");
}
