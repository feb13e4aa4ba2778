#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Create a temporary git repository with an initial empty commit, so
/// `HEAD` exists and `git diff`/`git apply --cached` have something to
/// compare against.
pub fn create_temp_repo() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    run_git(dir.path(), &["init", "-q"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "user.name", "Test"]);
    run_git(
        dir.path(),
        &["commit", "--allow-empty", "-q", "-m", "initial commit"],
    );
    dir
}

/// Write, stage and commit a file.
pub fn commit_file(repo: &Path, path: &str, content: &str) {
    write_file(repo, path, content);
    run_git(repo, &["add", "--", path]);
    run_git(repo, &["commit", "-q", "-m", &format!("add {path}")]);
}

/// Overwrite a tracked file's working-tree content without staging it.
pub fn write_file(repo: &Path, path: &str, content: &str) {
    let full_path = repo.join(path);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full_path, content).unwrap();
}

/// `git diff` against the working tree (unstaged changes).
pub fn unstaged_diff(repo: &Path) -> String {
    run_git(repo, &["diff"])
}

/// `git diff --cached` against the staging index.
pub fn staged_diff(repo: &Path) -> String {
    run_git(repo, &["diff", "--cached"])
}

/// File paths currently in the staging index.
pub fn staged_files(repo: &Path) -> Vec<String> {
    run_git(repo, &["diff", "--cached", "--name-only"])
        .lines()
        .map(str::to_string)
        .collect()
}

fn run_git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}
