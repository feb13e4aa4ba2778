//! The version-control tool, modeled as an opaque subprocess collaborator.
//!
//! Grounded on the teacher's `spawn.rs` (bare `std::process::Command`
//! invocation) and `git.rs` (the set of git operations the application
//! needs), generalized per the spec's explicit process-interop design
//! note: patch text always goes through standard input, never a command
//! argument, to avoid quoting hazards.

use crate::error::GitPlanError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Mirrors the teacher's `MAX_PATCH_SIZE` stdin guard in `main.rs`.
pub const MAX_PATCH_SIZE: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchCheck {
    pub applies: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub success: bool,
    pub hash: Option<String>,
    pub error: Option<String>,
}

/// The eleven operations the executor and formatter need from the
/// version-control tool. Implementations must tolerate tens of megabytes
/// of patch text on standard input.
pub trait VcsClient {
    fn get_unstaged_diff(&self) -> Result<String, GitPlanError>;
    fn get_staged_diff(&self) -> Result<String, GitPlanError>;
    fn get_diff_with_context(&self, context_lines: u32) -> Result<String, GitPlanError>;
    fn check_patch(&self, patch_text: &str) -> Result<PatchCheck, GitPlanError>;
    fn apply_patch_to_index(&self, patch_text: &str) -> Result<ApplyOutcome, GitPlanError>;
    fn apply_patch_with_recount(&self, patch_text: &str) -> Result<ApplyOutcome, GitPlanError>;
    fn reverse_patch(&self, patch_text: &str) -> Result<ApplyOutcome, GitPlanError>;
    fn reset_staging(&self) -> Result<(), GitPlanError>;
    fn get_staged_files(&self) -> Result<Vec<String>, GitPlanError>;
    fn commit(&self, message: &str) -> Result<CommitOutcome, GitPlanError>;
    fn get_status(&self) -> Result<String, GitPlanError>;

    /// Stage a file in its entirety, as opposed to a generated patch
    /// fragment. Used by compensation application (spec §4.4), which
    /// writes a whole file back to disk and stages it wholesale rather
    /// than synthesizing a diff for it.
    fn stage_file(&self, path: &str) -> Result<(), GitPlanError>;
}

/// A `VcsClient` backed by the `git` binary, invoked as a subprocess with
/// the repository root as its working directory.
pub struct GitCli {
    repo_root: std::path::PathBuf,
}

impl GitCli {
    pub fn new(repo_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<std::process::Output, GitPlanError> {
        tracing::trace!(?args, "spawning git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| GitPlanError::Vcs(format!("failed to spawn git {args:?}: {e}")))?;
        if !output.status.success() {
            tracing::warn!(?args, stderr = %stderr_of(&output), "git exited non-zero");
        }
        Ok(output)
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> Result<std::process::Output, GitPlanError> {
        if input.len() > MAX_PATCH_SIZE {
            return Err(GitPlanError::Vcs(format!(
                "patch text of {} bytes exceeds the {} byte limit",
                input.len(),
                MAX_PATCH_SIZE
            )));
        }

        tracing::trace!(?args, bytes = input.len(), "spawning git with patch on stdin");

        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GitPlanError::Vcs(format!("failed to spawn git {args:?}: {e}")))?;

        child
            .stdin
            .take()
            .expect("stdin was piped")
            .write_all(input.as_bytes())
            .map_err(|e| GitPlanError::Vcs(format!("failed to write patch to git stdin: {e}")))?;

        let output = child
            .wait_with_output()
            .map_err(|e| GitPlanError::Vcs(format!("failed waiting on git {args:?}: {e}")))?;
        if !output.status.success() {
            tracing::warn!(?args, stderr = %stderr_of(&output), "git exited non-zero");
        }
        Ok(output)
    }
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

impl VcsClient for GitCli {
    fn get_unstaged_diff(&self) -> Result<String, GitPlanError> {
        let output = self.run(&["diff"])?;
        Ok(stdout_of(&output))
    }

    fn get_staged_diff(&self) -> Result<String, GitPlanError> {
        let output = self.run(&["diff", "--cached"])?;
        Ok(stdout_of(&output))
    }

    fn get_diff_with_context(&self, context_lines: u32) -> Result<String, GitPlanError> {
        let flag = format!("-U{context_lines}");
        let output = self.run(&["diff", &flag])?;
        Ok(stdout_of(&output))
    }

    fn check_patch(&self, patch_text: &str) -> Result<PatchCheck, GitPlanError> {
        let output = self.run_with_stdin(&["apply", "--cached", "--check"], patch_text)?;
        if output.status.success() {
            Ok(PatchCheck {
                applies: true,
                error: None,
            })
        } else {
            Ok(PatchCheck {
                applies: false,
                error: Some(stderr_of(&output)),
            })
        }
    }

    fn apply_patch_to_index(&self, patch_text: &str) -> Result<ApplyOutcome, GitPlanError> {
        let output = self.run_with_stdin(&["apply", "--cached"], patch_text)?;
        Ok(ApplyOutcome {
            success: output.status.success(),
            error: (!output.status.success()).then(|| stderr_of(&output)),
        })
    }

    fn apply_patch_with_recount(&self, patch_text: &str) -> Result<ApplyOutcome, GitPlanError> {
        let output = self.run_with_stdin(&["apply", "--cached", "--recount"], patch_text)?;
        Ok(ApplyOutcome {
            success: output.status.success(),
            error: (!output.status.success()).then(|| stderr_of(&output)),
        })
    }

    fn reverse_patch(&self, patch_text: &str) -> Result<ApplyOutcome, GitPlanError> {
        let output = self.run_with_stdin(&["apply", "--cached", "--reverse"], patch_text)?;
        Ok(ApplyOutcome {
            success: output.status.success(),
            error: (!output.status.success()).then(|| stderr_of(&output)),
        })
    }

    fn reset_staging(&self) -> Result<(), GitPlanError> {
        let output = self.run(&["reset"])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(GitPlanError::Vcs(stderr_of(&output)))
        }
    }

    fn get_staged_files(&self) -> Result<Vec<String>, GitPlanError> {
        let output = self.run(&["diff", "--cached", "--name-only"])?;
        Ok(stdout_of(&output)
            .lines()
            .map(|l| l.to_string())
            .collect())
    }

    fn commit(&self, message: &str) -> Result<CommitOutcome, GitPlanError> {
        let output = self.run(&["commit", "-m", message])?;
        if output.status.success() {
            let hash_output = self.run(&["rev-parse", "HEAD"])?;
            Ok(CommitOutcome {
                success: true,
                hash: Some(stdout_of(&hash_output).trim().to_string()),
                error: None,
            })
        } else {
            Ok(CommitOutcome {
                success: false,
                hash: None,
                error: Some(stderr_of(&output)),
            })
        }
    }

    fn get_status(&self) -> Result<String, GitPlanError> {
        let output = self.run(&["status", "--porcelain"])?;
        Ok(stdout_of(&output))
    }

    fn stage_file(&self, path: &str) -> Result<(), GitPlanError> {
        let output = self.run(&["add", "--", path])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(GitPlanError::Vcs(stderr_of(&output)))
        }
    }
}
