//! Structured error types for each failure category in the system.
//!
//! Parse faults are deliberately absent here: the parser never raises
//! (see [`crate::diff`]). `validate_hunk` is the one explicit checker and
//! reports [`ValidationError`]. Selection, VCS and compensation failures
//! are modeled as [`GitPlanError`] variants so callers can match on the
//! failure kind instead of parsing a message.

use thiserror::Error;

/// Why `validate_hunk` rejected a hunk's line-count bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Old count mismatch: header says {expected} but found {actual}")]
    OldCount { expected: u32, actual: u32 },
    #[error("New count mismatch: header says {expected} but found {actual}")]
    NewCount { expected: u32, actual: u32 },
}

/// A compensation failed to apply to a working-tree file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompensationError {
    #[error("Could not read {file}: {detail}")]
    Read { file: String, detail: String },
    #[error("Could not write {file}: {detail}")]
    Write { file: String, detail: String },
    #[error("Anchor not found in {file}: {anchor}")]
    AnchorNotFound { file: String, anchor: String },
    #[error("Failed to stage compensated file {file}: {detail}")]
    Stage { file: String, detail: String },
}

/// Top-level error type returned by the executor and the VCS client.
///
/// Display strings for `HunkNotFound`, `PatchRejected` and `StagingFailed`
/// intentionally match spec wording (`"Hunk not found: <id>"`,
/// `"Patch for <id> won't apply: <tool error>"`,
/// `"Failed to stage <id>: <tool error>"`) so plain string consumers and
/// typed-match consumers see the same text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitPlanError {
    #[error("Hunk not found: {0}")]
    HunkNotFound(String),

    #[error("Patch for {id} won't apply: {detail}")]
    PatchRejected { id: String, detail: String },

    #[error("Failed to stage {id}: {detail}")]
    StagingFailed { id: String, detail: String },

    #[error(transparent)]
    Compensation(#[from] CompensationError),

    #[error("VCS operation failed: {0}")]
    Vcs(String),
}
