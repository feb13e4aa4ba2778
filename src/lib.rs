//! Decomposes uncommitted changes in a working tree into a sequence of
//! small, atomic commits: a unified-diff parser, a hunk manipulator, a
//! staging-plan model with a checkbox-document and worksheet-JSON form,
//! a plan executor, and an LLM-facing formatter.

pub mod diff;
pub mod error;
pub mod executor;
pub mod format;
pub mod hunk;
pub mod plan;
pub mod vcs;

pub use diff::{FileDiff, Hunk, Line, LineKind, ParsedDiff};
pub use error::{CompensationError, GitPlanError, ValidationError};
pub use executor::{ExecutionResult, PlanExecutor};
pub use plan::{
    Compensation, CompensationAnchor, CompensationType, HunkSelection, SelectionMode, StagingPlan,
    Worksheet,
};
pub use vcs::{ApplyOutcome, CommitOutcome, GitCli, PatchCheck, VcsClient};
