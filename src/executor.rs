//! Applies a `StagingPlan` against a `ParsedDiff` by materializing each
//! selection into a patch fragment and staging it through a `VcsClient`,
//! tolerating partial failure.
//!
//! Grounded on the teacher's `staging::stage_hunk` for the "apply
//! sequentially, report what succeeded before a failure" shape, redesigned
//! to go through the VCS subprocess boundary instead of direct index
//! manipulation.

use crate::diff::{LineKind, ParsedDiff};
use crate::error::{CompensationError, GitPlanError};
use crate::hunk::{edit_hunk, generate_patch};
use crate::plan::{Compensation, CompensationAnchor, HunkSelection, SelectionMode, StagingPlan};
use crate::vcs::VcsClient;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Outcome of running a `StagingPlan` to completion or to its first
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub staged_hunks: Vec<String>,
    pub error: Option<String>,
}

pub struct PlanExecutor<'a, V: VcsClient> {
    vcs: &'a V,
}

impl<'a, V: VcsClient> PlanExecutor<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    /// Run every selection in document order. Skips `None` selections;
    /// halts at the first hunk-not-found, patch-rejection, or
    /// staging-failure, returning everything staged before it.
    pub fn execute(&self, plan: &StagingPlan, parsed: &ParsedDiff) -> ExecutionResult {
        let mut staged_hunks = Vec::new();

        for selection in &plan.selections {
            if selection.mode == SelectionMode::None {
                continue;
            }

            let Some(hunk) = parsed.get_hunk(&selection.hunk_id) else {
                tracing::warn!(hunk = %selection.hunk_id, "hunk not found, halting plan execution");
                return ExecutionResult {
                    success: false,
                    staged_hunks,
                    error: Some(format!("Hunk not found: {}", selection.hunk_id)),
                };
            };

            let edited = if selection.mode == SelectionMode::All && selection.line_edits.is_empty() {
                hunk.clone()
            } else {
                let with_edits = apply_line_edits(hunk, &selection.line_edits);
                let (remove_additions, keep_removals) = resolve_edit_sets(&with_edits, selection);
                edit_hunk(&with_edits, &remove_additions, &keep_removals)
            };

            let patch_fragment = generate_patch(&[&edited]);

            match self.vcs.check_patch(&patch_fragment) {
                Ok(check) if check.applies => {}
                Ok(check) => {
                    let detail = check.error.unwrap_or_default();
                    tracing::warn!(hunk = %selection.hunk_id, %detail, "patch rejected, halting plan execution");
                    return ExecutionResult {
                        success: false,
                        staged_hunks,
                        error: Some(format!(
                            "Patch for {} won't apply: {detail}",
                            selection.hunk_id
                        )),
                    };
                }
                Err(e) => {
                    tracing::warn!(hunk = %selection.hunk_id, error = %e, "patch check failed, halting plan execution");
                    return ExecutionResult {
                        success: false,
                        staged_hunks,
                        error: Some(format!("Patch for {} won't apply: {e}", selection.hunk_id)),
                    };
                }
            }

            match self.vcs.apply_patch_to_index(&patch_fragment) {
                Ok(outcome) if outcome.success => {}
                Ok(outcome) => {
                    let detail = outcome.error.unwrap_or_default();
                    tracing::warn!(hunk = %selection.hunk_id, %detail, "staging failed, halting plan execution");
                    return ExecutionResult {
                        success: false,
                        staged_hunks,
                        error: Some(format!("Failed to stage {}: {detail}", selection.hunk_id)),
                    };
                }
                Err(e) => {
                    tracing::warn!(hunk = %selection.hunk_id, error = %e, "staging failed, halting plan execution");
                    return ExecutionResult {
                        success: false,
                        staged_hunks,
                        error: Some(format!("Failed to stage {}: {e}", selection.hunk_id)),
                    };
                }
            }

            tracing::debug!(hunk = %selection.hunk_id, "staged hunk");
            staged_hunks.push(selection.hunk_id.clone());
        }

        ExecutionResult {
            success: true,
            staged_hunks,
            error: None,
        }
    }

    /// Apply every compensation in order, stopping at the first failure.
    /// Returns the list of files already modified so a caller can revert
    /// them.
    pub fn apply_compensations(
        &self,
        repo_root: &Path,
        compensations: &[Compensation],
    ) -> Result<Vec<String>, (GitPlanError, Vec<String>)> {
        let mut modified = Vec::new();

        for comp in compensations {
            if let Err(e) = apply_one_compensation(repo_root, comp) {
                return Err((GitPlanError::Compensation(e), modified));
            }
            if let Err(e) = self.vcs.stage_file(&comp.file) {
                modified.push(comp.file.clone());
                return Err((
                    GitPlanError::Compensation(CompensationError::Stage {
                        file: comp.file.clone(),
                        detail: e.to_string(),
                    }),
                    modified,
                ));
            }
            tracing::debug!(file = %comp.file, "applied compensation");
            modified.push(comp.file.clone());
        }

        Ok(modified)
    }
}

fn apply_line_edits(hunk: &crate::diff::Hunk, edits: &[(usize, String)]) -> crate::diff::Hunk {
    let mut edited = hunk.clone();
    for (idx, content) in edits {
        if let Some(line) = edited.lines.get_mut(*idx) {
            line.content = content.clone();
        }
    }
    edited
}

/// Additions not named in `includeAdditions` are dropped; removals not
/// named in `includeRemovals` are demoted back to context.
fn resolve_edit_sets(
    hunk: &crate::diff::Hunk,
    selection: &HunkSelection,
) -> (HashSet<usize>, HashSet<usize>) {
    if selection.mode == SelectionMode::All {
        return (HashSet::new(), HashSet::new());
    }

    let all_add_indices: HashSet<usize> = hunk
        .lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.kind == LineKind::Add)
        .map(|(i, _)| i)
        .collect();
    let all_remove_indices: HashSet<usize> = hunk
        .lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.kind == LineKind::Remove)
        .map(|(i, _)| i)
        .collect();

    let included_adds = selection.include_additions.clone().unwrap_or_default();
    let included_removes = selection.include_removals.clone().unwrap_or_default();

    let remove_additions = all_add_indices
        .difference(&included_adds.into_iter().collect())
        .copied()
        .collect();
    let keep_removals = all_remove_indices
        .difference(&included_removes.into_iter().collect())
        .copied()
        .collect();

    (remove_additions, keep_removals)
}

fn comment_markers(file: &str) -> (&'static str, &'static str) {
    let ext = Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "py" | "rb" | "sh" => ("#", "#"),
        "html" => ("<!--", "-->"),
        "css" => ("/*", "*/"),
        _ => ("//", "//"),
    }
}

fn apply_one_compensation(repo_root: &Path, comp: &Compensation) -> Result<(), CompensationError> {
    let full_path = repo_root.join(&comp.file);
    let original = fs::read_to_string(&full_path).map_err(|e| CompensationError::Read {
        file: comp.file.clone(),
        detail: e.to_string(),
    })?;

    let mut lines: Vec<String> = original.lines().map(String::from).collect();
    let insert_at = resolve_anchor(&lines, comp).ok_or_else(|| CompensationError::AnchorNotFound {
        file: comp.file.clone(),
        anchor: describe_anchor(comp),
    })?;

    let (open, close) = comment_markers(&comp.file);
    let mut insertion = vec![format!("{open} compensation begin {close}")];
    insertion.extend(comp.content.lines().map(String::from));
    insertion.push(format!("{open} compensation end {close}"));

    lines.splice(insert_at..insert_at, insertion);

    let mut new_content = lines.join("\n");
    new_content.push('\n');
    fs::write(&full_path, new_content).map_err(|e| CompensationError::Write {
        file: comp.file.clone(),
        detail: e.to_string(),
    })?;

    Ok(())
}

fn describe_anchor(comp: &Compensation) -> String {
    match &comp.anchor {
        CompensationAnchor::LineNumber(n) => n.to_string(),
        CompensationAnchor::AfterPattern(p) => p.clone(),
        CompensationAnchor::BeforePattern(p) => p.clone(),
    }
}

/// Resolve the insertion point, returning an index into `lines` such that
/// `lines.splice(idx..idx, ...)` inserts at the correct spot.
fn resolve_anchor(lines: &[String], comp: &Compensation) -> Option<usize> {
    match &comp.anchor {
        CompensationAnchor::LineNumber(n) => {
            let idx = *n as usize;
            (idx <= lines.len()).then_some(idx)
        }
        CompensationAnchor::AfterPattern(pattern) => lines
            .iter()
            .position(|l| l.contains(pattern.as_str()))
            .map(|i| i + 1),
        CompensationAnchor::BeforePattern(pattern) => {
            lines.iter().position(|l| l.contains(pattern.as_str()))
        }
    }
}
