//! Staging-plan model: checkbox selections, compensations, and the
//! bidirectional translation between a structural model and a
//! human/agent-editable plan document.
//!
//! Grounded on the teacher's feedback-annotation conventions in
//! `feedback.rs` (checkbox-flavored, line-indexed text) and on
//! Fennec's serde-derived hunk types (`other_examples/`) for the
//! worksheet JSON alternative.

use crate::diff::{Hunk, LineKind, ParsedDiff};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// How a hunk participates in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    All,
    None,
    Partial,
}

/// A single hunk's participation in a `StagingPlan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunkSelection {
    pub hunk_id: String,
    pub mode: SelectionMode,
    /// Positions in the hunk's `lines` sequence, never a per-type counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_additions: Option<BTreeSet<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_removals: Option<BTreeSet<usize>>,
    #[serde(default)]
    pub line_edits: Vec<(usize, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HunkSelection {
    fn new(hunk_id: impl Into<String>, mode: SelectionMode) -> Self {
        Self {
            hunk_id: hunk_id.into(),
            mode,
            include_additions: None,
            include_removals: None,
            line_edits: Vec::new(),
            note: None,
        }
    }
}

/// What kind of insertion a compensation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationType {
    AddAfterLine,
    AddBeforeLine,
    ReplaceLine,
}

/// Where in the target file a compensation's content is anchored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationAnchor {
    LineNumber(u32),
    AfterPattern(String),
    BeforePattern(String),
}

/// A temporary insertion into a working-tree file, applied by the executor
/// and reverted once real history supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: CompensationType,
    pub anchor: CompensationAnchor,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_by: Option<String>,
}

/// `{commitMessage, selections, compensations}` — the unit the executor
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingPlan {
    pub commit_message: String,
    pub selections: Vec<HunkSelection>,
    #[serde(default)]
    pub compensations: Vec<Compensation>,
}

const DEFAULT_COMMIT_MESSAGE: &str = "untitled commit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileMark {
    All,
    None,
    Defer,
}

enum Entry {
    File(String, FileMark),
    Hunk(HunkSelection),
}

/// Parse a plan document into a `StagingPlan`. `parsed` supplies the hunk
/// universe needed to expand file-level checkboxes (`[x] <path>` etc.)
/// into per-hunk selections for files that carry no explicit `###`
/// section.
pub fn parse_plan_document(text: &str, parsed: &ParsedDiff) -> StagingPlan {
    let lines: Vec<&str> = text.lines().collect();
    let mut commit_message = DEFAULT_COMMIT_MESSAGE.to_string();
    let mut entries: Vec<Entry> = Vec::new();
    let mut explicit_ids: BTreeSet<String> = BTreeSet::new();

    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim_end();

        if let Some(rest) = trimmed.strip_prefix("Commit message:") {
            let msg = rest.trim();
            commit_message = if msg.is_empty() {
                DEFAULT_COMMIT_MESSAGE.to_string()
            } else {
                msg.to_string()
            };
            i += 1;
        } else if let Some((path, mark)) = parse_file_checkbox(trimmed) {
            entries.push(Entry::File(path, mark));
            i += 1;
        } else if let Some(hunk_id) = trimmed.strip_prefix("### ") {
            let hunk_id = hunk_id.trim().to_string();
            let (selection, next_i) = parse_hunk_section(&hunk_id, &lines, i + 1);
            explicit_ids.insert(hunk_id);
            entries.push(Entry::Hunk(selection));
            i = next_i;
        } else if trimmed.starts_with("COMPENSATE ") {
            let (_comp, next_i) = parse_compensation_block(trimmed, &lines, i + 1);
            // Compensations are collected in a second pass below; here we
            // just skip past the block so the main scan doesn't re-enter it.
            i = next_i;
        } else {
            i += 1;
        }
    }

    let mut selections = Vec::new();
    for entry in entries {
        match entry {
            Entry::File(path, mark) => {
                let expanded_mode = match mark {
                    FileMark::All => SelectionMode::All,
                    FileMark::None => SelectionMode::None,
                    FileMark::Defer => continue,
                };
                for hunk in parsed.get_file_hunks(&path) {
                    if explicit_ids.contains(&hunk.id) {
                        continue;
                    }
                    selections.push(HunkSelection::new(hunk.id.clone(), expanded_mode));
                }
            }
            Entry::Hunk(selection) => selections.push(selection),
        }
    }

    let compensations = parse_all_compensations(&lines);

    StagingPlan {
        commit_message,
        selections,
        compensations,
    }
}

fn parse_file_checkbox(line: &str) -> Option<(String, FileMark)> {
    let rest = line.strip_prefix('[')?;
    let mut chars = rest.chars();
    let marker = chars.next()?;
    let after_marker = chars.as_str().strip_prefix("] ")?;
    let path = after_marker.trim().to_string();
    if path.is_empty() {
        return None;
    }
    match marker {
        'x' | 'X' => Some((path, FileMark::All)),
        ' ' => Some((path, FileMark::None)),
        '~' => Some((path, FileMark::Defer)),
        _ => None,
    }
}

fn fence_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.{3}) \[\s*(\d+)\] (.)(.*)$").expect("valid regex"))
}

fn entire_hunk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\[x\] include entire hunk$").expect("valid regex"))
}

fn parse_hunk_section(hunk_id: &str, lines: &[&str], start: usize) -> (HunkSelection, usize) {
    let mut entire_checked = false;
    let mut include_additions = BTreeSet::new();
    let mut include_removals = BTreeSet::new();
    let mut line_edits = Vec::new();
    let mut saw_partial_marker = false;
    let mut in_fence = false;

    let mut i = start;
    while i < lines.len() {
        let t = lines[i].trim_end();
        if t.starts_with("### ") || t.starts_with("COMPENSATE ") {
            break;
        }
        if t.trim() == "```" {
            in_fence = !in_fence;
            i += 1;
            continue;
        }
        if in_fence {
            if let Some(caps) = fence_line_re().captures(t) {
                let checkbox = &caps[1];
                let idx: usize = caps[2].parse().unwrap_or(0);
                let prefix = caps[3].chars().next().unwrap_or(' ');
                match (checkbox, prefix) {
                    ("[x]", '+') | ("[X]", '+') => {
                        include_additions.insert(idx);
                        saw_partial_marker = true;
                    }
                    ("[x]", '-') | ("[X]", '-') => {
                        include_removals.insert(idx);
                        saw_partial_marker = true;
                    }
                    ("[E]", _) | ("[e]", _) => {
                        include_additions.insert(idx);
                        saw_partial_marker = true;
                    }
                    _ => {}
                }
            }
        } else if entire_hunk_re().is_match(t) {
            entire_checked = true;
        } else if let Some((idx, content)) = parse_edit_line(t) {
            line_edits.push((idx, content));
            saw_partial_marker = true;
        }
        i += 1;
    }

    let mode = if entire_checked {
        SelectionMode::All
    } else if saw_partial_marker {
        SelectionMode::Partial
    } else {
        SelectionMode::None
    };

    let selection = HunkSelection {
        hunk_id: hunk_id.to_string(),
        mode,
        include_additions: if include_additions.is_empty() {
            None
        } else {
            Some(include_additions)
        },
        include_removals: if include_removals.is_empty() {
            None
        } else {
            Some(include_removals)
        },
        line_edits,
        note: None,
    };

    (selection, i)
}

fn parse_edit_line(line: &str) -> Option<(usize, String)> {
    let rest = line.strip_prefix("EDIT [")?;
    let close = rest.find(']')?;
    let idx: usize = rest[..close].trim().parse().ok()?;
    let after = rest[close + 1..].strip_prefix(':')?;
    let content = after.strip_prefix(' ').unwrap_or(after);
    Some((idx, content.to_string()))
}

fn parse_all_compensations(lines: &[&str]) -> Vec<Compensation> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim_end();
        if trimmed.starts_with("COMPENSATE ") {
            let (comp, next_i) = parse_compensation_block(trimmed, lines, i + 1);
            if let Some(comp) = comp {
                out.push(comp);
            }
            i = next_i;
        } else {
            i += 1;
        }
    }
    out
}

fn parse_compensation_header(header: &str) -> Option<(String, CompensationType, CompensationAnchor)> {
    let inner = header.strip_prefix("COMPENSATE ")?.strip_suffix(':')?;
    let (file, rest) = inner.split_once(' ')?;
    let rest = rest.trim();

    if let Some(n) = rest.strip_prefix("AFTER LINE ") {
        let line_no: u32 = n.trim().parse().ok()?;
        return Some((
            file.to_string(),
            CompensationType::AddAfterLine,
            CompensationAnchor::LineNumber(line_no),
        ));
    }
    if let Some(pattern) = rest.strip_prefix("AFTER \"").and_then(|s| s.strip_suffix('"')) {
        return Some((
            file.to_string(),
            CompensationType::AddAfterLine,
            CompensationAnchor::AfterPattern(pattern.to_string()),
        ));
    }
    if let Some(pattern) = rest.strip_prefix("BEFORE \"").and_then(|s| s.strip_suffix('"')) {
        return Some((
            file.to_string(),
            CompensationType::AddBeforeLine,
            CompensationAnchor::BeforePattern(pattern.to_string()),
        ));
    }
    None
}

fn parse_compensation_block(header: &str, lines: &[&str], start: usize) -> (Option<Compensation>, usize) {
    let Some((file, kind, anchor)) = parse_compensation_header(header) else {
        return (None, start);
    };

    let mut content_lines: Vec<&str> = Vec::new();
    let mut reason = None;
    let mut removed_by = None;
    let mut i = start;

    while i < lines.len() {
        let raw = lines[i];
        let trimmed = raw.trim_end();

        if trimmed.starts_with("### ") || trimmed.starts_with("COMPENSATE ") {
            break;
        }
        if let Some(r) = trimmed.strip_prefix("REASON:") {
            reason = Some(r.trim().to_string());
            i += 1;
            continue;
        }
        if let Some(r) = trimmed.strip_prefix("REMOVED_BY:") {
            removed_by = Some(r.trim().to_string());
            i += 1;
            continue;
        }
        if trimmed.is_empty() {
            content_lines.push("");
            i += 1;
            continue;
        }
        if let Some(stripped) = raw.strip_prefix("  ") {
            content_lines.push(stripped);
            i += 1;
            continue;
        }
        // Un-indented, non-metadata line: terminates the block.
        break;
    }

    // Trim a single trailing blank line produced by the metadata scan.
    while content_lines.last() == Some(&"") {
        content_lines.pop();
    }

    (
        Some(Compensation {
            file,
            kind,
            anchor,
            content: content_lines.join("\n"),
            reason,
            removed_by,
        }),
        i,
    )
}

/// Render a `StagingPlan` back into plan-document text, given the diff it
/// describes (needed to render each hunk's per-line checkboxes).
pub fn render_plan_document(plan: &StagingPlan, parsed: &ParsedDiff) -> String {
    let mut out = String::new();
    out.push_str(&format!("Commit message: {}\n\n", plan.commit_message));

    for selection in &plan.selections {
        let Some(hunk) = parsed.get_hunk(&selection.hunk_id) else {
            continue;
        };
        out.push_str(&format!("### {}\n", hunk.id));
        let checked = if selection.mode == SelectionMode::All {
            "x"
        } else {
            " "
        };
        out.push_str(&format!("[{checked}] Include entire hunk\n"));
        out.push_str("```\n");
        render_hunk_lines(hunk, selection, &mut out);
        out.push_str("```\n");
        for (idx, content) in &selection.line_edits {
            out.push_str(&format!("EDIT [{idx}]: {content}\n"));
        }
        out.push('\n');
    }

    for comp in &plan.compensations {
        render_compensation(comp, &mut out);
    }

    out
}

fn render_hunk_lines(hunk: &Hunk, selection: &HunkSelection, out: &mut String) {
    let all_included = selection.mode == SelectionMode::All;
    for (idx, line) in hunk.lines.iter().enumerate() {
        let field = match line.kind {
            LineKind::Context => "   ".to_string(),
            LineKind::Add => {
                let included = all_included
                    || selection
                        .include_additions
                        .as_ref()
                        .is_some_and(|s| s.contains(&idx));
                if selection.line_edits.iter().any(|(i, _)| *i == idx) {
                    "[E]".to_string()
                } else if included {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            LineKind::Remove => {
                let included = all_included
                    || selection
                        .include_removals
                        .as_ref()
                        .is_some_and(|s| s.contains(&idx));
                if included {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
        };
        out.push_str(&format!(
            "{field} [{idx:02}] {}{}\n",
            line.kind.prefix(),
            line.content
        ));
    }
}

fn render_compensation(comp: &Compensation, out: &mut String) {
    let clause = match (&comp.kind, &comp.anchor) {
        (_, CompensationAnchor::LineNumber(n)) => format!("AFTER LINE {n}"),
        (CompensationType::AddBeforeLine, CompensationAnchor::BeforePattern(p)) => {
            format!("BEFORE \"{p}\"")
        }
        (_, CompensationAnchor::AfterPattern(p)) => format!("AFTER \"{p}\""),
        (_, CompensationAnchor::BeforePattern(p)) => format!("BEFORE \"{p}\""),
    };
    out.push_str(&format!("COMPENSATE {} {}:\n", comp.file, clause));
    for line in comp.content.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    if let Some(reason) = &comp.reason {
        out.push_str(&format!("REASON: {reason}\n"));
    }
    if let Some(removed_by) = &comp.removed_by {
        out.push_str(&format!("REMOVED_BY: {removed_by}\n"));
    }
    out.push('\n');
}

/// The structured, JSON-friendly alternative to the plan document. Carries
/// identical semantics; the executor accepts either representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    pub commit_message: String,
    pub hunks: Vec<WorksheetHunk>,
    #[serde(default)]
    pub compensations: Vec<Compensation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetHunk {
    pub hunk_id: String,
    pub include: SelectionMode,
    pub lines: Vec<WorksheetLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetLine {
    pub index: usize,
    pub include: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
}

/// Convert a worksheet into the same `StagingPlan` the document parser
/// would have produced.
pub fn worksheet_to_plan(worksheet: &Worksheet) -> StagingPlan {
    let selections = worksheet
        .hunks
        .iter()
        .map(|wh| {
            let mut include_additions = BTreeSet::new();
            let mut include_removals = BTreeSet::new();
            let mut line_edits = Vec::new();
            for line in &wh.lines {
                if let Some(edit) = &line.edit {
                    line_edits.push((line.index, edit.clone()));
                }
                if line.include {
                    // The worksheet doesn't separately track add/remove —
                    // both sets collect the same included indices; the
                    // executor only consults the set matching each line's
                    // actual kind when it resolves against the hunk.
                    include_additions.insert(line.index);
                    include_removals.insert(line.index);
                }
            }
            HunkSelection {
                hunk_id: wh.hunk_id.clone(),
                mode: wh.include,
                include_additions: if include_additions.is_empty() {
                    None
                } else {
                    Some(include_additions)
                },
                include_removals: if include_removals.is_empty() {
                    None
                } else {
                    Some(include_removals)
                },
                line_edits,
                note: None,
            }
        })
        .collect();

    StagingPlan {
        commit_message: worksheet.commit_message.clone(),
        selections,
        compensations: worksheet.compensations.clone(),
    }
}

/// Convert a `StagingPlan` into worksheet form, given the diff it
/// describes (needed to enumerate every line of each selected hunk).
pub fn plan_to_worksheet(plan: &StagingPlan, parsed: &ParsedDiff) -> Worksheet {
    let hunks = plan
        .selections
        .iter()
        .filter_map(|sel| {
            let hunk = parsed.get_hunk(&sel.hunk_id)?;
            let all_included = sel.mode == SelectionMode::All;
            let lines = hunk
                .lines
                .iter()
                .enumerate()
                .map(|(idx, line)| {
                    let include = match line.kind {
                        LineKind::Context => true,
                        LineKind::Add => {
                            all_included
                                || sel
                                    .include_additions
                                    .as_ref()
                                    .is_some_and(|s| s.contains(&idx))
                        }
                        LineKind::Remove => {
                            all_included
                                || sel
                                    .include_removals
                                    .as_ref()
                                    .is_some_and(|s| s.contains(&idx))
                        }
                    };
                    let edit = sel
                        .line_edits
                        .iter()
                        .find(|(i, _)| *i == idx)
                        .map(|(_, c)| c.clone());
                    WorksheetLine { index: idx, include, edit }
                })
                .collect();
            Some(WorksheetHunk {
                hunk_id: sel.hunk_id.clone(),
                include: sel.mode,
                lines,
            })
        })
        .collect();

    Worksheet {
        commit_message: plan.commit_message.clone(),
        hunks,
        compensations: plan.compensations.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_unified_diff;

    fn two_hunk_diff() -> ParsedDiff {
        parse_unified_diff(
            "\
diff --git a/a.rs b/a.rs
--- a/a.rs
+++ b/a.rs
@@ -1,1 +1,1 @@
-old
+new
diff --git a/b.rs b/b.rs
--- a/b.rs
+++ b/b.rs
@@ -1,1 +1,3 @@
 ctx
+one
+two
",
        )
    }

    #[test]
    fn commit_message_defaults_when_absent() {
        let parsed = two_hunk_diff();
        let plan = parse_plan_document("### a.rs:0\n[x] Include entire hunk\n", &parsed);
        assert_eq!(plan.commit_message, "untitled commit");
    }

    #[test]
    fn commit_message_is_parsed() {
        let parsed = two_hunk_diff();
        let plan = parse_plan_document("Commit message: fix the thing\n", &parsed);
        assert_eq!(plan.commit_message, "fix the thing");
    }

    #[test]
    fn s5_plan_round_trip() {
        let parsed = two_hunk_diff();
        let doc = "\
Commit message: two selections

### a.rs:0
[x] Include entire hunk
```
[x] [00] -old
[x] [01] +new
```

### b.rs:0
[ ] Include entire hunk
```
    [00]  ctx
[x] [01] +one
[ ] [02] +two
```
";
        let plan = parse_plan_document(doc, &parsed);
        assert_eq!(plan.selections.len(), 2);
        assert_eq!(plan.selections[0].mode, SelectionMode::All);
        assert_eq!(plan.selections[1].mode, SelectionMode::Partial);
        assert_eq!(
            plan.selections[1].include_additions,
            Some(BTreeSet::from([1]))
        );
    }

    #[test]
    fn file_level_all_expands_to_every_hunk_without_explicit_section() {
        let parsed = two_hunk_diff();
        let doc = "Commit message: m\n\n[x] a.rs\n[x] b.rs\n";
        let plan = parse_plan_document(doc, &parsed);
        assert_eq!(plan.selections.len(), 2);
        assert!(plan.selections.iter().all(|s| s.mode == SelectionMode::All));
    }

    #[test]
    fn explicit_hunk_section_overrides_file_level_mark() {
        let parsed = two_hunk_diff();
        let doc = "\
Commit message: m

[x] b.rs

### b.rs:0
[ ] Include entire hunk
```
    [00]  ctx
[ ] [01] +one
[ ] [02] +two
```
";
        let plan = parse_plan_document(doc, &parsed);
        assert_eq!(plan.selections.len(), 1);
        assert_eq!(plan.selections[0].mode, SelectionMode::None);
    }

    #[test]
    fn edit_marker_registers_addition_and_records_edit() {
        let parsed = two_hunk_diff();
        let doc = "\
### b.rs:0
[ ] Include entire hunk
```
    [00]  ctx
[E] [01] +one
[ ] [02] +two
```
EDIT [01]: replaced content
";
        let plan = parse_plan_document(doc, &parsed);
        assert_eq!(plan.selections[0].mode, SelectionMode::Partial);
        assert_eq!(
            plan.selections[0].include_additions,
            Some(BTreeSet::from([1]))
        );
        assert_eq!(
            plan.selections[0].line_edits,
            vec![(1, "replaced content".to_string())]
        );
    }

    #[test]
    fn compensation_after_pattern_with_reason() {
        let doc = "\
COMPENSATE src/lib.rs AFTER \"fn main\":
  // stub body
  todo!()
REASON: keeps the crate compiling mid-split
";
        let lines: Vec<&str> = doc.lines().collect();
        let comps = parse_all_compensations(&lines);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].file, "src/lib.rs");
        assert_eq!(comps[0].kind, CompensationType::AddAfterLine);
        assert_eq!(
            comps[0].anchor,
            CompensationAnchor::AfterPattern("fn main".to_string())
        );
        assert_eq!(comps[0].content, "// stub body\ntodo!()");
        assert_eq!(
            comps[0].reason.as_deref(),
            Some("keeps the crate compiling mid-split")
        );
    }

    #[test]
    fn compensation_after_line_number() {
        let doc = "COMPENSATE foo.py AFTER LINE 12:\n  pass\n";
        let lines: Vec<&str> = doc.lines().collect();
        let comps = parse_all_compensations(&lines);
        assert_eq!(comps[0].anchor, CompensationAnchor::LineNumber(12));
        assert_eq!(comps[0].kind, CompensationType::AddAfterLine);
    }

    #[test]
    fn compensation_before_pattern() {
        let doc = "COMPENSATE foo.rs BEFORE \"fn run\":\n  // placeholder\n";
        let lines: Vec<&str> = doc.lines().collect();
        let comps = parse_all_compensations(&lines);
        assert_eq!(comps[0].kind, CompensationType::AddBeforeLine);
        assert_eq!(
            comps[0].anchor,
            CompensationAnchor::BeforePattern("fn run".to_string())
        );
    }

    #[test]
    fn worksheet_round_trips_through_plan() {
        let parsed = two_hunk_diff();
        let plan = StagingPlan {
            commit_message: "m".to_string(),
            selections: vec![HunkSelection::new("a.rs:0", SelectionMode::All)],
            compensations: Vec::new(),
        };
        let worksheet = plan_to_worksheet(&plan, &parsed);
        assert_eq!(worksheet.hunks.len(), 1);
        assert!(worksheet.hunks[0].lines.iter().all(|l| l.include));

        let plan2 = worksheet_to_plan(&worksheet);
        assert_eq!(plan2.commit_message, "m");
        assert_eq!(plan2.selections[0].mode, SelectionMode::All);
    }
}
