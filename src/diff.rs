//! Unified-diff parsing into a faithful, line-indexed structural model.
//!
//! Grounded on the teacher's `patch.rs` (`parse_unified_diff` /
//! `parse_file_diff` / `parse_hunk` / `parse_hunk_header`), generalized
//! so the parser never raises: unrecognized lines are skipped rather
//! than producing an error, and a malformed hunk header is treated as an
//! unrecognized line instead of aborting the parse. `validate_hunk` is
//! kept as the one explicit, error-reporting checker.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// The type of a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Context,
    Add,
    Remove,
}

impl LineKind {
    /// The single-character prefix used in unified-diff format.
    pub fn prefix(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Add => '+',
            LineKind::Remove => '-',
        }
    }
}

/// A single line within a hunk, without its one-character prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub kind: LineKind,
    pub content: String,
}

impl Line {
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// A contiguous block of lines from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub file: String,
    pub index: usize,
    pub id: String,
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<Line>,
    pub context: Option<String>,
    /// The `@@ ... @@` header text, kept consistent with the numeric
    /// fields above by every constructor and mutator in this crate.
    pub header: String,
}

impl Hunk {
    /// Build the `"<file>:<index>"` id.
    pub fn make_id(file: &str, index: usize) -> String {
        format!("{file}:{index}")
    }

    /// Recompute `old_count`/`new_count`/`header` from `lines`, keeping
    /// `old_start`/`new_start`/`file`/`index`/`id`/`context` unchanged.
    /// Used by every manipulator that produces a derived hunk.
    pub fn rebuild_counts_and_header(&mut self) {
        self.old_count = self
            .lines
            .iter()
            .filter(|l| l.kind != LineKind::Add)
            .count() as u32;
        self.new_count = self
            .lines
            .iter()
            .filter(|l| l.kind != LineKind::Remove)
            .count() as u32;
        self.header = format_hunk_header(
            self.old_start,
            self.old_count,
            self.new_start,
            self.new_count,
            self.context.as_deref(),
        );
    }
}

/// Format a `@@ -oldStart,oldCount +newStart,newCount @@ context` header.
pub fn format_hunk_header(
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
    context: Option<&str>,
) -> String {
    let mut header = format!("@@ -{old_start},{old_count} +{new_start},{new_count} @@");
    if let Some(ctx) = context
        && !ctx.is_empty()
    {
        header.push(' ');
        header.push_str(ctx);
    }
    header
}

/// Validate a hunk's line-count invariants against its `old_count` /
/// `new_count` fields. This is the one explicit, error-reporting checker
/// in the parser — everything else silently skips malformed input.
pub fn validate_hunk(hunk: &Hunk) -> Result<(), ValidationError> {
    let actual_old = hunk.lines.iter().filter(|l| l.kind != LineKind::Add).count() as u32;
    let actual_new = hunk
        .lines
        .iter()
        .filter(|l| l.kind != LineKind::Remove)
        .count() as u32;

    if actual_old != hunk.old_count {
        return Err(ValidationError::OldCount {
            expected: hunk.old_count,
            actual: actual_old,
        });
    }
    if actual_new != hunk.new_count {
        return Err(ValidationError::NewCount {
            expected: hunk.new_count,
            actual: actual_new,
        });
    }
    Ok(())
}

/// `{oldPath, newPath, isNew, isDeleted, isRenamed, hunks[]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub is_new: bool,
    pub is_deleted: bool,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn is_renamed(&self) -> bool {
        self.old_path != self.new_path
    }
}

/// An ordered sequence of `FileDiff`, with lookup helpers. Pure data —
/// never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDiff {
    pub files: Vec<FileDiff>,
}

impl ParsedDiff {
    pub fn get_all_hunks(&self) -> Vec<&Hunk> {
        self.files.iter().flat_map(|f| f.hunks.iter()).collect()
    }

    pub fn get_hunk(&self, id: &str) -> Option<&Hunk> {
        self.get_all_hunks().into_iter().find(|h| h.id == id)
    }

    /// Hunks belonging to a file, matched against either `new_path` or
    /// `old_path` (so a rename's hunks are found under either name).
    pub fn get_file_hunks(&self, path: &str) -> Vec<&Hunk> {
        self.files
            .iter()
            .filter(|f| f.new_path == path || f.old_path == path)
            .flat_map(|f| f.hunks.iter())
            .collect()
    }
}

/// Parse unified-diff text into a structural model. Total: unrecognized
/// lines are skipped, never an error.
pub fn parse_unified_diff(input: &str) -> ParsedDiff {
    parse_unified_diff_with_stats(input).0
}

/// Diagnostics about a parse: how many lines were unrecognized and
/// dropped. Advisory only — never affects the resulting `ParsedDiff`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub skipped_lines: usize,
}

/// Same as [`parse_unified_diff`], but also reports how many lines were
/// unrecognized and skipped — an optional introspection point for
/// callers building higher-level diagnostics on top of a parser that is
/// otherwise silent about malformed input.
pub fn parse_unified_diff_with_stats(input: &str) -> (ParsedDiff, ParseStats) {
    let lines: Vec<&str> = input.lines().collect();
    let mut files = Vec::new();
    let mut skipped_lines = 0usize;
    let mut i = 0;

    while i < lines.len() {
        if let Some(rest) = lines[i].strip_prefix("diff --git ") {
            let (file, next_i, file_skipped) = parse_file_diff(rest, &lines, i);
            skipped_lines += file_skipped;
            files.push(file);
            i = next_i;
        } else {
            if !lines[i].trim().is_empty() {
                skipped_lines += 1;
            }
            i += 1;
        }
    }

    let stats = ParseStats { skipped_lines };
    if stats.skipped_lines > 0 {
        tracing::trace!(
            skipped = stats.skipped_lines,
            "parse_unified_diff skipped unrecognized lines"
        );
    }
    (ParsedDiff { files }, stats)
}

impl std::str::FromStr for ParsedDiff {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_unified_diff(s))
    }
}

fn parse_git_header_path(header: &str) -> String {
    if let Some(pos) = header.find(" b/") {
        header[pos + 3..].to_string()
    } else {
        header
            .split_whitespace()
            .last()
            .map(|s| strip_ab_prefix(s).to_string())
            .unwrap_or_else(|| header.to_string())
    }
}

fn strip_ab_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

fn parse_file_diff(git_header_rest: &str, lines: &[&str], start: usize) -> (FileDiff, usize, usize) {
    let path = parse_git_header_path(git_header_rest);

    let mut i = start + 1;
    let mut is_new = false;
    let mut is_deleted = false;
    let mut old_path = path.clone();
    let mut new_path = path;

    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("diff --git ") || line.starts_with("@@ ") {
            break;
        }

        if line.starts_with("new file mode") {
            is_new = true;
        } else if line.starts_with("deleted file mode") {
            is_deleted = true;
        } else if let Some(rest) = line.strip_prefix("rename from ") {
            old_path = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("rename to ") {
            new_path = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            let p = strip_ab_prefix(rest);
            if p != "/dev/null" {
                new_path = p.to_string();
            }
        } else if let Some(rest) = line.strip_prefix("--- ") {
            let p = strip_ab_prefix(rest);
            if rest != "/dev/null" {
                old_path = p.to_string();
            }
        }
        // `new file mode`, `deleted file mode`, `index …`, `old mode`,
        // `new mode`, `similarity index`, `Binary files … differ` and any
        // other unrecognized metadata line fall through and are skipped.

        i += 1;
    }

    let mut hunks = Vec::new();
    let mut skipped = 0usize;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("diff --git ") {
            break;
        }
        if line.starts_with("@@ ") {
            let (hunk, next_i, malformed) = parse_hunk(&new_path, hunks.len(), lines, i);
            if malformed {
                skipped += 1;
            }
            if let Some(hunk) = hunk {
                hunks.push(hunk);
            }
            i = next_i;
        } else {
            if !line.trim().is_empty() {
                skipped += 1;
            }
            i += 1;
        }
    }

    (
        FileDiff {
            old_path,
            new_path,
            is_new,
            is_deleted,
            hunks,
        },
        i,
        skipped,
    )
}

fn parse_hunk(file: &str, index: usize, lines: &[&str], start: usize) -> (Option<Hunk>, usize, bool) {
    let Some((old_start, old_count, new_start, new_count, context)) = parse_hunk_header(lines[start])
    else {
        // Malformed header: treat as an unrecognized line and move on.
        return (None, start + 1, true);
    };

    let mut body = Vec::new();
    let mut i = start + 1;

    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("@@ ") || line.starts_with("diff --git ") {
            break;
        }
        if let Some(content) = line.strip_prefix('+') {
            body.push(Line::new(LineKind::Add, content));
        } else if let Some(content) = line.strip_prefix('-') {
            body.push(Line::new(LineKind::Remove, content));
        } else if let Some(content) = line.strip_prefix(' ') {
            body.push(Line::new(LineKind::Context, content));
        } else if line.is_empty() {
            body.push(Line::new(LineKind::Context, ""));
        }
        // `\ No newline at end of file` and any other unrecognized
        // leading character are skipped without terminating the hunk.
        i += 1;
    }

    let header = format_hunk_header(old_start, old_count, new_start, new_count, context.as_deref());

    (
        Some(Hunk {
            file: file.to_string(),
            index,
            id: Hunk::make_id(file, index),
            old_start,
            old_count,
            new_start,
            new_count,
            lines: body,
            context,
            header,
        }),
        i,
        false,
    )
}

/// Parse a single `@@ -s[,c] +s[,c] @@[ context]` header line. Returns
/// `None` (never an error) on mismatch — callers treat that as "skip
/// this line."
pub fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32, Option<String>)> {
    let after_at = line.strip_prefix("@@ ")?;
    let end_at = after_at.find(" @@")?;
    let range_part = &after_at[..end_at];
    let rest = &after_at[end_at + 3..];
    let context = {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    let mut parts = range_part.split_whitespace();
    let old_part = parts.next()?;
    let new_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (old_start, old_count) = parse_range(old_part.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(new_part.strip_prefix('+')?)?;

    Some((old_start, old_count, new_start, new_count, context))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    if let Some((start_s, count_s)) = range.split_once(',') {
        Some((start_s.parse().ok()?, count_s.parse().ok()?))
    } else {
        Some((range.parse().ok()?, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_files() {
        assert_eq!(parse_unified_diff("").files.len(), 0);
        assert_eq!(parse_unified_diff("   \n  \n").files.len(), 0);
    }

    #[test]
    fn s1_simple_insertion() {
        let diff = "\
diff --git a/file.txt b/file.txt
--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,4 @@
 line 1
+added line
 line 2
 line 3
";
        let parsed = parse_unified_diff(diff);
        assert_eq!(parsed.files.len(), 1);
        assert_eq!(parsed.files[0].hunks.len(), 1);
        let hunk = &parsed.files[0].hunks[0];
        assert_eq!(hunk.id, "file.txt:0");
        assert_eq!(hunk.old_count, 3);
        assert_eq!(hunk.new_count, 4);
        assert_eq!(
            hunk.lines.iter().map(|l| l.kind).collect::<Vec<_>>(),
            vec![
                LineKind::Context,
                LineKind::Add,
                LineKind::Context,
                LineKind::Context
            ]
        );
        assert_eq!(hunk.lines[0].content, "line 1");
        assert_eq!(hunk.lines[1].content, "added line");
    }

    #[test]
    fn omitted_hunk_count_defaults_to_one() {
        let diff = "\
diff --git a/foo.rs b/foo.rs
--- a/foo.rs
+++ b/foo.rs
@@ -1 +1 @@
-old
+new
";
        let parsed = parse_unified_diff(diff);
        let hunk = &parsed.files[0].hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.old_count, 1);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.new_count, 1);
    }

    #[test]
    fn multi_file_multi_hunk() {
        let diff = "\
diff --git a/a.rs b/a.rs
--- a/a.rs
+++ b/a.rs
@@ -1,2 +1,2 @@
-old_a
+new_a
diff --git a/b.rs b/b.rs
--- a/b.rs
+++ b/b.rs
@@ -1,2 +1,2 @@
-old_b
+new_b
@@ -20,2 +20,2 @@
-old_b2
+new_b2
";
        let parsed = parse_unified_diff(diff);
        assert_eq!(parsed.files.len(), 2);
        assert_eq!(parsed.files[1].hunks.len(), 2);
        assert_eq!(parsed.files[1].hunks[1].id, "b.rs:1");
    }

    #[test]
    fn new_file_sets_is_new() {
        let diff = "\
diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,3 @@
+fn new() {
+    // new file
+}
";
        let parsed = parse_unified_diff(diff);
        assert!(parsed.files[0].is_new);
        assert!(!parsed.files[0].is_deleted);
    }

    #[test]
    fn deleted_file_sets_is_deleted() {
        let diff = "\
diff --git a/old.rs b/old.rs
deleted file mode 100644
index abc1234..0000000
--- a/old.rs
+++ /dev/null
@@ -1,3 +0,0 @@
-fn old() {
-    // deleted
-}
";
        let parsed = parse_unified_diff(diff);
        assert!(parsed.files[0].is_deleted);
        assert!(!parsed.files[0].is_new);
    }

    #[test]
    fn renamed_file_is_detected() {
        let diff = "\
diff --git a/old_name.rs b/new_name.rs
similarity index 95%
rename from old_name.rs
rename to new_name.rs
--- a/old_name.rs
+++ b/new_name.rs
@@ -1,3 +1,3 @@
-old
+new
";
        let parsed = parse_unified_diff(diff);
        assert!(parsed.files[0].is_renamed());
        assert_eq!(parsed.files[0].old_path, "old_name.rs");
        assert_eq!(parsed.files[0].new_path, "new_name.rs");
    }

    #[test]
    fn malformed_hunk_header_is_skipped_not_fatal() {
        let diff = "\
diff --git a/foo.rs b/foo.rs
--- a/foo.rs
+++ b/foo.rs
@@ -BAD +STUFF @@
 context
";
        // The parser is total: this never panics and never returns an error.
        let parsed = parse_unified_diff(diff);
        assert_eq!(parsed.files.len(), 1);
        assert_eq!(parsed.files[0].hunks.len(), 0);
    }

    #[test]
    fn stats_report_the_malformed_header_as_one_skipped_line() {
        let diff = "\
diff --git a/foo.rs b/foo.rs
--- a/foo.rs
+++ b/foo.rs
@@ -BAD +STUFF @@
 context
garbage before anything recognizable
";
        let (parsed, stats) = parse_unified_diff_with_stats(diff);
        assert_eq!(parsed.files[0].hunks.len(), 0);
        // the malformed `@@` header, the orphaned context line that
        // would have been its body, and the trailing junk line.
        assert_eq!(stats.skipped_lines, 3);
    }

    #[test]
    fn clean_input_reports_no_skipped_lines() {
        let diff = "\
diff --git a/foo.rs b/foo.rs
--- a/foo.rs
+++ b/foo.rs
@@ -1,1 +1,1 @@
-old
+new
";
        let (_, stats) = parse_unified_diff_with_stats(diff);
        assert_eq!(stats.skipped_lines, 0);
    }

    #[test]
    fn from_str_matches_parse_unified_diff() {
        let diff = "\
diff --git a/foo.rs b/foo.rs
--- a/foo.rs
+++ b/foo.rs
@@ -1,1 +1,1 @@
-old
+new
";
        let via_trait: ParsedDiff = diff.parse().unwrap();
        assert_eq!(via_trait, parse_unified_diff(diff));
    }

    #[test]
    fn hunk_context_is_preserved() {
        let diff = "\
diff --git a/foo.rs b/foo.rs
--- a/foo.rs
+++ b/foo.rs
@@ -10,3 +10,4 @@ fn some_function()
 context
+added
 context
";
        let parsed = parse_unified_diff(diff);
        assert_eq!(
            parsed.files[0].hunks[0].context.as_deref(),
            Some("fn some_function()")
        );
    }

    #[test]
    fn ids_are_unique_within_a_parse() {
        let diff = "\
diff --git a/a.rs b/a.rs
--- a/a.rs
+++ b/a.rs
@@ -1,1 +1,1 @@
-x
+y
@@ -5,1 +5,1 @@
-x
+y
diff --git a/b.rs b/b.rs
--- a/b.rs
+++ b/b.rs
@@ -1,1 +1,1 @@
-x
+y
";
        let parsed = parse_unified_diff(diff);
        let ids: Vec<&str> = parsed.get_all_hunks().iter().map(|h| h.id.as_str()).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn validate_hunk_reports_mismatches() {
        let mut hunk = Hunk {
            file: "f".into(),
            index: 0,
            id: "f:0".into(),
            old_start: 1,
            old_count: 2,
            new_start: 1,
            new_count: 1,
            lines: vec![Line::new(LineKind::Context, "a")],
            context: None,
            header: String::new(),
        };
        hunk.header = format_hunk_header(1, 2, 1, 1, None);
        assert_eq!(
            validate_hunk(&hunk),
            Err(ValidationError::OldCount {
                expected: 2,
                actual: 1
            })
        );

        hunk.old_count = 1;
        hunk.new_count = 3;
        assert_eq!(
            validate_hunk(&hunk),
            Err(ValidationError::NewCount {
                expected: 3,
                actual: 1
            })
        );

        hunk.new_count = 1;
        assert_eq!(validate_hunk(&hunk), Ok(()));
    }

    #[test]
    fn get_file_hunks_matches_old_or_new_path() {
        let diff = "\
diff --git a/old_name.rs b/new_name.rs
rename from old_name.rs
rename to new_name.rs
--- a/old_name.rs
+++ b/new_name.rs
@@ -1,1 +1,1 @@
-x
+y
";
        let parsed = parse_unified_diff(diff);
        assert_eq!(parsed.get_file_hunks("old_name.rs").len(), 1);
        assert_eq!(parsed.get_file_hunks("new_name.rs").len(), 1);
    }
}
