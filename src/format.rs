//! Renders the parsed diff model and its analysis into LLM-facing text:
//! a compact hunk table, detailed per-hunk blocks, and a plan-document
//! scaffold ready for an agent to edit.
//!
//! Grounded on the teacher's `feedback::format_feedback` for the
//! group-by-file assembly style, generalized from "diff + review
//! comments" to "diff + checkbox selection scaffold".

use crate::diff::{FileDiff, Hunk, LineKind, ParsedDiff};
use crate::hunk::is_splittable;
use regex::Regex;
use std::sync::OnceLock;

const DEFAULT_MIN_CONTEXT_GAP: u32 = 3;

/// Render a compact markdown table: `| id | file | lines X-Y | summary |`.
pub fn render_compact_table(parsed: &ParsedDiff) -> String {
    let mut out = String::from("| id | file | lines | summary |\n");
    out.push_str("|---|---|---|---|\n");
    for hunk in parsed.get_all_hunks() {
        let (adds, removes) = add_remove_counts(hunk);
        let summary = summarize_counts(adds, removes);
        out.push_str(&format!(
            "| {} | {} | {}-{} | {} |\n",
            hunk.id,
            hunk.file,
            hunk.new_start,
            hunk.new_start + hunk.new_count.saturating_sub(1),
            summary
        ));
    }
    out
}

fn add_remove_counts(hunk: &Hunk) -> (usize, usize) {
    let adds = hunk.lines.iter().filter(|l| l.kind == LineKind::Add).count();
    let removes = hunk
        .lines
        .iter()
        .filter(|l| l.kind == LineKind::Remove)
        .count();
    (adds, removes)
}

fn summarize_counts(adds: usize, removes: usize) -> String {
    if adds == 0 && removes == 0 {
        "no changes".to_string()
    } else {
        format!("+{adds} lines, -{removes} lines")
    }
}

/// Render one detailed block per hunk: heading, optional context line, a
/// one-line summary, a splittability note, and a fenced block of indexed
/// lines.
pub fn render_detailed_hunks(parsed: &ParsedDiff, min_context_gap: u32) -> String {
    let mut out = String::new();
    for hunk in parsed.get_all_hunks() {
        render_detailed_hunk(hunk, min_context_gap, &mut out);
    }
    out
}

fn render_detailed_hunk(hunk: &Hunk, min_context_gap: u32, out: &mut String) {
    out.push_str(&format!("### Hunk: {}\n", hunk.id));
    if let Some(ctx) = &hunk.context {
        out.push_str(&format!("Context: {ctx}\n"));
    }

    let (adds, removes) = add_remove_counts(hunk);
    out.push_str(&format!("Summary: {}\n", summarize_counts(adds, removes)));

    if is_splittable(hunk, min_context_gap) {
        let sub_count = crate::hunk::split_hunk(hunk, min_context_gap).len();
        out.push_str(&format!("Splittable: Can be split into {sub_count} sub-hunks\n"));
    }

    if let Some(tags) = detect_tags(hunk) {
        out.push_str(&format!("Tags: {tags}\n"));
    }

    out.push_str("```\n");
    let mut old_no = hunk.old_start;
    let mut new_no = hunk.new_start;
    for (idx, line) in hunk.lines.iter().enumerate() {
        let (old_field, new_field) = match line.kind {
            LineKind::Context => {
                let f = (format!("{old_no:>3}"), format!("{new_no:>3}"));
                old_no += 1;
                new_no += 1;
                f
            }
            LineKind::Remove => {
                let f = (format!("{old_no:>3}"), "   ".to_string());
                old_no += 1;
                f
            }
            LineKind::Add => {
                let f = ("   ".to_string(), format!("{new_no:>3}"));
                new_no += 1;
                f
            }
        };
        out.push_str(&format!(
            "[{idx:02}] {old_field}:{new_field} {} {}\n",
            line.kind.prefix(),
            line.content
        ));
    }
    out.push_str("```\n\n");
}

struct ContentTag {
    name: &'static str,
    pattern: &'static str,
}

const CONTENT_TAGS: &[ContentTag] = &[
    ContentTag { name: "logging", pattern: r"\b(log|logger|tracing|println!|eprintln!)\b" },
    ContentTag { name: "imports", pattern: r"^\s*(use |import |from .* import|#include)" },
    ContentTag { name: "function definition", pattern: r"\b(fn |def |function |func )\w" },
    ContentTag { name: "error handling", pattern: r"\b(Err|Result|catch|except|panic!|unwrap)\b" },
    ContentTag { name: "async", pattern: r"\b(async|await|Future|Promise)\b" },
    ContentTag { name: "conditional", pattern: r"\b(if |else|match |switch)\b" },
];

fn tag_regexes() -> &'static Vec<Regex> {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        CONTENT_TAGS
            .iter()
            .map(|t| Regex::new(t.pattern).expect("valid regex"))
            .collect()
    })
}

/// Heuristic, advisory-only content tags detected over a hunk's aggregated
/// change content. Never affects parsing, editing, or patch generation.
fn detect_tags(hunk: &Hunk) -> Option<String> {
    let changed: String = hunk
        .lines
        .iter()
        .filter(|l| l.kind != LineKind::Context)
        .map(|l| l.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let regexes = tag_regexes();
    let matched: Vec<&str> = CONTENT_TAGS
        .iter()
        .zip(regexes.iter())
        .filter(|(_, re)| re.is_match(&changed))
        .map(|(tag, _)| tag.name)
        .collect();

    (!matched.is_empty()).then(|| matched.join(", "))
}

/// `1` by default; `4` if the hunk has more than one addition or more
/// than one removal; capped to `3` if the hunk is splittable.
pub fn complexity_hint(hunk: &Hunk, min_context_gap: u32) -> u8 {
    let (adds, removes) = add_remove_counts(hunk);
    let mut hint = if adds > 1 || removes > 1 { 4 } else { 1 };
    if is_splittable(hunk, min_context_gap) && hint > 3 {
        hint = 3;
    }
    hint
}

/// Hunks bucketed by their complexity hint and splittability.
pub struct Analysis<'a> {
    pub simple_hunks: Vec<&'a Hunk>,
    pub splittable_hunks: Vec<&'a Hunk>,
    pub complex_hunks: Vec<&'a Hunk>,
}

pub fn analyze<'a>(parsed: &'a ParsedDiff, min_context_gap: u32) -> Analysis<'a> {
    let mut simple_hunks = Vec::new();
    let mut splittable_hunks = Vec::new();
    let mut complex_hunks = Vec::new();

    for hunk in parsed.get_all_hunks() {
        if is_splittable(hunk, min_context_gap) {
            splittable_hunks.push(hunk);
        } else if complexity_hint(hunk, min_context_gap) >= 4 {
            complex_hunks.push(hunk);
        } else {
            simple_hunks.push(hunk);
        }
    }

    Analysis {
        simple_hunks,
        splittable_hunks,
        complex_hunks,
    }
}

/// Render a plan-document scaffold: one section per hunk, pre-checked
/// `[x] Include entire hunk`, ready for an agent to edit into a refined
/// selection.
pub fn render_plan_scaffold(parsed: &ParsedDiff) -> String {
    let mut out = String::from("Commit message: untitled commit\n\n");
    for file in &parsed.files {
        render_file_scaffold(file, &mut out);
    }
    out
}

fn render_file_scaffold(file: &FileDiff, out: &mut String) {
    for hunk in &file.hunks {
        out.push_str(&format!("### {}\n", hunk.id));
        out.push_str("[x] Include entire hunk\n");
        out.push_str("```\n");
        for (idx, line) in hunk.lines.iter().enumerate() {
            let field = match line.kind {
                LineKind::Context => "   ",
                _ => "[x]",
            };
            out.push_str(&format!(
                "{field} [{idx:02}] {}{}\n",
                line.kind.prefix(),
                line.content
            ));
        }
        out.push_str("```\n\n");
    }
}

/// The default `minContextGap` used when a caller doesn't have an
/// opinion — mirrors the teacher's original hardcoded 3-line window.
pub fn default_min_context_gap() -> u32 {
    DEFAULT_MIN_CONTEXT_GAP
}
