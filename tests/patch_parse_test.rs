//! Parses real `git diff` output (not hand-written fixtures) to pin the
//! parser against the actual format the `VcsClient` boundary produces,
//! and checks the round-trip property from spec.md §8.4: feeding
//! `generate_patch` back through the parser reproduces hunk ids, line
//! sequences and numeric fields.

mod helpers;

use gitplan::diff::parse_unified_diff;
use gitplan::hunk::generate_patch;

#[test]
fn parses_a_real_git_diff_with_multiple_hunks() {
    let dir = helpers::create_temp_repo();
    let original: String = (1..=20).map(|n| format!("line {n}\n")).collect();
    helpers::commit_file(dir.path(), "a.txt", &original);

    let mut lines: Vec<String> = (1..=20).map(|n| format!("line {n}")).collect();
    lines[1] = "line 2 CHANGED".to_string();
    lines.insert(15, "inserted line".to_string());
    let modified = lines.join("\n") + "\n";
    helpers::write_file(dir.path(), "a.txt", &modified);

    let diff_text = helpers::unstaged_diff(dir.path());
    let parsed = parse_unified_diff(&diff_text);

    assert_eq!(parsed.files.len(), 1);
    assert_eq!(parsed.files[0].new_path, "a.txt");
    assert!(parsed.files[0].hunks.len() >= 1);
    for hunk in &parsed.files[0].hunks {
        gitplan::diff::validate_hunk(hunk).unwrap();
    }
}

#[test]
fn parses_a_real_new_file_diff() {
    let dir = helpers::create_temp_repo();
    helpers::write_file(dir.path(), "new.txt", "brand new content\n");
    std::process::Command::new("git")
        .args(["add", "new.txt"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    let diff_text = helpers::staged_diff(dir.path());
    let parsed = parse_unified_diff(&diff_text);

    assert_eq!(parsed.files.len(), 1);
    assert!(parsed.files[0].is_new);
    assert_eq!(parsed.files[0].hunks[0].lines[0].content, "brand new content");
}

#[test]
fn round_trip_preserves_ids_lines_and_counts() {
    let dir = helpers::create_temp_repo();
    helpers::commit_file(dir.path(), "a.txt", "one\ntwo\nthree\nfour\nfive\n");
    helpers::write_file(dir.path(), "a.txt", "one\nTWO\nthree\nfour\nFIVE\n");

    let diff_text = helpers::unstaged_diff(dir.path());
    let parsed = parse_unified_diff(&diff_text);

    let hunks = parsed.get_all_hunks();
    let regenerated = generate_patch(&hunks);
    let reparsed = parse_unified_diff(&regenerated);

    assert_eq!(parsed.files.len(), reparsed.files.len());
    for (original, again) in parsed.files.iter().zip(reparsed.files.iter()) {
        assert_eq!(original.hunks.len(), again.hunks.len());
        for (oh, ah) in original.hunks.iter().zip(again.hunks.iter()) {
            assert_eq!(oh.id, ah.id);
            assert_eq!(oh.lines, ah.lines);
            assert_eq!(oh.old_count, ah.old_count);
            assert_eq!(oh.new_count, ah.new_count);
            assert_eq!(oh.old_start, ah.old_start);
            assert_eq!(oh.new_start, ah.new_start);
        }
    }
}
