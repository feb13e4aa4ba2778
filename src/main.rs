use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use gitplan::diff::parse_unified_diff;
use gitplan::format::{
    default_min_context_gap, render_compact_table, render_detailed_hunks, render_plan_scaffold,
};
use gitplan::plan::{parse_plan_document, worksheet_to_plan, Worksheet};
use gitplan::vcs::{GitCli, VcsClient, MAX_PATCH_SIZE};
use gitplan::{ParsedDiff, PlanExecutor};

#[derive(Parser, Debug)]
#[command(
    name = "gitplan",
    about = "Decompose uncommitted changes into a sequence of small, atomic commits"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the current diff as an LLM-facing plan scaffold.
    Plan(PlanArgs),
    /// Execute a filled-in plan document (or worksheet) against the repo.
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Plan against the staged diff instead of the unstaged working tree.
    #[arg(long)]
    staged: bool,

    /// Only include files matching this glob pattern.
    #[arg(long, value_name = "GLOB")]
    files: Option<String>,

    /// Minimum run of context lines that makes a hunk splittable.
    #[arg(short = 'C', long = "context-lines", default_value_t = default_min_context_gap())]
    min_context_gap: u32,

    /// Read a unified diff from stdin instead of computing one from git.
    #[arg(short = 'p', long = "patch")]
    patch: bool,

    /// Write the scaffold to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to the git repository (defaults to the current directory).
    #[arg(long, value_name = "DIR", default_value = ".")]
    repo: PathBuf,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Path to a filled-in plan document or worksheet JSON file.
    plan_file: PathBuf,

    /// Parse `plan_file` as worksheet JSON instead of the checkbox document.
    #[arg(long)]
    worksheet: bool,

    /// Create a commit with the plan's message after a clean execution.
    #[arg(long)]
    commit: bool,

    /// Path to the git repository (defaults to the current directory).
    #[arg(long, value_name = "DIR", default_value = ".")]
    repo: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => run_plan(&args),
        Command::Apply(args) => run_apply(&args),
    }
}

fn run_plan(args: &PlanArgs) -> Result<()> {
    let diff_text = if args.patch {
        read_patch_from_stdin()?
    } else {
        let vcs = GitCli::new(&args.repo);
        if args.staged {
            vcs.get_staged_diff()
        } else {
            vcs.get_unstaged_diff()
        }
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
    };

    let mut parsed = parse_unified_diff(&diff_text);
    if let Some(pattern) = &args.files {
        filter_by_glob(&mut parsed, pattern);
    }

    if parsed.files.is_empty() {
        println!("No changes to plan.");
        return Ok(());
    }

    let mut out = render_compact_table(&parsed);
    out.push('\n');
    out.push_str(&render_detailed_hunks(&parsed, args.min_context_gap));
    out.push_str(&render_plan_scaffold(&parsed));

    match &args.output {
        Some(path) => {
            std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))?
        }
        None => print!("{out}"),
    }

    Ok(())
}

fn filter_by_glob(parsed: &mut ParsedDiff, pattern: &str) {
    match glob::Pattern::new(pattern) {
        Ok(pattern) => parsed.files.retain(|f| pattern.matches(&f.new_path)),
        Err(e) => tracing::warn!("invalid glob pattern '{pattern}': {e}"),
    }
}

fn read_patch_from_stdin() -> Result<String> {
    if std::io::stdin().is_terminal() {
        bail!("--patch requires piped input. Usage: git diff | gitplan plan -p");
    }
    let mut input = String::new();
    std::io::stdin()
        .take(MAX_PATCH_SIZE as u64 + 1)
        .read_to_string(&mut input)?;
    if input.len() > MAX_PATCH_SIZE {
        bail!(
            "patch input exceeds the maximum size ({} MB)",
            MAX_PATCH_SIZE / (1024 * 1024)
        );
    }
    Ok(input)
}

fn run_apply(args: &ApplyArgs) -> Result<()> {
    let vcs = GitCli::new(&args.repo);
    let diff_text = vcs
        .get_unstaged_diff()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let parsed = parse_unified_diff(&diff_text);

    let plan_text = std::fs::read_to_string(&args.plan_file)
        .with_context(|| format!("reading {}", args.plan_file.display()))?;
    let plan = if args.worksheet {
        let worksheet: Worksheet =
            serde_json::from_str(&plan_text).context("parsing worksheet JSON")?;
        worksheet_to_plan(&worksheet)
    } else {
        parse_plan_document(&plan_text, &parsed)
    };

    let executor = PlanExecutor::new(&vcs);
    let result = executor.execute(&plan, &parsed);

    if !plan.compensations.is_empty() && result.success {
        if let Err((e, modified)) = executor.apply_compensations(&args.repo, &plan.compensations) {
            bail!("compensation failed: {e} (already modified: {modified:?})");
        }
    }

    for id in &result.staged_hunks {
        tracing::info!("staged {id}");
    }

    if !result.success {
        bail!(
            "{} (staged before failure: {:?})",
            result.error.unwrap_or_default(),
            result.staged_hunks
        );
    }

    if args.commit {
        let outcome = vcs
            .commit(&plan.commit_message)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if !outcome.success {
            bail!("commit failed: {}", outcome.error.unwrap_or_default());
        }
        println!("committed {}", outcome.hash.unwrap_or_default());
    } else {
        println!("staged {} hunk(s)", result.staged_hunks.len());
    }

    Ok(())
}
