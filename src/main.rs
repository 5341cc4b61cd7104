//! skill-activator - suggest skills to Claude Code from the user's prompt
//!
//! Runs as a `UserPromptSubmit` hook by default (JSON in on stdin, JSON out
//! on stdout, never blocks the assistant). `rank` and `list` are diagnostic
//! modes for checking how an index scores a message.

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use skill_activator::hook::{is_skip_prompt, HookInput, HookOutput};
use skill_activator::index::default_index_path;
use skill_activator::report::{list_skills, RankReport};
use skill_activator::{
    evaluate, evaluate_with_diagnostics, Bucket, Enforcement, Evaluation, IndexHandle,
    OutputMode, Result, SuggesterConfig,
};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Characters of the prompt shown in logs
const PROMPT_PREVIEW_CHARS: usize = 50;

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "skill-activator",
    version,
    about = "Suggest relevant skills for a prompt from a precomputed skill index"
)]
struct Cli {
    /// Skill index file, repeatable; earlier files win on duplicate ids
    /// [default: ~/.claude/skills/INDEX.yaml]
    #[arg(long = "index", value_name = "PATH", global = true)]
    index: Vec<PathBuf>,

    /// Config file [default: ~/.claude/skill_config.json]
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Output mode, overrides the config file
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Max skills shown in enhanced mode, overrides the config file
    #[arg(long, global = true)]
    max_suggestions: Option<usize>,

    /// Use this confidence threshold for every skill
    #[arg(long, short = 't', global = true)]
    threshold: Option<f64>,

    /// Debug logging to stderr (otherwise RUST_LOG is honored)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Claude Code UserPromptSubmit hook: JSON on stdin, JSON on stdout (default)
    Hook,

    /// Show every eligible skill for a message with raw scores and evidence
    Rank {
        /// The message to evaluate
        #[arg(required = true)]
        message: Vec<String>,

        /// Emit JSON instead of formatted text
        #[arg(long, short)]
        json: bool,
    },

    /// List all skills in the index
    List {
        /// Emit JSON instead of formatted text
        #[arg(long, short)]
        json: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.take().unwrap_or(Command::Hook) {
        Command::Hook => {
            if let Err(e) = run_hook(&cli) {
                error!("Error: {}", e);
                // Output empty response on error (non-blocking)
                println!(
                    "{}",
                    serde_json::to_string(&HookOutput::empty()).unwrap_or_default()
                );
            }
            // Exit 0 to not block Claude
            ExitCode::SUCCESS
        }
        Command::Rank { message, json } => finish(run_rank(&cli, &message.join(" "), json)),
        Command::List { json } => finish(run_list(&cli, json)),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit 2 when the index is unavailable so scripts can tell it from "no match".
fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            if e.is_index_unavailable() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn index_sources(cli: &Cli) -> Result<Vec<PathBuf>> {
    if cli.index.is_empty() {
        Ok(vec![default_index_path()?])
    } else {
        Ok(cli.index.clone())
    }
}

fn resolve_config(cli: &Cli) -> SuggesterConfig {
    let base = match &cli.config {
        Some(path) => SuggesterConfig::load(path),
        None => SuggesterConfig::load_default(),
    };
    base.with_overrides(cli.format, cli.max_suggestions, cli.threshold)
}

fn emit_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn preview(prompt: &str) -> String {
    prompt.chars().take(PROMPT_PREVIEW_CHARS).collect()
}

// ============================================================================
// Hook Mode
// ============================================================================

fn run_hook(cli: &Cli) -> Result<()> {
    // Read input from stdin
    let mut input_json = String::new();
    io::stdin().read_to_string(&mut input_json)?;

    debug!("Received input: {}", input_json);

    let input: HookInput = serde_json::from_str(&input_json)?;

    // Skip processing for certain prompts
    if is_skip_prompt(&input.prompt) {
        debug!("Skipping prompt: {}", preview(&input.prompt));
        return emit_json(&HookOutput::empty(), false);
    }

    info!("Processing prompt: {}", preview(&input.prompt));

    let config = resolve_config(cli);
    let handle = match IndexHandle::open(index_sources(cli)?) {
        Ok(handle) => handle,
        Err(e) if e.is_index_unavailable() => {
            warn!("Skill index unavailable ({}), returning empty", e);
            return emit_json(&HookOutput::empty(), false);
        }
        Err(e) => return Err(e),
    };
    let index = handle.snapshot();
    info!("Loaded {} skills from index", index.len());

    let selection = evaluate(&input.prompt, &index, &config);
    if selection.is_empty() {
        debug!("No matches found");
    }

    // Log suggestions to stderr for debugging
    for (bucket, scored) in selection.items() {
        let label = match bucket {
            Bucket::Required => "REQUIRED".red(),
            Bucket::Suggested => "SUGGESTED".green(),
            Bucket::Optional => "OPTIONAL".blue(),
        };
        info!(
            "{} {} - {} matches (score: {:.2})",
            label,
            scored.skill.id.bold(),
            scored.evidence.len(),
            scored.confidence
        );
    }

    emit_json(&HookOutput::from_selection(&selection), false)
}

// ============================================================================
// Diagnostic Modes
// ============================================================================

fn run_rank(cli: &Cli, message: &str, json: bool) -> Result<()> {
    let config = resolve_config(cli);
    let handle = IndexHandle::open(index_sources(cli)?)?;
    let index = handle.snapshot();

    let evaluation = evaluate_with_diagnostics(message, &index, &config);
    if json {
        return emit_json(&RankReport::new(message, &evaluation), true);
    }
    print_ranked(&evaluation);
    Ok(())
}

fn print_ranked(evaluation: &Evaluation<'_>) {
    for warning in &evaluation.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    if evaluation.ranked.is_empty() {
        println!("{}", "No matching skills found.".yellow());
        return;
    }

    println!(
        "\n{}\n",
        format!("Ranked skills ({}):", evaluation.ranked.len()).bold()
    );
    for (i, scored) in evaluation.ranked.iter().enumerate() {
        let skill = scored.skill;
        let enforcement = match skill.enforcement {
            Enforcement::Required => skill.enforcement.as_str().red(),
            Enforcement::Suggested => skill.enforcement.as_str().green(),
            Enforcement::Optional => skill.enforcement.as_str().blue(),
        };
        println!(
            "{:>3}. {} [{} / {}] score {:.2} (threshold {:.2})",
            i + 1,
            skill.id.bold(),
            skill.priority,
            enforcement,
            scored.confidence,
            skill.confidence_threshold
        );
        if !scored.evidence.is_empty() {
            println!("     {}", scored.evidence.labels().join(", ").dimmed());
        }
    }

    let selection = &evaluation.selection;
    println!("\n{} {}", "Selection".bold(), format!("({})", selection.mode().as_str()).dimmed());
    for (bucket, scored) in selection.items() {
        let tag = match bucket {
            Bucket::Required => "required ".red(),
            Bucket::Suggested => "suggested".green(),
            Bucket::Optional => "optional ".blue(),
        };
        println!("  {} {}", tag, scored.skill.id);
    }
    println!();
}

fn run_list(cli: &Cli, json: bool) -> Result<()> {
    let handle = IndexHandle::open(index_sources(cli)?)?;
    let index = handle.snapshot();
    let listing = list_skills(&index);

    if json {
        return emit_json(&listing, true);
    }

    println!(
        "\n{}\n",
        format!("Indexed skills ({} total):", listing.len()).bold()
    );
    for skill in &listing {
        let status = if skill.auto_activate {
            "on ".green()
        } else {
            "off".dimmed()
        };
        let description: String = skill.description.chars().take(60).collect();
        println!(
            "  {} {:25} {:6} {:9} {:>5.2}  {}",
            status,
            skill.id,
            skill.priority.as_str(),
            skill.enforcement.as_str(),
            skill.confidence_threshold,
            description
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_hook() {
        let cli = Cli::try_parse_from(["skill-activator"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.index.is_empty());
    }

    #[test]
    fn test_cli_rank_with_globals() {
        let cli = Cli::try_parse_from([
            "skill-activator",
            "rank",
            "--json",
            "help",
            "me",
            "debug",
            "--index",
            "a.yaml",
            "--index",
            "b.yaml",
            "--format",
            "enhanced",
        ])
        .unwrap();
        assert_eq!(cli.index, vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]);
        assert_eq!(cli.format, Some(OutputMode::Enhanced));
        match cli.command {
            Some(Command::Rank { message, json }) => {
                assert!(json);
                assert_eq!(message.join(" "), "help me debug");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let prompt = "디".repeat(80);
        assert_eq!(preview(&prompt).chars().count(), PROMPT_PREVIEW_CHARS);
    }
}
