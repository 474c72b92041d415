//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI parser for `runbook`.
#[derive(Debug, Parser)]
#[command(
    name = "runbook",
    version,
    about = "LLM-powered code transformation executor"
)]
pub struct Cli {
    /// Task name, without the .md extension. Falls back to the
    /// TASK_NAME environment variable when omitted.
    #[arg(long)]
    pub task: Option<String>,

    /// Repository root path (default: REPO_ROOT environment variable).
    #[arg(long)]
    pub repo_root: Option<PathBuf>,

    /// Context root path (default: CONTEXT_ROOT environment variable).
    #[arg(long)]
    pub context_root: Option<PathBuf>,
}
