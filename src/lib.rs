//! Single-shot task executor: a task definition in, a commit message
//! and patch out.
//!
//! One process runs one task. The task file names the files the
//! provider may see and the environment variables the run requires; the
//! executor assembles a deterministic prompt, calls the configured
//! completion provider, validates the response against the two-marker
//! output contract, and prints it to stdout. Stdout carries nothing but
//! that contract; diagnostics go to stderr.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod providers;
pub mod resolve;
pub mod substitute;
pub mod task;

use clap::Parser;
use tracing::{debug, warn};

use crate::config::Config;
use crate::output::{COMMIT_MARKER, PATCH_MARKER};

/// Runs the CLI with the provided arguments.
///
/// On success the validated commit message and patch are printed to
/// stdout in the two-marker contract format; on failure nothing is
/// printed to stdout at all.
///
/// # Errors
///
/// Returns an error string when argument parsing, configuration, or
/// task execution fails.
pub async fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    // One snapshot serves configuration and variable substitution alike.
    let env = substitute::environment_snapshot();
    let config = Config::load(&cli, &env)?;
    debug!(config = ?config, "configuration loaded");

    if config.tracking_breadcrumb.is_empty() {
        warn!("TRACKING_BREADCRUMB not set");
    }

    if !config.repo_root.is_dir() {
        return Err(format!(
            "repository root is not a directory: {}",
            config.repo_root.display()
        ));
    }
    if !config.context_root.is_dir() {
        return Err(format!(
            "context root is not a directory: {}",
            config.context_root.display()
        ));
    }

    let Some(task_name) = cli
        .task
        .or_else(|| env.get("TASK_NAME").filter(|v| !v.is_empty()).cloned())
    else {
        return Err("no task given: pass --task or set TASK_NAME".to_string());
    };

    let provider = providers::create(&config).map_err(|e| e.to_string())?;
    let result = executor::run(&config, provider.as_ref(), &env, &task_name)
        .await
        .map_err(|e| e.to_string())?;

    println!("{COMMIT_MARKER}");
    println!("{}", result.commit_message);
    println!("{PATCH_MARKER}");
    println!("{}", result.patch);
    Ok(())
}
