//! Run orchestration: one task name in, one validated result out.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{self, ExecutionResult};
use crate::prompt;
use crate::providers::{CompletionRequest, Provider};
use crate::resolve;
use crate::substitute::{declared_values, missing_variables};
use crate::task;

/// Executes a single task against the given provider.
///
/// Stages, in order: load the task definition, gate on its declared
/// environment variables, resolve context and repo files, assemble the
/// prompt, call the provider, validate the response. The first failing
/// stage aborts the rest; nothing is retried. The environment gate runs
/// before any context or repo file is read and reports every missing
/// name at once.
///
/// # Errors
///
/// Any variant of [`Error`]: the task may be missing or malformed, a
/// declared environment variable unset, a context entry unresolvable,
/// the provider unreachable, or its response malformed.
#[instrument(
    skip_all,
    fields(
        task = %task_name,
        run_id = %Uuid::new_v4(),
        breadcrumb = %config.tracking_breadcrumb
    )
)]
pub async fn run(
    config: &Config,
    provider: &dyn Provider,
    env: &BTreeMap<String, String>,
    task_name: &str,
) -> Result<ExecutionResult> {
    let spec = task::load(task_name, &config.repo_root, &config.context_root)?;
    info!("loaded task definition");

    let missing = missing_variables(&spec.environment, env);
    if !missing.is_empty() {
        return Err(Error::MissingEnvironmentVariable(missing));
    }
    let values = declared_values(&spec.environment, env);
    if !values.is_empty() {
        debug!(variables = values.len(), "declared environment variables present");
    }

    let resolved = resolve::resolve(&spec, &config.repo_root, &config.context_root, &values)?;
    info!(files = resolved.files.len(), "resolved context");

    let bundle = prompt::assemble(&spec, &resolved, &values);
    debug!(
        system_len = bundle.system_prompt.len(),
        user_len = bundle.user_prompt.len(),
        "assembled prompt"
    );

    let request = CompletionRequest {
        system_prompt: bundle.system_prompt,
        user_prompt: bundle.user_prompt,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    info!(provider = %config.provider, model = %config.model, "invoking provider");
    let raw = provider
        .complete(&request)
        .await
        .map_err(Error::ProviderError)?;

    let result = output::parse(&raw)?;
    info!("task execution complete");
    Ok(result)
}
