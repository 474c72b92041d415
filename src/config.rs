//! Runtime configuration.
//!
//! Every knob is an environment variable with a hardcoded default,
//! resolved once per process from a single environment snapshot and
//! passed down by parameter. An empty value counts as unset. The API
//! key is a secret: it is masked in debug output and never logged.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::cli::Cli;

const DEFAULT_REPO_ROOT: &str = "/workspace/repo";
const DEFAULT_CONTEXT_ROOT: &str = "/workspace/context";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PROVIDER: &str = "null";
const DEFAULT_MODEL: &str = "codellama";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 8192;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Resolved configuration for one run.
#[derive(Clone)]
pub struct Config {
    /// Root of the repository being transformed.
    pub repo_root: PathBuf,
    /// Root of the shared context tree.
    pub context_root: PathBuf,
    /// Requested log verbosity, as written in the environment.
    pub log_level: String,
    /// Opaque run tag echoed into the logs; empty means untagged.
    pub tracking_breadcrumb: String,
    /// Provider name, matched case-insensitively at startup.
    pub provider: String,
    /// Model identifier passed through to the backend.
    pub model: String,
    /// Provider endpoint; `None` leaves the provider's own default in place.
    pub base_url: Option<String>,
    /// Credential for hosted providers; empty means none.
    pub api_key: String,
    /// Sampling temperature for every completion call.
    pub temperature: f32,
    /// Upper bound on generated tokens per completion call.
    pub max_tokens: u32,
    /// HTTP timeout applied to provider requests.
    pub timeout_secs: u64,
}

impl Config {
    /// Resolves every configuration value from the environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable when a numeric value does
    /// not parse.
    pub fn from_snapshot(env: &BTreeMap<String, String>) -> Result<Self, String> {
        Ok(Self {
            repo_root: PathBuf::from(string_value(env, "REPO_ROOT", DEFAULT_REPO_ROOT)),
            context_root: PathBuf::from(string_value(env, "CONTEXT_ROOT", DEFAULT_CONTEXT_ROOT)),
            log_level: string_value(env, "LOG_LEVEL", DEFAULT_LOG_LEVEL),
            tracking_breadcrumb: string_value(env, "TRACKING_BREADCRUMB", ""),
            provider: string_value(env, "LLM_PROVIDER", DEFAULT_PROVIDER),
            model: string_value(env, "LLM_MODEL", DEFAULT_MODEL),
            base_url: optional_value(env, "LLM_BASE_URL"),
            api_key: secret_value(env, "LLM_API_KEY"),
            temperature: number_value(env, "LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: number_value(env, "LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            timeout_secs: number_value(env, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Resolves configuration from the snapshot, then applies
    /// command-line overrides for the two roots.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_snapshot`].
    pub fn load(cli: &Cli, env: &BTreeMap<String, String>) -> Result<Self, String> {
        let mut config = Self::from_snapshot(env)?;
        if let Some(repo_root) = &cli.repo_root {
            config.repo_root.clone_from(repo_root);
        }
        if let Some(context_root) = &cli.context_root {
            config.context_root.clone_from(context_root);
        }
        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo_root", &self.repo_root)
            .field("context_root", &self.context_root)
            .field("log_level", &self.log_level)
            .field("tracking_breadcrumb", &self.tracking_breadcrumb)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &mask(&self.api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

fn string_value(env: &BTreeMap<String, String>, name: &str, default: &str) -> String {
    match env.get(name) {
        Some(value) if !value.is_empty() => {
            debug!(name, source = "environment", value = %value, "config");
            value.clone()
        }
        _ => {
            debug!(name, source = "default", value = %default, "config");
            default.to_string()
        }
    }
}

fn optional_value(env: &BTreeMap<String, String>, name: &str) -> Option<String> {
    let value = env.get(name).filter(|value| !value.is_empty()).cloned();
    match &value {
        Some(value) => debug!(name, source = "environment", value = %value, "config"),
        None => debug!(name, source = "default", value = "", "config"),
    }
    value
}

fn secret_value(env: &BTreeMap<String, String>, name: &str) -> String {
    match env.get(name) {
        Some(value) if !value.is_empty() => {
            debug!(name, source = "environment", value = "***", "config");
            value.clone()
        }
        _ => {
            debug!(name, source = "default", value = "", "config");
            String::new()
        }
    }
}

fn number_value<T>(env: &BTreeMap<String, String>, name: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match env.get(name) {
        Some(raw) if !raw.is_empty() => {
            let value = raw
                .trim()
                .parse::<T>()
                .map_err(|e| format!("invalid {name}: {e}"))?;
            debug!(name, source = "environment", value = %value, "config");
            Ok(value)
        }
        _ => {
            debug!(name, source = "default", value = %default, "config");
            Ok(default)
        }
    }
}
