//! Completion providers.
//!
//! One trait, three implementations: [`NullProvider`] answers with a
//! fixed contract-shaped response for dry runs, [`OllamaProvider`]
//! speaks the generate API of a local Ollama server, and
//! [`OpenAiProvider`] speaks the hosted chat-completions API with a
//! bearer credential. Which one runs is decided once per process from
//! configuration; the executor only ever sees the trait.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

mod null;
mod ollama;
mod openai;

pub use null::NullProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Boxed future type alias used by [`Provider`] to keep the trait dyn-compatible.
pub type CompletionFuture<'a> = Pin<
    Box<dyn Future<Output = std::result::Result<String, Box<dyn StdError + Send + Sync>>> + Send + 'a>,
>;

/// One completion call: the assembled prompts plus sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Role, guarantees, and output contract.
    pub system_prompt: String,
    /// Task description, instructions, and fenced files.
    pub user_prompt: String,
    /// Sampling temperature forwarded to the backend.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Turns an assembled prompt into raw response text.
pub trait Provider: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, times out,
    /// rejects the credential, or answers with a non-success status.
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_>;
}

/// Builds the provider selected by `config.provider` (case-insensitive).
///
/// # Errors
///
/// Returns [`Error::ProviderError`] for an unknown provider name, a
/// hosted provider without an API key or endpoint, or an HTTP client
/// that cannot be constructed.
pub fn create(config: &Config) -> Result<Box<dyn Provider>> {
    match config.provider.to_lowercase().as_str() {
        "null" => {
            info!("using null provider (dry-run)");
            Ok(Box::new(NullProvider::new()))
        }
        "ollama" => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or(ollama::DEFAULT_BASE_URL);
            info!(model = %config.model, base_url = %base_url, "using Ollama provider");
            Ok(Box::new(OllamaProvider::new(
                &config.model,
                base_url,
                config.timeout_secs,
            )?))
        }
        provider @ ("openai" | "azure") => {
            if config.api_key.is_empty() {
                return Err(Error::ProviderError(
                    format!("LLM_API_KEY is required for provider {provider}").into(),
                ));
            }
            let base_url = match (config.base_url.as_deref(), provider) {
                (Some(url), _) => url,
                (None, "openai") => openai::DEFAULT_BASE_URL,
                (None, _) => {
                    return Err(Error::ProviderError(
                        format!("LLM_BASE_URL is required for provider {provider}").into(),
                    ))
                }
            };
            info!(model = %config.model, base_url = %base_url, "using hosted API provider");
            Ok(Box::new(OpenAiProvider::new(
                &config.model,
                base_url,
                &config.api_key,
                config.timeout_secs,
            )?))
        }
        other => Err(Error::ProviderError(
            format!("unsupported LLM provider: {other}").into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_for(provider: &str) -> Config {
        Config {
            repo_root: PathBuf::from("/workspace/repo"),
            context_root: PathBuf::from("/workspace/context"),
            log_level: "info".to_string(),
            tracking_breadcrumb: String::new(),
            provider: provider.to_string(),
            model: "codellama".to_string(),
            base_url: None,
            api_key: String::new(),
            temperature: 0.7,
            max_tokens: 64,
            timeout_secs: 5,
        }
    }

    #[test]
    fn selects_the_null_provider_case_insensitively() {
        assert!(create(&config_for("null")).is_ok());
        assert!(create(&config_for("NULL")).is_ok());
    }

    #[test]
    fn builds_an_ollama_provider_with_its_default_endpoint() {
        assert!(create(&config_for("ollama")).is_ok());
    }

    #[test]
    fn hosted_providers_require_an_api_key() {
        // map to () first: the boxed provider has no Debug impl.
        let err = create(&config_for("openai")).map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn azure_requires_an_explicit_endpoint() {
        let mut config = config_for("azure");
        config.api_key = "key".to_string();
        let err = create(&config).map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("LLM_BASE_URL"));

        config.base_url = Some("https://example.azure.com".to_string());
        assert!(create(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_provider_names() {
        let err = create(&config_for("telepathy")).map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("unsupported LLM provider: telepathy"));
    }
}
