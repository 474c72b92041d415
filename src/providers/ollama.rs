//! Provider for a local Ollama server via its generate API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionFuture, CompletionRequest, Provider};
use crate::error::{Error, Result};

/// Endpoint used when no `LLM_BASE_URL` is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Provider that sends both prompts as a single generate request.
pub struct OllamaProvider {
    client: Client,
    model: String,
    base_url: String,
}

impl OllamaProvider {
    /// Creates a provider for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderError`] if the HTTP client cannot be
    /// constructed.
    pub fn new(model: &str, base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::ProviderError(Box::new(e)))?;
        Ok(Self {
            client,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Request body for the Ollama generate endpoint.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Sampling options nested inside the generate request.
#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response body from the Ollama generate endpoint.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl Provider for OllamaProvider {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        // Ollama's generate endpoint takes one prompt, so the system
        // prompt is prepended to the user prompt.
        let prompt = format!("{}\n\n{}", request.system_prompt, request.user_prompt);
        let temperature = request.temperature;
        let max_tokens = request.max_tokens;

        Box::pin(async move {
            let url = format!("{}/api/generate", self.base_url);
            debug!(url = %url, model = %self.model, "sending Ollama generate request");

            let body = GenerateRequest {
                model: &self.model,
                prompt: &prompt,
                stream: false,
                options: GenerateOptions { temperature, num_predict: max_tokens },
            };

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("Ollama request failed: {e}").into()
                })?;

            let status = response.status();
            let text = response.text().await.map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to read Ollama response: {e}").into()
                },
            )?;

            if !status.is_success() {
                return Err(format!("Ollama API error ({}): {text}", status.as_u16()).into());
            }

            let parsed: GenerateResponse = serde_json::from_str(&text).map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to parse Ollama response: {e}").into()
                },
            )?;
            Ok(parsed.response)
        })
    }
}
