//! Provider for hosted OpenAI-compatible chat completion APIs.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionFuture, CompletionRequest, Provider};
use crate::error::{Error, Result};

/// Endpoint used when no `LLM_BASE_URL` is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Provider that sends the prompts as a system/user message pair with a
/// bearer credential.
pub struct OpenAiProvider {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Creates a provider for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderError`] if the HTTP client cannot be
    /// constructed.
    pub fn new(model: &str, base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::ProviderError(Box::new(e)))?;
        Ok(Self {
            client,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Request body for the chat completions endpoint.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

/// A single chat message.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from the chat completions endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// One completion choice.
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

/// The message inside a completion choice.
#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl Provider for OpenAiProvider {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let system_prompt = request.system_prompt.clone();
        let user_prompt = request.user_prompt.clone();
        let temperature = request.temperature;
        let max_tokens = request.max_tokens;

        Box::pin(async move {
            let url = format!("{}/v1/chat/completions", self.base_url);
            debug!(url = %url, model = %self.model, "sending chat completion request");

            let body = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage { role: "system", content: &system_prompt },
                    ChatMessage { role: "user", content: &user_prompt },
                ],
                temperature,
                max_tokens,
            };

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("chat completion request failed: {e}").into()
                })?;

            let status = response.status();
            let text = response.text().await.map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to read chat completion response: {e}").into()
                },
            )?;

            if !status.is_success() {
                return Err(format!("chat API error ({}): {text}", status.as_u16()).into());
            }

            let parsed: ChatResponse = serde_json::from_str(&text).map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to parse chat completion response: {e}").into()
                },
            )?;
            let choice = parsed.choices.into_iter().next().ok_or_else(|| {
                Box::<dyn std::error::Error + Send + Sync>::from(
                    "chat completion response contained no choices",
                )
            })?;
            Ok(choice.message.content)
        })
    }
}
