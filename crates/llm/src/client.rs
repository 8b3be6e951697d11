//! Chat-completions HTTP client.

use std::time::Duration;

use assistant::{AssistantReply, LanguageModel, ModelError, ToolSignature, Turn};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::mapping::{create_request, map_response, ChatCompletionResponse};
use crate::LlmError;

/// OpenAI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`OpenAiModel`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer credential for the provider.
    pub api_key: SecretString,
    /// API root; `chat/completions` is appended below it.
    pub base_url: Url,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature; `0.0` keeps tool selection deterministic.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a config for [`DEFAULT_MODEL`] at temperature `0.0`.
    #[must_use]
    pub fn new(api_key: SecretString, base_url: Url) -> Self {
        Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`LanguageModel`] backed by an OpenAI-compatible chat-completions endpoint.
///
/// One invocation is one HTTP request; failures are not retried.
pub struct OpenAiModel {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiModel {
    /// Creates the model client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn completions_url(&self) -> Result<Url, ModelError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ModelError::Configuration(format!(
                    "Base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["chat", "completions"]);
        Ok(url)
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    #[tracing::instrument(skip_all, fields(model = %self.config.model, turns = turns.len()))]
    async fn next_turn(
        &self,
        turns: &[Turn],
        tools: &[ToolSignature],
    ) -> Result<AssistantReply, ModelError> {
        let url = self.completions_url()?;
        let body = create_request(&self.config.model, self.config.temperature, turns, tools);

        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Model provider returned an error");
            return Err(ModelError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&raw)
            .map_err(|e| ModelError::MalformedResponse(format!("Parse error: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }

        let reply = map_response(parsed)?;
        debug!(tool_calls = reply.tool_calls.len(), "Model replied");
        Ok(reply)
    }
}
