//! OpenAI-compatible completion provider
//!
//! Talks to `GET {base_url}/models` and `POST {base_url}/chat/completions`
//! with a bearer API key. Any server implementing the same JSON contract
//! works by pointing `base_url` at it.

use super::{CompletionProvider, LLMError, Result};
use crate::config::OpenAIConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use reqwest::{Client, Response};
use sdk::types::Message;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OpenAIProvider {
    base_url: String,
    api_key: SecretString,
    client: Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

impl OpenAIProvider {
    /// Create a provider from config and an explicit API key.
    ///
    /// # Errors
    /// Returns `LLMError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: &OpenAIConfig, api_key: SecretString) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Map non-success statuses to provider errors
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(LLMError::AuthenticationFailed(text)),
            429 => Err(LLMError::RateLimitExceeded),
            _ => Err(LLMError::InvalidRequest(format!("HTTP {}: {}", status, text))),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        tracing::debug!(%url, "Listing models");

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.unsecure())
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        let list: ModelList = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn create_completion(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatCompletionRequest {
            model,
            messages,
            max_tokens,
        };
        tracing::debug!(model, messages = messages.len(), max_tokens, "Creating completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.unsecure())
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        let data: ChatCompletionResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))
    }
}
