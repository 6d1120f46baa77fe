//! Chat completion provider abstraction
//!
//! This module defines the two capabilities the chat session needs from a
//! remote completion API: listing the models it serves and creating a chat
//! completion. `CompletionProvider` is the seam; `openai::OpenAIProvider`
//! implements it over HTTPS, and tests substitute mock servers or fakes.
//!
//! `LLMError` keeps enough detail for logs. Callers outside the session never
//! see it: the session collapses every variant into `EngineError::Connection`.

use async_trait::async_trait;
use sdk::types::Message;

pub mod openai;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while talking to a completion provider
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Completion provider trait that every backend implements
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "openai")
    fn name(&self) -> &str;

    /// List the identifiers of the models the provider serves, in the order
    /// the provider reports them
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Create a chat completion and return the assistant text
    ///
    /// # Arguments
    /// * `model` - Model identifier
    /// * `messages` - Full request: system prompt, history, new user message
    /// * `max_tokens` - Completion token limit
    async fn create_completion(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String>;
}
