//! Chat session
//!
//! A `ChatSession` ties one [`ChatMemory`] to an explicit completion provider.
//! It sequences a chat turn (validate, check the model, build the request,
//! call the provider, remember the exchange) and caches the provider's model
//! list under a configurable [`ModelCachePolicy`].
//!
//! Provider failures of any kind surface as [`EngineError::Connection`]. The
//! detailed cause is logged with secrets scrubbed.
//!
//! A session is mutated through `&mut self`. Share one across tasks only
//! behind a mutex, and never share one between conversations.

mod catalog;

pub use catalog::{ModelCachePolicy, ModelCatalog};

use crate::llm::{CompletionProvider, LLMError};
use crate::memory::ChatMemory;
use crate::secrets;
use sdk::errors::{EngineError, InvalidArgument};
use sdk::types::Message;

/// One conversation: memory, provider and model catalog
pub struct ChatSession {
    provider: Box<dyn CompletionProvider>,
    memory: ChatMemory,
    catalog: ModelCatalog,
}

impl ChatSession {
    /// Create a session around an existing provider and memory
    pub fn new(
        provider: Box<dyn CompletionProvider>,
        memory: ChatMemory,
        catalog: ModelCatalog,
    ) -> Self {
        Self {
            provider,
            memory,
            catalog,
        }
    }

    pub fn memory(&self) -> &ChatMemory {
        &self.memory
    }

    /// Mutable access for the memory setters, `add_exchange` and `clear`
    pub fn memory_mut(&mut self) -> &mut ChatMemory {
        &mut self.memory
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Render the request the next turn would send, without sending it
    pub fn build_request(&self, new_user: &str) -> Result<Vec<Message>, InvalidArgument> {
        self.memory.build_request(new_user)
    }

    /// Available models, served from the cache while it is fresh
    pub async fn list_models(&mut self) -> Result<Vec<String>, EngineError> {
        if let Some(models) = self.catalog.cached() {
            tracing::debug!(count = models.len(), "Using cached model list");
            return Ok(models.to_vec());
        }

        self.refresh_models().await
    }

    /// Fetch the model list from the provider regardless of cache state
    ///
    /// A failed fetch leaves the previous cache untouched.
    pub async fn refresh_models(&mut self) -> Result<Vec<String>, EngineError> {
        let fetched = self
            .provider
            .list_models()
            .await
            .map_err(|e| self.connection_error("list models", e))?;

        let models = self.catalog.store(fetched);
        tracing::info!(count = models.len(), "Fetched model list");
        Ok(models.to_vec())
    }

    /// Forget the cached model list
    pub fn invalidate_models(&mut self) {
        self.catalog.invalidate();
    }

    /// Send one user message and remember the exchange.
    ///
    /// Validates the text, checks `model` against [`Self::list_models`], calls
    /// the provider with the rendered request and the configured token
    /// limit, then stores `(new_user, reply)`. Memory is unchanged on any
    /// failure.
    pub async fn send_turn(&mut self, model: &str, new_user: &str) -> Result<String, EngineError> {
        let messages = self.memory.build_request(new_user)?;

        let models = self.list_models().await?;
        if !models.iter().any(|m| m == model) {
            return Err(InvalidArgument::UnknownModel(model.to_string()).into());
        }

        let reply = self
            .provider
            .create_completion(model, &messages, self.memory.max_tokens())
            .await
            .map_err(|e| self.connection_error("create completion", e))?;

        self.memory.add_exchange(new_user, reply.as_str())?;
        tracing::debug!(
            model,
            stored = self.memory.len(),
            capacity = self.memory.capacity(),
            "Turn complete"
        );

        Ok(reply)
    }

    fn connection_error(&self, operation: &str, error: LLMError) -> EngineError {
        tracing::warn!(
            provider = self.provider.name(),
            operation,
            error = %secrets::scrub(&error.to_string()),
            "Completion API call failed"
        );
        EngineError::Connection
    }
}
