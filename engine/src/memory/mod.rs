//! Chat memory
//!
//! Keeps a bounded sliding window of past user/assistant exchanges and renders
//! them, together with a system prompt, into the ordered message list a chat
//! completion endpoint expects.
//!
//! The window is a FIFO: once `capacity` exchanges are stored, adding another
//! evicts the oldest. Changing the capacity resets the window instead of
//! migrating old entries into the new size.
//!
//! Every setter validates before it assigns, so a failed call leaves the
//! memory exactly as it was.

use sdk::errors::{InvalidArgument, MAX_TOKENS_LIMIT};
use sdk::types::{Exchange, Message};
use std::collections::VecDeque;

/// Default number of exchanges kept in the window
pub const DEFAULT_CAPACITY: usize = 1;

/// Default system prompt prepended to every request
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

/// Default completion budget in tokens
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Bounded FIFO of exchanges plus the request settings that go with it
#[derive(Debug, Clone)]
pub struct ChatMemory {
    /// Stored exchanges, oldest first
    exchanges: VecDeque<Exchange>,

    /// Maximum number of stored exchanges (always >= 1)
    capacity: usize,

    /// System prompt sent as the first message of every request
    system_prompt: String,

    /// Completion token limit, in `1..=MAX_TOKENS_LIMIT`
    max_tokens: u32,
}

impl ChatMemory {
    /// Create a memory with default settings and an empty window
    pub fn new() -> Self {
        Self {
            exchanges: VecDeque::with_capacity(DEFAULT_CAPACITY),
            capacity: DEFAULT_CAPACITY,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Create a memory from explicit settings, validating each one the same
    /// way the setters do.
    pub fn with_settings(
        capacity: usize,
        system_prompt: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, InvalidArgument> {
        let mut memory = Self::new();
        memory.set_capacity(capacity)?;
        memory.set_system_prompt(system_prompt)?;
        memory.set_max_tokens(max_tokens)?;
        Ok(memory)
    }

    /// Change the window size.
    ///
    /// Discards every stored exchange on success.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), InvalidArgument> {
        if capacity == 0 {
            return Err(InvalidArgument::Capacity);
        }

        self.capacity = capacity;
        self.exchanges = VecDeque::with_capacity(capacity);
        tracing::debug!(capacity, "Chat memory capacity changed, window reset");
        Ok(())
    }

    /// Replace the system prompt
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) -> Result<(), InvalidArgument> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(InvalidArgument::SystemPrompt);
        }

        self.system_prompt = prompt;
        Ok(())
    }

    /// Replace the completion token limit
    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<(), InvalidArgument> {
        if !(1..=MAX_TOKENS_LIMIT).contains(&max_tokens) {
            return Err(InvalidArgument::MaxTokens(max_tokens));
        }

        self.max_tokens = max_tokens;
        Ok(())
    }

    /// Append an exchange, evicting the oldest one when the window is full
    pub fn add_exchange(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<(), InvalidArgument> {
        let exchange = Exchange::new(user, assistant)?;

        while self.exchanges.len() >= self.capacity {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(exchange);
        Ok(())
    }

    /// Snapshot of the stored exchanges, oldest first
    pub fn list_exchanges(&self) -> Vec<Exchange> {
        self.exchanges.iter().cloned().collect()
    }

    /// Drop every stored exchange. Settings are kept.
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Render the request for a new user message.
    ///
    /// The result is the system prompt, then each stored exchange as a
    /// user/assistant pair in insertion order, then the new user message.
    pub fn build_request(&self, new_user: &str) -> Result<Vec<Message>, InvalidArgument> {
        if new_user.is_empty() {
            return Err(InvalidArgument::UserContent);
        }

        let mut messages = Vec::with_capacity(self.exchanges.len() * 2 + 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        for exchange in &self.exchanges {
            messages.push(Message::user(exchange.user()));
            messages.push(Message::assistant(exchange.assistant()));
        }
        messages.push(Message::user(new_user));

        Ok(messages)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Number of stored exchanges
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl Default for ChatMemory {
    fn default() -> Self {
        Self::new()
    }
}
