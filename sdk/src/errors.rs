//! Error types and handling
//!
//! This module provides the error types used throughout Parley.
//! All errors implement the `ParleyErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry API keys or raw transport payloads. Every
//! failure talking to the completion API is reported as the single
//! [`EngineError::Connection`] variant with a fixed message.

use thiserror::Error;

/// Largest completion budget accepted by [`InvalidArgument::MaxTokens`] checks.
pub const MAX_TOKENS_LIMIT: u32 = 2048;

/// Trait for Parley error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information.
pub trait ParleyErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// secrets or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried after the caller fixes its input or
    /// the network comes back.
    fn is_recoverable(&self) -> bool;
}

/// Validation failure for a caller-supplied value.
///
/// Raised synchronously before any state changes, so the caller can fix the
/// input and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("Invalid capacity: capacity must be larger than zero")]
    Capacity,

    #[error("Invalid system prompt: system prompt must not be empty")]
    SystemPrompt,

    #[error("Invalid max tokens {0}: max tokens must be between 1 and 2048")]
    MaxTokens(u32),

    #[error("Invalid user content: user content must not be empty")]
    UserContent,

    #[error("Invalid assistant content: assistant content must not be empty")]
    AssistantContent,

    #[error("Model not found: {0}")]
    UnknownModel(String),
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, InvalidArgument, ParleyErrorExt};
///
/// let error = EngineError::from(InvalidArgument::Capacity);
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let connection = EngineError::Connection;
/// assert_eq!(connection.to_string(), "Calling the chat completion API failed");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Validation errors
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    // Remote API errors, collapsed to one kind
    #[error("Calling the chat completion API failed")]
    Connection,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Keyring errors
    #[error("Keyring error: {0}")]
    KeyringError(String),
}

impl ParleyErrorExt for InvalidArgument {
    fn user_hint(&self) -> &str {
        match self {
            Self::Capacity => "Memory capacity must be at least 1",
            Self::SystemPrompt => "Provide a non-empty system prompt",
            Self::MaxTokens(_) => "Max tokens must be between 1 and 2048",
            Self::UserContent => "Type a message before sending",
            Self::AssistantContent => "The assistant reply was empty",
            Self::UnknownModel(_) => "Run 'parley models' to see available models",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

impl ParleyErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::InvalidArgument(inner) => inner.user_hint(),
            Self::Connection => "Check your API key and network connection, then try again",
            Self::Config(_) => "Check your config.toml file for errors",
            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) | Self::KeyringError(_) => false,
            _ => true,
        }
    }
}
