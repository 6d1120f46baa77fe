//! Parley SDK
//!
//! Shared error and conversation types for Parley components.
//! This crate is used by the engine and by anything that embeds it.

/// Error types and handling
pub mod errors;

/// Conversation types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, InvalidArgument, ParleyErrorExt, MAX_TOKENS_LIMIT};
pub use types::{Exchange, Message, MessageRole};
