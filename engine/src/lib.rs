//! Parley Engine Library
//!
//! Conversational memory for chat completion APIs: a bounded window of past
//! exchanges, the request builder that renders it, and a session that sends
//! turns through an explicit provider. Used by the `parley` binary and by
//! integration tests.

/// Configuration management module
pub mod config;

/// Bounded chat memory and request builder
pub mod memory;

/// Completion provider abstraction layer
pub mod llm;

/// Chat session and model catalog
pub mod session;

/// API key storage and secret scrubbing
pub mod secrets;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

pub use memory::ChatMemory;
pub use session::{ChatSession, ModelCachePolicy, ModelCatalog};
