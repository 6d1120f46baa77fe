//! CLI interface for Parley
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parley: chat with a completion API while remembering recent exchanges
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        text: String,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// List available models
    Models {
        /// Bypass the model list cache
        #[arg(long)]
        refresh: bool,
    },

    /// Print the effective configuration
    Config,

    /// Manage the API key in the OS keychain
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

/// Per-session overrides of the `[memory]` and `[llm.openai]` config
#[derive(Args, Debug, Default, Clone)]
pub struct SessionArgs {
    /// Model to use (defaults to llm.openai.default_model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of past exchanges to remember
    #[arg(long)]
    pub capacity: Option<usize>,

    /// System prompt
    #[arg(long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// Completion token limit (1-2048)
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

/// API key actions
#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Prompt for the API key and store it
    Set,

    /// Remove the stored API key
    Delete,

    /// Report whether an API key is available
    Status,
}
