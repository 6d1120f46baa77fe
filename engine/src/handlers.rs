//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - chat: interactive conversation with slash commands
//! - ask: one turn, print the reply
//! - models: list available models
//! - config: print the effective configuration
//! - key: manage the API key in the OS keychain

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sdk::errors::{EngineError, ParleyErrorExt};
use serde_json::json;

use crate::cli::{KeyAction, SessionArgs};
use crate::config::Config;
use crate::llm::openai::OpenAIProvider;
use crate::memory::ChatMemory;
use crate::secrets::{SecretManager, SecretString, API_KEY_ENTRY};
use crate::session::{ChatSession, ModelCatalog};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Build a chat memory from config with the command-line overrides applied
pub fn build_memory(config: &Config, args: &SessionArgs) -> Result<ChatMemory, EngineError> {
    let mut memory = config.memory.build()?;

    // Capacity is applied first since it resets the window
    if let Some(capacity) = args.capacity {
        memory.set_capacity(capacity)?;
    }
    if let Some(prompt) = &args.system_prompt {
        memory.set_system_prompt(prompt.as_str())?;
    }
    if let Some(max_tokens) = args.max_tokens {
        memory.set_max_tokens(max_tokens)?;
    }

    Ok(memory)
}

/// Build a session against the configured OpenAI-compatible endpoint
pub fn build_session(
    config: &Config,
    args: &SessionArgs,
    api_key: SecretString,
) -> Result<ChatSession> {
    let memory = build_memory(config, args)?;

    let provider = OpenAIProvider::new(&config.llm.openai, api_key)
        .context("Failed to create completion provider")?;

    let catalog = ModelCatalog::new(config.models.cache_policy())
        .with_allowed_prefixes(config.models.allowed_prefixes.clone());

    Ok(ChatSession::new(Box::new(provider), memory, catalog))
}

/// Model named on the command line, or the configured default
pub fn resolve_model(config: &Config, args: &SessionArgs) -> String {
    args.model
        .clone()
        .unwrap_or_else(|| config.llm.openai.default_model.clone())
}

fn resolve_api_key() -> Result<SecretString> {
    SecretManager::default()
        .resolve_api_key()
        .context("Failed to resolve API key")
}

/// Send one message and print the reply
pub async fn handle_ask(
    text: String,
    args: SessionArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let model = resolve_model(config, &args);
    let mut session = build_session(config, &args, resolve_api_key()?)?;

    let reply = session.send_turn(&model, &text).await?;

    match format {
        OutputFormat::Text => println!("{}", reply),
        OutputFormat::Json => {
            let output = json!({
                "model": model,
                "user": text,
                "assistant": reply,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// List available models
pub async fn handle_models(refresh: bool, config: &Config, format: OutputFormat) -> Result<()> {
    let mut session = build_session(config, &SessionArgs::default(), resolve_api_key()?)?;

    let models = if refresh {
        session.refresh_models().await?
    } else {
        session.list_models().await?
    };

    match format {
        OutputFormat::Text => {
            if models.is_empty() {
                println!("No models available");
                return Ok(());
            }
            println!("Available models ({}):", models.len());
            for model in &models {
                let marker = if *model == config.llm.openai.default_model {
                    " (default)"
                } else {
                    ""
                };
                println!("  {}{}", model, marker);
            }
        }
        OutputFormat::Json => {
            let mut output = models_json(&models);
            output["default"] = json!(config.llm.openai.default_model);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn models_json(models: &[String]) -> serde_json::Value {
    json!({
        "models": models,
        "count": models.len(),
    })
}

/// Print the effective configuration
pub fn handle_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Manage the API key in the OS keychain
pub fn handle_key(action: KeyAction, format: OutputFormat) -> Result<()> {
    let manager = SecretManager::default();

    let status = match action {
        KeyAction::Set => {
            let value = crate::secrets::prompt_for_secret(API_KEY_ENTRY)?;
            manager.set_secret(API_KEY_ENTRY, &value)?;
            "stored"
        }
        KeyAction::Delete => {
            manager.delete_secret(API_KEY_ENTRY)?;
            "deleted"
        }
        KeyAction::Status => {
            if crate::secrets::api_key_from_env().is_some() {
                "environment"
            } else if manager.has_secret(API_KEY_ENTRY) {
                "keychain"
            } else {
                "missing"
            }
        }
    };

    match format {
        OutputFormat::Text => println!("API key: {}", status),
        OutputFormat::Json => println!("{}", json!({ "api_key": status })),
    }
    Ok(())
}

/// Slash command typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text to send as a chat turn
    Say(String),
    Clear,
    History,
    Capacity(usize),
    System(String),
    MaxTokens(u32),
    Models,
    Model(String),
    Help,
    Exit,
}

impl ReplCommand {
    /// Parse one line of input. Returns `Err` with a usage message for a
    /// malformed slash command.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Self::Say(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "clear" => Ok(Self::Clear),
            "history" => Ok(Self::History),
            "models" => Ok(Self::Models),
            "help" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Exit),
            "capacity" => arg
                .parse()
                .map(Self::Capacity)
                .map_err(|_| "usage: /capacity <N>".to_string()),
            "max-tokens" => arg
                .parse()
                .map(Self::MaxTokens)
                .map_err(|_| "usage: /max-tokens <N>".to_string()),
            "system" => Ok(Self::System(arg.to_string())),
            "model" if !arg.is_empty() => Ok(Self::Model(arg.to_string())),
            "model" => Err("usage: /model <NAME>".to_string()),
            other => Err(format!("unknown command '/{}', try /help", other)),
        }
    }
}

const REPL_HELP: &str = "\
Commands:
  /clear            forget remembered exchanges
  /history          show remembered exchanges
  /capacity N       remember the last N exchanges (clears memory)
  /system TEXT      replace the system prompt
  /max-tokens N     set the completion token limit (1-2048)
  /models           list available models
  /model NAME       switch model
  /exit             leave";

/// Interactive chat loop
pub async fn handle_chat(args: SessionArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut model = resolve_model(config, &args);
    let mut session = build_session(config, &args, resolve_api_key()?)?;
    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;

    println!(
        "Chatting with {} (remembering {} exchange(s)). Type /help for commands.",
        model,
        session.memory().capacity()
    );

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            tracing::debug!(error = %e, "Failed to record history entry");
        }

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };

        match command {
            ReplCommand::Exit => break,
            ReplCommand::Help => println!("{}", REPL_HELP),
            ReplCommand::Model(name) => {
                model = name;
                println!("Using model {}", model);
            }
            other => {
                if let Err(e) = run_repl_command(&mut session, &model, other, format).await {
                    report_error(&e);
                }
            }
        }
    }

    tracing::info!(stored = session.memory().len(), "Chat session ended");
    Ok(())
}

/// Apply one non-control REPL command to the session
pub async fn run_repl_command(
    session: &mut ChatSession,
    model: &str,
    command: ReplCommand,
    format: OutputFormat,
) -> Result<(), EngineError> {
    match command {
        ReplCommand::Say(text) => {
            let reply = session.send_turn(model, &text).await?;
            match format {
                OutputFormat::Text => println!("assistant> {}", reply),
                OutputFormat::Json => println!("{}", json!({ "assistant": reply })),
            }
        }
        ReplCommand::Clear => {
            session.memory_mut().clear();
            println!("Memory cleared");
        }
        ReplCommand::History => {
            let exchanges = session.memory().list_exchanges();
            match format {
                OutputFormat::Text => {
                    if exchanges.is_empty() {
                        println!("No remembered exchanges");
                    }
                    for (i, exchange) in exchanges.iter().enumerate() {
                        println!("[{}] you> {}", i + 1, exchange.user());
                        println!("    assistant> {}", exchange.assistant());
                    }
                }
                OutputFormat::Json => println!("{}", json!({ "exchanges": exchanges })),
            }
        }
        ReplCommand::Capacity(capacity) => {
            session.memory_mut().set_capacity(capacity)?;
            println!("Remembering the last {} exchange(s); memory cleared", capacity);
        }
        ReplCommand::System(prompt) => {
            session.memory_mut().set_system_prompt(prompt)?;
            println!("System prompt updated");
        }
        ReplCommand::MaxTokens(max_tokens) => {
            session.memory_mut().set_max_tokens(max_tokens)?;
            println!("Max tokens set to {}", max_tokens);
        }
        ReplCommand::Models => {
            let models = session.list_models().await?;
            match format {
                OutputFormat::Text => {
                    for name in &models {
                        println!("  {}", name);
                    }
                }
                OutputFormat::Json => println!("{}", models_json(&models)),
            }
        }
        // Control commands are handled by the loop
        ReplCommand::Model(_) | ReplCommand::Help | ReplCommand::Exit => {}
    }
    Ok(())
}

/// Print an engine error and its hint to stderr
pub fn report_error(error: &EngineError) {
    eprintln!("Error: {}", error);
    eprintln!("Hint: {}", error.user_hint());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionProvider, Result as LLMResult};
    use crate::session::ModelCachePolicy;
    use async_trait::async_trait;
    use sdk::errors::InvalidArgument;
    use sdk::types::Message;

    struct FixedModels;

    #[async_trait]
    impl CompletionProvider for FixedModels {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn list_models(&self) -> LLMResult<Vec<String>> {
            Ok(vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()])
        }

        async fn create_completion(
            &self,
            _model: &str,
            _messages: &[Message],
            _max_tokens: u32,
        ) -> LLMResult<String> {
            Ok("ok".to_string())
        }
    }

    #[test]
    fn test_models_json_shape() {
        let models = vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()];
        assert_eq!(
            models_json(&models),
            json!({"models": ["gpt-4o-mini", "gpt-4o"], "count": 2})
        );
    }

    #[tokio::test]
    async fn test_repl_models_in_both_formats() {
        let mut session = ChatSession::new(
            Box::new(FixedModels),
            ChatMemory::new(),
            ModelCatalog::new(ModelCachePolicy::Forever),
        );

        for format in [OutputFormat::Text, OutputFormat::Json] {
            run_repl_command(&mut session, "gpt-4o-mini", ReplCommand::Models, format)
                .await
                .unwrap();
        }
        assert!(session.memory().is_empty());
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(
            ReplCommand::parse("  hello there "),
            Ok(ReplCommand::Say("hello there".to_string()))
        );
    }

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(ReplCommand::parse("/clear"), Ok(ReplCommand::Clear));
        assert_eq!(ReplCommand::parse("/history"), Ok(ReplCommand::History));
        assert_eq!(ReplCommand::parse("/capacity 4"), Ok(ReplCommand::Capacity(4)));
        assert_eq!(ReplCommand::parse("/max-tokens 100"), Ok(ReplCommand::MaxTokens(100)));
        assert_eq!(
            ReplCommand::parse("/system Be terse."),
            Ok(ReplCommand::System("Be terse.".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("/model gpt-4o"),
            Ok(ReplCommand::Model("gpt-4o".to_string()))
        );
        assert_eq!(ReplCommand::parse("/quit"), Ok(ReplCommand::Exit));
    }

    #[test]
    fn test_parse_malformed_commands() {
        assert!(ReplCommand::parse("/capacity").is_err());
        assert!(ReplCommand::parse("/capacity -1").is_err());
        assert!(ReplCommand::parse("/max-tokens lots").is_err());
        assert!(ReplCommand::parse("/model").is_err());
        assert!(ReplCommand::parse("/bogus").is_err());
    }

    #[test]
    fn test_build_memory_applies_overrides() {
        let config = Config::default();
        let args = SessionArgs {
            capacity: Some(4),
            system_prompt: Some("Be brief".to_string()),
            max_tokens: Some(128),
            ..Default::default()
        };

        let memory = build_memory(&config, &args).unwrap();
        assert_eq!(memory.capacity(), 4);
        assert_eq!(memory.system_prompt(), "Be brief");
        assert_eq!(memory.max_tokens(), 128);
    }

    #[test]
    fn test_build_memory_rejects_bad_override() {
        let config = Config::default();
        let args = SessionArgs {
            max_tokens: Some(0),
            ..Default::default()
        };

        assert!(matches!(
            build_memory(&config, &args),
            Err(EngineError::InvalidArgument(InvalidArgument::MaxTokens(0)))
        ));
    }

    #[test]
    fn test_resolve_model() {
        let config = Config::default();
        assert_eq!(resolve_model(&config, &SessionArgs::default()), "gpt-4o-mini");

        let args = SessionArgs {
            model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_model(&config, &args), "gpt-4o");
    }
}
