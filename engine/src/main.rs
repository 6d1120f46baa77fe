// Parley
// Main entry point for the parley binary

use clap::Parser;
use parley_engine::cli::{Cli, Command};
use parley_engine::config::Config;
use parley_engine::handlers::{
    handle_ask, handle_chat, handle_config, handle_key, handle_models, report_error, OutputFormat,
};
use parley_engine::telemetry::init_telemetry_with_level;
use sdk::errors::EngineError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        match e.downcast_ref::<EngineError>() {
            Some(engine_error) => report_error(engine_error),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Parley v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::Chat { session } => {
            tracing::info!("Starting interactive chat");
            handle_chat(session, &config, format).await
        }

        Command::Ask { text, session } => {
            tracing::info!("Sending one-shot message");
            handle_ask(text, session, &config, format).await
        }

        Command::Models { refresh } => {
            tracing::info!("Listing models (refresh: {})", refresh);
            handle_models(refresh, &config, format).await
        }

        Command::Config => handle_config(&config, format),

        Command::Key { action } => {
            tracing::info!("API key management: {:?}", action);
            handle_key(action, format)
        }
    }
}
