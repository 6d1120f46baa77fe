//! Configuration management
//!
//! This module handles loading, validation, and management of the Parley configuration.
//! Configuration is stored in TOML format at ~/.parley/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **llm**: Completion API endpoint, default model and request timeout
//! - **memory**: Window capacity, system prompt and completion token limit
//! - **models**: Model list caching and filtering
//!
//! The API key is never stored here. It is resolved from the `OPENAI_API_KEY`
//! environment variable or the OS keychain (see [`crate::secrets`]).
//!
//! # Examples
//!
//! ```no_run
//! use parley_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! println!("Model: {}", config.llm.openai.default_model);
//! println!("Capacity: {}", config.memory.capacity);
//! # Ok(())
//! # }
//! ```

use crate::memory::{ChatMemory, DEFAULT_CAPACITY, DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT};
use crate::session::ModelCachePolicy;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Completion API configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Chat memory defaults
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Model list caching and filtering
    #[serde(default)]
    pub models: ModelsConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Completion API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// OpenAI-compatible endpoint settings
    #[serde(default)]
    pub openai: OpenAIConfig,
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Base URL for the API
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model used when the caller does not name one
    #[serde(default = "default_openai_model")]
    pub default_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    // Note: API key stored in OS keychain or environment, not in config
}

/// Chat memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of past exchanges sent with each request
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// System prompt prepended to every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Completion token limit (1-2048)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// How long a fetched model list stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCacheMode {
    /// Fetch on every lookup
    Refresh,

    /// Keep the first successful fetch for the whole session
    Session,

    /// Refetch once `cache_ttl_secs` has elapsed
    Ttl,
}

/// Model list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Cache mode for the model list
    #[serde(default = "default_cache_mode")]
    pub cache: ModelCacheMode,

    /// Lifetime of a cached model list when `cache = "ttl"`
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Only keep model ids starting with one of these prefixes (empty keeps all)
    #[serde(default)]
    pub allowed_prefixes: Vec<String>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_cache_mode() -> ModelCacheMode {
    ModelCacheMode::Ttl
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            default_model: default_openai_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl MemoryConfig {
    /// Build a chat memory from these settings
    pub fn build(&self) -> Result<ChatMemory, EngineError> {
        ChatMemory::with_settings(self.capacity, self.system_prompt.as_str(), self.max_tokens)
            .map_err(|e| EngineError::Config(format!("Invalid [memory] section: {}", e)))
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            cache: default_cache_mode(),
            cache_ttl_secs: default_cache_ttl_secs(),
            allowed_prefixes: Vec::new(),
        }
    }
}

impl ModelsConfig {
    /// Cache policy described by this section
    pub fn cache_policy(&self) -> ModelCachePolicy {
        match self.cache {
            ModelCacheMode::Refresh => ModelCachePolicy::Never,
            ModelCacheMode::Session => ModelCachePolicy::Forever,
            ModelCacheMode::Ttl => ModelCachePolicy::Ttl(Duration::from_secs(self.cache_ttl_secs)),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.parley/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Directory creation fails
    /// - File write fails
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();

        let toml_string = config.to_toml()?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Created default configuration at {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Get the default configuration file path (~/.parley/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".parley").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<(), EngineError> {
        // Validate log level
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        // Validate endpoint
        let openai = &self.llm.openai;
        if !(openai.base_url.starts_with("http://") || openai.base_url.starts_with("https://")) {
            return Err(EngineError::Config(format!(
                "Invalid base_url '{}'. Must start with http:// or https://",
                openai.base_url
            )));
        }
        if openai.default_model.trim().is_empty() {
            return Err(EngineError::Config(
                "default_model must not be empty".to_string(),
            ));
        }
        if openai.timeout_secs == 0 {
            return Err(EngineError::Config(
                "timeout_secs must be larger than zero".to_string(),
            ));
        }

        // Validate memory defaults with the same rules as the setters
        self.memory.build()?;

        // Validate model cache
        if self.models.cache == ModelCacheMode::Ttl && self.models.cache_ttl_secs == 0 {
            return Err(EngineError::Config(
                "cache_ttl_secs must be larger than zero when cache = \"ttl\"".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.llm.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.memory.capacity, 1);
        assert_eq!(config.memory.system_prompt, "You are a helpful assistant");
        assert_eq!(config.memory.max_tokens, 512);
        assert_eq!(config.models.cache, ModelCacheMode::Ttl);
        assert!(config.models.allowed_prefixes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.memory.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.llm.openai.default_model, "gpt-4o-mini");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = config.to_toml().unwrap();

        // Verify it can be deserialized back
        let deserialized = Config::from_toml(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(
            config.llm.openai.default_model,
            deserialized.llm.openai.default_model
        );
        assert_eq!(config.models.cache, deserialized.models.cache);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.core.log_level = "verbose".to_string();
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_invalid_memory_section() {
        let mut config = Config::default();
        config.memory.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.memory.system_prompt = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.memory.max_tokens = 2049;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.llm.openai.base_url = "api.openai.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_policy_mapping() {
        let mut models = ModelsConfig::default();
        assert_eq!(
            models.cache_policy(),
            ModelCachePolicy::Ttl(Duration::from_secs(300))
        );

        models.cache = ModelCacheMode::Session;
        assert_eq!(models.cache_policy(), ModelCachePolicy::Forever);

        models.cache = ModelCacheMode::Refresh;
        assert_eq!(models.cache_policy(), ModelCachePolicy::Never);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = Config::default();
        config.models.cache_ttl_secs = 0;
        assert!(config.validate().is_err());

        config.models.cache = ModelCacheMode::Refresh;
        assert!(config.validate().is_ok());
    }
}
