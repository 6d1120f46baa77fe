//! Integration tests for configuration management
//!
//! These tests load real files from a temporary directory and check
//! validation and defaults.

use parley_engine::config::{Config, ModelCacheMode};
use parley_engine::ModelCachePolicy;
use sdk::errors::EngineError;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[core]
log_level = "debug"

[llm.openai]
base_url = "http://localhost:8080/v1"
default_model = "gpt-4o"
timeout_secs = 30

[memory]
capacity = 5
system_prompt = "You are a terse assistant"
max_tokens = 256

[models]
cache = "session"
allowed_prefixes = ["gpt-", "o1"]
"#,
    );

    let config = Config::load_from_path(file.path()).expect("Failed to load config");

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.llm.openai.base_url, "http://localhost:8080/v1");
    assert_eq!(config.llm.openai.default_model, "gpt-4o");
    assert_eq!(config.llm.openai.timeout_secs, 30);
    assert_eq!(config.memory.capacity, 5);
    assert_eq!(config.memory.system_prompt, "You are a terse assistant");
    assert_eq!(config.memory.max_tokens, 256);
    assert_eq!(config.models.cache, ModelCacheMode::Session);
    assert_eq!(config.models.cache_policy(), ModelCachePolicy::Forever);
    assert_eq!(config.models.allowed_prefixes, vec!["gpt-", "o1"]);

    let memory = config.memory.build().unwrap();
    assert_eq!(memory.capacity(), 5);
    assert!(memory.is_empty());
}

#[test]
fn test_partial_config_fills_defaults() {
    let file = write_config(
        r#"
[memory]
capacity = 3
"#,
    );

    let config = Config::load_from_path(file.path()).unwrap();
    assert_eq!(config.memory.capacity, 3);
    assert_eq!(config.memory.system_prompt, "You are a helpful assistant");
    assert_eq!(config.memory.max_tokens, 512);
    assert_eq!(
        config.models.cache_policy(),
        ModelCachePolicy::Ttl(Duration::from_secs(300))
    );
}

#[test]
fn test_invalid_memory_values_rejected() {
    for body in [
        "[memory]\ncapacity = 0\n",
        "[memory]\nsystem_prompt = \"\"\n",
        "[memory]\nmax_tokens = 0\n",
        "[memory]\nmax_tokens = 2049\n",
    ] {
        let file = write_config(body);
        let result = Config::load_from_path(file.path());
        assert!(
            matches!(result, Err(EngineError::Config(_))),
            "expected config error for {:?}",
            body
        );
    }
}

#[test]
fn test_negative_capacity_is_parse_error() {
    let file = write_config("[memory]\ncapacity = -1\n");
    let err = Config::load_from_path(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_unknown_cache_mode_rejected() {
    let file = write_config("[models]\ncache = \"sometimes\"\n");
    assert!(Config::load_from_path(file.path()).is_err());
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load_from_path(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(EngineError::Config(_))));
}
