use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".hyperexplainer";

/// Prefix for environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "HYPEREXPLAINER_";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid port: 0")]
    InvalidPort,

    #[error("Gemini model name cannot be empty")]
    EmptyModel,

    #[error("Gemini base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid top_p: {0}. Must be in (0.0, 1.0]")]
    InvalidTopP(f32),

    #[error("Invalid top_k: 0. Must be at least 1")]
    InvalidTopK,

    #[error("Invalid max_concurrent_calls: 0. Must be at least 1")]
    InvalidConcurrency,

    #[error("Invalid call_timeout_secs: 0. Must be at least 1")]
    InvalidCallTimeout,

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .hyperexplainer/config.yaml
    /// 3. .hyperexplainer/local.yaml (optional developer overrides)
    /// 4. Environment variables (HYPEREXPLAINER_* prefix)
    pub fn load() -> Result<Config> {
        let dir = Path::new(CONFIG_DIR);
        let config: Config = Self::figment()
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, with environment overrides on top
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Self::figment()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let gemini = &config.gemini;
        if gemini.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if gemini.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if gemini.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidCallTimeout);
        }

        let sampling = &gemini.sampling;
        if !(0.0..=2.0).contains(&sampling.temperature) {
            return Err(ConfigError::InvalidTemperature(sampling.temperature));
        }
        if !(sampling.top_p > 0.0 && sampling.top_p <= 1.0) {
            return Err(ConfigError::InvalidTopP(sampling.top_p));
        }
        if sampling.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }

        if config.explanation.max_concurrent_calls == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
