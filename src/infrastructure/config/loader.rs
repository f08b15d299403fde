use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".valueslens";

/// Upper bound on the generation wait, retries included.
const MAX_TIMEOUT_SECS: u64 = 120;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid selection_size: {0}. Must be at least 1")]
    InvalidSelectionSize(usize),

    #[error("Invalid top_count: {top_count}. Must be between 1 and selection_size ({selection_size})")]
    InvalidTopCount { top_count: usize, selection_size: usize },

    #[error("Invalid story bounds: min_story_words ({0}) must not exceed max_story_words ({1})")]
    InvalidStoryBounds(usize, usize),

    #[error("Invalid timeout_secs: {0}. Must be between 1 and {MAX_TIMEOUT_SECS}")]
    InvalidTimeout(u64),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("{0} cannot be empty")]
    EmptyPath(&'static str),

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration relative to the current directory.
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `<root>/.valueslens/config.yaml`
    /// 3. `<root>/.valueslens/local.yaml` (optional overrides)
    /// 4. Environment variables (`VALUESLENS_*`, `__` for nesting)
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("VALUESLENS_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let assessment = &config.assessment;
        if assessment.selection_size == 0 {
            return Err(ConfigError::InvalidSelectionSize(assessment.selection_size));
        }
        if assessment.top_count == 0 || assessment.top_count > assessment.selection_size {
            return Err(ConfigError::InvalidTopCount {
                top_count: assessment.top_count,
                selection_size: assessment.selection_size,
            });
        }
        if assessment.min_story_words > assessment.max_story_words {
            return Err(ConfigError::InvalidStoryBounds(
                assessment.min_story_words,
                assessment.max_story_words,
            ));
        }
        if assessment.catalog_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyPath("assessment.catalog_path"));
        }

        let generation = &config.generation;
        if !(1..=MAX_TIMEOUT_SECS).contains(&generation.timeout_secs) {
            return Err(ConfigError::InvalidTimeout(generation.timeout_secs));
        }
        if generation.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(generation.max_tokens));
        }

        if config.storage.state_dir.trim().is_empty() {
            return Err(ConfigError::EmptyPath("storage.state_dir"));
        }
        if config.storage.database_path.trim().is_empty() {
            return Err(ConfigError::EmptyPath("storage.database_path"));
        }
        if config.storage.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.storage.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}
