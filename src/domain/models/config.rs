use serde::{Deserialize, Serialize};

/// Main configuration structure for ValuesLens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Assessment rules (selection sizes, story limits, catalog)
    #[serde(default)]
    pub assessment: AssessmentConfig,

    /// Definition generation collaborator
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Local state and durable store locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Assessment rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssessmentConfig {
    /// How many very-important values the user selects
    #[serde(default = "default_selection_size")]
    pub selection_size: usize,

    /// How many ranked values get stories, commitments and definitions
    #[serde(default = "default_top_count")]
    pub top_count: usize,

    /// Minimum words before the story phase can be left
    #[serde(default = "default_min_story_words")]
    pub min_story_words: usize,

    /// Maximum words before the story phase can be left
    #[serde(default = "default_max_story_words")]
    pub max_story_words: usize,

    /// Optional YAML catalog replacing the built-in deck
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
}

const fn default_selection_size() -> usize {
    5
}

const fn default_top_count() -> usize {
    3
}

const fn default_min_story_words() -> usize {
    20
}

const fn default_max_story_words() -> usize {
    600
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            selection_size: default_selection_size(),
            top_count: default_top_count(),
            min_story_words: default_min_story_words(),
            max_story_words: default_max_story_words(),
            catalog_path: None,
        }
    }
}

/// Definition generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Use the Anthropic API when a key is available
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (can also be set via ANTHROPIC_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for API (for testing/proxies)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Hard upper bound on one generation, retries included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Retries for transient API failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

const fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_tokens() -> u32 {
    2048
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Directory holding the client-local session blob
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Path to `SQLite` database file for sessions and share artifacts
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_state_dir() -> String {
    ".valueslens/state".to_string()
}

fn default_database_path() -> String {
    ".valueslens/valueslens.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            database_path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Rotation policy for file logs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log rotation policy for file output
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "warn".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

impl GenerationConfig {
    /// Get API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}
