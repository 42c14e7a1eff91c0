use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles loading, validating and saving the JSON configuration:
/// language pair, database location, matching options and remote provider access.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Database file; the platform data directory is used when unset
    #[serde(default)]
    pub database_path: Option<String>,

    /// Term matching options
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Remote glossary provider access
    #[serde(default)]
    pub deepl: DeepLConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Term matching options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Only match terms delimited by non-word characters
    #[serde(default = "default_true")]
    pub whole_word_only: bool,

    /// Token budget of the glossary block in a translation prompt
    #[serde(default = "default_prompt_token_budget")]
    pub prompt_token_budget: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            whole_word_only: true,
            prompt_token_budget: default_prompt_token_budget(),
        }
    }
}

/// DeepL glossary API configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeepLConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL; derived from the key when empty
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DeepLConfig {
    /// Whether the key belongs to a free-tier account
    pub fn is_free_tier(&self) -> bool {
        self.api_key.trim_end().ends_with(":fx")
    }

    /// Get the endpoint, falling back to the API host matching the key
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        if self.is_free_tier() {
            default_deepl_free_endpoint()
        } else {
            default_deepl_pro_endpoint()
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_prompt_token_budget() -> usize {
    2000
}

fn default_true() -> bool {
    true
}

fn default_deepl_free_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_deepl_pro_endpoint() -> String {
    "https://api.deepl.com".to_string()
}

impl Config {
    /// Load a configuration file, writing the default one when it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.matching.prompt_token_budget == 0 {
            return Err(anyhow!("Prompt token budget must be greater than zero"));
        }

        if self.deepl.timeout_secs == 0 {
            return Err(anyhow!("DeepL timeout must be greater than zero"));
        }

        let endpoint = self.deepl.get_endpoint();
        let url = Url::parse(&endpoint)
            .with_context(|| format!("Invalid DeepL endpoint URL: {}", endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("DeepL endpoint must use http or https: {}", endpoint));
        }

        Ok(())
    }

    /// Database file location
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => crate::database::connection::DatabaseConnection::default_database_path(),
        }
    }

    /// Whether remote glossary sync can be attempted
    pub fn has_deepl_credentials(&self) -> bool {
        !self.deepl.api_key.trim().is_empty()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            database_path: None,
            matching: MatchingConfig::default(),
            deepl: DeepLConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
