//! Configuration settings for the Sundial calendar assistant.

use crate::error::{ConfigError, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        // Try standard config locations
        let config_paths = [
            // Current directory
            PathBuf::from("sundial.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("sundial/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".sundial/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Ok(Self::from_file(path)?.with_env_overrides());
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default().with_env_overrides())
    }

    /// Apply environment variable overrides on top of the loaded values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("GOOGLE_API_CREDENTIALS_PATH") {
            if !path.is_empty() {
                self.calendar.credentials_path = Some(path);
            }
        }
        if let Ok(id) = std::env::var("CALENDAR_ID") {
            if !id.is_empty() {
                self.calendar.calendar_id = id;
            }
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            if !url.is_empty() {
                self.llm.base_url = url;
            }
        }
        self
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        // Validate calendar config
        if self.calendar.calendar_id.is_empty() {
            return Err(ConfigError::MissingField("calendar.calendar_id".to_string()).into());
        }
        if self
            .calendar
            .default_offset
            .parse::<FixedOffset>()
            .is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "calendar.default_offset must be a UTC offset like +02:00, got {:?}",
                self.calendar.default_offset
            ))
            .into());
        }

        // Validate llm config
        if self.llm.base_url.is_empty() {
            return Err(ConfigError::MissingField("llm.base_url".to_string()).into());
        }
        if self.llm.model.is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()).into());
        }

        Ok(())
    }

    /// Expand the credentials path, if one is configured.
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.calendar
            .credentials_path
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }

    /// Parse the configured default UTC offset.
    pub fn default_offset(&self) -> Result<FixedOffset> {
        self.calendar
            .default_offset
            .parse::<FixedOffset>()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "calendar.default_offset {:?}: {}",
                    self.calendar.default_offset, e
                ))
                .into()
            })
    }
}

/// Calendar backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Path to the Google service account key file (unset = backend unavailable)
    pub credentials_path: Option<String>,
    /// Calendar to operate on
    pub calendar_id: String,
    /// UTC offset assumed for timestamps that carry none, e.g. "+02:00"
    pub default_offset: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            calendar_id: "primary".to_string(),
            default_offset: "+00:00".to_string(),
        }
    }
}

/// Reasoning engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible chat endpoint
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "qwen3:8b".to_string(),
            timeout_secs: 120,
        }
    }
}
