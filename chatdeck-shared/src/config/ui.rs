use crate::async_call::CompletionPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

#[cfg(not(target_arch = "wasm32"))]
use std::{env, fs, path::Path};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors raised while loading a [`UiConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration format {0:?}; use 'yaml' or 'json'")]
    UnsupportedFormat(String),
    #[error("invalid {var} value {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Tuning for the sidebar, composer and async call tracking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    /// Characters shown in a sidebar message preview
    pub preview_length: usize,

    /// Longest message the composer will send
    pub max_message_length: usize,

    /// How overlapping async completions are applied
    pub completion_policy: CompletionPolicy,

    /// Logging level
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl UiConfig {
    /// Generates a default configuration.
    pub fn with_defaults() -> Self {
        Self {
            preview_length: 80,
            max_message_length: 4000,
            completion_policy: CompletionPolicy::LastSettled,
            log_level: "info".to_string(),
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// File values win over defaults. `CHATDECK_*` environment variables only
    /// apply to values still at their default.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed, an
    /// environment variable is malformed, or the result fails [`UiConfig::validate`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_config(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::with_defaults();

        if let Some(path) = config_path {
            let content = fs::read_to_string(path)?;
            config = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => serde_yml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                other => {
                    return Err(ConfigError::UnsupportedFormat(
                        other.unwrap_or_default().to_string(),
                    ));
                }
            };
        }

        config.apply_env_overrides()?;
        config.validate().map_err(ConfigError::Invalid)?;
        tracing::debug!(?config, "ui configuration loaded");
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let defaults = Self::with_defaults();

        if self.preview_length == defaults.preview_length {
            if let Some(value) = read_env("CHATDECK_PREVIEW_LENGTH") {
                self.preview_length = parse_env("CHATDECK_PREVIEW_LENGTH", value)?;
            }
        }
        if self.max_message_length == defaults.max_message_length {
            if let Some(value) = read_env("CHATDECK_MAX_MESSAGE_LENGTH") {
                self.max_message_length = parse_env("CHATDECK_MAX_MESSAGE_LENGTH", value)?;
            }
        }
        if self.completion_policy == defaults.completion_policy {
            if let Some(value) = read_env("CHATDECK_COMPLETION_POLICY") {
                self.completion_policy = match value.as_str() {
                    "last_settled" => CompletionPolicy::LastSettled,
                    "latest_started" => CompletionPolicy::LatestStarted,
                    _ => {
                        return Err(ConfigError::InvalidEnv {
                            var: "CHATDECK_COMPLETION_POLICY",
                            value,
                        });
                    }
                };
            }
        }
        if self.log_level == defaults.log_level {
            if let Some(value) = read_env("CHATDECK_LOG_LEVEL") {
                self.log_level = value;
            }
        }
        Ok(())
    }

    /// Validates the configuration, collecting every problem found.
    ///
    /// # Errors
    /// Returns the list of problems when any value is out of range.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.preview_length == 0 {
            errors.push("Invalid preview length. Must be greater than 0.".to_string());
        }
        if self.max_message_length == 0 {
            errors.push("Invalid max message length. Must be greater than 0.".to_string());
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!("Unknown log level: {}", self.log_level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The configured log level as a `tracing` level, defaulting to INFO.
    pub fn tracing_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_env(var: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
