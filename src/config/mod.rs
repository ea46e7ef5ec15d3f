//! Configuration management for tabcomp
//!
//! This module handles loading, parsing, and validating configuration:
//! - Configuration file (TOML format, `~/.tabcomp/config.toml` by default)
//! - Command-line arguments, applied on top by the CLI
//!
//! A missing file is not an error; defaults are used instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::completion::{DEFAULT_COMPLETION_COMMAND, DEFAULT_WORD_BREAKS, ProviderErrorPolicy};
use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Completion behavior
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion-related configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Characters that separate words outside of quotes
    #[serde(default = "default_word_breaks")]
    pub word_breaks: String,

    /// Take break characters from `COMP_WORDBREAKS` instead
    #[serde(default)]
    pub use_shell_word_breaks: bool,

    /// What to do when a value provider fails
    #[serde(default)]
    pub provider_errors: ProviderErrorPolicy,

    /// Name of the hidden completion sub-command
    #[serde(default = "default_command_name")]
    pub command_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default)]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_word_breaks() -> String {
    DEFAULT_WORD_BREAKS.to_string()
}

fn default_command_name() -> String {
    DEFAULT_COMPLETION_COMMAND.to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            word_breaks: default_word_breaks(),
            use_shell_word_breaks: false,
            provider_errors: ProviderErrorPolicy::default(),
            command_name: default_command_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.tabcomp/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tabcomp")
            .join("config.toml")
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Configuration file; the default path when `None`
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration, or defaults if the file does not exist
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()).into())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let breaks = &self.completion.word_breaks;
        if breaks.is_empty() || breaks.contains(':') || breaks.contains('\\') {
            return Err(ConfigError::InvalidValue {
                field: "completion.word_breaks".to_string(),
                value: breaks.escape_default().to_string(),
            }
            .into());
        }

        let name = &self.completion.command_name;
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "completion.command_name".to_string(),
                value: name.clone(),
            }
            .into());
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.completion.word_breaks, " \t\n=");
        assert_eq!(config.completion.command_name, "_completion");
        assert_eq!(config.completion.provider_errors, ProviderErrorPolicy::Propagate);
        assert!(!config.completion.use_shell_word_breaks);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [completion]
            provider_errors = "suppress"
            "#,
        )
        .unwrap();

        assert_eq!(config.completion.provider_errors, ProviderErrorPolicy::Suppress);
        assert_eq!(config.completion.word_breaks, DEFAULT_WORD_BREAKS);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_format() {
        let err = Config::from_toml("[completion]\nprovider_errors = \"ignore\"").unwrap_err();
        assert!(matches!(err, CompletionError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_validate_rejects_colon_break() {
        let mut config = Config::default();
        config.completion.word_breaks = " :".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("completion.word_breaks"));
    }

    #[test]
    fn test_validate_rejects_empty_breaks() {
        let mut config = Config::default();
        config.completion.word_breaks.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_command_name() {
        let mut config = Config::default();
        config.completion.command_name = "my completion".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[completion]\nuse_shell_word_breaks = true\n\n[logging]\nlevel = \"debug\"\ntimestamps = true"
        )
        .unwrap();

        let config = Config::load_from_file(Some(file.path())).unwrap();
        assert!(config.completion.use_shell_word_breaks);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.timestamps);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.completion.provider_errors = ProviderErrorPolicy::Suppress;
        config.logging.level = LogLevel::Info;

        let text = config.to_toml().unwrap();
        assert!(text.contains("provider_errors = \"suppress\""));
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }
}
