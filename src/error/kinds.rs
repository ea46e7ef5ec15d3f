use std::io;

use thiserror::Error;

use crate::completion::TargetKind;

/// Crate-wide `Result` type using [`CompletionError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Top-level error type for completion requests.
///
/// Declining strategies and empty candidate lists are not errors; only
/// configuration problems and (depending on policy) provider failures end up
/// here.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The invoking shell did not pass the expected context.
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// Configuration file or value problems.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A registered value source or a command's self-completion failed.
    #[error("Completion for {kind} '{target}' failed: {cause:#}")]
    Provider {
        kind: TargetKind,
        target: String,
        cause: anyhow::Error,
    },

    /// No hook or output dialect exists for this shell.
    #[error("Unsupported shell: {0}. Supported shells: bash, zsh, fish")]
    UnsupportedShell(String),

    /// I/O errors while writing candidates or hooks.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while reading completion context from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    /// A required variable is not set.
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),

    /// A variable is set but cannot be interpreted.
    #[error("environment variable {name} has an invalid value '{value}'")]
    InvalidVariable { name: &'static str, value: String },

    /// The shell could not be determined; pass --shell-type.
    #[error("could not determine the shell type ({0}); pass --shell-type")]
    UnknownShell(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but is not valid TOML for this schema.
    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    /// A field holds a value outside its allowed range.
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    /// The configuration could not be rendered back to TOML.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Reading the file failed.
    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
}

impl CompletionError {
    /// Wrap a provider failure with the target it was resolving.
    pub fn provider(kind: TargetKind, target: impl Into<String>, cause: anyhow::Error) -> Self {
        CompletionError::Provider {
            kind,
            target: target.into(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_error_display() {
        let err = CompletionError::from(EnvironmentError::MissingVariable("COMP_LINE"));
        assert_eq!(
            err.to_string(),
            "Environment error: environment variable COMP_LINE is not set"
        );
    }

    #[test]
    fn test_provider_error_display_includes_cause_chain() {
        let cause = anyhow::anyhow!("connection refused").context("listing targets");
        let err = CompletionError::provider(TargetKind::Argument, "target", cause);
        let text = err.to_string();
        assert!(text.starts_with("Completion for argument 'target' failed"));
        assert!(text.contains("listing targets"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "completion.word_breaks".to_string(),
            value: ":".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value ':' for field 'completion.word_breaks'"
        );
    }
}
