//! Error handling for completion requests.
//!
//! This module provides:
//! - A single crate-wide error type, [`CompletionError`]
//! - Typed environment and configuration errors that callers can inspect
//!   instead of treating them as "no completions"
//!
//! # Example
//!
//! ```rust,no_run
//! use tabcomp::completion::EnvironmentContext;
//! use tabcomp::error::{CompletionError, Result};
//!
//! fn current_line() -> Result<String> {
//!     let context = EnvironmentContext::from_env(&Default::default())?;
//!     Ok(context.command_line().to_string())
//! }
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CompletionError, ConfigError, EnvironmentError, Result};
