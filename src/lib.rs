//! Shell Tab Completion Library
//!
//! This library resolves shell tab-completion requests for command-line
//! programs built from sub-commands, options and positional arguments. Given
//! the line being typed and the cursor position, it works out what the cursor
//! addresses and which values fit there.
//!
//! # Modules
//!
//! - `cli`: Command-line interface, shell hooks and shell output
//! - `completion`: Tokenizer, cursor context and completion engine
//! - `config`: Configuration management
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```
//! use tabcomp::completion::{Application, CommandContext, CompletionHandler, ProviderTable};
//!
//! let app = Application::from_clap(
//!     clap::Command::new("app")
//!         .subcommand(clap::Command::new("wave"))
//!         .subcommand(clap::Command::new("walk:north")),
//! );
//! let providers = ProviderTable::empty();
//!
//! let handler = CompletionHandler::new(&app, &providers);
//! let result = handler.run_completion(&CommandContext::at_end("app walk")).unwrap();
//! assert_eq!(result.values(), vec!["walk:north"]);
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use completion::{CommandContext, CompletionHandler, CompletionResult};
pub use config::Config;
pub use error::{CompletionError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
