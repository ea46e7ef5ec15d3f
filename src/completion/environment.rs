//! Completion context taken from the invoking shell
//!
//! Shell hooks pass the line being edited in `COMP_LINE` and the cursor in
//! `COMP_POINT`. Bash also exports the characters it splits words on in
//! `COMP_WORDBREAKS`.

use super::context::CommandContext;
use super::token::WordBreaks;
use crate::config::CompletionConfig;
use crate::error::EnvironmentError;

pub const COMP_LINE: &str = "COMP_LINE";
pub const COMP_POINT: &str = "COMP_POINT";
pub const COMP_WORDBREAKS: &str = "COMP_WORDBREAKS";

/// Builds a [`CommandContext`] from shell-provided variables
pub struct EnvironmentContext;

impl EnvironmentContext {
    /// Read the context from the process environment
    pub fn from_env(config: &CompletionConfig) -> Result<CommandContext, EnvironmentError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read the context through `lookup`, which returns a variable's value
    ///
    /// `COMP_LINE` must be set. `COMP_POINT` counts characters, as every
    /// supported shell reports it, and defaults to the end of the line.
    /// `COMP_WORDBREAKS` is only consulted when the configuration asks for the
    /// shell's break characters; `:` is always removed from it so that names
    /// like `walk:north` stay one word.
    pub fn from_lookup<F>(config: &CompletionConfig, lookup: F) -> Result<CommandContext, EnvironmentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let line = lookup(COMP_LINE).ok_or(EnvironmentError::MissingVariable(COMP_LINE))?;

        let cursor = match lookup(COMP_POINT) {
            Some(value) => {
                let chars = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| EnvironmentError::InvalidVariable {
                        name: COMP_POINT,
                        value,
                    })?;
                byte_offset(&line, chars)
            }
            None => line.len(),
        };

        let word_breaks = if config.use_shell_word_breaks {
            let breaks = lookup(COMP_WORDBREAKS)
                .ok_or(EnvironmentError::MissingVariable(COMP_WORDBREAKS))?;
            WordBreaks::new(&breaks).without(&[':'])
        } else {
            WordBreaks::new(&config.word_breaks)
        };

        tracing::debug!(line = %line, cursor, word_breaks = %word_breaks, "read completion environment");

        Ok(CommandContext::new(line, cursor).with_word_breaks(word_breaks))
    }
}

/// Byte offset of the `chars`-th character of `line`, or its length
fn byte_offset(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map_or(line.len(), |(offset, _)| offset)
}
