//! Shell-specific rendering of completion results

use clap_complete::Shell;
use std::io::Write;

use crate::completion::{CommandContext, CompletionResult};
use crate::error::Result;

/// Write `result` in the form the `shell` hook expects
///
/// # Arguments
/// * `result` - Filtered candidates
/// * `shell` - Shell the hook runs in
/// * `context` - Context the candidates were computed for
/// * `out` - Destination, normally stdout
pub fn write_for_shell<W: Write>(
    result: &CompletionResult,
    shell: Shell,
    context: &CommandContext,
    out: &mut W,
) -> Result<()> {
    match shell {
        Shell::Bash => {
            let quote = context.raw_current_word().chars().next();
            for value in result.values() {
                writeln!(out, "{}", shell_quote(&escape_for_word(value, quote)))?;
            }
        }
        Shell::Zsh if result.descriptive => {
            for pair in &result.candidates {
                let value = pair.value.replace(':', "\\:");
                match &pair.description {
                    Some(description) => writeln!(out, "{value}:{description}")?,
                    None => writeln!(out, "{value}")?,
                }
            }
        }
        Shell::Zsh => {
            for value in result.values() {
                writeln!(out, "{}", value.replace(':', "\\:"))?;
            }
        }
        Shell::Fish if result.descriptive => {
            for pair in &result.candidates {
                match &pair.description {
                    Some(description) => writeln!(out, "{}\t{description}", pair.value)?,
                    None => writeln!(out, "{}", pair.value)?,
                }
            }
        }
        _ => {
            for value in result.values() {
                writeln!(out, "{value}")?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Escape `value` so it can replace a word that opened with `quote`
fn escape_for_word(value: &str, quote: Option<char>) -> String {
    match quote {
        Some('\'') => value.replace('\'', "\\'"),
        Some('"') => value.replace('"', "\\\""),
        _ => {
            let mut escaped = String::with_capacity(value.len());
            for ch in value.chars() {
                if ch.is_whitespace() || matches!(ch, '\'' | '"' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped
        }
    }
}

/// Quote `value` as a single POSIX shell word
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
