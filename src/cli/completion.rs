//! The hidden `_completion` sub-command
//!
//! Without flags it answers a completion request: the context comes from
//! `COMP_LINE` / `COMP_POINT` and candidates are printed for the shell hook.
//! With `--generate-hook` it prints the hook itself.

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use std::io::Write;
use std::path::Path;

use super::CliArgs;
use super::hook::generate_hook;
use super::output::{shell_quote, write_for_shell};
use crate::completion::{
    Application, CommandContext, Completion, CompletionHandler, CompletionPair,
    DEFAULT_COMPLETION_COMMAND, EnvironmentContext, ProviderTable,
};
use crate::config::Config;
use crate::error::{EnvironmentError, Result};

/// Arguments of the `_completion` sub-command
#[derive(Args, Debug, Clone, Default)]
pub struct CompletionArgs {
    /// Print a shell hook that activates completion
    #[arg(short = 'g', long)]
    pub generate_hook: bool,

    /// Program name the hook registers completion for
    #[arg(short = 'p', long, value_name = "NAME")]
    pub program: Option<String>,

    /// Complete whichever program is typed, not only this binary
    #[arg(short = 'm', long)]
    pub multiple: bool,

    /// Shell to generate output for (defaults to $SHELL)
    #[arg(long, value_name = "SHELL")]
    pub shell_type: Option<Shell>,
}

/// Run the completion sub-command
///
/// # Arguments
/// * `args` - Sub-command arguments
/// * `config` - Effective configuration
/// * `config_file` - Configuration file given on the command line, if any
/// * `out` - Where candidates or the hook are written
pub fn run<W: Write>(
    args: &CompletionArgs,
    config: &Config,
    config_file: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let shell = detect_shell(args.shell_type, std::env::var("SHELL").ok().as_deref())?;

    if args.generate_hook {
        let program = program_path();
        let alias = args
            .program
            .clone()
            .unwrap_or_else(|| program_basename(&program));
        let invocation = hook_invocation(config, config_file)?;
        let hook = generate_hook(shell, &program, &alias, &invocation, args.multiple)?;
        out.write_all(hook.as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    let context = EnvironmentContext::from_env(&config.completion)?;
    respond(shell, config, &context, out)
}

/// Answer one completion request for this program's commands
pub fn respond<W: Write>(
    shell: Shell,
    config: &Config,
    context: &CommandContext,
    out: &mut W,
) -> Result<()> {
    // The configured name is only an alias; the tree keeps the default name.
    let model = Application::from_clap(CliArgs::command());
    let providers = providers();
    let handler = CompletionHandler::new(&model, &providers)
        .with_error_policy(config.completion.provider_errors)
        .with_completion_command(DEFAULT_COMPLETION_COMMAND);

    let result = handler.run_completion(context)?;
    tracing::debug!(%shell, candidates = result.len(), "writing completion result");
    write_for_shell(&result, shell, context, out)
}

/// Arguments the hook passes before `--shell-type`
///
/// A configuration file given while generating the hook is passed on, so
/// requests are answered with the same settings.
fn hook_invocation(config: &Config, config_file: Option<&Path>) -> Result<String> {
    let command = config.completion.command_name.as_str();
    match config_file {
        Some(path) => {
            let path = std::path::absolute(path)?;
            Ok(format!("--config {} {command}", shell_quote(&path.display().to_string())))
        }
        None => Ok(command.to_string()),
    }
}

/// Values offered for the demo commands
fn providers() -> ProviderTable {
    ProviderTable::builder()
        .register(
            Completion::argument("target")
                .for_command("wave")
                .with_callback(|_| Ok(super::FRIENDS.iter().copied().map(CompletionPair::from).collect())),
        )
        .register(
            Completion::option("style")
                .for_command("wave")
                .with_values(super::WAVE_STYLES.iter().copied())
                .described(),
        )
        .build()
}

/// Pick the shell from `--shell-type`, falling back to `$SHELL`
fn detect_shell(explicit: Option<Shell>, shell_env: Option<&str>) -> Result<Shell> {
    if let Some(shell) = explicit {
        return Ok(shell);
    }

    let path = shell_env
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EnvironmentError::UnknownShell("SHELL is not set".to_string()))?;

    Shell::from_shell_path(path)
        .ok_or_else(|| EnvironmentError::UnknownShell(format!("unrecognized shell {path}")).into())
}

/// Absolute path of the running program
fn program_path() -> String {
    match std::env::current_exe() {
        Ok(path) => path.display().to_string(),
        Err(err) => {
            tracing::debug!(%err, "current executable unknown, using argv[0]");
            std::env::args().next().unwrap_or_else(|| "tabcomp".to_string())
        }
    }
}

fn program_basename(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}
