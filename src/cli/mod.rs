//! Command-line interface for tabcomp
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Dispatch of the demo commands and the hidden `_completion` command

pub mod completion;
pub mod hook;
pub mod output;

use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::completion::DEFAULT_COMPLETION_COMMAND;
use crate::config::{Config, LogLevel};
use crate::error::{ConfigError, Result};

use completion::CompletionArgs;

/// People the `wave` command knows
pub(crate) const FRIENDS: &[&str] = &["batman", "robin", "alfred", "catwoman"];

/// Styles accepted by `wave --style`, with descriptions
pub(crate) const WAVE_STYLES: &[(&str, &str)] = &[
    ("fancy", "With a flourish"),
    ("plain", "A simple wave"),
    ("royal", "Slow, from the wrist"),
];

/// Tab completion for programs with sub-commands
#[derive(Parser, Debug)]
#[command(
    name = "tabcomp",
    version,
    about = "Shell tab completion for sub-command programs",
    long_about = "Resolves shell tab completion for programs with sub-commands, options and
arguments. Activate it with:

    eval \"$(tabcomp _completion --generate-hook)\""
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for tabcomp
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wave at someone
    Wave {
        /// Wave enthusiastically
        #[arg(long)]
        vigorous: bool,

        /// Add jazz hands
        #[arg(short = 'j', long)]
        jazz_hands: bool,

        /// Style of wave
        #[arg(short = 's', long, value_name = "STYLE")]
        style: Option<String>,

        /// Who to wave at
        target: String,
    },

    /// Walk north
    #[command(name = "walk:north")]
    WalkNorth {
        /// Walk with power
        #[arg(short = 'p', long)]
        power: bool,

        /// Deploy jazz hands while walking
        #[arg(short = 'j', long = "deploy:jazz-hands")]
        deploy_jazz_hands: bool,
    },

    /// Answer shell completion requests
    #[command(name = "_completion", hide = true)]
    Completion(CompletionArgs),
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// The configuration is loaded before the full parse because it names
    /// the completion sub-command.
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let argv: Vec<OsString> = std::env::args_os().collect();
        let mut config = Self::load_config(config_file_arg(&argv).as_deref())?;
        let args = Self::parse_args(&config, argv).unwrap_or_else(|err| err.exit());

        Self::apply_logging_args(&mut config, &args);
        Ok(Self { args, config })
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let mut config = Self::load_config(args.config_file.as_deref())?;
        Self::apply_logging_args(&mut config, &args);
        Ok(Self { args, config })
    }

    /// Parse `argv` against the command tree for `config`
    pub fn parse_args<I, T>(config: &Config, argv: I) -> std::result::Result<CliArgs, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command(config).try_get_matches_from(argv)?;
        CliArgs::from_arg_matches(&matches)
    }

    /// Command tree with the configured completion command name as an alias
    pub fn command(config: &Config) -> Command {
        let name = config.completion.command_name.as_str();
        let command = CliArgs::command();
        if name == DEFAULT_COMPLETION_COMMAND {
            return command;
        }
        command.mut_subcommand(DEFAULT_COMPLETION_COMMAND, |sub| sub.alias(name.to_string()))
    }

    /// Load and validate configuration from file
    ///
    /// An invalid configuration file is an error: completion must not
    /// silently fall back to different word breaks.
    fn load_config(path: Option<&Path>) -> Result<Config> {
        let config = Config::load_from_file(path)?;
        config.validate()?;

        let name = &config.completion.command_name;
        let taken = CliArgs::command()
            .find_subcommand(name)
            .is_some_and(|sub| sub.get_name() != DEFAULT_COMPLETION_COMMAND);
        if taken {
            return Err(ConfigError::InvalidValue {
                field: "completion.command_name".to_string(),
                value: name.clone(),
            }
            .into());
        }

        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle the selected subcommand
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn handle_subcommand(&self) -> Result<()> {
        match &self.args.command {
            Commands::Wave {
                vigorous,
                jazz_hands,
                style,
                target,
            } => {
                let line = describe_wave(*vigorous, *jazz_hands, style.as_deref(), target);
                println!("{line}");
                Ok(())
            }
            Commands::WalkNorth {
                power,
                deploy_jazz_hands,
            } => {
                let mut line = String::from("Walking north");
                if *power {
                    line.push_str(" with power");
                }
                if *deploy_jazz_hands {
                    line.push_str(", jazz hands deployed");
                }
                println!("{line}");
                Ok(())
            }
            Commands::Completion(args) => {
                let mut out = io::stdout().lock();
                completion::run(args, &self.config, self.args.config_file.as_deref(), &mut out)
            }
        }
    }
}

/// Config file named on the command line, read before the full parse
fn config_file_arg(argv: &[OsString]) -> Option<PathBuf> {
    CliArgs::command()
        .ignore_errors(true)
        .try_get_matches_from(argv)
        .ok()?
        .get_one::<PathBuf>("config_file")
        .cloned()
}

fn describe_wave(vigorous: bool, jazz_hands: bool, style: Option<&str>, target: &str) -> String {
    let mut line = String::from("Waving");
    if vigorous {
        line.push_str(" vigorously");
    }
    line.push_str(" at ");
    line.push_str(target);
    if let Some(style) = style {
        line.push_str(&format!(" ({style})"));
    }
    if jazz_hands {
        line.push_str(" with jazz hands");
    }
    line
}
