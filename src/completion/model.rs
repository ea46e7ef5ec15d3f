//! Read-only view over a program's commands, options and arguments
//!
//! The completion engine only needs names, shortcuts, value arity and the
//! order of positional arguments. [`CommandModel`] is the seam a host program
//! implements; [`Application`] is a ready-made implementation that can be
//! filled by hand or derived from a `clap::Command` tree.

use std::fmt;

use super::provider::CompletionAware;

/// Whether an option takes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    /// Flag only (`--verbose`)
    None,
    /// Value may follow (`--color[=WHEN]`)
    Optional,
    /// Value must follow (`--style STYLE`)
    Required,
}

/// Definition of a named option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Name without the leading `--`
    pub long_name: String,
    /// Single character used with one dash
    pub shortcut: Option<char>,
    pub arity: ValueArity,
}

impl OptionSpec {
    /// A flag that takes no value
    pub fn flag(long_name: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            shortcut: None,
            arity: ValueArity::None,
        }
    }

    /// An option whose value must follow
    pub fn required(long_name: impl Into<String>) -> Self {
        Self::flag(long_name).with_arity(ValueArity::Required)
    }

    /// An option whose value may follow
    pub fn optional(long_name: impl Into<String>) -> Self {
        Self::flag(long_name).with_arity(ValueArity::Optional)
    }

    pub fn with_shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn with_arity(mut self, arity: ValueArity) -> Self {
        self.arity = arity;
        self
    }

    pub fn accepts_value(&self) -> bool {
        matches!(self.arity, ValueArity::Optional | ValueArity::Required)
    }

    pub fn requires_value(&self) -> bool {
        self.arity == ValueArity::Required
    }

    /// `--name`
    pub fn long_flag(&self) -> String {
        format!("--{}", self.long_name)
    }

    /// `-s`, when a shortcut exists
    pub fn short_flag(&self) -> Option<String> {
        self.shortcut.map(|s| format!("-{s}"))
    }
}

/// Definition of a positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    /// Zero-based order among the command's arguments
    pub position: usize,
    pub required: bool,
}

/// Definition of a sub-command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub options: Vec<OptionSpec>,
    pub arguments: Vec<ArgumentSpec>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            arguments: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Append a positional argument after the existing ones
    pub fn with_argument(mut self, name: impl Into<String>, required: bool) -> Self {
        let position = self.arguments.len();
        self.arguments.push(ArgumentSpec {
            name: name.into(),
            position,
            required,
        });
        self
    }
}

/// Source of command definitions consulted during completion
pub trait CommandModel {
    /// Look up a command by name
    fn find_command(&self, name: &str) -> Option<&CommandSpec>;

    /// Names of every registered command, in registration order
    fn command_names(&self) -> Vec<&str>;

    /// Options accepted by every command
    fn global_options(&self) -> &[OptionSpec];

    /// Self-completion capability of a command, if it has one
    fn completion_aware(&self, _name: &str) -> Option<&dyn CompletionAware> {
        None
    }
}

struct CommandEntry {
    spec: CommandSpec,
    aware: Option<Box<dyn CompletionAware>>,
}

/// In-memory command model
#[derive(Default)]
pub struct Application {
    commands: Vec<CommandEntry>,
    global_options: Vec<OptionSpec>,
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, spec: CommandSpec) -> Self {
        self.add_command(spec);
        self
    }

    pub fn with_global_option(mut self, option: OptionSpec) -> Self {
        self.global_options.push(option);
        self
    }

    /// Attach a self-completion capability to an already registered command
    ///
    /// Unknown command names are ignored.
    pub fn with_completion_aware(
        mut self,
        command: &str,
        aware: impl CompletionAware + 'static,
    ) -> Self {
        match self.commands.iter_mut().find(|e| e.spec.name == command) {
            Some(entry) => entry.aware = Some(Box::new(aware)),
            None => tracing::warn!(command, "cannot attach completion to unknown command"),
        }
        self
    }

    /// Register a command, replacing any command of the same name
    pub fn add_command(&mut self, spec: CommandSpec) {
        match self.commands.iter_mut().find(|e| e.spec.name == spec.name) {
            Some(entry) => entry.spec = spec,
            None => self.commands.push(CommandEntry { spec, aware: None }),
        }
    }

    /// Derive a model from a clap command tree
    ///
    /// Top-level options become global options and every direct sub-command
    /// becomes a command. Option arity follows the argument's action and
    /// `num_args`.
    pub fn from_clap(mut command: clap::Command) -> Self {
        command.build();

        let mut app = Self::new();
        for arg in command.get_arguments().filter(|a| !a.is_positional()) {
            app.global_options.push(option_from_arg(arg));
        }

        for sub in command.get_subcommands() {
            let mut spec = CommandSpec::new(sub.get_name());
            for arg in sub.get_arguments() {
                if arg.is_positional() {
                    spec = spec.with_argument(arg.get_id().as_str(), arg.is_required_set());
                } else {
                    spec = spec.with_option(option_from_arg(arg));
                }
            }
            app.add_command(spec);
        }

        tracing::debug!(
            commands = app.commands.len(),
            global_options = app.global_options.len(),
            "built command model from clap"
        );
        app
    }
}

fn option_from_arg(arg: &clap::Arg) -> OptionSpec {
    let long_name = arg
        .get_long()
        .map(str::to_string)
        .unwrap_or_else(|| arg.get_id().to_string());

    let arity = if !arg.get_action().takes_values() {
        ValueArity::None
    } else if arg.get_num_args().is_some_and(|range| range.min_values() == 0) {
        ValueArity::Optional
    } else {
        ValueArity::Required
    };

    OptionSpec {
        long_name,
        shortcut: arg.get_short(),
        arity,
    }
}

impl CommandModel for Application {
    fn find_command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .find(|e| e.spec.name == name)
            .map(|e| &e.spec)
    }

    fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|e| e.spec.name.as_str()).collect()
    }

    fn global_options(&self) -> &[OptionSpec] {
        &self.global_options
    }

    fn completion_aware(&self, name: &str) -> Option<&dyn CompletionAware> {
        self.commands
            .iter()
            .find(|e| e.spec.name == name)
            .and_then(|e| e.aware.as_deref())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("commands", &self.command_names())
            .field("global_options", &self.global_options)
            .finish()
    }
}
