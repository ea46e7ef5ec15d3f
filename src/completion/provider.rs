//! Completion value providers
//!
//! This module holds the registrations that supply values for option and
//! argument completion, and the [`CompletionAware`] trait a command can
//! implement to complete its own values.
//!
//! Registrations are collected with [`ProviderTable::builder`] and never
//! change afterwards:
//!
//! ```
//! use tabcomp::completion::{Completion, ProviderTable};
//!
//! let providers = ProviderTable::builder()
//!     .register(Completion::argument("target").with_values(["batman", "robin"]))
//!     .register(
//!         Completion::option("style")
//!             .for_command("wave")
//!             .with_values([("fancy", "With flourish"), ("plain", "Just a wave")])
//!             .described(),
//!     )
//!     .build();
//!
//! assert!(providers.lookup(Some("wave"), tabcomp::completion::TargetKind::Option, "style").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::CommandContext;
use super::result::CompletionPair;

/// Callback producing values when completion runs
pub type CompletionCallback =
    Box<dyn Fn(&CommandContext) -> anyhow::Result<Vec<CompletionPair>> + Send + Sync>;

/// Where a registration applies
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every command
    Global,
    /// Only the named command
    Command(String),
}

/// What a registration completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Option,
    Argument,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Option => write!(f, "option"),
            TargetKind::Argument => write!(f, "argument"),
        }
    }
}

/// Values of a registration
pub enum ValueSource {
    /// Fixed list
    Static(Vec<CompletionPair>),
    /// Computed from the command line each time
    Deferred(CompletionCallback),
}

impl ValueSource {
    /// Produce the values for `context`
    pub fn resolve(&self, context: &CommandContext) -> anyhow::Result<Vec<CompletionPair>> {
        match self {
            ValueSource::Static(values) => Ok(values.clone()),
            ValueSource::Deferred(callback) => callback(context),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Static(values) => f.debug_tuple("Static").field(values).finish(),
            ValueSource::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Lookup key of a registration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProviderKey {
    scope: Scope,
    kind: TargetKind,
    target: String,
}

/// A single value registration
#[derive(Debug)]
pub struct Completion {
    scope: Scope,
    kind: TargetKind,
    target: String,
    source: ValueSource,
    descriptive: bool,
}

impl Completion {
    /// Create a registration with an explicit scope and source
    pub fn new(
        scope: Scope,
        kind: TargetKind,
        target: impl Into<String>,
        source: ValueSource,
    ) -> Self {
        Self {
            scope,
            kind,
            target: target.into(),
            source,
            descriptive: false,
        }
    }

    /// Global registration for the values of option `--name`
    pub fn option(name: impl Into<String>) -> Self {
        Self::new(
            Scope::Global,
            TargetKind::Option,
            name,
            ValueSource::Static(Vec::new()),
        )
    }

    /// Global registration for the values of argument `name`
    pub fn argument(name: impl Into<String>) -> Self {
        Self::new(
            Scope::Global,
            TargetKind::Argument,
            name,
            ValueSource::Static(Vec::new()),
        )
    }

    /// Restrict the registration to one command
    pub fn for_command(mut self, command: impl Into<String>) -> Self {
        self.scope = Scope::Command(command.into());
        self
    }

    /// Use a fixed list of values
    pub fn with_values<I, P>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<CompletionPair>,
    {
        self.source = ValueSource::Static(values.into_iter().map(Into::into).collect());
        self
    }

    /// Compute values when completion runs
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CommandContext) -> anyhow::Result<Vec<CompletionPair>> + Send + Sync + 'static,
    {
        self.source = ValueSource::Deferred(Box::new(callback));
        self
    }

    /// Mark values as carrying descriptions for display
    pub fn described(mut self) -> Self {
        self.descriptive = true;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source(&self) -> &ValueSource {
        &self.source
    }

    pub fn is_descriptive(&self) -> bool {
        self.descriptive
    }

    fn key(&self) -> ProviderKey {
        ProviderKey {
            scope: self.scope.clone(),
            kind: self.kind,
            target: self.target.clone(),
        }
    }
}

/// Immutable set of value registrations
#[derive(Debug, Default)]
pub struct ProviderTable {
    entries: HashMap<ProviderKey, Completion>,
}

impl ProviderTable {
    /// Table without registrations
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ProviderTableBuilder {
        ProviderTableBuilder::default()
    }

    /// Find the registration for `target`
    ///
    /// A registration scoped to `command` takes precedence over a global one.
    pub fn lookup(&self, command: Option<&str>, kind: TargetKind, target: &str) -> Option<&Completion> {
        let scoped = command.and_then(|name| {
            self.entries.get(&ProviderKey {
                scope: Scope::Command(name.to_string()),
                kind,
                target: target.to_string(),
            })
        });

        scoped.or_else(|| {
            self.entries.get(&ProviderKey {
                scope: Scope::Global,
                kind,
                target: target.to_string(),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects registrations for a [`ProviderTable`]
#[derive(Debug, Default)]
pub struct ProviderTableBuilder {
    entries: HashMap<ProviderKey, Completion>,
}

impl ProviderTableBuilder {
    /// Add a registration; the first registration of a key is kept
    pub fn register(mut self, completion: Completion) -> Self {
        let key = completion.key();
        if self.entries.contains_key(&key) {
            tracing::warn!(
                scope = ?key.scope,
                kind = %key.kind,
                target = %key.target,
                "duplicate completion registration ignored"
            );
        } else {
            self.entries.insert(key, completion);
        }
        self
    }

    pub fn build(self) -> ProviderTable {
        tracing::debug!(registrations = self.entries.len(), "built provider table");
        ProviderTable {
            entries: self.entries,
        }
    }
}

/// Commands that complete their own option and argument values
///
/// Consulted when no registration matches. Whatever the methods return is
/// used as-is, including an empty list.
pub trait CompletionAware: Send + Sync {
    /// Values for option `--name`
    fn complete_option_values(
        &self,
        name: &str,
        context: &CommandContext,
    ) -> anyhow::Result<Vec<CompletionPair>>;

    /// Values for argument `name`
    fn complete_argument_values(
        &self,
        name: &str,
        context: &CommandContext,
    ) -> anyhow::Result<Vec<CompletionPair>>;
}

/// What to do when a provider fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderErrorPolicy {
    /// Return the error to the caller
    #[default]
    Propagate,
    /// Log it and complete nothing
    Suppress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(completion: &Completion) -> Vec<String> {
        let context = CommandContext::at_end("app wave ");
        completion
            .source()
            .resolve(&context)
            .expect("resolve")
            .into_iter()
            .map(|p| p.value)
            .collect()
    }

    #[test]
    fn test_static_values() {
        let completion = Completion::argument("target").with_values(["batman", "robin"]);

        assert_eq!(completion.kind(), TargetKind::Argument);
        assert_eq!(completion.scope(), &Scope::Global);
        assert_eq!(values(&completion), vec!["batman", "robin"]);
        assert!(!completion.is_descriptive());
    }

    #[test]
    fn test_deferred_values_see_context() {
        let completion = Completion::argument("target").with_callback(|ctx| {
            Ok(vec![CompletionPair::new(format!("{}-words", ctx.words().len()))])
        });

        assert_eq!(values(&completion), vec!["3-words"]);
    }

    #[test]
    fn test_deferred_error_is_returned() {
        let completion =
            Completion::option("style").with_callback(|_| Err(anyhow::anyhow!("backend down")));
        let context = CommandContext::at_end("app wave --style ");

        let err = completion.source().resolve(&context).unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }

    #[test]
    fn test_command_scope_shadows_global() {
        let table = ProviderTable::builder()
            .register(Completion::option("style").with_values(["global"]))
            .register(
                Completion::option("style")
                    .for_command("wave")
                    .with_values(["scoped"]),
            )
            .build();

        let wave = table.lookup(Some("wave"), TargetKind::Option, "style").expect("wave");
        assert_eq!(values(wave), vec!["scoped"]);

        let other = table.lookup(Some("walk:north"), TargetKind::Option, "style").expect("other");
        assert_eq!(values(other), vec!["global"]);

        let none = table.lookup(None, TargetKind::Option, "style").expect("no command");
        assert_eq!(values(none), vec!["global"]);
    }

    #[test]
    fn test_kind_is_part_of_key() {
        let table = ProviderTable::builder()
            .register(Completion::option("target").with_values(["opt"]))
            .build();

        assert!(table.lookup(None, TargetKind::Argument, "target").is_none());
        assert!(table.lookup(None, TargetKind::Option, "target").is_some());
    }

    #[test]
    fn test_first_registration_wins() {
        let table = ProviderTable::builder()
            .register(Completion::argument("target").with_values(["first"]))
            .register(Completion::argument("target").with_values(["second"]))
            .build();

        assert_eq!(table.len(), 1);
        let found = table.lookup(None, TargetKind::Argument, "target").expect("target");
        assert_eq!(values(found), vec!["first"]);
    }

    #[test]
    fn test_empty_table() {
        let table = ProviderTable::empty();
        assert!(table.is_empty());
        assert!(table.lookup(Some("wave"), TargetKind::Argument, "target").is_none());
    }

    #[test]
    fn test_table_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProviderTable>();
    }

    #[test]
    fn test_target_kind_display() {
        assert_eq!(TargetKind::Option.to_string(), "option");
        assert_eq!(TargetKind::Argument.to_string(), "argument");
    }
}
