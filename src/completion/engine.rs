//! Completion engine - decides what the cursor addresses
//!
//! [`CompletionHandler`] tries six strategies in a fixed order. The first one
//! that applies commits its candidates, even when the list is empty, and the
//! candidates are then filtered against the word under the cursor.
//!
//! 1. value of a `--long` option left of the cursor
//! 2. a lone `-x` shortcut, completed to itself
//! 3. value of a `-x` shortcut left of the cursor
//! 4. option names, when the word starts with `-`
//! 5. command names
//! 6. value of the positional argument under the cursor
//!
//! Strategies 1 to 4 and 6 need a known command.

use super::context::CommandContext;
use super::filter::filter_pairs;
use super::model::{CommandModel, CommandSpec, OptionSpec};
use super::provider::{ProviderErrorPolicy, ProviderTable, TargetKind};
use super::result::{CompletionPair, CompletionResult};
use crate::error::{CompletionError, Result};

/// Name of the hidden sub-command that answers completion requests
pub const DEFAULT_COMPLETION_COMMAND: &str = "_completion";

/// Resolution strategies, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    OptionValues,
    OptionShortcuts,
    OptionShortcutValues,
    Options,
    CommandNames,
    CommandArguments,
}

impl Strategy {
    const ORDER: [Strategy; 6] = [
        Strategy::OptionValues,
        Strategy::OptionShortcuts,
        Strategy::OptionShortcutValues,
        Strategy::Options,
        Strategy::CommandNames,
        Strategy::CommandArguments,
    ];
}

/// Main completion engine
pub struct CompletionHandler<'a> {
    /// Commands, options and arguments of the program
    model: &'a dyn CommandModel,
    /// Registered value sources
    providers: &'a ProviderTable,
    /// Command hidden from command-name completion
    completion_command: String,
    error_policy: ProviderErrorPolicy,
}

impl<'a> CompletionHandler<'a> {
    /// Create a new completion handler
    ///
    /// # Arguments
    /// * `model` - Command definitions to complete against
    /// * `providers` - Value registrations for options and arguments
    pub fn new(model: &'a dyn CommandModel, providers: &'a ProviderTable) -> Self {
        Self {
            model,
            providers,
            completion_command: DEFAULT_COMPLETION_COMMAND.to_string(),
            error_policy: ProviderErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, policy: ProviderErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Hide a differently named completion command from command listings
    pub fn with_completion_command(mut self, name: impl Into<String>) -> Self {
        self.completion_command = name.into();
        self
    }

    /// Compute the candidates for the word under the cursor
    ///
    /// # Returns
    /// * `Result<CompletionResult>` - Filtered candidates; empty when nothing applies
    pub fn run_completion(&self, context: &CommandContext) -> Result<CompletionResult> {
        let command = self.detect_command(context);
        tracing::debug!(
            words = ?context.words(),
            word_index = context.word_index(),
            command = command.map(|c| c.name.as_str()),
            "running completion"
        );

        for strategy in Strategy::ORDER {
            if let Some(result) = self.apply(strategy, command, context)? {
                let raw = result.len();
                let candidates = filter_pairs(result.candidates, context.current_word());
                tracing::debug!(?strategy, raw, kept = candidates.len(), "strategy committed");
                return Ok(CompletionResult::new(candidates, result.descriptive));
            }
        }

        tracing::debug!("no strategy applied");
        Ok(CompletionResult::default())
    }

    /// Command named by the first non-empty word after the program name
    fn detect_command(&self, context: &CommandContext) -> Option<&'a CommandSpec> {
        context
            .words()
            .iter()
            .skip(1)
            .find(|word| !word.is_empty())
            .and_then(|name| self.model.find_command(name))
    }

    fn apply(
        &self,
        strategy: Strategy,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Result<Option<CompletionResult>> {
        match strategy {
            Strategy::OptionValues => self.complete_option_values(command, context),
            Strategy::OptionShortcuts => Ok(self.complete_option_shortcuts(command, context)),
            Strategy::OptionShortcutValues => {
                self.complete_option_shortcut_values(command, context)
            }
            Strategy::Options => Ok(self.complete_options(command, context)),
            Strategy::CommandNames => Ok(self.complete_command_names(command, context)),
            Strategy::CommandArguments => self.complete_command_arguments(command, context),
        }
    }

    /// Word immediately left of the cursor, when the cursor is past the command
    fn left_word<'c>(&self, context: &'c CommandContext) -> Option<&'c str> {
        let index = context.word_index();
        (index > 1).then(|| context.word_at(index - 1))
    }

    fn complete_option_values(
        &self,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Result<Option<CompletionResult>> {
        if command.is_none() {
            return Ok(None);
        }
        let Some(name) = self.left_word(context).and_then(|w| w.strip_prefix("--")) else {
            return Ok(None);
        };

        match self.find_long(command, name) {
            Some(option) if option.accepts_value() => {
                self.resolve(command, TargetKind::Option, &option.long_name, context)
            }
            _ => Ok(None),
        }
    }

    fn complete_option_shortcuts(
        &self,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Option<CompletionResult> {
        command?;
        let word = context.current_word();
        let shortcut = single_shortcut(word)?;
        self.find_shortcut(command, shortcut)?;
        Some(CompletionResult::from_values([word]))
    }

    fn complete_option_shortcut_values(
        &self,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Result<Option<CompletionResult>> {
        if command.is_none() {
            return Ok(None);
        }
        let Some(shortcut) = self.left_word(context).and_then(single_shortcut) else {
            return Ok(None);
        };

        match self.find_shortcut(command, shortcut) {
            Some(option) if option.accepts_value() => {
                self.resolve(command, TargetKind::Option, &option.long_name, context)
            }
            _ => Ok(None),
        }
    }

    fn complete_options(
        &self,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Option<CompletionResult> {
        if !context.current_word().starts_with('-') {
            return None;
        }
        command?;

        let names = self.all_options(command).into_iter().map(OptionSpec::long_flag);
        Some(CompletionResult::from_values(names))
    }

    fn complete_command_names(
        &self,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Option<CompletionResult> {
        let on_command_word = context.words().len() == 2 && context.word_index() == 1;
        if command.is_some() && !on_command_word {
            return None;
        }

        let names = self
            .model
            .command_names()
            .into_iter()
            .filter(|name| *name != self.completion_command);
        Some(CompletionResult::from_values(names))
    }

    fn complete_command_arguments(
        &self,
        command: Option<&'a CommandSpec>,
        context: &CommandContext,
    ) -> Result<Option<CompletionResult>> {
        if context.current_word().starts_with('-') {
            return Ok(None);
        }
        let Some(spec) = command else {
            return Ok(None);
        };

        let index = context.word_index();
        let argument = self
            .map_arguments_to_words(spec, context)
            .into_iter()
            .find(|(_, word_index)| *word_index == index);

        match argument {
            Some((name, _)) => self.resolve(command, TargetKind::Argument, &name, context),
            None => Ok(None),
        }
    }

    /// Assign the command's positional arguments to word indexes
    ///
    /// Words starting with `-` and words consumed as the value of an option
    /// that requires one are skipped. Words beyond the declared arguments map
    /// to nothing.
    pub fn map_arguments_to_words(
        &self,
        command: &CommandSpec,
        context: &CommandContext,
    ) -> Vec<(String, usize)> {
        let words = context.words();
        let mut arguments = command.arguments.clone();
        arguments.sort_by_key(|a| a.position);

        let mut mapping = Vec::new();
        let mut next = 0;

        for (index, word) in words.iter().enumerate().skip(2) {
            if word.starts_with('-') {
                continue;
            }
            if self.takes_required_value(Some(command), &words[index - 1]) {
                continue;
            }

            if let Some(argument) = arguments.get(next) {
                mapping.push((argument.name.clone(), index));
            }
            next += 1;
        }

        mapping
    }

    /// Whether `word` is an option flag whose value is the next word
    fn takes_required_value(&self, command: Option<&CommandSpec>, word: &str) -> bool {
        let option = if let Some(name) = word.strip_prefix("--") {
            self.find_long(command, name)
        } else {
            single_shortcut(word).and_then(|s| self.find_shortcut(command, s))
        };
        option.is_some_and(OptionSpec::requires_value)
    }

    /// Command options followed by global options not redefined by the command
    fn all_options<'s>(&'s self, command: Option<&'s CommandSpec>) -> Vec<&'s OptionSpec> {
        let mut options: Vec<&OptionSpec> = command.map(|c| c.options.iter().collect()).unwrap_or_default();
        for global in self.model.global_options() {
            if !options.iter().any(|o| o.long_name == global.long_name) {
                options.push(global);
            }
        }
        options
    }

    fn find_long<'s>(&'s self, command: Option<&'s CommandSpec>, name: &str) -> Option<&'s OptionSpec> {
        self.all_options(command)
            .into_iter()
            .find(|o| o.long_name == name)
    }

    fn find_shortcut<'s>(
        &'s self,
        command: Option<&'s CommandSpec>,
        shortcut: char,
    ) -> Option<&'s OptionSpec> {
        self.all_options(command)
            .into_iter()
            .find(|o| o.shortcut == Some(shortcut))
    }

    /// Look up values for a target: registration first, then the command itself
    fn resolve(
        &self,
        command: Option<&'a CommandSpec>,
        kind: TargetKind,
        target: &str,
        context: &CommandContext,
    ) -> Result<Option<CompletionResult>> {
        let command_name = command.map(|c| c.name.as_str());

        if let Some(registration) = self.providers.lookup(command_name, kind, target) {
            tracing::debug!(%kind, target, "using registered values");
            let outcome = registration.source().resolve(context);
            return self
                .commit(outcome, kind, target, registration.is_descriptive())
                .map(Some);
        }

        if let Some(aware) = command_name.and_then(|name| self.model.completion_aware(name)) {
            tracing::debug!(%kind, target, "asking command for values");
            let outcome = match kind {
                TargetKind::Option => aware.complete_option_values(target, context),
                TargetKind::Argument => aware.complete_argument_values(target, context),
            };
            return self.commit(outcome, kind, target, false).map(Some);
        }

        tracing::debug!(%kind, target, "no value source");
        Ok(None)
    }

    /// Turn a value source's outcome into a result
    ///
    /// The result is descriptive when the source was marked so or when any
    /// returned pair has a description.
    fn commit(
        &self,
        outcome: anyhow::Result<Vec<CompletionPair>>,
        kind: TargetKind,
        target: &str,
        described: bool,
    ) -> Result<CompletionResult> {
        match outcome {
            Ok(candidates) => {
                let descriptive = described || candidates.iter().any(|p| p.description.is_some());
                Ok(CompletionResult::new(candidates, descriptive))
            }
            Err(cause) => match self.error_policy {
                ProviderErrorPolicy::Propagate => Err(CompletionError::provider(kind, target, cause)),
                ProviderErrorPolicy::Suppress => {
                    tracing::warn!(%kind, target, error = %format!("{cause:#}"), "completion provider failed");
                    Ok(CompletionResult::default())
                }
            },
        }
    }
}

/// `x` for a word of the form `-x`
fn single_shortcut(word: &str) -> Option<char> {
    let mut chars = word.strip_prefix('-')?.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch != '-' => Some(ch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::completion::model::Application;
    use crate::completion::provider::{Completion, CompletionAware};

    fn app() -> Application {
        Application::new()
            .with_command(
                CommandSpec::new("wave")
                    .with_option(OptionSpec::flag("vigorous"))
                    .with_option(OptionSpec::flag("jazz-hands").with_shortcut('j'))
                    .with_option(OptionSpec::required("style").with_shortcut('s'))
                    .with_argument("target", true),
            )
            .with_command(
                CommandSpec::new("walk:north")
                    .with_option(OptionSpec::flag("power").with_shortcut('p'))
                    .with_option(OptionSpec::flag("deploy:jazz-hands").with_shortcut('j')),
            )
            .with_command(CommandSpec::new(DEFAULT_COMPLETION_COMMAND))
            .with_global_option(OptionSpec::flag("help").with_shortcut('h'))
            .with_global_option(OptionSpec::required("env").with_shortcut('e'))
    }

    fn providers() -> ProviderTable {
        ProviderTable::builder()
            .register(
                Completion::argument("target")
                    .for_command("wave")
                    .with_values(["batman", "robin", "bruce"]),
            )
            .register(
                Completion::option("style")
                    .for_command("wave")
                    .with_values([("fancy", "With flourish"), ("plain", "Just a wave")])
                    .described(),
            )
            .build()
    }

    fn complete_at(line: &str, cursor: usize) -> Vec<String> {
        let app = app();
        let providers = providers();
        let handler = CompletionHandler::new(&app, &providers);
        handler
            .run_completion(&CommandContext::new(line, cursor))
            .expect("completion")
            .candidates
            .into_iter()
            .map(|c| c.value)
            .collect()
    }

    fn complete(line: &str) -> Vec<String> {
        complete_at(line, line.len())
    }

    #[test]
    fn test_command_names_after_program() {
        assert_eq!(complete("app "), vec!["wave", "walk:north"]);
    }

    #[test]
    fn test_command_names_filtered() {
        assert_eq!(complete("app wa"), vec!["wave", "walk:north"]);
        assert_eq!(complete("app walk"), vec!["walk:north"]);
    }

    #[test]
    fn test_complete_command_name_already_typed() {
        assert_eq!(complete("app wave"), vec!["wave"]);
    }

    #[test]
    fn test_completion_command_hidden() {
        assert!(complete("app _").is_empty());
    }

    #[test]
    fn test_custom_completion_command_hidden() {
        let app = app().with_command(CommandSpec::new("__complete"));
        let providers = ProviderTable::empty();
        let handler = CompletionHandler::new(&app, &providers).with_completion_command("__complete");

        let result = handler
            .run_completion(&CommandContext::at_end("app _"))
            .expect("completion");
        assert_eq!(result.values(), vec!["_completion"]);
    }

    #[test]
    fn test_long_option_names() {
        assert_eq!(complete("app wave --jazz"), vec!["--jazz-hands"]);
        assert_eq!(
            complete("app wave --"),
            vec!["--vigorous", "--jazz-hands", "--style", "--help", "--env"]
        );
    }

    #[test]
    fn test_option_name_with_colon() {
        assert!(complete("app walk:north --jazz").is_empty());
        assert_eq!(complete("app walk:north --deploy:jazz"), vec!["--deploy:jazz-hands"]);
    }

    #[test]
    fn test_options_mid_line() {
        let line = "app wave --vigorous --jazz-hands bruce";
        assert_eq!(complete_at(line, 14), vec!["--vigorous"]);
    }

    #[test]
    fn test_shortcut_completes_to_itself() {
        assert_eq!(complete("app wave -j"), vec!["-j"]);
        assert_eq!(complete("app walk:north -p"), vec!["-p"]);
        assert_eq!(complete("app wave -h"), vec!["-h"]);
    }

    #[test]
    fn test_unknown_shortcut_falls_to_option_names() {
        assert!(complete("app wave -x").is_empty());
    }

    #[test]
    fn test_options_need_known_command() {
        assert!(complete("app dance --").is_empty());
    }

    #[test]
    fn test_option_value_by_long_name() {
        assert_eq!(complete("app wave --style "), vec!["fancy", "plain"]);
        assert_eq!(complete("app wave --style fa"), vec!["fancy"]);
    }

    #[test]
    fn test_option_value_after_equals() {
        assert_eq!(complete("app wave --style=pl"), vec!["plain"]);
    }

    #[test]
    fn test_option_value_by_shortcut() {
        assert_eq!(complete("app wave -s "), vec!["fancy", "plain"]);
    }

    #[test]
    fn test_option_values_are_descriptive() {
        let app = app();
        let providers = providers();
        let handler = CompletionHandler::new(&app, &providers);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave --style "))
            .expect("completion");
        assert!(result.descriptive);
        assert_eq!(
            result.candidates[0],
            CompletionPair::described("fancy", "With flourish")
        );
    }

    #[test]
    fn test_argument_values() {
        assert_eq!(complete("app wave "), vec!["batman", "robin", "bruce"]);
        assert_eq!(complete("app wave b"), vec!["batman", "bruce"]);
    }

    #[test]
    fn test_argument_after_flag() {
        assert_eq!(complete("app wave --vigorous r"), vec!["robin"]);
    }

    #[test]
    fn test_argument_after_option_value() {
        assert_eq!(complete("app wave --style fancy "), vec!["batman", "robin", "bruce"]);
        assert_eq!(complete("app wave -e prod b"), vec!["batman", "bruce"]);
    }

    #[test]
    fn test_extra_words_have_no_argument() {
        assert!(complete("app wave batman ").is_empty());
    }

    #[test]
    fn test_option_without_value_source_declines() {
        assert!(complete("app wave --env ").is_empty());
    }

    #[test]
    fn test_map_arguments_to_words() {
        let app = app();
        let providers = ProviderTable::empty();
        let handler = CompletionHandler::new(&app, &providers);
        let spec = app.find_command("wave").expect("wave");

        let context = CommandContext::at_end("app wave --style fancy actual-target extra");
        assert_eq!(
            handler.map_arguments_to_words(spec, &context),
            vec![("target".to_string(), 4)]
        );

        let context = CommandContext::at_end("app wave --vigorous ");
        assert_eq!(
            handler.map_arguments_to_words(spec, &context),
            vec![("target".to_string(), 3)]
        );
    }

    struct SelfCompleting {
        calls: Arc<AtomicUsize>,
    }

    impl CompletionAware for SelfCompleting {
        fn complete_option_values(
            &self,
            name: &str,
            _context: &CommandContext,
        ) -> anyhow::Result<Vec<CompletionPair>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![CompletionPair::new(format!("{name}-value"))])
        }

        fn complete_argument_values(
            &self,
            name: &str,
            context: &CommandContext,
        ) -> anyhow::Result<Vec<CompletionPair>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                CompletionPair::new(format!("{name}-{}", context.word_index())),
                CompletionPair::described("zed", "last"),
            ])
        }
    }

    #[test]
    fn test_completion_aware_command() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app().with_completion_aware(
            "wave",
            SelfCompleting {
                calls: Arc::clone(&calls),
            },
        );
        let providers = ProviderTable::empty();
        let handler = CompletionHandler::new(&app, &providers);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave "))
            .expect("completion");
        assert_eq!(result.values(), vec!["target-2", "zed"]);
        assert!(result.descriptive);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave --env "))
            .expect("completion");
        assert_eq!(result.values(), vec!["env-value"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_registration_preferred_over_completion_aware() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app().with_completion_aware(
            "wave",
            SelfCompleting {
                calls: Arc::clone(&calls),
            },
        );
        let providers = providers();
        let handler = CompletionHandler::new(&app, &providers);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave r"))
            .expect("completion");
        assert_eq!(result.values(), vec!["robin"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_deferred_values() {
        let app = app();
        let providers = ProviderTable::builder()
            .register(Completion::argument("target").with_callback(|ctx| {
                Ok(vec![CompletionPair::new(format!("{}x", ctx.current_word()))])
            }))
            .build();
        let handler = CompletionHandler::new(&app, &providers);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave ab"))
            .expect("completion");
        assert_eq!(result.values(), vec!["abx"]);
    }

    #[test]
    fn test_deferred_described_pairs_are_descriptive() {
        let app = app();
        let providers = ProviderTable::builder()
            .register(
                Completion::argument("target")
                    .for_command("wave")
                    .with_callback(|_| Ok(vec![CompletionPair::described("robin", "Sidekick")])),
            )
            .build();
        let handler = CompletionHandler::new(&app, &providers);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave r"))
            .expect("completion");
        assert!(result.descriptive);
        assert_eq!(result.candidates, vec![CompletionPair::described("robin", "Sidekick")]);
    }

    #[test]
    fn test_plain_deferred_values_are_not_descriptive() {
        let app = app();
        let providers = ProviderTable::builder()
            .register(
                Completion::argument("target")
                    .with_callback(|_| Ok(vec![CompletionPair::new("robin")])),
            )
            .build();
        let handler = CompletionHandler::new(&app, &providers);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave "))
            .expect("completion");
        assert!(!result.descriptive);
    }

    #[test]
    fn test_option_strategies_need_known_command() {
        assert!(complete("app -h").is_empty());
        assert!(complete("app dance -h").is_empty());

        let app = app();
        let providers = ProviderTable::builder()
            .register(Completion::option("env").with_values(["prod", "staging"]))
            .build();
        let handler = CompletionHandler::new(&app, &providers);

        for line in ["app --env ", "app -e "] {
            let result = handler
                .run_completion(&CommandContext::at_end(line))
                .expect("completion");
            assert_eq!(result.values(), vec!["wave", "walk:north"]);
        }

        let result = handler
            .run_completion(&CommandContext::at_end("app wave -e "))
            .expect("completion");
        assert_eq!(result.values(), vec!["prod", "staging"]);
    }

    fn failing_providers() -> ProviderTable {
        ProviderTable::builder()
            .register(
                Completion::argument("target")
                    .with_callback(|_| Err(anyhow::anyhow!("directory unavailable"))),
            )
            .build()
    }

    #[test]
    fn test_provider_error_propagates_by_default() {
        let app = app();
        let providers = failing_providers();
        let handler = CompletionHandler::new(&app, &providers);

        let err = handler
            .run_completion(&CommandContext::at_end("app wave "))
            .unwrap_err();
        match err {
            CompletionError::Provider { kind, target, .. } => {
                assert_eq!(kind, TargetKind::Argument);
                assert_eq!(target, "target");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_provider_error_suppressed() {
        let app = app();
        let providers = failing_providers();
        let handler =
            CompletionHandler::new(&app, &providers).with_error_policy(ProviderErrorPolicy::Suppress);

        let result = handler
            .run_completion(&CommandContext::at_end("app wave "))
            .expect("suppressed");
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_shortcut() {
        assert_eq!(single_shortcut("-j"), Some('j'));
        assert_eq!(single_shortcut("--"), None);
        assert_eq!(single_shortcut("-jk"), None);
        assert_eq!(single_shortcut("-"), None);
        assert_eq!(single_shortcut("j"), None);
    }
}
