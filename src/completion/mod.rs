//! Shell completion for programs with sub-commands
//!
//! Given the line a user is typing and the cursor position, this module works
//! out which command, option or argument the cursor addresses and returns the
//! values that fit there.
//!
//! # Architecture
//!
//! - **Tokenizer**: Splits the line into words, quoted strings and breaks
//! - **Context**: Words of the line and the index of the word under the cursor
//! - **Model**: Commands, options and arguments of the program
//! - **Provider**: Registered values and self-completing commands
//! - **Engine**: Picks the first applicable strategy and filters its values
//! - **Environment**: Reads the context passed by a shell hook
//!
//! # Examples
//!
//! ```
//! use tabcomp::completion::{
//!     Application, CommandContext, CommandSpec, Completion, CompletionHandler, OptionSpec,
//!     ProviderTable,
//! };
//!
//! let app = Application::new()
//!     .with_command(
//!         CommandSpec::new("wave")
//!             .with_option(OptionSpec::flag("jazz-hands").with_shortcut('j'))
//!             .with_argument("target", true),
//!     )
//!     .with_command(CommandSpec::new("walk:north"));
//!
//! let providers = ProviderTable::builder()
//!     .register(Completion::argument("target").with_values(["batman", "robin"]))
//!     .build();
//!
//! let handler = CompletionHandler::new(&app, &providers);
//!
//! let result = handler.run_completion(&CommandContext::at_end("app wa")).unwrap();
//! assert_eq!(result.values(), vec!["wave", "walk:north"]);
//!
//! let result = handler.run_completion(&CommandContext::at_end("app wave r")).unwrap();
//! assert_eq!(result.values(), vec!["robin"]);
//! ```

mod context;
mod engine;
mod environment;
mod filter;
mod model;
mod provider;
mod result;
mod token;

pub use context::CommandContext;
pub use engine::{CompletionHandler, DEFAULT_COMPLETION_COMMAND};
pub use environment::{COMP_LINE, COMP_POINT, COMP_WORDBREAKS, EnvironmentContext};
pub use filter::{PrefixMatcher, filter, filter_pairs};
pub use model::{
    Application, ArgumentSpec, CommandModel, CommandSpec, OptionSpec, ValueArity,
};
pub use provider::{
    Completion, CompletionAware, CompletionCallback, ProviderErrorPolicy, ProviderTable,
    ProviderTableBuilder, Scope, TargetKind, ValueSource,
};
pub use result::{CompletionPair, CompletionResult};
pub use token::{DEFAULT_WORD_BREAKS, Token, TokenKind, Tokenizer, WordBreaks, unquote};
