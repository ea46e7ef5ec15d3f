//! tabcomp - shell tab completion demo
//!
//! A small program with two sub-commands, `wave` and `walk:north`, whose
//! completion is answered by the hidden `_completion` sub-command.
//!
//! # Usage
//!
//! ```bash
//! # Activate completion in the current shell
//! eval "$(tabcomp _completion --generate-hook)"
//!
//! # Then
//! tabcomp wa<TAB>
//! ```

use tabcomp::cli::CliInterface;
use tabcomp::error::Result;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Run the selected subcommand
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.handle_subcommand()
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so stdout carries only completion candidates.
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
