//! Planwright CLI library
//!
//! Command-line front end for the Planwright generator: argument parsing,
//! configuration, log setup and the `generate`, `validate` and `pages`
//! handlers.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, GenerateArgs, PagesArgs, ValidateArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_page, Reporter};

/// Build the CLI configuration from parsed global flags
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_json_logs(cli.log_json)
        .with_config_file(cli.config.clone())
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> CliResult<()> {
    let config = build_config(&cli);
    logging::init(&config);
    match cli.command {
        Commands::Generate(args) => handlers::execute_generate(&config, &args),
        Commands::Validate(args) => handlers::execute_validate(&config, &args),
        Commands::Pages(args) => handlers::execute_pages(&config, &args),
    }
}
