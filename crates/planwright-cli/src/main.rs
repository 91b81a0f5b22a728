//! Planwright CLI: generate Playwright tests from test plans
//!
//! ## Usage
//!
//! ```bash
//! planwright validate plans/shop.md                       # Check every step maps to an action
//! planwright generate plans/shop.md --offline             # Write pages/ and tests/
//! planwright generate plans/shop.md -s "Authentication/*" --offline -j 4
//! planwright pages LoginPage                              # Show one page object
//! ```

use clap::Parser;
use planwright_cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    match planwright_cli::run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
