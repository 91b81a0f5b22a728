//! Command handlers
//!
//! Each handler takes parsed arguments plus the CLI configuration and
//! returns a `CliResult`; `main` only maps the result to an exit code.

pub mod generate;
pub mod pages;
pub mod validate;

pub use generate::execute_generate;
pub use pages::execute_pages;
pub use validate::execute_validate;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;
use planwright::{GeneratorConfig, TestPlan};
use std::fs;
use std::path::Path;

/// Read a plan file; `.yaml`/`.yml` use the YAML format, anything else Markdown
pub fn read_plan(path: &Path) -> CliResult<TestPlan> {
    let text = fs::read_to_string(path)?;
    let plan = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => TestPlan::from_yaml(&text)?,
        _ => TestPlan::parse(&text)?,
    };
    Ok(plan.with_source(path.display().to_string()))
}

/// Generator configuration from `--config`, or the defaults
pub fn load_generator_config(config: &CliConfig) -> CliResult<GeneratorConfig> {
    let generator = match &config.config_file {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    Ok(generator)
}

/// Reporter honoring color and quiet settings
#[must_use]
pub fn reporter(config: &CliConfig) -> Reporter {
    Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
}
