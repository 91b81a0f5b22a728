//! Validate command handler

use super::{load_generator_config, read_plan, reporter};
use crate::commands::ValidateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use planwright::{pipeline::validate_plan, ScenarioPlan, ScenarioSelector};

/// Execute the validate command
pub fn execute_validate(config: &CliConfig, args: &ValidateArgs) -> CliResult<()> {
    let generator_config = load_generator_config(config)?;
    let plan = read_plan(&args.plan)?;
    let report = validate_plan(&plan, &ScenarioSelector::parse(&args.scenario), &generator_config)?;

    let out = reporter(config);
    out.header("Validation");
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(planned) => out.success(&format!("{}: {}", outcome.label(), describe(planned))),
            Err(e) => out.failure(&format!("{}: {e}", outcome.label())),
        }
    }
    out.summary("planned", report.succeeded().count(), report.failure_count());

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failure_count(),
            total: report.outcomes.len(),
        })
    }
}

/// `3 steps, 5 calls on LoginPage, DashboardPage`
#[must_use]
pub fn describe(planned: &ScenarioPlan) -> String {
    let pages = if planned.pages.is_empty() {
        planned.setup.page.clone()
    } else {
        planned.pages.join(", ")
    };
    format!(
        "{} steps, {} calls on {pages}",
        planned.steps.len(),
        planned.call_count()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn validate(plan: &str, scenario: &str) -> CliResult<()> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.md");
        fs::write(&path, plan).unwrap();
        let args = ValidateArgs {
            plan: path,
            scenario: scenario.to_string(),
        };
        let result = execute_validate(&CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet), &args);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        result
    }

    #[test]
    fn test_valid_plan() {
        validate("## G\n### S\n1. Go to the cart page\n2. Click the checkout button\n", "*").unwrap();
    }

    #[test]
    fn test_ambiguous_step_fails() {
        let err = validate("## G\n### S\n1. Wave at the logo\n", "*").unwrap_err();
        assert!(matches!(err, CliError::ScenariosFailed { failed: 1, total: 1 }));
    }

    #[test]
    fn test_unknown_selector() {
        let err = validate("## G\n### S\n1. Click save\n", "G/Nope").unwrap_err();
        assert!(matches!(
            err,
            CliError::Planwright(planwright::PlanwrightError::ScenarioNotFound { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let plan = planwright::TestPlan::parse("## G\n### S\n1. Go to the cart page\n2. Click the checkout button\n").unwrap();
        let report = validate_plan(&plan, &ScenarioSelector::All, &planwright::GeneratorConfig::default()).unwrap();
        let planned = report.succeeded().next().unwrap();
        assert_eq!(describe(planned), "2 steps, 2 calls on CartPage");
    }
}
