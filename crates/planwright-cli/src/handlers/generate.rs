//! Generate command handler

use super::{load_generator_config, read_plan, reporter};
use crate::commands::GenerateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use planwright::{FsWorkspace, GenerationReport, Generator, MockEngine, ScenarioSelector};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Execute the generate command
pub fn execute_generate(config: &CliConfig, args: &GenerateArgs) -> CliResult<()> {
    if !args.offline {
        return Err(CliError::invalid_argument(
            "no live browser engine is available in this build; pass --offline to synthesize with the offline engine",
        ));
    }

    let mut generator_config = load_generator_config(config)?;
    if let Some(jobs) = args.jobs {
        generator_config = generator_config.with_parallel_jobs(jobs);
    }
    if args.overwrite {
        generator_config = generator_config.with_overwrite_tests(true);
    }

    let plan = read_plan(&args.plan)?;
    let selector = ScenarioSelector::parse(&args.scenario);
    let workspace = Arc::new(FsWorkspace::from_config(&args.root, &generator_config));
    info!(root = %args.root.display(), plan = %args.plan.display(), "generating");

    let generator = Generator::new(generator_config, workspace, MockEngine::permissive)?;
    let report = generator.generate_plan(&plan, &selector)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else {
        print_report(config, &report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failure_count(),
            total: report.outcomes.len(),
        })
    }
}

fn print_report(config: &CliConfig, report: &GenerationReport) {
    let out = reporter(config);
    out.header("Generation");
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(file) => {
                out.success(&format!("{} -> {}", outcome.label(), file.file_name));
                if config.verbosity.is_verbose() && !file.extended.is_empty() {
                    out.info(&format!("  extended {}", file.extended.join(", ")));
                }
            }
            Err(e) => out.failure(&format!("{}: {e}", outcome.label())),
        }
    }
    out.summary("generated", report.succeeded().count(), report.failure_count());
}

/// One JSON object per scenario, in plan order
#[must_use]
pub fn report_json(report: &GenerationReport) -> Value {
    let scenarios: Vec<Value> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(file) => json!({
                "group": outcome.group,
                "scenario": outcome.scenario,
                "status": "generated",
                "file": file.file_name,
                "imports": file.imports,
                "extended": file.extended,
                "actions": file.log.len(),
            }),
            Err(e) => json!({
                "group": outcome.group,
                "scenario": outcome.scenario,
                "status": "failed",
                "error": e.to_string(),
            }),
        })
        .collect();
    json!({
        "succeeded": report.succeeded().count(),
        "failed": report.failure_count(),
        "scenarios": scenarios,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(dir: &TempDir, plan: &str) -> GenerateArgs {
        let path = dir.path().join("plan.md");
        fs::write(&path, plan).unwrap();
        GenerateArgs {
            plan: path,
            scenario: "*".to_string(),
            root: dir.path().to_path_buf(),
            offline: true,
            jobs: None,
            overwrite: false,
            json: true,
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet)
    }

    #[test]
    fn test_offline_generation_writes_files() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "## Search\n### Find shoes\n1. Fill \"shoes\" in the search field\n2. Click the search button\n");
        execute_generate(&quiet(), &args).unwrap();
        assert!(dir.path().join("tests/find-shoes.spec.ts").is_file());
        assert!(dir.path().join("pages/HomePage.ts").is_file());
    }

    #[test]
    fn test_live_engine_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir, "## G\n### S\n1. Click save\n");
        args.offline = false;
        let err = execute_generate(&quiet(), &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
        assert!(!dir.path().join("tests").exists());
    }

    #[test]
    fn test_failed_scenario_is_error() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "## Home\n### Greeting\n1. Wave at the logo\n");
        let err = execute_generate(&quiet(), &args).unwrap_err();
        assert!(matches!(err, CliError::ScenariosFailed { failed: 1, total: 1 }));
    }

    #[test]
    fn test_missing_plan() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir, "");
        args.plan = PathBuf::from("/nonexistent/plan.md");
        assert!(matches!(execute_generate(&quiet(), &args), Err(CliError::Io(_))));
    }

    #[test]
    fn test_report_json_shape() {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(FsWorkspace::new(dir.path()));
        let gen = Generator::new(
            planwright::GeneratorConfig::default().with_retry_backoff_ms(0),
            ws,
            MockEngine::permissive,
        )
        .unwrap();
        let plan = planwright::TestPlan::parse("## A\n### Ok\n1. Click the save button\n### Bad\n1. Wave\n").unwrap();
        let report = gen.generate_plan(&plan, &ScenarioSelector::All).unwrap();

        let value = report_json(&report);
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["scenarios"][0]["file"], "ok.spec.ts");
        assert_eq!(value["scenarios"][1]["status"], "failed");
    }
}
