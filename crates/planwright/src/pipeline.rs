//! Generation pipeline: plan in, page objects and test files out.
//!
//! For every selected scenario the [`Generator`]
//!
//! 1. plans all steps (ambiguous intents fail here, before any browser call),
//! 2. resolves the touched pages and binds planned locators to the library,
//! 3. runs the plan on a fresh engine from the [`EngineFactory`],
//! 4. inside a locked library transaction derives and stages the page
//!    extensions, synthesizes the test file and checks its name,
//! 5. commits the pages and writes the test file, rolling the pages back if
//!    the test file cannot be written.
//!
//! Scenario failures are collected in the [`GenerationReport`]; only a plan
//! that cannot be parsed or selected fails the whole call.

use crate::adapter::SessionAdapter;
use crate::config::GeneratorConfig;
use crate::driver::AutomationEngine;
use crate::executor::{CancellationToken, ScenarioExecutor};
use crate::intent::IntentClassifier;
use crate::library::ObjectLibrary;
use crate::plan::{ScenarioRef, ScenarioSelector, TestPlan};
use crate::planner::{ScenarioPlan, StepPlanner};
use crate::result::{PlanwrightError, PlanwrightResult};
use crate::synth::{derive_extensions, extended_methods, test_file_name, GeneratedTestFile, TestSynthesizer};
use crate::workspace::Workspace;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Creates one automation engine per scenario
pub trait EngineFactory: Send + Sync {
    /// Engine type
    type Engine: AutomationEngine;

    /// Open a new engine session
    fn create(&self) -> PlanwrightResult<Self::Engine>;
}

impl<E, F> EngineFactory for F
where
    E: AutomationEngine,
    F: Fn() -> E + Send + Sync,
{
    type Engine = E;

    fn create(&self) -> PlanwrightResult<E> {
        Ok(self())
    }
}

/// Result for one scenario
#[derive(Debug)]
pub struct ScenarioOutcome<T = GeneratedTestFile> {
    /// Group name
    pub group: String,
    /// Scenario name
    pub scenario: String,
    /// What happened
    pub result: PlanwrightResult<T>,
}

impl<T> ScenarioOutcome<T> {
    fn new(scenario: &ScenarioRef<'_>, result: PlanwrightResult<T>) -> Self {
        Self {
            group: scenario.group.name().to_string(),
            scenario: scenario.scenario.name().to_string(),
            result,
        }
    }

    /// `Group/Scenario`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.group, self.scenario)
    }
}

/// Per-scenario results of one run, in plan order
#[derive(Debug)]
pub struct GenerationReport<T = GeneratedTestFile> {
    /// One entry per selected scenario
    pub outcomes: Vec<ScenarioOutcome<T>>,
}

impl<T> GenerationReport<T> {
    /// Successful results
    pub fn succeeded(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed scenarios with their errors
    pub fn failed(&self) -> impl Iterator<Item = (&ScenarioOutcome<T>, &PlanwrightError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    /// Check that every scenario succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Plan every selected scenario without running anything
pub fn validate_plan(
    plan: &TestPlan,
    selector: &ScenarioSelector,
    config: &GeneratorConfig,
) -> PlanwrightResult<GenerationReport<ScenarioPlan>> {
    let classifier = IntentClassifier::new()?;
    let planner = StepPlanner::new(config, &classifier);
    let outcomes = plan
        .select(selector)?
        .iter()
        .map(|r| ScenarioOutcome::new(r, planner.plan(r.scenario)))
        .collect();
    Ok(GenerationReport { outcomes })
}

/// Runs scenarios end to end against a shared library
pub struct Generator<F> {
    config: GeneratorConfig,
    workspace: Arc<dyn Workspace>,
    library: Arc<ObjectLibrary>,
    factory: F,
    classifier: IntentClassifier,
    cancel: CancellationToken,
}

impl<F> fmt::Debug for Generator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl<F: EngineFactory> Generator<F> {
    /// Create a generator with its own library over `workspace`
    pub fn new(config: GeneratorConfig, workspace: Arc<dyn Workspace>, factory: F) -> PlanwrightResult<Self> {
        config.validate()?;
        let library = Arc::new(ObjectLibrary::new(Arc::clone(&workspace), &config));
        Ok(Self {
            config,
            workspace,
            library,
            factory,
            classifier: IntentClassifier::new()?,
            cancel: CancellationToken::new(),
        })
    }

    /// Share an existing library (it must sit on the same workspace)
    #[must_use]
    pub fn with_library(mut self, library: Arc<ObjectLibrary>) -> Self {
        self.library = library;
        self
    }

    /// Share a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Configuration
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Shared library
    #[must_use]
    pub fn library(&self) -> &Arc<ObjectLibrary> {
        &self.library
    }

    /// Token that cancels running scenarios
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Parse a Markdown plan and generate the selected scenarios
    pub fn generate(&self, plan_text: &str, selector: &ScenarioSelector) -> PlanwrightResult<GenerationReport> {
        let plan = TestPlan::parse(plan_text)?;
        self.generate_plan(&plan, selector)
    }

    /// Generate the selected scenarios of a parsed plan.
    ///
    /// Runs on a rayon pool when `parallel_jobs > 0`. When two selected
    /// scenarios map to the same file name, the first in plan order keeps it.
    pub fn generate_plan(&self, plan: &TestPlan, selector: &ScenarioSelector) -> PlanwrightResult<GenerationReport> {
        let selected = plan.select(selector)?;
        info!(scenarios = selected.len(), jobs = self.config.parallel_jobs, "generation started");

        let mut claimed = HashSet::new();
        let jobs: Vec<(ScenarioRef<'_>, bool)> = selected
            .into_iter()
            .map(|r| {
                let duplicate = !claimed.insert(test_file_name(r.scenario.name()));
                (r, duplicate)
            })
            .collect();

        let outcomes: Vec<ScenarioOutcome> = if self.config.parallel_jobs > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.parallel_jobs)
                .build()
                .map_err(|e| PlanwrightError::config(format!("cannot start worker pool: {e}")))?;
            pool.install(|| {
                jobs.par_iter()
                    .map(|(r, duplicate)| self.run_job(plan, r, *duplicate))
                    .collect()
            })
        } else {
            jobs.iter()
                .map(|(r, duplicate)| self.run_job(plan, r, *duplicate))
                .collect()
        };

        let report = GenerationReport { outcomes };
        info!(
            succeeded = report.succeeded().count(),
            failed = report.failure_count(),
            "generation finished"
        );
        Ok(report)
    }

    /// Generate a single scenario picked by `selector`
    pub fn generate_one(&self, plan: &TestPlan, selector: &ScenarioSelector) -> PlanwrightResult<GeneratedTestFile> {
        let selected = plan.select(selector)?;
        let first = selected.first().ok_or_else(|| PlanwrightError::ScenarioNotFound {
            selector: selector.to_string(),
        })?;
        if selected.len() > 1 {
            return Err(PlanwrightError::invalid_state(format!(
                "'{selector}' selects {} scenarios, expected one",
                selected.len()
            )));
        }
        self.run_scenario(plan, first)
    }

    /// Plan the selected scenarios without running them
    pub fn validate_plan(
        &self,
        plan: &TestPlan,
        selector: &ScenarioSelector,
    ) -> PlanwrightResult<GenerationReport<ScenarioPlan>> {
        validate_plan(plan, selector, &self.config)
    }

    fn run_job(&self, plan: &TestPlan, r: &ScenarioRef<'_>, duplicate: bool) -> ScenarioOutcome {
        let result = if duplicate {
            Err(PlanwrightError::NamingConflict {
                file_name: test_file_name(r.scenario.name()),
            })
        } else {
            self.run_scenario(plan, r)
        };
        if let Err(e) = &result {
            warn!(scenario = %r.label(), error = %e, "scenario skipped");
        }
        ScenarioOutcome::new(r, result)
    }

    fn run_scenario(&self, plan: &TestPlan, r: &ScenarioRef<'_>) -> PlanwrightResult<GeneratedTestFile> {
        let (group, scenario) = (r.group.name(), r.scenario);
        info!(scenario = %r.label(), steps = scenario.steps().len(), "scenario started");

        let mut planned = StepPlanner::new(&self.config, &self.classifier).plan(scenario)?;
        let resolved = self.library.resolve(&planned.pages)?;
        planned.bind_locators(|page, locator| resolved.get(page)?.locator(&locator.name).cloned());

        let adapter = SessionAdapter::new(self.factory.create()?).with_base_url(self.config.base_url.as_str());
        let mut executor = ScenarioExecutor::new(adapter)
            .with_backoff(self.config.retry_backoff())
            .with_cancellation(self.cancel.clone());
        let log = executor.run(&planned)?;
        if self.cancel.is_cancelled() {
            return Err(PlanwrightError::Cancelled { step: None });
        }

        let mut tx = self.library.begin(&planned.pages)?;
        let extensions = derive_extensions(scenario, &log, &tx.definitions(), &self.config)?;
        for (page, ext) in &extensions {
            tx.extend(page, &ext.locators, &ext.methods)?;
        }
        let existing = if self.config.overwrite_tests {
            Vec::new()
        } else {
            self.workspace.list_tests()?
        };
        let file = TestSynthesizer::new(&self.config)
            .with_source(plan.source())
            .synthesize(
                group,
                scenario,
                &tx.definitions(),
                &log,
                &extended_methods(&extensions),
                &existing,
            )?;
        let persisted = tx.commit_with(|| self.workspace.write_test(&file.file_name, &file.source))?;

        info!(
            scenario = %r.label(),
            file = %file.file_name,
            actions = log.len(),
            pages = ?persisted,
            "scenario generated"
        );
        Ok(file)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockEngine;
    use crate::workspace::MemoryWorkspace;

    const PLAN: &str = "\
## Search
### Find a product
1. Fill \"shoes\" in the search field
2. Press Enter in the search field
### Empty search
1. Press Enter in the search field
";

    fn generator(ws: Arc<MemoryWorkspace>) -> Generator<impl EngineFactory<Engine = MockEngine>> {
        let config = GeneratorConfig::new().with_retry_backoff_ms(0);
        Generator::new(config, ws, MockEngine::permissive).unwrap()
    }

    #[test]
    fn test_report_in_plan_order() {
        let ws = Arc::new(MemoryWorkspace::new());
        let report = generator(ws.clone()).generate(PLAN, &ScenarioSelector::All).unwrap();
        assert!(report.is_success());
        let labels: Vec<String> = report.outcomes.iter().map(ScenarioOutcome::label).collect();
        assert_eq!(labels, vec!["Search/Find a product", "Search/Empty search"]);
        assert_eq!(ws.test_count(), 2);
        assert_eq!(ws.page_count(), 1);
    }

    #[test]
    fn test_unknown_selector_fails_run() {
        let ws = Arc::new(MemoryWorkspace::new());
        let err = generator(ws)
            .generate(PLAN, &ScenarioSelector::parse("Checkout/*"))
            .unwrap_err();
        assert!(err.is_run_level());
    }

    #[test]
    fn test_generate_one_needs_single_match() {
        let ws = Arc::new(MemoryWorkspace::new());
        let gen = generator(ws);
        let plan = TestPlan::parse(PLAN).unwrap();
        assert!(gen.generate_one(&plan, &ScenarioSelector::All).is_err());
        let file = gen.generate_one(&plan, &ScenarioSelector::parse("1.2")).unwrap();
        assert_eq!(file.file_name, "empty-search.spec.ts");
    }

    #[test]
    fn test_validate_plan_runs_nothing() {
        let plan = TestPlan::parse(PLAN).unwrap();
        let report = validate_plan(&plan, &ScenarioSelector::All, &GeneratorConfig::new()).unwrap();
        assert!(report.is_success());
        let calls: Vec<usize> = report.succeeded().map(ScenarioPlan::call_count).collect();
        assert_eq!(calls, vec![2, 1]);
    }

    #[test]
    fn test_cancelled_generator_persists_nothing() {
        let ws = Arc::new(MemoryWorkspace::new());
        let gen = generator(ws.clone());
        gen.cancellation_token().cancel();
        let report = gen.generate(PLAN, &ScenarioSelector::All).unwrap();
        assert_eq!(report.failure_count(), 2);
        assert!(matches!(
            report.outcomes[0].result,
            Err(PlanwrightError::Cancelled { .. })
        ));
        assert_eq!(ws.page_count(), 0);
        assert_eq!(ws.test_count(), 0);
    }
}
