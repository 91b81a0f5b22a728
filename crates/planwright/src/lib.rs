//! Planwright: test plans in, Playwright tests out.
//!
//! Planwright reads a human-written test plan (groups of scenarios made of
//! numbered steps), drives each scenario through a browser-automation engine
//! and writes one Playwright test file per scenario. Locators and page
//! actions live in a shared page-object library that only ever grows, so
//! every generated test is a sequence of page-object method calls.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │ TestPlan │──►│ Planner  │──►│ Executor │──►│ Library  │──►│  Synth   │
//! │ (md/yml) │   │ (intent) │   │ (engine) │   │ (extend) │   │ (.ts)    │
//! └──────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use planwright::prelude::*;
//! use std::sync::Arc;
//!
//! let plan = "\
//! ## Search
//! ### Find shoes
//! 1. Fill \"shoes\" in the search field
//! 2. Click the search button
//! ";
//! let workspace = Arc::new(MemoryWorkspace::new());
//! let generator = Generator::new(GeneratorConfig::default(), workspace.clone(), MockEngine::permissive)?;
//! let report = generator.generate(plan, &ScenarioSelector::All)?;
//!
//! assert!(report.is_success());
//! assert_eq!(workspace.read_test("find-shoes.spec.ts")?.map(|s| s.contains("test.describe('Search'")), Some(true));
//! # Ok::<(), planwright::PlanwrightError>(())
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod adapter;
pub mod config;
pub mod driver;
pub mod executor;
pub mod intent;
pub mod library;
pub mod locator;
pub mod naming;
pub mod page_object;
pub mod pipeline;
pub mod plan;
pub mod planner;
pub mod render;
mod result;
pub mod synth;
pub mod workspace;

pub use action::{Action, ActionArg, ActionCall, ActionKind, ArgValue, ExecutionLog, Outcome};
pub use adapter::SessionAdapter;
pub use config::{FoldStrictness, GeneratorConfig};
pub use driver::{AutomationEngine, DialogAction, DriverError, MockEngine, WaitCondition};
pub use executor::{CancellationToken, ExecutorState, ScenarioExecutor};
pub use intent::{Capability, Classification, Clause, IntentClassifier};
pub use library::{LibraryTransaction, ObjectLibrary, PageRecord};
pub use locator::{Locator, Strategy};
pub use page_object::{
    ActionMethod, ActionTemplate, EntryKind, MergeOutcome, MethodParam, PageObjectBuilder,
    PageObjectDefinition, ParamType, TemplateArg,
};
pub use pipeline::{EngineFactory, GenerationReport, Generator, ScenarioOutcome};
pub use plan::{Scenario, ScenarioRef, ScenarioSelector, Step, TestGroup, TestPlan};
pub use planner::{PageSetup, PlannedStep, ScenarioPlan, StepPlanner};
pub use result::{PersistenceError, PlanwrightError, PlanwrightResult};
pub use synth::{GeneratedTestFile, PageExtension, TestSynthesizer};
pub use workspace::{FsWorkspace, MemoryWorkspace, StoredPage, Workspace};

/// Everything needed to drive a generation run
pub mod prelude {
    pub use super::action::*;
    pub use super::adapter::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::executor::*;
    pub use super::intent::*;
    pub use super::library::{LibraryTransaction, ObjectLibrary, PageRecord};
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::pipeline::*;
    pub use super::plan::*;
    pub use super::planner::*;
    pub use super::result::*;
    pub use super::synth::{
        derive_extensions, GeneratedTestFile, PageExtension, TestSynthesizer,
    };
    pub use super::workspace::*;
}
