//! Code synthesis: execution log to page-object extensions and a test file.
//!
//! The log is cut into *runs*: consecutive successful actions of one step on
//! one page. A verification is always a run of its own so it surfaces as an
//! `expect*` call. [`derive_extensions`] makes sure every run is covered by a
//! page method, and [`TestSynthesizer::synthesize`] emits one method call per
//! run (or per action when no method covers the run as a whole).

use crate::action::{ActionCall, ActionKind, ArgValue, ExecutionLog};
use crate::config::GeneratorConfig;
use crate::locator::Locator;
use crate::naming::{camel_case, lower_first, pascal_case, slug, upper_first, words};
use crate::page_object::{ActionMethod, PageObjectDefinition};
use crate::plan::Scenario;
use crate::render::{metadata, value_expr};
use crate::result::{PlanwrightError, PlanwrightResult};
use indexmap::IndexMap;
use planwright_ts_gen::hir::Identifier;
use planwright_ts_gen::prelude::{generate, Expr, Stmt, TsModuleBuilder};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Longest composite name, in words
const MAX_NAME_WORDS: usize = 8;

/// Consecutive successful actions of one step on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run<'a> {
    /// Step ordinal
    pub step: usize,
    /// Page the actions belong to
    pub page: &'a str,
    /// Calls in log order
    pub calls: Vec<&'a ActionCall>,
}

/// Cut the step actions of a log into runs. Setup and failed attempts are
/// skipped.
#[must_use]
pub fn runs(log: &ExecutionLog) -> Vec<Run<'_>> {
    let mut out: Vec<Run<'_>> = Vec::new();
    for action in log.iter() {
        let Some(step) = action.step else { continue };
        if !action.outcome.is_success() {
            continue;
        }
        let call = &action.call;
        let verification = call.kind.is_verification();
        if let Some(run) = out.last_mut().filter(|run| {
            run.step == step
                && run.page == call.page
                && !verification
                && !run.calls.iter().any(|c| c.kind.is_verification())
        }) {
            run.calls.push(call);
            continue;
        }
        out.push(Run {
            step,
            page: &call.page,
            calls: vec![call],
        });
    }
    out
}

/// Name of the single-action method reproducing `call`
#[must_use]
pub fn single_method_name(call: &ActionCall) -> String {
    let target = call.target_name().map(upper_first).unwrap_or_default();
    let text = |i: usize| call.value(i).and_then(ArgValue::as_text).unwrap_or_default();
    match call.kind {
        ActionKind::Navigate => "navigate".to_string(),
        ActionKind::Fill => format!("fill{target}"),
        ActionKind::Click => format!("click{target}"),
        ActionKind::SelectOption => format!("select{target}"),
        ActionKind::Hover => format!("hover{target}"),
        ActionKind::Drag => format!(
            "drag{target}To{}",
            call.destination_name().map(upper_first).unwrap_or_default()
        ),
        ActionKind::Upload => format!("upload{target}"),
        ActionKind::PressKey => {
            let key = pascal_case(&words(text(0)));
            if target.is_empty() {
                format!("press{key}")
            } else {
                format!("press{key}In{target}")
            }
        }
        ActionKind::HandleDialog => match text(0) {
            "" => "handleDialog".to_string(),
            verb => format!("{verb}Dialog"),
        },
        ActionKind::Wait if target.is_empty() => "waitForTimeout".to_string(),
        ActionKind::Wait => format!("waitFor{target}{}", upper_first(text(0))),
        ActionKind::VerifyVisible => format!("expect{target}Visible"),
        ActionKind::VerifyText => format!("expect{target}Text"),
        ActionKind::VerifyValue => format!("expect{target}Value"),
    }
}

/// Name of a composite method: the step intent in camelCase, quoted values
/// removed
pub fn composite_method_name(intent: &str) -> PlanwrightResult<String> {
    let quoted = Regex::new(r#""[^"]*"|(?:^|\s)'[^']*'"#)?;
    let bare = quoted.replace_all(intent, " ");
    let mut parts = words(&bare);
    parts.truncate(MAX_NAME_WORDS);
    let name = camel_case(&parts);
    Ok(if name.is_empty() {
        "performStep".to_string()
    } else if Identifier::new(name.clone()).is_err() {
        format!("{name}Step")
    } else {
        name
    })
}

/// Pick `base`, `base2`, `base3`, ... so the method can join `def` without a
/// conflict. An identical existing method keeps its name.
fn claim(def: &PageObjectDefinition, base: &str, make: impl Fn(&str) -> ActionMethod) -> ActionMethod {
    let mut n = 1;
    loop {
        let name = if n == 1 {
            base.to_string()
        } else {
            format!("{base}{n}")
        };
        let method = make(&name);
        match def.method(&name) {
            Some(existing) if *existing == method => return method,
            None if !def.has_member(&name) => return method,
            _ => n += 1,
        }
    }
}

/// Entries one scenario adds to a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtension {
    /// New locators, in first-use order
    pub locators: Vec<Locator>,
    /// New methods, in first-use order
    pub methods: Vec<ActionMethod>,
}

impl PageExtension {
    /// Check if nothing is added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty() && self.methods.is_empty()
    }
}

/// `Page.method` labels of every added method
#[must_use]
pub fn extended_methods(extensions: &IndexMap<String, PageExtension>) -> Vec<String> {
    extensions
        .iter()
        .flat_map(|(page, ext)| ext.methods.iter().map(move |m| format!("{page}.{}", m.name)))
        .collect()
}

/// Locators and methods needed so every run of `log` maps onto page methods.
///
/// A run already covered by a method adds nothing. Otherwise the run becomes
/// one composite method (with `create_composites` and two or more actions) or
/// one single-action method per uncovered action. Every locator the run
/// references is added too; a same-named locator with a different strategy
/// fails with `Conflict`.
pub fn derive_extensions(
    scenario: &Scenario,
    log: &ExecutionLog,
    pages: &IndexMap<String, PageObjectDefinition>,
    config: &GeneratorConfig,
) -> PlanwrightResult<IndexMap<String, PageExtension>> {
    let strictness = config.fold_strictness;
    let mut working = pages.clone();
    let mut added: IndexMap<String, (Vec<String>, Vec<String>)> = IndexMap::new();

    for run in runs(log) {
        let def = working.get_mut(run.page).ok_or_else(|| {
            PlanwrightError::synthesis(format!("page {} was not resolved", run.page))
        })?;
        if def.find_method(&run.calls, strictness).is_some() {
            continue;
        }
        let (new_locators, new_methods) = added.entry(run.page.to_string()).or_default();

        let locators: Vec<Locator> = run
            .calls
            .iter()
            .flat_map(|c| c.target.iter().chain(&c.destination))
            .cloned()
            .collect();
        new_locators.extend(def.extend(&locators, &[])?.added_locators);

        if config.create_composites && run.calls.len() > 1 {
            let intent = scenario
                .steps()
                .iter()
                .find(|s| s.ordinal() == run.step)
                .map_or("", |s| s.intent());
            let base = composite_method_name(intent)?;
            let method = claim(def, &base, |name| ActionMethod::composite(name, &run.calls));
            new_methods.extend(def.extend(&[], &[method])?.added_methods);
            continue;
        }
        for &call in &run.calls {
            if def.find_method(&[call], strictness).is_some() {
                continue;
            }
            let method = claim(def, &single_method_name(call), |name| ActionMethod::single(name, call));
            new_methods.extend(def.extend(&[], &[method])?.added_methods);
        }
    }

    let mut extensions = IndexMap::new();
    for (page, (locators, methods)) in added {
        let Some(def) = working.get(&page) else { continue };
        let ext = PageExtension {
            locators: locators.iter().filter_map(|n| def.locator(n).cloned()).collect(),
            methods: methods.iter().filter_map(|n| def.method(n).cloned()).collect(),
        };
        if !ext.is_empty() {
            debug!(page = %page, locators = ext.locators.len(), methods = ext.methods.len(), "derived extension");
            extensions.insert(page, ext);
        }
    }
    Ok(extensions)
}

/// A synthesized test file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedTestFile {
    /// `<slug>.spec.ts`
    pub file_name: String,
    /// Group (describe block) name
    pub group: String,
    /// Scenario (test) name
    pub scenario: String,
    /// TypeScript source
    pub source: String,
    /// Imported pages, first-reference order
    pub imports: Vec<String>,
    /// Number of test cases (always 1)
    pub test_count: usize,
    /// `Page.method` labels added by this run
    pub extended: Vec<String>,
    /// Log the file was synthesized from
    pub log: ExecutionLog,
}

/// File name for a scenario
#[must_use]
pub fn test_file_name(scenario: &str) -> String {
    format!("{}.spec.ts", slug(scenario))
}

/// Emits Playwright test files
#[derive(Debug)]
pub struct TestSynthesizer<'a> {
    config: &'a GeneratorConfig,
    source: Option<&'a str>,
}

impl<'a> TestSynthesizer<'a> {
    /// Create a synthesizer
    #[must_use]
    pub const fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    /// Plan file path for the `spec:` header line
    #[must_use]
    pub const fn with_source(mut self, source: Option<&'a str>) -> Self {
        self.source = source;
        self
    }

    /// Emit the test file for one executed scenario.
    ///
    /// `pages` must already hold every method the log needs (see
    /// [`derive_extensions`]). `existing` lists file names that are taken.
    pub fn synthesize(
        &self,
        group: &str,
        scenario: &Scenario,
        pages: &IndexMap<String, PageObjectDefinition>,
        log: &ExecutionLog,
        extended: &[String],
        existing: &[String],
    ) -> PlanwrightResult<GeneratedTestFile> {
        let file_name = test_file_name(scenario.name());
        if existing.iter().any(|f| *f == file_name) {
            return Err(PlanwrightError::NamingConflict { file_name });
        }

        let runs = runs(log);
        let mut imports: Vec<String> = Vec::new();
        for run in &runs {
            if !imports.iter().any(|p| p == run.page) {
                imports.push(run.page.to_string());
            }
        }

        let mut body = Vec::new();
        for page in &imports {
            body.push(Stmt::const_decl(
                lower_first(page),
                Expr::ident(page.as_str())?.new_expr(vec![Expr::ident("page")?]),
            )?);
        }
        for step in scenario.steps() {
            body.push(Stmt::Blank);
            body.push(Stmt::comment(format!("{}. {}", step.ordinal(), step.intent())));
            for run in runs.iter().filter(|r| r.step == step.ordinal()) {
                body.extend(self.run_calls(run, pages)?);
            }
        }

        let test_case = Expr::ident("test")?.call(vec![
            Expr::str(scenario.name()),
            Expr::async_arrow_destructured(&["page"], body)?,
        ]);
        let describe = Expr::ident("test")?.method(
            "describe",
            vec![Expr::str(group), Expr::arrow(vec![Stmt::expr(test_case)])],
        )?;

        let mut notes = Vec::new();
        if let Some(source) = self.source {
            notes.push(("spec".to_string(), source.to_string()));
        }
        if let Some(seed) = scenario.seed() {
            notes.push(("seed".to_string(), seed.to_string()));
        }
        if !extended.is_empty() {
            notes.push(("extended".to_string(), extended.join(", ")));
        }

        let prefix = self.config.pages_import_prefix.trim_end_matches('/');
        let mut module = TsModuleBuilder::new()
            .metadata(metadata(notes))
            .import(&["test"], &[], "@playwright/test")?;
        for page in &imports {
            module = module.import(&[page.as_str()], &[], format!("{prefix}/{page}"))?;
        }
        let source = generate(&module.blank().stmt(Stmt::expr(describe)).build());

        Ok(GeneratedTestFile {
            file_name,
            group: group.to_string(),
            scenario: scenario.name().to_string(),
            source,
            imports,
            test_count: 1,
            extended: extended.to_vec(),
            log: log.clone(),
        })
    }

    /// `await xPage.method(args);` for a run: one call when a method covers
    /// the whole run, else one per action
    fn run_calls(
        &self,
        run: &Run<'_>,
        pages: &IndexMap<String, PageObjectDefinition>,
    ) -> PlanwrightResult<Vec<Stmt>> {
        let def = pages
            .get(run.page)
            .ok_or_else(|| PlanwrightError::synthesis(format!("page {} is not in the library", run.page)))?;
        let strictness = self.config.fold_strictness;
        let call = |method: &ActionMethod, args: &[ArgValue]| -> PlanwrightResult<Stmt> {
            let receiver = Expr::ident(lower_first(run.page))?;
            let args = args.iter().map(value_expr).collect();
            Ok(Stmt::expr(receiver.method(method.name.as_str(), args)?.await_expr()))
        };

        if let Some((method, args)) = def.find_method(&run.calls, strictness) {
            return Ok(vec![call(method, &args)?]);
        }
        run.calls
            .iter()
            .map(|c| {
                let (method, args) = def.find_method(&[*c], strictness).ok_or_else(|| {
                    PlanwrightError::synthesis(format!(
                        "unregistered method: no method on {} performs {c}",
                        run.page
                    ))
                })?;
                call(method, &args)
            })
            .collect()
    }
}
