//! Turns classified step intents into planned action calls.
//!
//! The planner runs before any browser call. It tracks the current page
//! (navigation and page-arrival checks switch it), derives a locator from the
//! target noun phrase of each clause and fills argument values from quoted
//! literals or configured fixtures. A clause it cannot turn into exactly one
//! call sequence fails the whole scenario with `AmbiguousIntent`.

use crate::action::{ActionArg, ActionCall, ActionKind, ArgValue};
use crate::config::GeneratorConfig;
use crate::intent::{Capability, Classification, Clause, IntentClassifier};
use crate::locator::{Locator, Strategy};
use crate::naming::{camel_case, pascal_case, sentence_case, upper_first, words};
use crate::page_object::PageObjectDefinition;
use crate::plan::Scenario;
use crate::result::{PlanwrightError, PlanwrightResult};
use planwright_ts_gen::hir::Identifier;
use std::collections::HashMap;
use tracing::debug;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "in", "into", "on", "to", "at", "over", "with", "as", "from", "for", "of",
    "that", "this",
];

/// Words that only carry the verification cue
const VERIFY_NOISE: &[&str] = &[
    "is", "are", "be", "been", "should", "has", "have", "now", "still", "correctly",
    "displayed", "visible", "shown", "appears", "appear", "loaded", "present", "shows", "show",
    "showing", "contains", "contain", "containing", "text", "reads", "says", "displays",
    "display", "value", "equals", "equal", "set",
];

const WAIT_HIDDEN: &[&str] = &[
    "disappear", "disappears", "hidden", "gone", "vanish", "vanishes", "close", "closes",
];
const WAIT_NOISE: &[&str] = &[
    "be", "is", "until", "visible", "appear", "appears", "shown", "displayed", "loaded",
];

const START_ALIASES: &[&str] = &["app", "application", "home", "homepage", "site", "website"];

const RESERVED_MEMBERS: &[&str] = &["page", "constructor"];

/// Setup navigation performed before step 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSetup {
    /// Page the scenario starts on
    pub page: String,
    /// Route path or URL to load
    pub url: String,
}

/// Calls planned for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// 1-based step ordinal
    pub ordinal: usize,
    /// Step intent as written
    pub intent: String,
    /// Calls in order
    pub calls: Vec<ActionCall>,
}

/// Everything a scenario run will do, decided upfront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPlan {
    /// Initial page load
    pub setup: PageSetup,
    /// Steps in ordinal order
    pub steps: Vec<PlannedStep>,
    /// Pages the steps touch, in first-touch order
    pub pages: Vec<String>,
}

impl ScenarioPlan {
    /// Every planned call, in order
    pub fn calls(&self) -> impl Iterator<Item = &ActionCall> {
        self.steps.iter().flat_map(|s| s.calls.iter())
    }

    /// Total number of planned calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.steps.iter().map(|s| s.calls.len()).sum()
    }

    /// Replace every planned locator with `bind(page, locator)`
    pub fn bind_locators(&mut self, mut bind: impl FnMut(&str, &Locator) -> Option<Locator>) {
        for call in self.steps.iter_mut().flat_map(|s| s.calls.iter_mut()) {
            let page = call.page.clone();
            for slot in [&mut call.target, &mut call.destination] {
                if let Some(bound) = slot.as_ref().and_then(|l| bind(&page, l)) {
                    *slot = Some(bound);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Button,
    Link,
    Field,
    Dropdown,
    Heading,
    Checkbox,
    Radio,
    Notice,
    Generic,
}

impl ElementKind {
    fn of(word: &str) -> Option<Self> {
        Some(match word {
            "button" => Self::Button,
            "link" => Self::Link,
            "field" | "input" | "box" | "textbox" => Self::Field,
            "dropdown" | "select" | "combobox" => Self::Dropdown,
            "heading" | "title" => Self::Heading,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "message" | "alert" | "banner" | "notification" | "toast" => Self::Notice,
            _ => return None,
        })
    }

    const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Button => Some("button"),
            Self::Link => Some("link"),
            Self::Field => Some("input"),
            Self::Dropdown => Some("select"),
            Self::Heading => Some("heading"),
            Self::Checkbox => Some("checkbox"),
            Self::Radio => Some("radio"),
            Self::Notice | Self::Generic => None,
        }
    }

    const fn role(self) -> Option<&'static str> {
        match self {
            Self::Button => Some("button"),
            Self::Link => Some("link"),
            Self::Dropdown => Some("combobox"),
            Self::Heading => Some("heading"),
            Self::Checkbox => Some("checkbox"),
            Self::Radio => Some("radio"),
            Self::Field | Self::Notice | Self::Generic => None,
        }
    }
}

/// Whether `word` names a kind of element (`button`, `link`, `field` ...)
pub(crate) fn is_element_word(word: &str) -> bool {
    ElementKind::of(word).is_some()
}

/// Per-step bookkeeping
struct StepContext<'c> {
    ordinal: usize,
    clause: &'c Clause,
    params: &'c mut HashMap<String, u32>,
}

impl StepContext<'_> {
    fn fail(&self, reason: impl Into<String>) -> PlanwrightError {
        PlanwrightError::ambiguous(self.ordinal, self.clause.text(), reason)
    }

    /// Parameter names are unique within a step; repeats get a numeric suffix
    fn param(&mut self, name: &str) -> String {
        let count = self.params.entry(name.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            name.to_string()
        } else {
            format!("{name}{count}")
        }
    }
}

/// Plans scenarios against a configuration
#[derive(Debug)]
pub struct StepPlanner<'a> {
    config: &'a GeneratorConfig,
    classifier: &'a IntentClassifier,
}

impl<'a> StepPlanner<'a> {
    /// Create a planner
    #[must_use]
    pub const fn new(config: &'a GeneratorConfig, classifier: &'a IntentClassifier) -> Self {
        Self { config, classifier }
    }

    /// Plan every step of a scenario
    pub fn plan(&self, scenario: &Scenario) -> PlanwrightResult<ScenarioPlan> {
        let start = self.config.start_page.clone();
        let setup = PageSetup {
            url: self.config.route_for(&start),
            page: start.clone(),
        };
        let mut current = start;
        let mut pages: Vec<String> = Vec::new();
        let mut steps = Vec::with_capacity(scenario.steps().len());

        for step in scenario.steps() {
            let clauses = self.classifier.classify(step.intent());
            if clauses.is_empty() {
                return Err(PlanwrightError::ambiguous(
                    step.ordinal(),
                    step.intent(),
                    "step has no action",
                ));
            }
            let mut params = HashMap::new();
            let mut calls = Vec::new();
            for clause in &clauses {
                let mut ctx = StepContext {
                    ordinal: step.ordinal(),
                    clause,
                    params: &mut params,
                };
                let capability = match clause.classification() {
                    Classification::Matched(c) => *c,
                    Classification::Ambiguous(caps) => {
                        let names: Vec<String> = caps.iter().map(ToString::to_string).collect();
                        return Err(ctx.fail(format!("could mean any of: {}", names.join(", "))));
                    }
                    Classification::Unresolved => {
                        return Err(ctx.fail("no supported action matches"));
                    }
                    Classification::Compound => {
                        return Err(ctx.fail("'and' joins words that are neither two actions nor two elements"));
                    }
                };
                let planned = self.plan_clause(capability, &mut ctx, &mut current)?;
                for call in &planned {
                    if !pages.contains(&call.page) {
                        pages.push(call.page.clone());
                    }
                }
                calls.extend(planned);
            }
            debug!(step = step.ordinal(), calls = calls.len(), "planned step");
            steps.push(PlannedStep {
                ordinal: step.ordinal(),
                intent: step.intent().to_string(),
                calls,
            });
        }

        Ok(ScenarioPlan { setup, steps, pages })
    }

    fn plan_clause(
        &self,
        capability: Capability,
        ctx: &mut StepContext<'_>,
        current: &mut String,
    ) -> PlanwrightResult<Vec<ActionCall>> {
        let clause = ctx.clause;
        let literals = clause.literals();
        let subject = strip(&clause.words(), &[STOPWORDS]);
        let here = current.clone();
        let call = |kind| ActionCall::new(kind, here.as_str());

        let calls = match capability {
            Capability::Navigate => {
                let (page, route) = self.navigation_target(ctx, &subject)?;
                current.clone_from(&page);
                vec![ActionCall::new(ActionKind::Navigate, page)
                    .arg(ActionArg::literal(ArgValue::Text(route)))]
            }
            Capability::Fill => self.plan_fill(ctx, &subject, current)?,
            Capability::Click => {
                let mut subject = subject;
                if clause.verb() == Some("submit") {
                    if subject.last().is_some_and(|w| w == "form") {
                        subject.pop();
                    }
                    if subject.is_empty() {
                        subject.push("submit".to_string());
                    }
                }
                let target = element(ctx, &subject, literals.first(), ElementKind::Button)?;
                vec![call(ActionKind::Click).on(target)]
            }
            Capability::Select => {
                let option = literals
                    .first()
                    .ok_or_else(|| ctx.fail("no option given"))?;
                let target = element(ctx, &subject, None, ElementKind::Dropdown)?;
                let param = ctx.param("option");
                vec![call(ActionKind::SelectOption)
                    .on(target)
                    .arg(ActionArg::param(param, ArgValue::Text(option.clone())))]
            }
            Capability::Hover => {
                let target = element(ctx, &subject, literals.first(), ElementKind::Generic)?;
                vec![call(ActionKind::Hover).on(target)]
            }
            Capability::Drag => {
                let raw = clause.words();
                let split = raw
                    .iter()
                    .position(|w| matches!(w.as_str(), "to" | "onto" | "into"))
                    .ok_or_else(|| ctx.fail("no drop target given"))?;
                let source_words = strip(&raw[..split], &[STOPWORDS]);
                let target_words = strip(&raw[split + 1..], &[STOPWORDS]);
                let mut names = literals.iter();
                let source_name = if source_words.is_empty() { names.next() } else { None };
                let target_name = if target_words.is_empty() { names.next() } else { None };
                let source = element(ctx, &source_words, source_name, ElementKind::Generic)?;
                let target = element(ctx, &target_words, target_name, ElementKind::Generic)?;
                vec![call(ActionKind::Drag).on(source).onto(target)]
            }
            Capability::Upload => {
                if literals.is_empty() {
                    return Err(ctx.fail("no files given"));
                }
                let target = element(ctx, &subject, None, ElementKind::Field)?;
                let param = ctx.param("files");
                vec![call(ActionKind::Upload)
                    .on(target)
                    .arg(ActionArg::param(param, ArgValue::List(literals.to_vec())))]
            }
            Capability::Dialog => {
                let verb = clause.verb().unwrap_or("accept");
                vec![call(ActionKind::HandleDialog)
                    .arg(ActionArg::literal(ArgValue::Text(verb.to_string())))]
            }
            Capability::Key => {
                let (key, rest) = match literals.first() {
                    Some(lit) => (lit.clone(), subject.clone()),
                    None => {
                        let (first, rest) = subject
                            .split_first()
                            .ok_or_else(|| ctx.fail("no key given"))?;
                        (key_name(first), rest.to_vec())
                    }
                };
                let mut planned = call(ActionKind::PressKey);
                if !rest.is_empty() {
                    planned = planned.on(element(ctx, &rest, None, ElementKind::Field)?);
                }
                vec![planned.arg(ActionArg::literal(ArgValue::Text(key)))]
            }
            Capability::Wait => plan_wait(ctx, &subject, current)?,
            Capability::VerifyVisible => {
                let subject = strip(&subject, &[VERIFY_NOISE]);
                if let Some(stem) = arrival_stem(&subject, literals) {
                    let page = self.page_named(ctx, stem)?;
                    current.clone_from(&page);
                    let heading = if stem.is_empty() {
                        words(page.trim_end_matches("Page"))
                    } else {
                        stem.to_vec()
                    };
                    let target = element(ctx, &heading, None, ElementKind::Heading)?;
                    vec![ActionCall::new(ActionKind::VerifyVisible, page).on(target)]
                } else {
                    let target = element(ctx, &subject, literals.first(), ElementKind::Generic)?;
                    vec![call(ActionKind::VerifyVisible).on(target)]
                }
            }
            Capability::VerifyText => {
                let subject = strip(&subject, &[VERIFY_NOISE]);
                let expected = literals
                    .last()
                    .ok_or_else(|| ctx.fail("no expected text given"))?;
                let target = element(ctx, &subject, None, ElementKind::Generic)?;
                let param = ctx.param("expected");
                vec![call(ActionKind::VerifyText)
                    .on(target)
                    .arg(ActionArg::param(param, ArgValue::Text(expected.clone())))]
            }
            Capability::VerifyValue => {
                let subject = strip(&subject, &[VERIFY_NOISE]);
                let target = element(ctx, &subject, None, ElementKind::Field)?;
                let field = target.name.trim_end_matches("Input").to_string();
                let expected = match literals.last() {
                    Some(lit) => lit.clone(),
                    None => self
                        .config
                        .fixture(None, &field)
                        .map(str::to_string)
                        .ok_or_else(|| ctx.fail("no expected value given"))?,
                };
                let param = ctx.param("expected");
                vec![call(ActionKind::VerifyValue)
                    .on(target)
                    .arg(ActionArg::param(param, ArgValue::Text(expected)))]
            }
        };
        Ok(calls)
    }

    fn plan_fill(
        &self,
        ctx: &mut StepContext<'_>,
        subject: &[String],
        current: &str,
    ) -> PlanwrightResult<Vec<ActionCall>> {
        let mut literals = ctx.clause.literals().iter();

        if let Some((i, fields)) = subject
            .iter()
            .enumerate()
            .find_map(|(i, w)| self.config.expansion(w).map(|f| (i, f)))
        {
            let qualifier: Vec<&String> = subject[..i]
                .iter()
                .filter(|w| *w != "form" && ElementKind::of(w).is_none())
                .collect();
            let qualifier = camel_case(&qualifier);
            let mut calls = Vec::with_capacity(fields.len());
            for field in fields {
                let field_words = words(field);
                let value = self.fill_value(literals.next(), Some(qualifier.as_str()), field);
                let target = element(ctx, &field_words, None, ElementKind::Field)?;
                let param = ctx.param(&camel_case(&field_words));
                calls.push(
                    ActionCall::new(ActionKind::Fill, current)
                        .on(target)
                        .arg(ActionArg::param(param, ArgValue::Text(value))),
                );
            }
            return Ok(calls);
        }

        let target = element(ctx, subject, None, ElementKind::Field)?;
        let field = target
            .name
            .strip_suffix("Input")
            .filter(|f| !f.is_empty())
            .unwrap_or(&target.name)
            .to_string();
        let value = self.fill_value(literals.next(), None, &field);
        let param = ctx.param(&field);
        Ok(vec![ActionCall::new(ActionKind::Fill, current)
            .on(target)
            .arg(ActionArg::param(param, ArgValue::Text(value)))])
    }

    /// Quoted literal, then fixture, then the field name as a placeholder.
    /// The value always travels as a method parameter, so a placeholder only
    /// shows up at the call site of the generated test.
    fn fill_value(&self, literal: Option<&String>, qualifier: Option<&str>, field: &str) -> String {
        if let Some(lit) = literal {
            return lit.clone();
        }
        match self.config.fixture(qualifier, field) {
            Some(value) => value.to_string(),
            None => {
                debug!(field, "no literal or fixture, using placeholder");
                field.to_string()
            }
        }
    }

    /// Page and route for a navigation clause
    fn navigation_target(
        &self,
        ctx: &StepContext<'_>,
        subject: &[String],
    ) -> PlanwrightResult<(String, String)> {
        if let Some(url) = ctx
            .clause
            .literals()
            .iter()
            .find(|l| l.starts_with('/') || l.contains("://"))
        {
            let path = url.split("://").last().unwrap_or(url);
            let path = if url.contains("://") {
                path.split_once('/').map_or("", |(_, rest)| rest)
            } else {
                path
            };
            let segment = path
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            let page = self.page_named(ctx, &words(segment))?;
            return Ok((page, url.clone()));
        }
        let stem = match subject.iter().position(|w| w == "page") {
            Some(i) => &subject[..i],
            None => subject,
        };
        if stem.is_empty() && !subject.iter().any(|w| w == "page") {
            return Err(ctx.fail("no destination given"));
        }
        let page = self.page_named(ctx, stem)?;
        let route = self.config.route_for(&page);
        Ok((page, route))
    }

    /// `["user", "settings"]` -> `UserSettingsPage`; start-page aliases map
    /// to the configured start page
    fn page_named(&self, ctx: &StepContext<'_>, stem: &[String]) -> PlanwrightResult<String> {
        let is_start = stem.is_empty()
            || (stem.len() == 1 && START_ALIASES.contains(&stem[0].as_str()));
        let page = if is_start {
            self.config.start_page.clone()
        } else {
            format!("{}Page", pascal_case(stem))
        };
        PageObjectDefinition::validate_name(&page)
            .map_err(|_| ctx.fail(format!("'{page}' is not a usable page name")))?;
        Ok(page)
    }
}

fn plan_wait(
    ctx: &mut StepContext<'_>,
    subject: &[String],
    current: &str,
) -> PlanwrightResult<Vec<ActionCall>> {
    let number = subject.iter().find_map(|w| w.parse::<u32>().ok());
    if let Some(n) = number {
        let in_seconds = subject
            .iter()
            .any(|w| matches!(w.as_str(), "second" | "seconds" | "sec" | "secs" | "s"));
        let ms = if in_seconds { n.saturating_mul(1000) } else { n };
        let param = ctx.param("ms");
        return Ok(vec![ActionCall::new(ActionKind::Wait, current)
            .arg(ActionArg::param(param, ArgValue::Number(ms)))]);
    }
    let hidden = subject.iter().any(|w| WAIT_HIDDEN.contains(&w.as_str()));
    let rest = strip(subject, &[WAIT_HIDDEN, WAIT_NOISE]);
    let target = element(ctx, &rest, None, ElementKind::Generic)?;
    let state = if hidden { "hidden" } else { "visible" };
    Ok(vec![ActionCall::new(ActionKind::Wait, current)
        .on(target)
        .arg(ActionArg::literal(ArgValue::Text(state.to_string())))])
}

/// Stem of the page a visibility check lands on. `dashboard page` names one
/// outright; a bare noun phrase with no element word and no quoted label
/// (`dashboard is displayed`) does too.
fn arrival_stem<'s>(subject: &'s [String], literals: &[String]) -> Option<&'s [String]> {
    if let Some(i) = subject.iter().position(|w| w == "page") {
        return Some(&subject[..i]);
    }
    let bare = !subject.is_empty()
        && literals.is_empty()
        && subject.iter().all(|w| ElementKind::of(w).is_none());
    bare.then_some(subject)
}

fn strip(words: &[String], lists: &[&[&str]]) -> Vec<String> {
    words
        .iter()
        .filter(|w| !lists.iter().any(|list| list.contains(&w.as_str())))
        .cloned()
        .collect()
}

fn key_name(word: &str) -> String {
    match word {
        "enter" | "return" => "Enter".to_string(),
        "tab" => "Tab".to_string(),
        "escape" | "esc" => "Escape".to_string(),
        "space" | "spacebar" => "Space".to_string(),
        "backspace" => "Backspace".to_string(),
        "delete" | "del" => "Delete".to_string(),
        "up" => "ArrowUp".to_string(),
        "down" => "ArrowDown".to_string(),
        "left" => "ArrowLeft".to_string(),
        "right" => "ArrowRight".to_string(),
        other => upper_first(other),
    }
}

/// Locator for a noun phrase. The last element-type word decides the
/// strategy; the words before it name the element. With no descriptive
/// words, `name_literal` (a quoted label) names it instead.
fn element(
    ctx: &StepContext<'_>,
    subject: &[String],
    name_literal: Option<&String>,
    default: ElementKind,
) -> PlanwrightResult<Locator> {
    let (qualifier, kind, kind_word) = match subject.iter().rposition(|w| ElementKind::of(w).is_some()) {
        Some(i) => (
            subject[..i].to_vec(),
            ElementKind::of(&subject[i]).unwrap_or(default),
            Some(subject[i].as_str()),
        ),
        None => (subject.to_vec(), default, None),
    };

    let (qualifier, display, from_literal) = if qualifier.is_empty() {
        match name_literal {
            Some(lit) if !words(lit).is_empty() => (words(lit), lit.clone(), true),
            _ => return Err(ctx.fail("no element named")),
        }
    } else {
        let display = sentence_case(&qualifier);
        (qualifier, display, false)
    };

    let mut name_words = qualifier.clone();
    match (kind, kind.suffix()) {
        (_, Some(suffix)) => name_words.push(suffix.to_string()),
        (ElementKind::Notice, None) => name_words.extend(kind_word.map(str::to_string)),
        _ => {}
    }

    let strategy = match (kind.role(), kind) {
        (Some(role), _) => Strategy::role(role, display),
        (None, ElementKind::Field) => Strategy::label(display),
        (None, ElementKind::Generic) if from_literal => Strategy::text(display),
        _ => Strategy::test_id(name_words.join("-")),
    };

    let mut name = camel_case(&name_words);
    if RESERVED_MEMBERS.contains(&name.as_str()) || Identifier::new(name.clone()).is_err() {
        name.push_str("Element");
    }
    if Identifier::new(name.clone()).is_err() {
        return Err(ctx.fail(format!("'{name}' is not a usable locator name")));
    }
    Ok(Locator::new(name, strategy))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::plan::TestPlan;
    use pretty_assertions::assert_eq;

    fn plan_steps(steps: &[&str], config: &GeneratorConfig) -> PlanwrightResult<ScenarioPlan> {
        let mut text = String::from("## Group\n### Scenario\n");
        for (i, s) in steps.iter().enumerate() {
            text.push_str(&format!("{}. {s}\n", i + 1));
        }
        let plan = TestPlan::parse(&text).unwrap();
        let scenario = &plan.groups()[0].scenarios()[0];
        let classifier = IntentClassifier::new().unwrap();
        StepPlanner::new(config, &classifier).plan(scenario)
    }

    fn plan_ok(steps: &[&str]) -> ScenarioPlan {
        let config = GeneratorConfig::new()
            .with_fixture("valid.username", "alice")
            .with_fixture("valid.password", "s3cret");
        plan_steps(steps, &config).unwrap()
    }

    fn first_call(steps: &[&str]) -> ActionCall {
        plan_ok(steps).steps[0].calls[0].clone()
    }

    mod navigation_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_login_plan() {
            let plan = plan_ok(&[
                "Navigate to the login page",
                "Enter valid credentials",
                "Click the login button",
                "Verify the dashboard page is displayed",
            ]);
            assert_eq!(plan.setup, PageSetup { page: "HomePage".into(), url: "/".into() });
            assert_eq!(plan.pages, vec!["LoginPage", "DashboardPage"]);
            assert_eq!(plan.call_count(), 5);

            let nav = &plan.steps[0].calls[0];
            assert_eq!(nav.page, "LoginPage");
            assert_eq!(nav.value(0), Some(&ArgValue::Text("/login".into())));

            let fills = &plan.steps[1].calls;
            assert_eq!(fills[0].target_name(), Some("usernameInput"));
            assert_eq!(fills[0].args[0].param.as_deref(), Some("username"));
            assert_eq!(fills[1].value(0), Some(&ArgValue::Text("s3cret".into())));

            let click = &plan.steps[2].calls[0];
            assert_eq!(click.target, Some(Locator::new("loginButton", Strategy::role("button", "Login"))));

            let arrival = &plan.steps[3].calls[0];
            assert_eq!(arrival.page, "DashboardPage");
            assert_eq!(arrival.kind, ActionKind::VerifyVisible);
            assert_eq!(arrival.target_name(), Some("dashboardHeading"));
        }

        #[test]
        fn test_bare_noun_check_arrives_on_page() {
            let plan = plan_ok(&[
                "Navigate to login page",
                "Enter valid credentials",
                "Click login button",
                "Verify dashboard is displayed",
            ]);
            assert_eq!(plan.pages, vec!["LoginPage", "DashboardPage"]);
            let arrival = &plan.steps[3].calls[0];
            assert_eq!(arrival.page, "DashboardPage");
            assert_eq!(arrival.target, Some(Locator::new("dashboardHeading", Strategy::role("heading", "Dashboard"))));
        }

        #[test]
        fn test_element_checks_stay_on_current_page() {
            let plan = plan_ok(&[
                "Go to the login page",
                "Verify the login button is visible",
                "Verify 'Welcome back' is displayed",
            ]);
            assert_eq!(plan.pages, vec!["LoginPage"]);
            assert_eq!(plan.steps[1].calls[0].target_name(), Some("loginButton"));
            assert_eq!(plan.steps[2].calls[0].target_name(), Some("welcomeBack"));
        }

        #[test]
        fn test_start_page_aliases_and_urls() {
            assert_eq!(first_call(&["Open the app"]).page, "HomePage");
            let nav = first_call(&["Go to '/account/user-settings?tab=1'"]);
            assert_eq!(nav.page, "UserSettingsPage");
            assert_eq!(nav.value(0), Some(&ArgValue::Text("/account/user-settings?tab=1".into())));
            assert_eq!(first_call(&["Visit \"https://shop.test/\""]).page, "HomePage");
        }

        #[test]
        fn test_configured_route() {
            let config = GeneratorConfig::new().with_route("LoginPage", "/auth/sign-in");
            let plan = plan_steps(&["Go to the login page"], &config).unwrap();
            assert_eq!(plan.steps[0].calls[0].value(0), Some(&ArgValue::Text("/auth/sign-in".into())));
        }
    }

    mod locator_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_element_words() {
            let cases = [
                ("Click the forgot password link", "forgotPasswordLink", Strategy::role("link", "Forgot password")),
                ("Fill 'x' in the email field", "emailInput", Strategy::label("Email")),
                ("Select 'US' from the country dropdown", "countrySelect", Strategy::role("combobox", "Country")),
                ("Check the terms checkbox", "termsCheckbox", Strategy::role("checkbox", "Terms")),
                ("Hover over the user avatar", "userAvatar", Strategy::test_id("user-avatar")),
                ("Verify the error message shows 'Bad'", "errorMessage", Strategy::test_id("error-message")),
                ("Click 'Sign up'", "signUpButton", Strategy::role("button", "Sign up")),
                ("Hover over 'Help'", "help", Strategy::text("Help")),
            ];
            for (intent, name, strategy) in cases {
                let call = first_call(&[intent]);
                assert_eq!(call.target, Some(Locator::new(name, strategy)), "{intent}");
            }
        }

        #[test]
        fn test_reserved_names_get_suffix() {
            let call = first_call(&["Hover over the delete"]);
            assert_eq!(call.target_name(), Some("deleteElement"));
        }

        #[test]
        fn test_submit_form() {
            let call = first_call(&["Submit the login form"]);
            assert_eq!(call.target_name(), Some("loginButton"));
        }
    }

    mod argument_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_literals_before_fixtures() {
            let plan = plan_ok(&[r#"Enter valid credentials ("bob", "pw")"#]);
            let values: Vec<_> = plan.steps[0].calls.iter().map(|c| c.value(0).cloned()).collect();
            assert_eq!(
                values,
                vec![Some(ArgValue::Text("bob".into())), Some(ArgValue::Text("pw".into()))]
            );
        }

        #[test]
        fn test_repeated_param_names_are_suffixed() {
            let plan = plan_ok(&["Enter 'a' in the search field and type 'b' in the search field"]);
            let params: Vec<_> = plan.steps[0]
                .calls
                .iter()
                .map(|c| c.args[0].param.clone().unwrap())
                .collect();
            assert_eq!(params, vec!["search", "search2"]);
        }

        #[test]
        fn test_missing_value_uses_field_placeholder() {
            let plan = plan_steps(&["Enter the coupon code", "Enter valid credentials"], &GeneratorConfig::new())
                .unwrap();
            let coupon = &plan.steps[0].calls[0];
            assert_eq!(coupon.target_name(), Some("couponCodeInput"));
            assert_eq!(coupon.args[0].param.as_deref(), Some("couponCode"));
            assert_eq!(coupon.value(0), Some(&ArgValue::Text("couponCode".into())));

            let values: Vec<_> = plan.steps[1].calls.iter().map(|c| c.value(0).cloned()).collect();
            assert_eq!(
                values,
                vec![Some(ArgValue::Text("username".into())), Some(ArgValue::Text("password".into()))]
            );
        }

        #[test]
        fn test_upload_wait_key_dialog() {
            let upload = first_call(&[r#"Upload "a.png", "b.png" to the avatar input"#]);
            assert_eq!(upload.value(0), Some(&ArgValue::List(vec!["a.png".into(), "b.png".into()])));

            let wait = first_call(&["Wait 2 seconds"]);
            assert_eq!(wait.value(0), Some(&ArgValue::Number(2000)));
            let wait = first_call(&["Wait for the spinner to disappear"]);
            assert_eq!(wait.target_name(), Some("spinner"));
            assert_eq!(wait.value(0), Some(&ArgValue::Text("hidden".into())));

            let key = first_call(&["Press Enter in the search field"]);
            assert_eq!(key.target_name(), Some("searchInput"));
            assert_eq!(key.value(0), Some(&ArgValue::Text("Enter".into())));
            assert_eq!(first_call(&["Press escape"]).target, None);

            let dialog = first_call(&["Dismiss the alert dialog"]);
            assert_eq!(dialog.value(0), Some(&ArgValue::Text("dismiss".into())));
        }

        #[test]
        fn test_drag_targets() {
            let call = first_call(&["Drag the todo card to the done column"]);
            assert_eq!(call.target_name(), Some("todoCard"));
            assert_eq!(call.destination_name(), Some("doneColumn"));
        }
    }

    mod rejection_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_unknown_verb_fails_whole_scenario() {
            let err = plan_steps(
                &["Go to the home page", "Wave at the logo"],
                &GeneratorConfig::new(),
            )
            .unwrap_err();
            match err {
                PlanwrightError::AmbiguousIntent { step, clause, .. } => {
                    assert_eq!(step, 2);
                    assert_eq!(clause, "Wave at the logo");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_and_inside_element_name_is_ambiguous() {
            let err = plan_steps(&["Click the Terms and Conditions link"], &GeneratorConfig::new())
                .unwrap_err();
            match err {
                PlanwrightError::AmbiguousIntent { step, clause, reason } => {
                    assert_eq!(step, 1);
                    assert_eq!(clause, "Click the Terms and Conditions link");
                    assert!(reason.contains("'and'"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_ambiguous_verification_lists_options() {
            let err = plan_steps(&["Verify the total value is displayed"], &GeneratorConfig::new())
                .unwrap_err();
            assert!(err.to_string().contains("verify value, verify visible"));
        }
    }
}
