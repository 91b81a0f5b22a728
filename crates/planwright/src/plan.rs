//! Test plan model and parsers.
//!
//! A plan is a list of groups, each holding named scenarios made of numbered
//! steps. Plans are parsed once and never mutated afterwards.
//!
//! ## Markdown form
//!
//! ```text
//! # Shop test plan
//!
//! ## 1. Authentication
//!
//! ### 1.1 Valid Login
//! **Seed:** `seed.spec.ts`
//!
//! 1. Navigate to the login page
//! 2. Enter valid credentials
//!    - expected: fields accept input
//! 3. Click the login button
//! 4. Verify the dashboard is displayed
//! ```
//!
//! Bullets, prose and fenced code blocks are ignored.

use crate::result::{PlanwrightError, PlanwrightResult};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// One numbered step of a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    ordinal: usize,
    intent: String,
}

impl Step {
    /// 1-based position within the scenario
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Free-text description of what the step does
    #[must_use]
    pub fn intent(&self) -> &str {
        &self.intent
    }
}

/// A named, independently executable test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    seed: Option<String>,
    steps: Vec<Step>,
}

impl Scenario {
    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pre-existing setup script, if any
    #[must_use]
    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    /// Steps in ordinal order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// A named group of scenarios, emitted as one `test.describe`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    name: String,
    scenarios: Vec<Scenario>,
}

impl TestGroup {
    /// Group name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenarios in plan order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

/// A parsed test plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    title: Option<String>,
    source: Option<String>,
    groups: Vec<TestGroup>,
}

/// A selected scenario together with its group and 1-based position
#[derive(Debug, Clone, Copy)]
pub struct ScenarioRef<'a> {
    /// Owning group
    pub group: &'a TestGroup,
    /// The scenario
    pub scenario: &'a Scenario,
    /// `(group, scenario)` ordinals, 1-based
    pub ordinal: (usize, usize),
}

impl ScenarioRef<'_> {
    /// `Group/Scenario` label used in logs and reports
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.group.name(), self.scenario.name())
    }
}

impl TestPlan {
    /// Parse the Markdown plan format.
    pub fn parse(text: &str) -> PlanwrightResult<Self> {
        MarkdownGrammar::new()?.parse(text)
    }

    /// Parse the YAML plan format.
    pub fn from_yaml(text: &str) -> PlanwrightResult<Self> {
        let raw: RawPlan = serde_yaml_ng::from_str(text)?;
        let groups = raw
            .groups
            .into_iter()
            .map(|g| TestGroup {
                name: g.name.trim().to_string(),
                scenarios: g
                    .scenarios
                    .into_iter()
                    .map(|s| Scenario {
                        name: s.name.trim().to_string(),
                        seed: s.seed.filter(|seed| !seed.trim().is_empty()),
                        steps: s
                            .steps
                            .into_iter()
                            .enumerate()
                            .map(|(i, intent)| Step {
                                ordinal: i + 1,
                                intent: intent.trim().to_string(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        let plan = Self {
            title: raw.title,
            source: None,
            groups,
        };
        plan.validate(&Lines::default())?;
        Ok(plan)
    }

    /// Record the file the plan was read from (emitted in test headers).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Plan title (`# ...` heading)
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Plan source path
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Groups in plan order
    #[must_use]
    pub fn groups(&self) -> &[TestGroup] {
        &self.groups
    }

    /// Total number of scenarios
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.groups.iter().map(|g| g.scenarios.len()).sum()
    }

    /// Scenarios matching `selector`, in plan order.
    pub fn select(&self, selector: &ScenarioSelector) -> PlanwrightResult<Vec<ScenarioRef<'_>>> {
        let mut selected = Vec::new();
        for (gi, group) in self.groups.iter().enumerate() {
            for (si, scenario) in group.scenarios.iter().enumerate() {
                let ordinal = (gi + 1, si + 1);
                if selector.matches(group, scenario, ordinal) {
                    selected.push(ScenarioRef {
                        group,
                        scenario,
                        ordinal,
                    });
                }
            }
        }
        if selected.is_empty() {
            return Err(PlanwrightError::ScenarioNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(selected)
    }

    fn validate(&self, lines: &Lines) -> PlanwrightResult<()> {
        if self.groups.is_empty() {
            return Err(PlanwrightError::malformed(
                lines.end,
                "plan contains no groups",
            ));
        }
        let mut group_names = HashSet::new();
        for (gi, group) in self.groups.iter().enumerate() {
            if group.name.is_empty() {
                return Err(PlanwrightError::malformed(lines.group(gi), "group has no name"));
            }
            if !group_names.insert(group.name.as_str()) {
                return Err(PlanwrightError::malformed(
                    lines.group(gi),
                    format!("duplicate group '{}'", group.name),
                ));
            }
            let mut scenario_names = HashSet::new();
            for (si, scenario) in group.scenarios.iter().enumerate() {
                let line = lines.scenario(gi, si);
                if scenario.name.is_empty() {
                    return Err(PlanwrightError::malformed(line, "scenario has no name"));
                }
                if !scenario_names.insert(scenario.name.as_str()) {
                    return Err(PlanwrightError::malformed(
                        line,
                        format!(
                            "duplicate scenario '{}' in group '{}'",
                            scenario.name, group.name
                        ),
                    ));
                }
                if scenario.steps.is_empty() {
                    return Err(PlanwrightError::malformed(
                        line,
                        format!("scenario '{}' has no steps", scenario.name),
                    ));
                }
                if let Some(step) = scenario.steps.iter().find(|s| s.intent.is_empty()) {
                    return Err(PlanwrightError::malformed(
                        line,
                        format!("step {} of '{}' is empty", step.ordinal, scenario.name),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Which scenarios of a plan to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSelector {
    /// Every scenario (`*` or empty)
    All,
    /// Every scenario of one group (`Group/*`)
    Group(String),
    /// One scenario by name (`Group/Scenario` or `Scenario`)
    Scenario {
        /// Group name, if given
        group: Option<String>,
        /// Scenario name
        name: String,
    },
    /// One scenario by 1-based position (`1.2`)
    Ordinal(usize, usize),
}

impl ScenarioSelector {
    /// Parse selector syntax. Names match case-insensitively.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == "*" {
            return Self::All;
        }
        if let Some((g, s)) = text.split_once('.') {
            if let (Ok(g), Ok(s)) = (g.parse::<usize>(), s.parse::<usize>()) {
                return Self::Ordinal(g, s);
            }
        }
        match text.split_once('/') {
            Some((group, "*")) => Self::Group(group.trim().to_string()),
            Some((group, name)) => Self::Scenario {
                group: Some(group.trim().to_string()),
                name: name.trim().to_string(),
            },
            None => Self::Scenario {
                group: None,
                name: text.to_string(),
            },
        }
    }

    fn matches(&self, group: &TestGroup, scenario: &Scenario, ordinal: (usize, usize)) -> bool {
        match self {
            Self::All => true,
            Self::Group(name) => group.name.eq_ignore_ascii_case(name),
            Self::Scenario { group: g, name } => {
                g.as_ref()
                    .map_or(true, |g| group.name.eq_ignore_ascii_case(g))
                    && scenario.name.eq_ignore_ascii_case(name)
            }
            Self::Ordinal(g, s) => ordinal == (*g, *s),
        }
    }
}

impl Default for ScenarioSelector {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for ScenarioSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Group(g) => write!(f, "{g}/*"),
            Self::Scenario {
                group: Some(g),
                name,
            } => write!(f, "{g}/{name}"),
            Self::Scenario { group: None, name } => write!(f, "{name}"),
            Self::Ordinal(g, s) => write!(f, "{g}.{s}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    name: String,
    #[serde(default)]
    scenarios: Vec<RawScenario>,
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    name: String,
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    steps: Vec<String>,
}

/// Source line numbers of headings, for error reporting.
#[derive(Debug, Default)]
struct Lines {
    end: usize,
    groups: Vec<usize>,
    scenarios: Vec<Vec<usize>>,
}

impl Lines {
    fn group(&self, gi: usize) -> usize {
        self.groups.get(gi).copied().unwrap_or(0)
    }

    fn scenario(&self, gi: usize, si: usize) -> usize {
        self.scenarios
            .get(gi)
            .and_then(|s| s.get(si))
            .copied()
            .unwrap_or(0)
    }
}

struct MarkdownGrammar {
    heading: Regex,
    ordinal_prefix: Regex,
    seed: Regex,
    step: Regex,
}

impl MarkdownGrammar {
    fn new() -> PlanwrightResult<Self> {
        Ok(Self {
            heading: Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$")?,
            ordinal_prefix: Regex::new(r"^(?:\d+\.)+\d*\s+")?,
            seed: Regex::new(r"(?i)^\*\*seed:?\*\*:?\s*(.*)$")?,
            step: Regex::new(r"^(\d+)[.)]\s+(.*)$")?,
        })
    }

    fn heading_name(&self, raw: &str) -> String {
        self.ordinal_prefix.replace(raw.trim(), "").trim().to_string()
    }

    fn parse(&self, text: &str) -> PlanwrightResult<TestPlan> {
        let mut plan = TestPlan {
            title: None,
            source: None,
            groups: Vec::new(),
        };
        let mut lines = Lines::default();
        let mut in_fence = false;

        for (idx, line) in text.lines().enumerate() {
            let lineno = idx + 1;
            lines.end = lineno;

            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence || line.trim().is_empty() {
                continue;
            }

            if let Some(caps) = self.heading.captures(line) {
                let level = caps[1].len();
                let name = self.heading_name(&caps[2]);
                match level {
                    1 => {
                        if plan.title.is_none() {
                            plan.title = Some(name);
                        }
                    }
                    2 => {
                        plan.groups.push(TestGroup {
                            name,
                            scenarios: Vec::new(),
                        });
                        lines.groups.push(lineno);
                        lines.scenarios.push(Vec::new());
                    }
                    3 => {
                        let group = plan.groups.last_mut().ok_or_else(|| {
                            PlanwrightError::malformed(
                                lineno,
                                format!("scenario '{name}' appears before any group"),
                            )
                        })?;
                        group.scenarios.push(Scenario {
                            name,
                            seed: None,
                            steps: Vec::new(),
                        });
                        if let Some(s) = lines.scenarios.last_mut() {
                            s.push(lineno);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            let current = plan
                .groups
                .last_mut()
                .and_then(|g| g.scenarios.last_mut());

            if let Some(caps) = self.seed.captures(line.trim()) {
                if let Some(scenario) = current {
                    let seed = caps[1].trim().trim_matches('`').trim();
                    if !seed.is_empty() {
                        scenario.seed = Some(seed.to_string());
                    }
                }
                continue;
            }

            // Indented numbered lines are sub-lists, not steps.
            let Some(caps) = self.step.captures(line) else {
                continue;
            };
            let number: usize = caps[1]
                .parse()
                .map_err(|_| PlanwrightError::malformed(lineno, "step number out of range"))?;
            let intent = caps[2].trim().to_string();
            let scenario = current.ok_or_else(|| {
                PlanwrightError::malformed(lineno, format!("step {number} appears before any scenario"))
            })?;
            let expected = scenario.steps.len() + 1;
            if number != expected {
                return Err(PlanwrightError::malformed(
                    lineno,
                    format!(
                        "step numbered {number} in '{}', expected {expected}",
                        scenario.name
                    ),
                ));
            }
            scenario.steps.push(Step {
                ordinal: number,
                intent,
            });
        }

        lines.end = lines.end.max(1);
        plan.validate(&lines)?;
        Ok(plan)
    }
}
