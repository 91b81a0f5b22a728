//! Page object definitions and their additive merge.
//!
//! A [`PageObjectDefinition`] is the persisted, language-neutral description
//! of one page: its locators and action methods, both in insertion order.
//! Rendering to a Playwright class happens in [`crate::render`].
//!
//! Definitions only ever grow. [`PageObjectDefinition::extend`] skips entries
//! that are already present with an identical body and rejects same-named
//! entries with a different body, validating the whole batch before applying
//! any of it.

use crate::action::{ActionCall, ActionKind, ArgValue};
use crate::config::FoldStrictness;
use crate::locator::{Locator, Strategy};
use crate::result::{PlanwrightError, PlanwrightResult};
use indexmap::IndexMap;
use planwright_ts_gen::hir::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Names every rendered page class already uses.
const RESERVED_MEMBERS: &[&str] = &["page", "constructor"];

/// Kind of library entry, for conflict reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// A locator
    Locator,
    /// An action method
    Method,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locator => f.write_str("locator"),
            Self::Method => f.write_str("method"),
        }
    }
}

/// TypeScript type of a method parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// `string`
    Text,
    /// `string[]`
    List,
    /// `number`
    Number,
}

impl ParamType {
    /// Type matching a runtime value
    #[must_use]
    pub const fn of(value: &ArgValue) -> Self {
        match value {
            ArgValue::Text(_) => Self::Text,
            ArgValue::List(_) => Self::List,
            ArgValue::Number(_) => Self::Number,
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodParam {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: ParamType,
}

/// Argument slot in a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateArg {
    /// Filled from the method parameter of this name
    Param(String),
    /// Baked-in value
    Literal(ArgValue),
}

/// One primitive inside a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTemplate {
    /// Primitive kind
    pub kind: ActionKind,
    /// Target locator name
    pub locator: Option<String>,
    /// Drop-target locator name (drag)
    pub destination: Option<String>,
    /// Argument slots
    pub args: Vec<TemplateArg>,
}

impl ActionTemplate {
    /// Template that reproduces `call`: parameterized arguments become
    /// parameter slots, the rest are baked in.
    #[must_use]
    pub fn from_call(call: &ActionCall) -> Self {
        Self {
            kind: call.kind,
            locator: call.target_name().map(str::to_string),
            destination: call.destination_name().map(str::to_string),
            args: call
                .args
                .iter()
                .map(|a| match &a.param {
                    Some(p) => TemplateArg::Param(p.clone()),
                    None => TemplateArg::Literal(a.value.clone()),
                })
                .collect(),
        }
    }

    /// Structural match against a call, ignoring parameterized values
    #[must_use]
    pub fn matches(&self, call: &ActionCall) -> bool {
        self.kind == call.kind
            && self.locator.as_deref() == call.target_name()
            && self.destination.as_deref() == call.destination_name()
            && self.args.len() == call.args.len()
            && self.args.iter().zip(&call.args).all(|(t, a)| match t {
                TemplateArg::Param(p) => a.param.as_deref() == Some(p.as_str()),
                TemplateArg::Literal(v) => a.param.is_none() && *v == a.value,
            })
    }

    fn locator_refs(&self) -> impl Iterator<Item = &str> {
        self.locator.iter().chain(&self.destination).map(String::as_str)
    }
}

/// A named page action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionMethod {
    /// camelCase method name
    pub name: String,
    /// Ordered parameters
    pub params: Vec<MethodParam>,
    /// Ordered primitives
    pub body: Vec<ActionTemplate>,
}

impl ActionMethod {
    /// Method with one primitive reproducing `call`
    #[must_use]
    pub fn single(name: impl Into<String>, call: &ActionCall) -> Self {
        Self::composite(name, &[call])
    }

    /// Method reproducing `calls` in order
    #[must_use]
    pub fn composite(name: impl Into<String>, calls: &[&ActionCall]) -> Self {
        let mut params: Vec<MethodParam> = Vec::new();
        for call in calls {
            for arg in &call.args {
                if let Some(p) = &arg.param {
                    if !params.iter().any(|existing| &existing.name == p) {
                        params.push(MethodParam {
                            name: p.clone(),
                            ty: ParamType::of(&arg.value),
                        });
                    }
                }
            }
        }
        Self {
            name: name.into(),
            params,
            body: calls.iter().map(|c| ActionTemplate::from_call(c)).collect(),
        }
    }

    /// Whether the method wraps more than one primitive
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.body.len() > 1
    }

    /// Match a run of calls against the body and return the argument values
    /// for `params`, in order. `None` when the run does not fit.
    #[must_use]
    pub fn match_run(&self, calls: &[&ActionCall], strictness: FoldStrictness) -> Option<Vec<ArgValue>> {
        if self.body.len() != calls.len() {
            return None;
        }
        let pairs: Vec<(&ActionTemplate, &ActionCall)> = match strictness {
            FoldStrictness::Exact => {
                if !self.body.iter().zip(calls).all(|(t, c)| t.matches(c)) {
                    return None;
                }
                self.body.iter().zip(calls.iter().copied()).collect()
            }
            FoldStrictness::Unordered => {
                let mut used = vec![false; calls.len()];
                let mut pairs = Vec::with_capacity(calls.len());
                for template in &self.body {
                    let idx = (0..calls.len()).find(|&i| !used[i] && template.matches(calls[i]))?;
                    used[idx] = true;
                    pairs.push((template, calls[idx]));
                }
                pairs
            }
        };

        let mut values: HashMap<&str, &ArgValue> = HashMap::new();
        for (template, call) in pairs {
            for (slot, arg) in template.args.iter().zip(&call.args) {
                if let TemplateArg::Param(p) = slot {
                    let previous = values.insert(p.as_str(), &arg.value);
                    if previous.is_some_and(|prev| prev != &arg.value) {
                        return None;
                    }
                }
            }
        }
        self.params
            .iter()
            .map(|p| values.get(p.name.as_str()).map(|v| (*v).clone()))
            .collect()
    }
}

/// Entries added by one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Names of locators added
    pub added_locators: Vec<String>,
    /// Names of methods added
    pub added_methods: Vec<String>,
}

impl MergeOutcome {
    /// Check if nothing was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_locators.is_empty() && self.added_methods.is_empty()
    }
}

/// Persisted description of one page object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageObjectDefinition {
    name: String,
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    locators: IndexMap<String, Locator>,
    #[serde(default)]
    methods: IndexMap<String, ActionMethod>,
}

impl PageObjectDefinition {
    /// Create an empty definition. The name must be PascalCase and end in `Page`.
    pub fn new(name: impl Into<String>) -> PlanwrightResult<Self> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(Self {
            name,
            route: None,
            locators: IndexMap::new(),
            methods: IndexMap::new(),
        })
    }

    /// Check a page name
    pub fn validate_name(name: &str) -> PlanwrightResult<()> {
        let pascal = name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            && name.chars().all(|c| c.is_ascii_alphanumeric());
        if !pascal || !name.ends_with("Page") || name == "Page" {
            return Err(PlanwrightError::config(format!(
                "invalid page name '{name}': expected PascalCase ending in 'Page'"
            )));
        }
        Ok(())
    }

    /// Set the route (builder)
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route path, if known
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Look up a locator
    #[must_use]
    pub fn locator(&self, name: &str) -> Option<&Locator> {
        self.locators.get(name)
    }

    /// Look up a method
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&ActionMethod> {
        self.methods.get(name)
    }

    /// Locators in insertion order
    pub fn locators(&self) -> impl Iterator<Item = &Locator> {
        self.locators.values()
    }

    /// Methods in insertion order
    pub fn methods(&self) -> impl Iterator<Item = &ActionMethod> {
        self.methods.values()
    }

    /// Number of locators
    #[must_use]
    pub fn locator_count(&self) -> usize {
        self.locators.len()
    }

    /// Number of methods
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Check if the page has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty() && self.methods.is_empty()
    }

    /// Any member (locator or method) with this name
    #[must_use]
    pub fn has_member(&self, name: &str) -> bool {
        self.locators.contains_key(name) || self.methods.contains_key(name)
    }

    /// First method whose body fits `calls`, with its argument values
    #[must_use]
    pub fn find_method(
        &self,
        calls: &[&ActionCall],
        strictness: FoldStrictness,
    ) -> Option<(&ActionMethod, Vec<ArgValue>)> {
        self.methods
            .values()
            .find_map(|m| m.match_run(calls, strictness).map(|args| (m, args)))
    }

    /// Additively merge locators and methods.
    ///
    /// Entries already present with an identical body are skipped. A
    /// same-named entry with a different body, a name clash between a locator
    /// and a method, or a method referencing an unknown locator fails the
    /// whole merge and leaves `self` untouched.
    pub fn extend(
        &mut self,
        locators: &[Locator],
        methods: &[ActionMethod],
    ) -> PlanwrightResult<MergeOutcome> {
        let conflict = |entry: EntryKind, name: &str| PlanwrightError::Conflict {
            page: self.name.clone(),
            entry,
            name: name.to_string(),
        };

        let mut new_locators: IndexMap<&str, &Locator> = IndexMap::new();
        for loc in locators {
            Identifier::new(loc.name.clone())?;
            if RESERVED_MEMBERS.contains(&loc.name.as_str()) || self.methods.contains_key(&loc.name) {
                return Err(conflict(EntryKind::Locator, &loc.name));
            }
            if let Some(existing) = self.locators.get(&loc.name) {
                if existing != loc {
                    return Err(conflict(EntryKind::Locator, &loc.name));
                }
                continue;
            }
            match new_locators.get(loc.name.as_str()) {
                Some(seen) if *seen != loc => return Err(conflict(EntryKind::Locator, &loc.name)),
                Some(_) => {}
                None => {
                    new_locators.insert(&loc.name, loc);
                }
            }
        }

        let mut new_methods: IndexMap<&str, &ActionMethod> = IndexMap::new();
        for method in methods {
            Identifier::new(method.name.clone())?;
            if RESERVED_MEMBERS.contains(&method.name.as_str())
                || self.locators.contains_key(&method.name)
                || new_locators.contains_key(method.name.as_str())
            {
                return Err(conflict(EntryKind::Method, &method.name));
            }
            if let Some(existing) = self.methods.get(&method.name) {
                if existing != method {
                    return Err(conflict(EntryKind::Method, &method.name));
                }
                continue;
            }
            match new_methods.get(method.name.as_str()) {
                Some(seen) if *seen != method => {
                    return Err(conflict(EntryKind::Method, &method.name));
                }
                Some(_) => {}
                None => {
                    new_methods.insert(&method.name, method);
                }
            }
        }

        let known: HashSet<&str> = self
            .locators
            .keys()
            .map(String::as_str)
            .chain(new_locators.keys().copied())
            .collect();
        for method in new_methods.values() {
            for template in &method.body {
                if let Some(missing) = template.locator_refs().find(|r| !known.contains(r)) {
                    return Err(PlanwrightError::synthesis(format!(
                        "method {}.{} references unknown locator '{missing}'",
                        self.name, method.name
                    )));
                }
            }
        }

        let outcome = MergeOutcome {
            added_locators: new_locators.keys().map(|k| (*k).to_string()).collect(),
            added_methods: new_methods.keys().map(|k| (*k).to_string()).collect(),
        };
        for loc in new_locators.into_values() {
            self.locators.insert(loc.name.clone(), loc.clone());
        }
        for method in new_methods.into_values() {
            self.methods.insert(method.name.clone(), method.clone());
        }
        Ok(outcome)
    }
}

/// Builder for page object definitions
#[derive(Debug)]
pub struct PageObjectBuilder {
    definition: PlanwrightResult<PageObjectDefinition>,
    locators: Vec<Locator>,
    methods: Vec<ActionMethod>,
}

impl PageObjectBuilder {
    /// Create a builder for `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            definition: PageObjectDefinition::new(name),
            locators: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the route
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.definition = self.definition.map(|d| d.with_route(route));
        self
    }

    /// Add a locator
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, strategy: Strategy) -> Self {
        self.locators.push(Locator::new(name, strategy));
        self
    }

    /// Add a method
    #[must_use]
    pub fn with_method(mut self, method: ActionMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Build the definition
    pub fn build(self) -> PlanwrightResult<PageObjectDefinition> {
        let mut definition = self.definition?;
        definition.extend(&self.locators, &self.methods)?;
        Ok(definition)
    }
}
