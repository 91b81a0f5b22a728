//! Generator configuration.
//!
//! Loaded from TOML or YAML; every field has a default so a config file only
//! needs the keys it overrides.

use crate::result::{PlanwrightError, PlanwrightResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// How strictly a run of logged actions must line up with a composite
/// method's body to be emitted as one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldStrictness {
    /// Same actions, same order
    #[default]
    Exact,
    /// Same actions, any order
    Unordered,
}

/// Configuration for a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Page the browser is on after setup
    pub start_page: String,
    /// Page name to route path overrides
    pub routes: BTreeMap<String, String>,
    /// Test data, keyed `<qualifier>.<field>` or `<field>`
    pub fixtures: BTreeMap<String, String>,
    /// Nouns that expand to several fields (`credentials` -> username, password)
    pub expansions: BTreeMap<String, Vec<String>>,
    /// Composite folding policy
    pub fold_strictness: FoldStrictness,
    /// Create composite methods for multi-action steps
    pub create_composites: bool,
    /// Replace test files left by an earlier run of the same scenario
    pub overwrite_tests: bool,
    /// Delay before the single retry of a failed call
    pub retry_backoff_ms: u64,
    /// Scenario worker threads (0 = sequential)
    pub parallel_jobs: usize,
    /// Directory for generated test files, relative to the workspace root
    pub tests_dir: String,
    /// Directory for page objects, relative to the workspace root
    pub pages_dir: String,
    /// Import path prefix from a test file to the page objects
    pub pages_import_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let mut expansions = BTreeMap::new();
        expansions.insert(
            "credentials".to_string(),
            vec!["username".to_string(), "password".to_string()],
        );
        Self {
            base_url: "http://localhost:3000".to_string(),
            start_page: "HomePage".to_string(),
            routes: BTreeMap::new(),
            fixtures: BTreeMap::new(),
            expansions,
            fold_strictness: FoldStrictness::Exact,
            create_composites: true,
            overwrite_tests: false,
            retry_backoff_ms: 250,
            parallel_jobs: 0,
            tests_dir: "tests".to_string(),
            pages_dir: "pages".to_string(),
            pages_import_prefix: "../pages".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> PlanwrightResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Err(PlanwrightError::config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Parse TOML
    pub fn from_toml_str(text: &str) -> PlanwrightResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PlanwrightError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML
    pub fn from_yaml_str(text: &str) -> PlanwrightResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> PlanwrightResult<()> {
        if !self.start_page.ends_with("Page") || !starts_upper(&self.start_page) {
            return Err(PlanwrightError::config(format!(
                "start_page '{}' must be a PascalCase name ending in 'Page'",
                self.start_page
            )));
        }
        if self.base_url.is_empty() {
            return Err(PlanwrightError::config("base_url must not be empty"));
        }
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set start page
    #[must_use]
    pub fn with_start_page(mut self, page: impl Into<String>) -> Self {
        self.start_page = page.into();
        self
    }

    /// Add a route override
    #[must_use]
    pub fn with_route(mut self, page: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(page.into(), path.into());
        self
    }

    /// Add a fixture value
    #[must_use]
    pub fn with_fixture(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixtures.insert(key.into(), value.into());
        self
    }

    /// Add a noun expansion
    #[must_use]
    pub fn with_expansion(mut self, noun: impl Into<String>, fields: &[&str]) -> Self {
        self.expansions.insert(
            noun.into(),
            fields.iter().map(|f| (*f).to_string()).collect(),
        );
        self
    }

    /// Set fold strictness
    #[must_use]
    pub const fn with_fold_strictness(mut self, strictness: FoldStrictness) -> Self {
        self.fold_strictness = strictness;
        self
    }

    /// Enable or disable composite creation
    #[must_use]
    pub const fn with_composites(mut self, enabled: bool) -> Self {
        self.create_composites = enabled;
        self
    }

    /// Allow replacing test files from earlier runs
    #[must_use]
    pub const fn with_overwrite_tests(mut self, overwrite: bool) -> Self {
        self.overwrite_tests = overwrite;
        self
    }

    /// Set retry backoff
    #[must_use]
    pub const fn with_retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    /// Set parallel jobs
    #[must_use]
    pub const fn with_parallel_jobs(mut self, jobs: usize) -> Self {
        self.parallel_jobs = jobs;
        self
    }

    /// Retry backoff as a duration
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Route path for a page: the override, `/` for the start page, or the
    /// kebab-cased page stem (`UserSettingsPage` -> `/user-settings`).
    #[must_use]
    pub fn route_for(&self, page: &str) -> String {
        if let Some(route) = self.routes.get(page) {
            return route.clone();
        }
        if page == self.start_page {
            return "/".to_string();
        }
        let stem = page.strip_suffix("Page").unwrap_or(page);
        format!("/{}", crate::naming::kebab_from_pascal(stem))
    }

    /// Absolute URL for a route path or URL
    #[must_use]
    pub fn absolute_url(&self, route: &str) -> String {
        if route.starts_with("http://") || route.starts_with("https://") {
            return route.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if route.starts_with('/') {
            format!("{base}{route}")
        } else {
            format!("{base}/{route}")
        }
    }

    /// Fixture lookup: `<qualifier>.<field>` first, then `<field>`
    #[must_use]
    pub fn fixture(&self, qualifier: Option<&str>, field: &str) -> Option<&str> {
        qualifier
            .filter(|q| !q.is_empty())
            .and_then(|q| self.fixtures.get(&format!("{q}.{field}")))
            .or_else(|| self.fixtures.get(field))
            .map(String::as_str)
    }

    /// Fields a noun expands to
    #[must_use]
    pub fn expansion(&self, noun: &str) -> Option<&[String]> {
        self.expansions.get(noun).map(Vec::as_slice)
    }
}

fn starts_upper(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
