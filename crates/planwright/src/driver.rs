//! Automation engine abstraction.
//!
//! [`AutomationEngine`] is the seam to a live browser session: one
//! synchronous method per primitive. Planwright never talks to a browser
//! directly; the CLI plugs in [`MockEngine::permissive`] for offline runs and
//! embedders supply their own engine.

use crate::locator::Locator;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Engine failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Operation timed out
    #[error("Timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// No element matched the locator
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// A dialog blocked the page
    #[error("A dialog is open and was not handled")]
    DialogUnhandled,

    /// A verification evaluated to false
    #[error("Verification failed: {check} on {locator}: {detail}")]
    VerificationFailed {
        /// What was checked (`visible`, `text`, `value`)
        check: String,
        /// Locator name
        locator: String,
        /// Details
        detail: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Any other engine failure
    #[error("Engine error: {message}")]
    Engine {
        /// Error message
        message: String,
    },
}

/// What to do with a browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// Accept (OK)
    Accept,
    /// Dismiss (Cancel)
    Dismiss,
}

impl DialogAction {
    /// Parse `accept` / `dismiss`
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "accept" => Some(Self::Accept),
            "dismiss" => Some(Self::Dismiss),
            _ => None,
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Dismiss => "dismiss",
        }
    }
}

/// Condition for [`AutomationEngine::wait`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// Element becomes visible
    Visible(Locator),
    /// Element becomes hidden
    Hidden(Locator),
    /// Fixed delay
    Timeout {
        /// Milliseconds
        ms: u32,
    },
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible(l) => write!(f, "{} visible", l.name),
            Self::Hidden(l) => write!(f, "{} hidden", l.name),
            Self::Timeout { ms } => write!(f, "{ms}ms"),
        }
    }
}

/// A live automation session.
///
/// Calls are synchronous and strictly sequential within one scenario.
/// Verification methods report the observed result; turning `false` into a
/// failure is the adapter's job.
pub trait AutomationEngine: Send {
    /// Load a URL
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Type a value into a field
    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError>;

    /// Click an element
    fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Choose an option
    fn select(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError>;

    /// Hover over an element
    fn hover(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Drag `source` onto `target`
    fn drag(&mut self, source: &Locator, target: &Locator) -> Result<(), DriverError>;

    /// Set files on a file input
    fn upload(&mut self, locator: &Locator, files: &[String]) -> Result<(), DriverError>;

    /// Press a key, focused on `locator` if given
    fn press_key(&mut self, locator: Option<&Locator>, key: &str) -> Result<(), DriverError>;

    /// Accept or dismiss the open dialog
    fn handle_dialog(&mut self, action: DialogAction) -> Result<(), DriverError>;

    /// Is the element visible?
    fn verify_visible(&mut self, locator: &Locator) -> Result<bool, DriverError>;

    /// Does the element contain `expected`?
    fn verify_text(&mut self, locator: &Locator, expected: &str) -> Result<bool, DriverError>;

    /// Does the input hold `expected`?
    fn verify_value(&mut self, locator: &Locator, expected: &str) -> Result<bool, DriverError>;

    /// Wait for a condition
    fn wait(&mut self, condition: &WaitCondition) -> Result<(), DriverError>;
}

/// Scripted engine for tests and offline runs.
///
/// Elements are addressed by locator name. In permissive mode every element
/// exists and every verification passes.
#[derive(Debug, Default)]
pub struct MockEngine {
    permissive: bool,
    elements: HashSet<String>,
    texts: HashMap<String, String>,
    values: HashMap<String, String>,
    failures: HashMap<String, u32>,
    navigation_failures: u32,
    dialog_open: bool,
    current_url: String,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl MockEngine {
    /// Strict engine: only registered elements exist
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that accepts everything
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Register an element
    #[must_use]
    pub fn with_element(mut self, name: impl Into<String>) -> Self {
        self.elements.insert(name.into());
        self
    }

    /// Register an element with text content
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        self.elements.insert(name.clone());
        self.texts.insert(name, text.into());
        self
    }

    /// Register an input with a value
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.elements.insert(name.clone());
        self.values.insert(name, value.into());
        self
    }

    /// Fail the next `times` calls on an element with a timeout
    #[must_use]
    pub fn failing(mut self, name: impl Into<String>, times: u32) -> Self {
        self.failures.insert(name.into(), times);
        self
    }

    /// Fail the next `times` navigations
    #[must_use]
    pub const fn failing_navigation(mut self, times: u32) -> Self {
        self.navigation_failures = times;
        self
    }

    /// Open a dialog that blocks interaction until handled
    #[must_use]
    pub const fn with_dialog(mut self) -> Self {
        self.dialog_open = true;
        self
    }

    /// Last navigated URL
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    fn record(&mut self, call: String) -> Result<(), DriverError> {
        self.call_history.push(call);
        if self.dialog_open {
            return Err(DriverError::DialogUnhandled);
        }
        Ok(())
    }

    fn touch(&mut self, locator: &Locator) -> Result<(), DriverError> {
        if let Some(remaining) = self.failures.get_mut(&locator.name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::Timeout { ms: 5000 });
            }
        }
        if self.permissive || self.elements.contains(&locator.name) {
            Ok(())
        } else {
            Err(DriverError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    fn present(&self, locator: &Locator) -> bool {
        self.permissive || self.elements.contains(&locator.name)
    }
}

impl AutomationEngine for MockEngine {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.record(format!("navigate:{url}"))?;
        if self.navigation_failures > 0 {
            self.navigation_failures -= 1;
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        self.current_url = url.to_string();
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError> {
        self.record(format!("fill:{}:{value}", locator.name))?;
        self.touch(locator)?;
        self.values.insert(locator.name.clone(), value.to_string());
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.record(format!("click:{}", locator.name))?;
        self.touch(locator)
    }

    fn select(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError> {
        self.record(format!("select:{}:{value}", locator.name))?;
        self.touch(locator)?;
        self.values.insert(locator.name.clone(), value.to_string());
        Ok(())
    }

    fn hover(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.record(format!("hover:{}", locator.name))?;
        self.touch(locator)
    }

    fn drag(&mut self, source: &Locator, target: &Locator) -> Result<(), DriverError> {
        self.record(format!("drag:{}:{}", source.name, target.name))?;
        self.touch(source)?;
        self.touch(target)
    }

    fn upload(&mut self, locator: &Locator, files: &[String]) -> Result<(), DriverError> {
        self.record(format!("upload:{}:{}", locator.name, files.join(",")))?;
        self.touch(locator)
    }

    fn press_key(&mut self, locator: Option<&Locator>, key: &str) -> Result<(), DriverError> {
        let target = locator.map_or("page", |l| l.name.as_str());
        self.record(format!("press_key:{target}:{key}"))?;
        match locator {
            Some(l) => self.touch(l),
            None => Ok(()),
        }
    }

    fn handle_dialog(&mut self, action: DialogAction) -> Result<(), DriverError> {
        self.call_history.push(format!("handle_dialog:{}", action.as_str()));
        if !self.dialog_open && !self.permissive {
            return Err(DriverError::Engine {
                message: "no dialog is open".to_string(),
            });
        }
        self.dialog_open = false;
        Ok(())
    }

    fn verify_visible(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        self.record(format!("verify_visible:{}", locator.name))?;
        if let Some(remaining) = self.failures.get_mut(&locator.name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::Timeout { ms: 5000 });
            }
        }
        Ok(self.present(locator))
    }

    fn verify_text(&mut self, locator: &Locator, expected: &str) -> Result<bool, DriverError> {
        self.record(format!("verify_text:{}:{expected}", locator.name))?;
        self.touch(locator)?;
        Ok(match self.texts.get(&locator.name) {
            Some(text) => text.contains(expected),
            None => self.permissive,
        })
    }

    fn verify_value(&mut self, locator: &Locator, expected: &str) -> Result<bool, DriverError> {
        self.record(format!("verify_value:{}:{expected}", locator.name))?;
        self.touch(locator)?;
        Ok(match self.values.get(&locator.name) {
            Some(value) => value == expected,
            None => self.permissive,
        })
    }

    fn wait(&mut self, condition: &WaitCondition) -> Result<(), DriverError> {
        self.record(format!("wait:{condition}"))?;
        match condition {
            WaitCondition::Visible(l) if !self.present(l) => Err(DriverError::Timeout { ms: 30_000 }),
            WaitCondition::Hidden(l) if self.elements.contains(&l.name) => {
                Err(DriverError::Timeout { ms: 30_000 })
            }
            _ => Ok(()),
        }
    }
}
