//! Result and error types for Planwright.

use crate::driver::DriverError;
use crate::page_object::EntryKind;
use thiserror::Error;

/// Result type for Planwright operations
pub type PlanwrightResult<T> = Result<T, PlanwrightError>;

/// Failures while writing page-object definitions back to the workspace.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The stored definition changed since it was resolved
    #[error("Stale write to {page}: stored content changed since it was loaded (expected {expected}, found {found})")]
    StaleWrite {
        /// Page name
        page: String,
        /// Hash captured at resolve or last persist
        expected: String,
        /// Hash of the stored content now
        found: String,
    },

    /// The rendered page source no longer matches its manifest
    #[error("Page source for {page} was modified by hand: {message}")]
    Modified {
        /// Page name
        page: String,
        /// Error message
        message: String,
    },

    /// The stored definition cannot be decoded
    #[error("Stored definition for {page} is unreadable: {message}")]
    Corrupt {
        /// Page name
        page: String,
        /// Error message
        message: String,
    },

    /// Workspace write failed
    #[error("Failed to write {page}: {source}")]
    Io {
        /// Page name
        page: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur in Planwright
#[derive(Debug, Error)]
pub enum PlanwrightError {
    /// Plan text could not be parsed into groups, scenarios and steps
    #[error("Malformed plan at line {line}: {message}")]
    MalformedPlan {
        /// 1-based line number (0 when the source has no line structure)
        line: usize,
        /// Error message
        message: String,
    },

    /// Scenario selector matched nothing
    #[error("No scenario matches '{selector}'")]
    ScenarioNotFound {
        /// Selector as given
        selector: String,
    },

    /// Same-named library entry with a different body
    #[error("Conflicting {entry} '{name}' on {page}: an entry with that name already exists with a different definition")]
    Conflict {
        /// Page name
        page: String,
        /// Locator or method
        entry: EntryKind,
        /// Entry name
        name: String,
    },

    /// Library persistence failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Scenario setup (initial page load) failed
    #[error("Setup failed: {source}")]
    Setup {
        /// Driver failure
        #[source]
        source: DriverError,
    },

    /// A step failed after its retry
    #[error("Step {step} failed: {source}")]
    Driver {
        /// Step ordinal
        step: usize,
        /// Driver failure
        #[source]
        source: DriverError,
    },

    /// Run was cancelled
    #[error("Cancelled{}", .step.map(|s| format!(" at step {s}")).unwrap_or_default())]
    Cancelled {
        /// Step being run when cancellation was observed
        step: Option<usize>,
    },

    /// A step intent could not be mapped to exactly one action
    #[error("Step {step}: cannot interpret '{clause}': {reason}")]
    AmbiguousIntent {
        /// Step ordinal
        step: usize,
        /// Offending clause
        clause: String,
        /// Why it was rejected
        reason: String,
    },

    /// Generated file name collides with an existing test file
    #[error("Test file '{file_name}' already exists")]
    NamingConflict {
        /// Colliding file name
        file_name: String,
    },

    /// Test synthesis could not produce a valid file
    #[error("Synthesis failed: {message}")]
    Synthesis {
        /// Error message
        message: String,
    },

    /// Operation called in the wrong state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Intent pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TypeScript generation error
    #[error("TypeScript generation error: {0}")]
    TsGen(#[from] planwright_ts_gen::TsGenError),
}

impl PlanwrightError {
    /// Create a malformed-plan error
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedPlan {
            line,
            message: message.into(),
        }
    }

    /// Create a synthesis error
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an ambiguous-intent error
    pub fn ambiguous(step: usize, clause: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AmbiguousIntent {
            step,
            clause: clause.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error aborts the whole run rather than one scenario
    #[must_use]
    pub const fn is_run_level(&self) -> bool {
        matches!(
            self,
            Self::MalformedPlan { .. } | Self::ScenarioNotFound { .. }
        )
    }
}
