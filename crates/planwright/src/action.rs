//! Planned action calls and the execution log.

use crate::locator::Locator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Automation primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Load a URL
    Navigate,
    /// Type a value into a field
    Fill,
    /// Click an element
    Click,
    /// Choose an option of a select element
    SelectOption,
    /// Assert an element is visible
    VerifyVisible,
    /// Assert an element contains text
    VerifyText,
    /// Assert an input has a value
    VerifyValue,
    /// Move the pointer over an element
    Hover,
    /// Drag one element onto another
    Drag,
    /// Set files on a file input
    Upload,
    /// Accept or dismiss a browser dialog
    HandleDialog,
    /// Press a keyboard key
    PressKey,
    /// Wait for a condition or a fixed time
    Wait,
}

impl ActionKind {
    /// Verification kinds become `expect*` methods
    #[must_use]
    pub const fn is_verification(self) -> bool {
        matches!(
            self,
            Self::VerifyVisible | Self::VerifyText | Self::VerifyValue
        )
    }

    /// Whether the kind acts on a target element
    #[must_use]
    pub const fn needs_target(self) -> bool {
        !matches!(self, Self::Navigate | Self::HandleDialog | Self::PressKey | Self::Wait)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigate => "navigate",
            Self::Fill => "fill",
            Self::Click => "click",
            Self::SelectOption => "select_option",
            Self::VerifyVisible => "verify_visible",
            Self::VerifyText => "verify_text",
            Self::VerifyValue => "verify_value",
            Self::Hover => "hover",
            Self::Drag => "drag",
            Self::Upload => "upload",
            Self::HandleDialog => "handle_dialog",
            Self::PressKey => "press_key",
            Self::Wait => "wait",
        };
        f.write_str(name)
    }
}

/// A concrete argument value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    /// String value
    Text(String),
    /// List of strings (upload file paths)
    List(Vec<String>),
    /// Integer (milliseconds)
    Number(u32),
}

impl ArgValue {
    /// Text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{s}'"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One argument of a planned call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionArg {
    /// Value used at run time
    pub value: ArgValue,
    /// Method parameter name; `None` bakes the value into the method body
    pub param: Option<String>,
}

impl ActionArg {
    /// Parameterized argument
    #[must_use]
    pub fn param(name: impl Into<String>, value: ArgValue) -> Self {
        Self {
            value,
            param: Some(name.into()),
        }
    }

    /// Baked-in literal
    #[must_use]
    pub const fn literal(value: ArgValue) -> Self {
        Self { value, param: None }
    }
}

/// A planned automation call against one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Primitive kind
    pub kind: ActionKind,
    /// Page object the call belongs to
    pub page: String,
    /// Target element
    pub target: Option<Locator>,
    /// Drop target (drag)
    pub destination: Option<Locator>,
    /// Ordered arguments
    pub args: Vec<ActionArg>,
}

impl ActionCall {
    /// Create a call with no target or arguments
    #[must_use]
    pub fn new(kind: ActionKind, page: impl Into<String>) -> Self {
        Self {
            kind,
            page: page.into(),
            target: None,
            destination: None,
            args: Vec::new(),
        }
    }

    /// Set the target element
    #[must_use]
    pub fn on(mut self, locator: Locator) -> Self {
        self.target = Some(locator);
        self
    }

    /// Set the drop target
    #[must_use]
    pub fn onto(mut self, locator: Locator) -> Self {
        self.destination = Some(locator);
        self
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: ActionArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Argument value at `index`
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&ArgValue> {
        self.args.get(index).map(|a| &a.value)
    }

    /// Target locator name
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        self.target.as_ref().map(|l| l.name.as_str())
    }

    /// Destination locator name
    #[must_use]
    pub fn destination_name(&self) -> Option<&str> {
        self.destination.as_ref().map(|l| l.name.as_str())
    }
}

impl fmt::Display for ActionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.page, self.kind)?;
        if let Some(target) = &self.target {
            write!(f, " {}", target.name)?;
        }
        if let Some(dest) = &self.destination {
            write!(f, " -> {}", dest.name)?;
        }
        for arg in &self.args {
            write!(f, " {}", arg.value)?;
        }
        Ok(())
    }
}

/// Result of one adapter call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Call succeeded
    Success,
    /// Call failed
    Failure {
        /// Error message
        message: String,
    },
}

impl Outcome {
    /// Check for success
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// One recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Step ordinal; `None` for setup
    pub step: Option<usize>,
    /// 1 for the first try, 2 for the retry
    pub attempt: u32,
    /// What was called
    pub call: ActionCall,
    /// How it went
    pub outcome: Outcome,
}

/// Ordered record of every adapter call in one scenario run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
    actions: Vec<Action>,
}

impl ExecutionLog {
    /// Create a log from recorded actions
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// All actions in call order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of recorded calls
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate over actions
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Successful actions of one step, in call order
    pub fn successful_for_step(&self, step: usize) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |a| a.step == Some(step) && a.outcome.is_success())
    }

    /// First action
    #[must_use]
    pub fn first(&self) -> Option<&Action> {
        self.actions.first()
    }

    /// Last action
    #[must_use]
    pub fn last(&self) -> Option<&Action> {
        self.actions.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{Locator, Strategy};

    fn click(step: usize, outcome: Outcome) -> Action {
        Action {
            step: Some(step),
            attempt: 1,
            call: ActionCall::new(ActionKind::Click, "LoginPage")
                .on(Locator::new("loginButton", Strategy::role("button", "Login"))),
            outcome,
        }
    }

    #[test]
    fn test_kind_classes() {
        assert!(ActionKind::VerifyText.is_verification());
        assert!(!ActionKind::Click.is_verification());
        assert!(ActionKind::Drag.needs_target());
        assert!(!ActionKind::Navigate.needs_target());
        assert_eq!(ActionKind::SelectOption.to_string(), "select_option");
    }

    #[test]
    fn test_call_display() {
        let call = ActionCall::new(ActionKind::Fill, "LoginPage")
            .on(Locator::new("usernameInput", Strategy::label("Username")))
            .arg(ActionArg::param("username", ArgValue::Text("alice".into())));
        assert_eq!(call.to_string(), "LoginPage.fill usernameInput 'alice'");
        assert_eq!(call.target_name(), Some("usernameInput"));
        assert_eq!(call.value(0).and_then(ArgValue::as_text), Some("alice"));
    }

    #[test]
    fn test_log_filters_failed_attempts() {
        let log = ExecutionLog::new(vec![
            click(1, Outcome::Failure { message: "timeout".into() }),
            click(1, Outcome::Success),
            click(2, Outcome::Success),
        ]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.successful_for_step(1).count(), 1);
        assert_eq!(log.successful_for_step(3).count(), 0);
    }

    #[test]
    fn test_arg_serialization() {
        let arg = ActionArg::literal(ArgValue::Number(500));
        let json = serde_json::to_string(&arg).unwrap();
        assert_eq!(json, r#"{"value":{"type":"number","value":500},"param":null}"#);
    }
}
