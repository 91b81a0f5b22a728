//! Recording façade over an [`AutomationEngine`].
//!
//! Every call made through the adapter is appended to its log together with
//! the step it belongs to, the attempt number and the outcome. The log is the
//! only input the synthesizer trusts.

use crate::action::{Action, ActionArg, ActionCall, ActionKind, ArgValue, ExecutionLog, Outcome};
use crate::driver::{AutomationEngine, DialogAction, DriverError, WaitCondition};
use crate::locator::Locator;
use tracing::debug;

/// Typed, logging wrapper around one engine session
#[derive(Debug)]
pub struct SessionAdapter<E> {
    engine: E,
    base_url: Option<String>,
    actions: Vec<Action>,
    step: Option<usize>,
    attempt: u32,
}

impl<E: AutomationEngine> SessionAdapter<E> {
    /// Wrap an engine
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            base_url: None,
            actions: Vec::new(),
            step: None,
            attempt: 1,
        }
    }

    /// Resolve relative navigation against `base_url`
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Tag subsequent calls with a step ordinal and attempt number
    pub fn begin_step(&mut self, step: Option<usize>, attempt: u32) {
        self.step = step;
        self.attempt = attempt;
    }

    /// Initial page load, recorded outside any step
    pub fn page_init(&mut self, page: &str, url: &str) -> Result<(), DriverError> {
        let (step, attempt) = (self.step, self.attempt);
        self.begin_step(None, attempt);
        let result = self.navigate(page, url);
        self.step = step;
        result
    }

    /// Everything recorded since the last [`reset`](Self::reset)
    #[must_use]
    pub fn read_log(&self) -> ExecutionLog {
        ExecutionLog::new(self.actions.clone())
    }

    /// Clear the log
    pub fn reset(&mut self) {
        self.actions.clear();
        self.step = None;
        self.attempt = 1;
    }

    /// Borrow the engine
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Borrow the engine mutably
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Unwrap the engine
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Route a planned call to the engine and record it
    pub fn dispatch(&mut self, call: &ActionCall) -> Result<(), DriverError> {
        let result = self.route(call);
        let outcome = match &result {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Failure {
                message: e.to_string(),
            },
        };
        debug!(
            step = ?self.step,
            attempt = self.attempt,
            call = %call,
            ok = result.is_ok(),
            "adapter call"
        );
        self.actions.push(Action {
            step: self.step,
            attempt: self.attempt,
            call: call.clone(),
            outcome,
        });
        result
    }

    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                let base = base.trim_end_matches('/');
                if url.starts_with('/') {
                    format!("{base}{url}")
                } else {
                    format!("{base}/{url}")
                }
            }
            _ => url.to_string(),
        }
    }

    fn route(&mut self, call: &ActionCall) -> Result<(), DriverError> {
        match call.kind {
            ActionKind::Navigate => {
                let url = self.resolve_url(text_arg(call, 0)?);
                self.engine.navigate(&url)
            }
            ActionKind::Fill => self.engine.fill(target(call)?, text_arg(call, 0)?),
            ActionKind::Click => self.engine.click(target(call)?),
            ActionKind::SelectOption => self.engine.select(target(call)?, text_arg(call, 0)?),
            ActionKind::Hover => self.engine.hover(target(call)?),
            ActionKind::Drag => {
                let destination = call.destination.as_ref().ok_or_else(|| missing(call, "drop target"))?;
                self.engine.drag(target(call)?, destination)
            }
            ActionKind::Upload => match call.value(0) {
                Some(ArgValue::List(files)) => self.engine.upload(target(call)?, files),
                Some(ArgValue::Text(file)) => {
                    self.engine.upload(target(call)?, std::slice::from_ref(file))
                }
                _ => Err(missing(call, "file list")),
            },
            ActionKind::HandleDialog => {
                let action = DialogAction::parse(text_arg(call, 0)?)
                    .ok_or_else(|| missing(call, "accept or dismiss"))?;
                self.engine.handle_dialog(action)
            }
            ActionKind::PressKey => {
                self.engine.press_key(call.target.as_ref(), text_arg(call, 0)?)
            }
            ActionKind::Wait => {
                let condition = wait_condition(call)?;
                self.engine.wait(&condition)
            }
            ActionKind::VerifyVisible => {
                let locator = target(call)?;
                let seen = self.engine.verify_visible(locator)?;
                check(seen, "visible", locator, "element is not visible".to_string())
            }
            ActionKind::VerifyText => {
                let locator = target(call)?;
                let expected = text_arg(call, 0)?;
                let seen = self.engine.verify_text(locator, expected)?;
                check(seen, "text", locator, format!("expected text containing '{expected}'"))
            }
            ActionKind::VerifyValue => {
                let locator = target(call)?;
                let expected = text_arg(call, 0)?;
                let seen = self.engine.verify_value(locator, expected)?;
                check(seen, "value", locator, format!("expected value '{expected}'"))
            }
        }
    }

    // Typed entry points. Each builds an unparameterized call and dispatches it.

    /// Load a URL
    pub fn navigate(&mut self, page: &str, url: &str) -> Result<(), DriverError> {
        self.dispatch(&ActionCall::new(ActionKind::Navigate, page).arg(text(url)))
    }

    /// Type into a field
    pub fn fill(&mut self, page: &str, locator: &Locator, value: &str) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::Fill, page, locator).arg(text(value)))
    }

    /// Click an element
    pub fn click(&mut self, page: &str, locator: &Locator) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::Click, page, locator))
    }

    /// Choose an option
    pub fn select_option(&mut self, page: &str, locator: &Locator, value: &str) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::SelectOption, page, locator).arg(text(value)))
    }

    /// Assert visibility
    pub fn verify_visible(&mut self, page: &str, locator: &Locator) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::VerifyVisible, page, locator))
    }

    /// Assert text content
    pub fn verify_text(&mut self, page: &str, locator: &Locator, expected: &str) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::VerifyText, page, locator).arg(text(expected)))
    }

    /// Assert input value
    pub fn verify_value(&mut self, page: &str, locator: &Locator, expected: &str) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::VerifyValue, page, locator).arg(text(expected)))
    }

    /// Hover
    pub fn hover(&mut self, page: &str, locator: &Locator) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::Hover, page, locator))
    }

    /// Drag onto another element
    pub fn drag(&mut self, page: &str, source: &Locator, target: &Locator) -> Result<(), DriverError> {
        self.dispatch(&on(ActionKind::Drag, page, source).onto(target.clone()))
    }

    /// Upload files
    pub fn upload(&mut self, page: &str, locator: &Locator, files: &[String]) -> Result<(), DriverError> {
        let call = on(ActionKind::Upload, page, locator)
            .arg(ActionArg::literal(ArgValue::List(files.to_vec())));
        self.dispatch(&call)
    }

    /// Accept or dismiss a dialog
    pub fn handle_dialog(&mut self, page: &str, action: DialogAction) -> Result<(), DriverError> {
        self.dispatch(&ActionCall::new(ActionKind::HandleDialog, page).arg(text(action.as_str())))
    }

    /// Press a key
    pub fn press_key(&mut self, page: &str, locator: Option<&Locator>, key: &str) -> Result<(), DriverError> {
        let mut call = ActionCall::new(ActionKind::PressKey, page).arg(text(key));
        call.target = locator.cloned();
        self.dispatch(&call)
    }

    /// Wait for a condition
    pub fn wait(&mut self, page: &str, condition: &WaitCondition) -> Result<(), DriverError> {
        let call = match condition {
            WaitCondition::Visible(l) => on(ActionKind::Wait, page, l).arg(text("visible")),
            WaitCondition::Hidden(l) => on(ActionKind::Wait, page, l).arg(text("hidden")),
            WaitCondition::Timeout { ms } => {
                ActionCall::new(ActionKind::Wait, page).arg(ActionArg::literal(ArgValue::Number(*ms)))
            }
        };
        self.dispatch(&call)
    }
}

fn text(value: &str) -> ActionArg {
    ActionArg::literal(ArgValue::Text(value.to_string()))
}

fn on(kind: ActionKind, page: &str, locator: &Locator) -> ActionCall {
    ActionCall::new(kind, page).on(locator.clone())
}

fn missing(call: &ActionCall, what: &str) -> DriverError {
    DriverError::Engine {
        message: format!("{} is missing its {what}", call.kind),
    }
}

fn target(call: &ActionCall) -> Result<&Locator, DriverError> {
    call.target.as_ref().ok_or_else(|| missing(call, "target"))
}

fn text_arg(call: &ActionCall, index: usize) -> Result<&str, DriverError> {
    call.value(index)
        .and_then(ArgValue::as_text)
        .ok_or_else(|| missing(call, "text argument"))
}

/// Wait calls carry either a number of milliseconds or a target plus
/// `visible` / `hidden`.
pub(crate) fn wait_condition(call: &ActionCall) -> Result<WaitCondition, DriverError> {
    match (call.target.as_ref(), call.value(0)) {
        (None, Some(ArgValue::Number(ms))) => Ok(WaitCondition::Timeout { ms: *ms }),
        (Some(l), Some(ArgValue::Text(state))) if state == "visible" => {
            Ok(WaitCondition::Visible(l.clone()))
        }
        (Some(l), Some(ArgValue::Text(state))) if state == "hidden" => {
            Ok(WaitCondition::Hidden(l.clone()))
        }
        _ => Err(missing(call, "wait condition")),
    }
}

fn check(seen: bool, what: &str, locator: &Locator, detail: String) -> Result<(), DriverError> {
    if seen {
        Ok(())
    } else {
        Err(DriverError::VerificationFailed {
            check: what.to_string(),
            locator: locator.name.clone(),
            detail,
        })
    }
}
