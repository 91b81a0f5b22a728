//! Scenario execution state machine.
//!
//! ```text
//! Idle -> Setup -> Running(1) -> ... -> Running(n) -> Completed
//!           \           \                    \
//!            +-----------+--------------------+----> Failed
//! ```
//!
//! Each planned call is dispatched through the [`SessionAdapter`]. A failing
//! call is retried once after the configured backoff; the second failure
//! ends the run. The cancellation token is checked before every call.

use crate::action::ExecutionLog;
use crate::adapter::SessionAdapter;
use crate::driver::{AutomationEngine, DriverError};
use crate::planner::ScenarioPlan;
use crate::result::{PlanwrightError, PlanwrightResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create an uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check for cancellation
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Executor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Not started
    Idle,
    /// Loading the start page
    Setup,
    /// Running a step
    Running(usize),
    /// Every step succeeded
    Completed,
    /// Stopped on an error
    Failed,
}

impl ExecutorState {
    /// Check for a terminal state
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Runs one scenario plan against one engine session
#[derive(Debug)]
pub struct ScenarioExecutor<E> {
    adapter: SessionAdapter<E>,
    backoff: Duration,
    cancel: CancellationToken,
    state: ExecutorState,
}

impl<E: AutomationEngine> ScenarioExecutor<E> {
    /// Create an executor
    pub fn new(adapter: SessionAdapter<E>) -> Self {
        Self {
            adapter,
            backoff: Duration::from_millis(250),
            cancel: CancellationToken::new(),
            state: ExecutorState::Idle,
        }
    }

    /// Set the retry backoff
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Share a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> ExecutorState {
        self.state
    }

    /// Borrow the adapter
    #[must_use]
    pub const fn adapter(&self) -> &SessionAdapter<E> {
        &self.adapter
    }

    /// Unwrap the adapter
    pub fn into_adapter(self) -> SessionAdapter<E> {
        self.adapter
    }

    /// Run setup and every step, returning the finished log
    pub fn run(&mut self, plan: &ScenarioPlan) -> PlanwrightResult<ExecutionLog> {
        if self.state != ExecutorState::Idle {
            return Err(PlanwrightError::invalid_state(format!(
                "executor cannot run from {:?}",
                self.state
            )));
        }
        let result = self.run_inner(plan);
        self.state = if result.is_ok() {
            ExecutorState::Completed
        } else {
            ExecutorState::Failed
        };
        result.map(|()| self.adapter.read_log())
    }

    fn run_inner(&mut self, plan: &ScenarioPlan) -> PlanwrightResult<()> {
        self.state = ExecutorState::Setup;
        self.adapter.reset();
        let setup = &plan.setup;
        info!(page = %setup.page, url = %setup.url, "scenario setup");
        self.with_retry(None, |adapter| adapter.page_init(&setup.page, &setup.url))
            .map_err(|e| match e {
                Failure::Cancelled => PlanwrightError::Cancelled { step: None },
                Failure::Driver(source) => PlanwrightError::Setup { source },
            })?;

        for step in &plan.steps {
            self.state = ExecutorState::Running(step.ordinal);
            debug!(step = step.ordinal, intent = %step.intent, "running step");
            for call in &step.calls {
                self.with_retry(Some(step.ordinal), |adapter| adapter.dispatch(call))
                    .map_err(|e| match e {
                        Failure::Cancelled => PlanwrightError::Cancelled {
                            step: Some(step.ordinal),
                        },
                        Failure::Driver(source) => PlanwrightError::Driver {
                            step: step.ordinal,
                            source,
                        },
                    })?;
            }
        }
        info!(steps = plan.steps.len(), calls = self.adapter.read_log().len(), "scenario completed");
        Ok(())
    }

    fn with_retry(
        &mut self,
        step: Option<usize>,
        mut call: impl FnMut(&mut SessionAdapter<E>) -> Result<(), DriverError>,
    ) -> Result<(), Failure> {
        if self.cancel.is_cancelled() {
            return Err(Failure::Cancelled);
        }
        self.adapter.begin_step(step, 1);
        let Err(first) = call(&mut self.adapter) else {
            return Ok(());
        };
        warn!(step = ?step, error = %first, backoff = ?self.backoff, "call failed, retrying once");
        if !self.backoff.is_zero() {
            std::thread::sleep(self.backoff);
        }
        if self.cancel.is_cancelled() {
            return Err(Failure::Cancelled);
        }
        self.adapter.begin_step(step, 2);
        call(&mut self.adapter).map_err(Failure::Driver)
    }
}

enum Failure {
    Cancelled,
    Driver(DriverError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::{ActionCall, ActionKind};
    use crate::driver::MockEngine;
    use crate::locator::{Locator, Strategy};
    use crate::planner::{PageSetup, PlannedStep};

    fn button() -> Locator {
        Locator::new("saveButton", Strategy::role("button", "Save"))
    }

    fn plan(steps: usize) -> ScenarioPlan {
        ScenarioPlan {
            setup: PageSetup {
                page: "HomePage".into(),
                url: "/".into(),
            },
            steps: (1..=steps)
                .map(|ordinal| PlannedStep {
                    ordinal,
                    intent: format!("Click save {ordinal}"),
                    calls: vec![ActionCall::new(ActionKind::Click, "HomePage").on(button())],
                })
                .collect(),
            pages: vec!["HomePage".into()],
        }
    }

    fn executor(engine: MockEngine) -> ScenarioExecutor<MockEngine> {
        ScenarioExecutor::new(SessionAdapter::new(engine).with_base_url("http://localhost"))
            .with_backoff(Duration::ZERO)
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_completed_run() {
            let mut exec = executor(MockEngine::new().with_element("saveButton"));
            let log = exec.run(&plan(2)).unwrap();
            assert_eq!(exec.state(), ExecutorState::Completed);
            assert_eq!(log.len(), 3);
            assert_eq!(log.first().unwrap().step, None);
            assert_eq!(log.last().unwrap().step, Some(2));
        }

        #[test]
        fn test_terminal_state_rejects_rerun() {
            let mut exec = executor(MockEngine::permissive());
            exec.run(&plan(1)).unwrap();
            assert!(exec.state().is_terminal());
            assert!(matches!(
                exec.run(&plan(1)),
                Err(PlanwrightError::InvalidState { .. })
            ));
        }
    }

    mod retry_tests {
        use super::*;

        #[test]
        fn test_single_failure_is_retried() {
            let engine = MockEngine::new().with_element("saveButton").failing("saveButton", 1);
            let mut exec = executor(engine);
            let log = exec.run(&plan(1)).unwrap();
            assert_eq!(log.len(), 3);
            assert_eq!(log.actions()[2].attempt, 2);
            assert_eq!(log.successful_for_step(1).count(), 1);
        }

        #[test]
        fn test_second_failure_fails_step() {
            let engine = MockEngine::new().with_element("saveButton").failing("saveButton", 2);
            let mut exec = executor(engine);
            match exec.run(&plan(2)).unwrap_err() {
                PlanwrightError::Driver { step, source } => {
                    assert_eq!(step, 1);
                    assert_eq!(source, DriverError::Timeout { ms: 5000 });
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(exec.state(), ExecutorState::Failed);
            assert_eq!(exec.adapter().read_log().len(), 3);
        }

        #[test]
        fn test_setup_failure() {
            let mut exec = executor(MockEngine::permissive().failing_navigation(2));
            assert!(matches!(
                exec.run(&plan(1)),
                Err(PlanwrightError::Setup { .. })
            ));
            assert_eq!(exec.state(), ExecutorState::Failed);
        }
    }

    mod cancellation_tests {
        use super::*;

        #[test]
        fn test_cancelled_before_setup() {
            let token = CancellationToken::new();
            token.cancel();
            let mut exec = executor(MockEngine::permissive()).with_cancellation(token);
            assert!(matches!(
                exec.run(&plan(1)),
                Err(PlanwrightError::Cancelled { step: None })
            ));
            assert!(exec.adapter().read_log().is_empty());
        }

        #[test]
        fn test_token_is_shared() {
            let token = CancellationToken::new();
            let clone = token.clone();
            clone.cancel();
            assert!(token.is_cancelled());
        }
    }
}
