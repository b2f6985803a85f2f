//! Step contract driven by the runners.
//!
//! A step is one provisioning action split into two phases: `run` applies the
//! effect, `cleanup` undoes it. The runner never needs to know what a step
//! does, only that every started step gets exactly one `cleanup` call.
use async_trait::async_trait;

use crate::{error::StepError, metrics::StepOutcome, state::StateBag};

/// Result of a single [`Step::run`] invocation.
///
/// Carries the error together with the decision to stop, so "failed" can
/// never be signalled without also stopping the pipeline.
#[derive(Debug)]
pub enum StepAction {
    /// Proceed to the next step.
    Continue,
    /// Stop the pipeline on purpose; not an error.
    Halt,
    /// Stop the pipeline because the step failed.
    Fail(StepError),
}

impl StepAction {
    pub fn outcome(&self) -> StepOutcome {
        match self {
            StepAction::Continue => StepOutcome::Continue,
            StepAction::Halt => StepOutcome::Halt,
            StepAction::Fail(_) => StepOutcome::Fail,
        }
    }
}

impl From<Result<(), StepError>> for StepAction {
    fn from(r: Result<(), StepError>) -> Self {
        match r {
            Ok(()) => StepAction::Continue,
            Err(e) => StepAction::Fail(e),
        }
    }
}

#[async_trait]
pub trait Step: Send + Sync {
    /// Step name used in logs, spans and metrics.
    fn name(&self) -> &'static str;

    /// Apply the step's effect.
    ///
    /// Must not panic: every failure is reported as [`StepAction::Fail`].
    async fn run(&self, state: &StateBag) -> StepAction;

    /// Best-effort reversal of whatever `run` created.
    ///
    /// Called once, after the runner stopped advancing, only if `run` was
    /// called. Must cope with a `run` that failed half way. Errors are logged
    /// by the runner and never stop the remaining cleanups.
    async fn cleanup(&self, _state: &StateBag) -> Result<(), StepError> {
        Ok(())
    }
}
