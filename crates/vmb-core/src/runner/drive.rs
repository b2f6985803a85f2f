//! Driving loop shared by [`super::BasicRunner`] and [`super::DebugRunner`].
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    metrics::MetricsHandle,
    runner::debug::{DebugDecision, DebugPause, PauseLocation},
    state::StateBag,
    step::{Step, StepAction},
};

/// Everything one pass over the pipeline needs.
pub(crate) struct Drive<'a> {
    pub steps: &'a [Box<dyn Step>],
    pub cancel: &'a CancellationToken,
    pub metrics: &'a MetricsHandle,
    pub pause: Option<&'a dyn DebugPause>,
}

impl Drive<'_> {
    /// Advance through the steps, then unwind the ones that were started.
    ///
    /// The unwind runs no matter how the advance loop ended.
    pub async fn execute(&self, state: &StateBag) {
        let started = self.advance(state).await;
        self.unwind(state, &started).await;
    }

    /// Run steps in order; returns indices of the steps whose `run` was called.
    async fn advance(&self, state: &StateBag) -> Vec<usize> {
        let mut started = Vec::with_capacity(self.steps.len());
        let mut skip_next = false;

        for (idx, step) in self.steps.iter().enumerate() {
            let name = step.name();

            if self.cancel.is_cancelled() {
                info!(step = name, "cancellation requested; not starting further steps");
                state.mark_cancelled();
                break;
            }
            if std::mem::take(&mut skip_next) {
                info!(step = name, "step skipped by operator");
                continue;
            }

            started.push(idx);
            self.metrics.record_step_started(name);
            let t0 = Instant::now();

            let action = step
                .run(state)
                .instrument(info_span!("step", step = name))
                .await;

            let elapsed = t0.elapsed().as_millis() as u64;
            self.metrics
                .record_step_completed(name, action.outcome(), elapsed);

            match action {
                StepAction::Continue => {
                    debug!(step = name, elapsed_ms = elapsed, "step finished");
                }
                StepAction::Halt => {
                    info!(step = name, "step halted the pipeline");
                    state.mark_halted();
                    break;
                }
                StepAction::Fail(err) => {
                    error!(step = name, kind = err.kind(), error = %err, "step failed");
                    state.set_error(err);
                    state.mark_halted();
                    break;
                }
            }

            if let Some(pause) = self.pause {
                match pause.pause(PauseLocation::AfterRun, name, state).await {
                    DebugDecision::Continue => {}
                    DebugDecision::SkipNext => skip_next = true,
                    DebugDecision::Abort => {
                        info!(step = name, "pipeline aborted by operator");
                        state.mark_cancelled();
                        break;
                    }
                }
            }
        }
        started
    }

    /// Clean up started steps in reverse start order.
    ///
    /// A failing cleanup is logged and counted; the remaining ones still run.
    async fn unwind(&self, state: &StateBag, started: &[usize]) {
        for &idx in started.iter().rev() {
            let step = &self.steps[idx];
            let name = step.name();

            if let Some(pause) = self.pause {
                pause
                    .pause(PauseLocation::BeforeCleanup, name, state)
                    .await;
            }

            let res = step
                .cleanup(state)
                .instrument(info_span!("cleanup", step = name))
                .await;
            if let Err(e) = res {
                warn!(step = name, error = %e, "cleanup failed");
                self.metrics.record_cleanup_error(name);
            }
        }
    }
}
