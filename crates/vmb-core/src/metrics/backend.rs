use std::sync::Arc;

/// Step execution outcome for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step returned `Continue`.
    Continue,
    /// Step halted the pipeline without an error.
    Halt,
    /// Step failed.
    Fail,
}

impl StepOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            StepOutcome::Continue => "continue",
            StepOutcome::Halt => "halt",
            StepOutcome::Fail => "fail",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are attached to a runner and called around every step.
/// Labels are step names, which form a small fixed set per pipeline.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that the runner is about to call `run` on a step.
    fn record_step_started(&self, step: &str);
    /// Record how a step's `run` ended and how long it took.
    ///
    /// # Arguments
    /// - `step`: step name
    /// - `outcome`: what the step returned
    /// - `duration_ms`: wall-clock time spent in `run`
    fn record_step_completed(&self, step: &str, outcome: StepOutcome, duration_ms: u64);
    /// Record a failed `cleanup`.
    ///
    /// Cleanup failures never stop the pipeline, so this is the only place
    /// they are counted.
    fn record_cleanup_error(&self, step: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
