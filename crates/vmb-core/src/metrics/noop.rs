use crate::metrics::backend::{MetricsBackend, StepOutcome};

/// Metrics backend that discards everything; the runners' default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_step_started(&self, _: &str) {}

    #[inline(always)]
    fn record_step_completed(&self, _: &str, _: StepOutcome, _: u64) {}

    #[inline(always)]
    fn record_cleanup_error(&self, _: &str) {}
}
