//! Metrics collection abstraction for step runners.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are attached with `with_metrics` on a runner.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, StepOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
