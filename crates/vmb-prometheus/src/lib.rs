//! Prometheus implementation of [`vmb_core::MetricsBackend`].
//!
//! ```rust
//! use std::sync::Arc;
//! use vmb_core::BasicRunner;
//! use vmb_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let runner = BasicRunner::new(Vec::new()).with_metrics(Arc::new(metrics.clone()));
//! # let _ = runner;
//!
//! // after the build, e.g. push to a gateway or dump to a file
//! let text = metrics.encode_text()?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `vmb_steps_started_total{step}` - Counter
//! - `vmb_steps_completed_total{step, outcome}` - Counter
//! - `vmb_step_duration_seconds{step}` - Histogram
//! - `vmb_cleanup_errors_total{step}` - Counter
//!
//! No HTTP endpoint is provided; exposition is left to the embedding tool.
mod backend;
pub use backend::PrometheusMetrics;
