use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder, proto::MetricFamily,
};

use vmb_core::{MetricsBackend, StepOutcome};

/// Step-level metrics for one or more builds.
///
/// Label cardinality is bounded by the pipeline: `step` is a fixed step name,
/// `outcome` is one of `continue`, `halt`, `fail`.
#[derive(Clone)]
pub struct PrometheusMetrics {
    steps_started: CounterVec,
    steps_completed: CounterVec,
    step_duration: HistogramVec,
    cleanup_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register the step metrics in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let steps_started = CounterVec::new(
            Opts::new("vmb_steps_started_total", "Steps whose run was invoked"),
            &["step"],
        )?;
        registry.register(Box::new(steps_started.clone()))?;

        let steps_completed = CounterVec::new(
            Opts::new("vmb_steps_completed_total", "Steps whose run returned, by outcome"),
            &["step", "outcome"],
        )?;
        registry.register(Box::new(steps_completed.clone()))?;

        // Provisioning steps range from milliseconds to tens of minutes.
        let step_duration = HistogramVec::new(
            HistogramOpts::new("vmb_step_duration_seconds", "Step run duration in seconds")
                .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0]),
            &["step"],
        )?;
        registry.register(Box::new(step_duration.clone()))?;

        let cleanup_errors = CounterVec::new(
            Opts::new("vmb_cleanup_errors_total", "Failed step cleanups"),
            &["step"],
        )?;
        registry.register(Box::new(cleanup_errors.clone()))?;

        Ok(Self {
            steps_started,
            steps_completed,
            step_duration,
            cleanup_errors,
            registry,
        })
    }

    /// Backend with a private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_step_started(&self, step: &str) {
        self.steps_started.with_label_values(&[step]).inc();
    }

    fn record_step_completed(&self, step: &str, outcome: StepOutcome, duration_ms: u64) {
        self.steps_completed
            .with_label_values(&[step, outcome.as_label()])
            .inc();
        self.step_duration
            .with_label_values(&[step])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_cleanup_error(&self, step: &str) {
        self.cleanup_errors.with_label_values(&[step]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("metric {name} not found"))
    }

    #[test]
    fn started_counter_has_one_series_per_step() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_step_started("create_vm");
        metrics.record_step_started("create_vm");
        metrics.record_step_started("start_vm");

        let families = metrics.gather();
        assert_eq!(family(&families, "vmb_steps_started_total").get_metric().len(), 2);
    }

    #[test]
    fn completion_feeds_counter_and_histogram() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_step_completed("configure_ip", StepOutcome::Continue, 1_500);
        metrics.record_step_completed("configure_ip", StepOutcome::Fail, 20);

        let families = metrics.gather();
        assert_eq!(family(&families, "vmb_steps_completed_total").get_metric().len(), 2);

        assert_eq!(family(&families, "vmb_step_duration_seconds").get_metric().len(), 1);
    }

    #[test]
    fn cleanup_errors_and_text_output() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_cleanup_error("create_switch");

        let text = metrics.encode_text().unwrap();
        assert!(text.contains(r#"vmb_cleanup_errors_total{step="create_switch"} 1"#), "{text}");
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = Arc::new(Registry::new());
        assert!(PrometheusMetrics::new_with_registry(registry.clone()).is_ok());
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
