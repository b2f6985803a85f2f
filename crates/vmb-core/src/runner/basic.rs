use std::{fmt, sync::atomic::AtomicBool};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    metrics::{MetricsHandle, noop_metrics},
    runner::{Runner, drive::Drive, run_once, step_names},
    state::StateBag,
    step::Step,
};

/// Runs every step in order without interruption.
pub struct BasicRunner {
    steps: Vec<Box<dyn Step>>,
    cancel: CancellationToken,
    metrics: MetricsHandle,
    used: AtomicBool,
}

impl BasicRunner {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            steps,
            cancel: CancellationToken::new(),
            metrics: noop_metrics(),
            used: AtomicBool::new(false),
        }
    }

    /// Attach a metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Observe an externally owned token instead of a private one.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

#[async_trait]
impl Runner for BasicRunner {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn run(&self, state: &StateBag) {
        let drive = Drive {
            steps: &self.steps,
            cancel: &self.cancel,
            metrics: &self.metrics,
            pause: None,
        };
        run_once(self.name(), &self.used, drive, state).await;
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl fmt::Debug for BasicRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicRunner")
            .field("steps", &step_names(&self.steps))
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
