use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vmb_core::{
    BasicRunner, BuildOutcome, CommunicatorHandle, DebugPause, DebugRunner, DriverHandle, MetricsHandle, Runner,
    StateBag, StdinPause, UiHandle, keys, noop_metrics,
};
use vmb_model::BuildConfig;

use crate::{Artifact, BuildError, pipeline};

/// Entry point of one image build.
///
/// ```rust,ignore
/// vmb_observe::init_logger(&LoggerConfig::default())?;
/// let builder = Builder::new(BuildConfig::from_path("build.json")?)?;
/// let artifact = builder.run(driver, Arc::new(TracingUi), Some(communicator)).await?;
/// println!("{artifact}");
/// ```
pub struct Builder {
    config: BuildConfig,
    debug: bool,
    pause: Option<Arc<dyn DebugPause>>,
    metrics: MetricsHandle,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("debug", &self.debug)
            .field("pause", &self.pause.is_some())
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// Validate `config` and prepare a builder for it.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            config,
            debug: false,
            pause: None,
            metrics: noop_metrics(),
            cancel: CancellationToken::new(),
        })
    }

    /// Pause between steps; prompts on stdin unless a hook is given with [`Builder::with_pause`].
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable debug mode with a custom pause hook.
    pub fn with_pause(mut self, pause: Arc<dyn DebugPause>) -> Self {
        self.debug = true;
        self.pause = Some(pause);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Request cancellation; honored before the next step starts.
    pub fn cancel(&self) {
        info!("cancelling the step runner");
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the whole pipeline and return the exported machine.
    ///
    /// Every started step is cleaned up before this returns, whatever the outcome.
    pub async fn run(
        &self,
        driver: DriverHandle,
        ui: UiHandle,
        communicator: Option<CommunicatorHandle>,
    ) -> Result<Artifact, BuildError> {
        let state = StateBag::new();
        state.put(keys::DRIVER, driver);
        state.put(keys::UI, ui);
        if let Some(comm) = communicator {
            state.put(keys::COMMUNICATOR, comm);
        }

        let runner = self.runner();
        info!(vm = %self.config.vm_name, runner = runner.name(), "starting build");
        runner.run(&state).await;

        match state.outcome() {
            BuildOutcome::Failed(e) => Err(BuildError::Failed(e)),
            BuildOutcome::Cancelled => Err(BuildError::Cancelled),
            BuildOutcome::Halted => Err(BuildError::Halted),
            BuildOutcome::Completed => {
                let dir = &self.config.output_directory;
                match Artifact::from_dir(dir).await {
                    Ok(artifact) if !artifact.is_empty() => Ok(artifact),
                    Ok(_) => Err(BuildError::MissingArtifact(dir.clone())),
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "cannot read output directory");
                        Err(BuildError::MissingArtifact(dir.clone()))
                    }
                }
            }
        }
    }

    fn runner(&self) -> Box<dyn Runner> {
        let steps = pipeline::steps(&self.config);
        if self.debug {
            let runner = match &self.pause {
                Some(pause) => DebugRunner::with_pause(steps, pause.clone()),
                None => DebugRunner::with_pause(steps, StdinPause::new()),
            };
            Box::new(
                runner
                    .with_metrics(self.metrics.clone())
                    .with_cancel_token(self.cancel.clone()),
            )
        } else {
            Box::new(
                BasicRunner::new(steps)
                    .with_metrics(self.metrics.clone())
                    .with_cancel_token(self.cancel.clone()),
            )
        }
    }
}
