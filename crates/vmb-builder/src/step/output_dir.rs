use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tracing::info;
use vmb_core::{StateBag, Step, StepAction, StepError};

use crate::step::fail;

/// Prepares the directory the machine is exported into.
///
/// An existing directory halts the build unless `force` is set, in which case
/// it is replaced. If the build does not complete, the directory created here
/// is removed again.
#[derive(Debug)]
pub struct StepOutputDir {
    pub path: PathBuf,
    pub force: bool,
    created: AtomicBool,
}

impl StepOutputDir {
    pub fn new(path: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            path: path.into(),
            force,
            created: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Step for StepOutputDir {
    fn name(&self) -> &'static str {
        "output_dir"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let ui = match state.ui() {
            Ok(ui) => ui,
            Err(e) => return StepAction::Fail(e.into()),
        };
        ui.say("Configuring output directory...");

        let display = self.path.display().to_string();
        let exists = match tokio::fs::try_exists(&self.path).await {
            Ok(exists) => exists,
            Err(e) => return fail(&*ui, StepError::io(format!("error inspecting {display}"), &e)),
        };
        if exists {
            if !self.force {
                ui.error(&format!(
                    "Output directory exists: {display}. Use force to delete it prior to building."
                ));
                return StepAction::Halt;
            }
            ui.message(&format!("Deleting previous output directory {display}"));
            if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
                return fail(&*ui, StepError::io(format!("error deleting {display}"), &e));
            }
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.path).await {
            return fail(&*ui, StepError::io(format!("error creating {display}"), &e));
        }
        self.created.store(true, Ordering::Release);
        StepAction::Continue
    }

    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        if !self.created.load(Ordering::Acquire) {
            return Ok(());
        }
        // A completed build keeps its output.
        if !state.is_cancelled() && !state.is_halted() {
            return Ok(());
        }

        info!(dir = %self.path.display(), "removing output directory of unfinished build");
        if let Ok(ui) = state.ui() {
            ui.say("Deleting output directory...");
        }
        tokio::fs::remove_dir_all(&self.path)
            .await
            .map_err(|e| StepError::io(format!("error deleting {}", self.path.display()), &e))
    }
}
