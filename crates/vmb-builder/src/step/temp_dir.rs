use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;
use vmb_core::{StateBag, Step, StepAction, StepError, keys};

use crate::step::finish;

/// Creates the per-build scratch directory the VM files live in.
#[derive(Debug, Default)]
pub struct StepCreateTempDir {
    /// Parent directory; the system temp dir when `None`.
    pub parent: Option<PathBuf>,
}

impl StepCreateTempDir {
    async fn create(&self, state: &StateBag) -> Result<(), StepError> {
        let parent = self.parent.clone().unwrap_or_else(std::env::temp_dir);
        let dir = parent.join(format!("vmb-{}", Uuid::new_v4()));

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StepError::io(format!("error creating temporary directory {}", dir.display()), &e))?;

        debug!(dir = %dir.display(), "temporary directory created");
        state.put(keys::TEMP_DIR, dir);
        Ok(())
    }
}

#[async_trait]
impl Step for StepCreateTempDir {
    fn name(&self) -> &'static str {
        "create_temp_dir"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let ui = match state.ui() {
            Ok(ui) => ui,
            Err(e) => return StepAction::Fail(e.into()),
        };
        ui.say("Creating temporary directory...");

        finish(&*ui, self.create(state).await)
    }

    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        let Some(dir) = state.get_ok::<PathBuf>(keys::TEMP_DIR) else {
            return Ok(());
        };
        if let Ok(ui) = state.ui() {
            ui.say("Deleting temporary directory...");
        }

        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| StepError::io(format!("error deleting temporary directory {}", dir.display()), &e))?;
        state.remove(keys::TEMP_DIR);
        Ok(())
    }
}
