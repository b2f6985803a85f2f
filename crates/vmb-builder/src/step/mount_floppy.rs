use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vmb_core::{StateBag, Step, StepAction, StepError, keys};

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Attaches a floppy image when one is configured; otherwise a no-op.
#[derive(Debug, Default)]
pub struct StepMountFloppy {
    pub image: Option<PathBuf>,
}

impl StepMountFloppy {
    async fn mount(&self, image: &Path, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let vm = vm_name(state)?;
        h.driver
            .mount_floppy(&vm, image)
            .await
            .map_err(|e| StepError::driver("error mounting floppy drive", e))?;

        state.put(keys::FLOPPY_ATTACHED, image.to_path_buf());
        Ok(())
    }
}

#[async_trait]
impl Step for StepMountFloppy {
    fn name(&self) -> &'static str {
        "mount_floppy"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let Some(image) = &self.image else {
            return StepAction::Continue;
        };
        let h = handles_or_fail!(state);
        h.ui.say("Mounting floppy drive...");

        finish(&*h.ui, self.mount(image, &h, state).await)
    }

    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        if !state.contains(keys::FLOPPY_ATTACHED) {
            return Ok(());
        }
        let h = Handles::from_state(state)?;
        let vm = vm_name(state)?;
        h.ui.say("Unmounting floppy drive...");

        h.driver
            .unmount_floppy(&vm)
            .await
            .map_err(|e| StepError::driver("error unmounting floppy drive", e))?;
        state.remove(keys::FLOPPY_ATTACHED);
        Ok(())
    }
}
