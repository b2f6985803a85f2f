use std::path::PathBuf;

use async_trait::async_trait;
use vmb_core::{DvdController, StateBag, Step, StepAction, StepError, keys};

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Attaches the installation ISO as a DVD drive.
#[derive(Debug)]
pub struct StepMountDvd {
    pub iso_path: PathBuf,
}

impl StepMountDvd {
    async fn mount(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let vm = vm_name(state)?;
        let controller = h
            .driver
            .mount_dvd(&vm, &self.iso_path)
            .await
            .map_err(|e| StepError::driver("error mounting dvd drive", e))?;

        h.ui.message(&format!("ISO attached to DVD controller {controller}"));
        state.put(keys::DVD_CONTROLLER, controller);
        Ok(())
    }
}

#[async_trait]
impl Step for StepMountDvd {
    fn name(&self) -> &'static str {
        "mount_dvd"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say("Mounting dvd drive...");

        finish(&*h.ui, self.mount(&h, state).await)
    }

    /// Detaches the drive unless [`crate::step::StepUnmountMedia`] already did.
    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        let Some(controller) = state.get_ok::<DvdController>(keys::DVD_CONTROLLER) else {
            return Ok(());
        };
        let h = Handles::from_state(state)?;
        let vm = vm_name(state)?;
        h.ui.say("Unmounting dvd drive...");

        h.driver
            .unmount_dvd(&vm, controller)
            .await
            .map_err(|e| StepError::driver("error unmounting dvd drive", e))?;
        state.remove(keys::DVD_CONTROLLER);
        Ok(())
    }
}
