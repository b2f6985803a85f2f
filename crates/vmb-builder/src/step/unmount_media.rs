use async_trait::async_trait;
use vmb_core::{DvdController, StateBag, Step, StepAction, StepError, keys};

use crate::step::{Handles, finish, handles_or_fail, mount_secondary_dvds::detach_secondary, vm_name};

/// Detaches secondary DVDs, the floppy and the installation DVD once the
/// guest is off, before export.
///
/// Clears the keys the mount steps left behind so their cleanups do not
/// detach the media a second time.
#[derive(Debug, Default)]
pub struct StepUnmountMedia;

impl StepUnmountMedia {
    async fn detach(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let vm = vm_name(state)?;

        if state.contains(keys::SECONDARY_DVD_CONTROLLERS) {
            h.ui.message("Unmounting secondary dvd drives...");
            detach_secondary(h, &vm, state).await?;
        }

        if state.contains(keys::FLOPPY_ATTACHED) {
            h.ui.message("Unmounting floppy drive...");
            h.driver
                .unmount_floppy(&vm)
                .await
                .map_err(|e| StepError::driver("error unmounting floppy drive", e))?;
            state.remove(keys::FLOPPY_ATTACHED);
        }

        if let Some(controller) = state.get_ok::<DvdController>(keys::DVD_CONTROLLER) {
            h.ui.message("Unmounting dvd drive...");
            h.driver
                .unmount_dvd(&vm, controller)
                .await
                .map_err(|e| StepError::driver("error unmounting dvd drive", e))?;
            state.remove(keys::DVD_CONTROLLER);
        }
        Ok(())
    }
}

#[async_trait]
impl Step for StepUnmountMedia {
    fn name(&self) -> &'static str {
        "unmount_media"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say("Detaching installation media...");

        finish(&*h.ui, self.detach(&h, state).await)
    }
}
