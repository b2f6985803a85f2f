use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use vmb_core::{DvdController, StateBag, Step, StepAction, StepError, keys};

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Attaches each extra ISO image (drivers, tools) as its own DVD drive.
///
/// The controller list is stored after every successful mount, so a failure
/// half way leaves exactly the attached drives for cleanup to detach.
#[derive(Debug, Default)]
pub struct StepMountSecondaryDvds {
    pub images: Vec<PathBuf>,
}

impl StepMountSecondaryDvds {
    async fn mount(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let vm = vm_name(state)?;
        let mut controllers: Vec<DvdController> = Vec::with_capacity(self.images.len());

        for image in &self.images {
            h.ui.message(&format!("Mounting secondary dvd {}", image.display()));
            let controller = h
                .driver
                .mount_dvd(&vm, image)
                .await
                .map_err(|e| StepError::driver(format!("error mounting secondary dvd {}", image.display()), e))?;

            debug!(vm = %vm, image = %image.display(), controller = %controller, "secondary dvd attached");
            controllers.push(controller);
            state.put(keys::SECONDARY_DVD_CONTROLLERS, controllers.clone());
        }
        Ok(())
    }
}

/// Detach every controller listed under [`keys::SECONDARY_DVD_CONTROLLERS`].
///
/// Detached drives are dropped from the list as they go, so a failure leaves
/// only the remaining ones behind.
pub(crate) async fn detach_secondary(h: &Handles, vm: &str, state: &StateBag) -> Result<(), StepError> {
    let Some(mut controllers) = state.get_ok::<Vec<DvdController>>(keys::SECONDARY_DVD_CONTROLLERS) else {
        return Ok(());
    };

    while let Some(controller) = controllers.pop() {
        h.driver
            .unmount_dvd(vm, controller)
            .await
            .map_err(|e| StepError::driver("error unmounting secondary dvd", e))?;
        state.put(keys::SECONDARY_DVD_CONTROLLERS, controllers.clone());
    }
    state.remove(keys::SECONDARY_DVD_CONTROLLERS);
    Ok(())
}

#[async_trait]
impl Step for StepMountSecondaryDvds {
    fn name(&self) -> &'static str {
        "mount_secondary_dvds"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        if self.images.is_empty() {
            return StepAction::Continue;
        }
        let h = handles_or_fail!(state);
        h.ui.say("Mounting secondary dvd images...");

        finish(&*h.ui, self.mount(&h, state).await)
    }

    /// Detaches what [`crate::step::StepUnmountMedia`] has not already.
    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        if !state.contains(keys::SECONDARY_DVD_CONTROLLERS) {
            return Ok(());
        }
        let h = Handles::from_state(state)?;
        let vm = vm_name(state)?;
        h.ui.say("Unmounting secondary dvd images...");

        detach_secondary(&h, &vm, state).await
    }
}
