use async_trait::async_trait;
use vmb_core::{StateBag, Step, StepAction, StepError};

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Boots the VM; stops it again on cleanup if it is still running.
#[derive(Debug, Default)]
pub struct StepStartVm;

#[async_trait]
impl Step for StepStartVm {
    fn name(&self) -> &'static str {
        "start_vm"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say("Starting the virtual machine...");

        let res = async {
            let vm = vm_name(state)?;
            h.driver
                .start_vm(&vm)
                .await
                .map_err(|e| StepError::driver("error starting virtual machine", e))
        }
        .await;
        finish(&*h.ui, res)
    }

    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        let h = Handles::from_state(state)?;
        let vm = vm_name(state)?;

        let running = h
            .driver
            .is_running(&vm)
            .await
            .map_err(|e| StepError::driver("error querying virtual machine state", e))?;
        if !running {
            return Ok(());
        }

        h.ui.say("Stopping the virtual machine...");
        h.driver
            .stop_vm(&vm)
            .await
            .map_err(|e| StepError::driver("error stopping virtual machine", e))
    }
}
