use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use vmb_core::{StateBag, Step, StepAction, StepError, keys};

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Exports the powered-off machine into the output directory.
#[derive(Debug)]
pub struct StepExport {
    pub output_dir: PathBuf,
}

impl StepExport {
    async fn export(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let vm = vm_name(state)?;
        h.driver
            .export_vm(&vm, &self.output_dir)
            .await
            .map_err(|e| StepError::driver("error exporting virtual machine", e))?;

        info!(vm = %vm, dir = %self.output_dir.display(), "virtual machine exported");
        state.put(keys::EXPORT_PATH, self.output_dir.clone());
        Ok(())
    }
}

#[async_trait]
impl Step for StepExport {
    fn name(&self) -> &'static str {
        "export"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say("Exporting virtual machine...");

        finish(&*h.ui, self.export(&h, state).await)
    }
}
