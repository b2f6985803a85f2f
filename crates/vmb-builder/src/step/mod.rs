//! Provisioning steps, one per platform action.
//!
//! Every step follows the same failure convention: report the error to the
//! user through [`Ui`], then return [`StepAction::Fail`] so the runner records
//! it. Cleanups only reverse what their own `run` created.
mod configure_ip;
mod create_switch;
mod create_vm;
mod export;
mod mount_dvd;
mod mount_floppy;
mod mount_secondary_dvds;
mod output_dir;
mod shutdown;
mod start_vm;
mod temp_dir;
mod unmount_media;

pub use configure_ip::StepConfigureIp;
pub use create_switch::StepCreateSwitch;
pub use create_vm::StepCreateVm;
pub use export::StepExport;
pub use mount_dvd::StepMountDvd;
pub use mount_floppy::StepMountFloppy;
pub use mount_secondary_dvds::StepMountSecondaryDvds;
pub use output_dir::StepOutputDir;
pub use shutdown::StepShutdown;
pub use start_vm::StepStartVm;
pub use temp_dir::StepCreateTempDir;
pub use unmount_media::StepUnmountMedia;

use vmb_core::{DriverHandle, StateBag, StepAction, StepError, Ui, UiHandle, keys};

/// Report `err` to the user and turn it into a failing action.
pub fn fail(ui: &dyn Ui, err: StepError) -> StepAction {
    ui.error(&err.to_string());
    StepAction::Fail(err)
}

/// Turn the outcome of a step body into an action, reporting errors.
pub(crate) fn finish(ui: &dyn Ui, res: Result<(), StepError>) -> StepAction {
    match res {
        Ok(()) => StepAction::Continue,
        Err(e) => fail(ui, e),
    }
}

/// Collaborators nearly every step needs.
pub(crate) struct Handles {
    pub driver: DriverHandle,
    pub ui: UiHandle,
}

impl Handles {
    pub fn from_state(state: &StateBag) -> Result<Self, StepError> {
        Ok(Self {
            driver: state.driver()?,
            ui: state.ui()?,
        })
    }
}

/// Name of the VM created earlier in the pipeline.
pub(crate) fn vm_name(state: &StateBag) -> Result<String, StepError> {
    Ok(state.get::<String>(keys::VM_NAME)?)
}

/// Resolve handles or bail out of `run` with a failing action.
///
/// A missing ui cannot be reported to the user, so the error is only recorded.
macro_rules! handles_or_fail {
    ($state:expr) => {
        match $crate::step::Handles::from_state($state) {
            Ok(h) => h,
            Err(e) => return ::vmb_core::StepAction::Fail(e),
        }
    };
}
pub(crate) use handles_or_fail;
