use async_trait::async_trait;
use tracing::{debug, info, warn};
use vmb_core::{DriverError, StateBag, Step, StepAction, StepError, poll_until};
use vmb_model::{PollStrategy, TimeoutMs};

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Powers the guest off before its disks are exported.
///
/// With a shutdown command the guest is asked to halt itself and the step
/// waits up to `timeout_ms` for the machine to report off. Without one (or
/// with a blank one) the machine is stopped forcibly.
#[derive(Debug)]
pub struct StepShutdown {
    pub command: Option<String>,
    pub timeout_ms: TimeoutMs,
    /// Interval between power state checks.
    pub check_every_ms: u64,
}

impl StepShutdown {
    pub const DEFAULT_CHECK_EVERY_MS: u64 = 1_000;

    /// Configured command, unless it is blank.
    fn guest_command(&self) -> Option<&str> {
        self.command.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    async fn graceful(&self, command: &str, h: &Handles, vm: &str, state: &StateBag) -> Result<(), StepError> {
        h.ui.say("Gracefully halting virtual machine...");
        let comm = state.communicator()?;
        comm.run(command).await?;
        debug!(vm, command, "shutdown command accepted");

        let policy = PollStrategy::covering(self.timeout_ms, self.check_every_ms);
        poll_until(&policy, |_| {
            let driver = h.driver.clone();
            async move { Ok::<_, DriverError>(driver.is_off(vm).await?.then_some(())) }
        })
        .await
        .map_err(|e| StepError::poll("the virtual machine to power off", e))?;

        info!(vm, "virtual machine powered off");
        Ok(())
    }

    async fn forced(&self, h: &Handles, vm: &str) -> Result<(), StepError> {
        h.ui.say("Forcibly halting virtual machine...");
        warn!(vm, "no shutdown command configured; stopping the machine may lose data");
        h.driver
            .stop_vm(vm)
            .await
            .map_err(|e| StepError::driver("error stopping virtual machine", e))
    }
}

#[async_trait]
impl Step for StepShutdown {
    fn name(&self) -> &'static str {
        "shutdown"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);

        let res = async {
            let vm = vm_name(state)?;
            match self.guest_command() {
                Some(cmd) => self.graceful(cmd, &h, &vm, state).await,
                None => self.forced(&h, &vm).await,
            }
        }
        .await;
        finish(&*h.ui, res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(command: Option<&str>) -> StepShutdown {
        StepShutdown {
            command: command.map(str::to_string),
            timeout_ms: 1_000,
            check_every_ms: StepShutdown::DEFAULT_CHECK_EVERY_MS,
        }
    }

    #[test]
    fn blank_command_means_forced_stop() {
        assert_eq!(with(None).guest_command(), None);
        assert_eq!(with(Some("")).guest_command(), None);
        assert_eq!(with(Some("  \t\n")).guest_command(), None);
        assert_eq!(with(Some(" shutdown /s ")).guest_command(), Some("shutdown /s"));
    }
}
