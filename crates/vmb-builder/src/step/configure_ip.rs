use async_trait::async_trait;
use tracing::{debug, info};
use vmb_core::{DriverError, StateBag, Step, StepAction, StepError, driver::resolved_address, keys, poll_until};
use vmb_model::PollStrategy;

use crate::step::{Handles, finish, handles_or_fail, vm_name};

/// Waits for the guest to report a network address, then resolves its host name.
///
/// Writes [`keys::IP`] and [`keys::HOST`]. The wait between observations is
/// not interrupted by cancellation; the runner notices a cancel request only
/// once this step has returned.
#[derive(Debug)]
pub struct StepConfigureIp {
    pub poll: PollStrategy,
}

impl StepConfigureIp {
    async fn resolve(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let vm = vm_name(state)?;

        let ip = poll_until(&self.poll, |attempt| {
            let driver = h.driver.clone();
            let vm = vm.clone();
            async move {
                let raw = driver.ip_address(&vm).await?;
                let resolved = resolved_address(&raw);
                if resolved.is_none() {
                    debug!(vm = %vm, attempt, "guest has no network address yet");
                }
                Ok::<_, DriverError>(resolved)
            }
        })
        .await
        .map_err(|e| StepError::poll("the virtual machine network address", e))?;

        h.ui.say(&format!("ip address is {ip}"));

        let host = h
            .driver
            .host_name(&ip)
            .await
            .map_err(|e| StepError::driver("error resolving host name", e))?;
        h.ui.say(&format!("hostname is {host}"));

        info!(vm = %vm, ip = %ip, host = %host, "guest network configured");
        state.put(keys::IP, ip);
        state.put(keys::HOST, host);
        Ok(())
    }
}

#[async_trait]
impl Step for StepConfigureIp {
    fn name(&self) -> &'static str {
        "configure_ip"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say("Configuring ip address...");

        finish(&*h.ui, self.resolve(&h, state).await)
    }
}
