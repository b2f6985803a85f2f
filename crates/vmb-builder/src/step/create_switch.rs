use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;
use vmb_core::{StateBag, Step, StepAction, StepError, keys};
use vmb_model::SwitchKind;

use crate::step::{Handles, finish, handles_or_fail};

/// Ensures the virtual switch the VM is attached to exists.
///
/// An already existing switch is reused and left in place on cleanup.
#[derive(Debug)]
pub struct StepCreateSwitch {
    pub name: String,
    pub kind: SwitchKind,
    created: AtomicBool,
}

impl StepCreateSwitch {
    pub fn new(name: impl Into<String>, kind: SwitchKind) -> Self {
        Self {
            name: name.into(),
            kind,
            created: AtomicBool::new(false),
        }
    }

    async fn ensure(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let exists = h
            .driver
            .switch_exists(&self.name)
            .await
            .map_err(|e| StepError::driver("error looking up switch", e))?;

        if exists {
            debug!(switch = %self.name, "reusing existing switch");
            h.ui.message(&format!("Using existing switch {}", self.name));
        } else {
            h.driver
                .create_switch(&self.name, self.kind)
                .await
                .map_err(|e| StepError::driver("error creating switch", e))?;
            self.created.store(true, Ordering::Release);
        }

        state.put(keys::SWITCH_NAME, self.name.clone());
        Ok(())
    }
}

#[async_trait]
impl Step for StepCreateSwitch {
    fn name(&self) -> &'static str {
        "create_switch"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say(&format!("Creating {} switch {}...", self.kind, self.name));

        finish(&*h.ui, self.ensure(&h, state).await)
    }

    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        if !self.created.load(Ordering::Acquire) {
            return Ok(());
        }
        let h = Handles::from_state(state)?;
        h.ui.say("Unregistering and deleting switch...");

        h.driver
            .delete_switch(&self.name)
            .await
            .map_err(|e| StepError::driver("error deleting switch", e))?;
        self.created.store(false, Ordering::Release);
        Ok(())
    }
}
