use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tracing::info;
use vmb_core::{StateBag, Step, StepAction, StepError, VmSpec, keys};
use vmb_model::{BuildConfig, Generation};

use crate::step::{Handles, finish, handles_or_fail};

/// Creates the virtual machine inside the build's temporary directory.
#[derive(Debug)]
pub struct StepCreateVm {
    pub vm_name: String,
    pub cpus: u32,
    pub ram_size_mb: u64,
    pub disk_size_mb: u64,
    pub generation: Generation,
    pub vlan_id: Option<u16>,
    pub enable_secure_boot: bool,
    created: AtomicBool,
}

impl StepCreateVm {
    pub fn from_config(cfg: &BuildConfig) -> Self {
        Self {
            vm_name: cfg.vm_name.clone(),
            cpus: cfg.cpus,
            ram_size_mb: cfg.ram_size_mb,
            disk_size_mb: cfg.disk_size_mb,
            generation: cfg.generation,
            vlan_id: cfg.vlan_id,
            enable_secure_boot: cfg.enable_secure_boot,
            created: AtomicBool::new(false),
        }
    }

    async fn create(&self, h: &Handles, state: &StateBag) -> Result<(), StepError> {
        let spec = VmSpec {
            name: self.vm_name.clone(),
            switch_name: state.get::<String>(keys::SWITCH_NAME)?,
            path: state.get::<PathBuf>(keys::TEMP_DIR)?,
            cpus: self.cpus,
            ram_size_mb: self.ram_size_mb,
            disk_size_mb: self.disk_size_mb,
            generation: self.generation,
            vlan_id: self.vlan_id,
            enable_secure_boot: self.enable_secure_boot,
        };

        h.driver
            .create_vm(&spec)
            .await
            .map_err(|e| StepError::driver("error creating virtual machine", e))?;
        self.created.store(true, Ordering::Release);

        info!(vm = %spec.name, generation = %spec.generation, cpus = spec.cpus, "virtual machine created");
        state.put(keys::VM_NAME, spec.name);
        Ok(())
    }
}

#[async_trait]
impl Step for StepCreateVm {
    fn name(&self) -> &'static str {
        "create_vm"
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        let h = handles_or_fail!(state);
        h.ui.say("Creating virtual machine...");

        finish(&*h.ui, self.create(&h, state).await)
    }

    async fn cleanup(&self, state: &StateBag) -> Result<(), StepError> {
        if !self.created.load(Ordering::Acquire) {
            return Ok(());
        }
        let h = Handles::from_state(state)?;
        h.ui.say("Unregistering and deleting virtual machine...");

        h.driver
            .delete_vm(&self.vm_name)
            .await
            .map_err(|e| StepError::driver("error deleting virtual machine", e))?;
        self.created.store(false, Ordering::Release);
        Ok(())
    }
}
