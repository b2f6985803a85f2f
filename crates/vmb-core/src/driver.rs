//! Capability surface the pipeline needs from the virtualization platform.
//!
//! Steps reach the platform only through [`Driver`], which the caller injects
//! into the [`crate::StateBag`] under [`crate::keys::DRIVER`]. Every call either
//! succeeds or fails with a [`DriverError`]; a failing call never leaves state
//! the pipeline has to reason about, so steps treat any error as fatal.
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use vmb_model::{Generation, SwitchKind};

use crate::error::DriverError;

/// Value the platform reports for a guest address that is not known yet.
pub const UNSET_ADDRESS: &str = "False";

/// Interpret a raw address observation.
///
/// Returns `None` for the unset sentinel or an empty answer.
pub fn resolved_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == UNSET_ADDRESS {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Shape of the VM to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub name: String,
    pub switch_name: String,
    /// Directory the platform may use for the VM's files during the build.
    pub path: PathBuf,
    pub cpus: u32,
    pub ram_size_mb: u64,
    pub disk_size_mb: u64,
    pub generation: Generation,
    pub vlan_id: Option<u16>,
    pub enable_secure_boot: bool,
}

/// Location of an attached DVD drive, needed to detach it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvdController {
    pub number: u32,
    pub location: u32,
}

impl fmt::Display for DvdController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.number, self.location)
    }
}

#[async_trait]
pub trait Driver: Send + Sync {
    /// Whether a switch with this name already exists.
    async fn switch_exists(&self, name: &str) -> Result<bool, DriverError>;

    async fn create_switch(&self, name: &str, kind: SwitchKind) -> Result<(), DriverError>;

    async fn delete_switch(&self, name: &str) -> Result<(), DriverError>;

    async fn create_vm(&self, spec: &VmSpec) -> Result<(), DriverError>;

    async fn delete_vm(&self, vm: &str) -> Result<(), DriverError>;

    async fn mount_dvd(&self, vm: &str, iso: &Path) -> Result<DvdController, DriverError>;

    async fn unmount_dvd(&self, vm: &str, controller: DvdController) -> Result<(), DriverError>;

    async fn mount_floppy(&self, vm: &str, image: &Path) -> Result<(), DriverError>;

    async fn unmount_floppy(&self, vm: &str) -> Result<(), DriverError>;

    async fn start_vm(&self, vm: &str) -> Result<(), DriverError>;

    /// Hard power-off.
    async fn stop_vm(&self, vm: &str) -> Result<(), DriverError>;

    async fn is_running(&self, vm: &str) -> Result<bool, DriverError>;

    async fn is_off(&self, vm: &str) -> Result<bool, DriverError>;

    /// Current guest address as reported by the platform.
    ///
    /// Returns the raw answer, which is [`UNSET_ADDRESS`] while the guest has
    /// not acquired an address; see [`resolved_address`].
    async fn ip_address(&self, vm: &str) -> Result<String, DriverError>;

    /// Reverse-resolve a guest address to a host name.
    async fn host_name(&self, ip: &str) -> Result<String, DriverError>;

    /// Export the VM's on-disk representation into `path`.
    async fn export_vm(&self, vm: &str, path: &Path) -> Result<(), DriverError>;
}

/// Shared handle stored in the state bag.
pub type DriverHandle = Arc<dyn Driver>;
