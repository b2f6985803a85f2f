use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{
    domain::TimeoutMs,
    error::{ModelError, ModelResult},
    kind::{Generation, SwitchKind},
    strategy::PollStrategy,
};

const MIN_RAM_MB: u64 = 512;
const MAX_RAM_MB: u64 = 32 * 1024;
const MIN_DISK_MB: u64 = 10 * 1024;
const MAX_DISK_MB: u64 = 64 * 1024 * 1024;
const DEFAULT_DISK_MB: u64 = 40_000;

/// Declarative description of one image build.
///
/// `BuildConfig` describes *what* VM is provisioned and *where* the result goes;
/// the pipeline assembling steps from it lives in `vmb-builder`.
///
/// Fields cover:
/// - machine shape (`cpus`, `ram_size_mb`, `disk_size_mb`, `generation`)
/// - networking (`switch_name`, `switch_type`, `vlan_id`, `ip_poll`)
/// - install media (`iso_path`, `secondary_iso_images`, `floppy_image`)
/// - teardown and output (`shutdown_command`, `shutdown_timeout_ms`, `output_directory`, `force`)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    /// Name of the VM created on the platform (and of the exported machine).
    pub vm_name: String,
    /// Directory receiving the exported machine. Must not exist unless `force` is set.
    pub output_directory: PathBuf,
    /// Replace an existing output directory instead of halting the build.
    pub force: bool,
    /// Parent directory for build scratch space. Defaults to the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_path: Option<PathBuf>,
    /// Virtual switch the VM network adapter is connected to.
    pub switch_name: String,
    pub switch_type: SwitchKind,
    /// Optional VLAN applied to the VM network adapter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    pub cpus: u32,
    pub ram_size_mb: u64,
    pub disk_size_mb: u64,
    #[cfg_attr(feature = "schema", schemars(with = "u8"))]
    pub generation: Generation,
    pub enable_secure_boot: bool,
    /// Installation media attached as a DVD.
    pub iso_path: PathBuf,
    /// Extra ISO images attached as additional DVD drives, e.g. driver media.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secondary_iso_images: Vec<PathBuf>,
    /// Pre-built floppy image (generation 1 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floppy_image: Option<PathBuf>,
    /// Command run inside the guest to power it off. When absent the VM is stopped forcibly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_command: Option<String>,
    /// How long to wait for the guest to power off after the shutdown command.
    pub shutdown_timeout_ms: TimeoutMs,
    /// Budget for waiting on the guest network address.
    pub ip_poll: PollStrategy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            vm_name: "vmb-build".to_string(),
            output_directory: PathBuf::from("output-vmb"),
            force: false,
            temp_path: None,
            switch_name: "vmb-switch".to_string(),
            switch_type: SwitchKind::default(),
            vlan_id: None,
            cpus: 1,
            ram_size_mb: 1024,
            disk_size_mb: DEFAULT_DISK_MB,
            generation: Generation::default(),
            enable_secure_boot: false,
            iso_path: PathBuf::new(),
            secondary_iso_images: Vec::new(),
            floppy_image: None,
            shutdown_command: None,
            shutdown_timeout_ms: 5 * 60 * 1_000,
            ip_poll: PollStrategy::default(),
        }
    }
}

impl BuildConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(s: &str) -> ModelResult<Self> {
        let cfg: BuildConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> ModelResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Validate the configuration before any step runs.
    ///
    /// Rules:
    /// - `vm_name`, `switch_name`, `iso_path` and `output_directory` are not empty;
    /// - at least one CPU;
    /// - RAM within 512 MiB..=32 GiB, disk within 10 GiB..=64 TiB;
/// - no secondary ISO path is empty;
    /// - VLAN id within 1..=4094;
    /// - secure boot and floppy only where the generation supports them;
    /// - `ip_poll` allows at least one attempt.
    pub fn validate(&self) -> ModelResult<()> {
        if self.vm_name.trim().is_empty() {
            return Err(ModelError::Invalid("vmName is empty".into()));
        }
        if self.switch_name.trim().is_empty() {
            return Err(ModelError::Invalid("switchName is empty".into()));
        }
        if self.iso_path.as_os_str().is_empty() {
            return Err(ModelError::Invalid("isoPath is required".into()));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(ModelError::Invalid("outputDirectory is empty".into()));
        }
        if self.cpus == 0 {
            return Err(ModelError::Invalid("cpus must be at least 1".into()));
        }
        if !(MIN_RAM_MB..=MAX_RAM_MB).contains(&self.ram_size_mb) {
            return Err(ModelError::Invalid(format!(
                "ramSizeMb {} outside {MIN_RAM_MB}..={MAX_RAM_MB}",
                self.ram_size_mb
            )));
        }
        if !(MIN_DISK_MB..=MAX_DISK_MB).contains(&self.disk_size_mb) {
            return Err(ModelError::Invalid(format!(
                "diskSizeMb {} outside {MIN_DISK_MB}..={MAX_DISK_MB}",
                self.disk_size_mb
            )));
        }
        if self.secondary_iso_images.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(ModelError::Invalid("secondaryIsoImages contains an empty path".into()));
        }
        if let Some(vlan) = self.vlan_id {
            if !(1..=4094).contains(&vlan) {
                return Err(ModelError::Invalid(format!("vlanId {vlan} outside 1..=4094")));
            }
        }
        if self.enable_secure_boot && !self.generation.supports_secure_boot() {
            return Err(ModelError::Invalid(format!(
                "secure boot requires generation 2, got {}",
                self.generation
            )));
        }
        if self.floppy_image.is_some() && !self.generation.supports_floppy() {
            return Err(ModelError::Invalid(format!(
                "floppy drives are not available on generation {}",
                self.generation
            )));
        }
        self.ip_poll.validate()
    }
}
