//! Well-known [`crate::StateBag`] keys.
//!
//! Steps never talk to each other directly: one step writes one of these keys
//! and a later step reads it. Keeping the names here avoids scattering magic
//! strings across the step implementations.

/// `DriverHandle` injected by the caller before the runner starts.
pub const DRIVER: &str = "driver";

/// `UiHandle` injected by the caller before the runner starts.
pub const UI: &str = "ui";

/// `CommunicatorHandle` used to reach the guest once it is up.
pub const COMMUNICATOR: &str = "communicator";

/// `PathBuf` of the per-build scratch directory.
pub const TEMP_DIR: &str = "temp_dir";

/// `String` name of the VM created on the platform.
pub const VM_NAME: &str = "vm_name";

/// `String` name of the switch the VM is connected to.
pub const SWITCH_NAME: &str = "switch_name";

/// `DvdController` the installation media is attached to.
pub const DVD_CONTROLLER: &str = "dvd_controller";

/// `PathBuf` of the floppy image currently attached.
pub const FLOPPY_ATTACHED: &str = "floppy_attached";

/// `String` network address reported by the guest.
pub const IP: &str = "ip";

/// `String` host name reverse-resolved from [`IP`].
pub const HOST: &str = "host";

/// `PathBuf` where the exported machine was written.
pub const EXPORT_PATH: &str = "export_path";

/// `Vec<DvdController>` of the secondary ISO images still attached.
pub const SECONDARY_DVD_CONTROLLERS: &str = "secondary_dvd_controllers";
