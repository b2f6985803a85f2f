#![allow(dead_code)]

use std::{
    collections::{HashSet, VecDeque},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vmb_core::{Driver, DriverError, DvdController, Ui, VmSpec};
use vmb_model::{BuildConfig, PollStrategy, SwitchKind};

/// In-memory platform recording every call in order.
#[derive(Default)]
pub struct FakeDriver {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    failing_args: Mutex<Vec<(&'static str, String)>>,
    existing_switches: Mutex<HashSet<String>>,
    addresses: Mutex<VecDeque<String>>,
    off_after: Mutex<Option<u32>>,
    running: Mutex<bool>,
    created: Mutex<Option<VmSpec>>,
    cancel_on: Mutex<Option<(&'static str, CancellationToken)>>,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        let driver = Self::default();
        driver.answer_addresses(&["192.168.0.10"]);
        Arc::new(driver)
    }

    /// Make operation `op` fail every time.
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Make `op` fail whenever its arguments mention `needle`.
    pub fn fail_on_arg(&self, op: &'static str, needle: &str) {
        self.failing_args.lock().unwrap().push((op, needle.to_string()));
    }

    pub fn with_switch(&self, name: &str) {
        self.existing_switches.lock().unwrap().insert(name.to_string());
    }

    /// Raw answers to successive `ip_address` calls; the last one repeats.
    pub fn answer_addresses(&self, answers: &[&str]) {
        *self.addresses.lock().unwrap() = answers.iter().map(|s| s.to_string()).collect();
    }

    /// Report the machine off only from the `n`-th power check on.
    pub fn off_after(&self, n: u32) {
        *self.off_after.lock().unwrap() = Some(n);
    }

    /// Cancel `token` when `op` is called.
    pub fn cancel_on(&self, op: &'static str, token: CancellationToken) {
        *self.cancel_on.lock().unwrap() = Some((op, token));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Operation names without arguments.
    pub fn ops(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.ops().iter().filter(|o| *o == op).count()
    }

    pub fn created_spec(&self) -> Option<VmSpec> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, detail: impl AsRef<str>) -> Result<(), DriverError> {
        let detail = detail.as_ref();
        let line = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op} {detail}")
        };
        self.calls.lock().unwrap().push(line);

        if let Some((trigger, token)) = &*self.cancel_on.lock().unwrap() {
            if *trigger == op {
                token.cancel();
            }
        }

        if self.failing.lock().unwrap().contains(op) {
            return Err(DriverError::operation(op, "injected failure"));
        }
        let arg_failure = self
            .failing_args
            .lock()
            .unwrap()
            .iter()
            .any(|(o, needle)| *o == op && detail.contains(needle.as_str()));
        if arg_failure {
            return Err(DriverError::operation(op, format!("injected failure for {detail}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn switch_exists(&self, name: &str) -> Result<bool, DriverError> {
        self.record("switch_exists", name)?;
        Ok(self.existing_switches.lock().unwrap().contains(name))
    }

    async fn create_switch(&self, name: &str, kind: SwitchKind) -> Result<(), DriverError> {
        self.record("create_switch", format!("{name} {kind}"))?;
        self.existing_switches.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn delete_switch(&self, name: &str) -> Result<(), DriverError> {
        self.record("delete_switch", name)?;
        self.existing_switches.lock().unwrap().remove(name);
        Ok(())
    }

    async fn create_vm(&self, spec: &VmSpec) -> Result<(), DriverError> {
        self.record("create_vm", &spec.name)?;
        *self.created.lock().unwrap() = Some(spec.clone());
        Ok(())
    }

    async fn delete_vm(&self, vm: &str) -> Result<(), DriverError> {
        self.record("delete_vm", vm)
    }

    async fn mount_dvd(&self, vm: &str, iso: &Path) -> Result<DvdController, DriverError> {
        self.record("mount_dvd", format!("{vm} {}", iso.display()))?;
        // Each drive gets its own slot on controller 1.
        let location = self.count("mount_dvd") as u32 - 1;
        Ok(DvdController { number: 1, location })
    }

    async fn unmount_dvd(&self, vm: &str, controller: DvdController) -> Result<(), DriverError> {
        self.record("unmount_dvd", format!("{vm} {controller}"))
    }

    async fn mount_floppy(&self, vm: &str, image: &Path) -> Result<(), DriverError> {
        self.record("mount_floppy", format!("{vm} {}", image.display()))
    }

    async fn unmount_floppy(&self, vm: &str) -> Result<(), DriverError> {
        self.record("unmount_floppy", vm)
    }

    async fn start_vm(&self, vm: &str) -> Result<(), DriverError> {
        self.record("start_vm", vm)?;
        *self.running.lock().unwrap() = true;
        Ok(())
    }

    async fn stop_vm(&self, vm: &str) -> Result<(), DriverError> {
        self.record("stop_vm", vm)?;
        *self.running.lock().unwrap() = false;
        Ok(())
    }

    async fn is_running(&self, vm: &str) -> Result<bool, DriverError> {
        self.record("is_running", vm)?;
        Ok(*self.running.lock().unwrap())
    }

    async fn is_off(&self, vm: &str) -> Result<bool, DriverError> {
        self.record("is_off", vm)?;
        let checks = self.count("is_off") as u32;
        let off = match *self.off_after.lock().unwrap() {
            Some(n) => checks >= n,
            None => true,
        };
        if off {
            *self.running.lock().unwrap() = false;
        }
        Ok(off)
    }

    async fn ip_address(&self, vm: &str) -> Result<String, DriverError> {
        self.record("ip_address", vm)?;
        let mut answers = self.addresses.lock().unwrap();
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        Ok(answer.unwrap_or_else(|| vmb_core::driver::UNSET_ADDRESS.to_string()))
    }

    async fn host_name(&self, ip: &str) -> Result<String, DriverError> {
        self.record("host_name", ip)?;
        Ok("build-host".to_string())
    }

    async fn export_vm(&self, vm: &str, path: &Path) -> Result<(), DriverError> {
        self.record("export_vm", format!("{vm} {}", path.display()))?;
        let disks = path.join(vm).join("Virtual Hard Disks");
        std::fs::create_dir_all(&disks).map_err(|e| DriverError::operation("export_vm", e.to_string()))?;
        std::fs::write(disks.join("disk.vhdx"), b"disk")
            .map_err(|e| DriverError::operation("export_vm", e.to_string()))
    }
}

/// Ui keeping every line it was given.
#[derive(Default)]
pub struct RecordingUi {
    lines: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| l.strip_prefix("error: ").map(str::to_string))
            .collect()
    }
}

impl Ui for RecordingUi {
    fn say(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("say: {msg}"));
    }

    fn message(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("message: {msg}"));
    }

    fn error(&self, msg: &str) {
        self.lines.lock().unwrap().push(format!("error: {msg}"));
    }
}

/// Communicator recording commands; fails with `code` when set.
#[derive(Default)]
pub struct FakeCommunicator {
    pub commands: Mutex<Vec<String>>,
    pub exit_code: Option<i32>,
}

#[async_trait]
impl vmb_core::Communicator for FakeCommunicator {
    async fn run(&self, command: &str) -> Result<(), vmb_core::CommunicatorError> {
        self.commands.lock().unwrap().push(command.to_string());
        match self.exit_code {
            Some(code) => Err(vmb_core::CommunicatorError::ExitStatus {
                command: command.to_string(),
                code,
            }),
            None => Ok(()),
        }
    }
}

/// Fresh scratch root; removed by the caller.
pub fn scratch() -> PathBuf {
    std::env::temp_dir().join(format!("vmb-builder-test-{}", uuid::Uuid::new_v4()))
}

/// Valid config building into `root` with fast polling.
pub fn config(root: &Path) -> BuildConfig {
    BuildConfig {
        vm_name: "vmb-test".to_string(),
        output_directory: root.join("output"),
        temp_path: Some(root.join("tmp")),
        iso_path: PathBuf::from("/isos/install.iso"),
        ip_poll: PollStrategy::new(5, 1),
        ..Default::default()
    }
}
