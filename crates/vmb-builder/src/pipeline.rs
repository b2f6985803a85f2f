//! Fixed step sequence of an image build.
use vmb_core::Step;
use vmb_model::BuildConfig;

use crate::step::{
    StepConfigureIp, StepCreateSwitch, StepCreateTempDir, StepCreateVm, StepExport, StepMountDvd,
    StepMountFloppy, StepMountSecondaryDvds, StepOutputDir, StepShutdown, StepStartVm, StepUnmountMedia,
};

/// Steps in execution order; cleanups run in the reverse of this order.
pub fn steps(cfg: &BuildConfig) -> Vec<Box<dyn Step>> {
    vec![
        Box::new(StepCreateTempDir {
            parent: cfg.temp_path.clone(),
        }),
        Box::new(StepOutputDir::new(&cfg.output_directory, cfg.force)),
        Box::new(StepCreateSwitch::new(&cfg.switch_name, cfg.switch_type)),
        Box::new(StepCreateVm::from_config(cfg)),
        Box::new(StepMountDvd {
            iso_path: cfg.iso_path.clone(),
        }),
        Box::new(StepMountFloppy {
            image: cfg.floppy_image.clone(),
        }),
        Box::new(StepMountSecondaryDvds {
            images: cfg.secondary_iso_images.clone(),
        }),
        Box::new(StepStartVm),
        Box::new(StepConfigureIp { poll: cfg.ip_poll }),
        Box::new(StepShutdown {
            command: cfg.shutdown_command.clone(),
            timeout_ms: cfg.shutdown_timeout_ms,
            check_every_ms: StepShutdown::DEFAULT_CHECK_EVERY_MS,
        }),
        Box::new(StepUnmountMedia),
        Box::new(StepExport {
            output_dir: cfg.output_directory.clone(),
        }),
    ]
}
