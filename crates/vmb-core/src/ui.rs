use std::sync::Arc;

use tracing::{error, info};

/// User-facing output collaborator.
///
/// Accepts human-readable progress and error lines. Distinct from the
/// diagnostic `tracing` output the crates emit themselves.
pub trait Ui: Send + Sync {
    /// Progress line announcing a step's main action.
    fn say(&self, msg: &str);

    /// Secondary detail line.
    fn message(&self, msg: &str);

    fn error(&self, msg: &str);
}

/// Shared handle stored in the state bag.
pub type UiHandle = Arc<dyn Ui>;

/// [`Ui`] writing every line through `tracing` under the `vmb::ui` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn say(&self, msg: &str) {
        info!(target: "vmb::ui", "==> {msg}");
    }

    fn message(&self, msg: &str) {
        info!(target: "vmb::ui", "    {msg}");
    }

    fn error(&self, msg: &str) {
        error!(target: "vmb::ui", "==> {msg}");
    }
}
