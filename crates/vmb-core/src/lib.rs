pub mod communicator;
pub mod driver;
pub mod error;
pub mod keys;
pub mod metrics;
pub mod poll;
pub mod runner;
pub mod state;
pub mod step;
pub mod ui;

pub use communicator::{Communicator, CommunicatorHandle};
pub use driver::{DriverHandle, Driver, DvdController, VmSpec};
pub use error::{CommunicatorError, DriverError, StateError, StepError};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, StepOutcome, noop_metrics};
pub use poll::{PollError, poll_until};
pub use runner::{BasicRunner, DebugDecision, DebugPause, DebugRunner, PauseLocation, Runner, StdinPause};
pub use state::{BuildOutcome, StateBag};
pub use step::{Step, StepAction};
pub use ui::{TracingUi, Ui, UiHandle};

pub mod prelude {
    pub use crate::driver::{Driver, DriverHandle};
    pub use crate::error::{DriverError, StateError, StepError};
    pub use crate::runner::{BasicRunner, DebugRunner, Runner};
    pub use crate::state::{BuildOutcome, StateBag};
    pub use crate::step::{Step, StepAction};
    pub use crate::ui::{Ui, UiHandle};
}
