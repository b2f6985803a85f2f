mod error;
pub use error::ExecError;

pub mod script;
pub use script::{Interpreter, LogConfig, ScriptExecutor, ShellExecutor};

mod communicator;
pub use communicator::ExecCommunicator;
