//! Script execution against the host platform.
//!
//! A script body is written to a temporary file and handed to an interpreter
//! (`powershell -File ...`, `sh ...`) together with positional arguments.
mod interpreter;
pub use interpreter::Interpreter;

mod logger;
pub use logger::LogConfig;

mod shell;
pub use shell::ShellExecutor;

use async_trait::async_trait;

use crate::ExecError;

/// "Run this script and give me its text" capability.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Run `script` with positional `args` and return its trimmed stdout.
    ///
    /// A blank script yields `Ok("")` without spawning anything. Failures of
    /// the script itself are always an `Err`, never a special output string.
    async fn output(&self, script: &str, args: &[String]) -> Result<String, ExecError>;
}
