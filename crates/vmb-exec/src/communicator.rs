use async_trait::async_trait;
use tracing::debug;
use vmb_core::{Communicator, CommunicatorError};

use crate::{ExecError, ScriptExecutor};

/// [`Communicator`] that reaches the guest through a host-side transport script.
///
/// The transport receives the configured leading arguments (typically the VM
/// name) followed by the guest command as its last positional argument, e.g.
/// a PowerShell `Invoke-Command -VMName $args[0] -ScriptBlock ...` wrapper.
pub struct ExecCommunicator<E> {
    executor: E,
    transport: String,
    leading_args: Vec<String>,
}

impl<E: ScriptExecutor> ExecCommunicator<E> {
    pub fn new(executor: E, transport: impl Into<String>) -> Self {
        Self {
            executor,
            transport: transport.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments passed to the transport before the guest command.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }
}

#[async_trait]
impl<E: ScriptExecutor> Communicator for ExecCommunicator<E> {
    async fn run(&self, command: &str) -> Result<(), CommunicatorError> {
        let mut args = self.leading_args.clone();
        args.push(command.to_string());

        match self.executor.output(&self.transport, &args).await {
            Ok(out) => {
                if !out.is_empty() {
                    debug!(command, output = %out, "guest command finished");
                }
                Ok(())
            }
            Err(ExecError::Script { code, .. }) => Err(CommunicatorError::ExitStatus {
                command: command.to_string(),
                code,
            }),
            Err(e) => Err(CommunicatorError::Failed(e.to_string())),
        }
    }
}
