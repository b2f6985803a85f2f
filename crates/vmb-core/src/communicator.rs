use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CommunicatorError;

/// Channel into the running guest.
///
/// Used to run the shutdown command once the guest is reachable. How the
/// command is transported is up to the implementation.
#[async_trait]
pub trait Communicator: Send + Sync {
    /// Run `command` in the guest and wait for it to be accepted.
    ///
    /// A non-zero exit status is reported as [`CommunicatorError::ExitStatus`].
    async fn run(&self, command: &str) -> Result<(), CommunicatorError>;
}

/// Shared handle stored in the state bag.
pub type CommunicatorHandle = Arc<dyn Communicator>;
