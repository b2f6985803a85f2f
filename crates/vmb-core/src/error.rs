use thiserror::Error;

use crate::poll::PollError;

/// Contract violations when reading the [`crate::StateBag`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("state key '{0}' is not set")]
    Missing(String),

    #[error("state key '{key}' does not hold a value of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Failure reported by a [`crate::Driver`] call.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("{op}: {reason}")]
    Operation { op: &'static str, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("operation not supported by this driver: {0}")]
    Unsupported(&'static str),
}

impl DriverError {
    pub fn operation(op: &'static str, reason: impl Into<String>) -> Self {
        DriverError::Operation {
            op,
            reason: reason.into(),
        }
    }
}

/// Failure reported by a [`crate::Communicator`].
#[derive(Debug, Clone, Error)]
pub enum CommunicatorError {
    #[error("remote command '{command}' exited with status {code}")]
    ExitStatus { command: String, code: i32 },

    #[error("communicator failure: {0}")]
    Failed(String),
}

/// Fatal error produced by a step.
///
/// This is the value stored in the state bag error slot, so it is `Clone`
/// and carries only owned, printable context.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    #[error("{context}: {source}")]
    Driver {
        context: String,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Communicator(#[from] CommunicatorError),

    #[error("error while waiting for {what}: {source}")]
    Poll {
        what: String,
        #[source]
        source: DriverError,
    },

    #[error("timed out waiting for {what} after {attempts} attempts")]
    Exhausted { what: String, attempts: u32 },

    #[error("step refused to continue: {0}")]
    Halted(String),

    #[error("{context}: {reason}")]
    Io { context: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl StepError {
    /// Wrap a driver failure with the step-level context it happened in.
    pub fn driver(context: impl Into<String>, source: DriverError) -> Self {
        StepError::Driver {
            context: context.into(),
            source,
        }
    }

    /// Map a failed driver poll onto the step error taxonomy.
    ///
    /// A failed observation and a spent attempt budget stay distinct variants.
    pub fn poll(what: impl Into<String>, err: PollError<DriverError>) -> Self {
        let what = what.into();
        match err {
            PollError::Query(source) => StepError::Poll { what, source },
            PollError::Exhausted { attempts } => StepError::Exhausted { what, attempts },
        }
    }

    pub fn io(context: impl Into<String>, err: &std::io::Error) -> Self {
        StepError::Io {
            context: context.into(),
            reason: err.to_string(),
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StepError::Driver { .. } => "driver",
            StepError::State(_) => "state",
            StepError::Communicator(_) => "communicator",
            StepError::Poll { .. } => "poll",
            StepError::Exhausted { .. } => "exhausted",
            StepError::Halted(_) => "halted",
            StepError::Io { .. } => "io",
            StepError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_keeps_context_in_message() {
        let err = StepError::driver(
            "error creating virtual machine",
            DriverError::operation("create_vm", "access denied"),
        );
        assert_eq!(
            err.to_string(),
            "error creating virtual machine: create_vm: access denied"
        );
        assert_eq!(err.kind(), "driver");
    }

    #[test]
    fn exhausted_is_distinct_from_driver_failure() {
        let err = StepError::Exhausted {
            what: "guest network address".into(),
            attempts: 3,
        };
        assert_eq!(err.kind(), "exhausted");
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[test]
    fn poll_errors_map_to_distinct_variants() {
        let query = StepError::poll(
            "guest network address",
            PollError::Query(DriverError::NotFound("vmb-build".into())),
        );
        assert_eq!(query.kind(), "poll");

        let spent = StepError::poll("guest network address", PollError::Exhausted { attempts: 2 });
        assert!(matches!(spent, StepError::Exhausted { attempts: 2, .. }));
    }
}
