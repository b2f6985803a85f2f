use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid executor configuration: {0}")]
    InvalidConfig(String),

    #[error("script exited with status {code}: {stderr}")]
    Script { code: i32, stderr: String },

    #[error("script terminated by signal: {stderr}")]
    Terminated { stderr: String },

    #[error("script did not finish within {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
