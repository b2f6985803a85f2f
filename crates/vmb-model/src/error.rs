use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown switch type: {0}")]
    UnknownSwitchKind(String),

    #[error("unsupported machine generation: {0} (expected 1 or 2)")]
    UnknownGeneration(u8),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
