use std::path::PathBuf;

use thiserror::Error;
use vmb_core::StepError;
use vmb_model::ModelError;

/// Why a build did not produce an artifact.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build failed: {0}")]
    Failed(#[source] StepError),

    #[error("build was cancelled")]
    Cancelled,

    #[error("build was halted")]
    Halted,

    #[error("invalid build configuration: {0}")]
    Config(#[from] ModelError),

    #[error("no exported files found in {}", .0.display())]
    MissingArtifact(PathBuf),
}
