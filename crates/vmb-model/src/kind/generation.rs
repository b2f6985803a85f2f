use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Virtual machine generation.
///
/// Generation 1 boots BIOS firmware with an IDE DVD drive and supports a
/// floppy drive; generation 2 boots UEFI, attaches the DVD over SCSI and can
/// enable secure boot.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Generation {
    #[default]
    One,
    Two,
}

impl Generation {
    pub fn as_u8(&self) -> u8 {
        match self {
            Generation::One => 1,
            Generation::Two => 2,
        }
    }

    /// Only generation 1 machines have a floppy controller.
    pub fn supports_floppy(&self) -> bool {
        matches!(self, Generation::One)
    }

    pub fn supports_secure_boot(&self) -> bool {
        matches!(self, Generation::Two)
    }
}

impl TryFrom<u8> for Generation {
    type Error = ModelError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Generation::One),
            2 => Ok(Generation::Two),
            other => Err(ModelError::UnknownGeneration(other)),
        }
    }
}

impl From<Generation> for u8 {
    fn from(g: Generation) -> Self {
        g.as_u8()
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
