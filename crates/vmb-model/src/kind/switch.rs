use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Kind of virtual switch the build VM is attached to.
///
/// - `Internal`: host and guests can talk; no physical uplink (default).
/// - `External`: bridged to a physical adapter.
/// - `Private`: guests only; the host cannot reach the VM.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum SwitchKind {
    #[default]
    Internal,
    External,
    Private,
}

impl SwitchKind {
    /// Name as understood by the hypervisor tooling.
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchKind::Internal => "Internal",
            SwitchKind::External => "External",
            SwitchKind::Private => "Private",
        }
    }
}

impl FromStr for SwitchKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "internal" => Ok(SwitchKind::Internal),
            "external" => Ok(SwitchKind::External),
            "private" => Ok(SwitchKind::Private),
            other => Err(ModelError::UnknownSwitchKind(other.to_string())),
        }
    }
}

impl fmt::Display for SwitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
