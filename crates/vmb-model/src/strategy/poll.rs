use std::time::Duration;

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Bounded fixed-delay polling policy.
///
/// Used by steps that wait for an asynchronous condition on the platform
/// (a guest reporting its address, a machine powering off).
/// There is no backoff growth and no jitter: every attempt is separated by the
/// same `delay_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PollStrategy {
    /// Maximum number of observations.
    pub attempts: u32,
    /// Pause between two observations, in milliseconds.
    pub delay_ms: u64,
}

impl PollStrategy {
    pub const fn new(attempts: u32, delay_ms: u64) -> Self {
        Self { attempts, delay_ms }
    }

    /// Derive a policy that covers `timeout_ms` with one observation every `delay_ms`.
    ///
    /// Always yields at least one attempt.
    pub fn covering(timeout_ms: u64, delay_ms: u64) -> Self {
        let attempts = if delay_ms == 0 {
            1
        } else {
            timeout_ms.div_ceil(delay_ms).clamp(1, u32::MAX as u64) as u32
        };
        Self { attempts, delay_ms }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.attempts == 0 {
            return Err(ModelError::Invalid("poll attempts must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for PollStrategy {
    /// One hour budget: sixty observations, one minute apart.
    fn default() -> Self {
        Self::new(60, 60_000)
    }
}
