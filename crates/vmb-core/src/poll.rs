//! Bounded fixed-delay polling of an external condition.
//!
//! Used inside a step that has to wait for the platform (a guest reporting an
//! address, a machine powering off). The wait between attempts is a plain
//! timer: it is not raced against the runner's cancellation token, so a step
//! in the middle of a poll runs to its own completion and cancellation is only
//! observed once the runner regains control between steps.
use std::future::Future;

use thiserror::Error;
use tracing::{debug, trace};
use vmb_model::PollStrategy;

/// Why [`poll_until`] gave up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError<E> {
    /// The observation itself failed; never retried.
    #[error("observation failed: {0}")]
    Query(E),

    /// Every attempt returned "not yet".
    #[error("condition not met after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Observe until a value resolves or the attempt budget runs out.
///
/// `observe` receives the 1-based attempt number and returns:
/// - `Ok(Some(v))`: resolved, `v` is returned immediately;
/// - `Ok(None)`: not yet, sleep `policy.delay()` and try again;
/// - `Err(e)`: fatal, returned as [`PollError::Query`] without further attempts.
///
/// No sleep follows the final attempt. A zero budget never calls `observe`.
pub async fn poll_until<T, E, F, Fut>(policy: &PollStrategy, mut observe: F) -> Result<T, PollError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    for attempt in 1..=policy.attempts {
        match observe(attempt).await {
            Ok(Some(value)) => {
                debug!(attempt, "polled condition resolved");
                return Ok(value);
            }
            Ok(None) => {
                trace!(
                    attempt,
                    remaining = policy.attempts - attempt,
                    delay_ms = policy.delay_ms,
                    "polled condition not met yet"
                );
                if attempt < policy.attempts {
                    tokio::time::sleep(policy.delay()).await;
                }
            }
            Err(e) => return Err(PollError::Query(e)),
        }
    }
    Err(PollError::Exhausted {
        attempts: policy.attempts,
    })
}
