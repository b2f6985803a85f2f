//! Runners drive an ordered list of [`Step`]s against a [`StateBag`].
//!
//! Two strategies share one driving loop:
//! - [`BasicRunner`]: runs steps back to back;
//! - [`DebugRunner`]: pauses after each step and before each cleanup.
mod basic;
pub use basic::BasicRunner;

mod debug;
pub use debug::{DebugDecision, DebugPause, DebugRunner, PauseLocation, StdinPause};

mod drive;
mod id;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use crate::{state::StateBag, step::Step};
use drive::Drive;

/// Strategy that walks the steps and unwinds them.
///
/// A runner is single-use: a second `run` on the same instance logs a warning
/// and returns without touching the state bag.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Runner name used in logs and run ids.
    fn name(&self) -> &'static str;

    /// Run the pipeline to completion.
    ///
    /// The outcome is recorded in `state` (see [`StateBag::outcome`]), never
    /// returned. Returns only after every started step was cleaned up.
    async fn run(&self, state: &StateBag);

    /// Request cancellation; honored before the next step starts.
    fn cancel(&self) {
        self.cancel_token().cancel();
    }

    /// Token observed between steps; clones may be handed to other tasks.
    fn cancel_token(&self) -> CancellationToken;
}

/// Common `run` body: single-use guard, run span, drive loop.
async fn run_once(runner: &'static str, used: &AtomicBool, drive: Drive<'_>, state: &StateBag) {
    if used.swap(true, Ordering::AcqRel) {
        warn!(runner, "runner already used; ignoring repeated run");
        return;
    }

    let run_id = id::make_run_id(runner);
    let span = info_span!("run", runner, run_id = %run_id, steps = drive.steps.len());

    async {
        info!("pipeline started");
        drive.execute(state).await;
        info!(outcome = ?state.outcome(), "pipeline finished");
    }
    .instrument(span)
    .await;
}

fn step_names(steps: &[Box<dyn Step>]) -> Vec<&'static str> {
    steps.iter().map(|s| s.name()).collect()
}
