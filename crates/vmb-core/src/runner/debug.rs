use std::{fmt, sync::atomic::AtomicBool};

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin},
    sync::Mutex,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    metrics::{MetricsHandle, noop_metrics},
    runner::{Runner, drive::Drive, run_once, step_names},
    state::StateBag,
    step::Step,
};

/// Where in the pipeline the debug hook was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseLocation {
    /// After a step's `run` returned `Continue`.
    AfterRun,
    /// Right before a step's `cleanup`; the decision is ignored.
    BeforeCleanup,
}

/// Operator answer at a pause point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugDecision {
    #[default]
    Continue,
    /// Do not start the next step; it will not be cleaned up either.
    SkipNext,
    /// Stop advancing as if cancellation had been requested.
    Abort,
}

/// Hook consulted by [`DebugRunner`] at every pause point.
#[async_trait]
pub trait DebugPause: Send + Sync {
    async fn pause(&self, at: PauseLocation, step: &str, state: &StateBag) -> DebugDecision;
}

#[async_trait]
impl<P: DebugPause + ?Sized> DebugPause for std::sync::Arc<P> {
    async fn pause(&self, at: PauseLocation, step: &str, state: &StateBag) -> DebugDecision {
        (**self).pause(at, step, state).await
    }
}

/// Interactive pause reading one line per decision from stdin.
///
/// - empty line or `c`: continue
/// - `s`: skip the next step
/// - `a` / `q`: abort
///
/// Unknown input re-prompts. End of input continues; a read error aborts.
pub struct StdinPause {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinPause {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn prompt(text: &str) {
        let mut out = tokio::io::stdout();
        // Prompt output is best effort; a closed stdout must not stop the build.
        let _ = out.write_all(text.as_bytes()).await;
        let _ = out.flush().await;
    }
}

impl Default for StdinPause {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one line of operator input.
pub(crate) fn parse_decision(line: &str) -> Option<DebugDecision> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "c" => Some(DebugDecision::Continue),
        "s" => Some(DebugDecision::SkipNext),
        "a" | "q" => Some(DebugDecision::Abort),
        _ => None,
    }
}

#[async_trait]
impl DebugPause for StdinPause {
    async fn pause(&self, at: PauseLocation, step: &str, _state: &StateBag) -> DebugDecision {
        let mut lines = self.lines.lock().await;

        loop {
            match at {
                PauseLocation::AfterRun => {
                    Self::prompt(&format!(
                        "[debug] step '{step}' done. <enter> continue, s skip next, a abort: "
                    ))
                    .await
                }
                PauseLocation::BeforeCleanup => {
                    Self::prompt(&format!("[debug] about to clean up '{step}'. <enter> to proceed: ")).await
                }
            }

            match lines.next_line().await {
                Ok(Some(line)) => {
                    if at == PauseLocation::BeforeCleanup {
                        return DebugDecision::Continue;
                    }
                    match parse_decision(&line) {
                        Some(decision) => return decision,
                        None => Self::prompt(&format!("[debug] unknown answer '{}'\n", line.trim())).await,
                    }
                }
                Ok(None) => return DebugDecision::Continue,
                Err(e) => {
                    warn!(step, error = %e, "reading debug input failed; aborting");
                    return DebugDecision::Abort;
                }
            }
        }
    }
}

/// Runs steps like [`crate::BasicRunner`] but consults a [`DebugPause`] hook
/// between steps and before each cleanup.
pub struct DebugRunner {
    steps: Vec<Box<dyn Step>>,
    cancel: CancellationToken,
    metrics: MetricsHandle,
    pause: Box<dyn DebugPause>,
    used: AtomicBool,
}

impl DebugRunner {
    /// Debug runner prompting on the terminal.
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self::with_pause(steps, StdinPause::new())
    }

    pub fn with_pause(steps: Vec<Box<dyn Step>>, pause: impl DebugPause + 'static) -> Self {
        Self {
            steps,
            cancel: CancellationToken::new(),
            metrics: noop_metrics(),
            pause: Box::new(pause),
            used: AtomicBool::new(false),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

#[async_trait]
impl Runner for DebugRunner {
    fn name(&self) -> &'static str {
        "debug"
    }

    async fn run(&self, state: &StateBag) {
        let drive = Drive {
            steps: &self.steps,
            cancel: &self.cancel,
            metrics: &self.metrics,
            pause: Some(self.pause.as_ref()),
        };
        run_once(self.name(), &self.used, drive, state).await;
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl fmt::Debug for DebugRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugRunner")
            .field("steps", &step_names(&self.steps))
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operator_answers() {
        assert_eq!(parse_decision(""), Some(DebugDecision::Continue));
        assert_eq!(parse_decision("  \n"), Some(DebugDecision::Continue));
        assert_eq!(parse_decision("c"), Some(DebugDecision::Continue));
        assert_eq!(parse_decision("S"), Some(DebugDecision::SkipNext));
        assert_eq!(parse_decision("a"), Some(DebugDecision::Abort));
        assert_eq!(parse_decision("q\r"), Some(DebugDecision::Abort));
        assert_eq!(parse_decision("next"), None);
    }
}
