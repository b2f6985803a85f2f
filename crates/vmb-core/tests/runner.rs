use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use vmb_core::{
    BasicRunner, BuildOutcome, DebugDecision, DebugPause, DebugRunner, PauseLocation, Runner,
    StateBag, Step, StepAction, StepError,
};

const NAMES: [&str; 5] = ["s0", "s1", "s2", "s3", "s4"];

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Copy)]
enum Behaviour {
    Continue,
    Halt,
    Fail,
    /// Continue, but sleep first so another task can cancel meanwhile.
    Slow,
}

struct TracedStep {
    name: &'static str,
    behaviour: Behaviour,
    cleanup_fails: bool,
    journal: Journal,
}

#[async_trait]
impl Step for TracedStep {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, state: &StateBag) -> StepAction {
        self.journal.lock().unwrap().push(format!("run:{}", self.name));
        state.put(self.name, true);
        match self.behaviour {
            Behaviour::Continue => StepAction::Continue,
            Behaviour::Halt => StepAction::Halt,
            Behaviour::Fail => StepAction::Fail(StepError::Internal(format!("{} broke", self.name))),
            Behaviour::Slow => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                StepAction::Continue
            }
        }
    }

    async fn cleanup(&self, _state: &StateBag) -> Result<(), StepError> {
        self.journal.lock().unwrap().push(format!("cleanup:{}", self.name));
        if self.cleanup_fails {
            return Err(StepError::Internal("teardown failed".into()));
        }
        Ok(())
    }
}

fn pipeline(behaviours: &[Behaviour], journal: &Journal) -> Vec<Box<dyn Step>> {
    behaviours
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Box::new(TracedStep {
                name: NAMES[i],
                behaviour: *b,
                cleanup_fails: false,
                journal: journal.clone(),
            }) as Box<dyn Step>
        })
        .collect()
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[tokio::test]
async fn all_continue_runs_in_order_and_cleans_in_reverse() {
    use Behaviour::Continue as C;
    let journal = Journal::default();
    let runner = BasicRunner::new(pipeline(&[C, C, C], &journal));
    let state = StateBag::new();

    runner.run(&state).await;

    assert_eq!(
        entries(&journal),
        ["run:s0", "run:s1", "run:s2", "cleanup:s2", "cleanup:s1", "cleanup:s0"]
    );
    assert!(state.outcome().is_success());
    assert!(!state.is_halted());
    assert!(!state.is_cancelled());
}

#[tokio::test]
async fn halt_stops_advancing_without_error() {
    use Behaviour::{Continue as C, Halt};
    let journal = Journal::default();
    let runner = BasicRunner::new(pipeline(&[C, Halt, C], &journal));
    let state = StateBag::new();

    runner.run(&state).await;

    assert_eq!(entries(&journal), ["run:s0", "run:s1", "cleanup:s1", "cleanup:s0"]);
    assert!(state.is_halted());
    assert!(state.error().is_none());
    assert!(matches!(state.outcome(), BuildOutcome::Halted));
    assert!(!state.contains("s2"));
}

#[tokio::test]
async fn fail_sets_error_and_halted_together() {
    use Behaviour::{Continue as C, Fail};
    let journal = Journal::default();
    let runner = BasicRunner::new(pipeline(&[C, C, Fail, C], &journal));
    let state = StateBag::new();

    runner.run(&state).await;

    assert_eq!(
        entries(&journal),
        ["run:s0", "run:s1", "run:s2", "cleanup:s2", "cleanup:s1", "cleanup:s0"]
    );
    assert!(state.is_halted());
    assert_eq!(state.error().map(|e| e.to_string()), Some("internal error: s2 broke".into()));
    assert!(matches!(state.outcome(), BuildOutcome::Failed(_)));
}

#[tokio::test]
async fn failing_cleanup_does_not_stop_the_unwind() {
    let journal = Journal::default();
    let mut steps = pipeline(&[Behaviour::Continue, Behaviour::Continue], &journal);
    steps.push(Box::new(TracedStep {
        name: NAMES[2],
        behaviour: Behaviour::Continue,
        cleanup_fails: true,
        journal: journal.clone(),
    }));
    let runner = BasicRunner::new(steps);
    let state = StateBag::new();

    runner.run(&state).await;

    assert_eq!(
        entries(&journal),
        ["run:s0", "run:s1", "run:s2", "cleanup:s2", "cleanup:s1", "cleanup:s0"]
    );
    assert!(state.outcome().is_success());
}

#[tokio::test]
async fn cancel_before_run_starts_nothing() {
    let journal = Journal::default();
    let runner = BasicRunner::new(pipeline(&[Behaviour::Continue; 3], &journal));
    let state = StateBag::new();

    runner.cancel();
    runner.run(&state).await;

    assert!(entries(&journal).is_empty());
    assert!(state.is_cancelled());
    assert!(matches!(state.outcome(), BuildOutcome::Cancelled));
}

#[tokio::test]
async fn cancel_during_a_step_is_honored_before_the_next() {
    use Behaviour::{Continue as C, Slow};
    let journal = Journal::default();
    let runner = Arc::new(BasicRunner::new(pipeline(&[C, Slow, C, C], &journal)));
    let state = StateBag::new();

    let token = runner.cancel_token();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        token.cancel();
    });

    runner.run(&state).await;
    canceller.await.unwrap();

    assert_eq!(entries(&journal), ["run:s0", "run:s1", "cleanup:s1", "cleanup:s0"]);
    assert!(state.is_cancelled());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn second_run_is_ignored() {
    let journal = Journal::default();
    let runner = BasicRunner::new(pipeline(&[Behaviour::Continue], &journal));

    runner.run(&StateBag::new()).await;
    let second = StateBag::new();
    runner.run(&second).await;

    assert_eq!(entries(&journal), ["run:s0", "cleanup:s0"]);
    assert!(!second.contains("s0"));
}

/// Pause hook answering from a script and recording every call.
#[derive(Clone, Default)]
struct Scripted {
    answers: Arc<Mutex<VecDeque<DebugDecision>>>,
    seen: Arc<Mutex<Vec<(PauseLocation, String)>>>,
}

impl Scripted {
    fn new(answers: &[DebugDecision]) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.iter().copied().collect())),
            seen: Arc::default(),
        }
    }
}

#[async_trait]
impl DebugPause for Scripted {
    async fn pause(&self, at: PauseLocation, step: &str, _state: &StateBag) -> DebugDecision {
        self.seen.lock().unwrap().push((at, step.to_string()));
        if at == PauseLocation::BeforeCleanup {
            return DebugDecision::Continue;
        }
        self.answers.lock().unwrap().pop_front().unwrap_or_default()
    }
}

#[tokio::test]
async fn debug_skip_next_neither_runs_nor_cleans_the_skipped_step() {
    let journal = Journal::default();
    let hook = Scripted::new(&[DebugDecision::SkipNext]);
    let runner = DebugRunner::with_pause(pipeline(&[Behaviour::Continue; 3], &journal), hook.clone());
    let state = StateBag::new();

    runner.run(&state).await;

    assert_eq!(
        entries(&journal),
        ["run:s0", "run:s2", "cleanup:s2", "cleanup:s0"]
    );
    assert!(state.outcome().is_success());

    let seen = hook.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        [
            (PauseLocation::AfterRun, "s0".to_string()),
            (PauseLocation::AfterRun, "s2".to_string()),
            (PauseLocation::BeforeCleanup, "s2".to_string()),
            (PauseLocation::BeforeCleanup, "s0".to_string()),
        ]
    );
}

#[tokio::test]
async fn debug_abort_marks_cancelled_and_unwinds() {
    let journal = Journal::default();
    let hook = Scripted::new(&[DebugDecision::Continue, DebugDecision::Abort]);
    let runner = DebugRunner::with_pause(pipeline(&[Behaviour::Continue; 4], &journal), hook);
    let state = StateBag::new();

    runner.run(&state).await;

    assert_eq!(entries(&journal), ["run:s0", "run:s1", "cleanup:s1", "cleanup:s0"]);
    assert!(state.is_cancelled());
    assert!(matches!(state.outcome(), BuildOutcome::Cancelled));
}

#[tokio::test]
async fn debug_does_not_pause_after_a_failed_step() {
    let journal = Journal::default();
    let hook = Scripted::new(&[]);
    let runner = DebugRunner::with_pause(pipeline(&[Behaviour::Fail], &journal), hook.clone());
    let state = StateBag::new();

    runner.run(&state).await;

    let seen = hook.seen.lock().unwrap().clone();
    assert_eq!(seen, [(PauseLocation::BeforeCleanup, "s0".to_string())]);
    assert!(matches!(state.outcome(), BuildOutcome::Failed(_)));
}
