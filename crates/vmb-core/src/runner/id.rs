use std::sync::atomic::{AtomicU64, Ordering};

/// Global monotonically increasing sequence for run identifiers.
///
/// Local to the current process.
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

/// Returns next numeric sequence value.
fn next_seq() -> u64 {
    RUN_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Build a human-readable run id attached to the runner's tracing span.
///
/// Format: `{runner}-{seq:x}`.
/// - `runner` — Runner::name()
/// - `seq`    — per-process hex sequence
pub fn make_run_id(runner_name: &str) -> String {
    format!("{runner_name}-{seq:x}", seq = next_seq())
}

#[cfg(test)]
mod tests {
    use super::make_run_id;

    #[test]
    fn run_ids_are_prefixed_and_unique() {
        let a = make_run_id("basic");
        let b = make_run_id("basic");

        assert!(a.starts_with("basic-"));
        assert_ne!(a, b);
    }
}
