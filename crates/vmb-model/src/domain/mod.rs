mod env;
pub use env::{Env, KeyValue};

/// Timeout value in milliseconds.
///
/// Used in build configuration wherever an explicit time limit is required.
pub type TimeoutMs = u64;
