//! Logger setup for vmb builds.
//!
//! Installs a global `tracing` subscriber writing text, JSON or journald
//! output. Steps and runners only use `tracing` macros; this crate decides
//! where the events go.
mod logger;
pub use logger::*;
