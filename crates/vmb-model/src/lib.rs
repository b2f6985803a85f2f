mod domain;
pub use domain::{Env, KeyValue, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{Generation, SwitchKind};

mod spec;
pub use spec::BuildConfig;

mod strategy;
pub use strategy::PollStrategy;
