//! Shared state container passed by reference to every step.
//!
//! Pipeline data lives in an open string-keyed map. The three slots the runner
//! itself interprets (error, cancelled, halted) are typed fields instead of map
//! entries, so they can only be read and written through dedicated accessors.
use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    communicator::CommunicatorHandle,
    driver::DriverHandle,
    error::{StateError, StepError},
    keys,
    ui::UiHandle,
};

type Value = Box<dyn Any + Send + Sync>;

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    error: Option<StepError>,
    cancelled: bool,
    halted: bool,
}

/// Final interpretation of a finished run.
///
/// Derived by [`StateBag::outcome`] in a fixed priority: error, then
/// cancellation, then halt, then success.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// A step failed; carries the stored error.
    Failed(StepError),
    /// Cancellation was requested and honored between steps.
    Cancelled,
    /// A step stopped the pipeline on purpose without an error.
    Halted,
    /// Every step ran and returned `Continue`.
    Completed,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Completed)
    }
}

/// Concurrent-safe key/value store shared by the runner and all steps.
///
/// Cloning is cheap and every clone observes the same underlying map.
#[derive(Clone, Default)]
pub struct StateBag {
    inner: Arc<RwLock<Inner>>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn put<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.write().values.insert(key.into(), Box::new(value));
    }

    /// Read a value the caller knows must be present.
    ///
    /// An absent key or a value of another type is a contract violation and
    /// is reported as [`StateError`]; use [`StateBag::get_ok`] to check.
    pub fn get<T>(&self, key: &str) -> Result<T, StateError>
    where
        T: Any + Clone,
    {
        let inner = self.read();
        let value = inner
            .values
            .get(key)
            .ok_or_else(|| StateError::Missing(key.to_string()))?;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| StateError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Non-failing lookup: `None` when the key is absent or holds another type.
    pub fn get_ok<T>(&self, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        self.read()
            .values
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().values.contains_key(key)
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.write().values.remove(key).is_some()
    }

    /// Injected platform driver.
    pub fn driver(&self) -> Result<DriverHandle, StateError> {
        self.get(keys::DRIVER)
    }

    /// Injected user-output collaborator.
    pub fn ui(&self) -> Result<UiHandle, StateError> {
        self.get(keys::UI)
    }

    /// Injected guest communicator.
    pub fn communicator(&self) -> Result<CommunicatorHandle, StateError> {
        self.get(keys::COMMUNICATOR)
    }

    pub fn set_error(&self, err: StepError) {
        self.write().error = Some(err);
    }

    pub fn error(&self) -> Option<StepError> {
        self.read().error.clone()
    }

    pub fn mark_cancelled(&self) {
        self.write().cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.read().cancelled
    }

    pub fn mark_halted(&self) {
        self.write().halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.read().halted
    }

    /// Interpret the sentinel slots after the runner returned.
    pub fn outcome(&self) -> BuildOutcome {
        let inner = self.read();
        if let Some(err) = &inner.error {
            BuildOutcome::Failed(err.clone())
        } else if inner.cancelled {
            BuildOutcome::Cancelled
        } else if inner.halted {
            BuildOutcome::Halted
        } else {
            BuildOutcome::Completed
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StateBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        let mut keys: Vec<&str> = inner.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("StateBag")
            .field("keys", &keys)
            .field("error", &inner.error)
            .field("cancelled", &inner.cancelled)
            .field("halted", &inner.halted)
            .finish()
    }
}
