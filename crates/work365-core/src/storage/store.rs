//! Persistence seam for the interval timer.
//!
//! The engine defines the shape of the saved record; a [`TimerStore`]
//! decides where it lives. The record is loaded once at startup and
//! written back after every mutation.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::error::{CoreError, Result};
use crate::workout::{IntervalTimerEngine, PresetLibrary, TimerRunState};

/// Everything that survives a restart: the preset library and the
/// last run state, stored as one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTimer {
    #[serde(default)]
    pub presets: PresetLibrary,
    #[serde(flatten)]
    pub state: TimerRunState,
}

impl PersistedTimer {
    pub fn from_engine(engine: &IntervalTimerEngine) -> Self {
        Self {
            presets: engine.presets().clone(),
            state: engine.state().clone(),
        }
    }

    pub fn into_engine(self) -> IntervalTimerEngine {
        IntervalTimerEngine::from_parts(self.state, self.presets)
    }
}

pub trait TimerStore {
    /// Load the saved record, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<PersistedTimer>>;

    fn save(&self, record: &PersistedTimer) -> Result<()>;
}

impl<T: TimerStore + ?Sized> TimerStore for &T {
    fn load(&self) -> Result<Option<PersistedTimer>> {
        (**self).load()
    }

    fn save(&self, record: &PersistedTimer) -> Result<()> {
        (**self).save(record)
    }
}

/// Restore an engine from `store`.
///
/// A missing, unreadable or corrupt record yields a fresh engine with the
/// built-in presets; the failure is logged, not returned.
pub fn load_engine<S: TimerStore + ?Sized>(store: &S) -> IntervalTimerEngine {
    match store.load() {
        Ok(Some(record)) => record.into_engine(),
        Ok(None) => IntervalTimerEngine::new(),
        Err(e) => {
            warn!(error = %e, "could not restore timer state, starting fresh");
            IntervalTimerEngine::new()
        }
    }
}

/// In-process store. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<Option<PersistedTimer>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the last saved record.
    pub fn snapshot(&self) -> Option<PersistedTimer> {
        self.record.lock().ok().and_then(|r| r.clone())
    }
}

impl TimerStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedTimer>> {
        let guard = self
            .record
            .lock()
            .map_err(|_| CoreError::Custom("timer store lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, record: &PersistedTimer) -> Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| CoreError::Custom("timer store lock poisoned".into()))?;
        *guard = Some(record.clone());
        Ok(())
    }
}
