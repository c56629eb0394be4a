//! Process-wide slot for the most recent prediction trace.
//!
//! Only the last recorded run is retained. The trace is tagged with its
//! [`RunId`], so a caller holding an older id gets [`PlotNotFound`] instead of
//! another run's data.
//!
//! [`PlotNotFound`]: RegressionError::PlotNotFound

use crate::error::{RegressionError, Result};
use crate::types::{PlotTrace, RunId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe single-slot store for the latest run's plot trace.
#[derive(Debug, Default)]
pub struct PlotStore {
    next_id: AtomicU64,
    latest: RwLock<Option<(RunId, PlotTrace)>>,
}

static_assertions::assert_impl_all!(PlotStore: Send, Sync);

impl PlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an identifier for a new run.
    pub fn next_run_id(&self) -> RunId {
        RunId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Store `trace` for `run_id`, replacing whatever run was recorded before.
    pub fn record(&self, run_id: RunId, trace: PlotTrace) {
        *self.latest.write() = Some((run_id, trace));
    }

    /// Trace of the most recently recorded run.
    ///
    /// # Errors
    ///
    /// [`RegressionError::PlotNotFound`] if no run has been recorded.
    pub fn latest(&self) -> Result<PlotTrace> {
        self.latest
            .read()
            .as_ref()
            .map(|(_, trace)| trace.clone())
            .ok_or(RegressionError::PlotNotFound)
    }

    /// Trace of `run_id`, if it is still the latest run.
    pub fn get(&self, run_id: RunId) -> Result<PlotTrace> {
        match self.latest.read().as_ref() {
            Some((id, trace)) if *id == run_id => Ok(trace.clone()),
            _ => Err(RegressionError::PlotNotFound),
        }
    }
}
