//! Progress reporting types for a training run.
//!
//! This module defines [`TrainingStage`], [`ProgressUpdate`], and the
//! [`ProgressCallback`] type alias.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use regviz_learning::{ProgressCallback, ProgressUpdate};
//!
//! let callback: ProgressCallback = Arc::new(|update: ProgressUpdate| {
//!     println!(
//!         "[{}] {:.0}% - {}",
//!         update.stage,
//!         update.progress * 100.0,
//!         update.message
//!     );
//!     if let Some((done, total)) = update.models_completed {
//!         println!("  Models: {}/{}", done, total);
//!     }
//! });
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The current stage of a training run.
///
/// A run moves through these stages in order; it either reaches
/// [`Complete`](Self::Complete) or returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TrainingStage {
    /// Validating the request and configuration.
    #[default]
    Initializing,
    /// Restricting columns and resolving missing values.
    Cleaning,
    /// Detecting feature types and building the preprocessing plan.
    Preprocessing,
    /// Fitting and scoring candidate models.
    Training,
    /// Picking the best candidate and recording its prediction trace.
    Selection,
    /// Saving the selected model.
    Persisting,
    /// Run finished.
    Complete,
}

impl TrainingStage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStage::Initializing => "initializing",
            TrainingStage::Cleaning => "cleaning",
            TrainingStage::Preprocessing => "preprocessing",
            TrainingStage::Training => "training",
            TrainingStage::Selection => "selection",
            TrainingStage::Persisting => "persisting",
            TrainingStage::Complete => "complete",
        }
    }
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress update from a training run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgressUpdate {
    /// The current training stage.
    pub stage: TrainingStage,

    /// Overall progress from 0.0 to 1.0, non-decreasing within a run.
    pub progress: f64,

    /// Human-readable status message.
    pub message: String,

    /// Candidate currently being fitted, during [`Training`](TrainingStage::Training).
    pub current_model: Option<String>,

    /// `(completed, total)` candidates.
    pub models_completed: Option<(u32, u32)>,
}

impl ProgressUpdate {
    pub fn new(stage: TrainingStage, progress: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress,
            message: message.into(),
            current_model: None,
            models_completed: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, name: impl Into<String>, completed: u32, total: u32) -> Self {
        self.current_model = Some(name.into());
        self.models_completed = Some((completed, total));
        self
    }
}

/// Type alias for a progress callback function.
///
/// Callbacks must be thread-safe (`Send + Sync`) and should return quickly;
/// they run inline with training.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Send `update` to `callback` if one is set.
pub(crate) fn report(callback: Option<&ProgressCallback>, update: ProgressUpdate) {
    if let Some(callback) = callback {
        callback(update);
    }
}
