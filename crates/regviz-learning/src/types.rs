//! Common types returned by a regression run.
//!
//! # Overview
//!
//! - [`RegressionResponse`]: the payload handed back to the caller
//! - [`ModelComparisonEntry`]: metrics or failure reason for one candidate
//! - [`DataInfo`]: row counts and the null strategy that was applied
//! - [`PlotTrace`]: actual vs. predicted values of the selected model
//! - [`RegressionRun`]: response, plot trace and run identifier together
//!
//! # Example
//!
//! ```ignore
//! let run = service.run(&df, "price", &["age", "city"], Some("mean"))?;
//!
//! println!("Best model: {}", run.response.best_model);
//! for (name, entry) in &run.response.model_comparison {
//!     println!("{name}: {entry:?}");
//! }
//! ```

use regviz_processing::{FeaturePartition, NullStrategy, Sanitize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scores of one successfully fitted candidate.
///
/// `None` marks a value that is not defined, for example R² on a partition
/// whose target has zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub train_r2: Option<f64>,
    pub test_r2: Option<f64>,
    pub test_mse: Option<f64>,
}

impl Sanitize for ModelMetrics {
    fn sanitize(self) -> Self {
        Self {
            train_r2: self.train_r2.sanitize(),
            test_r2: self.test_r2.sanitize(),
            test_mse: self.test_mse.sanitize(),
        }
    }
}

/// One row of the model comparison table.
///
/// Serializes as either `{"error": "..."}` or the metrics object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelComparisonEntry {
    // Listed first: every metrics field is optional, so a failure object
    // would otherwise parse as empty metrics.
    Failed { error: String },
    Scored(ModelMetrics),
}

impl ModelComparisonEntry {
    pub fn metrics(&self) -> Option<&ModelMetrics> {
        match self {
            ModelComparisonEntry::Scored(metrics) => Some(metrics),
            ModelComparisonEntry::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ModelComparisonEntry::Failed { .. })
    }
}

impl Sanitize for ModelComparisonEntry {
    fn sanitize(self) -> Self {
        match self {
            ModelComparisonEntry::Scored(metrics) => {
                ModelComparisonEntry::Scored(metrics.sanitize())
            }
            failed => failed,
        }
    }
}

/// Dataset sizing for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInfo {
    /// Rows after cleaning.
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub null_strategy: NullStrategy,
}

/// The payload returned for a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResponse {
    pub best_model: String,
    pub model_comparison: BTreeMap<String, ModelComparisonEntry>,
    pub feature_engineering: FeaturePartition,
    pub data_info: DataInfo,
    pub saved_model_filename: String,
}

impl Sanitize for RegressionResponse {
    fn sanitize(self) -> Self {
        Self {
            model_comparison: self.model_comparison.sanitize(),
            ..self
        }
    }
}

/// Actual and predicted target values for one partition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitTrace {
    pub y_actual: Vec<f64>,
    pub y_pred: Vec<f64>,
}

impl SplitTrace {
    pub fn new(y_actual: Vec<f64>, y_pred: Vec<f64>) -> Self {
        Self { y_actual, y_pred }
    }

    pub fn len(&self) -> usize {
        self.y_actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_actual.is_empty()
    }
}

/// Prediction trace of the selected model, for actual-vs-predicted plots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlotTrace {
    pub train: SplitTrace,
    pub test: SplitTrace,
}

/// Identifier of one training run, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionRun {
    pub run_id: RunId,
    pub response: RegressionResponse,
    pub plot: PlotTrace,
}
