//! regviz-learning: train, compare and select regression models.
//!
//! Given a cleaned table and a target column, this crate fits a fixed set of
//! five candidate regression pipelines, scores each on a held-out split and
//! keeps the one with the highest test R². Everything runs natively on
//! [`ndarray`]; there is no external runtime to initialize.
//!
//! # Features
//!
//! - **Fixed candidate catalog**: linear, ridge, lasso, elastic net and
//!   degree-2 polynomial regression
//! - **Leak-free preprocessing**: scaling and one-hot statistics are learned
//!   from the training rows only
//! - **Failure isolation**: a candidate that fails is reported, not fatal
//! - **Model persistence**: the selected pipeline is saved as JSON
//! - **Plot traces**: actual vs. predicted values for the selected model
//! - **Progress Reporting**: stage-by-stage progress callbacks
//!
//! # Quick Start
//!
//! ```no_run
//! use regviz_learning::{RegressionConfig, RegressionService};
//! use regviz_processing::load_csv;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let df = load_csv("houses.csv")?;
//!
//! let service = RegressionService::builder()
//!     .config(RegressionConfig::default())
//!     .build()?;
//!
//! let run = service.run(&df, "price", &["age", "rooms", "city"], Some("mean"))?;
//! println!("Best model: {}", run.response.best_model);
//! println!("{}", serde_json::to_string_pretty(&run.response)?);
//!
//! // Reload the saved pipeline later
//! let model = service.load_model(&run.response.saved_model_filename)?;
//! let predictions = model.predict(&df)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         regviz-processing                          │
//! │  load ──► normalize names ──► validate ──► clean ──► detect types │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          regviz-learning                           │
//! │                                                                   │
//! │  PreprocessorPlan ──► candidate_models ──► TrainingEngine          │
//! │                                              │                    │
//! │                         ModelStorage ◄───────┼──────► PlotStore   │
//! │                                              ▼                    │
//! │                                     RegressionResponse            │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, RegressionError>`]. Errors are
//! grouped by [`RegressionError::kind()`]:
//!
//! - invalid input, such as a missing column or too few rows to split
//! - not found, such as an unknown saved model or no plot yet
//! - systemic, such as every candidate failing
//!
//! See [`RegressionError`] for the complete list.
//!
//! # Modules
//!
//! - [`estimators`] - the linear solvers and polynomial expansion
//! - [`preprocess`] - scaling and one-hot encoding

mod catalog;
mod config;
mod engine;
mod error;
pub mod estimators;
mod plot;
pub mod preprocess;
mod progress;
mod service;
mod storage;
mod types;

// Re-export public API
//
// Configuration types
pub use config::{DEFAULT_MODEL_DIR, RegressionConfig, RegressionConfigBuilder};
// Candidate catalog
pub use catalog::{CandidateModel, FittedModel, ModelKind, candidate_models};
// Training and selection
pub use engine::{
    CandidateOutcome, CandidateResult, MIN_TEST_ROWS, Selection, TrainTestSplit, TrainingEngine,
    TrainingReport, mean_squared_error, r2_score,
};
// Error types
pub use error::RegressionError;
// Plot store
pub use plot::PlotStore;
// Progress reporting types
pub use progress::{ProgressCallback, ProgressUpdate, TrainingStage};
// Service
pub use service::{RegressionService, RegressionServiceBuilder};
// Model persistence
pub use storage::{FsModelStore, ModelStorage, SavedModel};
// Result types
pub use types::{
    DataInfo, ModelComparisonEntry, ModelMetrics, PlotTrace, RegressionResponse, RegressionRun,
    RunId, SplitTrace,
};

pub use regviz_processing::{FeaturePartition, NullStrategy};
