//! Error types for the regviz-learning crate.
//!
//! This module defines [`RegressionError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, RegressionError>`.
//!
//! # Error Handling
//!
//! Errors fall into the classes a caller has to handle differently, exposed
//! through [`RegressionError::kind()`]:
//! - **Invalid input**: the request is wrong (bad column, unusable split, bad
//!   configuration). Retrying without changing the request is pointless.
//! - **Not found**: a plot trace or saved model that does not exist.
//! - **Systemic**: every candidate model failed, or storage broke.
//!
//! A single candidate failing during training is not an error at this level:
//! it is recorded in the comparison table and the run continues.
//!
//! # Example
//!
//! ```no_run
//! use regviz_learning::{RegressionConfig, RegressionError};
//!
//! fn configure() -> Result<RegressionConfig, RegressionError> {
//!     // Errors are propagated with ?
//!     let config = RegressionConfig::builder()
//!         .test_size(0.25)
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use regviz_processing::{ErrorKind, ProcessingError};
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for regviz-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegressionError {
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data that cannot be fed to a model (nulls, shape mismatch).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Loading, validation or cleaning rejected the request.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// The test partition is too small to score a model.
    #[error(
        "Not enough test samples to evaluate regression ({test_rows} test rows). Please provide more data."
    )]
    InsufficientTestSamples {
        /// Rows that landed in the test partition.
        test_rows: usize,
    },

    /// The split left nothing to train on.
    #[error("Not enough training samples after the train/test split")]
    InsufficientTrainSamples,

    /// Neither numeric nor categorical features were detected.
    #[error("No valid features detected")]
    NoUsableFeatures,

    /// Every candidate model failed to fit or score.
    #[error("All models failed")]
    AllModelsFailed,

    /// The requested saved model does not exist.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The name or path that was looked up.
        path: String,
    },

    /// No training run has recorded a plot trace yet.
    #[error("No regression plot data available. Run regression first.")]
    PlotNotFound,

    /// A model or transform was used before fitting.
    #[error("{0} used before fitting")]
    NotFitted(&'static str),

    /// I/O error during model save/load operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model artifact (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<polars::error::PolarsError> for RegressionError {
    fn from(err: polars::error::PolarsError) -> Self {
        RegressionError::Processing(ProcessingError::Polars(err))
    }
}

impl RegressionError {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::Processing(inner) => inner.error_code(),
            Self::InsufficientTestSamples { .. } => "INSUFFICIENT_TEST_SAMPLES",
            Self::InsufficientTrainSamples => "INSUFFICIENT_TRAIN_SAMPLES",
            Self::NoUsableFeatures => "NO_USABLE_FEATURES",
            Self::AllModelsFailed => "ALL_MODELS_FAILED",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::PlotNotFound => "PLOT_NOT_FOUND",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Classify the error for the boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Processing(inner) => inner.kind(),
            Self::InvalidConfig(_)
            | Self::InvalidData(_)
            | Self::InsufficientTestSamples { .. }
            | Self::InsufficientTrainSamples
            | Self::NoUsableFeatures => ErrorKind::InvalidInput,
            Self::ModelNotFound { .. } | Self::PlotNotFound => ErrorKind::NotFound,
            Self::AllModelsFailed | Self::NotFitted(_) | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Systemic
            }
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for RegressionError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("RegressionError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for regression operations.
pub type Result<T> = std::result::Result<T, RegressionError>;
