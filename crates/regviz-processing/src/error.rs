//! Error types for table loading, validation and cleaning.
//!
//! Every variant maps onto one of three outcomes a caller has to tell apart:
//! the input was wrong and the user can fix it, something was not found, or
//! the system itself failed. [`ProcessingError::kind()`] exposes that
//! classification; [`ProcessingError::error_code()`] gives a stable code for
//! the boundary.
//!
//! Errors are serializable as `{code, message}` so they can be handed to a
//! front end as-is.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Which side of a request a column was named on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Target,
    Feature,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Target => "Target",
            ColumnRole::Feature => "Feature",
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request itself is wrong; retrying without changing it is pointless.
    InvalidInput,
    /// A requested resource does not exist.
    NotFound,
    /// The system failed to produce a result for a valid request.
    Systemic,
}

/// The main error type for the processing crate.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Uploaded file does not carry a `.csv` extension.
    #[error("File must be a CSV (got '{0}')")]
    UnsupportedFileType(String),

    /// The file could not be parsed as CSV.
    #[error("Invalid CSV format: {0}")]
    InvalidCsv(String),

    /// The parsed table has no rows.
    #[error("CSV file is empty")]
    EmptyDataset,

    /// Two columns share a name once surrounding whitespace is removed.
    #[error("Duplicate column '{0}' after trimming column names")]
    DuplicateColumn(String),

    /// No feature columns were requested.
    #[error("Feature columns cannot be empty")]
    EmptyFeatureList,

    /// A requested column does not exist in the table.
    #[error("{role} column '{column}' not found")]
    ColumnNotFound { role: ColumnRole, column: String },

    /// The target was also requested as a feature.
    #[error("Target column '{0}' cannot also be a feature")]
    TargetInFeatures(String),

    /// The null strategy string is not one of the supported values.
    #[error("Invalid null_strategy '{0}'. Use 'drop', 'mean' or 'auto'.")]
    UnsupportedNullStrategy(String),

    /// The regression target holds non-numeric values.
    #[error("Target column '{0}' must be numeric")]
    NonNumericTarget(String),

    /// Cleaning removed every row.
    #[error("No data left after cleaning")]
    NoDataLeft,

    /// A column has no present values to compute a statistic from.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProcessingError {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::InvalidCsv(_) => "INVALID_CSV",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::EmptyFeatureList => "EMPTY_FEATURE_LIST",
            Self::ColumnNotFound { .. } => "COLUMN_NOT_FOUND",
            Self::TargetInFeatures(_) => "TARGET_IN_FEATURES",
            Self::UnsupportedNullStrategy(_) => "UNSUPPORTED_NULL_STRATEGY",
            Self::NonNumericTarget(_) => "NON_NUMERIC_TARGET",
            Self::NoDataLeft => "NO_DATA_LEFT",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Classify the error for the boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Polars(_) | Self::Json(_) => ErrorKind::Systemic,
            _ => ErrorKind::InvalidInput,
        }
    }

    /// Check if the caller can fix this by changing the request.
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

/// Serialize implementation for boundary compatibility.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;
