//! Table handling for the regression workbench.
//!
//! Everything that works on the raw table before any model sees it lives here.
//!
//! # Overview
//!
//! - **Loading**: CSV files or in-memory uploads into a polars `DataFrame`
//! - **Validation**: column name trimming and request checks
//! - **Cleaning**: restrict to the selected columns and resolve missing values
//! - **Feature detection**: split features into numeric and categorical
//! - **Profiling**: preview, exploratory summary and column recommendations
//! - **Sanitization**: make payloads JSON-safe
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use regviz_processing::{DataCleaner, NullStrategy, detect_feature_types, load_csv};
//! use regviz_processing::validation::{normalize_column_names, validate_selection};
//!
//! let df = normalize_column_names(load_csv("houses.csv")?)?;
//! let selection = validate_selection(&df, "price", &["age", "city"])?;
//!
//! let (cleaned, report) = DataCleaner::new(NullStrategy::Mean)
//!     .clean(&df, &selection.features, &selection.target)?;
//! let partition = detect_feature_types(&cleaned, &selection.features)?;
//!
//! println!("{} rows left, numeric: {:?}", report.rows_after, partition.numeric);
//! ```

pub mod cleaner;
pub mod error;
pub mod features;
pub mod loader;
pub mod profiler;
pub mod sanitize;
pub mod utils;
pub mod validation;

// Re-exports for convenient access
pub use cleaner::{CleaningReport, DataCleaner, ImputedValue, NullStrategy};
pub use error::{ColumnRole, ErrorKind, ProcessingError, Result as ProcessingResult};
pub use features::{FeaturePartition, detect_feature_types};
pub use loader::{load_csv, load_csv_from_reader};
pub use profiler::{DataProfiler, EdaReport, PreviewReport, RecommendationReport};
pub use sanitize::{Sanitize, finite};
pub use validation::{ColumnSelection, normalize_column_names, parse_feature_list, validate_selection};
