//! Dataset profiling.
//!
//! Three read-only reports over a loaded table:
//! - a preview (shape, column types, null counts, first rows)
//! - an exploratory summary (per-column statistics and correlations)
//! - target and feature recommendations for a regression run
//!
//! Every report is sanitized before it is returned.

mod eda;
mod preview;
mod recommend;
mod statistics;

pub use eda::{CategoricalSummary, ColumnGroups, EdaReport, NumericSummary};
pub use preview::{DEFAULT_PREVIEW_ROWS, PreviewReport};
pub use recommend::{
    DefaultSelection, DropRecommendation, FeatureCandidate, RecommendationReport, TargetCandidate,
};
pub use statistics::{CorrelationMatrix, pearson};

use crate::error::Result;
use polars::prelude::*;
use tracing::info;

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarise the table and show its first `rows` rows.
    pub fn preview(df: &DataFrame, file_name: &str, rows: usize) -> Result<PreviewReport> {
        info!("Previewing {} ({} rows)", file_name, df.height());
        preview::build(df, file_name, rows)
    }

    /// Per-column statistics, head/tail rows and the numeric correlation matrix.
    pub fn eda(df: &DataFrame) -> Result<EdaReport> {
        info!("Running EDA on {} x {} table", df.height(), df.width());
        eda::build(df)
    }

    /// Suggest a target, features and columns to drop.
    pub fn recommend(df: &DataFrame) -> Result<RecommendationReport> {
        info!("Computing column recommendations");
        recommend::build(df)
    }
}
