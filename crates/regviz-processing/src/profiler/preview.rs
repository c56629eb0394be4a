//! Quick CSV preview: shape, columns, null counts and the first rows.

use super::statistics::records;
use crate::error::Result;
use crate::features::detect_feature_types;
use crate::sanitize::Sanitize;
use crate::utils::{column_names, missing_count};
use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default number of preview rows.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct PreviewReport {
    pub filename: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub null_summary: BTreeMap<String, usize>,
    pub preview: Vec<Map<String, Value>>,
}

impl Sanitize for PreviewReport {
    fn sanitize(mut self) -> Self {
        self.preview = self
            .preview
            .into_iter()
            .map(|row| row.into_iter().map(|(k, v)| (k, v.sanitize())).collect())
            .collect();
        self
    }
}

pub(super) fn build(df: &DataFrame, file_name: &str, rows: usize) -> Result<PreviewReport> {
    let columns = column_names(df);
    let partition = detect_feature_types(df, &columns)?;

    let mut null_summary = BTreeMap::new();
    for column in df.get_columns() {
        null_summary.insert(
            column.name().to_string(),
            missing_count(column.as_materialized_series())?,
        );
    }

    Ok(PreviewReport {
        filename: file_name.to_string(),
        total_rows: df.height(),
        total_columns: df.width(),
        columns,
        numeric_columns: partition.numeric,
        null_summary,
        preview: records(&df.head(Some(rows)))?,
    }
    .sanitize())
}
