//! Exploratory summary of a whole table.

use super::statistics::{CorrelationMatrix, correlation_matrix, min_max, records};
use crate::error::Result;
use crate::features::detect_feature_types;
use crate::sanitize::Sanitize;
use crate::utils::{column_names, distinct_count, mean, numeric_values, sample_std, string_values};
use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

const HEAD_TAIL_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnGroups {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub null_count: usize,
}

impl Sanitize for NumericSummary {
    fn sanitize(self) -> Self {
        Self {
            mean: self.mean.sanitize(),
            std: self.std.sanitize(),
            min: self.min.sanitize(),
            max: self.max.sanitize(),
            null_count: self.null_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    pub null_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct EdaReport {
    pub head: Vec<Map<String, Value>>,
    pub tail: Vec<Map<String, Value>>,
    pub columns: ColumnGroups,
    pub summary_statistics: BTreeMap<String, NumericSummary>,
    pub categorical_summary: BTreeMap<String, CategoricalSummary>,
    /// Empty unless the table has at least two numeric columns.
    pub correlation_matrix: CorrelationMatrix,
}

impl Sanitize for EdaReport {
    fn sanitize(self) -> Self {
        let rows = |rows: Vec<Map<String, Value>>| -> Vec<Map<String, Value>> {
            rows.into_iter()
                .map(|row| row.into_iter().map(|(k, v)| (k, v.sanitize())).collect())
                .collect()
        };
        Self {
            head: rows(self.head),
            tail: rows(self.tail),
            columns: self.columns,
            summary_statistics: self.summary_statistics.sanitize(),
            categorical_summary: self.categorical_summary,
            correlation_matrix: self.correlation_matrix.sanitize(),
        }
    }
}

pub(super) fn build(df: &DataFrame) -> Result<EdaReport> {
    let partition = detect_feature_types(df, &column_names(df))?;

    let mut summary_statistics = BTreeMap::new();
    for name in &partition.numeric {
        let series = df.column(name)?.as_materialized_series();
        let values = numeric_values(series)?;
        let (min, max) = min_max(&values);
        summary_statistics.insert(
            name.clone(),
            NumericSummary {
                mean: mean(&values),
                std: sample_std(&values),
                min,
                max,
                null_count: values.iter().filter(|v| v.is_none()).count(),
            },
        );
    }

    let mut categorical_summary = BTreeMap::new();
    for name in &partition.categorical {
        let series = df.column(name)?.as_materialized_series();
        categorical_summary.insert(
            name.clone(),
            CategoricalSummary {
                unique_count: distinct_count(&string_values(series)?),
                null_count: series.null_count(),
            },
        );
    }

    let correlation_matrix = if partition.numeric.len() >= 2 {
        correlation_matrix(df, &partition.numeric)?
    } else {
        CorrelationMatrix::new()
    };

    debug!(
        "EDA over {} numeric and {} categorical columns",
        partition.numeric.len(),
        partition.categorical.len()
    );

    Ok(EdaReport {
        head: records(&df.head(Some(HEAD_TAIL_ROWS)))?,
        tail: records(&df.tail(Some(HEAD_TAIL_ROWS)))?,
        columns: ColumnGroups {
            numeric: partition.numeric,
            categorical: partition.categorical,
        },
        summary_statistics,
        categorical_summary,
        correlation_matrix,
    }
    .sanitize())
}
