//! Statistical helpers shared by the profiling reports.

use crate::error::Result;
use crate::sanitize::json_number;
use crate::utils::{has_numeric_semantics, is_boolean_dtype, numeric_values};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Pairwise correlation coefficients keyed by column, then by column.
pub type CorrelationMatrix = BTreeMap<String, BTreeMap<String, Option<f64>>>;

/// Render the rows of `df` as JSON records keyed by column name.
pub(crate) fn records(df: &DataFrame) -> Result<Vec<Map<String, Value>>> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let columns = df
        .get_columns()
        .iter()
        .map(|column| json_values(column.as_materialized_series()))
        .collect::<Result<Vec<_>>>()?;

    let rows = (0..df.height())
        .map(|row| {
            names
                .iter()
                .zip(&columns)
                .map(|(name, values)| (name.clone(), values[row].clone()))
                .collect()
        })
        .collect();
    Ok(rows)
}

/// Convert one column into JSON values. Missing cells and non-finite floats
/// become null.
fn json_values(series: &Series) -> Result<Vec<Value>> {
    let dtype = series.dtype();
    let values = if is_boolean_dtype(dtype) {
        series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect()
    } else if dtype.is_integer() {
        series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect()
    } else if has_numeric_semantics(dtype) {
        numeric_values(series)?
            .into_iter()
            .map(|v| v.map_or(Value::Null, json_number))
            .collect()
    } else {
        series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string())))
            .collect()
    };
    Ok(values)
}

/// Pearson correlation over the rows where both values are present.
///
/// `None` when fewer than two complete pairs exist or either side is constant.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Correlation matrix over the given numeric columns.
pub(crate) fn correlation_matrix(df: &DataFrame, columns: &[String]) -> Result<CorrelationMatrix> {
    let values = columns
        .iter()
        .map(|name| -> Result<Vec<Option<f64>>> {
            Ok(numeric_values(df.column(name)?.as_materialized_series())?)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut matrix = CorrelationMatrix::new();
    for (i, row_name) in columns.iter().enumerate() {
        let row = matrix.entry(row_name.clone()).or_default();
        for (j, col_name) in columns.iter().enumerate() {
            row.insert(col_name.clone(), pearson(&values[i], &values[j]));
        }
    }
    Ok(matrix)
}

/// Smallest and largest present value.
pub(crate) fn min_max(values: &[Option<f64>]) -> (Option<f64>, Option<f64>) {
    values
        .iter()
        .flatten()
        .fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), &v| {
            (
                Some(lo.map_or(v, |l| l.min(v))),
                Some(hi.map_or(v, |h| h.max(v))),
            )
        })
}
