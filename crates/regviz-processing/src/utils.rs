//! Shared utilities for working with polars columns.
//!
//! Most of the crate reads a column once into plain Rust values
//! (`Vec<Option<f64>>` or `Vec<Option<String>>`) and works on those, so the
//! polars surface stays in this module.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// Check if a column holds values with numeric semantics.
///
/// Booleans count as numeric: they average and scale like 0/1 values.
#[inline]
pub fn has_numeric_semantics(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) || is_boolean_dtype(dtype)
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Names of all columns, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Read a numeric column as `f64` values. NaN is reported as missing.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read any column as its string rendering.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Count missing entries of a column, treating NaN as missing for numeric data.
pub fn missing_count(series: &Series) -> PolarsResult<usize> {
    if has_numeric_semantics(series.dtype()) {
        Ok(numeric_values(series)?.iter().filter(|v| v.is_none()).count())
    } else {
        Ok(series.null_count())
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Mean of the present values.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Sample standard deviation (n - 1) of the present values.
pub fn sample_std(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < 2 {
        return None;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let variance =
        present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (present.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Most frequent present value.
///
/// Ties resolve to the lexicographically smallest value so the result does
/// not depend on hash order.
pub fn mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(value, _)| value.to_string())
}

/// Number of distinct present values.
pub fn distinct_count(values: &[Option<String>]) -> usize {
    let mut seen: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill missing values in a numeric Series, producing a `Float64` Series.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Series with a string, producing a `String` Series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = string_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Rebuild a numeric Series as `Float64` with NaN turned into null.
pub fn normalize_numeric(series: &Series) -> PolarsResult<Series> {
    Ok(Series::new(series.name().clone(), numeric_values(series)?))
}

// =============================================================================
// Tests
// =============================================================================
