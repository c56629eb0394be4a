//! Column imputation used by the `mean`/`auto` strategies.

use crate::error::{ProcessingError, Result};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, has_numeric_semantics, mean, missing_count, mode,
    numeric_values, string_values,
};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;

/// Literal used for a categorical column with no observed values.
pub const CATEGORICAL_FALLBACK: &str = "Unknown";

/// A value written into the missing cells of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImputedValue {
    Numeric(f64),
    Text(String),
}

impl fmt::Display for ImputedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputedValue::Numeric(v) => write!(f, "{v}"),
            ImputedValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Fill the missing cells of `col_name` in place.
///
/// Returns the value used, or `None` if the column had nothing to fill.
pub fn impute_column(df: &mut DataFrame, col_name: &str) -> Result<Option<ImputedValue>> {
    let series = df.column(col_name)?.as_materialized_series().clone();
    if missing_count(&series)? == 0 {
        return Ok(None);
    }

    if has_numeric_semantics(series.dtype()) {
        let fill = mean(&numeric_values(&series)?)
            .ok_or_else(|| ProcessingError::NoValidValues(col_name.to_string()))?;
        df.replace(col_name, fill_numeric_nulls(&series, fill)?)?;
        Ok(Some(ImputedValue::Numeric(fill)))
    } else {
        let fill = mode(&string_values(&series)?)
            .unwrap_or_else(|| CATEGORICAL_FALLBACK.to_string());
        df.replace(col_name, fill_string_nulls(&series, &fill)?)?;
        Ok(Some(ImputedValue::Text(fill)))
    }
}
