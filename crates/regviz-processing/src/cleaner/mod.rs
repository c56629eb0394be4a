//! Data cleaning for a regression request.
//!
//! The cleaner restricts the table to the requested features plus the target
//! and resolves missing values according to a [`NullStrategy`]:
//! - `drop` removes every row with a missing value in a selected column
//! - `mean`/`auto` fill numeric columns with their mean and categorical
//!   columns with their most frequent value
//!
//! Numeric columns come out as `Float64`, with NaN treated as missing.

mod imputation;
mod strategy;

pub use imputation::{CATEGORICAL_FALLBACK, ImputedValue, impute_column};
pub use strategy::NullStrategy;

use crate::error::{ProcessingError, Result};
use crate::utils::{has_numeric_semantics, normalize_numeric};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// What the cleaner did to the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Columns that had missing cells filled, with the value used.
    pub filled: Vec<(String, ImputedValue)>,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Data cleaner bound to one null strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner {
    strategy: NullStrategy,
}

impl DataCleaner {
    pub fn new(strategy: NullStrategy) -> Self {
        Self { strategy }
    }

    /// Produce a cleaned copy of `df` holding exactly `features` then `target`.
    ///
    /// The input table is left untouched.
    pub fn clean<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        features: &[S],
        target: &str,
    ) -> Result<(DataFrame, CleaningReport)> {
        let target_dtype = df.column(target)?.dtype().clone();
        if !has_numeric_semantics(&target_dtype) {
            return Err(ProcessingError::NonNumericTarget(target.to_string()));
        }

        let mut selected: Vec<&str> = Vec::with_capacity(features.len() + 1);
        for name in features.iter().map(AsRef::as_ref).chain(std::iter::once(target)) {
            if selected.contains(&name) {
                debug!("Column '{}' selected twice, keeping first occurrence", name);
                continue;
            }
            selected.push(name);
        }

        info!(
            "Cleaning {} columns with '{}' strategy",
            selected.len(),
            self.strategy
        );

        let mut cleaned = df.select(selected.iter().copied())?;
        let rows_before = cleaned.height();

        for name in &selected {
            let series = cleaned.column(name)?.as_materialized_series().clone();
            if has_numeric_semantics(series.dtype()) {
                cleaned.replace(name, normalize_numeric(&series)?)?;
            }
        }

        let mut filled = Vec::new();
        match self.strategy {
            NullStrategy::Drop => {
                cleaned = drop_incomplete_rows(&cleaned)?;
            }
            NullStrategy::Mean | NullStrategy::Auto => {
                for name in &selected {
                    if let Some(value) = impute_column(&mut cleaned, name)? {
                        debug!("Filled '{}' with {}", name, value);
                        filled.push((name.to_string(), value));
                    }
                }
            }
        }

        let rows_after = cleaned.height();
        if rows_after == 0 {
            return Err(ProcessingError::NoDataLeft);
        }

        info!(
            "Cleaning complete: {} -> {} rows, {} columns imputed",
            rows_before,
            rows_after,
            filled.len()
        );

        Ok((
            cleaned,
            CleaningReport {
                rows_before,
                rows_after,
                filled,
            },
        ))
    }
}

/// Keep only rows with a value in every column.
fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for column in df.get_columns() {
        let nulls = column.as_materialized_series().is_null();
        for (row, is_null) in nulls.into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                keep[row] = false;
            }
        }
    }
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{numeric_values, string_values};

    fn sample() -> DataFrame {
        df! {
            "age" => [Some(20.0), None, Some(40.0), Some(60.0)],
            "city" => [Some("Paris"), Some("Rome"), None, Some("Paris")],
            "unused" => ["a", "b", "c", "d"],
            "price" => [100.0, 200.0, 300.0, 400.0],
        }
        .unwrap()
    }

    #[test]
    fn test_drop_removes_incomplete_rows() {
        let (cleaned, report) = DataCleaner::new(NullStrategy::Drop)
            .clean(&sample(), &["age", "city"], "price")
            .unwrap();

        assert_eq!(cleaned.height(), 2);
        assert_eq!(report.rows_before, 4);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.rows_removed(), 2);
        assert!(report.filled.is_empty());
    }

    #[test]
    fn test_output_holds_features_then_target() {
        let (cleaned, _) = DataCleaner::new(NullStrategy::Drop)
            .clean(&sample(), &["city", "age"], "price")
            .unwrap();
        assert_eq!(
            crate::utils::column_names(&cleaned),
            vec!["city", "age", "price"]
        );
    }

    #[test]
    fn test_mean_keeps_rows_and_fills() {
        let (cleaned, report) = DataCleaner::new(NullStrategy::Mean)
            .clean(&sample(), &["age", "city"], "price")
            .unwrap();

        assert_eq!(cleaned.height(), 4);
        let age = numeric_values(cleaned.column("age").unwrap().as_materialized_series()).unwrap();
        assert_eq!(age[1], Some(40.0));
        let city = string_values(cleaned.column("city").unwrap().as_materialized_series()).unwrap();
        assert_eq!(city[2].as_deref(), Some("Paris"));
        assert_eq!(report.filled.len(), 2);
    }

    #[test]
    fn test_auto_behaves_like_mean() {
        let df = sample();
        let (mean, _) = DataCleaner::new(NullStrategy::Mean)
            .clean(&df, &["age", "city"], "price")
            .unwrap();
        let (auto, _) = DataCleaner::new(NullStrategy::Auto)
            .clean(&df, &["age", "city"], "price")
            .unwrap();
        assert!(mean.equals_missing(&auto));
    }

    #[test]
    fn test_input_untouched() {
        let df = sample();
        let _ = DataCleaner::new(NullStrategy::Mean)
            .clean(&df, &["age"], "price")
            .unwrap();
        assert_eq!(df.column("age").unwrap().null_count(), 1);
        assert_eq!(df.width(), 4);
    }

    #[test]
    fn test_non_numeric_target() {
        let err = DataCleaner::new(NullStrategy::Drop)
            .clean(&sample(), &["age"], "city")
            .unwrap_err();
        assert_eq!(err.to_string(), "Target column 'city' must be numeric");
    }

    #[test]
    fn test_no_data_left() {
        let df = df! {
            "x" => [None::<f64>, None],
            "y" => [1.0, 2.0],
        }
        .unwrap();
        let err = DataCleaner::new(NullStrategy::Drop)
            .clean(&df, &["x"], "y")
            .unwrap_err();
        assert!(matches!(err, ProcessingError::NoDataLeft));
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let df = df! {
            "x" => [1.0, f64::NAN, 3.0],
            "y" => [1.0, 2.0, 3.0],
        }
        .unwrap();
        let (cleaned, _) = DataCleaner::new(NullStrategy::Drop)
            .clean(&df, &["x"], "y")
            .unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_integer_columns_become_float() {
        let df = df! { "x" => [1i64, 2], "y" => [3i32, 4] }.unwrap();
        let (cleaned, _) = DataCleaner::default().clean(&df, &["x"], "y").unwrap();
        assert_eq!(cleaned.column("x").unwrap().dtype(), &DataType::Float64);
        assert_eq!(cleaned.column("y").unwrap().dtype(), &DataType::Float64);
    }
}
