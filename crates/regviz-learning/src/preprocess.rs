//! Column-wise preprocessing: scale numeric features, one-hot encode
//! categorical ones.
//!
//! A [`PreprocessorPlan`] only names the columns. Calling
//! [`fit`](PreprocessorPlan::fit) on the training partition learns the
//! statistics (means, scales, category lists) into a [`FittedPreprocessor`],
//! which is then applied unchanged to any later table. Nothing is learned from
//! the data it transforms.
//!
//! Output layout: numeric columns in plan order, then one block per
//! categorical column with one column per category (sorted). A category not
//! seen during fitting encodes as an all-zero block.

use crate::error::{RegressionError, Result};
use ndarray::Array2;
use polars::prelude::*;
use regviz_processing::FeaturePartition;
use regviz_processing::utils::{numeric_values, string_values};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Which columns get scaled and which get one-hot encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorPlan {
    numeric: Vec<String>,
    categorical: Vec<String>,
}

impl PreprocessorPlan {
    /// Create a plan. At least one of the lists must be non-empty.
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Result<Self> {
        if numeric.is_empty() && categorical.is_empty() {
            return Err(RegressionError::NoUsableFeatures);
        }
        Ok(Self {
            numeric,
            categorical,
        })
    }

    pub fn from_partition(partition: &FeaturePartition) -> Result<Self> {
        Self::new(partition.numeric.clone(), partition.categorical.clone())
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    /// Learn scaling and category statistics from `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedPreprocessor> {
        if df.height() == 0 {
            return Err(RegressionError::InvalidData(
                "cannot fit preprocessing on an empty table".to_string(),
            ));
        }

        let scalers = self
            .numeric
            .iter()
            .map(|name| {
                let values = complete_numeric(df, name)?;
                Ok(StandardScaler::fit(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        let encoders = self
            .categorical
            .iter()
            .map(|name| {
                let values = complete_strings(df, name)?;
                Ok(OneHotEncoder::fit(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        let fitted = FittedPreprocessor { scalers, encoders };
        debug!(
            "Fitted preprocessing: {} input columns -> {} features",
            self.numeric.len() + self.categorical.len(),
            fitted.n_features_out()
        );
        Ok(fitted)
    }
}

/// Zero-mean, unit-variance scaling for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation, or 1.0 for a constant column.
    pub scale: f64,
}

impl StandardScaler {
    fn fit(column: &str, values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
        Self {
            column: column.to_string(),
            mean,
            scale,
        }
    }

    fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// One-hot encoding for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Sorted categories seen during fitting.
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    fn fit(column: &str, values: &[String]) -> Self {
        let categories: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        Self {
            column: column.to_string(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    /// Position of `value` in the block, or `None` for an unseen category.
    fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// Preprocessing with its learned parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    scalers: Vec<StandardScaler>,
    encoders: Vec<OneHotEncoder>,
}

impl FittedPreprocessor {
    pub fn scalers(&self) -> &[StandardScaler] {
        &self.scalers
    }

    pub fn encoders(&self) -> &[OneHotEncoder] {
        &self.encoders
    }

    pub fn n_features_out(&self) -> usize {
        self.scalers.len() + self.encoders.iter().map(|e| e.categories.len()).sum::<usize>()
    }

    /// Output column names: numeric names, then `{column}_{category}`.
    pub fn feature_names(&self) -> Vec<String> {
        self.scalers
            .iter()
            .map(|s| s.column.clone())
            .chain(self.encoders.iter().flat_map(|e| {
                e.categories
                    .iter()
                    .map(move |category| format!("{}_{}", e.column, category))
            }))
            .collect()
    }

    /// Build the design matrix for `df` using the learned parameters.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let rows = df.height();
        let mut out = Array2::<f64>::zeros((rows, self.n_features_out()));

        for (col, scaler) in self.scalers.iter().enumerate() {
            let values = complete_numeric(df, &scaler.column)?;
            for (row, value) in values.into_iter().enumerate() {
                out[[row, col]] = scaler.transform(value);
            }
        }

        let mut offset = self.scalers.len();
        for encoder in &self.encoders {
            let values = complete_strings(df, &encoder.column)?;
            for (row, value) in values.iter().enumerate() {
                if let Some(idx) = encoder.index_of(value) {
                    out[[row, offset + idx]] = 1.0;
                }
            }
            offset += encoder.categories.len();
        }

        Ok(out)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| RegressionError::InvalidData(format!("column '{name}' is missing")))
}

/// Numeric values of a column that must not contain missing entries.
fn complete_numeric(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    numeric_values(column(df, name)?)?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                RegressionError::InvalidData(format!("column '{name}' contains missing values"))
            })
        })
        .collect()
}

/// String values of a column that must not contain missing entries.
fn complete_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    string_values(column(df, name)?)?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                RegressionError::InvalidData(format!("column '{name}' contains missing values"))
            })
        })
        .collect()
}
