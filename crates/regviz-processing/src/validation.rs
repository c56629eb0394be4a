//! Column name normalisation and request validation.
//!
//! Runs before any cleaning: a request that names a column the table does not
//! have is rejected here, naming the offending column.

use crate::error::{ColumnRole, ProcessingError, Result};
use crate::utils::column_names;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Trim surrounding whitespace from every column name.
///
/// Two columns that collide after trimming are rejected.
pub fn normalize_column_names(mut df: DataFrame) -> Result<DataFrame> {
    let trimmed: Vec<String> = column_names(&df)
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut seen = HashSet::with_capacity(trimmed.len());
    for name in &trimmed {
        if !seen.insert(name.as_str()) {
            return Err(ProcessingError::DuplicateColumn(name.clone()));
        }
    }

    df.set_column_names(trimmed.iter().map(String::as_str))?;
    Ok(df)
}

/// Split a comma-separated feature list, dropping blank entries.
pub fn parse_feature_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// A validated request: trimmed target and feature names that all exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    pub target: String,
    pub features: Vec<String>,
}

/// Check that the target and every feature exist in `df`.
///
/// Feature names are trimmed and blank entries dropped; a feature named twice
/// is kept once. Missing features are reported in request order. The target
/// may not appear among the features.
pub fn validate_selection<S: AsRef<str>>(
    df: &DataFrame,
    target: &str,
    raw_features: &[S],
) -> Result<ColumnSelection> {
    let mut features: Vec<String> = Vec::with_capacity(raw_features.len());
    for name in raw_features.iter().map(|name| name.as_ref().trim()) {
        if !name.is_empty() && !features.iter().any(|seen| seen == name) {
            features.push(name.to_string());
        }
    }

    if features.is_empty() {
        return Err(ProcessingError::EmptyFeatureList);
    }

    let available: HashSet<String> = column_names(df).into_iter().collect();
    let target = target.trim().to_string();

    if !available.contains(&target) {
        return Err(ProcessingError::ColumnNotFound {
            role: ColumnRole::Target,
            column: target,
        });
    }

    if let Some(missing) = features.iter().find(|name| !available.contains(*name)) {
        return Err(ProcessingError::ColumnNotFound {
            role: ColumnRole::Feature,
            column: missing.clone(),
        });
    }

    if features.contains(&target) {
        return Err(ProcessingError::TargetInFeatures(target));
    }

    debug!("Validated target '{}' with {} features", target, features.len());
    Ok(ColumnSelection { target, features })
}
