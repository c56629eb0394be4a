//! Target and feature suggestions for a regression run.
//!
//! A simple correlation heuristic: a good target is a numeric column that many
//! other numeric columns correlate with, and a good feature correlates with the
//! chosen target. Categorical columns are always offered as features.

use super::statistics::{CorrelationMatrix, correlation_matrix};
use crate::error::Result;
use crate::features::detect_feature_types;
use crate::sanitize::Sanitize;
use crate::utils::{column_names, distinct_count, numeric_values, sample_std, string_values};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

const DROP_NULL_RATIO: f64 = 0.5;
const DROP_UNIQUE_RATIO: f64 = 0.95;
const TARGET_CORRELATION: f64 = 0.3;
const FEATURE_CORRELATION: f64 = 0.2;
const DEFAULT_FEATURE_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropRecommendation {
    pub column: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetCandidate {
    pub column: String,
    /// Number of other numeric columns with |r| above the target threshold.
    pub score: usize,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeatureCandidate {
    Numeric {
        column: String,
        correlation: Option<f64>,
    },
    Categorical {
        column: String,
        note: String,
    },
}

impl FeatureCandidate {
    pub fn column(&self) -> &str {
        match self {
            FeatureCandidate::Numeric { column, .. } | FeatureCandidate::Categorical { column, .. } => {
                column
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefaultSelection {
    pub target: Option<String>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct RecommendationReport {
    pub target_candidates: Vec<TargetCandidate>,
    pub feature_candidates: Vec<FeatureCandidate>,
    pub drop_recommendations: Vec<DropRecommendation>,
    pub default_selection: DefaultSelection,
}

impl Sanitize for RecommendationReport {
    fn sanitize(mut self) -> Self {
        for candidate in &mut self.target_candidates {
            candidate.std = candidate.std.sanitize();
        }
        for candidate in &mut self.feature_candidates {
            if let FeatureCandidate::Numeric { correlation, .. } = candidate {
                *correlation = correlation.sanitize();
            }
        }
        self
    }
}

pub(super) fn build(df: &DataFrame) -> Result<RecommendationReport> {
    let columns = column_names(df);
    let partition = detect_feature_types(df, &columns)?;
    let rows = df.height().max(1) as f64;

    let mut drop_recommendations = Vec::new();
    for name in &columns {
        let series = df.column(name)?.as_materialized_series();
        let values = string_values(series)?;
        let nulls = if partition.numeric.contains(name) {
            numeric_values(series)?.iter().filter(|v| v.is_none()).count()
        } else {
            values.iter().filter(|v| v.is_none()).count()
        };

        let reason = if nulls as f64 / rows > DROP_NULL_RATIO {
            Some("High null ratio (>50%)")
        } else if distinct_count(&values) as f64 / rows > DROP_UNIQUE_RATIO {
            Some("Likely ID / high cardinality")
        } else {
            None
        };
        if let Some(reason) = reason {
            drop_recommendations.push(DropRecommendation {
                column: name.clone(),
                reason: reason.to_string(),
            });
        }
    }

    let correlations = if partition.numeric.len() >= 2 {
        Some(correlation_matrix(df, &partition.numeric)?)
    } else {
        None
    };

    let mut target_candidates = Vec::new();
    for name in &partition.numeric {
        let std = sample_std(&numeric_values(df.column(name)?.as_materialized_series())?);
        if std == Some(0.0) {
            continue;
        }
        target_candidates.push(TargetCandidate {
            column: name.clone(),
            score: correlated_count(correlations.as_ref(), name),
            std,
        });
    }
    // Stable: equal keys keep column order.
    target_candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| compare_std(b.std, a.std))
    });

    let mut feature_candidates = Vec::new();
    if let Some(best) = target_candidates.first() {
        for name in columns.iter().filter(|name| **name != best.column) {
            if partition.numeric.contains(name) {
                let correlation = correlations
                    .as_ref()
                    .and_then(|m| m.get(name))
                    .and_then(|row| row.get(&best.column).copied().flatten());
                if correlation.is_some_and(|r| r.abs() > FEATURE_CORRELATION) {
                    feature_candidates.push(FeatureCandidate::Numeric {
                        column: name.clone(),
                        correlation,
                    });
                }
            } else {
                feature_candidates.push(FeatureCandidate::Categorical {
                    column: name.clone(),
                    note: "Will be OneHotEncoded".to_string(),
                });
            }
        }
    }

    let default_selection = DefaultSelection {
        target: target_candidates.first().map(|c| c.column.clone()),
        features: feature_candidates
            .iter()
            .take(DEFAULT_FEATURE_COUNT)
            .map(|c| c.column().to_string())
            .collect(),
    };

    Ok(RecommendationReport {
        target_candidates,
        feature_candidates,
        drop_recommendations,
        default_selection,
    }
    .sanitize())
}

/// Count the other numeric columns correlated with `name` above the threshold.
fn correlated_count(matrix: Option<&CorrelationMatrix>, name: &str) -> usize {
    matrix
        .and_then(|m| m.get(name))
        .map(|row| {
            row.iter()
                .filter(|(other, r)| {
                    other.as_str() != name && r.is_some_and(|r| r.abs() > TARGET_CORRELATION)
                })
                .count()
        })
        .unwrap_or(0)
}

/// Order standard deviations with a missing value below any present one.
fn compare_std(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
