//! Feature type detection.

use crate::error::Result;
use crate::utils::has_numeric_semantics;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Split of the requested features into numeric and categorical columns.
///
/// Both lists keep the request order and together hold every requested
/// feature exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePartition {
    #[serde(rename = "numeric_features")]
    pub numeric: Vec<String>,
    #[serde(rename = "categorical_features")]
    pub categorical: Vec<String>,
}

impl FeaturePartition {
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }
}

/// Classify each feature by the dtype of its column in `df`.
pub fn detect_feature_types<S: AsRef<str>>(
    df: &DataFrame,
    features: &[S],
) -> Result<FeaturePartition> {
    let mut partition = FeaturePartition::default();
    for name in features.iter().map(AsRef::as_ref) {
        if has_numeric_semantics(df.column(name)?.dtype()) {
            partition.numeric.push(name.to_string());
        } else {
            partition.categorical.push(name.to_string());
        }
    }
    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_preserves_order() {
        let df = df! {
            "b" => ["x", "y"],
            "a" => [1, 2],
            "flag" => [true, false],
            "c" => ["p", "q"],
            "d" => [0.5, 1.5],
        }
        .unwrap();

        let partition = detect_feature_types(&df, &["c", "d", "b", "flag", "a"]).unwrap();
        assert_eq!(partition.numeric, vec!["d", "flag", "a"]);
        assert_eq!(partition.categorical, vec!["c", "b"]);
        assert_eq!(partition.len(), 5);
    }

    #[test]
    fn test_empty_request() {
        let df = df! { "a" => [1] }.unwrap();
        let partition = detect_feature_types::<&str>(&df, &[]).unwrap();
        assert!(partition.is_empty());
    }

    #[test]
    fn test_serializes_with_response_names() {
        let partition = FeaturePartition {
            numeric: vec!["age".into()],
            categorical: vec!["city".into()],
        };
        let json = serde_json::to_value(&partition).unwrap();
        assert_eq!(json["numeric_features"][0], "age");
        assert_eq!(json["categorical_features"][0], "city");
    }
}
