//! Null handling strategies.

use crate::error::ProcessingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How missing values in the selected columns are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullStrategy {
    /// Remove every row with a missing value in any selected column.
    #[default]
    Drop,
    /// Fill numeric columns with their mean and categorical columns with their mode.
    Mean,
    /// Same behaviour as [`NullStrategy::Mean`], reported under its own name.
    Auto,
}

impl NullStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NullStrategy::Drop => "drop",
            NullStrategy::Mean => "mean",
            NullStrategy::Auto => "auto",
        }
    }
}

impl fmt::Display for NullStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NullStrategy {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(NullStrategy::Drop),
            "mean" => Ok(NullStrategy::Mean),
            "auto" => Ok(NullStrategy::Auto),
            _ => Err(ProcessingError::UnsupportedNullStrategy(s.to_string())),
        }
    }
}
