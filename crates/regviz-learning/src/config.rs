//! Configuration for a regression training run.
//!
//! This module provides [`RegressionConfig`] and its builder.
//!
//! # Example
//!
//! ```
//! use regviz_learning::{NullStrategy, RegressionConfig};
//!
//! let config = RegressionConfig::builder()
//!     .test_size(0.25)
//!     .null_strategy(NullStrategy::Mean)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::RegressionError;
use regviz_processing::NullStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory for saved model artifacts.
pub const DEFAULT_MODEL_DIR: &str = "models/saved";

/// Configuration for a regression training run.
///
/// Use [`RegressionConfig::builder()`] to construct a configuration with the
/// builder pattern. Every field has a default matching the service's behaviour.
///
/// # Validation
///
/// [`build()`](RegressionConfigBuilder::build) rejects a `test_size` outside
/// `(0.0, 1.0)` and an empty `model_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Fraction of rows held out for testing (default: 0.2).
    pub test_size: f64,

    /// Seed for the train/test shuffle (default: 42).
    ///
    /// The same seed on the same data gives the same split and the same
    /// selected model.
    pub random_seed: u64,

    /// How missing values are resolved when the request does not say
    /// (default: `drop`).
    pub null_strategy: NullStrategy,

    /// Where selected models are saved (default: `models/saved`).
    pub model_dir: PathBuf,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 42,
            null_strategy: NullStrategy::default(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
        }
    }
}

impl RegressionConfig {
    /// Create a new builder for `RegressionConfig`.
    #[must_use]
    pub fn builder() -> RegressionConfigBuilder {
        RegressionConfigBuilder::default()
    }

    /// Check settings that may have been set without the builder.
    ///
    /// # Errors
    ///
    /// Returns [`RegressionError::InvalidConfig`] if:
    /// - `test_size` is not in range `(0.0, 1.0)` (NaN included)
    /// - `model_dir` is empty
    pub fn validate(&self) -> Result<(), RegressionError> {
        let test_size = self.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(RegressionError::InvalidConfig(format!(
                "test_size must be between 0.0 and 1.0 (exclusive), got {test_size}"
            )));
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(RegressionError::InvalidConfig(
                "model_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`RegressionConfig`].
#[derive(Debug, Clone, Default)]
pub struct RegressionConfigBuilder {
    config: RegressionConfig,
}

impl RegressionConfigBuilder {
    /// Set the test size fraction (default: 0.2).
    ///
    /// [`build()`](Self::build) returns an error if `size <= 0.0` or `size >= 1.0`.
    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    /// Set the random seed for the split (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the default null strategy (default: `drop`).
    #[must_use]
    pub fn null_strategy(mut self, strategy: NullStrategy) -> Self {
        self.config.null_strategy = strategy;
        self
    }

    /// Set the directory for saved models (default: `models/saved`).
    #[must_use]
    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.model_dir = dir.into();
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// See [`RegressionConfig::validate`].
    pub fn build(self) -> Result<RegressionConfig, RegressionError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegressionConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.null_strategy, NullStrategy::Drop);
        assert_eq!(config.model_dir, PathBuf::from("models/saved"));
    }

    #[test]
    fn test_builder() {
        let config = RegressionConfig::builder()
            .test_size(0.3)
            .random_seed(7)
            .null_strategy(NullStrategy::Auto)
            .model_dir("/tmp/models")
            .build()
            .unwrap();

        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.null_strategy, NullStrategy::Auto);
        assert_eq!(config.model_dir, PathBuf::from("/tmp/models"));
    }

    #[test]
    fn test_invalid_test_size() {
        for size in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let result = RegressionConfig::builder().test_size(size).build();
            assert!(result.unwrap_err().to_string().contains("test_size"));
        }
    }

    #[test]
    fn test_empty_model_dir() {
        let result = RegressionConfig::builder().model_dir("").build();
        assert!(result.unwrap_err().to_string().contains("model_dir"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RegressionConfig =
            serde_json::from_str(r#"{"null_strategy": "mean"}"#).unwrap();
        assert_eq!(config.null_strategy, NullStrategy::Mean);
        assert_eq!(config.test_size, 0.2);
    }
}
