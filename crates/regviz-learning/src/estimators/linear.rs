//! Normal-equation estimators: ordinary least squares and ridge.

use super::linalg::{cholesky_solve, pinv_solve};
use super::{LinearCoefficients, Regressor, center};
use crate::error::{RegressionError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Ordinary least squares.
///
/// Solves the centred normal equations through the pseudo-inverse, giving the
/// minimum-norm solution when columns are collinear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    fitted: Option<LinearCoefficients>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted weights and intercept, if any.
    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let centered = center(x, y)?;
        let xtx = centered.x.t().dot(&centered.x);
        let xty = centered.x.t().dot(&centered.y);
        let weights = pinv_solve(&xtx, &xty);
        self.fitted = Some(centered.coefficients(weights));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(RegressionError::NotFitted("LinearRegression"))?
            .predict(x)
    }
}

/// L2-regularized least squares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub alpha: f64,
    fitted: Option<LinearCoefficients>,
}

impl Default for Ridge {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Ridge {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fitted: None,
        }
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }
}

impl Regressor for Ridge {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let centered = center(x, y)?;
        let mut xtx = centered.x.t().dot(&centered.x);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = centered.x.t().dot(&centered.y);

        let weights = cholesky_solve(&xtx, &xty).ok_or_else(|| {
            RegressionError::InvalidData("ridge system is not positive definite".to_string())
        })?;
        self.fitted = Some(centered.coefficients(weights));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(RegressionError::NotFitted("Ridge"))?
            .predict(x)
    }
}
