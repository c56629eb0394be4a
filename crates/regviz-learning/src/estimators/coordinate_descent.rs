//! L1 and mixed L1/L2 penalized least squares by cyclic coordinate descent.
//!
//! Both estimators minimize
//!
//! ```text
//! (1 / 2n) ‖y − Xw‖² + α·ρ·‖w‖₁ + ½·α·(1 − ρ)·‖w‖²
//! ```
//!
//! with `ρ = 1` for [`Lasso`] and `ρ = l1_ratio` for [`ElasticNet`].

use super::{LinearCoefficients, Regressor, center};
use crate::error::{RegressionError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_MAX_ITER: usize = 1000;
pub const DEFAULT_TOL: f64 = 1e-4;

/// Soft-threshold operator for the L1 proximal step.
fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Run coordinate descent on centred data.
///
/// Returns the weights and whether the largest coordinate update fell below
/// `tol` relative to the largest weight.
fn coordinate_descent(
    x: &Array2<f64>,
    y: &Array1<f64>,
    l1_penalty: f64,
    l2_penalty: f64,
    max_iter: usize,
    tol: f64,
) -> (Array1<f64>, bool) {
    let n_features = x.ncols();
    let col_norms: Vec<f64> = (0..n_features)
        .map(|j| x.column(j).mapv(|v| v * v).sum())
        .collect();

    let mut w = Array1::<f64>::zeros(n_features);
    let mut residual = y.clone();

    for iteration in 0..max_iter {
        let mut max_delta = 0.0_f64;
        let mut max_weight = 0.0_f64;

        for j in 0..n_features {
            let column = x.column(j);
            let old = w[j];
            let new = if col_norms[j] < 1e-15 {
                0.0
            } else {
                let rho = column.dot(&residual) + col_norms[j] * old;
                soft_threshold(rho, l1_penalty) / (col_norms[j] + l2_penalty)
            };

            if new != old {
                residual.scaled_add(old - new, &column);
                w[j] = new;
            }
            max_delta = max_delta.max((new - old).abs());
            max_weight = max_weight.max(new.abs());
        }

        if max_delta == 0.0 || max_delta <= tol * max_weight {
            debug!("Coordinate descent converged after {} iterations", iteration + 1);
            return (w, true);
        }
    }
    (w, false)
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha.is_finite() && alpha >= 0.0 {
        Ok(())
    } else {
        Err(RegressionError::InvalidConfig(format!(
            "alpha must be a non-negative number, got {alpha}"
        )))
    }
}

/// L1-regularized least squares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lasso {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    fitted: Option<LinearCoefficients>,
}

impl Lasso {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            fitted: None,
        }
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }
}

impl Regressor for Lasso {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_alpha(self.alpha)?;
        let centered = center(x, y)?;
        let n = centered.x.nrows() as f64;

        let (weights, converged) = coordinate_descent(
            &centered.x,
            &centered.y,
            self.alpha * n,
            0.0,
            self.max_iter,
            self.tol,
        );
        if !converged {
            warn!(
                "Lasso did not converge within {} iterations (alpha={})",
                self.max_iter, self.alpha
            );
        }
        self.fitted = Some(centered.coefficients(weights));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(RegressionError::NotFitted("Lasso"))?
            .predict(x)
    }
}

/// Mixed L1/L2 regularized least squares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticNet {
    pub alpha: f64,
    /// Share of the penalty that is L1 (`0.0` is ridge-like, `1.0` is lasso).
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    fitted: Option<LinearCoefficients>,
}

impl ElasticNet {
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            fitted: None,
        }
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.fitted.as_ref()
    }
}

impl Regressor for ElasticNet {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_alpha(self.alpha)?;
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(RegressionError::InvalidConfig(format!(
                "l1_ratio must be within [0, 1], got {}",
                self.l1_ratio
            )));
        }
        let centered = center(x, y)?;
        let n = centered.x.nrows() as f64;

        let (weights, converged) = coordinate_descent(
            &centered.x,
            &centered.y,
            self.alpha * self.l1_ratio * n,
            self.alpha * (1.0 - self.l1_ratio) * n,
            self.max_iter,
            self.tol,
        );
        if !converged {
            warn!(
                "ElasticNet did not converge within {} iterations (alpha={}, l1_ratio={})",
                self.max_iter, self.alpha, self.l1_ratio
            );
        }
        self.fitted = Some(centered.coefficients(weights));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.fitted
            .as_ref()
            .ok_or(RegressionError::NotFitted("ElasticNet"))?
            .predict(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line() -> (Array2<f64>, Array1<f64>) {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0];
        (x, y)
    }

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
    }

    #[test]
    fn test_lasso_single_feature_closed_form() {
        // With one feature the coordinate update is exact:
        // w = S(xᵀy, nα) / xᵀx on centred data, here S(20, 5 * 0.1) / 10.
        let (x, y) = line();
        let mut model = Lasso::new(0.1);
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((coef.weights[0] - 1.95).abs() < 1e-9);
        assert!((coef.intercept - (5.0 - 1.95 * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_lasso_large_alpha_zeroes_weights() {
        let (x, y) = line();
        let mut model = Lasso::new(100.0);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.coefficients().unwrap().weights[0], 0.0);
        let pred = model.predict(&array![[10.0]]).unwrap();
        assert!((pred[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_elastic_net_single_feature_closed_form() {
        // w = S(20, n·α·ρ) / (10 + n·α·(1 − ρ)) with n = 5, α = 0.2, ρ = 0.5
        let (x, y) = line();
        let mut model = ElasticNet::new(0.2, 0.5);
        model.fit(&x, &y).unwrap();
        let expected = (20.0 - 0.5) / (10.0 + 0.5);
        assert!((model.coefficients().unwrap().weights[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_lasso_selects_relevant_feature() {
        let x = array![
            [1.0, 0.3],
            [2.0, -0.1],
            [3.0, 0.2],
            [4.0, -0.3],
            [5.0, 0.1],
            [6.0, -0.2]
        ];
        let y = x.column(0).mapv(|v| 3.0 * v);
        let mut model = Lasso::new(0.5);
        model.fit(&x, &y).unwrap();
        let w = &model.coefficients().unwrap().weights;
        assert!(w[0] > 2.0);
        assert_eq!(w[1], 0.0);
    }

    #[test]
    fn test_invalid_l1_ratio() {
        let (x, y) = line();
        let err = ElasticNet::new(0.1, 1.5).fit(&x, &y).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_negative_alpha() {
        let (x, y) = line();
        assert!(Lasso::new(-1.0).fit(&x, &y).is_err());
    }
}
