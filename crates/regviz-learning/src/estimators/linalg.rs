//! Small dense linear algebra routines for the normal equations.
//!
//! Design matrices here are narrow (tens of columns), so plain loops over
//! `ndarray` storage are enough and keep the crate free of BLAS/LAPACK.

use ndarray::{Array1, Array2};

/// Jacobi sweeps before giving up on further off-diagonal reduction.
const MAX_JACOBI_SWEEPS: usize = 100;

/// Eigenvalues below this fraction of the largest one are treated as zero.
const PINV_RELATIVE_CUTOFF: f64 = 1e-10;

/// Solve the symmetric positive-definite system `a x = b` by Cholesky
/// decomposition. Retries once with a tiny diagonal jitter before giving up.
pub(crate) fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    if let Some(l) = cholesky_factor(a) {
        return Some(substitute(&l, b));
    }

    let jitter = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    let mut regularized = a.clone();
    for k in 0..n {
        regularized[[k, k]] += jitter;
    }
    cholesky_factor(&regularized).map(|l| substitute(&l, b))
}

/// Lower-triangular `L` with `a = L Lᵀ`, or `None` if `a` is not positive definite.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Forward then backward substitution through `L` and `Lᵀ`.
fn substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    x
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and a matrix whose columns are the matching
/// orthonormal eigenvectors.
pub(crate) fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(n);

    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    if scale == 0.0 {
        return (Array1::zeros(n), v);
    }

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off.sqrt() <= f64::EPSILON * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

/// Minimum-norm solution of the symmetric system `a x = b` through the
/// pseudo-inverse of `a`.
///
/// Directions whose eigenvalue is negligible next to the largest one are
/// dropped, so rank-deficient systems (e.g. a full one-hot block next to the
/// intercept) get the least-squares answer instead of failing.
pub(crate) fn pinv_solve(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let (values, vectors) = symmetric_eigen(a);
    let largest = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let cutoff = largest * PINV_RELATIVE_CUTOFF;

    let mut x = Array1::<f64>::zeros(b.len());
    for (i, &lambda) in values.iter().enumerate() {
        if lambda.abs() <= cutoff || lambda == 0.0 {
            continue;
        }
        let direction = vectors.column(i);
        let weight = direction.dot(b) / lambda;
        x.scaled_add(weight, &direction);
    }
    x
}
