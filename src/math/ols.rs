//! Linear least squares helpers.
//!
//! The Levenberg–Marquardt fitter repeatedly solves small linear problems of
//! the form:
//!
//! ```text
//! minimize ‖A δ - b‖²
//! ```
//!
//! where `A` is the Jacobian stacked on top of the damping rows. Parameter
//! counts are tiny (2–4 columns), so SVD is cheap and robust to the
//! near-collinear columns that appear when an exponential degenerates into a
//! straight line.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    // Nalgebra's `QR::solve` is intended for square systems and will panic for
    // non-square matrices, so we go through the SVD.
    let svd = a.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

/// Smallest singular value of `a` after scaling each column to unit norm.
///
/// Column scaling makes the measure independent of parameter units, so it
/// reflects collinearity rather than magnitude. A zero column yields `0.0`.
pub fn min_relative_singular_value(a: &DMatrix<f64>) -> f64 {
    let mut scaled = a.clone();
    for mut col in scaled.column_iter_mut() {
        let norm = col.norm();
        if !(norm.is_finite() && norm > 0.0) {
            return 0.0;
        }
        col /= norm;
    }

    scaled
        .singular_values()
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
}

/// Ordinary least squares fit of `y = slope * x + intercept`.
///
/// Degenerate inputs (all `x` equal) give a zero slope through the mean.
pub fn linear_regression(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len().min(y.len());
    if n == 0 {
        return (0.0, 0.0);
    }
    let n_f = n as f64;
    let x_mean = x[..n].iter().sum::<f64>() / n_f;
    let y_mean = y[..n].iter().sum::<f64>() / n_f;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        let dx = x[i] - x_mean;
        sxx += dx * dx;
        sxy += dx * (y[i] - y_mean);
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, y_mean - slope * x_mean)
}
