//! Model evaluation for the four curve families.
//!
//! The fitter relies on three primitive operations:
//! - predict `f(x)` given a parameter vector (for residuals/projections)
//! - fill a Jacobian row `∂f/∂p` at a given `x` (for the damped Gauss–Newton step)
//! - a deterministic starting point derived from the data
//!
//! These are implemented here for each model kind.

use crate::domain::{LOG_EPSILON, ModelKind};
use crate::math::linear_regression;

/// Predict `f(x)` for the given model kind.
///
/// Out-of-domain parameters (a non-positive logarithm argument) yield `NaN`;
/// overflowing exponentials yield infinities. Callers treat both as
/// "this parameter vector is unusable".
///
/// A parameter vector of the wrong length also yields `NaN`.
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> f64 {
    match (model, params) {
        (ModelKind::Linear, &[a, b]) => a * x + b,
        (ModelKind::Exponential, &[a, b, c]) => a * (b * x).exp() + c,
        (ModelKind::Logarithmic, &[a, b, c]) => {
            let arg = b * x + LOG_EPSILON;
            if arg <= 0.0 {
                return f64::NAN;
            }
            a * arg.ln() + c
        }
        (ModelKind::Sigmoidal, &[c, x0, k, y0]) => c * logistic(x, x0, k) + y0,
        _ => f64::NAN,
    }
}

/// Fill a Jacobian row `∂f/∂p_j` at `x`.
///
/// # Panics
/// Panics if `out` or `params` is shorter than `model.param_count()`.
pub fn fill_jacobian_row(model: ModelKind, x: f64, params: &[f64], out: &mut [f64]) {
    match model {
        ModelKind::Linear => {
            out[0] = x;
            out[1] = 1.0;
        }
        ModelKind::Exponential => {
            let e = (params[1] * x).exp();
            out[0] = e;
            out[1] = params[0] * x * e;
            out[2] = 1.0;
        }
        ModelKind::Logarithmic => {
            let arg = params[1] * x + LOG_EPSILON;
            out[0] = arg.ln();
            out[1] = params[0] * x / arg;
            out[2] = 1.0;
        }
        ModelKind::Sigmoidal => {
            let (c, x0, k) = (params[0], params[1], params[2]);
            let s = logistic(x, x0, k);
            // d s / d z = -s(1 - s) with z = (x - x0)/k.
            let ds = s * (1.0 - s);
            out[0] = s;
            out[1] = c * ds / k;
            out[2] = c * ds * (x - x0) / (k * k);
            out[3] = 1.0;
        }
    }
}

/// Deterministic starting point for the optimizer.
///
/// Each family is linearised around a crude transform of the data so that the
/// first damped step already lands in the right basin for well-behaved windows.
///
/// # Panics
/// Panics if `x`/`y` are empty.
pub fn initial_guess(model: ModelKind, x: &[f64], y: &[f64]) -> Vec<f64> {
    match model {
        ModelKind::Linear => {
            let (slope, intercept) = linear_regression(x, y);
            vec![slope, intercept]
        }
        ModelKind::Exponential => {
            // Shift so every value is >= 1, then fit ln(y - shift) = ln(a) + b x.
            let shift = min_of(y) - 1.0;
            let ln_y: Vec<f64> = y.iter().map(|v| (v - shift).ln()).collect();
            let (mut b, ln_a) = linear_regression(x, &ln_y);
            if b.abs() < 1e-6 {
                b = 1e-2;
            }
            vec![ln_a.exp(), b, shift]
        }
        ModelKind::Logarithmic => {
            let ln_x: Vec<f64> = x.iter().map(|v| (v + LOG_EPSILON).ln()).collect();
            let (a, c) = linear_regression(&ln_x, y);
            vec![a, 1.0, c]
        }
        ModelKind::Sigmoidal => {
            let lo = min_of(y);
            let hi = max_of(y);
            let c = if hi > lo { hi - lo } else { 1.0 };
            let half = lo + c / 2.0;
            let rising = y[y.len() - 1] >= y[0];

            let crossing = x.iter().zip(y.iter()).find(|&(_, &v)| {
                if rising { v >= half } else { v <= half }
            });
            let x0 = crossing.map(|(&xv, _)| xv).unwrap_or(x[x.len() / 2]);

            let span = (x[x.len() - 1] - x[0]).max(1.0);
            // A rising logistic in this parameterisation has a negative scale.
            let k = if rising { -span / 10.0 } else { span / 10.0 };

            vec![c, x0, k, lo]
        }
    }
}

fn logistic(x: f64, x0: f64, k: f64) -> f64 {
    1.0 / (1.0 + ((x - x0) / k).exp())
}

fn min_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params(model: ModelKind) -> Vec<f64> {
        match model {
            ModelKind::Linear => vec![2.0, 1.0],
            ModelKind::Exponential => vec![1.5, 0.2, 3.0],
            ModelKind::Logarithmic => vec![40.0, 0.5, 10.0],
            ModelKind::Sigmoidal => vec![1000.0, 20.0, -4.0, 5.0],
        }
    }

    #[test]
    fn predict_at_zero_is_finite_for_every_model() {
        for model in ModelKind::ALL {
            let y = predict(model, 0.0, &sample_params(model));
            assert!(y.is_finite(), "{model:?} at x=0 gave {y}");
        }
    }

    #[test]
    fn logarithmic_at_zero_uses_epsilon() {
        let y = predict(ModelKind::Logarithmic, 0.0, &[1.0, 1.0, 0.0]);
        assert!((y - LOG_EPSILON.ln()).abs() < 1e-12);
    }

    #[test]
    fn logarithmic_out_of_domain_is_nan() {
        let y = predict(ModelKind::Logarithmic, 5.0, &[1.0, -1.0, 0.0]);
        assert!(y.is_nan());
    }

    #[test]
    fn mismatched_parameter_length_is_nan() {
        assert!(predict(ModelKind::Sigmoidal, 1.0, &[1.0, 2.0]).is_nan());
        assert!(predict(ModelKind::Linear, 1.0, &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn sigmoid_saturates_to_c_plus_y0_when_rising() {
        let p = sample_params(ModelKind::Sigmoidal);
        let far = predict(ModelKind::Sigmoidal, 1e4, &p);
        assert!((far - 1005.0).abs() < 1e-9);
        let early = predict(ModelKind::Sigmoidal, -1e4, &p);
        assert!((early - 5.0).abs() < 1e-9);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let h = 1e-6;
        for model in ModelKind::ALL {
            let p = sample_params(model);
            let m = model.param_count();
            for &x in &[0.0, 3.0, 17.5] {
                let mut row = vec![0.0; m];
                fill_jacobian_row(model, x, &p, &mut row);
                for j in 0..m {
                    let mut hi = p.clone();
                    let mut lo = p.clone();
                    let step = h * p[j].abs().max(1.0);
                    hi[j] += step;
                    lo[j] -= step;
                    let fd = (predict(model, x, &hi) - predict(model, x, &lo)) / (2.0 * step);
                    let tol = 1e-5 * fd.abs().max(1.0);
                    assert!(
                        (row[j] - fd).abs() < tol,
                        "{model:?} x={x} param {j}: analytic {} vs fd {fd}",
                        row[j]
                    );
                }
            }
        }
    }

    #[test]
    fn exponential_guess_tracks_growth_rate() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * (0.3 * v).exp()).collect();
        let guess = initial_guess(ModelKind::Exponential, &x, &y);
        assert_eq!(guess.len(), 3);
        assert!(guess[1] > 0.1 && guess[1] < 0.5, "growth guess {}", guess[1]);
    }

    #[test]
    fn sigmoid_guess_places_midpoint_and_sign() {
        let p = sample_params(ModelKind::Sigmoidal);
        let x: Vec<f64> = (0..40).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| predict(ModelKind::Sigmoidal, v, &p)).collect();
        let guess = initial_guess(ModelKind::Sigmoidal, &x, &y);
        assert!((guess[1] - 20.0).abs() <= 1.0);
        assert!(guess[2] < 0.0);
    }
}
