//! Nonlinear least squares for a single model kind.
//!
//! Given:
//! - day offsets `x_i`
//! - observed values `y_i`
//! - a model family
//!
//! we minimise `Σ (y_i - f(x_i; p))²` with a Levenberg–Marquardt iteration:
//! - start from the model's data-driven initial guess
//! - solve the damped Gauss–Newton step by SVD least squares
//! - accept improving steps (damping ÷10), reject others (damping ×10)
//!
//! and return the converged parameters with their covariance estimate.

use nalgebra::{DMatrix, DVector};

use crate::domain::{FitQuality, FitResult, ModelKind};
use crate::error::{ConvergenceFailure, FitError};
use crate::math::{min_relative_singular_value, solve_least_squares};
use crate::models::{fill_jacobian_row, initial_guess, predict};

const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;
/// Budget per parameter, plus one, when there are exactly as many points as
/// parameters.
const EXACT_FIT_EVALUATIONS_PER_PARAM: usize = 200;

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Hard cap on model evaluations (one per trial parameter vector).
    ///
    /// Exponential and sigmoidal fits on short noisy windows routinely need
    /// far more than the conventional `200 * (p + 1)`.
    pub max_evaluations: usize,
    /// Relative SSE reduction below which the fit is considered converged.
    pub ftol: f64,
    /// Relative step size below which the fit is considered converged.
    pub xtol: f64,
    /// Scaled gradient norm below which the fit is considered converged.
    pub gtol: f64,
    /// Starting Marquardt damping.
    pub initial_damping: f64,
    /// Column-normalised singular value below which the Jacobian is singular.
    pub singular_tol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_evaluations: 5000,
            ftol: 1.49e-8,
            xtol: 1.49e-8,
            gtol: 1e-10,
            initial_damping: 1e-3,
            singular_tol: 1e-8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    ZeroResidual,
    Gradient,
    Reduction,
    Step,
}

/// Fit `model` to `(x, y)` with default options.
pub fn fit(model: ModelKind, x: &[f64], y: &[f64]) -> Result<FitResult, FitError> {
    fit_with(model, x, y, &FitOptions::default())
}

/// Fit `model` to `(x, y)`.
///
/// Fails with [`FitError::Shape`] on malformed inputs, and with
/// [`FitError::Convergence`] when the optimizer cannot reach a tolerance or
/// ends on a singular Jacobian. With exactly `param_count()` points the fit
/// either interpolates or fails with [`FitError::Shape`].
pub fn fit_with(
    model: ModelKind,
    x: &[f64],
    y: &[f64],
    opts: &FitOptions,
) -> Result<FitResult, FitError> {
    validate_inputs(model, x, y)?;

    let p = model.param_count();
    if x.len() > p {
        return least_squares(model, x, y, opts);
    }

    // An interpolating solution is reached within the conventional budget or
    // not at all.
    let exact = FitOptions {
        max_evaluations: opts
            .max_evaluations
            .min(EXACT_FIT_EVALUATIONS_PER_PARAM * (p + 1)),
        ..opts.clone()
    };
    least_squares(model, x, y, &exact).map_err(|err| match err {
        FitError::Convergence { reason, .. } => FitError::shape(format!(
            "{} model cannot be determined from its minimum of {p} points ({reason})",
            model.display_name()
        )),
        shape => shape,
    })
}

fn least_squares(
    model: ModelKind,
    x: &[f64],
    y: &[f64],
    opts: &FitOptions,
) -> Result<FitResult, FitError> {
    let n = x.len();
    let p = model.param_count();
    let failed = |reason| FitError::Convergence { model, reason };

    let mut params = DVector::from_vec(initial_guess(model, x, y));
    let mut residuals = residual_vector(model, x, y, params.as_slice());
    let mut sse = residuals.norm_squared();
    let mut evaluations = 1usize;
    if !sse.is_finite() {
        return Err(failed(ConvergenceFailure::NonFinite));
    }

    let y_scale = 1.0 + y.iter().map(|v| v * v).sum::<f64>();
    let zero_sse = 1e-24 * y_scale;
    let mut damping = opts.initial_damping;

    let termination = 'outer: loop {
        if sse <= zero_sse {
            break Termination::ZeroResidual;
        }

        let jac = jacobian(model, x, params.as_slice());
        let grad = jac.tr_mul(&residuals);
        if scaled_gradient(&jac, &grad, sse) <= opts.gtol {
            break Termination::Gradient;
        }
        let jtj = jac.tr_mul(&jac);

        loop {
            if evaluations >= opts.max_evaluations {
                tracing::debug!(model = model.display_name(), evaluations, sse, "evaluation budget exhausted");
                return Err(failed(ConvergenceFailure::Budget { evaluations }));
            }

            let Some(step) = damped_step(&jac, &residuals, &jtj, damping) else {
                damping *= 10.0;
                if damping > MAX_DAMPING {
                    return Err(failed(ConvergenceFailure::Stalled));
                }
                continue;
            };
            let step_small = step.norm() <= opts.xtol * (params.norm() + opts.xtol);

            let trial = &params + &step;
            let trial_residuals = residual_vector(model, x, y, trial.as_slice());
            evaluations += 1;
            let trial_sse = trial_residuals.norm_squared();

            if trial_sse.is_finite() && trial_sse < sse {
                let linearised = (&residuals - &jac * &step).norm_squared();
                let predicted = (sse - linearised) / sse;
                let actual = (sse - trial_sse) / sse;

                params = trial;
                residuals = trial_residuals;
                sse = trial_sse;
                damping = (damping * 0.1).max(MIN_DAMPING);

                if actual <= opts.ftol && predicted <= opts.ftol {
                    break 'outer Termination::Reduction;
                }
                if step_small {
                    break 'outer Termination::Step;
                }
                continue 'outer;
            }

            // No improvement and nowhere left to move: we are at the minimum
            // to working precision.
            if step_small {
                break 'outer Termination::Step;
            }
            damping *= 10.0;
            if damping > MAX_DAMPING {
                return Err(failed(ConvergenceFailure::Stalled));
            }
        }
    };

    tracing::debug!(
        model = model.display_name(),
        evaluations,
        sse,
        termination = ?termination,
        "least squares converged"
    );

    let jac = jacobian(model, x, params.as_slice());
    let singular = min_relative_singular_value(&jac) < opts.singular_tol;
    let rmse = (sse / n as f64).sqrt();

    let covariance = if n == p {
        // Exactly determined: the only acceptable outcome is an interpolating
        // solution with a well-conditioned Jacobian.
        let max_abs_y = y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if singular || rmse > 1e-6 * (1.0 + max_abs_y) {
            return Err(FitError::shape(format!(
                "{} model cannot be determined from its minimum of {p} points",
                model.display_name()
            )));
        }
        None
    } else {
        if singular {
            return Err(failed(ConvergenceFailure::SingularJacobian));
        }
        let Some(inv) = jac.tr_mul(&jac).try_inverse() else {
            return Err(failed(ConvergenceFailure::SingularJacobian));
        };
        let s2 = sse / (n - p) as f64;
        Some(
            (0..p)
                .map(|i| (0..p).map(|j| inv[(i, j)] * s2).collect())
                .collect(),
        )
    };

    Ok(FitResult {
        model,
        params: params.iter().copied().collect(),
        covariance,
        quality: FitQuality {
            sse,
            rmse,
            bic: bic(n, sse, p),
            n,
            evaluations,
        },
    })
}

fn validate_inputs(model: ModelKind, x: &[f64], y: &[f64]) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::shape(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    let p = model.param_count();
    if x.len() < p {
        return Err(FitError::shape(format!(
            "{} model needs at least {p} points, got {}",
            model.display_name(),
            x.len()
        )));
    }
    if let Some(i) = x.iter().zip(y.iter()).position(|(a, b)| !(a.is_finite() && b.is_finite())) {
        return Err(FitError::shape(format!("non-finite input at index {i}")));
    }
    if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(FitError::shape(format!(
            "x must be strictly increasing (index {} -> {})",
            i,
            i + 1
        )));
    }
    Ok(())
}

/// `r_i = y_i - f(x_i; p)`
fn residual_vector(model: ModelKind, x: &[f64], y: &[f64], params: &[f64]) -> DVector<f64> {
    DVector::from_iterator(
        x.len(),
        x.iter().zip(y.iter()).map(|(&xi, &yi)| yi - predict(model, xi, params)),
    )
}

fn jacobian(model: ModelKind, x: &[f64], params: &[f64]) -> DMatrix<f64> {
    let p = model.param_count();
    let mut jac = DMatrix::<f64>::zeros(x.len(), p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x.iter().enumerate() {
        fill_jacobian_row(model, xi, params, &mut row);
        for j in 0..p {
            jac[(i, j)] = row[j];
        }
    }
    jac
}

/// Solve `[J; sqrt(λ·D)] δ = [r; 0]` with `D = diag(JᵀJ)`.
fn damped_step(
    jac: &DMatrix<f64>,
    residuals: &DVector<f64>,
    jtj: &DMatrix<f64>,
    damping: f64,
) -> Option<DVector<f64>> {
    let (n, p) = jac.shape();
    let mut a = DMatrix::<f64>::zeros(n + p, p);
    a.view_mut((0, 0), (n, p)).copy_from(jac);
    for j in 0..p {
        a[(n + j, j)] = (damping * jtj[(j, j)].max(1e-12)).sqrt();
    }

    let mut b = DVector::<f64>::zeros(n + p);
    b.rows_mut(0, n).copy_from(residuals);

    solve_least_squares(&a, &b)
}

/// `max_j |J_jᵀ r| / (‖J_j‖ ‖r‖)`: the cosine between the residual and each
/// Jacobian column.
fn scaled_gradient(jac: &DMatrix<f64>, grad: &DVector<f64>, sse: f64) -> f64 {
    let r_norm = sse.sqrt();
    if r_norm == 0.0 {
        return 0.0;
    }
    jac.column_iter()
        .zip(grad.iter())
        .map(|(col, g)| {
            let c = col.norm();
            if c > 0.0 { g.abs() / (c * r_norm) } else { 0.0 }
        })
        .fold(0.0, f64::max)
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}
