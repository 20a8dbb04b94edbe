//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`]: what the curve projector itself can fail with. Exactly two
//!   kinds exist: malformed input shapes and optimizer non-convergence.
//! - [`AppError`]: what the binary reports, carrying a process exit code.

use crate::domain::ModelKind;

/// Why a least-squares fit did not produce usable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConvergenceFailure {
    /// The evaluation budget ran out before any tolerance was met.
    #[error("evaluation budget of {evaluations} exhausted")]
    Budget { evaluations: usize },
    /// Damping grew past its ceiling without finding a better step.
    #[error("no improving step found (damping exceeded its ceiling)")]
    Stalled,
    /// The starting point already produces non-finite residuals.
    #[error("initial guess produces non-finite residuals")]
    NonFinite,
    /// The Jacobian at the solution is rank-deficient.
    #[error("Jacobian is singular at the solution")]
    SingularJacobian,
}

/// Errors raised by `fit`, window resolution and related core routines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// Input dimensions are malformed (length mismatch, too few points,
    /// window out of range, undetermined minimal system).
    #[error("shape error: {0}")]
    Shape(String),

    /// The optimizer failed to reach its tolerance.
    #[error("convergence error: {} fit: {reason}", model.display_name())]
    Convergence {
        model: ModelKind,
        reason: ConvergenceFailure,
    },
}

impl FitError {
    pub fn shape(message: impl Into<String>) -> Self {
        FitError::Shape(message.into())
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, FitError::Shape(_))
    }

    pub fn is_convergence(&self) -> bool {
        matches!(self, FitError::Convergence { .. })
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convergence_message_names_model() {
        let err = FitError::Convergence {
            model: ModelKind::Sigmoidal,
            reason: ConvergenceFailure::Budget { evaluations: 10 },
        };
        assert_eq!(
            err.to_string(),
            "convergence error: sigmoidal fit: evaluation budget of 10 exhausted"
        );
        assert!(err.is_convergence());
    }

    #[test]
    fn fit_error_maps_to_exit_code_3() {
        let app: AppError = FitError::shape("too short").into();
        assert_eq!(app.exit_code(), 3);
        assert_eq!(app.to_string(), "shape error: too short");
    }
}
