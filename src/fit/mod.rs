//! Curve projector.
//!
//! Responsibilities:
//!
//! - resolve window specifications against a series
//! - fit one model to one window (Levenberg–Marquardt)
//! - project the fitted model over window + horizon

pub mod fitter;
pub mod projection;
pub mod window;

pub use fitter::*;
pub use projection::*;
pub use window::*;
