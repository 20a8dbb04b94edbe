//! Mathematical utilities: SVD least squares and simple regression.

pub mod ols;

pub use ols::*;
