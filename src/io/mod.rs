//! Input/output helpers.
//!
//! - projection exports (CSV) (`export`)
//! - fits JSON read/write (`curve`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
