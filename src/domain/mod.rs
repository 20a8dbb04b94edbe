//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model family enum (`ModelKind`)
//! - the day-indexed observation series (`Series`)
//! - window specifications and their resolved form (`WindowSpec`, `Window`)
//! - fit outputs (`FitResult`, `Projection`, etc.)

pub mod types;

pub use types::*;
