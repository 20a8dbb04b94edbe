//! Reporting utilities: run summaries and projection tables.

pub mod format;

pub use format::*;
