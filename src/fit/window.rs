//! Window resolution.
//!
//! A [`WindowSpec`] describes a window declaratively ("from the day the series
//! hit 143 to the end", "the last 15 days"). Resolving it against a concrete
//! series yields index bounds or a shape error.

use crate::domain::{Series, Window, WindowEnd, WindowSpec, WindowStart};
use crate::error::FitError;

/// Resolve `spec` into `[start, start + len)` within `series`.
pub fn resolve_window(spec: &WindowSpec, series: &Series) -> Result<Window, FitError> {
    let total = series.len();

    let start = match spec.start {
        WindowStart::Offset(i) => i,
        WindowStart::AtValue(v) => series.position_of(v, 0).ok_or_else(|| {
            FitError::shape(format!("window '{}': start value {v} not found in series", spec.label))
        })?,
        WindowStart::Trailing(n) => total.checked_sub(n).ok_or_else(|| {
            FitError::shape(format!(
                "window '{}': trailing {n} days exceeds series length {total}",
                spec.label
            ))
        })?,
    };
    if start >= total {
        return Err(FitError::shape(format!(
            "window '{}': start offset {start} is outside series of length {total}",
            spec.label
        )));
    }

    let end = match spec.end {
        WindowEnd::ToEnd => total,
        WindowEnd::Length(n) => start.checked_add(n).ok_or_else(|| {
            FitError::shape(format!(
                "window '{}': length {n} from offset {start} overflows",
                spec.label
            ))
        })?,
        WindowEnd::ThroughValue(v) => {
            series.position_of(v, start).map(|i| i + 1).ok_or_else(|| {
                FitError::shape(format!(
                    "window '{}': end value {v} not found at or after offset {start}",
                    spec.label
                ))
            })?
        }
    };
    if end > total {
        return Err(FitError::shape(format!(
            "window '{}': ends at offset {end} but series has {total} points",
            spec.label
        )));
    }
    if end <= start {
        return Err(FitError::shape(format!("window '{}' is empty", spec.label)));
    }

    Ok(Window {
        start,
        len: end - start,
    })
}

/// Re-based `(x, y)` arrays for a resolved window: `x` restarts at 0.
pub fn window_data(series: &Series, window: Window) -> (Vec<f64>, Vec<f64>) {
    let y = series.values()[window.start..window.end()].to_vec();
    let x = (0..window.len).map(|i| i as f64).collect();
    (x, y)
}
