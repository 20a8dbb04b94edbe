//! Shared analysis pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! series -> window specs -> (resolve, fit, project) per spec -> outcomes
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::domain::{FitResult, Projection, RunConfig, Series, Window, WindowSpec};
use crate::error::{AppError, FitError};
use crate::fit::{FitOptions, fit_with, project, resolve_window, window_data};

/// One series, the fits to run over it, and how far to extrapolate.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: Series,
    pub windows: Vec<WindowSpec>,
    pub days_to_predict: usize,
}

/// A successful fit with its projection.
#[derive(Debug, Clone)]
pub struct FittedWindow {
    pub window: Window,
    pub fit: FitResult,
    pub projection: Projection,
}

impl FittedWindow {
    /// Projection values keyed by calendar date.
    pub fn dated_points(&self, series: &Series) -> Vec<(NaiveDate, f64)> {
        self.projection
            .points
            .iter()
            .map(|p| (series.date_at(self.window.start + p.offset), p.value))
            .collect()
    }

    /// Projection points in series day offsets (for charting).
    pub fn series_points(&self) -> Vec<(f64, f64)> {
        self.projection
            .points
            .iter()
            .map(|p| ((self.window.start + p.offset) as f64, p.value))
            .collect()
    }
}

/// Result of one window spec. Failures are kept per fit.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub spec: WindowSpec,
    pub result: Result<FittedWindow, FitError>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub analysis: Analysis,
    pub outcomes: Vec<FitOutcome>,
}

impl RunOutput {
    pub fn successes(&self) -> impl Iterator<Item = (&WindowSpec, &FittedWindow)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|f| (&o.spec, f)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&WindowSpec, &FitError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.spec, e)))
    }
}

/// Build the analysis described by `config` and run it.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let series = crate::data::load_series(config)?;
    let windows = crate::data::windows_for(config.dataset, config.preset, series.len());
    let analysis = Analysis {
        series,
        windows,
        days_to_predict: config.days_to_predict,
    };

    let opts = FitOptions {
        max_evaluations: config.max_evaluations,
        ..FitOptions::default()
    };
    let outcomes = run_analysis(&analysis, &opts);

    if config.strict {
        if let Some((spec, err)) = outcomes
            .iter()
            .find_map(|o| o.result.as_ref().err().map(|e| (&o.spec, e)))
        {
            return Err(AppError::new(3, format!("{}: {err}", spec.label)));
        }
    }

    Ok(RunOutput { analysis, outcomes })
}

/// Fit and project every window spec independently.
///
/// Fits share no state, so they are evaluated in parallel; the output order
/// matches `analysis.windows`.
pub fn run_analysis(analysis: &Analysis, opts: &FitOptions) -> Vec<FitOutcome> {
    let corrections = analysis.series.corrections();

    analysis
        .windows
        .par_iter()
        .map(|spec| {
            let result = fit_window(spec, analysis, &corrections, opts);
            match &result {
                Ok(fitted) => tracing::info!(
                    label = %spec.label,
                    model = spec.model.display_name(),
                    start = fitted.window.start,
                    len = fitted.window.len,
                    rmse = fitted.fit.quality.rmse,
                    "fit ok"
                ),
                Err(err) => tracing::warn!(label = %spec.label, error = %err, "fit failed"),
            }
            FitOutcome {
                spec: spec.clone(),
                result,
            }
        })
        .collect()
}

fn fit_window(
    spec: &WindowSpec,
    analysis: &Analysis,
    corrections: &[usize],
    opts: &FitOptions,
) -> Result<FittedWindow, FitError> {
    let window = resolve_window(spec, &analysis.series)?;

    // Corrections are fitted through as-is; flag them so the reader knows.
    let inside: Vec<usize> = corrections.iter().copied().filter(|&c| window.contains(c)).collect();
    if !inside.is_empty() {
        tracing::warn!(label = %spec.label, offsets = ?inside, "window contains downward corrections");
    }

    let (x, y) = window_data(&analysis.series, window);
    let fit = fit_with(spec.model, &x, &y, opts)?;
    let projection = project(spec.model, &fit.params, window.len, analysis.days_to_predict);
    if !projection.is_finite() {
        tracing::warn!(label = %spec.label, "projection contains non-finite values");
    }

    Ok(FittedWindow {
        window,
        fit,
        projection,
    })
}
