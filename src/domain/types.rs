//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Additive constant inside the logarithmic model's `ln`, keeping its
/// argument positive at `x = 0`.
pub const LOG_EPSILON: f64 = 1e-6;

/// Parametric model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `a*x + b`
    Linear,
    /// `a*e^(b*x) + c`
    Exponential,
    /// `a*ln(b*x + ε) + c`
    Logarithmic,
    /// `c/(1 + e^((x-x0)/k)) + y0`
    Sigmoidal,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Linear,
        ModelKind::Exponential,
        ModelKind::Logarithmic,
        ModelKind::Sigmoidal,
    ];

    /// Lowercase label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Exponential => "exponential",
            ModelKind::Logarithmic => "logarithmic",
            ModelKind::Sigmoidal => "sigmoidal",
        }
    }

    /// Number of free parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Linear => 2,
            ModelKind::Exponential | ModelKind::Logarithmic => 3,
            ModelKind::Sigmoidal => 4,
        }
    }

    /// Parameter names in vector order.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Linear => &["a", "b"],
            ModelKind::Exponential | ModelKind::Logarithmic => &["a", "b", "c"],
            ModelKind::Sigmoidal => &["c", "x0", "k", "y0"],
        }
    }
}

/// A day-indexed series of observations.
///
/// Index `i` corresponds to `start_date + i days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    start_date: NaiveDate,
    values: Vec<f64>,
}

impl Series {
    pub fn new(start_date: NaiveDate, values: Vec<f64>) -> Self {
        Self { start_date, values }
    }

    /// Build a series from cumulative counts.
    pub fn from_counts(start_date: NaiveDate, counts: &[u64]) -> Self {
        Self::new(start_date, counts.iter().map(|&c| c as f64).collect())
    }

    /// Build a cumulative series from daily deltas via a running sum.
    ///
    /// Negative deltas (recount corrections) are summed as-is.
    pub fn from_daily_deltas(start_date: NaiveDate, deltas: &[i64]) -> Self {
        let mut total = 0i64;
        let values = deltas
            .iter()
            .map(|&d| {
                total += d;
                total as f64
            })
            .collect();
        Self::new(start_date, values)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Calendar date of a day offset.
    pub fn date_at(&self, offset: usize) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(NaiveDate::MAX)
    }

    /// First offset at or after `from` whose value equals `value`.
    pub fn position_of(&self, value: f64, from: usize) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, v)| **v == value)
            .map(|(i, _)| i)
    }

    /// Offsets where the series decreases relative to the previous day.
    pub fn corrections(&self) -> Vec<usize> {
        self.values
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[1] < w[0])
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// `(date, value)` pairs for charting.
    pub fn dated_points(&self) -> Vec<(NaiveDate, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.date_at(i), v))
            .collect()
    }
}

/// Where a fit window begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum WindowStart {
    /// Explicit day offset.
    Offset(usize),
    /// First day whose value equals the given one.
    AtValue(f64),
    /// The last `n` days of the series.
    Trailing(usize),
}

/// Where a fit window ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum WindowEnd {
    /// Through the last observation.
    ToEnd,
    /// Exactly `n` days long.
    Length(usize),
    /// Through (inclusive) the first day at or after the start whose value
    /// equals the given one.
    ThroughValue(f64),
}

/// A named model + window combination to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub label: String,
    pub model: ModelKind,
    pub start: WindowStart,
    pub end: WindowEnd,
}

impl WindowSpec {
    pub fn new(label: impl Into<String>, model: ModelKind, start: WindowStart, end: WindowEnd) -> Self {
        Self {
            label: label.into(),
            model,
            start,
            end,
        }
    }
}

/// A resolved contiguous window `[start, start + len)` of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub len: usize,
}

impl Window {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub bic: f64,
    pub n: usize,
    /// Model evaluations spent by the optimizer.
    pub evaluations: usize,
}

/// Output of a single least-squares fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Vec<f64>,
    /// Parameter covariance `s²(JᵀJ)⁻¹`; `None` when `n == p`.
    pub covariance: Option<Vec<Vec<f64>>>,
    pub quality: FitQuality,
}

impl FitResult {
    /// One-sigma standard errors from the covariance diagonal.
    pub fn std_errors(&self) -> Option<Vec<f64>> {
        self.covariance
            .as_ref()
            .map(|cov| cov.iter().enumerate().map(|(i, row)| row[i].max(0.0).sqrt()).collect())
    }
}

/// A single evaluated offset of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub offset: usize,
    pub value: f64,
}

/// A fitted model evaluated over its window plus horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub window_length: usize,
    pub points: Vec<ProjectedPoint>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Reconstruction of the observed window.
    pub fn fitted(&self) -> &[ProjectedPoint] {
        &self.points[..self.window_length.min(self.points.len())]
    }

    /// Points beyond the last observation.
    pub fn extrapolated(&self) -> &[ProjectedPoint] {
        &self.points[self.window_length.min(self.points.len())..]
    }

    /// `false` when any evaluated value is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.value.is_finite())
    }
}

/// Which series to analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// The hand-maintained confirmed-case list.
    Confirmed,
    /// The longer revised list kept as daily deltas, including a second wave.
    Revised,
    /// A seeded synthetic logistic-growth series.
    Synthetic,
}

impl DatasetKind {
    pub fn display_name(self) -> &'static str {
        match self {
            DatasetKind::Confirmed => "confirmed cases",
            DatasetKind::Revised => "revised (daily deltas)",
            DatasetKind::Synthetic => "synthetic",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DatasetKind::Confirmed => DatasetKind::Revised,
            DatasetKind::Revised => DatasetKind::Synthetic,
            DatasetKind::Synthetic => DatasetKind::Confirmed,
        }
    }
}

/// Named set of window specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Exponential over the initial run; linear and exponential after it.
    InitialRun,
    /// Exponential, logarithmic and sigmoidal across the whole series.
    AllData,
    /// Linear and exponential over the trailing window.
    Trailing,
    /// Exponential since the second wave started; linear over a long trailing
    /// window.
    SecondWave,
}

impl Preset {
    pub fn display_name(self) -> &'static str {
        match self {
            Preset::InitialRun => "initial-run",
            Preset::AllData => "all-data",
            Preset::Trailing => "trailing",
            Preset::SecondWave => "second-wave",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Preset::InitialRun => Preset::AllData,
            Preset::AllData => Preset::Trailing,
            Preset::Trailing => Preset::SecondWave,
            Preset::SecondWave => Preset::InitialRun,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dataset: DatasetKind,
    pub preset: Preset,
    pub days_to_predict: usize,

    /// Optimizer evaluation budget per fit.
    pub max_evaluations: usize,
    /// Turn the first failed fit into a run failure.
    pub strict: bool,

    /// Synthetic dataset controls.
    pub synthetic_days: usize,
    pub synthetic_noise: f64,
    pub seed: u64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved fits file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitsFile {
    pub tool: String,
    pub dataset: DatasetKind,
    pub start_date: NaiveDate,
    pub days_to_predict: usize,
    pub observed: Vec<f64>,
    pub fits: Vec<SavedFit>,
}

/// One successful fit inside a [`FitsFile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedFit {
    pub label: String,
    pub window: Window,
    pub result: FitResult,
    pub dates: Vec<NaiveDate>,
    /// Projected values; `None` where the model is undefined (JSON has no NaN).
    pub values: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_deltas_accumulate_and_flag_corrections() {
        let s = Series::from_daily_deltas(day(2020, 9, 1), &[5, 3, -2, 4]);
        assert_eq!(s.values(), &[5.0, 8.0, 6.0, 10.0]);
        assert_eq!(s.corrections(), vec![2]);
    }

    #[test]
    fn date_at_offsets_from_start() {
        let s = Series::from_counts(day(2020, 3, 8), &[1, 2, 3]);
        assert_eq!(s.date_at(0), day(2020, 3, 8));
        assert_eq!(s.date_at(24), day(2020, 4, 1));
    }

    #[test]
    fn position_of_searches_from_offset() {
        let s = Series::from_counts(day(2020, 3, 8), &[1, 3, 3, 3, 6]);
        assert_eq!(s.position_of(3.0, 0), Some(1));
        assert_eq!(s.position_of(3.0, 2), Some(2));
        assert_eq!(s.position_of(7.0, 0), None);
    }

    #[test]
    fn projection_splits_fitted_and_extrapolated() {
        let p = Projection {
            window_length: 2,
            points: (0..5)
                .map(|i| ProjectedPoint {
                    offset: i,
                    value: i as f64,
                })
                .collect(),
        };
        assert_eq!(p.fitted().len(), 2);
        assert_eq!(p.extrapolated().len(), 3);
        assert_eq!(p.extrapolated()[0].offset, 2);
        assert!(p.is_finite());
    }

    #[test]
    fn param_names_match_counts() {
        for model in ModelKind::ALL {
            assert_eq!(model.param_names().len(), model.param_count());
        }
    }
}
