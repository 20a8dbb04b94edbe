//! Synthetic cumulative series for demos and tests.
//!
//! The curve is a logistic outbreak with multiplicative log-normal noise,
//! rounded to whole cases and forced non-decreasing (a cumulative count never
//! goes down unless a correction is recorded, which we do not simulate).

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ModelKind, Preset, Series, WindowEnd, WindowSpec, WindowStart};
use crate::error::AppError;
use crate::models::predict;

/// Final size of the simulated outbreak.
const PLATEAU: f64 = 2000.0;

/// Logistic parameters (`[c, x0, k, y0]`) used for a series of `days` days.
pub fn synthetic_params(days: usize) -> [f64; 4] {
    let days = days.max(2) as f64;
    [PLATEAU, days * 0.55, -days / 9.0, 0.0]
}

/// Generate a seeded synthetic series.
///
/// `noise` is the standard deviation of the log-normal multiplier.
pub fn generate_series(
    start_date: chrono::NaiveDate,
    days: usize,
    noise: f64,
    seed: u64,
) -> Result<Series, AppError> {
    if days < 2 {
        return Err(AppError::new(2, "Synthetic series needs at least 2 days."));
    }
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(AppError::new(2, format!("Invalid synthetic noise level: {noise}")));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let params = synthetic_params(days);
    let mut values = Vec::with_capacity(days);
    let mut prev = 0.0_f64;
    for day in 0..days {
        let base = predict(ModelKind::Sigmoidal, day as f64, &params);
        let z: f64 = normal.sample(&mut rng);
        let noisy = (base * (noise * z).exp()).round().max(prev);
        values.push(noisy);
        prev = noisy;
    }

    Ok(Series::new(start_date, values))
}

/// Window specifications for a preset on a synthetic series of `days` days.
///
/// The synthetic curve has no hand-picked "last perfect" value, so the
/// initial run is split at the logistic midpoint instead.
pub fn preset_windows(preset: Preset, days: usize) -> Vec<WindowSpec> {
    match preset {
        Preset::InitialRun => {
            let split = (synthetic_params(days)[1].round() as usize).min(days.saturating_sub(1));
            vec![
                WindowSpec::new(
                    "Exponential fit before midpoint",
                    ModelKind::Exponential,
                    WindowStart::Offset(0),
                    WindowEnd::Length(split + 1),
                ),
                WindowSpec::new(
                    "Linear fit after midpoint",
                    ModelKind::Linear,
                    WindowStart::Offset(split),
                    WindowEnd::ToEnd,
                ),
                WindowSpec::new(
                    "Sigmoidal fit across all data",
                    ModelKind::Sigmoidal,
                    WindowStart::Offset(0),
                    WindowEnd::ToEnd,
                ),
            ]
        }
        other => crate::data::cases::preset_windows(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 8).unwrap()
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate_series(start(), 40, 0.05, 7).unwrap();
        let b = generate_series(start(), 40, 0.05, 7).unwrap();
        let c = generate_series(start(), 40, 0.05, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn series_is_non_decreasing_whole_numbers() {
        let s = generate_series(start(), 60, 0.2, 1).unwrap();
        assert!(s.corrections().is_empty());
        assert!(s.values().iter().all(|v| v.fract() == 0.0 && *v >= 0.0));
    }

    #[test]
    fn zero_noise_tracks_the_logistic() {
        let s = generate_series(start(), 40, 0.0, 3).unwrap();
        let last = *s.values().last().unwrap();
        assert!(last > 0.9 * PLATEAU && last <= PLATEAU);
    }

    #[test]
    fn initial_run_split_resolves() {
        let s = generate_series(start(), 40, 0.05, 11).unwrap();
        for w in preset_windows(Preset::InitialRun, 40) {
            let window = crate::fit::resolve_window(&w, &s).unwrap();
            assert!(window.len >= w.model.param_count(), "{}", w.label);
        }
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(generate_series(start(), 1, 0.1, 0).is_err());
        assert!(generate_series(start(), 10, -0.1, 0).is_err());
    }
}
