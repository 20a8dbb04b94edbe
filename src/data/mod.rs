//! Input data: the literal case series and synthetic series.

pub mod cases;
pub mod synthetic;

pub use cases::confirmed_series;

use crate::domain::{DatasetKind, Preset, RunConfig, Series, WindowSpec};
use crate::error::AppError;

/// Build the series selected by `config`.
pub fn load_series(config: &RunConfig) -> Result<Series, AppError> {
    match config.dataset {
        DatasetKind::Confirmed => Ok(cases::confirmed_series()),
        DatasetKind::Revised => Ok(cases::revised_series()),
        DatasetKind::Synthetic => synthetic::generate_series(
            cases::start_date(),
            config.synthetic_days,
            config.synthetic_noise,
            config.seed,
        ),
    }
}

/// Window specifications for `preset` on the given dataset.
pub fn windows_for(dataset: DatasetKind, preset: Preset, series_len: usize) -> Vec<WindowSpec> {
    match dataset {
        DatasetKind::Confirmed | DatasetKind::Revised => cases::preset_windows(preset),
        DatasetKind::Synthetic => synthetic::preset_windows(preset, series_len),
    }
}
