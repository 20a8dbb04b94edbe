//! Read/write fits JSON files.
//!
//! Fits JSON is the "portable" representation of a run:
//! - the observed series (start date + values)
//! - per fit: label, resolved window, model + parameters + quality
//! - the dated projection for quick plotting
//!
//! The schema is defined by `domain::FitsFile`.

use std::fs::File;
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::domain::{FitsFile, RunConfig, SavedFit};
use crate::error::AppError;

/// Build the saved representation of a run. Failed fits are not saved.
pub fn fits_file(run: &RunOutput, config: &RunConfig) -> FitsFile {
    let series = &run.analysis.series;
    let fits = run
        .successes()
        .map(|(spec, fitted)| {
            let dated = fitted.dated_points(series);
            SavedFit {
                label: spec.label.clone(),
                window: fitted.window,
                result: fitted.fit.clone(),
                dates: dated.iter().map(|(d, _)| *d).collect(),
                values: dated
                    .iter()
                    .map(|(_, v)| v.is_finite().then_some(*v))
                    .collect(),
            }
        })
        .collect();

    FitsFile {
        tool: "curves".to_string(),
        dataset: config.dataset,
        start_date: series.start_date(),
        days_to_predict: run.analysis.days_to_predict,
        observed: series.values().to_vec(),
        fits,
    }
}

/// Write a fits JSON file.
pub fn write_fits_json(path: &Path, run: &RunOutput, config: &RunConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fits JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &fits_file(run, config))
        .map_err(|e| AppError::new(2, format!("Failed to write fits JSON: {e}")))?;

    Ok(())
}

/// Read a fits JSON file.
pub fn read_fits_json(path: &Path) -> Result<FitsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fits JSON '{}': {e}", path.display())))?;
    let fits: FitsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fits JSON: {e}")))?;
    Ok(fits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline;
    use crate::domain::{DatasetKind, Preset};

    fn config() -> RunConfig {
        RunConfig {
            dataset: DatasetKind::Confirmed,
            preset: Preset::InitialRun,
            days_to_predict: 3,
            max_evaluations: 5000,
            strict: false,
            synthetic_days: 40,
            synthetic_noise: 0.05,
            seed: 42,
            plot: false,
            plot_width: 60,
            plot_height: 15,
            export_csv: None,
            export_json: None,
        }
    }

    #[test]
    fn saved_fits_plot_like_the_live_run() {
        let config = config();
        let run = pipeline::run(&config).unwrap();

        let path = std::env::temp_dir().join(format!("curves-fits-{}.json", std::process::id()));
        write_fits_json(&path, &run, &config).unwrap();
        let loaded = read_fits_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.tool, "curves");
        assert_eq!(loaded.fits.len(), 3);
        assert_eq!(loaded.fits[0].dates.len(), loaded.fits[0].values.len());
        assert_eq!(loaded.fits[1].window.start, 14);

        let live = crate::plot::render_ascii_plot(&run, 60, 15);
        let saved = crate::plot::render_ascii_plot_from_fits_file(&loaded, 60, 15);
        assert_eq!(live, saved);
    }

    #[test]
    fn missing_or_invalid_files_are_config_errors() {
        let missing = std::env::temp_dir().join("curves-definitely-missing.json");
        assert_eq!(read_fits_json(&missing).unwrap_err().exit_code(), 2);

        let bad = std::env::temp_dir().join(format!("curves-bad-{}.json", std::process::id()));
        std::fs::write(&bad, "{ not json").unwrap();
        let err = read_fits_json(&bad).unwrap_err();
        let _ = std::fs::remove_file(&bad);
        assert_eq!(err.exit_code(), 2);
    }
}
