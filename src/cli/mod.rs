//! Command-line parsing for the case-curve projector.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DatasetKind, Preset};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "curves",
    version,
    about = "Fit growth curves to cumulative case counts and project them forward"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the preset windows, print diagnostics and projections, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported fits JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `curves fit`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Which series to fit.
    #[arg(short = 'd', long, value_enum, default_value_t = DatasetKind::Confirmed)]
    pub dataset: DatasetKind,

    /// Which set of fit windows to run.
    #[arg(short = 'p', long, value_enum, default_value_t = Preset::InitialRun)]
    pub preset: Preset,

    /// Days to extrapolate past each window.
    #[arg(long = "days", default_value_t = crate::data::cases::DAYS_TO_PREDICT)]
    pub days_to_predict: usize,

    /// Optimizer evaluation budget per fit.
    #[arg(long, default_value_t = 5000)]
    pub max_evaluations: usize,

    /// Fail the run (exit code 3) if any fit fails.
    #[arg(long)]
    pub strict: bool,

    /// Length of the synthetic series (days).
    #[arg(long, default_value_t = 40)]
    pub synthetic_days: usize,

    /// Log-normal noise level for the synthetic series.
    #[arg(long = "noise", default_value_t = 0.05)]
    pub synthetic_noise: f64,

    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export dated projections to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fits (params + quality + projections) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting saved fits.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Fits JSON file produced by `curves fit --export-json`.
    #[arg(long, value_name = "JSON")]
    pub fits: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults() {
        let cli = Cli::parse_from(["curves", "fit"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.dataset, DatasetKind::Confirmed);
        assert_eq!(args.preset, Preset::InitialRun);
        assert_eq!(args.days_to_predict, 3);
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn fit_flags_parse() {
        let cli = Cli::parse_from([
            "curves", "fit", "-d", "synthetic", "-p", "all-data", "--days", "7", "--strict", "--no-plot",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.dataset, DatasetKind::Synthetic);
        assert_eq!(args.preset, Preset::AllData);
        assert_eq!(args.days_to_predict, 7);
        assert!(args.strict && args.no_plot);
    }
}
