//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the fit/projection pipeline
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `curves` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` is optional; it only seeds RUST_LOG and friends.
    dotenvy::dotenv().ok();

    // `curves` and `curves -d synthetic` behave like `curves tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log lines would tear the alternate screen.
    let default_filter = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    init_logging(default_filter);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A subscriber may already be installed (tests, embedding); that is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    println!("{}", crate::report::format_projection_table(&run));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_projections_csv(path, &run)?;
        tracing::info!(path = %path.display(), "wrote projections CSV");
    }
    if let Some(path) = &config.export_json {
        crate::io::curve::write_fits_json(path, &run, &config)?;
        tracing::info!(path = %path.display(), "wrote fits JSON");
    }

    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let fits = crate::io::curve::read_fits_json(&args.fits)?;
    let plot = crate::plot::render_ascii_plot_from_fits_file(&fits, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    RunConfig {
        dataset: args.dataset,
        preset: args.preset,
        days_to_predict: args.days_to_predict,
        max_evaluations: args.max_evaluations,
        strict: args.strict,
        synthetic_days: args.synthetic_days,
        synthetic_noise: args.synthetic_noise,
        seed: args.seed,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `curves` defaults to `curves tui`.
///
/// Rules:
/// - `curves`                      -> `curves tui`
/// - `curves -d synthetic ...`     -> `curves tui -d synthetic ...`
/// - `curves --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_binary_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["curves"])), argv(&["curves", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["curves", "-d", "synthetic"])),
            argv(&["curves", "tui", "-d", "synthetic"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["curves", "fit"])), argv(&["curves", "fit"]));
        assert_eq!(rewrite_args(argv(&["curves", "--help"])), argv(&["curves", "--help"]));
    }

    #[test]
    fn no_plot_overrides_plot() {
        let cli = crate::cli::Cli::parse_from(["curves", "fit", "--no-plot"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert!(!run_config_from_args(&args).plot);
    }
}
