//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{FitResult, RunConfig};

/// Format the run summary (dataset + per-fit diagnostics + failures).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let series = &run.analysis.series;
    let mut out = String::new();

    out.push_str("=== curves - case curve projections ===\n");
    out.push_str(&format!(
        "Dataset: {} | preset: {}\n",
        config.dataset.display_name(),
        config.preset.display_name()
    ));
    out.push_str(&format!(
        "Series: n={} | {} .. {} | last={}\n",
        series.len(),
        series.start_date(),
        series.date_at(series.len().saturating_sub(1)),
        series.values().last().map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".to_string()),
    ));
    out.push_str(&format!("Horizon: {} day(s)\n", run.analysis.days_to_predict));

    let corrections = series.corrections();
    if !corrections.is_empty() {
        let dates: Vec<String> = corrections.iter().map(|&i| series.date_at(i).to_string()).collect();
        out.push_str(&format!("Corrections (fitted as-is): {}\n", dates.join(", ")));
    }

    out.push_str("\nFits:\n");
    for (spec, fitted) in run.successes() {
        let w = fitted.window;
        out.push_str(&format!(
            "- {} [{}]\n    window: {} .. {} (n={})\n    params: {}\n    RMSE={:.3} BIC={:.3} evals={}\n",
            spec.label,
            spec.model.display_name(),
            series.date_at(w.start),
            series.date_at(w.end() - 1),
            w.len,
            fmt_params(&fitted.fit),
            fitted.fit.quality.rmse,
            fitted.fit.quality.bic,
            fitted.fit.quality.evaluations,
        ));
    }
    for (spec, err) in run.failures() {
        out.push_str(&format!("- {} [{}]\n    FAILED: {err}\n", spec.label, spec.model.display_name()));
    }

    out
}

/// Format the date-by-date projection table: observed plus one column per fit.
pub fn format_projection_table(run: &RunOutput) -> String {
    let series = &run.analysis.series;
    let fits: Vec<_> = run.successes().collect();

    let horizon_end = fits
        .iter()
        .map(|(_, f)| f.window.start + f.projection.len())
        .max()
        .unwrap_or(0)
        .max(series.len());

    let mut out = String::new();
    let mut header = format!("{:<10} {:>10}", "date", "observed");
    for (i, _) in fits.iter().enumerate() {
        header.push_str(&format!(" {:>10}", format!("fit{}", i + 1)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let mut rule = format!("{:-<10} {:-<10}", "", "");
    for _ in &fits {
        rule.push_str(&format!(" {:-<10}", ""));
    }
    out.push_str(&rule);
    out.push('\n');

    for day in 0..horizon_end {
        let observed = series
            .values()
            .get(day)
            .map(|v| format!("{v:.0}"))
            .unwrap_or_default();
        let mut row = format!("{:<10} {:>10}", series.date_at(day).format("%Y-%m-%d"), observed);
        for (_, f) in &fits {
            let cell = day
                .checked_sub(f.window.start)
                .and_then(|off| f.projection.points.get(off))
                .map(|p| format!("{:.1}", p.value))
                .unwrap_or_default();
            row.push_str(&format!(" {cell:>10}"));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out.push('\n');
    for (i, (spec, _)) in fits.iter().enumerate() {
        out.push_str(&format!("fit{}: {}\n", i + 1, spec.label));
    }

    out
}

fn fmt_params(fit: &FitResult) -> String {
    let errors = fit.std_errors();
    let parts: Vec<String> = fit
        .model
        .param_names()
        .iter()
        .zip(fit.params.iter())
        .enumerate()
        .map(|(i, (name, value))| match errors.as_ref().and_then(|e| e.get(i)) {
            Some(se) => format!("{name}={value:.6} ±{se:.3}"),
            None => format!("{name}={value:.6}"),
        })
        .collect();
    parts.join(", ")
}
