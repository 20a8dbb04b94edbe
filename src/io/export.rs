//! Export dated projections to CSV.
//!
//! One row per (fit, day), long format, so it is easy to pivot in spreadsheets
//! or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::error::AppError;

/// Write every successful fit's projection to a CSV file.
pub fn write_projections_csv(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    // Header
    writeln!(file, "label,model,date,offset,observed,projected,extrapolated")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let series = &run.analysis.series;
    for (spec, fitted) in run.successes() {
        for (point, (date, _)) in fitted.projection.points.iter().zip(fitted.dated_points(series)) {
            let day = fitted.window.start + point.offset;
            let observed = series
                .values()
                .get(day)
                .map(|v| format!("{v:.0}"))
                .unwrap_or_default();
            let projected = if point.value.is_finite() {
                format!("{:.4}", point.value)
            } else {
                String::new()
            };
            writeln!(
                file,
                "{},{},{},{},{},{},{}",
                csv_field(&spec.label),
                spec.model.display_name(),
                date,
                day,
                observed,
                projected,
                point.offset >= fitted.window.len,
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// Quote a field if it contains a delimiter or quote.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{Analysis, run_analysis};
    use crate::domain::{ModelKind, Series, WindowEnd, WindowSpec, WindowStart};
    use crate::fit::FitOptions;
    use chrono::NaiveDate;

    #[test]
    fn csv_has_one_row_per_projected_day() {
        let start = NaiveDate::from_ymd_opt(2020, 3, 8).unwrap();
        let analysis = Analysis {
            series: Series::from_counts(start, &[1, 5, 10, 20, 30, 40]),
            windows: vec![WindowSpec::new(
                "tail, linear",
                ModelKind::Linear,
                WindowStart::Offset(2),
                WindowEnd::ToEnd,
            )],
            days_to_predict: 2,
        };
        let outcomes = run_analysis(&analysis, &FitOptions::default());
        let run = RunOutput { analysis, outcomes };

        let path = std::env::temp_dir().join(format!("curves-export-{}.csv", std::process::id()));
        write_projections_csv(&path, &run).unwrap();
        let txt = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 1 + 4 + 2);
        assert_eq!(lines[1], "\"tail, linear\",linear,2020-03-10,2,10,10.0000,false");
        assert_eq!(lines[6], "\"tail, linear\",linear,2020-03-15,7,,60.0000,true");
    }

    #[test]
    fn csv_field_quotes_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
