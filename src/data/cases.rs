//! Hand-maintained case series and their window presets.
//!
//! The first case was detected on 2020-02-27/28. The nine days of single
//! cases before `START_DATE` are omitted so the chart is not too stretched.
//!
//! Two lists start on `START_DATE`: the cumulative confirmed counts of the
//! first four weeks, and a longer revised list kept as daily deltas that
//! runs on into a second wave.

use chrono::NaiveDate;

use crate::domain::{ModelKind, Preset, Series, WindowEnd, WindowSpec, WindowStart};

/// Day 0 of the series.
pub const START_DATE: (i32, u32, u32) = (2020, 3, 8);

/// Confirmed cases at day end.
pub const CONFIRMED_CASES: [u64; 27] = [
    // initial stretch where an exponential gives a good fit
    1, //
    2, 3, 3, 3, 6, 7, 12, //
    // quarantine declared on Mar 16 (the day that ended with 16 cases)
    16, 26, 34, 48, 69, 99, 143, //
    // no longer exponential from Mar 23, one week after quarantine start
    179, 209, 274, 299, 358, 394, 460, //
    491, 537, 605, 649, 724,
];

/// Last value of the initial run that an exponential still fits well.
pub const LAST_PERFECT_EXP_DATAPOINT: f64 = 143.0;

/// Default projection horizon.
pub const DAYS_TO_PREDICT: usize = 3;

/// Length of the trailing window preset.
pub const TRAILING_WINDOW_DAYS: usize = 15;

/// Day offset where the revised list's second wave begins.
pub const SECOND_WAVE_START_DAY: usize = 45;

/// Length of the long trailing window used alongside the second wave.
pub const SECOND_WAVE_TRAILING_DAYS: usize = 42;

/// New cases per day in the revised list.
///
/// The first 27 days sum to `CONFIRMED_CASES`. Day 33 is a downward
/// recount, which makes the cumulative series dip.
pub const REVISED_DAILY_CASES: [i64; 63] = [
    1, 1, 1, 0, 0, 3, 1, 5, 4, 10, 8, 14, 21, 30, 44, //
    36, 30, 65, 25, 59, 36, 66, 31, 46, 68, 44, 75, //
    // plateau
    71, 66, 58, 63, 52, 47, -12, 55, 41, 38, 36, 30, 33, 27, 25, 29, 24, 22, //
    // second wave
    9, 10, 11, 13, 15, 17, 19, 21, 24, 27, 31, 35, 39, 44, 50, 56, 64, 72,
];

pub fn start_date() -> NaiveDate {
    let (y, m, d) = START_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// The confirmed-case series.
pub fn confirmed_series() -> Series {
    Series::from_counts(start_date(), &CONFIRMED_CASES)
}

/// The revised series, accumulated from daily deltas.
pub fn revised_series() -> Series {
    Series::from_daily_deltas(start_date(), &REVISED_DAILY_CASES)
}

/// Window specifications for a preset.
pub fn preset_windows(preset: Preset) -> Vec<WindowSpec> {
    match preset {
        Preset::InitialRun => vec![
            WindowSpec::new(
                "Exponential fit during initial run",
                ModelKind::Exponential,
                WindowStart::Offset(0),
                WindowEnd::ThroughValue(LAST_PERFECT_EXP_DATAPOINT),
            ),
            WindowSpec::new(
                "Linear fit after initial run",
                ModelKind::Linear,
                WindowStart::AtValue(LAST_PERFECT_EXP_DATAPOINT),
                WindowEnd::ToEnd,
            ),
            WindowSpec::new(
                "Exponential fit after initial run",
                ModelKind::Exponential,
                WindowStart::AtValue(LAST_PERFECT_EXP_DATAPOINT),
                WindowEnd::ToEnd,
            ),
        ],
        Preset::AllData => [
            ("Exponential fit across all data", ModelKind::Exponential),
            ("Logarithmic fit across all data", ModelKind::Logarithmic),
            ("Sigmoidal fit across all data", ModelKind::Sigmoidal),
        ]
        .into_iter()
        .map(|(label, model)| WindowSpec::new(label, model, WindowStart::Offset(0), WindowEnd::ToEnd))
        .collect(),
        Preset::Trailing => [ModelKind::Linear, ModelKind::Exponential]
            .into_iter()
            .map(|model| {
                WindowSpec::new(
                    format!(
                        "{} fit over last {TRAILING_WINDOW_DAYS} days",
                        capitalize(model.display_name())
                    ),
                    model,
                    WindowStart::Trailing(TRAILING_WINDOW_DAYS),
                    WindowEnd::ToEnd,
                )
            })
            .collect(),
        Preset::SecondWave => vec![
            WindowSpec::new(
                "Exponential fit since second wave start",
                ModelKind::Exponential,
                WindowStart::Offset(SECOND_WAVE_START_DAY),
                WindowEnd::ToEnd,
            ),
            WindowSpec::new(
                format!("Linear fit over last {SECOND_WAVE_TRAILING_DAYS} days"),
                ModelKind::Linear,
                WindowStart::Trailing(SECOND_WAVE_TRAILING_DAYS),
                WindowEnd::ToEnd,
            ),
        ],
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
