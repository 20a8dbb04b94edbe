use case_curves::app::pipeline::{Analysis, run_analysis};
use case_curves::data::{cases, confirmed_series, synthetic};
use case_curves::domain::{ModelKind, Preset, Series, WindowEnd, WindowSpec, WindowStart};
use case_curves::fit::{FitOptions, fit, project, resolve_window, window_data};

#[test]
fn initial_run_exponential_projects_three_days() {
    let series = confirmed_series();
    let spec = &cases::preset_windows(Preset::InitialRun)[0];
    assert_eq!(spec.model, ModelKind::Exponential);

    let window = resolve_window(spec, &series).unwrap();
    assert_eq!((window.start, window.len), (0, 15));

    let (x, y) = window_data(&series, window);
    let result = fit(ModelKind::Exponential, &x, &y).unwrap();
    let projection = project(ModelKind::Exponential, &result.params, window.len, cases::DAYS_TO_PREDICT);

    let values = projection.values();
    assert_eq!(values.len(), 18);
    assert!(values.windows(2).all(|w| w[1] > w[0]));
    assert!((values[14] - 143.0).abs() / 143.0 < 0.02, "got {}", values[14]);
    assert_eq!(projection.extrapolated().len(), 3);
}

#[test]
fn linear_series_extends_by_two_days() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    let y = [10.0, 20.0, 30.0, 40.0, 50.0];
    let result = fit(ModelKind::Linear, &x, &y).unwrap();
    assert!((result.params[0] - 10.0).abs() < 1e-6);
    assert!(result.quality.sse < 1e-9);

    let projection = project(ModelKind::Linear, &result.params, 5, 2);
    let tail: Vec<f64> = projection.extrapolated().iter().map(|p| p.value).collect();
    assert_eq!(tail.len(), 2);
    assert!((tail[0] - 60.0).abs() < 1e-6);
    assert!((tail[1] - 70.0).abs() < 1e-6);
}

#[test]
fn every_preset_runs_and_keeps_spec_order() {
    let series = confirmed_series();
    for preset in [Preset::InitialRun, Preset::AllData, Preset::Trailing] {
        let windows = cases::preset_windows(preset);
        let analysis = Analysis {
            series: series.clone(),
            windows: windows.clone(),
            days_to_predict: 3,
        };
        let outcomes = run_analysis(&analysis, &FitOptions::default());
        assert_eq!(outcomes.len(), windows.len());
        for (outcome, spec) in outcomes.iter().zip(&windows) {
            assert_eq!(&outcome.spec, spec);
            let fitted = outcome
                .result
                .as_ref()
                .unwrap_or_else(|e| panic!("{}: {e}", spec.label));
            assert_eq!(fitted.projection.len(), fitted.window.len + 3);
            assert!(fitted.projection.points[0].value.is_finite());
        }
    }
}

#[test]
fn second_wave_fits_on_revised_series() {
    let series = cases::revised_series();
    assert_eq!(series.corrections(), vec![33]);

    let windows = cases::preset_windows(Preset::SecondWave);
    let analysis = Analysis {
        series: series.clone(),
        windows: windows.clone(),
        days_to_predict: cases::DAYS_TO_PREDICT,
    };
    let outcomes = run_analysis(&analysis, &FitOptions::default());
    for (outcome, spec) in outcomes.iter().zip(&windows) {
        let fitted = outcome
            .result
            .as_ref()
            .unwrap_or_else(|e| panic!("{}: {e}", spec.label));
        assert_eq!(fitted.window.end(), series.len());
        assert!(fitted.projection.is_finite(), "{}", spec.label);
    }

    let wave = outcomes[0].result.as_ref().unwrap();
    assert_eq!(wave.window.start, cases::SECOND_WAVE_START_DAY);
    assert!(wave.fit.params[1] > 0.0);
    let tail = wave.projection.values();
    assert!(tail.windows(2).all(|w| w[1] > w[0]), "{tail:?}");
}

#[test]
fn corrections_are_fitted_through() {
    let start = cases::start_date();
    let series = Series::from_daily_deltas(start, &[10, 10, 10, -5, 10, 10, 10]);
    assert_eq!(series.corrections(), vec![3]);

    let analysis = Analysis {
        series,
        windows: vec![WindowSpec::new(
            "all",
            ModelKind::Linear,
            WindowStart::Offset(0),
            WindowEnd::ToEnd,
        )],
        days_to_predict: 1,
    };
    let outcomes = run_analysis(&analysis, &FitOptions::default());
    let fitted = outcomes[0].result.as_ref().unwrap();
    assert_eq!(fitted.window.len, 7);
    assert!(fitted.fit.quality.sse > 0.0);
}

#[test]
fn sigmoid_recovers_synthetic_plateau() {
    let series = synthetic::generate_series(cases::start_date(), 40, 0.0, 5).unwrap();
    let spec = WindowSpec::new("all", ModelKind::Sigmoidal, WindowStart::Offset(0), WindowEnd::ToEnd);
    let window = resolve_window(&spec, &series).unwrap();
    let (x, y) = window_data(&series, window);

    let result = fit(ModelKind::Sigmoidal, &x, &y).unwrap();
    let truth = synthetic::synthetic_params(40);
    assert!((result.params[0] - truth[0]).abs() / truth[0] < 0.05);
    assert!((result.params[1] - truth[1]).abs() < 1.0);
    assert!(result.params[2] < 0.0);
}
