//! Forward projection of a fitted model.

use crate::domain::{ModelKind, ProjectedPoint, Projection};
use crate::models::predict;

/// Evaluate `model` at every offset in `0..window_length + days_to_predict`.
///
/// The first `window_length` values reconstruct the fitted window; the rest
/// extrapolate past the last observation. Non-finite values are kept as-is,
/// and a parameter vector of the wrong length gives `NaN` at every offset.
pub fn project(
    model: ModelKind,
    params: &[f64],
    window_length: usize,
    days_to_predict: usize,
) -> Projection {
    let usable = params.len() == model.param_count();
    let points = (0..window_length + days_to_predict)
        .map(|offset| ProjectedPoint {
            offset,
            value: if usable {
                predict(model, offset as f64, params)
            } else {
                f64::NAN
            },
        })
        .collect();

    Projection {
        window_length,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::fitter::fit;

    #[test]
    fn linear_projection_appends_future_days() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0, 50.0];
        let fit = fit(ModelKind::Linear, &x, &y).unwrap();
        let proj = project(ModelKind::Linear, &fit.params, y.len(), 2);

        assert_eq!(proj.len(), 7);
        let tail: Vec<f64> = proj.extrapolated().iter().map(|p| p.value).collect();
        assert!((tail[0] - 60.0).abs() < 1e-9);
        assert!((tail[1] - 70.0).abs() < 1e-9);
    }

    #[test]
    fn exponential_outbreak_projection_is_increasing() {
        let y = [
            1.0, 2.0, 3.0, 3.0, 3.0, 6.0, 7.0, 12.0, 16.0, 26.0, 34.0, 48.0, 69.0, 99.0, 143.0,
        ];
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        let fit = fit(ModelKind::Exponential, &x, &y).unwrap();
        let proj = project(ModelKind::Exponential, &fit.params, y.len(), 3);

        assert_eq!(proj.len(), 18);
        let values = proj.values();
        assert!(values.windows(2).all(|w| w[1] > w[0]), "{values:?}");
        assert!((values[14] - 143.0).abs() / 143.0 < 0.02);
    }

    #[test]
    fn zero_horizon_reconstructs_window_only() {
        let proj = project(ModelKind::Linear, &[1.0, 0.0], 4, 0);
        assert_eq!(proj.fitted().len(), 4);
        assert!(proj.extrapolated().is_empty());
    }

    #[test]
    fn offset_zero_is_finite_for_every_model() {
        let params: [&[f64]; 4] = [
            &[2.0, 1.0],
            &[1.0, 0.3, 0.0],
            &[10.0, 2.0, 1.0],
            &[100.0, 5.0, -2.0, 0.0],
        ];
        for (model, p) in ModelKind::ALL.into_iter().zip(params) {
            let proj = project(model, p, 1, 0);
            assert!(proj.points[0].value.is_finite(), "{model:?}");
        }
    }

    #[test]
    fn non_finite_values_are_reported_not_raised() {
        let proj = project(ModelKind::Exponential, &[1.0, 800.0, 0.0], 1, 2);
        assert_eq!(proj.len(), 3);
        assert!(!proj.is_finite());
    }

    #[test]
    fn wrong_parameter_count_projects_nan() {
        for params in [&[1.0, 2.0][..], &[1.0, 2.0, 3.0, 4.0, 5.0][..]] {
            let proj = project(ModelKind::Sigmoidal, params, 3, 1);
            assert_eq!(proj.len(), 4);
            assert!(proj.points.iter().all(|p| p.value.is_nan()), "{params:?}");
        }
    }
}
