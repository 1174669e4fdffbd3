//! Forecasting, loss and gradient descent.

use cal_types::{Dataset, HyperparameterPoint, ModelParameters};

use crate::scaling::{denormalize, ScaledDataset};

/// Predict `slope * x + intercept` for every observation.
pub fn forecast(parameters: &ModelParameters, x: &[f64]) -> Vec<f64> {
    x.iter()
        .map(|xi| parameters.slope * xi + parameters.intercept)
        .collect()
}

/// Average squared residual.
pub fn mean_squared_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    debug_assert_eq!(predictions.len(), actuals.len());
    let sum: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a) * (p - a))
        .sum();
    sum / predictions.len() as f64
}

/// Partial derivatives of the MSE with respect to `(intercept, slope)`,
/// both taken from the same prediction pass.
fn gradients(predictions: &[f64], data: &Dataset) -> (f64, f64) {
    let n = predictions.len() as f64;
    let (mut d_intercept, mut d_slope) = (0.0, 0.0);
    for ((p, x), y) in predictions.iter().zip(&data.x).zip(&data.y) {
        let residual = y - p;
        d_intercept += residual;
        d_slope += residual * x;
    }
    (-2.0 * d_intercept / n, -2.0 * d_slope / n)
}

/// One batch gradient-descent update. Both parameters move simultaneously.
pub fn gradient_descent_step(
    parameters: ModelParameters,
    data: &Dataset,
    learning_rate: f64,
) -> ModelParameters {
    let predictions = forecast(&parameters, &data.x);
    let (d_intercept, d_slope) = gradients(&predictions, data);
    ModelParameters {
        intercept: parameters.intercept - learning_rate * d_intercept,
        slope: parameters.slope - learning_rate * d_slope,
    }
}

/// Run a fixed number of updates starting from `(0, 0)`. No convergence
/// check and no early stopping.
pub fn run_gradient_descent(data: &Dataset, learning_rate: f64, epochs: u64) -> ModelParameters {
    (0..epochs).fold(ModelParameters::zero(), |params, _| {
        gradient_descent_step(params, data, learning_rate)
    })
}

/// Fitted raw-space parameters for one point and their MSE on the raw data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub parameters: ModelParameters,
    pub error: f64,
}

/// Fit on the normalized data, map the parameters back to raw `x` space and
/// score them against the unnormalized observations.
pub fn evaluate_point(data: &ScaledDataset, point: &HyperparameterPoint) -> Evaluation {
    let fitted = run_gradient_descent(data.normalized(), point.learning_rate, point.epochs);
    let parameters = denormalize(fitted, data.min(), data.max());
    let predictions = forecast(&parameters, &data.raw().x);
    Evaluation {
        parameters,
        error: mean_squared_error(&predictions, &data.raw().y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_data() -> Dataset {
        Dataset::new(vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 7.0, 9.0, 11.0])
    }

    #[test]
    fn forecast_applies_slope_and_intercept() {
        let params = ModelParameters::new(100.0, 5.0);
        assert_eq!(forecast(&params, &[0.0, 10.0, 20.0]), vec![100.0, 150.0, 200.0]);
    }

    #[test]
    fn mse_of_exact_fit_is_zero() {
        assert_eq!(mean_squared_error(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_eq!(mean_squared_error(&[1.0, 2.0], &[2.0, 4.0]), 2.5);
    }

    #[test]
    fn step_uses_gradients_from_one_prediction_pass() {
        let data = Dataset::new(vec![1.0, 2.0], vec![3.0, 5.0]);
        let next = gradient_descent_step(ModelParameters::zero(), &data, 0.1);
        // residuals 3 and 5: d_intercept = -8, d_slope = -13
        assert!((next.intercept - 0.8).abs() < 1e-12);
        assert!((next.slope - 1.3).abs() < 1e-12);
    }

    #[test]
    fn zero_learning_rate_keeps_initial_parameters() {
        let params = run_gradient_descent(&line_data(), 0.0, 500);
        assert_eq!(params, ModelParameters::zero());
    }

    #[test]
    fn zero_epochs_returns_initial_parameters() {
        let params = run_gradient_descent(&line_data(), 0.05, 0);
        assert_eq!(params, ModelParameters::zero());
    }

    #[test]
    fn converges_on_exact_line() {
        let params = run_gradient_descent(&line_data(), 0.05, 20_000);
        assert!((params.slope - 2.0).abs() < 1e-6, "slope {}", params.slope);
        assert!((params.intercept - 3.0).abs() < 1e-6, "intercept {}", params.intercept);
    }

    #[test]
    fn evaluate_point_scores_against_raw_data() {
        let raw = Dataset::new(vec![0.0, 10.0, 20.0], vec![100.0, 150.0, 200.0]);
        let scaled = ScaledDataset::prepare(raw).unwrap();

        let eval = evaluate_point(&scaled, &HyperparameterPoint::new(0.1, 1000));
        assert!((eval.parameters.slope - 5.0).abs() < 1e-4);
        assert!((eval.parameters.intercept - 100.0).abs() < 1e-4);
        assert!(eval.error < 1e-6);

        let untrained = evaluate_point(&scaled, &HyperparameterPoint::new(0.1, 0));
        // zero parameters predict 0 everywhere
        let expected = (100.0f64.powi(2) + 150.0f64.powi(2) + 200.0f64.powi(2)) / 3.0;
        assert!((untrained.error - expected).abs() < 1e-9);
    }
}
