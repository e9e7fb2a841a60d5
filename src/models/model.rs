//! Model evaluation for the four curve variants.
//!
//! The fitter relies on two primitive operations:
//! - predict `y(t)` given the parameter vector (for residuals/plots)
//! - fill a Jacobian row `∂y/∂p_j` at a given `t` (for the optimizer and the
//!   covariance of the fitted parameters)
//!
//! These are implemented here for each model kind.

use crate::domain::ModelKind;

/// Predict `y(t)` for the given model kind.
///
/// # Panics
/// Panics if `params` does not have length `model.param_len()`. Callers size
/// the parameter vector when they validate the initial guess.
pub fn predict(model: ModelKind, t: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::Exponential => {
            // y = a·e^(b·t) + c
            params[0] * (params[1] * t).exp() + params[2]
        }
        ModelKind::Linear => {
            // y = m·t + b
            params[0] * t + params[1]
        }
        ModelKind::Quadratic => {
            // y = a·t² + b·t + c
            params[0] * t * t + params[1] * t + params[2]
        }
        ModelKind::ExpDecay => {
            // y = a·e^(−t/b)
            params[0] * (-t / params[1]).exp()
        }
    }
}

/// Fill a Jacobian row with `∂y/∂p_j` at `t`.
///
/// # Panics
/// Panics if `out` or `params` does not have length `model.param_len()`.
pub fn fill_jacobian_row(model: ModelKind, t: f64, params: &[f64], out: &mut [f64]) {
    match model {
        ModelKind::Exponential => {
            let e = (params[1] * t).exp();
            out[0] = e;
            out[1] = params[0] * t * e;
            out[2] = 1.0;
        }
        ModelKind::Linear => {
            out[0] = t;
            out[1] = 1.0;
        }
        ModelKind::Quadratic => {
            out[0] = t * t;
            out[1] = t;
            out[2] = 1.0;
        }
        ModelKind::ExpDecay => {
            let b = params[1];
            let e = (-t / b).exp();
            out[0] = e;
            out[1] = params[0] * t * e / (b * b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_known_values() {
        assert_eq!(predict(ModelKind::Linear, 3.0, &[2.0, 1.0]), 7.0);
        assert_eq!(predict(ModelKind::Quadratic, 2.0, &[1.0, -1.0, 0.5]), 2.5);
        let y = predict(ModelKind::Exponential, 0.0, &[2.0, -0.3, 1.0]);
        assert!((y - 3.0).abs() < 1e-12);
        let y = predict(ModelKind::ExpDecay, 2.0, &[4.0, 2.0]);
        assert!((y - 4.0 * (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let cases: &[(ModelKind, Vec<f64>)] = &[
            (ModelKind::Exponential, vec![1.5, -0.4, 0.7]),
            (ModelKind::Linear, vec![2.0, -1.0]),
            (ModelKind::Quadratic, vec![0.5, -1.5, 2.0]),
            (ModelKind::ExpDecay, vec![3.0, 1.8]),
        ];
        let h = 1e-6;

        for (kind, params) in cases {
            let p = kind.param_len();
            let mut row = vec![0.0; p];
            for &t in &[0.0, 0.5, 1.0, 3.0] {
                fill_jacobian_row(*kind, t, params, &mut row);
                for j in 0..p {
                    let mut hi = params.clone();
                    let mut lo = params.clone();
                    hi[j] += h;
                    lo[j] -= h;
                    let numeric =
                        (predict(*kind, t, &hi) - predict(*kind, t, &lo)) / (2.0 * h);
                    assert!(
                        (row[j] - numeric).abs() < 1e-5,
                        "{kind:?} dy/dp[{j}] at t={t}: analytic={} numeric={numeric}",
                        row[j],
                    );
                }
            }
        }
    }
}
