//! Weighted nonlinear least-squares fitting.
//!
//! Given a series `(t_i, y_i, σ_i)` and a model kind, we minimize
//!
//! ```text
//! χ² = Σ ((y_i - f(t_i; p)) / σ_i)²
//! ```
//!
//! over the parameter vector `p`, starting from the caller's initial guess.
//!
//! Implementation choices:
//! - Levenberg-Marquardt via the `levenberg-marquardt` crate with analytic
//!   Jacobians; residuals are scaled by `1/σ_i` so the optimizer works on the
//!   weighted problem directly.
//! - Uncertainties are treated as **absolute** standard deviations: the
//!   parameter covariance is `(JᵀJ)⁻¹` of the weighted Jacobian at the
//!   solution, with no reduced-χ² rescaling. Reported parameter uncertainties
//!   therefore scale directly with the input error magnitudes.
//! - The covariance inverse goes through a Cholesky factorization, which
//!   doubles as the positive-definiteness check for identifiability.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::storage::Owned;
use nalgebra::{Cholesky, DMatrix, DVector, Dyn, Matrix, Vector};

use crate::domain::{FitQuality, FitResult, ModelKind, Series};
use crate::error::AppError;
use crate::models::{fill_jacobian_row, predict};

/// The weighted residual problem handed to the Levenberg-Marquardt solver.
///
/// Residuals are `r_i = (y_i - f(t_i; p)) / σ_i`, so the Jacobian entries are
/// `-∂f/∂p_j / σ_i`. Returning `None` from `residuals`/`jacobian` signals the
/// solver that the current parameters left the model's valid region (e.g. an
/// overflowing exponential).
struct CurveProblem<'a> {
    model: ModelKind,
    t: &'a [f64],
    y: &'a [f64],
    y_err: &'a [f64],
    params: DVector<f64>,
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for CurveProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, params: &Vector<f64, Dyn, Self::ParameterStorage>) {
        self.params.copy_from(params);
    }

    fn params(&self) -> Vector<f64, Dyn, Self::ParameterStorage> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<Vector<f64, Dyn, Self::ResidualStorage>> {
        let params = self.params.as_slice();
        let mut out = DVector::<f64>::zeros(self.t.len());
        for i in 0..self.t.len() {
            let y_fit = predict(self.model, self.t[i], params);
            let r = (self.y[i] - y_fit) / self.y_err[i];
            if !r.is_finite() {
                return None;
            }
            out[i] = r;
        }
        Some(out)
    }

    fn jacobian(&self) -> Option<Matrix<f64, Dyn, Dyn, Self::JacobianStorage>> {
        let params = self.params.as_slice();
        let p = self.model.param_len();
        let mut jac = DMatrix::<f64>::zeros(self.t.len(), p);
        let mut row = vec![0.0; p];
        for i in 0..self.t.len() {
            fill_jacobian_row(self.model, self.t[i], params, &mut row);
            for j in 0..p {
                let v = -row[j] / self.y_err[i];
                if !v.is_finite() {
                    return None;
                }
                jac[(i, j)] = v;
            }
        }
        Some(jac)
    }
}

/// Fit `model` to `series` starting from `initial_guess`.
///
/// Produces a fresh [`FitResult`] on success; on failure nothing is written
/// anywhere, so a previous result held by the caller stays valid.
pub fn fit(model: ModelKind, series: &Series, initial_guess: &[f64]) -> Result<FitResult, AppError> {
    let p = model.param_len();
    if initial_guess.len() != p {
        return Err(AppError::new(
            4,
            format!(
                "{} expects {p} parameters, but the initial guess has {}.",
                model.display_name(),
                initial_guess.len()
            ),
        ));
    }
    if initial_guess.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Initial guess contains non-finite values."));
    }

    let n = series.len();
    if n == 0 {
        return Err(AppError::new(3, "No data points to fit."));
    }
    if series.y.len() != n || series.y_err.len() != n {
        return Err(AppError::new(
            3,
            format!("Series '{}' has mismatched column lengths.", series.label),
        ));
    }
    if n < p {
        return Err(AppError::new(
            4,
            format!(
                "{} needs at least {p} points, series '{}' has {n}.",
                model.display_name(),
                series.label
            ),
        ));
    }
    if series.t.iter().chain(series.y.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::new(
            3,
            format!("Series '{}' contains non-finite values.", series.label),
        ));
    }
    if series.y_err.iter().any(|e| !e.is_finite() || *e <= 0.0) {
        return Err(AppError::new(
            3,
            format!(
                "Series '{}' has zero, negative, or non-finite uncertainties; weighted fitting needs σ > 0.",
                series.label
            ),
        ));
    }

    let problem = CurveProblem {
        model,
        t: &series.t,
        y: &series.y,
        y_err: &series.y_err,
        params: DVector::from_column_slice(initial_guess),
    };

    let (problem, report) = LevenbergMarquardt::new().minimize(problem);
    if !report.termination.was_successful() {
        return Err(AppError::new(
            4,
            format!(
                "{} fit on series '{}' did not converge: {:?}",
                model.display_name(),
                series.label,
                report.termination
            ),
        ));
    }

    let params: Vec<f64> = problem.params.iter().copied().collect();
    if params.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(
            4,
            format!("{} fit produced non-finite parameters.", model.display_name()),
        ));
    }

    // Covariance of the fitted parameters from the weighted Jacobian at the
    // solution. A failed Cholesky means JᵀJ is singular or not positive
    // definite, i.e. the model is not identifiable at this solution.
    let jac = problem.jacobian().ok_or_else(|| {
        AppError::new(
            4,
            format!("{} Jacobian is not finite at the solution.", model.display_name()),
        )
    })?;
    let jtj = jac.transpose() * &jac;
    let chol = Cholesky::new(jtj).ok_or_else(|| {
        AppError::new(
            4,
            format!(
                "{} covariance is singular or not positive definite (model not identifiable here).",
                model.display_name()
            ),
        )
    })?;
    let cov = chol.inverse();

    let mut uncertainties = Vec::with_capacity(p);
    for j in 0..p {
        let var = cov[(j, j)];
        if !var.is_finite() || var < 0.0 {
            return Err(AppError::new(
                4,
                format!("{} covariance diagonal is invalid.", model.display_name()),
            ));
        }
        uncertainties.push(var.sqrt());
    }

    let residuals = problem.residuals().ok_or_else(|| {
        AppError::new(
            4,
            format!("{} residuals are not finite at the solution.", model.display_name()),
        )
    })?;
    let chi2 = residuals.norm_squared();

    let mut sse = 0.0;
    for i in 0..n {
        let r = series.y[i] - predict(model, series.t[i], &params);
        sse += r * r;
    }
    let rmse = (sse / n as f64).sqrt();

    Ok(FitResult {
        model,
        params,
        uncertainties,
        quality: FitQuality {
            chi2,
            rmse,
            n,
            dof: n - p,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(t: Vec<f64>, y: Vec<f64>, y_err: Vec<f64>) -> Series {
        Series {
            label: "max".to_string(),
            t,
            y,
            y_err,
        }
    }

    fn synthetic(model: ModelKind, params: &[f64], t: &[f64], sigma: f64) -> Series {
        let y: Vec<f64> = t.iter().map(|&ti| predict(model, ti, params)).collect();
        let y_err = vec![sigma; t.len()];
        series(t.to_vec(), y, y_err)
    }

    #[test]
    fn linear_fit_recovers_known_parameters() {
        // y = 2t + 1 on t = [0,1,2,3], σ = 0.1 everywhere.
        let s = series(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 3.0, 5.0, 7.0],
            vec![0.1; 4],
        );
        let fit = fit(ModelKind::Linear, &s, &[1.0, 1.0]).unwrap();

        assert!((fit.params[0] - 2.0).abs() < 1e-8);
        assert!((fit.params[1] - 1.0).abs() < 1e-8);
        assert!(fit.quality.chi2 < 1e-12);
        // Absolute-sigma uncertainties are set by σ and the design, not by
        // the (zero) residuals: small and finite, but not literally zero.
        for u in &fit.uncertainties {
            assert!(u.is_finite() && *u > 0.0 && *u < 0.1);
        }
        assert_eq!(fit.quality.n, 4);
        assert_eq!(fit.quality.dof, 2);
    }

    #[test]
    fn quadratic_fit_recovers_known_parameters() {
        let truth = [0.5, -1.0, 2.0];
        let t: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let s = synthetic(ModelKind::Quadratic, &truth, &t, 0.05);
        let fit = fit(ModelKind::Quadratic, &s, &[1.0, 1.0, 1.0]).unwrap();

        for (got, want) in fit.params.iter().zip(truth.iter()) {
            assert!((got - want).abs() < 1e-7, "got {got}, want {want}");
        }
        assert!(fit.quality.chi2 < 1e-10);
    }

    #[test]
    fn exponential_fit_recovers_known_parameters() {
        let truth = [2.0, -0.5, 1.0];
        let t: Vec<f64> = (0..16).map(|i| i as f64 * 0.5).collect();
        let s = synthetic(ModelKind::Exponential, &truth, &t, 0.01);
        let fit = fit(ModelKind::Exponential, &s, &ModelKind::Exponential.default_guess()).unwrap();

        for (got, want) in fit.params.iter().zip(truth.iter()) {
            assert!((got - want).abs() < 1e-5, "got {got}, want {want}");
        }
    }

    #[test]
    fn exp_decay_fit_recovers_known_parameters() {
        let truth = [3.0, 2.0];
        let t: Vec<f64> = (0..10).map(|i| i as f64 * 0.4).collect();
        let s = synthetic(ModelKind::ExpDecay, &truth, &t, 0.01);
        let fit = fit(ModelKind::ExpDecay, &s, &[1.0, 1.0]).unwrap();

        for (got, want) in fit.params.iter().zip(truth.iter()) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn mismatched_guess_length_is_a_fit_error() {
        let s = series(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0], vec![0.1; 3]);
        let err = fit(ModelKind::Linear, &s, &[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn non_positive_sigma_is_a_data_error() {
        let s = series(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0], vec![0.1, 0.0, 0.1]);
        let err = fit(ModelKind::Linear, &s, &[1.0, 1.0]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn fewer_points_than_parameters_is_a_fit_error() {
        let s = series(vec![0.0, 1.0], vec![1.0, 2.0], vec![0.1; 2]);
        let err = fit(ModelKind::Quadratic, &s, &[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn switching_models_leaves_the_series_untouched() {
        let s = series(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 3.0, 5.0, 7.0],
            vec![0.1; 4],
        );
        let before = (s.t.clone(), s.y.clone(), s.y_err.clone());

        let linear = fit(ModelKind::Linear, &s, &[1.0, 1.0]).unwrap();
        let quadratic = fit(ModelKind::Quadratic, &s, &[1.0, 1.0, 1.0]).unwrap();

        assert_eq!(before, (s.t.clone(), s.y.clone(), s.y_err.clone()));
        assert_eq!(linear.params.len(), 2);
        assert_eq!(quadratic.params.len(), 3);
    }
}
