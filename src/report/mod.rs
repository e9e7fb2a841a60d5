//! Reporting utilities: residuals and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;

use crate::domain::{FitResult, PointResidual, Series};
use crate::error::AppError;
use crate::models::predict;

/// Compute fitted values and residuals (observed − predicted) for each point.
pub fn compute_residuals(series: &Series, fit: &FitResult) -> Result<Vec<PointResidual>, AppError> {
    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let y_fit = predict(fit.model, series.t[i], &fit.params);
        if !y_fit.is_finite() {
            return Err(AppError::new(
                4,
                "Non-finite model prediction during residual computation.",
            ));
        }
        out.push(PointResidual {
            t: series.t[i],
            y_obs: series.y[i],
            y_err: series.y_err[i],
            y_fit,
            residual: series.y[i] - y_fit,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, ModelKind};

    #[test]
    fn residuals_are_observed_minus_predicted() {
        let series = Series {
            label: "max".to_string(),
            t: vec![0.0, 1.0, 2.0],
            y: vec![1.5, 3.0, 4.5],
            y_err: vec![0.1; 3],
        };
        let fit = FitResult {
            model: ModelKind::Linear,
            params: vec![2.0, 1.0],
            uncertainties: vec![0.0, 0.0],
            quality: FitQuality {
                chi2: 0.0,
                rmse: 0.0,
                n: 3,
                dof: 1,
            },
        };

        let residuals = compute_residuals(&series, &fit).unwrap();
        assert_eq!(residuals.len(), 3);
        assert!((residuals[0].residual - 0.5).abs() < 1e-12);
        assert!((residuals[1].residual - 0.0).abs() < 1e-12);
        assert!((residuals[2].residual - (-0.5)).abs() < 1e-12);
    }
}
