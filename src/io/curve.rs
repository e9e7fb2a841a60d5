//! Read/write fit JSON files.
//!
//! Fit JSON is the "portable" representation of a run:
//! - model kind + fitted parameters and uncertainties per series
//! - a precomputed smooth curve grid for quick replotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveEntry, CurveFile, CurveGrid, FitResult, Series};
use crate::error::AppError;
use crate::models::predict;

/// Write a fit JSON file covering the given `(series, fit)` pairs.
pub fn write_curve_json(
    path: &Path,
    fits: &[(&Series, &FitResult)],
    curve_samples: usize,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create fit JSON '{}': {e}", path.display()))
    })?;

    let mut curves = Vec::with_capacity(fits.len());
    for &(series, fit) in fits {
        let (t_min, t_max) = series.t_range().unwrap_or((0.0, 1.0));
        let (t, y) = sample_curve(fit, t_min, t_max, curve_samples);
        curves.push(CurveEntry {
            label: series.label.clone(),
            fit: fit.clone(),
            grid: CurveGrid { t, y },
        });
    }

    let out = CurveFile {
        tool: "lab".to_string(),
        curves,
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display()))
    })?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))?;
    Ok(curve)
}

/// Evaluate the fitted model on `n` evenly spaced points across `[t_min, t_max]`.
pub fn sample_curve(fit: &FitResult, t_min: f64, t_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let mut t0 = t_min;
    let mut t1 = t_max;
    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 {
        t0 = 0.0;
        t1 = 1.0;
    }

    let mut t = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let ti = t0 + u * (t1 - t0);
        t.push(ti);
        y.push(predict(fit.model, ti, &fit.params));
    }

    (t, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, ModelKind};

    fn linear_fit() -> FitResult {
        FitResult {
            model: ModelKind::Linear,
            params: vec![2.0, 1.0],
            uncertainties: vec![0.01, 0.01],
            quality: FitQuality {
                chi2: 0.0,
                rmse: 0.0,
                n: 4,
                dof: 2,
            },
        }
    }

    #[test]
    fn sample_curve_spans_the_range_inclusively() {
        let (t, y) = sample_curve(&linear_fit(), 0.0, 3.0, 1000);
        assert_eq!(t.len(), 1000);
        assert_eq!(t[0], 0.0);
        assert_eq!(*t.last().unwrap(), 3.0);
        assert!((y[0] - 1.0).abs() < 1e-12);
        assert!((y.last().unwrap() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn sample_curve_degenerate_range_falls_back() {
        let (t, _) = sample_curve(&linear_fit(), 2.0, 2.0, 10);
        assert_eq!(t.len(), 10);
        assert_eq!(t[0], 0.0);
        assert_eq!(*t.last().unwrap(), 1.0);
    }
}
