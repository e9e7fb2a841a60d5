//! Export per-point fit results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FitResult, PointResidual};
use crate::error::AppError;

/// Write per-point residual rows for one or more fitted series.
pub fn write_results_csv(
    path: &Path,
    series: &[(&str, &FitResult, &[PointResidual])],
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "series,model,t,y_obs,y_err,y_fit,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for &(label, fit, residuals) in series {
        for r in residuals {
            writeln!(
                file,
                "{},{},{:.10},{:.6},{:.6},{:.6},{:.6}",
                label,
                fit.model.display_name(),
                r.t,
                r.y_obs,
                r.y_err,
                r.y_fit,
                r.residual,
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}
