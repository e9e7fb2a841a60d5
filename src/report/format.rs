//! Formatted terminal output for fit runs.

use crate::domain::{DisplacementData, FitConfig, FitResult};
use crate::io::ingest::compute_stats;

/// Format the best-fit parameters of one series, with uncertainties.
///
/// Output shape (one parameter per line, 4 decimal places):
///
/// ```text
/// Best fit parameters, with uncertainties (max, Exponential):
///   a = 1.0023 ± 0.0151
/// ```
pub fn format_fit_report(label: &str, fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Best fit parameters, with uncertainties ({label}, {}):\n",
        fit.model.display_name()
    ));
    for (i, name) in fit.model.param_names().iter().enumerate() {
        out.push_str(&format!(
            "  {name} = {:.4} ± {:.4}\n",
            fit.params[i], fit.uncertainties[i]
        ));
    }
    out.push_str(&format!(
        "  chi2 = {:.4} | rmse = {:.4} | n = {} | dof = {}\n",
        fit.quality.chi2, fit.quality.rmse, fit.quality.n, fit.quality.dof
    ));
    out
}

/// Format the full run summary (dataset stats + both fit reports).
pub fn format_run_summary(
    data: &DisplacementData,
    max_fit: &FitResult,
    min_fit: &FitResult,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== lab - curve fit ===\n");
    out.push_str(&format!("File: {}\n", config.data_path.display()));
    out.push_str(&format!("Model: {}\n", config.model.display_name()));
    out.push_str(&format!("Rows: {}\n", data.rows_read));

    for series in [&data.max, &data.min] {
        if let Some(stats) = compute_stats(series) {
            out.push_str(&format!(
                "{}: n={} | t=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
                series.label, stats.n_points, stats.t_min, stats.t_max, stats.y_min, stats.y_max
            ));
        }
    }
    out.push('\n');

    out.push_str(&format_fit_report(&data.max.label, max_fit));
    out.push('\n');
    out.push_str(&format_fit_report(&data.min.label, min_fit));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, ModelKind};

    #[test]
    fn fit_report_lists_every_parameter_with_uncertainty() {
        let fit = FitResult {
            model: ModelKind::Linear,
            params: vec![2.0, 1.0],
            uncertainties: vec![0.0447, 0.0837],
            quality: FitQuality {
                chi2: 0.0,
                rmse: 0.0,
                n: 4,
                dof: 2,
            },
        };
        let text = format_fit_report("max", &fit);
        assert!(text.contains("Best fit parameters, with uncertainties (max, Linear):"));
        assert!(text.contains("m = 2.0000 ± 0.0447"));
        assert!(text.contains("b = 1.0000 ± 0.0837"));
    }
}
