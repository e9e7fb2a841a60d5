//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load file -> derive errors -> fit both series -> residuals
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{DisplacementData, FitConfig, FitResult, PointResidual};
use crate::error::AppError;
use crate::fit::fitter;
use crate::io::ingest::load_displacement;

/// All computed outputs of a single `lab fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: DisplacementData,
    pub max_fit: FitResult,
    pub min_fit: FitResult,
    pub max_residuals: Vec<PointResidual>,
    pub min_residuals: Vec<PointResidual>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let data = load_displacement(&config.data_path)?;
    run_fit_with_data(config, data)
}

/// Execute the fitting pipeline with pre-loaded data.
///
/// This is useful for the TUI where the user switches models without
/// re-reading the file; every call produces fresh fit results.
pub fn run_fit_with_data(config: &FitConfig, data: DisplacementData) -> Result<RunOutput, AppError> {
    let guess = match &config.initial_guess {
        Some(guess) => guess.clone(),
        None => config.model.default_guess(),
    };

    // The max and min series are independent problems.
    let (max_fit, min_fit) = rayon::join(
        || fitter::fit(config.model, &data.max, &guess),
        || fitter::fit(config.model, &data.min, &guess),
    );
    let max_fit = max_fit?;
    let min_fit = min_fit?;

    let max_residuals = crate::report::compute_residuals(&data.max, &max_fit)?;
    let min_residuals = crate::report::compute_residuals(&data.min, &min_fit)?;

    Ok(RunOutput {
        data,
        max_fit,
        min_fit,
        max_residuals,
        min_residuals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelKind, PlotLabels, Series};

    fn linear_data() -> DisplacementData {
        let t = vec![0.0, 1.0, 2.0, 3.0];
        DisplacementData {
            max: Series {
                label: "max".to_string(),
                t: t.clone(),
                y: vec![1.0, 3.0, 5.0, 7.0],
                y_err: vec![0.1; 4],
            },
            min: Series {
                label: "min".to_string(),
                t,
                y: vec![-1.0, -3.0, -5.0, -7.0],
                y_err: vec![0.1; 4],
            },
            rows_read: 4,
        }
    }

    fn config(model: ModelKind, guess: Option<Vec<f64>>) -> FitConfig {
        FitConfig {
            data_path: "unused.txt".into(),
            model,
            initial_guess: guess,
            curve_samples: 100,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            labels: PlotLabels::default(),
            svg_path: None,
            export_results: None,
            export_curve: None,
        }
    }

    #[test]
    fn pipeline_fits_both_series() {
        let run = run_fit_with_data(&config(ModelKind::Linear, None), linear_data()).unwrap();
        assert!((run.max_fit.params[0] - 2.0).abs() < 1e-8);
        assert!((run.min_fit.params[0] + 2.0).abs() < 1e-8);
        assert_eq!(run.max_residuals.len(), 4);
        assert_eq!(run.min_residuals.len(), 4);
    }

    #[test]
    fn bad_guess_length_fails_without_output() {
        let err = run_fit_with_data(
            &config(ModelKind::Linear, Some(vec![1.0, 1.0, 1.0])),
            linear_data(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
