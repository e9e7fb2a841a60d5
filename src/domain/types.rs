//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which parametric model to fit against the data.
///
/// The two exponential forms come from different measurement protocols and are
/// deliberately kept as distinct variants rather than unified:
///
/// - `Exponential`: `y = a·e^(b·t) + c` (free growth/decay rate plus offset)
/// - `ExpDecay`:    `y = a·e^(−t/b)` (decay towards zero with time constant `b`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Exponential,
    Linear,
    Quadratic,
    ExpDecay,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Exponential => "Exponential",
            ModelKind::Linear => "Linear",
            ModelKind::Quadratic => "Quadratic",
            ModelKind::ExpDecay => "Exp decay",
        }
    }

    /// Number of free parameters for this model.
    pub fn param_len(self) -> usize {
        match self {
            ModelKind::Exponential => 3,
            ModelKind::Linear => 2,
            ModelKind::Quadratic => 3,
            ModelKind::ExpDecay => 2,
        }
    }

    /// Parameter names, in the order they appear in the parameter vector.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Exponential => &["a", "b", "c"],
            ModelKind::Linear => &["m", "b"],
            ModelKind::Quadratic => &["a", "b", "c"],
            ModelKind::ExpDecay => &["a", "b"],
        }
    }

    /// Default initial guess used when the caller does not supply one.
    ///
    /// Always has length `param_len()`. The exponential guess matches the
    /// lightly-damped regime typical of displacement data; the others start
    /// from a neutral unit guess.
    pub fn default_guess(self) -> Vec<f64> {
        match self {
            ModelKind::Exponential => vec![1.0, -0.1, 1.0],
            ModelKind::Linear => vec![1.0, 1.0],
            ModelKind::Quadratic => vec![1.0, 1.0, 1.0],
            ModelKind::ExpDecay => vec![1.0, 1.0],
        }
    }

    /// Cycle to the next variant (TUI selector).
    pub fn next(self) -> Self {
        match self {
            ModelKind::Exponential => ModelKind::Linear,
            ModelKind::Linear => ModelKind::Quadratic,
            ModelKind::Quadratic => ModelKind::ExpDecay,
            ModelKind::ExpDecay => ModelKind::Exponential,
        }
    }

    /// Cycle to the previous variant (TUI selector).
    pub fn prev(self) -> Self {
        match self {
            ModelKind::Exponential => ModelKind::ExpDecay,
            ModelKind::Linear => ModelKind::Exponential,
            ModelKind::Quadratic => ModelKind::Linear,
            ModelKind::ExpDecay => ModelKind::Quadratic,
        }
    }

    /// All variants, in selector order.
    pub fn all() -> &'static [ModelKind] {
        &[
            ModelKind::Exponential,
            ModelKind::Linear,
            ModelKind::Quadratic,
            ModelKind::ExpDecay,
        ]
    }
}

/// Clap-compatible names (used by `default_value_t` and `--model` round-trips).
impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ModelKind::Exponential => "exponential",
            ModelKind::Linear => "linear",
            ModelKind::Quadratic => "quadratic",
            ModelKind::ExpDecay => "exp-decay",
        })
    }
}

/// A measurement series: independent variable, dependent variable, and the
/// absolute uncertainty of each dependent value.
///
/// Invariants (enforced at construction by the ingest code):
/// - `t`, `y`, and `y_err` have equal length
/// - `y_err` entries are strictly positive for a well-posed weighted fit
#[derive(Debug, Clone)]
pub struct Series {
    /// Label used in reports and chart legends (e.g. "max", "min").
    pub label: String,
    pub t: Vec<f64>,
    pub y: Vec<f64>,
    pub y_err: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Observed range of the independent variable, if non-degenerate.
    pub fn t_range(&self) -> Option<(f64, f64)> {
        let mut min_t = f64::INFINITY;
        let mut max_t = f64::NEG_INFINITY;
        for &t in &self.t {
            min_t = min_t.min(t);
            max_t = max_t.max(t);
        }
        if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
            Some((min_t, max_t))
        } else {
            None
        }
    }
}

/// The 6-column displacement file, normalized into two series.
///
/// Max and min peaks are logged at different times, so the series do not
/// share a time axis.
#[derive(Debug, Clone)]
pub struct DisplacementData {
    pub max: Series,
    pub min: Series,
    /// Data rows read from the file (header excluded).
    pub rows_read: usize,
}

/// The 1+N column scatter file: one shared x column, N dependent series.
#[derive(Debug, Clone)]
pub struct ScatterData {
    pub x: Vec<f64>,
    /// One vector per dependent column, each the same length as `x`.
    pub series: Vec<Vec<f64>>,
    pub rows_read: usize,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    /// Uncertainty-weighted sum of squared residuals.
    pub chi2: f64,
    /// Unweighted root-mean-square residual.
    pub rmse: f64,
    pub n: usize,
    /// Degrees of freedom: `n - param_len`.
    pub dof: usize,
}

/// Best-fit parameters and their uncertainties for one series.
///
/// `uncertainties` come from the square roots of the covariance diagonal and
/// always have the same length as `params`. A fresh `FitResult` is produced
/// on every fit; results are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub uncertainties: Vec<f64>,
    pub quality: FitQuality,
}

/// A per-point fitted value and residual (observed − predicted).
#[derive(Debug, Clone)]
pub struct PointResidual {
    pub t: f64,
    pub y_obs: f64,
    pub y_err: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Axis labels and title for rendering, with the fixed defaults of the
/// displacement workflow.
#[derive(Debug, Clone)]
pub struct PlotLabels {
    pub xlabel: String,
    pub ylabel: String,
    pub title: String,
}

impl Default for PlotLabels {
    fn default() -> Self {
        Self {
            xlabel: "Time".to_string(),
            ylabel: "Displacement".to_string(),
            title: "Displacement vs Time".to_string(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_path: PathBuf,
    pub model: ModelKind,
    /// Caller-supplied initial guess; `None` uses the model's default.
    pub initial_guess: Option<Vec<f64>>,
    /// Number of evaluation points for the smooth fitted curve.
    pub curve_samples: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub labels: PlotLabels,

    pub svg_path: Option<PathBuf>,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

/// A saved fit file (JSON): one entry per fitted series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub curves: Vec<CurveEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveEntry {
    pub label: String,
    pub fit: FitResult,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub t: Vec<f64>,
    pub y: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_guess_length_matches_param_len() {
        for &kind in ModelKind::all() {
            assert_eq!(kind.default_guess().len(), kind.param_len());
            assert_eq!(kind.param_names().len(), kind.param_len());
        }
    }

    #[test]
    fn model_cycle_is_a_permutation() {
        for &kind in ModelKind::all() {
            assert_eq!(kind.next().prev(), kind);
            assert_eq!(kind.prev().next(), kind);
        }
    }

    #[test]
    fn t_range_requires_spread() {
        let s = Series {
            label: "max".to_string(),
            t: vec![1.0, 1.0],
            y: vec![0.0, 0.0],
            y_err: vec![0.1, 0.1],
        };
        assert!(s.t_range().is_none());

        let s = Series {
            label: "max".to_string(),
            t: vec![0.0, 2.5],
            y: vec![0.0, 0.0],
            y_err: vec![0.1, 0.1],
        };
        assert_eq!(s.t_range(), Some((0.0, 2.5)));
    }
}
