//! Command-line parsing for the lab curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lab", version, about = "Lab data curve fitter and plotter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model to a displacement file, print the report, and plot.
    Fit(FitArgs),
    /// Render a multi-series scatter file to an SVG chart.
    Scatter(ScatterArgs),
    /// Write synthetic displacement and scatter sample files.
    Gen(GenArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `lab fit`, but lets you
    /// switch between model variants and see the re-fit immediately.
    Tui(FitArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Displacement data file (6 whitespace-separated columns, one header line).
    #[arg(short = 'f', long, default_value = "displacement_data.txt")]
    pub file: PathBuf,

    /// Model to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Exponential)]
    pub model: ModelKind,

    /// Initial guess as comma-separated values (defaults to the model's own guess).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub guess: Option<Vec<f64>>,

    /// Number of evaluation points for the smooth fitted curve.
    #[arg(long, default_value_t = 1000)]
    pub samples: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows, main panel).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write the two-panel fit chart to this SVG file.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export per-point results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fits (model + params + fitted grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// X axis label.
    #[arg(long, default_value = "Time")]
    pub xlabel: String,

    /// Y axis label.
    #[arg(long, default_value = "Displacement")]
    pub ylabel: String,

    /// Chart title.
    #[arg(long, default_value = "Displacement vs Time")]
    pub title: String,
}

/// Options for the scatter chart.
#[derive(Debug, Parser)]
pub struct ScatterArgs {
    /// Scatter data file (x column + N series columns, one header line).
    #[arg(short = 'f', long, default_value = "scatter1L.txt")]
    pub file: PathBuf,

    /// Output SVG file.
    #[arg(short = 'o', long, default_value = "scatter_plot.svg")]
    pub out: PathBuf,

    /// X axis label.
    #[arg(long, default_value = "Initial Angle (rad)")]
    pub xlabel: String,

    /// Y axis label.
    #[arg(long, default_value = "Pendulum Period (s)")]
    pub ylabel: String,

    /// Chart title.
    #[arg(long, default_value = "Scatter Plot for Initial Angle versus Pendulum Period")]
    pub title: String,
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser)]
pub struct GenArgs {
    /// Output path for the displacement file.
    #[arg(long, default_value = "displacement_data.txt")]
    pub out: PathBuf,

    /// Output path for the scatter file.
    #[arg(long, default_value = "scatter1L.txt")]
    pub scatter_out: PathBuf,

    /// Number of data rows to generate.
    #[arg(short = 'n', long, default_value_t = 25)]
    pub points: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_flag_accepts_negative_components() {
        let cli = Cli::parse_from(["lab", "fit", "--guess", "1,-0.1,1"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(args.guess, Some(vec![1.0, -0.1, 1.0]));
    }

    #[test]
    fn fit_defaults_match_the_original_workflow() {
        let cli = Cli::parse_from(["lab", "fit"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(args.file, PathBuf::from("displacement_data.txt"));
        assert_eq!(args.model, ModelKind::Exponential);
        assert_eq!(args.samples, 1000);
        assert_eq!(args.title, "Displacement vs Time");
    }

    #[test]
    fn scatter_defaults_to_the_fixed_artifact_name() {
        let cli = Cli::parse_from(["lab", "scatter"]);
        let Command::Scatter(args) = cli.command else {
            panic!("expected scatter subcommand");
        };
        assert_eq!(args.out, PathBuf::from("scatter_plot.svg"));
    }
}
