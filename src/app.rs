//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional SVG charts and exports

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, FitArgs, GenArgs, ScatterArgs};
use crate::data::SampleConfig;
use crate::domain::{FitConfig, PlotLabels};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lab` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `lab` (and `lab -f data.txt`) to behave like `lab tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Scatter(args) => handle_scatter(args),
        Command::Gen(args) => handle_gen(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.data, &run.max_fit, &run.min_fit, &config)
    );

    let panels = [
        (&run.data.max, &run.max_fit, &run.max_residuals),
        (&run.data.min, &run.min_fit, &run.min_residuals),
    ];

    if config.plot {
        for (series, fit, residuals) in panels {
            let curve = sampled_curve(series, fit, config.curve_samples);
            let labels = series_labels(&config.labels, &series.label);
            println!(
                "{}",
                crate::plot::render_ascii_panels(
                    residuals,
                    &curve,
                    config.plot_width,
                    config.plot_height,
                    &labels,
                )
            );
        }
    }

    if let Some(path) = &config.svg_path {
        for (series, fit, residuals) in panels {
            let out = path_for_series(path, &series.label);
            let curve = sampled_curve(series, fit, config.curve_samples);
            let labels = series_labels(&config.labels, &series.label);
            crate::plot::write_fit_svg(&out, series, fit, &curve, residuals, &labels)?;
            println!("Fit chart saved as {}", out.display());
        }
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(
            path,
            &[
                ("max", &run.max_fit, run.max_residuals.as_slice()),
                ("min", &run.min_fit, run.min_residuals.as_slice()),
            ],
        )?;
        println!("Results exported to {}", path.display());
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(
            path,
            &[(&run.data.max, &run.max_fit), (&run.data.min, &run.min_fit)],
            config.curve_samples,
        )?;
        println!("Fit JSON exported to {}", path.display());
    }

    Ok(())
}

fn handle_scatter(args: ScatterArgs) -> Result<(), AppError> {
    let data = crate::io::ingest::load_scatter(&args.file)?;
    let labels = PlotLabels {
        xlabel: args.xlabel,
        ylabel: args.ylabel,
        title: args.title,
    };
    crate::plot::write_scatter_svg(&args.out, &data, &labels)?;
    println!("Scatter plot saved as {}", args.out.display());
    Ok(())
}

fn handle_gen(args: GenArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        points: args.points,
        seed: args.seed,
        ..SampleConfig::default()
    };
    crate::data::write_sample_files(&args.out, &args.scatter_out, &config)?;
    println!("Wrote {} and {}", args.out.display(), args.scatter_out.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        data_path: args.file.clone(),
        model: args.model,
        initial_guess: args.guess.clone(),
        curve_samples: args.samples,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        labels: PlotLabels {
            xlabel: args.xlabel.clone(),
            ylabel: args.ylabel.clone(),
            title: args.title.clone(),
        },
        svg_path: args.svg.clone(),
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

/// Sample the smooth fitted curve across the series' observed t-range.
fn sampled_curve(
    series: &crate::domain::Series,
    fit: &crate::domain::FitResult,
    samples: usize,
) -> Vec<(f64, f64)> {
    let (t0, t1) = series.t_range().unwrap_or((0.0, 1.0));
    let (t, y) = crate::io::curve::sample_curve(fit, t0, t1, samples);
    t.into_iter().zip(y).collect()
}

fn series_labels(base: &PlotLabels, label: &str) -> PlotLabels {
    PlotLabels {
        title: format!("{} ({label})", base.title),
        ..base.clone()
    }
}

/// Derive a per-series output path: `fit.svg` + "max" -> `fit_max.svg`.
pub(crate) fn path_for_series(path: &Path, label: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fit".to_string());
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "svg".to_string());
    path.with_file_name(format!("{stem}_{label}.{ext}"))
}

/// Rewrite argv so `lab` defaults to `lab tui`.
///
/// Rules:
/// - `lab`                      -> `lab tui`
/// - `lab -f data.txt ...`      -> `lab tui -f data.txt ...`
/// - `lab --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "scatter" | "gen" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["lab"])), argv(&["lab", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["lab", "-f", "d.txt"])),
            argv(&["lab", "tui", "-f", "d.txt"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["lab", "fit", "--no-plot"])),
            argv(&["lab", "fit", "--no-plot"])
        );
        assert_eq!(rewrite_args(argv(&["lab", "--help"])), argv(&["lab", "--help"]));
    }

    #[test]
    fn per_series_paths_keep_the_extension() {
        let out = path_for_series(Path::new("charts/fit.svg"), "max");
        assert_eq!(out, PathBuf::from("charts/fit_max.svg"));
    }
}
