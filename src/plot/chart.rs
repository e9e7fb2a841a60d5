//! SVG chart rendering via Plotters.
//!
//! Two chart kinds:
//! - the fit chart: observed points with error bars (split by sign of the
//!   dependent value), the smooth fitted curve, and a residual panel with a
//!   zero reference line, stacked vertically
//! - the scatter chart: one colored series per dependent column
//!
//! We render to SVG so chart text survives the no-native-font build (the SVG
//! backend emits text elements; rasterizing backends would need font-kit).

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{FitResult, PlotLabels, PointResidual, ScatterData, Series};
use crate::error::AppError;

const FIT_CHART_SIZE: (u32, u32) = (900, 800);
const SCATTER_CHART_SIZE: (u32, u32) = (1000, 600);

fn render_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::new(5, format!("Failed to render chart: {e}"))
}

/// Bounds for one axis, padded by 5%. `None` when no finite values exist.
fn padded_bounds<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
    }
    if !(min_v.is_finite() && max_v.is_finite()) {
        return None;
    }
    if max_v <= min_v {
        return Some((min_v - 0.5, max_v + 0.5));
    }
    let pad = (max_v - min_v) * 0.05;
    Some((min_v - pad, max_v + pad))
}

/// Write the two-panel fit chart for one series.
///
/// `curve` is the pre-sampled smooth fitted curve (1000 evenly spaced points
/// in the default pipeline).
pub fn write_fit_svg(
    path: &Path,
    series: &Series,
    fit: &FitResult,
    curve: &[(f64, f64)],
    residuals: &[PointResidual],
    labels: &PlotLabels,
) -> Result<(), AppError> {
    let (t0, t1) = padded_bounds(
        residuals
            .iter()
            .map(|r| r.t)
            .chain(curve.iter().map(|&(t, _)| t)),
    )
    .ok_or_else(|| {
        AppError::new(
            5,
            format!("Series '{}' has no finite t values to render.", series.label),
        )
    })?;

    let (y0, y1) = padded_bounds(
        residuals
            .iter()
            .flat_map(|r| [r.y_obs - r.y_err, r.y_obs + r.y_err])
            .chain(curve.iter().map(|&(_, y)| y)),
    )
    .ok_or_else(|| {
        AppError::new(
            5,
            format!("Series '{}' has no finite y values to render.", series.label),
        )
    })?;

    let (r0, r1) = padded_bounds(
        residuals
            .iter()
            .flat_map(|r| [r.residual - r.y_err, r.residual + r.y_err])
            .chain([0.0]),
    )
    .ok_or_else(|| AppError::new(5, "No finite residuals to render."))?;

    let root = SVGBackend::new(path, FIT_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    // Same 2:1 height split as the terminal plot.
    let (upper, lower) = root.split_vertically((FIT_CHART_SIZE.1 * 2 / 3) as i32);

    let mut chart = ChartBuilder::on(&upper)
        .caption(&labels.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t0..t1, y0..y1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(labels.xlabel.as_str())
        .y_desc(labels.ylabel.as_str())
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(curve.iter().copied(), RED.stroke_width(2)))
        .map_err(render_err)?
        .label(format!("Best fit ({})", fit.model.display_name()))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], RED.stroke_width(2)));

    // Presentation-only split: positive and negative observations get their
    // own marker color, as a pure filter over the residual list.
    let positive: Vec<&PointResidual> = residuals.iter().filter(|r| r.y_obs >= 0.0).collect();
    let negative: Vec<&PointResidual> = residuals.iter().filter(|r| r.y_obs < 0.0).collect();

    if !positive.is_empty() {
        chart
            .draw_series(positive.iter().map(|r| {
                ErrorBar::new_vertical(r.t, r.y_obs - r.y_err, r.y_obs, r.y_obs + r.y_err, BLACK.filled(), 6)
            }))
            .map_err(render_err)?
            .label("Positive data")
            .legend(|(x, y)| Circle::new((x + 8, y), 3, BLACK.filled()));
    }
    if !negative.is_empty() {
        chart
            .draw_series(negative.iter().map(|r| {
                ErrorBar::new_vertical(r.t, r.y_obs - r.y_err, r.y_obs, r.y_obs + r.y_err, BLUE.filled(), 6)
            }))
            .map_err(render_err)?
            .label("Negative data")
            .legend(|(x, y)| Circle::new((x + 8, y), 3, BLUE.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(render_err)?;

    let mut resid_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t0..t1, r0..r1)
        .map_err(render_err)?;

    resid_chart
        .configure_mesh()
        .x_desc(labels.xlabel.as_str())
        .y_desc("Residuals")
        .draw()
        .map_err(render_err)?;

    resid_chart
        .draw_series(LineSeries::new([(t0, 0.0), (t1, 0.0)], RED.stroke_width(1)))
        .map_err(render_err)?;

    resid_chart
        .draw_series(residuals.iter().map(|r| {
            ErrorBar::new_vertical(r.t, r.residual - r.y_err, r.residual, r.residual + r.y_err, BLACK.filled(), 6)
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Write the multi-series scatter chart.
pub fn write_scatter_svg(path: &Path, data: &ScatterData, labels: &PlotLabels) -> Result<(), AppError> {
    let (x0, x1) = padded_bounds(data.x.iter().copied())
        .ok_or_else(|| AppError::new(5, "Scatter x column has no finite values to render."))?;
    let (y0, y1) = padded_bounds(data.series.iter().flatten().copied())
        .ok_or_else(|| AppError::new(5, "Scatter series have no finite values to render."))?;

    let root = SVGBackend::new(path, SCATTER_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&labels.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(labels.xlabel.as_str())
        .y_desc(labels.ylabel.as_str())
        .draw()
        .map_err(render_err)?;

    for (idx, series) in data.series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(
                data.x
                    .iter()
                    .zip(series.iter())
                    .map(|(&x, &y)| Circle::new((x, y), 4, color.filled())),
            )
            .map_err(render_err)?
            .label(format!("Y{}", idx + 1))
            .legend(move |(x, y)| Circle::new((x + 8, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_bounds_pads_and_filters() {
        let (lo, hi) = padded_bounds([1.0, f64::NAN, 3.0]).unwrap();
        assert!(lo < 1.0 && hi > 3.0);
        assert!(padded_bounds([f64::NAN, f64::INFINITY]).is_none());
        // degenerate range widens instead of collapsing
        let (lo, hi) = padded_bounds([2.0, 2.0]).unwrap();
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn scatter_svg_smoke() {
        let data = ScatterData {
            x: vec![0.1, 0.2, 0.3],
            series: vec![vec![2.0, 2.1, 2.2], vec![1.9, 2.0, 2.1]],
            rows_read: 3,
        };
        let path = std::env::temp_dir().join(format!("lab_curves_scatter_{}.svg", std::process::id()));
        write_scatter_svg(&path, &data, &PlotLabels::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn scatter_svg_rejects_all_non_finite_axes() {
        let data = ScatterData {
            x: vec![f64::NAN, f64::NAN],
            series: vec![vec![1.0, 2.0]],
            rows_read: 2,
        };
        let path = std::env::temp_dir().join("lab_curves_should_not_exist.svg");
        let err = write_scatter_svg(&path, &data, &PlotLabels::default()).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }
}
