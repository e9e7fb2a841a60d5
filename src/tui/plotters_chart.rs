//! Plotters-powered chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - the same drawing code family as the SVG export
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. The same widget draws both the data panel (curve +
/// points) and the residual panel (`zero_line` + points).
pub struct LabChart<'a> {
    /// Line series for the fitted curve (may be empty).
    pub curve: &'a [(f64, f64)],
    /// Scatter series for observations with a non-negative dependent value.
    pub positive: &'a [(f64, f64)],
    /// Scatter series for observations with a negative dependent value.
    pub negative: &'a [(f64, f64)],
    /// Draw a horizontal zero reference line (residual panel).
    pub zero_line: bool,
    /// X bounds (time).
    pub x_bounds: [f64; 2],
    /// Y bounds (displacement or residual).
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl Widget for LabChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.1}"))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Series styling: keep the palette high-contrast for terminal readability.
            let curve_color = RGBColor(255, 0, 0); // red
            let zero_color = RGBColor(255, 255, 0); // yellow
            let positive_color = WHITE;
            let negative_color = RGBColor(0, 128, 255); // blue

            if self.zero_line {
                chart.draw_series(LineSeries::new([(x0, 0.0), (x1, 0.0)], &zero_color))?;
            }

            if self.curve.len() >= 2 {
                chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;
            }

            // `Pixel` markers: the backend maps circle radii incorrectly
            // (pixel radius -> normalized canvas units), so plain pixels are
            // the reliable "dot" in terminals.
            chart.draw_series(
                self.positive
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), positive_color)),
            )?;
            chart.draw_series(
                self.negative
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), negative_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
