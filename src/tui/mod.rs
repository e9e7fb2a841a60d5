//! Ratatui-based terminal UI.
//!
//! The TUI loads the displacement file once, then lets the user switch
//! between model variants; every switch re-fits both series with the newly
//! selected model and redraws the data and residual panels.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::RunOutput;
use crate::cli::FitArgs;
use crate::domain::{DisplacementData, FitConfig, FitResult, ModelKind, PointResidual, Series};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::LabChart;

/// Start the TUI.
pub fn run(args: FitArgs) -> Result<(), AppError> {
    let config = crate::app::fit_config_from_args(&args);
    let data = crate::io::ingest::load_displacement(&config.data_path)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(5, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, data);
    app.refit();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(5, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(5, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesView {
    Max,
    Min,
}

impl SeriesView {
    fn toggle(self) -> Self {
        match self {
            SeriesView::Max => SeriesView::Min,
            SeriesView::Min => SeriesView::Max,
        }
    }
}

struct App {
    config: FitConfig,
    data: DisplacementData,
    selected: usize,
    view: SeriesView,
    run: Option<RunOutput>,
    status: String,
}

impl App {
    fn new(config: FitConfig, data: DisplacementData) -> Self {
        let selected = ModelKind::all()
            .iter()
            .position(|&k| k == config.model)
            .unwrap_or(0);
        Self {
            config,
            data,
            selected,
            view: SeriesView::Max,
            run: None,
            status: "Fitting...".to_string(),
        }
    }

    fn model(&self) -> ModelKind {
        ModelKind::all()[self.selected]
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(5, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(5, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(5, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.view = self.view.toggle();
            }
            KeyCode::Up | KeyCode::Left => {
                self.selected = (self.selected + ModelKind::all().len() - 1) % ModelKind::all().len();
                self.refit();
            }
            KeyCode::Down | KeyCode::Right => {
                self.selected = (self.selected + 1) % ModelKind::all().len();
                self.refit();
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.selected = (c as usize) - ('1' as usize);
                self.refit();
            }
            KeyCode::Char('s') => {
                self.save_charts();
            }
            _ => {}
        }
        false
    }

    /// Re-fit both series with the currently selected model.
    ///
    /// A failed fit keeps the previous run on screen and reports the error in
    /// the status line.
    fn refit(&mut self) {
        let mut config = self.config.clone();
        config.model = self.model();
        // Model switches always restart from the new model's own default
        // guess; a caller-supplied guess only applies to the initial model.
        if config.model != self.config.model {
            config.initial_guess = None;
        }

        match crate::app::pipeline::run_fit_with_data(&config, self.data.clone()) {
            Ok(run) => {
                self.status = format!(
                    "model: {} | chi2 max={:.4} min={:.4}",
                    config.model.display_name(),
                    run.max_fit.quality.chi2,
                    run.min_fit.quality.chi2,
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Fit failed: {err}");
            }
        }
    }

    fn save_charts(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing fitted yet.".to_string();
            return;
        };

        let base = self
            .config
            .svg_path
            .clone()
            .unwrap_or_else(|| "displacement_fit.svg".into());

        let panels = [
            (&run.data.max, &run.max_fit, &run.max_residuals),
            (&run.data.min, &run.min_fit, &run.min_residuals),
        ];
        for (series, fit, residuals) in panels {
            let out = crate::app::path_for_series(&base, &series.label);
            let curve = sampled_curve(series, fit, self.config.curve_samples);
            let mut labels = self.config.labels.clone();
            labels.title = format!("{} ({})", self.config.labels.title, series.label);

            match crate::plot::write_fit_svg(&out, series, fit, &curve, residuals, &labels) {
                Ok(()) => self.status = format!("Saved {}", out.display()),
                Err(err) => {
                    self.status = format!("Save failed: {err}");
                    return;
                }
            }
        }
    }

    fn current_panel(&self) -> Option<(&Series, &FitResult, &[PointResidual])> {
        let run = self.run.as_ref()?;
        Some(match self.view {
            SeriesView::Max => (&run.data.max, &run.max_fit, run.max_residuals.as_slice()),
            SeriesView::Min => (&run.data.min, &run.min_fit, run.min_residuals.as_slice()),
        })
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("lab", Style::default().fg(Color::Cyan)),
            Span::raw(" — displacement curve fit"),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "file: {} | model: {} | series: {}",
                self.config.data_path.display(),
                self.model().display_name(),
                match self.view {
                    SeriesView::Max => "max",
                    SeriesView::Min => "min",
                },
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some((_, fit, _)) = self.current_panel() {
            let params = fit
                .model
                .param_names()
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{name}={:.4}±{:.4}", fit.params[i], fit.uncertainties[i]))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(Line::from(Span::styled(
                params,
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(9),
                Constraint::Length(6),
            ])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_residuals(frame, chunks[1]);
        self.draw_models(frame, chunks[2]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.view {
            SeriesView::Max => "Data + fit (max)",
            SeriesView::Min => "Data + fit (min)",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((series, fit, residuals)) = self.current_panel() else {
            let msg = Paragraph::new(self.status.clone())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let curve = sampled_curve(series, fit, self.config.curve_samples);
        let positive: Vec<(f64, f64)> = residuals
            .iter()
            .filter(|r| r.y_obs >= 0.0)
            .map(|r| (r.t, r.y_obs))
            .collect();
        let negative: Vec<(f64, f64)> = residuals
            .iter()
            .filter(|r| r.y_obs < 0.0)
            .map(|r| (r.t, r.y_obs))
            .collect();

        let (x_bounds, y_bounds) = panel_bounds(
            residuals.iter().map(|r| (r.t, r.y_obs, r.y_err)),
            &curve,
        );

        let widget = LabChart {
            curve: &curve,
            positive: &positive,
            negative: &negative,
            zero_line: false,
            x_bounds,
            y_bounds,
            x_label: &self.config.labels.xlabel,
            y_label: &self.config.labels.ylabel,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_residuals(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Residuals").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((_, _, residuals)) = self.current_panel() else {
            return;
        };

        let positive: Vec<(f64, f64)> = residuals
            .iter()
            .filter(|r| r.y_obs >= 0.0)
            .map(|r| (r.t, r.residual))
            .collect();
        let negative: Vec<(f64, f64)> = residuals
            .iter()
            .filter(|r| r.y_obs < 0.0)
            .map(|r| (r.t, r.residual))
            .collect();

        let (x_bounds, y_bounds) = panel_bounds(
            residuals.iter().map(|r| (r.t, r.residual, r.y_err)),
            &[],
        );

        let widget = LabChart {
            curve: &[],
            positive: &positive,
            negative: &negative,
            zero_line: true,
            x_bounds,
            y_bounds,
            x_label: &self.config.labels.xlabel,
            y_label: "resid",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_models(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = ModelKind::all()
            .iter()
            .enumerate()
            .map(|(i, kind)| ListItem::new(format!("{} {}", i + 1, kind.display_name())))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Model").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = Line::from(vec![
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit | "),
            Span::styled("tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" max/min | "),
            Span::styled("↑/↓ 1-4", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" model | "),
            Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" save SVG | "),
            Span::raw(self.status.as_str()),
        ]);
        let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Sample the smooth fitted curve across the series' observed t-range.
fn sampled_curve(series: &Series, fit: &FitResult, samples: usize) -> Vec<(f64, f64)> {
    let (t0, t1) = series.t_range().unwrap_or((0.0, 1.0));
    let (t, y) = crate::io::curve::sample_curve(fit, t0, t1, samples);
    t.into_iter().zip(y).collect()
}

/// Compute padded chart bounds from `(t, y, y_err)` triples plus a curve.
fn panel_bounds<I: Iterator<Item = (f64, f64, f64)>>(
    points: I,
    curve: &[(f64, f64)],
) -> ([f64; 2], [f64; 2]) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for (t, y, e) in points {
        x_min = x_min.min(t);
        x_max = x_max.max(t);
        y_min = y_min.min(y - e);
        y_max = y_max.max(y + e);
    }
    for &(t, y) in curve {
        x_min = x_min.min(t);
        x_max = x_max.max(t);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !(x_min.is_finite() && x_max.is_finite()) || x_max <= x_min {
        x_min = 0.0;
        x_max = 1.0;
    }
    if !(y_min.is_finite() && y_max.is_finite()) || y_max <= y_min {
        y_min = -1.0;
        y_max = 1.0;
    }

    let x_pad = (x_max - x_min) * 0.02;
    let y_pad = (y_max - y_min) * 0.05;
    (
        [x_min - x_pad, x_max + x_pad],
        [y_min - y_pad, y_max + y_pad],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_bounds_cover_error_bars() {
        let ([x0, x1], [y0, y1]) = panel_bounds([(0.0, 1.0, 0.5), (2.0, 3.0, 0.5)].into_iter(), &[]);
        assert!(x0 < 0.0 && x1 > 2.0);
        assert!(y0 < 0.5 && y1 > 3.5);
    }

    #[test]
    fn series_view_toggles() {
        assert_eq!(SeriesView::Max.toggle(), SeriesView::Min);
        assert_eq!(SeriesView::Min.toggle(), SeriesView::Max);
    }
}
