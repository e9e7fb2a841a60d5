//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Layout mirrors the SVG chart: a main panel with observed points, error
//! bars, and the fitted curve, stacked over a residual panel with a zero
//! reference line.
//!
//! Plot elements:
//! - observed points: `o` (y ≥ 0) / `x` (y < 0)
//! - vertical error bars: `|`
//! - fitted curve and zero line: `-`

use crate::domain::{PlotLabels, PointResidual};

/// Render the two stacked panels for one fitted series.
///
/// `height` is the main panel height in rows; the residual panel gets half
/// that (at least 3 rows). The fitted curve is passed in as pre-sampled
/// `(t, y)` pairs.
pub fn render_ascii_panels(
    residuals: &[PointResidual],
    curve: &[(f64, f64)],
    width: usize,
    height: usize,
    labels: &PlotLabels,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let resid_height = (height / 2).max(3);

    let (t_min, t_max) = t_range(residuals, curve).unwrap_or((0.0, 1.0));

    // Main panel range covers points ± error bars and the curve.
    let (y_min, y_max) = {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for r in residuals {
            min_y = min_y.min(r.y_obs - r.y_err);
            max_y = max_y.max(r.y_obs + r.y_err);
        }
        for &(_, y) in curve {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        finite_range(min_y, max_y)
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, curve, t_min, t_max, y_min, y_max);
    for r in residuals {
        let x = map_x(r.t, t_min, t_max, width);
        draw_error_bar(&mut grid, x, r.y_obs, r.y_err, y_min, y_max);
    }
    for r in residuals {
        let x = map_x(r.t, t_min, t_max, width);
        let y = map_y(r.y_obs, y_min, y_max, height);
        grid[y][x] = marker(r.y_obs);
    }

    // Residual panel range covers residuals ± error bars and the zero line.
    let (r_min, r_max) = {
        let mut min_r: f64 = 0.0;
        let mut max_r: f64 = 0.0;
        for r in residuals {
            min_r = min_r.min(r.residual - r.y_err);
            max_r = max_r.max(r.residual + r.y_err);
        }
        finite_range(min_r, max_r)
    };
    let (r_min, r_max) = pad_range(r_min, r_max, 0.05);

    let mut resid_grid = vec![vec![' '; width]; resid_height];
    let zero_row = map_y(0.0, r_min, r_max, resid_height);
    for cell in &mut resid_grid[zero_row] {
        *cell = '-';
    }
    for r in residuals {
        let x = map_x(r.t, t_min, t_max, width);
        draw_error_bar(&mut resid_grid, x, r.residual, r.y_err, r_min, r_max);
    }
    for r in residuals {
        let x = map_x(r.t, t_min, t_max, width);
        let y = map_y(r.residual, r_min, r_max, resid_height);
        resid_grid[y][x] = marker(r.y_obs);
    }

    let mut out = String::new();
    out.push_str(&labels.title);
    out.push('\n');
    out.push_str(&format!(
        "t=[{t_min:.3}, {t_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!("Residuals: r=[{r_min:.2}, {r_max:.2}]\n"));
    for row in resid_grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn marker(y_obs: f64) -> char {
    if y_obs >= 0.0 { 'o' } else { 'x' }
}

fn t_range(residuals: &[PointResidual], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for r in residuals {
        min_t = min_t.min(r.t);
        max_t = max_t.max(r.t);
    }
    for &(t, _) in curve {
        min_t = min_t.min(t);
        max_t = max_t.max(t);
    }
    if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
        Some((min_t, max_t))
    } else {
        None
    }
}

fn finite_range(min: f64, max: f64) -> (f64, f64) {
    if min.is_finite() && max.is_finite() && max > min {
        (min, max)
    } else {
        (-1.0, 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_error_bar(grid: &mut [Vec<char>], x: usize, y: f64, y_err: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let top = map_y(y + y_err, y_min, y_max, height);
    let bot = map_y(y - y_err, y_min, y_max, height);
    for row in grid.iter_mut().take(bot + 1).skip(top) {
        row[x] = '|';
    }
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let residuals = vec![
            PointResidual {
                t: 0.0,
                y_obs: 0.0,
                y_err: 5.0,
                y_fit: 0.0,
                residual: 0.0,
            },
            PointResidual {
                t: 10.0,
                y_obs: 0.0,
                y_err: 5.0,
                y_fit: 0.0,
                residual: 0.0,
            },
        ];
        let curve = vec![(0.0, 0.0), (10.0, 0.0)];

        let txt = render_ascii_panels(&residuals, &curve, 10, 5, &PlotLabels::default());
        let expected = concat!(
            "Displacement vs Time\n",
            "t=[0.000, 10.000] | y=[-5.50, 5.50]\n",
            "|        |\n",
            "|        |\n",
            "o--------o\n",
            "|        |\n",
            "|        |\n",
            "Residuals: r=[-5.50, 5.50]\n",
            "|        |\n",
            "o--------o\n",
            "|        |\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn negative_points_use_the_x_marker() {
        let residuals = vec![PointResidual {
            t: 0.5,
            y_obs: -2.0,
            y_err: 0.5,
            y_fit: -2.0,
            residual: 0.0,
        }];
        let txt = render_ascii_panels(&residuals, &[(0.0, -2.0), (1.0, -2.0)], 12, 6, &PlotLabels::default());
        assert!(txt.contains('x'));
        assert!(!txt.lines().nth(2).unwrap_or("").contains('o'));
    }
}
