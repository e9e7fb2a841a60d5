//! Whitespace-delimited table ingest and normalization.
//!
//! This module turns the fixed-column lab text files into clean [`Series`]
//! values that are safe to fit.
//!
//! Design goals:
//! - **Strict schema**: a wrong column count or a malformed number fails the
//!   whole load with the offending 1-based line number (exit code 2)
//! - **Fixed positions**: columns are identified by position, never by name;
//!   the single header line is discarded unread
//! - **Separation of concerns**: no fitting logic here

use std::fs;
use std::path::Path;

use crate::domain::{DisplacementData, ScatterData, Series};
use crate::error::AppError;

/// Summary stats about one fitted series.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub t_min: f64,
    pub t_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Compute summary stats, or `None` for an empty series.
pub fn compute_stats(series: &Series) -> Option<DatasetStats> {
    if series.is_empty() {
        return None;
    }
    let mut t_min = f64::INFINITY;
    let mut t_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for i in 0..series.len() {
        t_min = t_min.min(series.t[i]);
        t_max = t_max.max(series.t[i]);
        y_min = y_min.min(series.y[i]);
        y_max = y_max.max(series.y[i]);
    }
    Some(DatasetStats {
        n_points: series.len(),
        t_min,
        t_max,
        y_min,
        y_max,
    })
}

/// Convert a percentage-of-value error column into absolute error magnitudes.
///
/// `absolute_error = |value| × (error_percentage / 100)`, elementwise. The
/// magnitude is taken so that negative dependent values (the min-displacement
/// series) still produce strictly positive uncertainties.
pub fn absolute_errors(values: &[f64], error_pct: &[f64]) -> Vec<f64> {
    values
        .iter()
        .zip(error_pct.iter())
        .map(|(&v, &p)| (v * (p / 100.0)).abs())
        .collect()
}

/// Load the 6-column displacement file.
pub fn load_displacement(path: &Path) -> Result<DisplacementData, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
    parse_displacement(&text)
}

/// Parse the 6-column displacement format:
///
/// `max_time  max_displacement  min_time  min_displacement  max_err%  min_err%`
///
/// The first line is a header and is discarded. Every subsequent non-blank
/// line must hold exactly 6 numeric fields.
pub fn parse_displacement(text: &str) -> Result<DisplacementData, AppError> {
    let rows = parse_rows(text, Some(6))?;
    if rows.is_empty() {
        return Err(AppError::new(3, "No data rows after the header line."));
    }

    let column = |idx: usize| -> Vec<f64> { rows.iter().map(|r| r[idx]).collect() };
    let max_time = column(0);
    let max_disp = column(1);
    let min_time = column(2);
    let min_disp = column(3);
    let max_err = absolute_errors(&max_disp, &column(4));
    let min_err = absolute_errors(&min_disp, &column(5));

    let rows_read = rows.len();
    Ok(DisplacementData {
        max: Series {
            label: "max".to_string(),
            t: max_time,
            y: max_disp,
            y_err: max_err,
        },
        min: Series {
            label: "min".to_string(),
            t: min_time,
            y: min_disp,
            y_err: min_err,
        },
        rows_read,
    })
}

/// Load the 1+N column scatter file.
pub fn load_scatter(path: &Path) -> Result<ScatterData, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
    parse_scatter(&text)
}

/// Parse the scatter format: first column is the shared x value, the
/// remaining N ≥ 1 columns are dependent series. The first data row fixes the
/// column count; every later row must match it.
pub fn parse_scatter(text: &str) -> Result<ScatterData, AppError> {
    let rows = parse_rows(text, None)?;
    if rows.is_empty() {
        return Err(AppError::new(3, "No data rows after the header line."));
    }

    let cols = rows[0].len();
    if cols < 2 {
        return Err(AppError::new(
            2,
            format!("Scatter rows need at least 2 columns (x + one series), found {cols}."),
        ));
    }

    let x: Vec<f64> = rows.iter().map(|r| r[0]).collect();
    let series: Vec<Vec<f64>> = (1..cols)
        .map(|c| rows.iter().map(|r| r[c]).collect())
        .collect();

    let rows_read = rows.len();
    Ok(ScatterData {
        x,
        series,
        rows_read,
    })
}

/// Shared row parser: skip the header line, split on whitespace runs, parse
/// every field as `f64`.
///
/// `expected_cols = None` locks the column count to the first data row.
fn parse_rows(text: &str, expected_cols: Option<usize>) -> Result<Vec<Vec<f64>>, AppError> {
    let mut lines = text.lines().enumerate();
    if lines.next().is_none() {
        return Err(AppError::new(2, "Input file is empty (missing header line)."));
    }

    let mut expected = expected_cols;
    let mut rows = Vec::new();

    for (idx, line) in lines {
        let lineno = idx + 1; // 1-based, matching editors
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            // Blank (or whitespace-only) lines are tolerated, e.g. a trailing
            // newline at the end of the file.
            continue;
        }

        if let Some(want) = expected {
            if fields.len() != want {
                return Err(AppError::new(
                    2,
                    format!("Line {lineno}: expected {want} columns, found {}.", fields.len()),
                ));
            }
        } else {
            expected = Some(fields.len());
        }

        let mut row = Vec::with_capacity(fields.len());
        for (col, field) in fields.iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| {
                AppError::new(
                    2,
                    format!("Line {lineno}, column {}: invalid number '{field}'.", col + 1),
                )
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLACEMENT: &str = "\
tmax xmax tmin xmin errmax% errmin%
0.0  1.00  0.5  -0.90  5.0  4.0
1.0  0.80  1.5  -0.70  5.0  4.0
2.0  0.65  2.5  -0.55  5.0  4.0
";

    #[test]
    fn displacement_lengths_equal_row_count_minus_header() {
        let data = parse_displacement(DISPLACEMENT).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.max.len(), 3);
        assert_eq!(data.min.len(), 3);
        assert_eq!(data.max.t, vec![0.0, 1.0, 2.0]);
        assert_eq!(data.min.y, vec![-0.90, -0.70, -0.55]);
    }

    #[test]
    fn displacement_errors_are_positive_magnitudes() {
        let data = parse_displacement(DISPLACEMENT).unwrap();
        // max: 1.00 * 5% = 0.05; min: |-0.90| * 4% = 0.036
        assert!((data.max.y_err[0] - 0.05).abs() < 1e-12);
        assert!((data.min.y_err[0] - 0.036).abs() < 1e-12);
        assert!(data.min.y_err.iter().all(|e| *e > 0.0));
    }

    #[test]
    fn displacement_rejects_wrong_column_count() {
        let text = "h\n0.0 1.0 0.5 -0.9 5.0\n";
        let err = parse_displacement(text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Line 2"), "{err}");
    }

    #[test]
    fn displacement_rejects_malformed_number() {
        let text = "h\n0.0 1.0 0.5 oops 5.0 4.0\n";
        let err = parse_displacement(text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("column 4"), "{err}");
    }

    #[test]
    fn displacement_requires_data_rows() {
        let err = parse_displacement("header only\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn blank_trailing_lines_are_tolerated() {
        let text = format!("{DISPLACEMENT}\n   \n");
        let data = parse_displacement(&text).unwrap();
        assert_eq!(data.rows_read, 3);
    }

    #[test]
    fn absolute_errors_are_linear_in_percentage() {
        let v = [2.0, -3.0, 0.5];
        let p = [4.0, 10.0, 1.0];
        let p2: Vec<f64> = p.iter().map(|x| 2.0 * x).collect();

        let one = absolute_errors(&v, &p);
        let two = absolute_errors(&v, &p2);
        for (a, b) in one.iter().zip(two.iter()) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
        // magnitudes, even for negative values
        assert!((one[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn scatter_splits_columns_into_series() {
        let text = "angle p1 p2 p3\n0.1 2.00 2.01 1.99\n0.2 2.02 2.03 2.01\n";
        let data = parse_scatter(text).unwrap();
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.x, vec![0.1, 0.2]);
        assert_eq!(data.series.len(), 3);
        assert_eq!(data.series[2], vec![1.99, 2.01]);
    }

    #[test]
    fn scatter_rejects_ragged_rows() {
        let text = "h\n0.1 2.0 2.1\n0.2 2.0\n";
        let err = parse_scatter(text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Line 3"), "{err}");
    }

    #[test]
    fn scatter_needs_at_least_one_series() {
        let text = "h\n0.1\n0.2\n";
        let err = parse_scatter(text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
