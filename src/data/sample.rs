//! Synthetic lab data generation.
//!
//! Two generators, matching the two ingest formats:
//!
//! - displacement: peak amplitudes of a damped oscillation, logged as
//!   alternating max/min peaks with per-row error percentages
//! - scatter: pendulum period vs initial angle, several trials per angle
//!
//! Generation is deterministic for a given seed.

use std::fs;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Knobs for the synthetic generators.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Number of data rows to generate.
    pub points: usize,
    pub seed: u64,
    /// Initial peak amplitude of the damped oscillation.
    pub amplitude: f64,
    /// Decay time constant of the envelope.
    pub time_constant: f64,
    /// Rest offset the oscillation decays towards.
    pub offset: f64,
    /// Relative measurement noise (multiplicative).
    pub noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            points: 25,
            seed: 42,
            amplitude: 9.0,
            time_constant: 12.0,
            offset: 0.5,
            noise: 0.02,
        }
    }
}

fn validate(config: &SampleConfig) -> Result<(), AppError> {
    if config.points == 0 {
        return Err(AppError::new(2, "Sample point count must be > 0."));
    }
    if !(config.amplitude.is_finite()
        && config.time_constant.is_finite()
        && config.time_constant > 0.0
        && config.offset.is_finite()
        && config.noise.is_finite()
        && config.noise >= 0.0)
    {
        return Err(AppError::new(2, "Invalid sample generator settings."));
    }
    Ok(())
}

/// Generate the 6-column displacement file contents.
///
/// Max peaks land on whole periods, min peaks half a period later; both decay
/// along `A·e^(−t/τ) + offset` with multiplicative noise.
pub fn generate_displacement(config: &SampleConfig) -> Result<String, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(3, format!("Noise distribution error: {e}")))?;

    let period = 2.0;
    let mut out = String::from("max_time\tmax_disp\tmin_time\tmin_disp\tmax_err_pct\tmin_err_pct\n");

    for i in 0..config.points {
        let t_max = i as f64 * period;
        let t_min = t_max + period / 2.0;

        let envelope = |t: f64| config.amplitude * (-t / config.time_constant).exp() + config.offset;
        let y_max = envelope(t_max) * (1.0 + config.noise * normal.sample(&mut rng));
        let y_min = -envelope(t_min) * (1.0 + config.noise * normal.sample(&mut rng));

        let err_max: f64 = rng.gen_range(2.0..=6.0);
        let err_min: f64 = rng.gen_range(2.0..=6.0);

        out.push_str(&format!(
            "{t_max:.3}\t{y_max:.5}\t{t_min:.3}\t{y_min:.5}\t{err_max:.2}\t{err_min:.2}\n"
        ));
    }

    Ok(out)
}

/// Generate the scatter file contents: pendulum period vs initial angle,
/// three trial columns.
pub fn generate_scatter(config: &SampleConfig) -> Result<String, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(3, format!("Noise distribution error: {e}")))?;

    let base_period = 2.0;
    let trials = 3;
    let mut out = String::from("angle_rad\tperiod1_s\tperiod2_s\tperiod3_s\n");

    for i in 0..config.points {
        let u = if config.points > 1 {
            i as f64 / (config.points as f64 - 1.0)
        } else {
            0.0
        };
        let angle = 0.1 + 1.4 * u;
        // Small-angle correction: T ≈ T0·(1 + θ²/16).
        let expected = base_period * (1.0 + angle * angle / 16.0);

        out.push_str(&format!("{angle:.4}"));
        for _ in 0..trials {
            let period = expected * (1.0 + config.noise * normal.sample(&mut rng));
            out.push_str(&format!("\t{period:.5}"));
        }
        out.push('\n');
    }

    Ok(out)
}

/// Write both sample files to disk.
pub fn write_sample_files(
    displacement_path: &Path,
    scatter_path: &Path,
    config: &SampleConfig,
) -> Result<(), AppError> {
    let displacement = generate_displacement(config)?;
    fs::write(displacement_path, displacement).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to write '{}': {e}", displacement_path.display()),
        )
    })?;

    let scatter = generate_scatter(config)?;
    fs::write(scatter_path, scatter)
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", scatter_path.display())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::{parse_displacement, parse_scatter};

    #[test]
    fn generation_is_deterministic_per_seed() {
        let config = SampleConfig::default();
        assert_eq!(
            generate_displacement(&config).unwrap(),
            generate_displacement(&config).unwrap()
        );

        let other = SampleConfig {
            seed: 43,
            ..SampleConfig::default()
        };
        assert_ne!(
            generate_displacement(&config).unwrap(),
            generate_displacement(&other).unwrap()
        );
    }

    #[test]
    fn generated_displacement_parses_cleanly() {
        let text = generate_displacement(&SampleConfig::default()).unwrap();
        let data = parse_displacement(&text).unwrap();
        assert_eq!(data.rows_read, 25);
        assert!(data.max.y.iter().all(|y| *y > 0.0));
        assert!(data.min.y.iter().all(|y| *y < 0.0));
        assert!(data.max.y_err.iter().all(|e| *e > 0.0));
    }

    #[test]
    fn generated_scatter_parses_cleanly() {
        let text = generate_scatter(&SampleConfig::default()).unwrap();
        let data = parse_scatter(&text).unwrap();
        assert_eq!(data.rows_read, 25);
        assert_eq!(data.series.len(), 3);
    }

    #[test]
    fn zero_points_is_a_config_error() {
        let config = SampleConfig {
            points: 0,
            ..SampleConfig::default()
        };
        assert_eq!(generate_displacement(&config).unwrap_err().exit_code(), 2);
    }
}
