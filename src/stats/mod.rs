//! Statistics Engine
//!
//! Aggregates decoded measurement arrays:
//! - `min_avg_max` - per-subcarrier min/avg/max across several captures
//! - `signal_statistics` - moment statistics of a single series
//!
//! Non-finite samples are skipped everywhere; shape problems are errors.

pub mod min_avg_max;
pub mod signal_statistics;

use serde::Serialize;
use snafu::Snafu;

pub use min_avg_max::{MinAvgMax, MinAvgMaxComplex};
pub use signal_statistics::SignalStatistics;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum StatsError {
    /// No rows, no columns, or no finite sample
    #[snafu(display("statistics input is empty"))]
    Empty,

    /// Matrix rows of different lengths
    #[snafu(display("row {row} has {actual} columns, expected {expected}"))]
    Ragged { row: usize, expected: usize, actual: usize },

    /// Rounding precision too large to represent
    #[snafu(display("precision {precision} exceeds the supported 15 decimals"))]
    InvalidPrecision { precision: u32 },
}

/// Check that `rows` is a non-empty M×N matrix and return N
pub(crate) fn matrix_width<T, R: AsRef<[T]>>(rows: &[R]) -> Result<usize, StatsError> {
    let width = rows.first().map(|r| r.as_ref().len()).ok_or(StatsError::Empty)?;
    if width == 0 {
        return Err(StatsError::Empty);
    }
    for (row, values) in rows.iter().enumerate() {
        let actual = values.as_ref().len();
        if actual != width {
            return Err(StatsError::Ragged { row, expected: width, actual });
        }
    }
    Ok(width)
}

/// Population mean and std of finite `samples`, treating rounding-level spread as zero
///
/// A series whose values are all equal has std exactly 0. Otherwise a std
/// within a few ulps of the largest magnitude is summation noise and is also
/// reported as 0.
pub(crate) fn mean_and_spread(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let (lo, hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !(hi > lo) {
        return (mean, 0.0);
    }
    let std = (samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let scale = lo.abs().max(hi.abs());
    if std <= 4.0 * f64::EPSILON * scale {
        return (mean, 0.0);
    }
    (mean, std)
}

/// Round to `precision` decimals, leaving non-finite values untouched
pub(crate) fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// Min, max, mean, median and population std of one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

impl SeriesSummary {
    /// Summarize the finite values of `values`
    pub fn compute(values: &[f64]) -> Result<Self, StatsError> {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(StatsError::Empty);
        }
        finite.sort_by(f64::total_cmp);

        let (mean, std) = mean_and_spread(&finite);

        Ok(Self { min: finite[0], max: finite[finite.len() - 1], mean, median: median_of_sorted(&finite), std })
    }
}

pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
