//! Per-subcarrier Min/Avg/Max across captures
//!
//! Input is an M×N matrix: M captures of the same channel, N subcarriers each.
//! A single series is treated as M = 1.

use num::complex::Complex64;
use serde::Serialize;

use super::{matrix_width, round_to, SeriesSummary, StatsError};

const MAX_PRECISION: u32 = 15;

fn check_precision(precision: u32) -> Result<(), StatsError> {
    if precision > MAX_PRECISION {
        return Err(StatsError::InvalidPrecision { precision });
    }
    Ok(())
}

/// Min, mean and max of the finite values yielded, NaN when there are none
fn column_min_avg_max(values: impl Iterator<Item = f64>) -> (f64, f64, f64) {
    let (mut min, mut max, mut sum, mut count) = (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize);
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }
    if count == 0 {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    // Rounding error in the sum must not push the mean outside [min, max]
    (min, (sum / count as f64).clamp(min, max), max)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinAvgMax {
    pub precision: u32,
    pub min_values: Vec<f64>,
    pub avg_values: Vec<f64>,
    pub max_values: Vec<f64>,
    pub min_summary: SeriesSummary,
    pub avg_summary: SeriesSummary,
    pub max_summary: SeriesSummary,
}

impl MinAvgMax {
    /// Column-wise min/avg/max of an M×N matrix, rounded to `precision` decimals
    ///
    /// # Errors
    /// * `Empty` - no rows, zero columns, or no finite value at all
    /// * `Ragged` - rows of different lengths
    pub fn new<R: AsRef<[f64]>>(rows: &[R], precision: u32) -> Result<Self, StatsError> {
        check_precision(precision)?;
        let width = matrix_width(rows)?;

        let mut min_values = Vec::with_capacity(width);
        let mut avg_values = Vec::with_capacity(width);
        let mut max_values = Vec::with_capacity(width);
        for col in 0..width {
            let (min, avg, max) = column_min_avg_max(rows.iter().map(|r| r.as_ref()[col]));
            min_values.push(round_to(min, precision));
            avg_values.push(round_to(avg, precision));
            max_values.push(round_to(max, precision));
        }

        Ok(Self {
            precision,
            min_summary: SeriesSummary::compute(&min_values)?,
            avg_summary: SeriesSummary::compute(&avg_values)?,
            max_summary: SeriesSummary::compute(&max_values)?,
            min_values,
            avg_values,
            max_values,
        })
    }

    /// A single capture, treated as a 1×N matrix
    pub fn from_series(values: &[f64], precision: u32) -> Result<Self, StatsError> {
        Self::new(&[values], precision)
    }

    pub fn len(&self) -> usize {
        self.avg_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avg_values.is_empty()
    }
}

/// Min/avg/max of one component of a complex matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentMinAvgMax {
    pub min_values: Vec<f64>,
    pub avg_values: Vec<f64>,
    pub max_values: Vec<f64>,
    pub avg_summary: SeriesSummary,
}

impl ComponentMinAvgMax {
    fn from_columns(min_values: Vec<f64>, avg_values: Vec<f64>, max_values: Vec<f64>) -> Result<Self, StatsError> {
        Ok(Self { avg_summary: SeriesSummary::compute(&avg_values)?, min_values, avg_values, max_values })
    }
}

/// Complex Min/Avg/Max with real, imaginary and magnitude tracked separately
///
/// The average magnitude is `|mean(z)|`, the magnitude of the averaged complex
/// value, so captures with rotating phase average toward zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinAvgMaxComplex {
    pub precision: u32,
    pub avg_complex: Vec<Complex64>,
    pub real: ComponentMinAvgMax,
    pub imag: ComponentMinAvgMax,
    pub magnitude: ComponentMinAvgMax,
}

impl MinAvgMaxComplex {
    pub fn new<R: AsRef<[Complex64]>>(rows: &[R], precision: u32) -> Result<Self, StatsError> {
        check_precision(precision)?;
        let width = matrix_width(rows)?;

        let mut avg_complex = Vec::with_capacity(width);
        let (mut re_min, mut re_avg, mut re_max) = (Vec::new(), Vec::new(), Vec::new());
        let (mut im_min, mut im_avg, mut im_max) = (Vec::new(), Vec::new(), Vec::new());
        let (mut mag_min, mut mag_avg, mut mag_max) = (Vec::new(), Vec::new(), Vec::new());

        for col in 0..width {
            let column: Vec<Complex64> = rows
                .iter()
                .map(|r| r.as_ref()[col])
                .filter(|z| z.re.is_finite() && z.im.is_finite())
                .collect();

            let (rmin, ravg, rmax) = column_min_avg_max(column.iter().map(|z| z.re));
            let (imin, iavg, imax) = column_min_avg_max(column.iter().map(|z| z.im));
            let (mmin, _, mmax) = column_min_avg_max(column.iter().map(|z| z.norm()));
            let mean = Complex64::new(ravg, iavg);

            re_min.push(round_to(rmin, precision));
            re_avg.push(round_to(ravg, precision));
            re_max.push(round_to(rmax, precision));
            im_min.push(round_to(imin, precision));
            im_avg.push(round_to(iavg, precision));
            im_max.push(round_to(imax, precision));
            mag_min.push(round_to(mmin, precision));
            mag_avg.push(round_to(mean.norm(), precision));
            mag_max.push(round_to(mmax, precision));
            avg_complex.push(Complex64::new(round_to(ravg, precision), round_to(iavg, precision)));
        }

        Ok(Self {
            precision,
            avg_complex,
            real: ComponentMinAvgMax::from_columns(re_min, re_avg, re_max)?,
            imag: ComponentMinAvgMax::from_columns(im_min, im_avg, im_max)?,
            magnitude: ComponentMinAvgMax::from_columns(mag_min, mag_avg, mag_max)?,
        })
    }

    pub fn from_series(values: &[Complex64], precision: u32) -> Result<Self, StatsError> {
        Self::new(&[values], precision)
    }
}
