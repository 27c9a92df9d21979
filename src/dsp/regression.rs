//! Ordinary least squares of `y` on `x`
//!
//! Pairs where either value is non-finite are dropped before fitting.

use serde::Serialize;

use super::{check_lengths, AnalysisError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub rmse: f64,
    /// Number of finite pairs used in the fit
    pub n: usize,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub struct LinearRegression1D;

impl LinearRegression1D {
    /// Fit `y = slope·x + intercept`
    ///
    /// # Errors
    /// * `LengthMismatch` - `x` and `y` differ in length
    /// * `InsufficientData` - fewer than two finite pairs
    /// * `ZeroVariance` - all finite `x` values equal
    ///
    /// # Example
    /// ```
    /// use rustypnm::dsp::LinearRegression1D;
    ///
    /// let fit = LinearRegression1D::fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0])?;
    /// assert!((fit.slope - 2.0).abs() < 1e-12);
    /// assert!((fit.intercept - 1.0).abs() < 1e-12);
    /// # Ok::<(), rustypnm::dsp::AnalysisError>(())
    /// ```
    pub fn fit(x: &[f64], y: &[f64]) -> Result<RegressionResult, AnalysisError> {
        check_lengths("regression x/y", x.len(), y.len())?;

        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(&a, &b)| (a, b))
            .collect();
        if pairs.len() < 2 {
            return Err(AnalysisError::InsufficientData { needed: 2, actual: pairs.len() });
        }

        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for &(a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        let (min_x, max_x) = pairs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
        if !(max_x > min_x) || sxx <= 0.0 {
            return Err(AnalysisError::ZeroVariance);
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = pairs
            .iter()
            .map(|&(a, b)| (b - (slope * a + intercept)).powi(2))
            .sum();
        let tiny = f64::EPSILON * (1.0 + syy);
        let r_squared = if ss_res <= tiny {
            1.0
        } else if syy <= tiny {
            0.0
        } else {
            1.0 - ss_res / syy
        };

        Ok(RegressionResult { slope, intercept, r_squared, rmse: (ss_res / n).sqrt(), n: pairs.len() })
    }
}
