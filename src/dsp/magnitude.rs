//! Slope and ripple of a magnitude response
//!
//! Fits magnitude (dB) against frequency (MHz) and measures what is left
//! around the fitted line.

use serde::Serialize;

use super::regression::LinearRegression1D;
use super::{check_lengths, AnalysisError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnitudeMetrics {
    /// Tilt of the response in dB per MHz
    pub slope_db_per_mhz: f64,
    pub intercept_db: f64,
    pub r_squared: f64,
    /// RMS of the residuals around the fit
    pub ripple_rms_db: f64,
    /// Peak-to-peak spread of the residuals around the fit
    pub ripple_peak_to_peak_db: f64,
}

impl MagnitudeMetrics {
    pub fn compute(frequency_hz: &[f64], magnitude_db: &[f64]) -> Result<Self, AnalysisError> {
        check_lengths("magnitude frequency/values", frequency_hz.len(), magnitude_db.len())?;
        let mhz: Vec<f64> = frequency_hz.iter().map(|f| f / 1e6).collect();
        let fit = LinearRegression1D::fit(&mhz, magnitude_db)?;

        let residuals: Vec<f64> = mhz
            .iter()
            .zip(magnitude_db)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| y - fit.predict(x))
            .collect();
        let (lo, hi) = residuals
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| (lo.min(r), hi.max(r)));

        Ok(Self {
            slope_db_per_mhz: fit.slope,
            intercept_db: fit.intercept,
            r_squared: fit.r_squared,
            ripple_rms_db: fit.rmse,
            ripple_peak_to_peak_db: hi - lo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilt_with_ripple() {
        let freqs: Vec<f64> = (0..200).map(|i| 300e6 + i as f64 * 1e6).collect();
        // -0.02 dB/MHz tilt plus a ±0.5 dB square ripple
        let mags: Vec<f64> = freqs
            .iter()
            .enumerate()
            .map(|(i, f)| -0.02 * f / 1e6 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();

        let metrics = MagnitudeMetrics::compute(&freqs, &mags).unwrap();
        assert!((metrics.slope_db_per_mhz + 0.02).abs() < 1e-4);
        assert!((metrics.ripple_rms_db - 0.5).abs() < 1e-3);
        assert!((metrics.ripple_peak_to_peak_db - 1.0).abs() < 2e-2);
    }

    #[test]
    fn test_flat_response() {
        let metrics = MagnitudeMetrics::compute(&[1e6, 2e6, 3e6], &[-3.0, -3.0, -3.0]).unwrap();
        assert_eq!(metrics.slope_db_per_mhz, 0.0);
        assert_eq!(metrics.ripple_peak_to_peak_db, 0.0);
        assert_eq!(metrics.r_squared, 1.0);
    }
}
