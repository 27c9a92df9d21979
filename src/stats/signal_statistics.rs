//! Moment statistics of a single real-valued series
//!
//! Population moments throughout. With zero spread the standardized moments
//! (skewness, kurtosis) are undefined and reported as NaN.

use serde::Serialize;

use super::{mean_and_spread, median_of_sorted, StatsError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    pub variance: f64,
    /// Mean of squares
    pub power: f64,
    pub peak_to_peak: f64,
    pub mean_abs_deviation: f64,
    pub skewness: f64,
    /// Excess kurtosis, 0 for a normal distribution
    pub kurtosis: f64,
    /// Peak absolute value over RMS
    pub crest_factor: f64,
    pub zero_crossings: usize,
    /// Zero crossings per adjacent sample pair
    pub zero_crossing_rate: f64,
}

impl SignalStatistics {
    /// Compute statistics over the finite samples of `values`
    ///
    /// # Errors
    /// * `Empty` - no finite sample
    ///
    /// # Example
    /// ```
    /// use rustypnm::stats::SignalStatistics;
    ///
    /// let stats = SignalStatistics::compute(&[1.0, -1.0, 1.0, -1.0])?;
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.zero_crossings, 3);
    /// # Ok::<(), rustypnm::stats::StatsError>(())
    /// ```
    pub fn compute(values: &[f64]) -> Result<Self, StatsError> {
        let samples: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if samples.is_empty() {
            return Err(StatsError::Empty);
        }

        let n = samples.len() as f64;
        let (mean, std) = mean_and_spread(&samples);

        let (mut m2, mut m3, mut m4, mut abs_dev) = (0.0, 0.0, 0.0, 0.0);
        for &x in &samples {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
            abs_dev += d.abs();
        }

        let (variance, skewness, kurtosis) = if std == 0.0 {
            (0.0, f64::NAN, f64::NAN)
        } else {
            let variance = m2 / n;
            (variance, (m3 / n) / (variance * std), (m4 / n) / (variance * variance) - 3.0)
        };

        let power = samples.iter().map(|x| x * x).sum::<f64>() / n;
        let rms = power.sqrt();
        let peak = samples.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        let crest_factor = if rms == 0.0 { f64::NAN } else { peak / rms };

        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);
        let peak_to_peak = sorted[sorted.len() - 1] - sorted[0];

        let zero_crossings = samples
            .windows(2)
            .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
            .count();
        let zero_crossing_rate = if samples.len() < 2 {
            0.0
        } else {
            zero_crossings as f64 / (samples.len() - 1) as f64
        };

        Ok(Self {
            count: samples.len(),
            mean,
            median: median_of_sorted(&sorted),
            std,
            variance,
            power,
            peak_to_peak,
            mean_abs_deviation: abs_dev / n,
            skewness,
            kurtosis,
            crest_factor,
            zero_crossings,
            zero_crossing_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_basic_moments() {
        let stats = SignalStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert!(close(stats.mean, 5.0));
        assert!(close(stats.median, 4.5));
        assert!(close(stats.std, 2.0));
        assert!(close(stats.variance, 4.0));
        assert!(close(stats.power, 29.0));
        assert!(close(stats.peak_to_peak, 7.0));
        assert!(close(stats.mean_abs_deviation, 1.5));
        assert!(close(stats.crest_factor, 9.0 / 29f64.sqrt()));
        assert_eq!(stats.zero_crossings, 0);
    }

    #[test]
    fn test_symmetric_series_has_zero_skew() {
        let stats = SignalStatistics::compute(&[-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap();
        assert!(close(stats.skewness, 0.0));
        // Uniform-like spread is platykurtic
        assert!(stats.kurtosis < 0.0);
    }

    #[test]
    fn test_constant_series_has_nan_shape() {
        let stats = SignalStatistics::compute(&[3.0; 10]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
        assert!(close(stats.crest_factor, 1.0));
    }

    #[test]
    fn test_inexact_constant_series_has_nan_shape() {
        let stats = SignalStatistics::compute(&[0.1; 10]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.variance, 0.0);
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
    }

    #[test]
    fn test_all_zero_series() {
        let stats = SignalStatistics::compute(&[0.0; 4]).unwrap();
        assert!(stats.crest_factor.is_nan());
        assert_eq!(stats.zero_crossing_rate, 0.0);
    }

    #[test]
    fn test_zero_crossings() {
        let stats = SignalStatistics::compute(&[1.0, -1.0, -2.0, 3.0, 0.0, -1.0]).unwrap();
        // 1→-1, -2→3, 0→-1
        assert_eq!(stats.zero_crossings, 3);
        assert!(close(stats.zero_crossing_rate, 0.6));
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert_eq!(SignalStatistics::compute(&[]), Err(StatsError::Empty));
        assert_eq!(SignalStatistics::compute(&[f64::NAN, f64::INFINITY]), Err(StatsError::Empty));
        let stats = SignalStatistics::compute(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
    }
}
