//! IFFT echo detector
//!
//! **Algorithm**:
//! 1. Replace non-finite coefficients by zero, apply the configured window
//! 2. Zero-pad to `fft_size` and inverse FFT into an impulse response
//! 3. Pick the direct path (bin 0 or the strongest bin)
//! 4. Scan delays `1..=fft_size/2` after the direct path for local maxima above
//!    `threshold_fraction × direct amplitude`, skipping the guard region
//! 5. Keep the strongest peaks at least `min_separation_bins` apart
//!
//! The impulse response has `fft_size` bins spanning `1 / subcarrier_spacing`
//! seconds, so one bin is `1 / (fft_size × spacing)` seconds of round trip.

use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::{check_velocity_factor, one_way_distance_m, Echo, EchoReport, DEFAULT_VELOCITY_FACTOR};
use crate::dsp::fft::inverse_fft;
use crate::dsp::window::Window;
use crate::dsp::AnalysisError;

/// Ten feet, the conventional minimum reportable echo distance
pub const DEFAULT_GUARD_DISTANCE_M: f64 = 3.048;

/// How the direct-path bin is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectPath {
    /// Bin 0, valid when the response is referenced to the direct path
    #[default]
    BinZero,
    /// Largest-magnitude bin of the impulse response
    StrongestPeak,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IfftEchoConfig {
    pub velocity_factor: f64,
    /// IFFT length, `None` for the next power of two of the response length
    pub fft_size: Option<usize>,
    pub window: Window,
    /// Minimum echo amplitude as a fraction of the direct path
    pub threshold_fraction: f64,
    /// Echoes closer than this one-way distance are ignored
    pub guard_distance_m: f64,
    /// Minimum spacing between two reported echoes
    pub min_separation_bins: usize,
    pub max_echoes: usize,
    pub direct_path: DirectPath,
}

impl Default for IfftEchoConfig {
    fn default() -> Self {
        Self {
            velocity_factor: DEFAULT_VELOCITY_FACTOR,
            fft_size: None,
            window: Window::Hann,
            threshold_fraction: 0.1,
            guard_distance_m: DEFAULT_GUARD_DISTANCE_M,
            min_separation_bins: 2,
            max_echoes: 5,
            direct_path: DirectPath::BinZero,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IfftEchoDetector {
    config: IfftEchoConfig,
}

impl IfftEchoDetector {
    pub fn new(config: IfftEchoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IfftEchoConfig {
        &self.config
    }

    /// Strongest echo in `response`
    ///
    /// # Errors
    /// Same as [`detect_multiple`](Self::detect_multiple).
    pub fn detect(&self, response: &[Complex64], subcarrier_spacing_hz: f64) -> Result<Echo, AnalysisError> {
        let report = self.analyze(response, subcarrier_spacing_hz, 1)?;
        report
            .echoes
            .into_iter()
            .next()
            .ok_or(AnalysisError::NoEchoFound { threshold: self.config.threshold_fraction })
    }

    /// Up to `max_echoes` echoes, ordered by delay
    ///
    /// # Arguments
    /// * `response` - complex frequency response, one value per subcarrier
    /// * `subcarrier_spacing_hz` - frequency step between consecutive values
    ///
    /// # Errors
    /// * `InsufficientData` - fewer than two coefficients
    /// * `InvalidParameter` - bad spacing, FFT size, threshold or velocity factor
    /// * `NoEchoFound` - no bin outside the guard region clears the threshold
    pub fn detect_multiple(
        &self,
        response: &[Complex64],
        subcarrier_spacing_hz: f64,
    ) -> Result<EchoReport, AnalysisError> {
        self.analyze(response, subcarrier_spacing_hz, self.config.max_echoes)
    }

    #[instrument(skip(self, response), fields(bins = response.len()))]
    fn analyze(
        &self,
        response: &[Complex64],
        subcarrier_spacing_hz: f64,
        max_echoes: usize,
    ) -> Result<EchoReport, AnalysisError> {
        let config = &self.config;
        self.validate(response, subcarrier_spacing_hz)?;

        let fft_size = config.fft_size.unwrap_or_else(|| response.len().next_power_of_two());
        let sample_rate_hz = fft_size as f64 * subcarrier_spacing_hz;

        let window = config.window.coefficients(response.len());
        let mut spectrum: Vec<Complex64> = response
            .iter()
            .zip(&window)
            .map(|(h, &w)| if h.is_finite() { *h * w } else { Complex64::new(0.0, 0.0) })
            .collect();
        spectrum.resize(fft_size, Complex64::new(0.0, 0.0));

        let impulse_magnitude: Vec<f64> = inverse_fft(&spectrum).iter().map(|t| t.norm()).collect();

        let direct_path_bin = match config.direct_path {
            DirectPath::BinZero => 0,
            DirectPath::StrongestPeak => impulse_magnitude
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap_or(0),
        };
        let direct_path_amplitude = impulse_magnitude[direct_path_bin];
        if !(direct_path_amplitude > 0.0) {
            return Err(AnalysisError::NoEchoFound { threshold: config.threshold_fraction });
        }
        let threshold = config.threshold_fraction * direct_path_amplitude;

        let bin_time_s = 1.0 / sample_rate_hz;
        let at = |delay: usize| impulse_magnitude[(direct_path_bin + delay) % fft_size];

        let mut candidates: Vec<Echo> = (1..=fft_size / 2)
            .filter(|&delay| one_way_distance_m(delay as f64 * bin_time_s, config.velocity_factor) >= config.guard_distance_m)
            .filter(|&delay| {
                let amplitude = at(delay);
                amplitude > threshold && amplitude >= at(delay - 1) && amplitude >= at(delay + 1)
            })
            .map(|delay| {
                let round_trip_time_s = delay as f64 * bin_time_s;
                let amplitude = at(delay);
                Echo {
                    bin_index: (direct_path_bin + delay) % fft_size,
                    delay_bins: delay,
                    round_trip_time_s,
                    one_way_distance_m: one_way_distance_m(round_trip_time_s, config.velocity_factor),
                    amplitude,
                    amplitude_ratio: amplitude / direct_path_amplitude,
                }
            })
            .collect();
        trace!(candidates = candidates.len(), threshold, "impulse peaks above threshold");

        candidates.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
        let mut echoes: Vec<Echo> = Vec::new();
        for candidate in candidates {
            if echoes.len() >= max_echoes {
                break;
            }
            let separated = echoes
                .iter()
                .all(|e| e.delay_bins.abs_diff(candidate.delay_bins) >= config.min_separation_bins);
            if separated {
                echoes.push(candidate);
            }
        }
        if echoes.is_empty() {
            return Err(AnalysisError::NoEchoFound { threshold: config.threshold_fraction });
        }

        // The strongest echo stays first for `detect`, multi-echo reports read by delay
        if max_echoes > 1 {
            echoes.sort_by_key(|e| e.delay_bins);
        }

        debug!(
            fft_size,
            direct_path_bin,
            echoes = echoes.len(),
            nearest_m = echoes.first().map(|e| e.one_way_distance_m),
            "echo detection"
        );

        Ok(EchoReport {
            fft_size,
            sample_rate_hz,
            velocity_factor: config.velocity_factor,
            direct_path_bin,
            direct_path_amplitude,
            echoes,
            impulse_magnitude,
        })
    }

    fn validate(&self, response: &[Complex64], subcarrier_spacing_hz: f64) -> Result<(), AnalysisError> {
        let config = &self.config;
        if response.len() < 2 {
            return Err(AnalysisError::InsufficientData { needed: 2, actual: response.len() });
        }
        if !(subcarrier_spacing_hz > 0.0 && subcarrier_spacing_hz.is_finite()) {
            return Err(AnalysisError::InvalidParameter {
                name: "subcarrier_spacing_hz",
                reason: format!("{subcarrier_spacing_hz} is not a positive frequency"),
            });
        }
        if let Some(size) = config.fft_size {
            if size < response.len() {
                return Err(AnalysisError::InvalidParameter {
                    name: "fft_size",
                    reason: format!("{size} is shorter than the {}-bin response", response.len()),
                });
            }
        }
        if !(config.threshold_fraction > 0.0 && config.threshold_fraction <= 1.0) {
            return Err(AnalysisError::InvalidParameter {
                name: "threshold_fraction",
                reason: format!("{} is outside (0, 1]", config.threshold_fraction),
            });
        }
        check_velocity_factor(config.velocity_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    const SPACING: f64 = 50e3;

    /// `H[k] = 1 + a·exp(-j2πkd/N)`: direct path at bin 0, echo `a` at bin `d`
    fn two_path(n: usize, echoes: &[(usize, f64)]) -> Vec<Complex64> {
        (0..n)
            .map(|k| {
                echoes.iter().fold(Complex64::new(1.0, 0.0), |acc, &(d, a)| {
                    acc + Complex64::from_polar(a, -TAU * (k * d) as f64 / n as f64)
                })
            })
            .collect()
    }

    fn rectangular() -> IfftEchoConfig {
        IfftEchoConfig { window: Window::Rectangular, ..IfftEchoConfig::default() }
    }

    #[test]
    fn test_single_echo_rectangular() {
        let response = two_path(1024, &[(40, 0.3)]);
        let echo = IfftEchoDetector::new(rectangular()).detect(&response, SPACING).unwrap();

        assert_eq!(echo.bin_index, 40);
        assert!((echo.amplitude_ratio - 0.3).abs() < 1e-9);
        let expected_time = 40.0 / (1024.0 * SPACING);
        assert!((echo.round_trip_time_s - expected_time).abs() < 1e-15);
        assert!((echo.one_way_distance_m - one_way_distance_m(expected_time, 0.87)).abs() < 1e-9);
    }

    #[test]
    fn test_single_echo_hann() {
        let response = two_path(1024, &[(60, 0.25)]);
        let echo = IfftEchoDetector::default().detect(&response, SPACING).unwrap();
        assert!(echo.bin_index.abs_diff(60) <= 1);
        assert!((echo.amplitude_ratio - 0.25).abs() < 0.02);
    }

    #[test]
    fn test_multiple_echoes_sorted_by_delay() {
        let response = two_path(512, &[(100, 0.2), (30, 0.4), (31, 0.05)]);
        let report = IfftEchoDetector::new(rectangular()).detect_multiple(&response, SPACING).unwrap();

        let bins: Vec<usize> = report.echoes.iter().map(|e| e.bin_index).collect();
        assert_eq!(bins, vec![30, 100]);
        assert_eq!(report.strongest().map(|e| e.bin_index), Some(30));
        assert_eq!(report.fft_size, 512);
        assert_eq!(report.impulse_magnitude.len(), 512);
    }

    #[test]
    fn test_max_echoes_limits_report() {
        let response = two_path(512, &[(20, 0.5), (60, 0.4), (100, 0.3)]);
        let config = IfftEchoConfig { max_echoes: 2, ..rectangular() };
        let report = IfftEchoDetector::new(config).detect_multiple(&response, SPACING).unwrap();
        let bins: Vec<usize> = report.echoes.iter().map(|e| e.bin_index).collect();
        assert_eq!(bins, vec![20, 60]);
    }

    #[test]
    fn test_guard_region_hides_near_echo() {
        // 2 bins at 4096 × 50 kHz is ~1.3 m one way
        let response = two_path(4096, &[(2, 0.5)]);
        let err = IfftEchoDetector::new(rectangular()).detect(&response, SPACING).unwrap_err();
        assert_eq!(err, AnalysisError::NoEchoFound { threshold: 0.1 });
    }

    #[test]
    fn test_below_threshold() {
        let response = two_path(256, &[(50, 0.05)]);
        assert!(matches!(
            IfftEchoDetector::new(rectangular()).detect(&response, SPACING),
            Err(AnalysisError::NoEchoFound { .. })
        ));
    }

    #[test]
    fn test_strongest_peak_direct_path() {
        // Direct path delayed to bin 10, echo 50 bins later
        let n = 300;
        let response: Vec<Complex64> = two_path(n, &[(50, 0.3)])
            .iter()
            .enumerate()
            .map(|(k, h)| h * Complex64::from_polar(1.0, -TAU * (k * 10) as f64 / n as f64))
            .collect();
        let config = IfftEchoConfig {
            fft_size: Some(n),
            direct_path: DirectPath::StrongestPeak,
            ..rectangular()
        };
        let report = IfftEchoDetector::new(config).detect_multiple(&response, SPACING).unwrap();
        assert_eq!(report.direct_path_bin, 10);
        assert_eq!(report.echoes.len(), 1);
        assert_eq!(report.echoes[0].bin_index, 60);
        assert_eq!(report.echoes[0].delay_bins, 50);
    }

    #[test]
    fn test_zero_padding_scales_bins() {
        // Padding 256 bins to 1024 stretches delay 40 to bin 160
        let response = two_path(256, &[(40, 0.3)]);
        let config = IfftEchoConfig { fft_size: Some(1024), ..IfftEchoConfig::default() };
        let echo = IfftEchoDetector::new(config).detect(&response, SPACING).unwrap();
        assert!(echo.bin_index.abs_diff(160) <= 1);
        assert!((echo.amplitude_ratio - 0.3).abs() < 0.02);

        let default_size = IfftEchoDetector::default().detect_multiple(&two_path(300, &[(40, 0.3)]), SPACING);
        assert_eq!(default_size.map(|r| r.fft_size).ok(), Some(512));
    }

    #[test]
    fn test_invalid_parameters() {
        let response = two_path(64, &[(10, 0.5)]);
        let detector = IfftEchoDetector::default();
        assert!(detector.detect(&response, 0.0).is_err());
        assert!(matches!(
            detector.detect(&response[..1], SPACING),
            Err(AnalysisError::InsufficientData { .. })
        ));

        let small_fft = IfftEchoDetector::new(IfftEchoConfig { fft_size: Some(32), ..IfftEchoConfig::default() });
        assert!(matches!(
            small_fft.detect(&response, SPACING),
            Err(AnalysisError::InvalidParameter { name: "fft_size", .. })
        ));
    }
}
