//! Echo (Micro-Reflection) Detection
//!
//! Two estimators of reflections in a channel's complex frequency response:
//! - `phase_slope` - a single dominant delay from the slope of the unwrapped phase
//! - `ifft` - impulse response peaks after an inverse FFT, one or many echoes
//!
//! Distances are one-way: a reflection travels to the impedance mismatch and
//! back, so `distance = τ/2 · c · velocity_factor`.

pub mod ifft;
pub mod phase_slope;

use serde::{Deserialize, Serialize};

use crate::dsp::{AnalysisError, SPEED_OF_LIGHT};

pub use ifft::{DirectPath, IfftEchoConfig, IfftEchoDetector};
pub use phase_slope::{PhaseSlopeConfig, PhaseSlopeEchoDetector, PhaseSlopeEstimate};

/// Typical velocity factor of hardline and drop coax
pub const DEFAULT_VELOCITY_FACTOR: f64 = 0.87;

/// One reflection found in the impulse response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    /// Absolute impulse-response bin
    pub bin_index: usize,
    /// Bins after the direct path
    pub delay_bins: usize,
    pub round_trip_time_s: f64,
    pub one_way_distance_m: f64,
    pub amplitude: f64,
    /// Amplitude relative to the direct path
    pub amplitude_ratio: f64,
}

/// Multi-echo result of [`IfftEchoDetector::detect_multiple`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoReport {
    pub fft_size: usize,
    pub sample_rate_hz: f64,
    pub velocity_factor: f64,
    pub direct_path_bin: usize,
    pub direct_path_amplitude: f64,
    /// Echoes ordered by delay
    pub echoes: Vec<Echo>,
    /// Impulse response magnitude per bin
    pub impulse_magnitude: Vec<f64>,
}

impl EchoReport {
    pub fn strongest(&self) -> Option<&Echo> {
        self.echoes.iter().max_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
    }
}

/// One-way distance travelled during half of `round_trip_time_s`
pub fn one_way_distance_m(round_trip_time_s: f64, velocity_factor: f64) -> f64 {
    round_trip_time_s / 2.0 * SPEED_OF_LIGHT * velocity_factor
}

pub(crate) fn check_velocity_factor(velocity_factor: f64) -> Result<(), AnalysisError> {
    if !(velocity_factor > 0.0 && velocity_factor <= 1.0) {
        return Err(AnalysisError::InvalidParameter {
            name: "velocity_factor",
            reason: format!("{velocity_factor} is outside (0, 1]"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_distance() {
        // 1 µs round trip at vf 1.0 is ~150 m
        assert!((one_way_distance_m(1e-6, 1.0) - 149.896_229).abs() < 1e-6);
        assert!((one_way_distance_m(1e-6, 0.87) - 130.409_719_23).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_factor_range() {
        assert!(check_velocity_factor(0.87).is_ok());
        assert!(check_velocity_factor(1.0).is_ok());
        assert!(check_velocity_factor(0.0).is_err());
        assert!(check_velocity_factor(1.5).is_err());
        assert!(check_velocity_factor(f64::NAN).is_err());
    }
}
