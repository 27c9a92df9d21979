//! Pre-Equalizer Tap Metrics
//!
//! Upstream pre-equalization coefficients are captured per subcarrier. Their
//! inverse FFT gives the equalizer's time-domain taps; a clean plant has almost
//! all energy in one main tap, and energy spread to neighbouring taps points at
//! micro-reflections.

use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::db::power_to_db;
use super::fft::inverse_fft;
use super::AnalysisError;

/// Energy distribution across pre-equalizer taps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapMetrics {
    /// Time-domain taps, `1/N`-normalized
    pub taps: Vec<Complex64>,
    /// Index of the largest-magnitude tap
    pub main_tap_index: usize,
    pub main_tap_energy: f64,
    pub pre_main_energy: f64,
    pub post_main_energy: f64,
    pub total_energy: f64,
    /// Main tap energy over all other taps, dB
    pub main_tap_ratio_db: f64,
    /// Non-main-tap energy over total energy (NMTER), dB
    pub nmter_db: f64,
}

impl TapMetrics {
    /// Transform frequency-domain coefficients into taps and measure them
    ///
    /// A single perfect tap yields `main_tap_ratio_db = +∞` and `nmter_db = -∞`.
    ///
    /// # Errors
    /// * `InsufficientData` - no coefficients
    /// * `InvalidParameter` - all-zero or non-finite coefficients
    pub fn from_coefficients(coefficients: &[Complex64]) -> Result<Self, AnalysisError> {
        if coefficients.is_empty() {
            return Err(AnalysisError::InsufficientData { needed: 1, actual: 0 });
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AnalysisError::InvalidParameter {
                name: "coefficients",
                reason: "non-finite coefficient".into(),
            });
        }

        let taps = inverse_fft(coefficients);
        Self::from_taps(taps)
    }

    /// Measure taps that are already in the time domain
    pub fn from_taps(taps: Vec<Complex64>) -> Result<Self, AnalysisError> {
        let energies: Vec<f64> = taps.iter().map(|t| t.norm_sqr()).collect();
        let total_energy: f64 = energies.iter().sum();
        if !(total_energy > 0.0) {
            return Err(AnalysisError::InvalidParameter {
                name: "coefficients",
                reason: "taps carry no energy".into(),
            });
        }

        let main_tap_index = energies
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let main_tap_energy = energies[main_tap_index];
        let pre_main_energy: f64 = energies[..main_tap_index].iter().sum();
        let post_main_energy: f64 = energies[main_tap_index + 1..].iter().sum();
        let other = pre_main_energy + post_main_energy;

        debug!(main_tap_index, total_energy, "pre-equalizer taps");

        Ok(Self {
            main_tap_index,
            main_tap_energy,
            pre_main_energy,
            post_main_energy,
            total_energy,
            main_tap_ratio_db: power_to_db(main_tap_energy / other, 1.0),
            nmter_db: power_to_db(other / total_energy, 1.0),
            taps,
        })
    }
}
