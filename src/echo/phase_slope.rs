//! Phase-slope echo estimator
//!
//! A response dominated by a single delay `τ` has phase `φ(f) = -2π·f·τ + φ0`, so
//! the least-squares slope of the unwrapped phase over frequency gives
//! `τ = -slope / 2π`.

use std::f64::consts::TAU;

use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{check_velocity_factor, one_way_distance_m, DEFAULT_VELOCITY_FACTOR};
use crate::dsp::phase::unwrap;
use crate::dsp::{check_lengths, AnalysisError, LinearRegression1D, RegressionResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSlopeConfig {
    pub velocity_factor: f64,
}

impl Default for PhaseSlopeConfig {
    fn default() -> Self {
        Self { velocity_factor: DEFAULT_VELOCITY_FACTOR }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSlopeEstimate {
    pub round_trip_time_s: f64,
    pub one_way_distance_m: f64,
    /// Fit of unwrapped phase (rad) against frequency (Hz)
    pub regression: RegressionResult,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseSlopeEchoDetector {
    config: PhaseSlopeConfig,
}

impl PhaseSlopeEchoDetector {
    pub fn new(config: PhaseSlopeConfig) -> Self {
        Self { config }
    }

    /// Estimate the dominant delay of `response` sampled at `frequency_hz`
    ///
    /// Bins with a non-finite frequency or coefficient are skipped before the
    /// phase is unwrapped.
    ///
    /// # Errors
    /// * `InvalidParameter` - velocity factor outside `(0, 1]`
    /// * `LengthMismatch` - inputs of different lengths
    /// * `InsufficientData` / `ZeroVariance` - from the regression
    #[instrument(skip_all, fields(bins = response.len()))]
    pub fn detect(&self, frequency_hz: &[f64], response: &[Complex64]) -> Result<PhaseSlopeEstimate, AnalysisError> {
        check_velocity_factor(self.config.velocity_factor)?;
        check_lengths("phase slope frequency/response", frequency_hz.len(), response.len())?;

        let (freqs, phases): (Vec<f64>, Vec<f64>) = frequency_hz
            .iter()
            .zip(response)
            .filter(|(f, h)| f.is_finite() && h.is_finite())
            .map(|(&f, h)| (f, h.arg()))
            .unzip();

        let regression = LinearRegression1D::fit(&freqs, &unwrap(&phases))?;
        let round_trip_time_s = -regression.slope / TAU;
        let one_way_distance_m = one_way_distance_m(round_trip_time_s, self.config.velocity_factor);

        debug!(round_trip_time_s, one_way_distance_m, r_squared = regression.r_squared, "phase slope estimate");

        Ok(PhaseSlopeEstimate { round_trip_time_s, one_way_distance_m, regression })
    }
}
