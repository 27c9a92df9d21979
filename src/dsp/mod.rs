//! Signal-Processing Algorithms
//!
//! Numeric building blocks applied to decoded frequency-domain captures.
//!
//! **Module Organization**:
//! - `db` - dB ↔ linear conversion
//! - `regression` - ordinary least squares over finite pairs
//! - `phase` - phase wrapping and unwrapping
//! - `gradient` - central-difference derivative on a non-uniform axis
//! - `smoothing` - moving average with reflect or same padding
//! - `window` - FFT windows
//! - `fft` - normalized inverse FFT
//! - `group_delay` - `τ(f) = -(1/2π) dφ/df`
//! - `magnitude` - slope and ripple of a magnitude response
//! - `shannon` - SNR ↔ bit loading and modulation profiles
//! - `qam` - QAM orders and Gray-coded codeword lookup tables
//! - `pre_eq` - pre-equalizer tap energy metrics

pub mod db;
pub mod fft;
pub mod gradient;
pub mod group_delay;
pub mod magnitude;
pub mod phase;
pub mod pre_eq;
pub mod qam;
pub mod regression;
pub mod shannon;
pub mod smoothing;
pub mod window;

use snafu::Snafu;

use crate::stats::StatsError;

pub use group_delay::{GroupDelay, GroupDelayConfig, GroupDelayResult};
pub use magnitude::MagnitudeMetrics;
pub use pre_eq::TapMetrics;
pub use qam::{AxisOrder, CodeWordLut, QamModulation};
pub use regression::{LinearRegression1D, RegressionResult};
pub use shannon::ModulationProfile;
pub use window::Window;

/// Speed of light in vacuum, m/s
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AnalysisError {
    /// Too few usable points for the computation
    #[snafu(display("need at least {needed} finite points, got {actual}"))]
    InsufficientData { needed: usize, actual: usize },

    /// Regressor has no spread
    #[snafu(display("x values have zero variance"))]
    ZeroVariance,

    /// Paired inputs of different lengths
    #[snafu(display("{what}: lengths {left} and {right} differ"))]
    LengthMismatch { what: &'static str, left: usize, right: usize },

    /// No impulse-response bin cleared the echo threshold
    #[snafu(display("no echo above {threshold} of the direct path"))]
    NoEchoFound { threshold: f64 },

    /// Parameter outside its valid range
    #[snafu(display("invalid {name}: {reason}"))]
    InvalidParameter { name: &'static str, reason: String },

    /// Underlying statistics failed
    #[snafu(display("statistics failed: {source}"))]
    Stats { source: StatsError },
}

impl From<StatsError> for AnalysisError {
    fn from(source: StatsError) -> Self {
        AnalysisError::Stats { source }
    }
}

pub(crate) fn check_lengths(what: &'static str, left: usize, right: usize) -> Result<(), AnalysisError> {
    if left != right {
        return Err(AnalysisError::LengthMismatch { what, left, right });
    }
    Ok(())
}
