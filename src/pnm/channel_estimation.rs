//! OFDM Downstream Channel Estimation Coefficients (`PNN2`)
//!
//! Same body as RxMER, but the payload is one complex s2.13 coefficient per
//! subcarrier (2 bytes real, 2 bytes imaginary).

use num::complex::Complex64;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::dsp::{AnalysisError, GroupDelay, GroupDelayConfig, GroupDelayResult, MagnitudeMetrics};
use crate::echo::{EchoReport, IfftEchoConfig, IfftEchoDetector, PhaseSlopeConfig, PhaseSlopeEchoDetector, PhaseSlopeEstimate};
use crate::fixed_point::FixedPointFormat;

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;
use super::subcarrier::SubcarrierLayout;

pub const CHANNEL_ESTIMATION_FORMAT: FixedPointFormat = FixedPointFormat::signed(2, 13);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelEstimation {
    pub header: PnmHeader,
    pub channel_id: u8,
    pub mac_address: MacAddress,
    pub layout: SubcarrierLayout,
    pub data_length: u32,
    pub coefficients: Vec<Complex64>,
}

impl ChannelEstimation {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::ChannelEstimationCoefficient)?;

        let channel_id = reader.read_u8("channel_id")?;
        let mac_address = reader.read_mac("mac_address")?;
        let layout = SubcarrierLayout::read(&mut reader)?;
        let coefficients = reader.read_complex_payload("data_length", CHANNEL_ESTIMATION_FORMAT)?;
        reader.finish("data_length")?;

        debug!(channel_id, mac = %mac_address, coefficients = coefficients.len(), "decoded channel estimation");

        Ok(Self {
            header,
            channel_id,
            mac_address,
            layout,
            data_length: (coefficients.len() * 4) as u32,
            coefficients,
        })
    }

    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.layout.frequencies_hz(self.coefficients.len())
    }

    pub fn occupied_bandwidth_hz(&self) -> f64 {
        self.layout.occupied_bandwidth_hz(self.coefficients.len())
    }

    /// Coefficient magnitude in dB (`20·log10|H|`)
    pub fn magnitudes_db(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .map(|h| crate::dsp::db::amplitude_to_db(h.norm(), 1.0))
            .collect()
    }

    /// Wrapped phase in radians
    pub fn phases_rad(&self) -> Vec<f64> {
        self.coefficients.iter().map(|h| h.arg()).collect()
    }

    pub fn group_delay(&self, config: GroupDelayConfig) -> Result<GroupDelayResult, AnalysisError> {
        GroupDelay::new(config).compute(&self.frequencies_hz(), &self.coefficients, None)
    }

    /// Tilt and ripple of the magnitude response
    pub fn magnitude_metrics(&self) -> Result<MagnitudeMetrics, AnalysisError> {
        MagnitudeMetrics::compute(&self.frequencies_hz(), &self.magnitudes_db())
    }

    /// Echoes in the impulse response of the estimated channel
    pub fn echo_report(&self, config: IfftEchoConfig) -> Result<EchoReport, AnalysisError> {
        IfftEchoDetector::new(config).detect_multiple(&self.coefficients, self.layout.subcarrier_spacing_hz as f64)
    }

    pub fn phase_slope_delay(&self, config: PhaseSlopeConfig) -> Result<PhaseSlopeEstimate, AnalysisError> {
        PhaseSlopeEchoDetector::new(config).detect(&self.frequencies_hz(), &self.coefficients)
    }
}
