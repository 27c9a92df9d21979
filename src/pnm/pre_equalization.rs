//! Upstream OFDMA Pre-Equalization (`PNN6`, `PNN7`)
//!
//! Body layout after the common header:
//! `channel_id(1) | cm_mac(6) | cmts_mac(6) | subcarrier_zero_freq(4) |
//! first_active_index(2) | spacing_khz(1) | data_length(4) | data`
//!
//! Coefficients are complex s1.14. `PNN7` carries the coefficients of the last
//! pre-equalization update with the identical layout.

use num::complex::Complex64;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::dsp::pre_eq::TapMetrics;
use crate::dsp::AnalysisError;
use crate::fixed_point::FixedPointFormat;

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;
use super::subcarrier::SubcarrierLayout;

pub const PRE_EQUALIZATION_FORMAT: FixedPointFormat = FixedPointFormat::signed(1, 14);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPreEqualization {
    pub header: PnmHeader,
    pub channel_id: u8,
    pub cm_mac_address: MacAddress,
    pub cmts_mac_address: MacAddress,
    pub layout: SubcarrierLayout,
    pub data_length: u32,
    pub coefficients: Vec<Complex64>,
}

impl UpstreamPreEqualization {
    /// Decode either pre-equalization flavour
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        if header.file_type != PnmFileType::UpstreamPreEqualizationLastUpdate {
            header.expect_type(PnmFileType::UpstreamPreEqualization)?;
        }

        let channel_id = reader.read_u8("channel_id")?;
        let cm_mac_address = reader.read_mac("cm_mac_address")?;
        let cmts_mac_address = reader.read_mac("cmts_mac_address")?;
        let layout = SubcarrierLayout::read(&mut reader)?;
        let coefficients = reader.read_complex_payload("data_length", PRE_EQUALIZATION_FORMAT)?;
        reader.finish("data_length")?;

        debug!(
            channel_id,
            cm_mac = %cm_mac_address,
            last_update = header.file_type == PnmFileType::UpstreamPreEqualizationLastUpdate,
            coefficients = coefficients.len(),
            "decoded upstream pre-equalization"
        );

        Ok(Self {
            header,
            channel_id,
            cm_mac_address,
            cmts_mac_address,
            layout,
            data_length: (coefficients.len() * 4) as u32,
            coefficients,
        })
    }

    pub fn is_last_update(&self) -> bool {
        self.header.file_type == PnmFileType::UpstreamPreEqualizationLastUpdate
    }

    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.layout.frequencies_hz(self.coefficients.len())
    }

    pub fn occupied_bandwidth_hz(&self) -> f64 {
        self.layout.occupied_bandwidth_hz(self.coefficients.len())
    }

    /// Time-domain tap energy breakdown of the coefficients
    pub fn tap_metrics(&self) -> Result<TapMetrics, AnalysisError> {
        TapMetrics::from_coefficients(&self.coefficients)
    }
}
