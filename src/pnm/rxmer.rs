//! RxMER Per Subcarrier (`PNN4`)
//!
//! Body layout after the common header:
//! `channel_id(1) | mac(6) | subcarrier_zero_freq(4) | first_active_index(2) |
//! spacing_khz(1) | data_length(4) | data`
//!
//! Each data byte is one subcarrier in quarter-dB steps. `0xFF` marks an
//! excluded subcarrier and decodes to the clamp ceiling.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::dsp::shannon::ModulationProfile;
use crate::dsp::AnalysisError;

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;
use super::subcarrier::SubcarrierLayout;

/// Largest reportable MER in dB
pub const RXMER_CEILING_DB: f64 = 63.5;

/// Raw value used for excluded or inactive subcarriers
pub const RXMER_EXCLUDED: u8 = 0xFF;

/// Convert one quarter-dB byte to MER in dB
pub fn rxmer_db(raw: u8) -> f64 {
    (raw as f64 / 4.0).clamp(0.0, RXMER_CEILING_DB)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RxMer {
    pub header: PnmHeader,
    pub channel_id: u8,
    pub mac_address: MacAddress,
    pub layout: SubcarrierLayout,
    pub data_length: u32,
    /// MER per subcarrier in dB
    pub values: Vec<f64>,
    /// Subcarriers reported as `0xFF`
    pub excluded: Vec<bool>,
}

impl RxMer {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::RxMerPerSubcarrier)?;

        let channel_id = reader.read_u8("channel_id")?;
        let mac_address = reader.read_mac("mac_address")?;
        let layout = SubcarrierLayout::read(&mut reader)?;
        let data = reader.read_length_prefixed("data_length")?;
        reader.finish("data_length")?;

        let values = data.iter().map(|&raw| rxmer_db(raw)).collect();
        let excluded = data.iter().map(|&raw| raw == RXMER_EXCLUDED).collect();

        debug!(
            channel_id,
            mac = %mac_address,
            subcarriers = data.len(),
            spacing_hz = layout.subcarrier_spacing_hz,
            "decoded RxMER capture"
        );

        Ok(Self {
            header,
            channel_id,
            mac_address,
            layout,
            data_length: data.len() as u32,
            values,
            excluded,
        })
    }

    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.layout.frequencies_hz(self.values.len())
    }

    pub fn occupied_bandwidth_hz(&self) -> f64 {
        self.layout.occupied_bandwidth_hz(self.values.len())
    }

    /// `(frequency_hz, mer_db)` for every subcarrier not marked excluded
    pub fn active_values(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .zip(&self.excluded)
            .enumerate()
            .filter(|(_, (_, &excluded))| !excluded)
            .map(|(i, (&mer, _))| (self.layout.frequency_hz(i), mer))
            .collect()
    }

    /// Shannon bit loading per subcarrier; excluded subcarriers load zero bits
    pub fn modulation_profile(&self) -> Result<ModulationProfile, AnalysisError> {
        let mer: Vec<f64> = self
            .values
            .iter()
            .zip(&self.excluded)
            .map(|(&v, &excluded)| if excluded { f64::NAN } else { v })
            .collect();
        ModulationProfile::from_mer(&self.frequencies_hz(), &mer)
    }
}
