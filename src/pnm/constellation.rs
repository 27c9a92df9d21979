//! OFDM Downstream Constellation Display (`PNN3`)
//!
//! Body layout after the common header:
//! `channel_id(1) | mac(6) | modulation_bits(1) | num_sample_symbols(2) |
//! subcarrier_zero_freq(4) | first_active_index(2) | spacing_khz(1) |
//! data_length(4) | data`
//!
//! Soft decisions are complex s2.13. A modulation byte of `0` means the
//! modem did not report the profile's modulation.

use num::complex::Complex64;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::dsp::qam::{CodeWordLut, QamModulation};
use crate::fixed_point::FixedPointFormat;

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;
use super::subcarrier::SubcarrierLayout;

pub const CONSTELLATION_FORMAT: FixedPointFormat = FixedPointFormat::signed(2, 13);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstellationDisplay {
    pub header: PnmHeader,
    pub channel_id: u8,
    pub mac_address: MacAddress,
    pub modulation: Option<QamModulation>,
    pub num_sample_symbols: u16,
    pub layout: SubcarrierLayout,
    pub data_length: u32,
    pub soft_decisions: Vec<Complex64>,
}

impl ConstellationDisplay {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::ConstellationDisplay)?;

        let channel_id = reader.read_u8("channel_id")?;
        let mac_address = reader.read_mac("mac_address")?;
        let modulation_bits = reader.read_u8("modulation_order")?;
        let modulation = match modulation_bits {
            0 => None,
            bits => Some(QamModulation::from_bits(bits as u32).ok_or_else(|| DecodeError::InvalidField {
                field: "modulation_order",
                reason: format!("{bits} bits per symbol is not a QAM order"),
            })?),
        };
        let num_sample_symbols = reader.read_u16("num_sample_symbols")?;
        let layout = SubcarrierLayout::read(&mut reader)?;
        let soft_decisions = reader.read_complex_payload("data_length", CONSTELLATION_FORMAT)?;
        reader.finish("data_length")?;

        debug!(
            channel_id,
            modulation = ?modulation,
            soft_decisions = soft_decisions.len(),
            "decoded constellation display"
        );

        Ok(Self {
            header,
            channel_id,
            mac_address,
            modulation,
            num_sample_symbols,
            layout,
            data_length: (soft_decisions.len() * 4) as u32,
            soft_decisions,
        })
    }

    /// MER estimate from hard decisions against the declared modulation
    ///
    /// Soft decisions and the ideal constellation are both scaled to unit
    /// average energy before slicing. `None` when the modulation is unknown or
    /// no soft decisions were captured.
    pub fn mer_db(&self) -> Option<f64> {
        let lut = CodeWordLut::rectangular(self.modulation?);
        if self.soft_decisions.is_empty() {
            return None;
        }

        let soft_energy = self.soft_decisions.iter().map(|s| s.norm_sqr()).sum::<f64>()
            / self.soft_decisions.len() as f64;
        if soft_energy == 0.0 {
            return None;
        }
        let soft_scale = soft_energy.sqrt().recip();
        let lut_scale = lut.average_energy().sqrt();

        let (mut ideal_power, mut error_power) = (0.0, 0.0);
        for soft in &self.soft_decisions {
            let normalized = *soft * soft_scale;
            let (_, point) = lut.nearest(normalized * lut_scale);
            let ideal = point / lut_scale;
            ideal_power += ideal.norm_sqr();
            error_power += (normalized - ideal).norm_sqr();
        }

        Some(crate::dsp::db::power_to_db(ideal_power / error_power, 1.0))
    }
}
