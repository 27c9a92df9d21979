use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::reader::ByteReader;

/// OFDM subcarrier grid shared by the per-subcarrier capture types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcarrierLayout {
    pub subcarrier_zero_frequency_hz: u32,
    pub first_active_subcarrier_index: u16,
    pub subcarrier_spacing_hz: u32,
}

impl SubcarrierLayout {
    /// Read `subcarrier_zero_freq(4) | first_active_index(2) | spacing_khz(1)`
    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let subcarrier_zero_frequency_hz = reader.read_u32("subcarrier_zero_frequency")?;
        let first_active_subcarrier_index = reader.read_u16("first_active_subcarrier_index")?;
        let spacing_khz = reader.read_u8("subcarrier_spacing")?;

        Ok(Self {
            subcarrier_zero_frequency_hz,
            first_active_subcarrier_index,
            subcarrier_spacing_hz: spacing_khz as u32 * 1_000,
        })
    }

    /// Centre frequency of the `i`-th captured subcarrier
    pub fn frequency_hz(&self, i: usize) -> f64 {
        self.subcarrier_zero_frequency_hz as f64
            + self.subcarrier_spacing_hz as f64 * (self.first_active_subcarrier_index as f64 + i as f64)
    }

    pub fn frequencies_hz(&self, count: usize) -> Vec<f64> {
        (0..count).map(|i| self.frequency_hz(i)).collect()
    }

    pub fn occupied_bandwidth_hz(&self, count: usize) -> f64 {
        count as f64 * self.subcarrier_spacing_hz as f64
    }
}
