//! OFDM Downstream Symbol Capture (`PNN1`)
//!
//! Body layout after the common header:
//! `channel_id(1) | mac(6) | subcarrier_zero_freq(4) | first_active_index(2) |
//! spacing_khz(1) | sample_rate_hz(4) | fft_length(2) | data_length(4) | data`
//!
//! Samples are complex s1.14.

use num::complex::Complex64;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::fixed_point::FixedPointFormat;

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;
use super::subcarrier::SubcarrierLayout;

pub const SYMBOL_CAPTURE_FORMAT: FixedPointFormat = FixedPointFormat::signed(1, 14);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolCapture {
    pub header: PnmHeader,
    pub channel_id: u8,
    pub mac_address: MacAddress,
    pub layout: SubcarrierLayout,
    pub sample_rate_hz: u32,
    pub fft_length: u16,
    pub data_length: u32,
    pub samples: Vec<Complex64>,
}

impl SymbolCapture {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::SymbolCapture)?;

        let channel_id = reader.read_u8("channel_id")?;
        let mac_address = reader.read_mac("mac_address")?;
        let layout = SubcarrierLayout::read(&mut reader)?;
        let sample_rate_hz = reader.read_u32("sample_rate")?;
        let fft_length = reader.read_u16("fft_length")?;
        let samples = reader.read_complex_payload("data_length", SYMBOL_CAPTURE_FORMAT)?;
        reader.finish("data_length")?;

        debug!(channel_id, sample_rate_hz, fft_length, samples = samples.len(), "decoded symbol capture");

        Ok(Self {
            header,
            channel_id,
            mac_address,
            layout,
            sample_rate_hz,
            fft_length,
            data_length: (samples.len() * 4) as u32,
            samples,
        })
    }

    pub fn occupied_bandwidth_hz(&self) -> f64 {
        self.layout.occupied_bandwidth_hz(self.samples.len())
    }

    /// Capture duration in seconds, `None` without a sample rate
    pub fn duration_s(&self) -> Option<f64> {
        (self.sample_rate_hz > 0).then(|| self.samples.len() as f64 / self.sample_rate_hz as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_symbol_capture() {
        let mut bytes = b"PNN\x01\x01\x00".to_vec();
        bytes.extend_from_slice(&5u32.to_be_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.push(50);
        bytes.extend_from_slice(&204_800_000u32.to_be_bytes());
        bytes.extend_from_slice(&4096u16.to_be_bytes());
        bytes.extend_from_slice(&8u32.to_be_bytes());
        bytes.extend_from_slice(&[0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00]);

        let capture = SymbolCapture::from_bytes(&bytes).unwrap();
        assert_eq!(capture.fft_length, 4096);
        assert_eq!(capture.samples, vec![Complex64::new(0.5, 0.0), Complex64::new(0.0, 0.5)]);
        assert_eq!(capture.occupied_bandwidth_hz(), 100_000.0);
        assert_eq!(capture.duration_s(), Some(2.0 / 204_800_000.0));
    }
}
