//! Spectrum Analysis (`PNN9`)
//!
//! Body layout after the common header:
//! `mac(6) | window_function(1) | data_length(4)` followed by segments filling
//! exactly `data_length` bytes. Each segment is
//! `center_freq(4) | span(4) | num_bins(2) | bin_spacing(4) | resolution_bw(4)`
//! and `num_bins` signed 16-bit amplitudes in hundredths of a dB.

use serde::Serialize;
use tracing::{debug, instrument};

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;

/// Fixed header preceding each segment's amplitudes
const SEGMENT_HEADER_LEN: usize = 18;

/// Window applied by the device before its FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpectrumWindow {
    Hann,
    BlackmanHarris,
    Rectangular,
    Hamming,
    FlatTop,
    Gaussian,
    Chebyshev,
    Other(u8),
}

impl From<u8> for SpectrumWindow {
    fn from(value: u8) -> Self {
        match value {
            1 => SpectrumWindow::Hann,
            2 => SpectrumWindow::BlackmanHarris,
            3 => SpectrumWindow::Rectangular,
            4 => SpectrumWindow::Hamming,
            5 => SpectrumWindow::FlatTop,
            6 => SpectrumWindow::Gaussian,
            7 => SpectrumWindow::Chebyshev,
            other => SpectrumWindow::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumSegment {
    pub center_frequency_hz: u32,
    pub span_hz: u32,
    pub bin_spacing_hz: u32,
    pub resolution_bandwidth_hz: u32,
    /// Amplitude per bin in dB
    pub amplitudes_db: Vec<f64>,
}

impl SpectrumSegment {
    /// Read one segment from the sweep payload, which is `declared` bytes long
    fn read(reader: &mut ByteReader<'_>, declared: usize) -> Result<Self, DecodeError> {
        let overrun = |needed: usize, reader: &ByteReader<'_>| DecodeError::LengthMismatch {
            field: "data_length",
            declared,
            actual: declared - reader.remaining() + needed,
        };

        if reader.remaining() < SEGMENT_HEADER_LEN {
            return Err(overrun(SEGMENT_HEADER_LEN, reader));
        }
        let center_frequency_hz = reader.read_u32("center_frequency")?;
        let span_hz = reader.read_u32("span")?;
        let num_bins = reader.read_u16("num_bins")? as usize;
        let bin_spacing_hz = reader.read_u32("bin_spacing")?;
        let resolution_bandwidth_hz = reader.read_u32("resolution_bandwidth")?;

        if reader.remaining() < num_bins * 2 {
            return Err(overrun(num_bins * 2, reader));
        }
        let amplitudes_db = (0..num_bins)
            .map(|_| reader.read_i16("amplitude").map(|raw| raw as f64 / 100.0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { center_frequency_hz, span_hz, bin_spacing_hz, resolution_bandwidth_hz, amplitudes_db })
    }

    /// Frequency of each bin, starting at the lower span edge
    pub fn frequencies_hz(&self) -> Vec<f64> {
        let start = self.center_frequency_hz as f64 - self.span_hz as f64 / 2.0;
        (0..self.amplitudes_db.len())
            .map(|k| start + k as f64 * self.bin_spacing_hz as f64)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumAnalysis {
    pub header: PnmHeader,
    pub mac_address: MacAddress,
    pub window_function: SpectrumWindow,
    pub data_length: u32,
    pub segments: Vec<SpectrumSegment>,
}

impl SpectrumAnalysis {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::SpectrumAnalysis)?;

        let mac_address = reader.read_mac("mac_address")?;
        let window_function = SpectrumWindow::from(reader.read_u8("window_function")?);
        let data = reader.read_length_prefixed("data_length")?;
        reader.finish("data_length")?;

        let mut segment_reader = ByteReader::new(data);
        let mut segments = Vec::new();
        while segment_reader.remaining() > 0 {
            segments.push(SpectrumSegment::read(&mut segment_reader, data.len())?);
        }

        debug!(mac = %mac_address, segments = segments.len(), "decoded spectrum analysis");

        Ok(Self { header, mac_address, window_function, data_length: data.len() as u32, segments })
    }

    /// `(frequency_hz, amplitude_db)` across all segments, sorted by frequency
    pub fn combined(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self
            .segments
            .iter()
            .flat_map(|segment| {
                segment.frequencies_hz().into_iter().zip(segment.amplitudes_db.iter().copied())
            })
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
    }
}
