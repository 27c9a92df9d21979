//! PNM Capture Decoding
//!
//! Turns the raw bytes of a DOCSIS Proactive Network Maintenance capture file into
//! an immutable, typed measurement record.
//!
//! **Pipeline**:
//! 1. [`PnmHeader::parse`] reads the 10-byte common header
//! 2. [`decode`] dispatches on `(file type, major version)` to one decoder
//! 3. The decoder parses its body with big-endian fixed-width fields and
//!    length-prefixed payloads, failing on the first inconsistency
//!
//! **Module Organization**:
//! - `header` - common header and file type codes
//! - `reader` - bounds-checked big-endian cursor
//! - `subcarrier` - OFDM subcarrier grid shared by per-subcarrier captures
//! - one module per capture type

mod reader;

pub mod channel_estimation;
pub mod constellation;
pub mod error;
pub mod fec_summary;
pub mod header;
pub mod histogram;
pub mod mac;
pub mod pre_equalization;
pub mod rxmer;
pub mod spectrum;
pub mod subcarrier;
pub mod symbol_capture;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

pub use channel_estimation::ChannelEstimation;
pub use constellation::ConstellationDisplay;
pub use error::DecodeError;
pub use fec_summary::{FecSummary, FecSummaryType};
pub use header::{PnmFileType, PnmHeader};
pub use histogram::Histogram;
pub use mac::MacAddress;
pub use pre_equalization::UpstreamPreEqualization;
pub use rxmer::RxMer;
pub use spectrum::SpectrumAnalysis;
pub use subcarrier::SubcarrierLayout;
pub use symbol_capture::SymbolCapture;

/// Major version understood by every decoder
pub const SUPPORTED_MAJOR_VERSION: u8 = 1;

/// A decoded capture of any supported type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "capture", rename_all = "snake_case")]
pub enum PnmFile {
    SymbolCapture(SymbolCapture),
    ChannelEstimation(ChannelEstimation),
    ConstellationDisplay(ConstellationDisplay),
    RxMer(RxMer),
    Histogram(Histogram),
    UpstreamPreEqualization(UpstreamPreEqualization),
    FecSummary(FecSummary),
    SpectrumAnalysis(SpectrumAnalysis),
}

impl PnmFile {
    pub fn header(&self) -> &PnmHeader {
        match self {
            PnmFile::SymbolCapture(c) => &c.header,
            PnmFile::ChannelEstimation(c) => &c.header,
            PnmFile::ConstellationDisplay(c) => &c.header,
            PnmFile::RxMer(c) => &c.header,
            PnmFile::Histogram(c) => &c.header,
            PnmFile::UpstreamPreEqualization(c) => &c.header,
            PnmFile::FecSummary(c) => &c.header,
            PnmFile::SpectrumAnalysis(c) => &c.header,
        }
    }

    pub fn file_type(&self) -> PnmFileType {
        self.header().file_type
    }
}

/// Decode one capture buffer into its typed record
///
/// # Errors
/// * `Format` - bad magic or unknown file type tag
/// * `UnsupportedType` - known file type with an unsupported major version
/// * `TruncatedData`, `LengthMismatch`, `InvalidField`, `ComplexStream` - body errors
///
/// # Example
/// ```
/// use rustypnm::pnm::{decode, PnmFile};
///
/// let mut bytes = b"PNN\x04\x01\x00".to_vec();
/// bytes.extend_from_slice(&0u32.to_be_bytes());           // capture time
/// bytes.push(1);                                          // channel id
/// bytes.extend_from_slice(&[0, 1, 2, 3, 4, 5]);           // MAC
/// bytes.extend_from_slice(&100_000_000u32.to_be_bytes()); // subcarrier zero
/// bytes.extend_from_slice(&0u16.to_be_bytes());           // first active index
/// bytes.push(50);                                         // spacing (kHz)
/// bytes.extend_from_slice(&2u32.to_be_bytes());           // data length
/// bytes.extend_from_slice(&[160, 0xFF]);
///
/// match decode(&bytes)? {
///     PnmFile::RxMer(rxmer) => assert_eq!(rxmer.values, vec![40.0, 63.5]),
///     other => panic!("unexpected {:?}", other.file_type()),
/// }
/// # Ok::<(), rustypnm::pnm::DecodeError>(())
/// ```
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<PnmFile, DecodeError> {
    let header = PnmHeader::parse(bytes)?;
    debug!(tag = %header.tag(), version = header.major_version, "dispatching capture");

    match (header.file_type, header.major_version) {
        (PnmFileType::SymbolCapture, SUPPORTED_MAJOR_VERSION) => {
            SymbolCapture::from_bytes(bytes).map(PnmFile::SymbolCapture)
        }
        (PnmFileType::ChannelEstimationCoefficient, SUPPORTED_MAJOR_VERSION) => {
            ChannelEstimation::from_bytes(bytes).map(PnmFile::ChannelEstimation)
        }
        (PnmFileType::ConstellationDisplay, SUPPORTED_MAJOR_VERSION) => {
            ConstellationDisplay::from_bytes(bytes).map(PnmFile::ConstellationDisplay)
        }
        (PnmFileType::RxMerPerSubcarrier, SUPPORTED_MAJOR_VERSION) => {
            RxMer::from_bytes(bytes).map(PnmFile::RxMer)
        }
        (PnmFileType::Histogram, SUPPORTED_MAJOR_VERSION) => {
            Histogram::from_bytes(bytes).map(PnmFile::Histogram)
        }
        (
            PnmFileType::UpstreamPreEqualization | PnmFileType::UpstreamPreEqualizationLastUpdate,
            SUPPORTED_MAJOR_VERSION,
        ) => UpstreamPreEqualization::from_bytes(bytes).map(PnmFile::UpstreamPreEqualization),
        (PnmFileType::FecSummary, SUPPORTED_MAJOR_VERSION) => {
            FecSummary::from_bytes(bytes).map(PnmFile::FecSummary)
        }
        (PnmFileType::SpectrumAnalysis, SUPPORTED_MAJOR_VERSION) => {
            SpectrumAnalysis::from_bytes(bytes).map(PnmFile::SpectrumAnalysis)
        }
        (file_type, version) => Err(DecodeError::UnsupportedType { tag: file_type.tag(), version }),
    }
}

/// Decode many capture buffers in parallel
///
/// Results are returned in input order; one bad buffer does not affect the rest.
pub fn decode_many<B>(buffers: &[B]) -> Vec<Result<PnmFile, DecodeError>>
where
    B: AsRef<[u8]> + Sync,
{
    buffers.par_iter().map(|bytes| decode(bytes.as_ref())).collect()
}
