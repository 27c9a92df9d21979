//! PNM File Header
//!
//! Every capture starts with the same 10-byte header:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 3 | magic `"PNN"` |
//! | 3 | 1 | file type code (`4` for RxMER, shown as `PNN4`) |
//! | 4 | 1 | major version |
//! | 5 | 1 | minor version |
//! | 6 | 4 | capture time, unix seconds, `0` when not stamped |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::reader::ByteReader;

/// Magic bytes shared by every PNM capture
pub const PNM_MAGIC: &[u8; 3] = b"PNN";

/// Size of the common header in bytes
pub const HEADER_LEN: usize = 10;

/// Capture family identified by the header's file type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PnmFileType {
    SymbolCapture,
    ChannelEstimationCoefficient,
    ConstellationDisplay,
    RxMerPerSubcarrier,
    Histogram,
    UpstreamPreEqualization,
    UpstreamPreEqualizationLastUpdate,
    FecSummary,
    SpectrumAnalysis,
}

impl PnmFileType {
    pub const ALL: [PnmFileType; 9] = [
        PnmFileType::SymbolCapture,
        PnmFileType::ChannelEstimationCoefficient,
        PnmFileType::ConstellationDisplay,
        PnmFileType::RxMerPerSubcarrier,
        PnmFileType::Histogram,
        PnmFileType::UpstreamPreEqualization,
        PnmFileType::UpstreamPreEqualizationLastUpdate,
        PnmFileType::FecSummary,
        PnmFileType::SpectrumAnalysis,
    ];

    /// File type code carried in byte 3 of the header
    pub const fn code(self) -> u8 {
        match self {
            PnmFileType::SymbolCapture => 1,
            PnmFileType::ChannelEstimationCoefficient => 2,
            PnmFileType::ConstellationDisplay => 3,
            PnmFileType::RxMerPerSubcarrier => 4,
            PnmFileType::Histogram => 5,
            PnmFileType::UpstreamPreEqualization => 6,
            PnmFileType::UpstreamPreEqualizationLastUpdate => 7,
            PnmFileType::FecSummary => 8,
            PnmFileType::SpectrumAnalysis => 9,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Raw header tag bytes, magic followed by the type code
    pub const fn tag(self) -> [u8; 4] {
        [PNM_MAGIC[0], PNM_MAGIC[1], PNM_MAGIC[2], self.code()]
    }

    pub const fn description(self) -> &'static str {
        match self {
            PnmFileType::SymbolCapture => "symbol capture",
            PnmFileType::ChannelEstimationCoefficient => "channel estimation coefficients",
            PnmFileType::ConstellationDisplay => "constellation display",
            PnmFileType::RxMerPerSubcarrier => "RxMER per subcarrier",
            PnmFileType::Histogram => "histogram",
            PnmFileType::UpstreamPreEqualization => "upstream pre-equalization",
            PnmFileType::UpstreamPreEqualizationLastUpdate => "upstream pre-equalization last update",
            PnmFileType::FecSummary => "FEC summary",
            PnmFileType::SpectrumAnalysis => "spectrum analysis",
        }
    }
}

impl fmt::Display for PnmFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", tag_string(&self.tag()), self.description())
    }
}

/// Printable form of a raw tag, e.g. `PNN4`
pub fn tag_string(tag: &[u8; 4]) -> String {
    format!("{}{}", String::from_utf8_lossy(&tag[..3]), tag[3])
}

/// Common header of a PNM capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnmHeader {
    pub file_type: PnmFileType,
    pub major_version: u8,
    pub minor_version: u8,
    pub capture_time: Option<u32>,
}

impl PnmHeader {
    /// Parse the header at the start of `bytes`
    ///
    /// # Errors
    /// * `TruncatedData` - fewer than [`HEADER_LEN`] bytes
    /// * `Format` - magic is not `PNN` or the type code is not a known capture family
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteReader::new(bytes))
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let magic = reader.read_bytes(3, "file_type")?;
        if magic != PNM_MAGIC {
            return Err(DecodeError::Format {
                reason: format!("unrecognized magic {magic:02x?}, expected \"PNN\""),
            });
        }
        let code = reader.read_u8("file_type_code")?;
        let major_version = reader.read_u8("major_version")?;
        let minor_version = reader.read_u8("minor_version")?;
        let capture_time = reader.read_u32("capture_time")?;

        let file_type = PnmFileType::from_code(code).ok_or_else(|| DecodeError::Format {
            reason: format!("unknown file type tag {}", tag_string(&[magic[0], magic[1], magic[2], code])),
        })?;

        Ok(Self {
            file_type,
            major_version,
            minor_version,
            capture_time: (capture_time != 0).then_some(capture_time),
        })
    }

    /// Printable tag, e.g. `PNN4`
    pub fn tag(&self) -> String {
        tag_string(&self.file_type.tag())
    }

    pub(crate) fn expect_type(&self, expected: PnmFileType) -> Result<(), DecodeError> {
        if self.file_type != expected {
            return Err(DecodeError::TypeMismatch { expected, actual: self.file_type });
        }
        Ok(())
    }
}
