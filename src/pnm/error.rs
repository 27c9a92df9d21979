use snafu::Snafu;

use crate::fixed_point::FixedPointError;

use super::header::{tag_string, PnmFileType};

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    /// Magic bytes, file type tag or structure do not describe a PNM capture
    #[snafu(display("malformed PNM capture: {reason}"))]
    Format { reason: String },

    /// Known file type whose major version no decoder handles
    #[snafu(display("unsupported PNM file type {} (raw {tag:02x?}) version {version}", tag_string(tag)))]
    UnsupportedType { tag: [u8; 4], version: u8 },

    /// Decoder invoked on a capture of another type
    #[snafu(display("expected a {expected} capture, got {actual}"))]
    TypeMismatch { expected: PnmFileType, actual: PnmFileType },

    /// A field or payload reaches past the end of the buffer
    #[snafu(display("truncated capture reading {field}: need {needed} bytes, {available} available"))]
    TruncatedData { field: &'static str, needed: usize, available: usize },

    /// A declared length disagrees with what the buffer holds
    #[snafu(display("{field} declares {declared} bytes but {actual} were found"))]
    LengthMismatch { field: &'static str, declared: usize, actual: usize },

    /// A variable-length array is not a whole number of fixed-width elements
    #[snafu(display("{field} declares {length} bytes, not a multiple of the {element_size}-byte element"))]
    Misaligned { field: &'static str, length: usize, element_size: usize },

    /// A field decoded but violates the capture's invariants
    #[snafu(display("invalid {field}: {reason}"))]
    InvalidField { field: &'static str, reason: String },

    /// Fixed-point payload could not be decoded
    #[snafu(display("cannot decode {field}: {source}"))]
    ComplexStream { field: &'static str, source: FixedPointError },
}
