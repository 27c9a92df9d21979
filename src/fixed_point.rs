//! Fixed-Point Q-Format Codec
//!
//! PNM captures store complex coefficients as interleaved fixed-point integers.
//! A `Q(m, n)` value has `m` integer bits and `n` fractional bits, plus a sign bit
//! when signed, so `s2.13` occupies 16 bits on the wire.
//!
//! **Scalar rule**: interpret the raw bits as two's complement when signed, then
//! divide by `2^n`.
//!
//! The encode direction ([`encode_scalar`], [`encode_complex_series`]) builds
//! synthetic captures and rejects values outside the format's range.
//!
//! **Complex streams**: each sample is `real` followed by `imag`, each component
//! `total_bits / 8` bytes wide in the caller-selected byte order.

use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum FixedPointError {
    /// Component width is not a whole number of bytes
    #[snafu(display("Q-format with {total_bits} total bits is not byte aligned"))]
    NotByteAligned { total_bits: u32 },

    /// Stream length is not a whole number of complex samples
    #[snafu(display("stream of {len} bytes is not a multiple of the {sample_width}-byte complex sample"))]
    StreamLength { len: usize, sample_width: usize },

    /// Value outside the range the format can represent
    #[snafu(display("{value} is not representable in the Q-format"))]
    ValueOutOfRange { value: f64 },

    /// Format cannot be represented in a 64-bit word
    #[snafu(display("unsupported Q({integer_bits}, {fractional_bits}) format"))]
    InvalidFormat { integer_bits: u8, fractional_bits: u8 },
}

/// Byte order of multi-byte fixed-point components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
    Big,
    Little,
}

/// Q(integer_bits, fractional_bits) description, with an optional sign bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPointFormat {
    pub integer_bits: u8,
    pub fractional_bits: u8,
    pub signed: bool,
}

impl FixedPointFormat {
    pub const fn signed(integer_bits: u8, fractional_bits: u8) -> Self {
        Self { integer_bits, fractional_bits, signed: true }
    }

    pub const fn unsigned(integer_bits: u8, fractional_bits: u8) -> Self {
        Self { integer_bits, fractional_bits, signed: false }
    }

    /// Width of one value including the sign bit
    pub const fn total_bits(&self) -> u32 {
        self.integer_bits as u32 + self.fractional_bits as u32 + self.signed as u32
    }

    /// Bytes per component, or an error when the width is not byte aligned
    pub fn component_bytes(&self) -> Result<usize, FixedPointError> {
        let total_bits = self.total_bits();
        if total_bits == 0 || total_bits > 64 {
            return Err(FixedPointError::InvalidFormat {
                integer_bits: self.integer_bits,
                fractional_bits: self.fractional_bits,
            });
        }
        if total_bits % 8 != 0 {
            return Err(FixedPointError::NotByteAligned { total_bits });
        }
        Ok((total_bits / 8) as usize)
    }

    /// Smallest step between two representable values
    pub fn resolution(&self) -> f64 {
        (-(self.fractional_bits as f64)).exp2()
    }

    /// Smallest representable value
    pub fn min_value(&self) -> f64 {
        if self.signed {
            -(self.integer_bits as f64).exp2()
        } else {
            0.0
        }
    }

    /// Largest representable value
    pub fn max_value(&self) -> f64 {
        (self.integer_bits as f64).exp2() - self.resolution()
    }
}

/// Decode one raw fixed-point integer
///
/// Bits above `total_bits` are ignored. Signed values with the top bit set have
/// `2^total_bits` subtracted before scaling.
///
/// # Example
/// ```
/// use rustypnm::fixed_point::{decode_scalar, FixedPointFormat};
///
/// let s2_13 = FixedPointFormat::signed(2, 13);
/// assert_eq!(decode_scalar(0x2000, s2_13), 1.0);
/// assert_eq!(decode_scalar(0xE000, s2_13), -1.0);
/// ```
pub fn decode_scalar(raw: u64, fmt: FixedPointFormat) -> f64 {
    let total_bits = fmt.total_bits().min(64);
    let raw = if total_bits < 64 { raw & ((1u64 << total_bits) - 1) } else { raw };
    let scale = (fmt.fractional_bits as f64).exp2();

    if fmt.signed && total_bits > 0 && raw & (1u64 << (total_bits - 1)) != 0 {
        (raw as f64 - (total_bits as f64).exp2()) / scale
    } else {
        raw as f64 / scale
    }
}

/// Encode `value` as a raw fixed-point integer, rounding to the nearest step
///
/// Inverse of [`decode_scalar`] for every value in `min_value()..=max_value()`.
///
/// # Errors
/// * `InvalidFormat` - zero or more than 64 total bits
/// * `ValueOutOfRange` - non-finite or outside the representable range
pub fn encode_scalar(value: f64, fmt: FixedPointFormat) -> Result<u64, FixedPointError> {
    let total_bits = fmt.total_bits();
    if total_bits == 0 || total_bits > 64 {
        return Err(FixedPointError::InvalidFormat {
            integer_bits: fmt.integer_bits,
            fractional_bits: fmt.fractional_bits,
        });
    }
    let scale = (fmt.fractional_bits as f64).exp2();
    let steps = (value * scale).round();
    if !value.is_finite() || steps / scale < fmt.min_value() || steps / scale > fmt.max_value() {
        return Err(FixedPointError::ValueOutOfRange { value });
    }

    let raw = steps as i64 as u64;
    Ok(if total_bits < 64 { raw & ((1u64 << total_bits) - 1) } else { raw })
}

/// Encode samples as an interleaved `real, imag` stream
pub fn encode_complex_series(
    samples: &[Complex64],
    fmt: FixedPointFormat,
    endian: Endian,
) -> Result<Vec<u8>, FixedPointError> {
    let width = fmt.component_bytes()?;
    let mut bytes = Vec::with_capacity(samples.len() * 2 * width);
    for sample in samples {
        for component in [sample.re, sample.im] {
            let raw = encode_scalar(component, fmt)?;
            let be = &raw.to_be_bytes()[8 - width..];
            match endian {
                Endian::Big => bytes.extend_from_slice(be),
                Endian::Little => bytes.extend(be.iter().rev()),
            }
        }
    }
    Ok(bytes)
}

fn read_component(bytes: &[u8], endian: Endian) -> u64 {
    match endian {
        Endian::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64),
        Endian::Little => bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | b as u64),
    }
}

/// Decode an interleaved `real, imag` fixed-point stream
///
/// # Errors
/// * `NotByteAligned` - the format width is not a multiple of 8 bits
/// * `StreamLength` - the byte count is not a whole number of complex samples
pub fn decode_complex_series(
    bytes: &[u8],
    fmt: FixedPointFormat,
    endian: Endian,
) -> Result<Vec<Complex64>, FixedPointError> {
    let width = fmt.component_bytes()?;
    let sample_width = 2 * width;

    if bytes.len() % sample_width != 0 {
        return Err(FixedPointError::StreamLength { len: bytes.len(), sample_width });
    }

    let samples = bytes
        .chunks_exact(sample_width)
        .map(|chunk| {
            let (re, im) = chunk.split_at(width);
            Complex64::new(
                decode_scalar(read_component(re, endian), fmt),
                decode_scalar(read_component(im, endian), fmt),
            )
        })
        .collect();

    Ok(samples)
}
