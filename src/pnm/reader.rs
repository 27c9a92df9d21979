//! Big-endian cursor over a capture buffer
//!
//! Every read names the field it is decoding so truncation errors point at the
//! offending part of the layout.

use num::complex::Complex64;

use crate::fixed_point::{decode_complex_series, Endian, FixedPointFormat};

use super::error::DecodeError;
use super::mac::MacAddress;

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::TruncatedData { field, needed: len, available: self.remaining() });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, field)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub(crate) fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.read_array(field)?))
    }

    pub(crate) fn read_i16(&mut self, field: &'static str) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.read_array(field)?))
    }

    pub(crate) fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array(field)?))
    }

    pub(crate) fn read_mac(&mut self, field: &'static str) -> Result<MacAddress, DecodeError> {
        Ok(MacAddress(self.read_array(field)?))
    }

    /// Read a payload whose size comes from a 4-byte length prefix
    pub(crate) fn read_length_prefixed(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let declared = self.read_u32(field)? as usize;
        self.read_bytes(declared, field)
    }

    /// Read a length-prefixed big-endian Q-format complex payload
    pub(crate) fn read_complex_payload(
        &mut self,
        field: &'static str,
        fmt: FixedPointFormat,
    ) -> Result<Vec<Complex64>, DecodeError> {
        let data = self.read_length_prefixed(field)?;
        decode_complex_series(data, fmt, Endian::Big)
            .map_err(|source| DecodeError::ComplexStream { field, source })
    }

    /// Fail when bytes remain after the last declared field
    pub(crate) fn finish(&self, field: &'static str) -> Result<(), DecodeError> {
        if self.remaining() != 0 {
            return Err(DecodeError::LengthMismatch {
                field,
                declared: self.offset,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }
}
