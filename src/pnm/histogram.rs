//! Downstream Histogram (`PNN5`)
//!
//! Body layout after the common header:
//! `mac(6) | symmetry(1) | dwell_length(4) | dwell counts | hit_length(4) | hit counts`
//!
//! Both arrays hold big-endian 32-bit counters; each length field is in bytes.

use serde::Serialize;
use tracing::{debug, instrument};

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub header: PnmHeader,
    pub mac_address: MacAddress,
    pub symmetry: u8,
    pub dwell_count_values: Vec<u32>,
    pub hit_count_values: Vec<u32>,
}

fn read_counters(reader: &mut ByteReader<'_>, field: &'static str) -> Result<Vec<u32>, DecodeError> {
    let data = reader.read_length_prefixed(field)?;
    if data.len() % 4 != 0 {
        return Err(DecodeError::Misaligned { field, length: data.len(), element_size: 4 });
    }
    Ok(data
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

impl Histogram {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::Histogram)?;

        let mac_address = reader.read_mac("mac_address")?;
        let symmetry = reader.read_u8("symmetry")?;
        let dwell_count_values = read_counters(&mut reader, "dwell_count_length")?;
        let hit_count_values = read_counters(&mut reader, "hit_count_length")?;
        reader.finish("hit_count_length")?;

        debug!(
            mac = %mac_address,
            symmetry,
            dwell_bins = dwell_count_values.len(),
            hit_bins = hit_count_values.len(),
            "decoded histogram"
        );

        Ok(Self { header, mac_address, symmetry, dwell_count_values, hit_count_values })
    }

    /// Whether the bins are symmetric around zero
    pub fn is_symmetric(&self) -> bool {
        self.symmetry != 0
    }

    pub fn total_dwell(&self) -> u64 {
        self.dwell_count_values.iter().map(|&v| v as u64).sum()
    }

    pub fn total_hits(&self) -> u64 {
        self.hit_count_values.iter().map(|&v| v as u64).sum()
    }

    /// Hit count of each bin divided by the total hit count
    pub fn hit_probabilities(&self) -> Vec<f64> {
        let total = self.total_hits();
        self.hit_count_values
            .iter()
            .map(|&hits| if total == 0 { 0.0 } else { hits as f64 / total as f64 })
            .collect()
    }
}
