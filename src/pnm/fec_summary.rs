//! OFDM FEC Summary (`PNN8`)
//!
//! Body layout after the common header:
//! `channel_id(1) | mac(6) | summary_type(1) | num_profiles(1)` followed by one
//! block per profile:
//! `profile_id(1) | num_sets(2) | num_sets × (timestamp(4) | total(4) | corrected(4) | uncorrectable(4))`
//!
//! Every record must satisfy `total >= corrected + uncorrectable`, and
//! timestamps never decrease within a profile.

use serde::Serialize;
use tracing::{debug, instrument, trace};

use super::error::DecodeError;
use super::header::{PnmFileType, PnmHeader};
use super::mac::MacAddress;
use super::reader::ByteReader;

const CODEWORD_RECORD_LEN: usize = 16;

/// Collection interval of the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FecSummaryType {
    /// 600 one-second intervals
    Interval10Min,
    /// 1440 one-minute intervals
    Interval24Hr,
    Other(u8),
}

impl From<u8> for FecSummaryType {
    fn from(value: u8) -> Self {
        match value {
            2 => FecSummaryType::Interval10Min,
            3 => FecSummaryType::Interval24Hr,
            other => FecSummaryType::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodewordCounts {
    pub timestamp: u32,
    pub total_codewords: u32,
    pub corrected: u32,
    pub uncorrectable: u32,
}

impl CodewordCounts {
    /// Codewords that needed no correction
    pub fn unerrored(&self) -> u64 {
        self.total_codewords as u64 - self.corrected as u64 - self.uncorrectable as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FecProfile {
    pub profile_id: u8,
    pub intervals: Vec<CodewordCounts>,
}

/// Sums over every interval of one profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileTotals {
    pub profile_id: u8,
    pub total_codewords: u64,
    pub corrected: u64,
    pub uncorrectable: u64,
    /// `uncorrectable / total`, 0 when no codewords were counted
    pub uncorrectable_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FecSummary {
    pub header: PnmHeader,
    pub channel_id: u8,
    pub mac_address: MacAddress,
    pub summary_type: FecSummaryType,
    pub profiles: Vec<FecProfile>,
}

fn read_profile(reader: &mut ByteReader<'_>) -> Result<FecProfile, DecodeError> {
    let profile_id = reader.read_u8("profile_id")?;
    let num_sets = reader.read_u16("num_sets")? as usize;

    let needed = num_sets * CODEWORD_RECORD_LEN;
    if needed > reader.remaining() {
        return Err(DecodeError::TruncatedData {
            field: "codeword_entries",
            needed,
            available: reader.remaining(),
        });
    }

    let mut intervals = Vec::with_capacity(num_sets);
    for _ in 0..num_sets {
        let counts = CodewordCounts {
            timestamp: reader.read_u32("timestamp")?,
            total_codewords: reader.read_u32("total_codewords")?,
            corrected: reader.read_u32("corrected")?,
            uncorrectable: reader.read_u32("uncorrectable")?,
        };

        if (counts.corrected as u64 + counts.uncorrectable as u64) > counts.total_codewords as u64 {
            return Err(DecodeError::InvalidField {
                field: "total_codewords",
                reason: format!(
                    "profile {profile_id} at {}: {} corrected + {} uncorrectable exceeds {} total",
                    counts.timestamp, counts.corrected, counts.uncorrectable, counts.total_codewords
                ),
            });
        }
        if let Some(previous) = intervals.last().map(|c: &CodewordCounts| c.timestamp) {
            if counts.timestamp < previous {
                return Err(DecodeError::InvalidField {
                    field: "timestamp",
                    reason: format!("profile {profile_id}: {} follows {previous}", counts.timestamp),
                });
            }
        }
        intervals.push(counts);
    }

    trace!(profile_id, intervals = intervals.len(), "decoded FEC profile");
    Ok(FecProfile { profile_id, intervals })
}

impl FecSummary {
    #[instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let header = PnmHeader::read(&mut reader)?;
        header.expect_type(PnmFileType::FecSummary)?;

        let channel_id = reader.read_u8("channel_id")?;
        let mac_address = reader.read_mac("mac_address")?;
        let summary_type = FecSummaryType::from(reader.read_u8("summary_type")?);
        let num_profiles = reader.read_u8("num_profiles")?;

        let profiles = (0..num_profiles)
            .map(|_| read_profile(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;
        reader.finish("num_profiles")?;

        debug!(channel_id, mac = %mac_address, profiles = profiles.len(), "decoded FEC summary");

        Ok(Self { header, channel_id, mac_address, summary_type, profiles })
    }

    pub fn profile_totals(&self) -> Vec<ProfileTotals> {
        self.profiles
            .iter()
            .map(|profile| {
                let (total, corrected, uncorrectable) = profile.intervals.iter().fold(
                    (0u64, 0u64, 0u64),
                    |(t, c, u), counts| {
                        (
                            t + counts.total_codewords as u64,
                            c + counts.corrected as u64,
                            u + counts.uncorrectable as u64,
                        )
                    },
                );
                ProfileTotals {
                    profile_id: profile.profile_id,
                    total_codewords: total,
                    corrected,
                    uncorrectable,
                    uncorrectable_ratio: if total == 0 { 0.0 } else { uncorrectable as f64 / total as f64 },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: u32, total: u32, corrected: u32, uncorrectable: u32) -> Vec<u8> {
        [ts, total, corrected, uncorrectable].iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn capture(profiles: &[(u8, Vec<Vec<u8>>)]) -> Vec<u8> {
        let mut bytes = b"PNN\x08\x01\x00".to_vec();
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.push(160);
        bytes.extend_from_slice(&[0x01; 6]);
        bytes.push(2);
        bytes.push(profiles.len() as u8);
        for (id, records) in profiles {
            bytes.push(*id);
            bytes.extend_from_slice(&(records.len() as u16).to_be_bytes());
            for r in records {
                bytes.extend_from_slice(r);
            }
        }
        bytes
    }

    #[test]
    fn test_decode_two_profiles() {
        let bytes = capture(&[
            (0, vec![record(100, 1000, 10, 1), record(101, 1000, 0, 0)]),
            (255, vec![record(100, 50, 50, 0)]),
        ]);
        let summary = FecSummary::from_bytes(&bytes).unwrap();
        assert_eq!(summary.summary_type, FecSummaryType::Interval10Min);
        assert_eq!(summary.profiles.len(), 2);
        assert_eq!(summary.profiles[0].intervals[0].unerrored(), 989);

        let totals = summary.profile_totals();
        assert_eq!(totals[0].total_codewords, 2000);
        assert_eq!(totals[0].uncorrectable, 1);
        assert!((totals[0].uncorrectable_ratio - 0.0005).abs() < 1e-12);
        assert_eq!(totals[1].profile_id, 255);
    }

    #[test]
    fn test_counter_invariant_violation() {
        let bytes = capture(&[(0, vec![record(1, 10, 6, 5)])]);
        let err = FecSummary::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "total_codewords", .. }));
    }

    #[test]
    fn test_decreasing_timestamp() {
        let bytes = capture(&[(0, vec![record(5, 10, 0, 0), record(4, 10, 0, 0)])]);
        let err = FecSummary::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "timestamp", .. }));
    }

    #[test]
    fn test_timestamps_restart_per_profile() {
        let bytes = capture(&[(0, vec![record(9, 1, 0, 0)]), (1, vec![record(1, 1, 0, 0)])]);
        assert!(FecSummary::from_bytes(&bytes).is_ok());
    }

    #[test]
    fn test_truncated_records() {
        let mut bytes = capture(&[(0, vec![record(1, 1, 0, 0), record(2, 1, 0, 0)])]);
        bytes.truncate(bytes.len() - 1);
        let err = FecSummary::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedData { field: "codeword_entries", needed: 32, available: 31 }));
    }
}
