//! Shannon Capacity and Bit Loading
//!
//! Maps a per-subcarrier SNR (or RxMER) to the largest integer bit loading the
//! Shannon bound allows, `floor(log2(1 + SNR_linear))`, and back.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::qam::QamModulation;
use super::{check_lengths, AnalysisError};

/// Highest bit loading in the modulation table (65536-QAM)
pub const MAX_BITS: u32 = 16;

/// One row of the bits ↔ order ↔ label table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulationLevel {
    pub bits: u32,
    pub order: u32,
    pub label: String,
    /// Minimum SNR in dB that supports this loading
    pub min_snr_db: f64,
}

lazy_static! {
    static ref MODULATION_TABLE: Vec<ModulationLevel> = QamModulation::ALL
        .iter()
        .map(|m| ModulationLevel {
            bits: m.bits_per_symbol(),
            order: m.order(),
            label: m.label(),
            min_snr_db: bits_to_snr_db(m.bits_per_symbol()),
        })
        .collect();
}

/// Supported bit loadings from 1 to [`MAX_BITS`]
pub fn modulation_table() -> &'static [ModulationLevel] {
    &MODULATION_TABLE
}

pub fn level_for_bits(bits: u32) -> Option<&'static ModulationLevel> {
    MODULATION_TABLE.iter().find(|level| level.bits == bits)
}

/// Largest bit loading supported at `snr_db`
///
/// Clamped to `0..=16`; NaN maps to 0. A tolerance of `1e-9` bit absorbs the
/// rounding of an SNR produced by [`bits_to_snr_db`].
///
/// # Example
/// ```
/// use rustypnm::dsp::shannon::snr_to_bits;
///
/// assert_eq!(snr_to_bits(30.0), 9);
/// assert_eq!(snr_to_bits(-10.0), 0);
/// ```
pub fn snr_to_bits(snr_db: f64) -> u32 {
    if snr_db.is_nan() {
        return 0;
    }
    let capacity = (1.0 + 10f64.powf(snr_db / 10.0)).log2();
    (capacity + 1e-9).floor().clamp(0.0, MAX_BITS as f64) as u32
}

/// SNR in dB at which `bits` becomes supported, `10·log10(2^bits - 1)`
///
/// Zero bits gives `-∞`.
pub fn bits_to_snr_db(bits: u32) -> f64 {
    10.0 * ((bits as f64).exp2() - 1.0).log10()
}

/// Highest QAM order supported at `snr_db`, `None` below BPSK
pub fn supported_modulation(snr_db: f64) -> Option<QamModulation> {
    QamModulation::from_bits(snr_to_bits(snr_db))
}

/// Bit loading of one subcarrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcarrierLoading {
    pub frequency_hz: f64,
    pub mer_db: f64,
    pub bits: u32,
    /// `None` when the subcarrier cannot carry a single bit
    pub modulation: Option<QamModulation>,
}

/// Bit loading across a channel derived from per-subcarrier MER
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulationProfile {
    pub subcarriers: Vec<SubcarrierLoading>,
    pub average_bits: f64,
    pub min_bits: u32,
    pub max_bits: u32,
    /// Theoretical capacity `Σ bits × subcarrier spacing`, bit/s
    pub capacity_bps: f64,
}

impl ModulationProfile {
    /// Build the profile from subcarrier frequencies and their MER
    ///
    /// Non-finite MER values load zero bits. Spacing is the median step of
    /// `frequency_hz`; a single subcarrier contributes no capacity.
    ///
    /// # Errors
    /// * `LengthMismatch` - slices differ in length
    /// * `InsufficientData` - no subcarriers
    pub fn from_mer(frequency_hz: &[f64], mer_db: &[f64]) -> Result<Self, AnalysisError> {
        check_lengths("frequency/mer", frequency_hz.len(), mer_db.len())?;
        if frequency_hz.is_empty() {
            return Err(AnalysisError::InsufficientData { needed: 1, actual: 0 });
        }

        let subcarriers: Vec<SubcarrierLoading> = frequency_hz
            .iter()
            .zip(mer_db)
            .map(|(&frequency_hz, &mer_db)| {
                let bits = if mer_db.is_finite() { snr_to_bits(mer_db) } else { 0 };
                SubcarrierLoading {
                    frequency_hz,
                    mer_db,
                    bits,
                    modulation: QamModulation::from_bits(bits),
                }
            })
            .collect();

        let total_bits: u64 = subcarriers.iter().map(|s| s.bits as u64).sum();
        let min_bits = subcarriers.iter().map(|s| s.bits).min().unwrap_or(0);
        let max_bits = subcarriers.iter().map(|s| s.bits).max().unwrap_or(0);

        Ok(Self {
            average_bits: total_bits as f64 / subcarriers.len() as f64,
            min_bits,
            max_bits,
            capacity_bps: total_bits as f64 * spacing_hz(frequency_hz),
            subcarriers,
        })
    }

    /// Number of subcarriers at each bit loading, index = bits
    pub fn bit_histogram(&self) -> [usize; MAX_BITS as usize + 1] {
        let mut counts = [0; MAX_BITS as usize + 1];
        for s in &self.subcarriers {
            counts[s.bits as usize] += 1;
        }
        counts
    }
}

fn spacing_hz(frequency_hz: &[f64]) -> f64 {
    let mut steps: Vec<f64> = frequency_hz
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|s| s.is_finite())
        .collect();
    if steps.is_empty() {
        return 0.0;
    }
    steps.sort_by(f64::total_cmp);
    steps[steps.len() / 2]
}
