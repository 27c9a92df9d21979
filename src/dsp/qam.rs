//! QAM Orders and Codeword Lookup Tables
//!
//! **Rectangular constellations** (`2^a × 2^b` grid): the codeword is the Gray
//! code of the I level index interleaved bit by bit with the Gray code of the Q
//! level index, so axis neighbours always differ in exactly one bit.
//!
//! **Other layouts** (e.g. cross constellations): points are sorted
//! lexicographically by `(I, Q)` and point `k` gets codeword `gray(k)`. This
//! does not guarantee single-bit differences between geometric neighbours.

use num::complex::Complex64;
use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// QAM order, from 2 to 65536 points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QamModulation {
    Qam2,
    Qam4,
    Qam8,
    Qam16,
    Qam32,
    Qam64,
    Qam128,
    Qam256,
    Qam512,
    Qam1024,
    Qam2048,
    Qam4096,
    Qam8192,
    Qam16384,
    Qam32768,
    Qam65536,
}

impl QamModulation {
    pub const ALL: [QamModulation; 16] = [
        QamModulation::Qam2,
        QamModulation::Qam4,
        QamModulation::Qam8,
        QamModulation::Qam16,
        QamModulation::Qam32,
        QamModulation::Qam64,
        QamModulation::Qam128,
        QamModulation::Qam256,
        QamModulation::Qam512,
        QamModulation::Qam1024,
        QamModulation::Qam2048,
        QamModulation::Qam4096,
        QamModulation::Qam8192,
        QamModulation::Qam16384,
        QamModulation::Qam32768,
        QamModulation::Qam65536,
    ];

    pub fn bits_per_symbol(self) -> u32 {
        self as u32 + 1
    }

    pub fn order(self) -> u32 {
        1 << self.bits_per_symbol()
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        (1..=16).contains(&bits).then(|| Self::ALL[bits as usize - 1])
    }

    pub fn from_order(order: u32) -> Option<Self> {
        if !order.is_power_of_two() {
            return None;
        }
        Self::from_bits(order.trailing_zeros())
    }

    /// Human-readable name, e.g. `QPSK` or `4096-QAM`
    pub fn label(self) -> String {
        match self {
            QamModulation::Qam2 => "BPSK".to_string(),
            QamModulation::Qam4 => "QPSK".to_string(),
            other => format!("{}-QAM", other.order()),
        }
    }
}

/// Which axis supplies the most significant codeword bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisOrder {
    #[default]
    IFirst,
    QFirst,
}

/// Binary-reflected Gray code
pub fn gray(value: u32) -> u32 {
    value ^ (value >> 1)
}

/// Inverse of [`gray`]
pub fn gray_decode(mut code: u32) -> u32 {
    let mut value = code;
    while code > 1 {
        code >>= 1;
        value ^= code;
    }
    value
}

fn interleave(first: u32, first_bits: u32, second: u32, second_bits: u32) -> u32 {
    let mut codeword = 0;
    for k in 0..first_bits.max(second_bits) {
        if k < first_bits {
            codeword = (codeword << 1) | ((first >> (first_bits - 1 - k)) & 1);
        }
        if k < second_bits {
            codeword = (codeword << 1) | ((second >> (second_bits - 1 - k)) & 1);
        }
    }
    codeword
}

/// Level values and codeword grid of a rectangular table
#[derive(Debug, Clone, PartialEq)]
struct Grid {
    i_levels: Vec<f64>,
    q_levels: Vec<f64>,
    /// Codeword at `i_index * q_levels.len() + q_index`
    codewords: Vec<u32>,
}

fn nearest_level(levels: &[f64], value: f64) -> usize {
    let pos = levels.partition_point(|&l| l < value);
    if pos == 0 {
        0
    } else if pos == levels.len() {
        levels.len() - 1
    } else if value - levels[pos - 1] <= levels[pos] - value {
        pos - 1
    } else {
        pos
    }
}

/// Codeword → constellation point table
#[derive(Debug, Clone, PartialEq)]
pub struct CodeWordLut {
    /// Point of each codeword, indexed by codeword
    points: Vec<Complex64>,
    grid: Option<Grid>,
}

impl CodeWordLut {
    /// Rectangular table for `modulation`, I axis first
    ///
    /// Odd bit counts use `2^⌈b/2⌉` I levels by `2^⌊b/2⌋` Q levels. Levels are the
    /// odd integers `±1, ±3, …`.
    pub fn rectangular(modulation: QamModulation) -> Self {
        Self::rectangular_with_order(modulation, AxisOrder::IFirst)
    }

    pub fn rectangular_with_order(modulation: QamModulation, axis_order: AxisOrder) -> Self {
        let bits = modulation.bits_per_symbol();
        let levels = |count: i32| -> Vec<i32> { (0..count).map(|k| 2 * k - (count - 1)).collect() };
        let i_levels = levels(1 << bits.div_ceil(2));
        let q_levels = levels(1 << (bits / 2));

        let points: Vec<(i32, i32)> = i_levels
            .iter()
            .flat_map(|&i| q_levels.iter().map(move |&q| (i, q)))
            .collect();
        Self::build_rectangular(&points, &i_levels, &q_levels, axis_order)
    }

    /// Cross constellation for odd bit counts of at least 5
    ///
    /// A square of side `3·2^((b-3)/2)` with `2^((b-5)/2)`-wide corners removed,
    /// e.g. 6×6 minus four single corners for 32-QAM. Codewords come from the
    /// sorted-rank fallback.
    pub fn cross(modulation: QamModulation) -> Result<Self, AnalysisError> {
        let bits = modulation.bits_per_symbol();
        if bits < 5 || bits % 2 == 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "modulation",
                reason: format!("cross layout needs an odd bit count >= 5, got {bits}"),
            });
        }
        let side = 3 * (1i32 << ((bits - 3) / 2));
        let corner = 1i32 << ((bits - 5) / 2);

        let mut points = Vec::with_capacity(modulation.order() as usize);
        for a in 0..side {
            for b in 0..side {
                let in_corner_rows = a < corner || a >= side - corner;
                let in_corner_cols = b < corner || b >= side - corner;
                if !(in_corner_rows && in_corner_cols) {
                    points.push((2 * a - (side - 1), 2 * b - (side - 1)));
                }
            }
        }
        Self::from_points(&points, AxisOrder::IFirst)
    }

    /// Table for an arbitrary point set
    ///
    /// # Errors
    /// * `InvalidParameter` - duplicate points, or a point count that is not a
    ///   power of two
    pub fn from_points(points: &[(i32, i32)], axis_order: AxisOrder) -> Result<Self, AnalysisError> {
        let mut sorted = points.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != points.len() {
            return Err(AnalysisError::InvalidParameter {
                name: "points",
                reason: "constellation contains duplicate points".into(),
            });
        }
        if !points.len().is_power_of_two() {
            return Err(AnalysisError::InvalidParameter {
                name: "points",
                reason: format!("{} points is not a power of two", points.len()),
            });
        }

        let mut i_levels: Vec<i32> = sorted.iter().map(|p| p.0).collect();
        i_levels.dedup();
        let mut q_levels: Vec<i32> = sorted.iter().map(|p| p.1).collect();
        q_levels.sort_unstable();
        q_levels.dedup();

        let rectangular = i_levels.len() * q_levels.len() == points.len()
            && i_levels.len().is_power_of_two()
            && q_levels.len().is_power_of_two();
        if rectangular {
            return Ok(Self::build_rectangular(points, &i_levels, &q_levels, axis_order));
        }

        let mut table = vec![Complex64::new(0.0, 0.0); points.len()];
        for (rank, &(i, q)) in sorted.iter().enumerate() {
            table[gray(rank as u32) as usize] = Complex64::new(i as f64, q as f64);
        }
        Ok(Self { points: table, grid: None })
    }

    fn build_rectangular(points: &[(i32, i32)], i_levels: &[i32], q_levels: &[i32], axis_order: AxisOrder) -> Self {
        let i_bits = i_levels.len().trailing_zeros();
        let q_bits = q_levels.len().trailing_zeros();

        let mut table = vec![Complex64::new(0.0, 0.0); points.len()];
        let mut codewords = vec![0u32; points.len()];
        for &(i, q) in points {
            // Levels are sorted and every point lies on the grid
            let i_index = i_levels.partition_point(|&l| l < i);
            let q_index = q_levels.partition_point(|&l| l < q);
            let (gi, gq) = (gray(i_index as u32), gray(q_index as u32));
            let codeword = match axis_order {
                AxisOrder::IFirst => interleave(gi, i_bits, gq, q_bits),
                AxisOrder::QFirst => interleave(gq, q_bits, gi, i_bits),
            };
            table[codeword as usize] = Complex64::new(i as f64, q as f64);
            codewords[i_index * q_levels.len() + q_index] = codeword;
        }

        Self {
            points: table,
            grid: Some(Grid {
                i_levels: i_levels.iter().map(|&l| l as f64).collect(),
                q_levels: q_levels.iter().map(|&l| l as f64).collect(),
                codewords,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_rectangular(&self) -> bool {
        self.grid.is_some()
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.points.len().trailing_zeros()
    }

    pub fn point(&self, codeword: u32) -> Option<Complex64> {
        self.points.get(codeword as usize).copied()
    }

    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    /// Codeword of an exact constellation point
    pub fn codeword(&self, point: Complex64) -> Option<u32> {
        self.points.iter().position(|&p| p == point).map(|c| c as u32)
    }

    pub fn average_energy(&self) -> f64 {
        self.points.iter().map(|p| p.norm_sqr()).sum::<f64>() / self.points.len() as f64
    }

    /// Hard decision: the closest constellation point and its codeword
    pub fn nearest(&self, sample: Complex64) -> (u32, Complex64) {
        if let Some(grid) = &self.grid {
            let i_index = nearest_level(&grid.i_levels, sample.re);
            let q_index = nearest_level(&grid.q_levels, sample.im);
            let codeword = grid.codewords[i_index * grid.q_levels.len() + q_index];
            return (codeword, self.points[codeword as usize]);
        }

        let (codeword, point) = self
            .points
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - sample).norm_sqr().total_cmp(&(b.1 - sample).norm_sqr()))
            .map(|(c, &p)| (c as u32, p))
            .unwrap_or((0, Complex64::new(0.0, 0.0)));
        (codeword, point)
    }
}
