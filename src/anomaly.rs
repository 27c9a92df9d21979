//! Z-Score Anomaly Detection
//!
//! Flags cells of a 2D grid (for example captures × subcarriers of RxMER) whose
//! global z-score exceeds a threshold, then groups flagged cells into
//! 4-connected regions and reports one bounding box per region.
//!
//! A grid with zero spread (including spread at rounding level, as for a
//! constant grid of 0.1) has an all-zero z-score map and therefore no
//! anomalies, whatever the threshold.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dsp::AnalysisError;
use crate::stats::{matrix_width, mean_and_spread, StatsError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Cells with `|z| > threshold` are anomalous
    pub threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { threshold: 3.0 }
    }
}

/// Inclusive cell bounds of one connected anomalous region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub row_min: usize,
    pub col_min: usize,
    pub row_max: usize,
    pub col_max: usize,
    /// Anomalous cells in the region
    pub cell_count: usize,
}

impl BoundingBox {
    pub fn height(&self) -> usize {
        self.row_max - self.row_min + 1
    }

    pub fn width(&self) -> usize {
        self.col_max - self.col_min + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_min..=self.row_max).contains(&row) && (self.col_min..=self.col_max).contains(&col)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub threshold: f64,
    pub mean: f64,
    pub std: f64,
    /// Regions in row-major order of their first cell
    pub boxes: Vec<BoundingBox>,
    pub anomalous_cells: usize,
}

/// Global z-score of every cell
///
/// Mean and population standard deviation are taken over the finite cells;
/// non-finite cells map to NaN. Zero spread maps every finite cell to 0.
/// Spread indistinguishable from rounding noise counts as zero.
///
/// # Errors
/// * `Empty` - no rows, no columns, or no finite cell
/// * `Ragged` - rows of different lengths
pub fn z_score_map<R: AsRef<[f64]>>(grid: &[R]) -> Result<(Vec<Vec<f64>>, f64, f64), StatsError> {
    matrix_width::<f64, R>(grid)?;

    let finite: Vec<f64> = grid.iter().flat_map(|r| r.as_ref().iter().copied()).filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(StatsError::Empty);
    }
    let (mean, std) = mean_and_spread(&finite);

    let map = grid
        .iter()
        .map(|row| {
            row.as_ref()
                .iter()
                .map(|&v| match v.is_finite() {
                    false => f64::NAN,
                    true if std > 0.0 => (v - mean) / std,
                    true => 0.0,
                })
                .collect()
        })
        .collect();

    Ok((map, mean, std))
}

/// Bounding boxes of the 4-connected `true` regions of `mask`
///
/// An empty mask has no regions.
///
/// # Errors
/// * `Ragged` - rows of different lengths
pub fn connected_regions(mask: &[Vec<bool>]) -> Result<Vec<BoundingBox>, StatsError> {
    let rows = mask.len();
    let cols = mask.first().map_or(0, |r| r.len());
    if let Some((row, r)) = mask.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(StatsError::Ragged { row, expected: cols, actual: r.len() });
    }
    let mut visited = vec![vec![false; cols]; rows];
    let mut boxes = Vec::new();
    let mut stack = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            if !mask[r][c] || visited[r][c] {
                continue;
            }
            visited[r][c] = true;
            stack.push((r, c));
            let mut bbox = BoundingBox { row_min: r, col_min: c, row_max: r, col_max: c, cell_count: 0 };

            while let Some((y, x)) = stack.pop() {
                bbox.cell_count += 1;
                bbox.row_min = bbox.row_min.min(y);
                bbox.row_max = bbox.row_max.max(y);
                bbox.col_min = bbox.col_min.min(x);
                bbox.col_max = bbox.col_max.max(x);

                let neighbours = [
                    (y.wrapping_sub(1), x),
                    (y + 1, x),
                    (y, x.wrapping_sub(1)),
                    (y, x + 1),
                ];
                for (ny, nx) in neighbours {
                    if ny < rows && nx < cols && mask[ny][nx] && !visited[ny][nx] {
                        visited[ny][nx] = true;
                        stack.push((ny, nx));
                    }
                }
            }
            boxes.push(bbox);
        }
    }
    Ok(boxes)
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Find anomalous regions in `grid`
    ///
    /// # Errors
    /// * `InvalidParameter` - negative or NaN threshold
    /// * `Stats` - empty or ragged grid
    #[instrument(skip_all, fields(rows = grid.len()))]
    pub fn detect<R: AsRef<[f64]>>(&self, grid: &[R]) -> Result<AnomalyReport, AnalysisError> {
        let threshold = self.config.threshold;
        if !(threshold >= 0.0) {
            return Err(AnalysisError::InvalidParameter {
                name: "threshold",
                reason: format!("{threshold} is not a non-negative z-score"),
            });
        }

        let (z, mean, std) = z_score_map(grid)?;
        let mask: Vec<Vec<bool>> = z.iter().map(|row| row.iter().map(|v| v.abs() > threshold).collect()).collect();
        let boxes = connected_regions(&mask)?;
        let anomalous_cells = boxes.iter().map(|b| b.cell_count).sum();

        debug!(mean, std, regions = boxes.len(), anomalous_cells, "anomaly scan");

        Ok(AnomalyReport { threshold, mean, std, boxes, anomalous_cells })
    }
}
