//! Group Delay
//!
//! `τ(f) = -(1/2π) · dφ/df` over the phase of a complex frequency response.
//!
//! Bins that are inactive or carry a non-finite coefficient are dropped before
//! differentiation and reported back as NaN. A single missing bin is bridged
//! by its valid neighbours. A gap of two or more bins splits the response into
//! independent segments, each unwrapped and differentiated on its own, since
//! the phase may advance by more than π across the gap. Segments too short for
//! the selected edge order stay NaN.

use std::f64::consts::TAU;

use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::gradient::{gradient, EdgeOrder};
use super::phase::unwrap;
use super::smoothing::{moving_average, Padding};
use super::{check_lengths, AnalysisError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDelayConfig {
    /// Unwrap the phase before differentiating
    pub unwrap_phase: bool,
    pub edge_order: EdgeOrder,
    /// Odd moving-average length applied to the delay, `None` to skip
    pub smoothing_window: Option<usize>,
}

impl Default for GroupDelayConfig {
    fn default() -> Self {
        Self { unwrap_phase: true, edge_order: EdgeOrder::Second, smoothing_window: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDelayResult {
    pub frequency_hz: Vec<f64>,
    /// Group delay per bin in seconds, NaN where `valid` is false
    pub group_delay_s: Vec<f64>,
    pub valid: Vec<bool>,
}

impl GroupDelayResult {
    /// Mean delay over the valid bins
    pub fn mean_delay_s(&self) -> Option<f64> {
        let valid: Vec<f64> = self.group_delay_s.iter().copied().filter(|v| v.is_finite()).collect();
        (!valid.is_empty()).then(|| valid.iter().sum::<f64>() / valid.len() as f64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupDelay {
    config: GroupDelayConfig,
}

impl GroupDelay {
    pub fn new(config: GroupDelayConfig) -> Self {
        Self { config }
    }

    /// Group delay of `response` sampled at `frequency_hz`
    ///
    /// # Arguments
    /// * `frequency_hz` - strictly increasing frequency of each bin
    /// * `response` - complex frequency response per bin
    /// * `active` - optional per-bin mask, `false` bins are excluded
    ///
    /// # Errors
    /// * `LengthMismatch` - inputs of different lengths
    /// * `InvalidParameter` - even smoothing window or non-increasing frequencies
    /// * `InsufficientData` - too few valid bins for the selected edge order
    #[instrument(skip_all, fields(bins = response.len()))]
    pub fn compute(
        &self,
        frequency_hz: &[f64],
        response: &[Complex64],
        active: Option<&[bool]>,
    ) -> Result<GroupDelayResult, AnalysisError> {
        check_lengths("group delay frequency/response", frequency_hz.len(), response.len())?;
        if let Some(mask) = active {
            check_lengths("group delay response/mask", response.len(), mask.len())?;
        }
        if let Some(window) = self.config.smoothing_window {
            if window == 0 || window % 2 == 0 {
                return Err(AnalysisError::InvalidParameter {
                    name: "smoothing_window",
                    reason: format!("{window} is not a positive odd length"),
                });
            }
        }

        let indices: Vec<usize> = (0..response.len())
            .filter(|&i| {
                let h = response[i];
                active.map_or(true, |mask| mask[i])
                    && h.re.is_finite()
                    && h.im.is_finite()
                    && frequency_hz[i].is_finite()
            })
            .collect();

        let freqs: Vec<f64> = indices.iter().map(|&i| frequency_hz[i]).collect();
        if freqs.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(AnalysisError::InvalidParameter {
                name: "frequency_hz",
                reason: "frequencies must be strictly increasing".into(),
            });
        }

        let needed = match self.config.edge_order {
            EdgeOrder::First => 2,
            EdgeOrder::Second => 3,
        };
        let segments = segments(&indices);
        if !segments.iter().any(|seg| seg.len() >= needed) {
            let longest = segments.iter().map(|seg| seg.len()).max().unwrap_or(0);
            return Err(AnalysisError::InsufficientData { needed, actual: longest });
        }

        let mut group_delay_s = vec![f64::NAN; response.len()];
        for seg in segments.iter().filter(|seg| seg.len() >= needed) {
            let seg_freqs: Vec<f64> = seg.iter().map(|&i| frequency_hz[i]).collect();
            let mut phase: Vec<f64> = seg.iter().map(|&i| response[i].arg()).collect();
            if self.config.unwrap_phase {
                phase = unwrap(&phase);
            }

            let dphi = gradient(&phase, &seg_freqs, self.config.edge_order)?;
            let mut delay: Vec<f64> = dphi.iter().map(|d| -d / TAU).collect();
            if let Some(window) = self.config.smoothing_window {
                delay = moving_average(&delay, window, Padding::Reflect)?;
            }
            for (&i, &tau) in seg.iter().zip(&delay) {
                group_delay_s[i] = tau;
            }
        }
        let valid: Vec<bool> = group_delay_s.iter().map(|v| v.is_finite()).collect();

        debug!(
            valid_bins = valid.iter().filter(|v| **v).count(),
            segments = segments.len(),
            "computed group delay"
        );

        Ok(GroupDelayResult { frequency_hz: frequency_hz.to_vec(), group_delay_s, valid })
    }
}

/// Split usable bin indices into runs, breaking wherever two or more bins are missing
fn segments(indices: &[usize]) -> Vec<&[usize]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for k in 1..indices.len() {
        if indices[k] - indices[k - 1] > 2 {
            runs.push(&indices[start..k]);
            start = k;
        }
    }
    if start < indices.len() {
        runs.push(&indices[start..]);
    }
    runs
}
