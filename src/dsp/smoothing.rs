//! Moving average
//!
//! Non-finite samples inside a window are excluded from both the sum and the
//! divisor; a window with no finite sample yields NaN.

use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// How the window is completed past the ends of the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Padding {
    /// Mirror about the edge sample without repeating it: `c b | a b c`
    #[default]
    Reflect,
    /// Only in-range samples contribute; output keeps the input length
    Same,
}

fn reflect_index(i: isize, n: isize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m }) as usize
}

/// Centred moving average of `window` samples
///
/// Even windows take the extra sample from the left.
///
/// # Errors
/// * `InvalidParameter` - `window` is 0
pub fn moving_average(values: &[f64], window: usize, padding: Padding) -> Result<Vec<f64>, AnalysisError> {
    if window == 0 {
        return Err(AnalysisError::InvalidParameter { name: "window", reason: "must be at least 1".into() });
    }
    let n = values.len() as isize;
    let left = (window / 2) as isize;
    let right = window as isize - 1 - left;

    let averaged = (0..n)
        .map(|i| {
            let (mut sum, mut count) = (0.0, 0usize);
            for j in i - left..=i + right {
                let sample = match padding {
                    Padding::Reflect => values[reflect_index(j, n)],
                    Padding::Same if (0..n).contains(&j) => values[j as usize],
                    Padding::Same => continue,
                };
                if sample.is_finite() {
                    sum += sample;
                    count += 1;
                }
            }
            if count == 0 { f64::NAN } else { sum / count as f64 }
        })
        .collect();

    Ok(averaged)
}
