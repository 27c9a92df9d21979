//! Numerical derivative on a possibly non-uniform axis
//!
//! Interior points use the second-order central difference
//! `(h₋²·y₊ + (h₊² − h₋²)·y₀ − h₊²·y₋) / (h₊·h₋·(h₋ + h₊))`; edges use a
//! one-sided difference of the selected order.

use serde::{Deserialize, Serialize};

use super::{check_lengths, AnalysisError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeOrder {
    #[default]
    First,
    Second,
}

/// `dy/dx` at every sample
///
/// # Errors
/// * `LengthMismatch` - `x` and `y` differ in length
/// * `InsufficientData` - fewer than 2 points (3 for second-order edges)
pub fn gradient(y: &[f64], x: &[f64], edge_order: EdgeOrder) -> Result<Vec<f64>, AnalysisError> {
    check_lengths("gradient x/y", x.len(), y.len())?;
    let n = y.len();
    let needed = match edge_order {
        EdgeOrder::First => 2,
        EdgeOrder::Second => 3,
    };
    if n < needed {
        return Err(AnalysisError::InsufficientData { needed, actual: n });
    }

    let mut grad = vec![0.0; n];
    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        grad[i] = (hd * hd * y[i + 1] + (hs * hs - hd * hd) * y[i] - hs * hs * y[i - 1]) / (hs * hd * (hd + hs));
    }

    match edge_order {
        EdgeOrder::First => {
            grad[0] = (y[1] - y[0]) / (x[1] - x[0]);
            grad[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
        }
        EdgeOrder::Second => {
            let (dx1, dx2) = (x[1] - x[0], x[2] - x[1]);
            let a = -(2.0 * dx1 + dx2) / (dx1 * (dx1 + dx2));
            let b = (dx1 + dx2) / (dx1 * dx2);
            let c = -dx1 / (dx2 * (dx1 + dx2));
            grad[0] = a * y[0] + b * y[1] + c * y[2];

            let (dx1, dx2) = (x[n - 2] - x[n - 3], x[n - 1] - x[n - 2]);
            let a = dx2 / (dx1 * (dx1 + dx2));
            let b = -(dx2 + dx1) / (dx1 * dx2);
            let c = (2.0 * dx2 + dx1) / (dx2 * (dx1 + dx2));
            grad[n - 1] = a * y[n - 3] + b * y[n - 2] + c * y[n - 1];
        }
    }

    Ok(grad)
}
