//! Phase wrapping and unwrapping

use std::f64::consts::{PI, TAU};

/// Wrap an angle into `(-π, π]`
pub fn wrap(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}

/// Remove 2π jumps between consecutive finite samples
///
/// A jump larger than π in magnitude is treated as a wrap. Non-finite samples
/// are passed through and do not break the running correction, so unwrapping
/// continues across masked bins.
///
/// # Example
/// ```
/// use rustypnm::dsp::phase::unwrap;
///
/// let unwrapped = unwrap(&[3.0, -3.0]);
/// assert!((unwrapped[1] - (std::f64::consts::TAU - 3.0)).abs() < 1e-12);
/// ```
pub fn unwrap(phases: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phases.len());
    let mut offset = 0.0;
    let mut previous: Option<f64> = None;

    for &p in phases {
        if !p.is_finite() {
            out.push(p);
            continue;
        }
        if let Some(prev) = previous {
            let delta = p - prev;
            if delta.abs() > PI {
                // Shift by the multiple of 2π that brings delta into [-π, π]
                offset -= TAU * ((delta + PI).div_euclid(TAU));
            }
        }
        previous = Some(p);
        out.push(p + offset);
    }
    out
}
