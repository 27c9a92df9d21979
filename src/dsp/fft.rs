//! Normalized inverse FFT

use num::complex::Complex64;
use rustfft::FftPlanner;

/// Inverse DFT of `spectrum`, scaled by `1/N` so a flat unit spectrum maps to a
/// unit impulse at bin 0
pub fn inverse_fft(spectrum: &[Complex64]) -> Vec<Complex64> {
    let n = spectrum.len();
    if n == 0 {
        return Vec::new();
    }
    let mut buffer = spectrum.to_vec();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(n).process(&mut buffer);

    let scale = 1.0 / n as f64;
    for sample in buffer.iter_mut() {
        *sample *= scale;
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_spectrum_is_impulse() {
        let taps = inverse_fft(&vec![Complex64::new(1.0, 0.0); 16]);
        assert!((taps[0] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!(taps[1..].iter().all(|t| t.norm() < 1e-12));
    }

    #[test]
    fn test_delay_lands_in_bin() {
        let n = 32;
        let spectrum: Vec<Complex64> = (0..n)
            .map(|k| Complex64::from_polar(1.0, -2.0 * std::f64::consts::PI * (k * 5) as f64 / n as f64))
            .collect();
        let taps = inverse_fft(&spectrum);
        assert!((taps[5].norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        assert!(inverse_fft(&[]).is_empty());
    }
}
