//! dB ↔ linear conversion
//!
//! Zero power maps to `-∞`; negative or NaN power maps to NaN and is never
//! clamped to zero.

/// `10·log10(power / reference)`
pub fn power_to_db(power: f64, reference: f64) -> f64 {
    if power.is_nan() || power < 0.0 {
        f64::NAN
    } else if power == 0.0 {
        f64::NEG_INFINITY
    } else {
        10.0 * (power / reference).log10()
    }
}

/// `reference · 10^(db/10)`
pub fn db_to_power(db: f64, reference: f64) -> f64 {
    reference * 10f64.powf(db / 10.0)
}

/// `20·log10(amplitude / reference)`
pub fn amplitude_to_db(amplitude: f64, reference: f64) -> f64 {
    if amplitude.is_nan() || amplitude < 0.0 {
        f64::NAN
    } else if amplitude == 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * (amplitude / reference).log10()
    }
}

/// `reference · 10^(db/20)`
pub fn db_to_amplitude(db: f64, reference: f64) -> f64 {
    reference * 10f64.powf(db / 20.0)
}

pub fn powers_to_db(powers: &[f64], reference: f64) -> Vec<f64> {
    powers.iter().map(|&p| power_to_db(p, reference)).collect()
}

pub fn db_to_powers(dbs: &[f64], reference: f64) -> Vec<f64> {
    dbs.iter().map(|&d| db_to_power(d, reference)).collect()
}
