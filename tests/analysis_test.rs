//! Analysis properties over synthetic and decoded data


use num::complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rustypnm::dsp::qam::{AxisOrder, CodeWordLut, QamModulation};
use rustypnm::dsp::{GroupDelay, GroupDelayConfig, LinearRegression1D};
use rustypnm::echo::{IfftEchoConfig, IfftEchoDetector, PhaseSlopeConfig};
use rustypnm::fixed_point::{decode_scalar, encode_scalar, FixedPointFormat};
use rustypnm::pnm::{decode, PnmFile};
use rustypnm::stats::{MinAvgMax, SignalStatistics};
use rustypnm::tracing_init::init_test_tracing;
use rustypnm::{AnomalyConfig, AnomalyDetector};
use test_utils::*;

#[test]
fn test_fixed_point_round_trip_random() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let integer_bits = rng.random_range(0..8u8);
        let fractional_bits = rng.random_range(1..24u8);
        let fmt = FixedPointFormat::signed(integer_bits, fractional_bits);
        for _ in 0..50 {
            let v = rng.random_range(fmt.min_value()..=fmt.max_value());
            let decoded = decode_scalar(encode_scalar(v, fmt).unwrap(), fmt);
            assert!((decoded - v).abs() <= fmt.resolution(), "{v} in {fmt:?} -> {decoded}");
        }
    }
}

#[test]
fn test_group_delay_constant_for_any_delay_and_spacing() {
    init_test_tracing();
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..20 {
        let spacing = [25e3, 50e3, 100e3][rng.random_range(0..3)];
        // Keep the per-bin phase step below π so unwrapping is unambiguous
        let tau = rng.random_range(10e-9..0.45 / spacing);
        let freqs: Vec<f64> = (0..512).map(|i| 400e6 + i as f64 * spacing).collect();
        let response = delayed_response(&freqs, tau);

        let result = GroupDelay::new(GroupDelayConfig::default()).compute(&freqs, &response, None).unwrap();
        for &d in &result.group_delay_s[1..511] {
            assert!((d - tau).abs() < 2e-9, "tau {tau} spacing {spacing}: {d}");
        }
    }
}

#[test]
fn test_regression_recovers_random_lines() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let m = rng.random_range(-50.0..50.0);
        let b = rng.random_range(-100.0..100.0);
        let n = rng.random_range(2..200);
        let x: Vec<f64> = (0..n).map(|i| i as f64 * rng.random_range(0.5..1.5) + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| m * v + b).collect();

        let fit = LinearRegression1D::fit(&x, &y).unwrap();
        assert!((fit.slope - m).abs() < 1e-8);
        assert!((fit.intercept - b).abs() < 1e-6);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!(fit.rmse < 1e-8);
    }
}

#[test]
fn test_ifft_echo_property() {
    init_test_tracing();
    let mut rng = StdRng::seed_from_u64(4);
    let config = IfftEchoConfig { window: rustypnm::dsp::window::Window::Rectangular, ..IfftEchoConfig::default() };
    let detector = IfftEchoDetector::new(config);

    for _ in 0..25 {
        let n = 1 << rng.random_range(8..12);
        let d = rng.random_range(8..n / 2);
        let a = rng.random_range(0.15..0.9);
        let echo = detector.detect(&multipath_response(n, 1.0, &[(d, a)]), 50e3).unwrap();
        assert!(echo.bin_index.abs_diff(d) <= 1, "n {n} d {d}: {}", echo.bin_index);
        assert!((echo.amplitude_ratio - a).abs() < 1e-6);
    }
}

#[test]
fn test_rectangular_lut_adjacency_all_orders() {
    for modulation in QamModulation::ALL.iter().copied().filter(|m| m.bits_per_symbol() <= 12) {
        for order in [AxisOrder::IFirst, AxisOrder::QFirst] {
            let lut = CodeWordLut::rectangular_with_order(modulation, order);
            let points = lut.points();
            // Neighbours one step right and one step up
            for (codeword, p) in points.iter().enumerate() {
                for step in [Complex64::new(2.0, 0.0), Complex64::new(0.0, 2.0)] {
                    if let Some(neighbour) = lut.codeword(p + step) {
                        assert_eq!((codeword as u32 ^ neighbour).count_ones(), 1, "{modulation:?} {order:?} at {p}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_min_avg_max_ordering_random() {
    let mut rng = StdRng::seed_from_u64(5);
    let normal = Normal::new(35.0, 4.0).unwrap();
    for _ in 0..30 {
        let rows = rng.random_range(1..20);
        let cols = rng.random_range(1..100);
        let matrix: Vec<Vec<f64>> = (0..rows).map(|_| (0..cols).map(|_| normal.sample(&mut rng)).collect()).collect();

        let mam = MinAvgMax::new(&matrix, 2).unwrap();
        for j in 0..cols {
            assert!(mam.min_values[j] <= mam.avg_values[j] && mam.avg_values[j] <= mam.max_values[j]);
        }
    }
}

#[test]
fn test_signal_statistics_gaussian() {
    let mut rng = StdRng::seed_from_u64(6);
    let normal = Normal::new(2.0, 0.5).unwrap();
    let values: Vec<f64> = (0..50_000).map(|_| normal.sample(&mut rng)).collect();
    let stats = SignalStatistics::compute(&values).unwrap();
    assert!((stats.mean - 2.0).abs() < 0.02);
    assert!((stats.std - 0.5).abs() < 0.02);
    assert!(stats.skewness.abs() < 0.1);
    assert!(stats.kurtosis.abs() < 0.1);
}

#[test]
fn test_anomaly_constant_grid_any_threshold() {
    // Includes values binary floats cannot hold exactly, whose naive mean drifts
    for value in [17.25, 0.1, 0.3, 33.7, 1e-3] {
        for (rows, cols) in [(3, 10), (12, 64)] {
            let grid = vec![vec![value; cols]; rows];
            for threshold in [0.0, 0.1, 0.5, 1.0, 3.0, 10.0] {
                let report = AnomalyDetector::new(AnomalyConfig { threshold }).detect(&grid).unwrap();
                assert!(report.boxes.is_empty(), "{value} {rows}x{cols} at {threshold}: {:?}", report.boxes);
                assert_eq!(report.anomalous_cells, 0);
            }
        }
    }
}

#[test]
fn test_signal_statistics_inexact_constant_series() {
    for value in [0.1, 0.7, 1e-5, 123.456, -2.2] {
        for n in [2, 10, 999] {
            let stats = SignalStatistics::compute(&vec![value; n]).unwrap();
            assert_eq!(stats.std, 0.0, "{value} x{n}");
            assert!(stats.skewness.is_nan() && stats.kurtosis.is_nan(), "{value} x{n}: {stats:?}");
            assert_eq!(stats.peak_to_peak, 0.0);
        }
    }
}

#[test]
fn test_regression_large_x_offset() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..50 {
        let offset = rng.random_range(1e6..1e10);
        let step = rng.random_range(0.5..2.0);
        let m = rng.random_range(-50.0..50.0);
        let b = rng.random_range(-100.0..100.0);
        let x: Vec<f64> = (0..rng.random_range(3..200)).map(|i| offset + i as f64 * step).collect();
        let y: Vec<f64> = x.iter().map(|&v| m * (v - offset) + b).collect();

        let fit = LinearRegression1D::fit(&x, &y).unwrap();
        assert!((fit.slope - m).abs() < 1e-6 * m.abs().max(1.0), "offset {offset}: {} vs {m}", fit.slope);
        assert!((fit.predict(offset) - b).abs() < 1e-2);
    }

    let fit = LinearRegression1D::fit(&[1e9, 1e9 + 1.0, 1e9 + 2.0], &[1.0, 2.0, 3.0]).unwrap();
    assert!((fit.slope - 1.0).abs() < 1e-12);
}

#[test]
fn test_anomaly_finds_rxmer_notch() {
    // Ten RxMER captures, a notch over subcarriers 100..110 in captures 4..6
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.25).unwrap();
    let grid: Vec<Vec<f64>> = (0..10)
        .map(|row| {
            (0..400)
                .map(|col| {
                    let notch = (4..=6).contains(&row) && (100..110).contains(&col);
                    let base = if notch { 25.0 } else { 42.0 };
                    base + noise.sample(&mut rng)
                })
                .collect()
        })
        .collect();

    let report = AnomalyDetector::default().detect(&grid).unwrap();
    assert_eq!(report.boxes.len(), 1);
    let bbox = report.boxes[0];
    assert_eq!((bbox.row_min, bbox.row_max, bbox.col_min, bbox.col_max), (4, 6, 100, 109));
    assert_eq!(bbox.cell_count, 30);
}

#[test]
fn test_decoded_channel_estimation_pipeline() {
    init_test_tracing();
    // Echo 0.2 at bin 48 of a 1024-bin response, through the s2.13 payload
    let response = multipath_response(1024, 0.5, &[(48, 0.2)]);
    let est = match decode(&channel_estimation_capture(&response)).unwrap() {
        PnmFile::ChannelEstimation(est) => est,
        other => panic!("unexpected {:?}", other.file_type()),
    };

    let report = est.echo_report(IfftEchoConfig::default()).unwrap();
    let strongest = report.strongest().unwrap();
    assert!(strongest.bin_index.abs_diff(48) <= 1);
    assert!((strongest.amplitude_ratio - 0.2).abs() < 0.03);
    let expected_m = rustypnm::echo::one_way_distance_m(48.0 / (1024.0 * 50e3), 0.87);
    assert!((strongest.one_way_distance_m - expected_m).abs() < 3.0);

    let metrics = est.magnitude_metrics().unwrap();
    assert!(metrics.ripple_peak_to_peak_db > 1.0);
}

#[test]
fn test_decoded_delay_matches_phase_slope() {
    let freqs = layout_frequencies(256);
    let tau = 2.0e-6;
    let response = delayed_response(&freqs, tau);
    let est = match decode(&channel_estimation_capture(&response)).unwrap() {
        PnmFile::ChannelEstimation(est) => est,
        other => panic!("unexpected {:?}", other.file_type()),
    };

    let estimate = est.phase_slope_delay(PhaseSlopeConfig::default()).unwrap();
    assert!((estimate.round_trip_time_s - tau).abs() < 1e-9);

    let delay = est.group_delay(GroupDelayConfig::default()).unwrap();
    assert!((delay.mean_delay_s().unwrap() - tau).abs() < 1e-9);
}
