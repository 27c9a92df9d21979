//! Capture decoding through the public dispatcher
//!
//! Every capture type is built byte by byte and decoded with `pnm::decode`.


use num::complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustypnm::dsp::qam::QamModulation;
use rustypnm::fixed_point::FixedPointFormat;
use rustypnm::pnm::fec_summary::FecSummaryType;
use rustypnm::pnm::spectrum::SpectrumWindow;
use rustypnm::pnm::{decode, decode_many, DecodeError, PnmFile, PnmFileType};
use rustypnm::tracing_init::init_test_tracing;
use test_utils::*;

macro_rules! expect_variant {
    ($file:expr, $variant:ident) => {
        match $file {
            PnmFile::$variant(inner) => inner,
            other => panic!("expected {}, got {:?}", stringify!($variant), other.file_type()),
        }
    };
}

#[test]
fn test_rxmer_values_in_range_and_length_preserved() {
    init_test_tracing();
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for _ in 0..50 {
        let len = rng.random_range(0..2000);
        let raw: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let rxmer = expect_variant!(decode(&rxmer_capture(&raw)).unwrap(), RxMer);

        assert_eq!(rxmer.values.len(), len);
        assert_eq!(rxmer.data_length as usize, len);
        assert!(rxmer.values.iter().all(|v| (0.0..=63.5).contains(v)));
        assert_eq!(rxmer.header.capture_time, Some(CAPTURE_TIME));
        assert_eq!(rxmer.mac_address.to_string(), "00:1a:2b:3c:4d:5e");
    }
}

#[test]
fn test_histogram_scenario() {
    let bytes = CaptureBuilder::new(5)
        .raw(&CM_MAC)
        .u8(0)
        .u32(8)
        .u32(10)
        .u32(20)
        .u32(4)
        .u32(5)
        .build();
    let histogram = expect_variant!(decode(&bytes).unwrap(), Histogram);
    assert_eq!(histogram.dwell_count_values, vec![10, 20]);
    assert_eq!(histogram.hit_count_values, vec![5]);
    assert_eq!(histogram.total_hits(), 5);
}

#[test]
fn test_histogram_counter_alignment() {
    let bytes = CaptureBuilder::new(5).raw(&CM_MAC).u8(0).length_prefixed(&[0; 6]).u32(0).build();
    assert_eq!(
        decode(&bytes).unwrap_err(),
        DecodeError::Misaligned { field: "dwell_count_length", length: 6, element_size: 4 }
    );
}

#[test]
fn test_channel_estimation() {
    let coefficients = vec![Complex64::new(1.0, 0.0), Complex64::new(-0.5, 0.25), Complex64::new(0.0, -3.5)];
    let est = expect_variant!(decode(&channel_estimation_capture(&coefficients)).unwrap(), ChannelEstimation);
    assert_eq!(est.coefficients, coefficients);
    assert_eq!(est.layout.subcarrier_spacing_hz, 50_000);
    assert_eq!(est.frequencies_hz(), layout_frequencies(3));
}

#[test]
fn test_symbol_capture() {
    let samples = vec![Complex64::new(0.5, -0.5), Complex64::new(-1.0, 0.75)];
    let payload = q_encode(&samples, FixedPointFormat::signed(1, 14));
    let bytes = CaptureBuilder::new(1)
        .u8(2)
        .raw(&CM_MAC)
        .layout()
        .u32(204_800_000)
        .u16(4096)
        .length_prefixed(&payload)
        .build();

    let capture = expect_variant!(decode(&bytes).unwrap(), SymbolCapture);
    assert_eq!(capture.samples, samples);
    assert_eq!(capture.fft_length, 4096);
    assert_eq!(capture.duration_s(), Some(2.0 / 204_800_000.0));
}

#[test]
fn test_constellation_display_mer() {
    // 16-QAM points scaled to unit average energy, plus a small offset
    let scale = 1.0 / 10f64.sqrt();
    let mut rng = StdRng::seed_from_u64(3);
    let soft: Vec<Complex64> = (0..256)
        .map(|_| {
            let level = |r: &mut StdRng| [-3.0, -1.0, 1.0, 3.0][r.random_range(0..4)];
            let ideal = Complex64::new(level(&mut rng), level(&mut rng)) * scale;
            ideal + Complex64::new(rng.random_range(-0.01..0.01), rng.random_range(-0.01..0.01))
        })
        .collect();
    let payload = q_encode(&soft, FixedPointFormat::signed(2, 13));
    let bytes = CaptureBuilder::new(3)
        .u8(1)
        .raw(&CM_MAC)
        .u8(4)
        .u16(256)
        .layout()
        .length_prefixed(&payload)
        .build();

    let display = expect_variant!(decode(&bytes).unwrap(), ConstellationDisplay);
    assert_eq!(display.modulation, Some(QamModulation::Qam16));
    assert_eq!(display.soft_decisions.len(), 256);
    let mer = display.mer_db().unwrap();
    assert!(mer > 30.0 && mer < 60.0, "MER {mer}");
}

#[test]
fn test_constellation_invalid_modulation() {
    let bytes = CaptureBuilder::new(3).u8(1).raw(&CM_MAC).u8(20).u16(0).layout().u32(0).build();
    assert!(matches!(
        decode(&bytes),
        Err(DecodeError::InvalidField { field: "modulation_order", .. })
    ));
}

#[test]
fn test_pre_equalization_both_codes() {
    let coefficients = vec![Complex64::new(1.0, 0.0); 8];
    for (code, last) in [(6, false), (7, true)] {
        let pre_eq = expect_variant!(decode(&pre_eq_capture(code, &coefficients)).unwrap(), UpstreamPreEqualization);
        assert_eq!(pre_eq.is_last_update(), last);
        assert_eq!(pre_eq.cmts_mac_address.to_string(), "de:ad:be:ef:00:01");
        let taps = pre_eq.tap_metrics().unwrap();
        assert_eq!(taps.main_tap_index, 0);
    }
}

#[test]
fn test_fec_summary() {
    let bytes = CaptureBuilder::new(8)
        .u8(9)
        .raw(&CM_MAC)
        .u8(2)
        .u8(2)
        // profile 0: two intervals
        .u8(0)
        .u16(2)
        .u32(100).u32(1000).u32(10).u32(1)
        .u32(101).u32(1000).u32(0).u32(0)
        // profile 255 (NCP): no intervals
        .u8(255)
        .u16(0)
        .build();

    let fec = expect_variant!(decode(&bytes).unwrap(), FecSummary);
    assert_eq!(fec.summary_type, FecSummaryType::Interval10Min);
    assert_eq!(fec.profiles.len(), 2);
    let totals = fec.profile_totals();
    assert_eq!(totals[0].total_codewords, 2000);
    assert_eq!(totals[0].uncorrectable, 1);
    assert!(totals[1].uncorrectable_ratio.is_nan() || totals[1].uncorrectable_ratio == 0.0);
}

#[test]
fn test_fec_summary_counts_exceed_total() {
    let bytes = CaptureBuilder::new(8)
        .u8(9)
        .raw(&CM_MAC)
        .u8(3)
        .u8(1)
        .u8(0)
        .u16(1)
        .u32(100).u32(10).u32(8).u32(8)
        .build();
    assert!(matches!(decode(&bytes), Err(DecodeError::InvalidField { field: "total_codewords", .. })));
}

#[test]
fn test_spectrum_analysis() {
    let segment = CaptureBuilder::new(0)
        .u32(100_000_000)
        .u32(4_000_000)
        .u16(3)
        .u32(1_000_000)
        .u32(300_000)
        .i16(-1050)
        .i16(0)
        .i16(2500)
        .build()[10..]
        .to_vec();
    let bytes = CaptureBuilder::new(9).raw(&CM_MAC).u8(1).length_prefixed(&segment).build();

    let spectrum = expect_variant!(decode(&bytes).unwrap(), SpectrumAnalysis);
    assert_eq!(spectrum.window_function, SpectrumWindow::Hann);
    assert_eq!(spectrum.segments.len(), 1);
    assert_eq!(spectrum.segments[0].amplitudes_db, vec![-10.5, 0.0, 25.0]);
    let combined = spectrum.combined();
    assert_eq!(combined[0], (98_000_000.0, -10.5));
}

#[test]
fn test_structural_errors_are_raised() {
    // Declared length larger than the buffer
    let bytes = CaptureBuilder::new(4).u8(1).raw(&CM_MAC).layout().u32(10).raw(&[1, 2]).build();
    assert!(matches!(decode(&bytes), Err(DecodeError::TruncatedData { .. })));

    // Trailing bytes
    let mut bytes = rxmer_capture(&[1, 2, 3]);
    bytes.push(0);
    assert!(matches!(decode(&bytes), Err(DecodeError::LengthMismatch { .. })));

    // Complex payload not a whole number of samples
    let bytes = CaptureBuilder::new(2).u8(1).raw(&CM_MAC).layout().length_prefixed(&[0; 6]).build();
    assert!(matches!(decode(&bytes), Err(DecodeError::ComplexStream { .. })));

    // Known type with an unknown version
    let bytes = CaptureBuilder::with_version(4, 2, 0).build();
    assert!(matches!(decode(&bytes), Err(DecodeError::UnsupportedType { version: 2, .. })));

    // Bad magic
    assert!(matches!(decode(b"XYZ\x04\x01\x00\x00\x00\x00\x00"), Err(DecodeError::Format { .. })));
}

#[test]
fn test_type_mismatch_names_both_tags() {
    let err = rustypnm::pnm::RxMer::from_bytes(&histogram_capture(&[1], &[])).unwrap_err();
    assert_eq!(
        err,
        DecodeError::TypeMismatch { expected: PnmFileType::RxMerPerSubcarrier, actual: PnmFileType::Histogram }
    );
    let message = err.to_string();
    assert!(message.contains("PNN4") && message.contains("PNN5"), "{message}");
}

#[test]
fn test_decode_many_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(11);
    let buffers: Vec<Vec<u8>> = (0..64)
        .map(|i| {
            if i % 7 == 0 {
                vec![b'P'; i % 10]
            } else {
                let raw: Vec<u8> = (0..rng.random_range(1..300)).map(|_| rng.random()).collect();
                rxmer_capture(&raw)
            }
        })
        .collect();

    let parallel = decode_many(&buffers);
    let sequential: Vec<_> = buffers.iter().map(|b| decode(b)).collect();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_json_output_shape() {
    let file = decode(&rxmer_capture(&[160, 0xFF])).unwrap();
    let value = serde_json::to_value(&file).unwrap();
    assert_eq!(value["type"], "rx_mer");
    assert_eq!(value["capture"]["mac_address"], "00:1a:2b:3c:4d:5e");
    assert_eq!(value["capture"]["values"][0], 40.0);
    assert_eq!(value["capture"]["header"]["capture_time"], CAPTURE_TIME);
}

#[test]
fn test_unknown_file_type_tag_is_format_error() {
    init_test_tracing();

    for code in [0u8, 10, 42, 77, 255] {
        let bytes = CaptureBuilder::new(code).u8(1).raw(&CM_MAC).build();
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Format { .. }), "code {code}: {err:?}");
    }
    let results = decode_many(&[CaptureBuilder::new(42).build(), histogram_capture(&[1], &[2])]);
    assert!(matches!(results[0], Err(DecodeError::Format { .. })));
    assert!(results[1].is_ok());
}
