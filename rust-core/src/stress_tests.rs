//! Stress testing for the window selection pipeline.
//!
//! These tests push long traces, many wave groups and pathological sample
//! values through the full pipeline. They only check that selection
//! terminates without panicking and that the output invariants hold.

use std::f64::consts::PI;

use chrono::{TimeZone, Utc};

use crate::config::Config;
use crate::selector::select_windows;
use crate::types::{EventSource, Trace, Window};

fn trace(data: Vec<f64>, delta: f64) -> Trace {
    Trace::new(data, delta, Utc.with_ymd_and_hms(2005, 3, 28, 16, 9, 36).unwrap())
}

/// Gaussian wave groups every `spacing` seconds at 1 Hz, the first one close
/// enough to the start that the STA/LTA curve never sits flat.
fn wave_train(len: usize, spacing: usize, lag: f64, scale: f64) -> Vec<f64> {
    sampled_wave_train(len, 1.0, spacing as f64, lag, scale)
}

fn sampled_wave_train(len: usize, dt: f64, spacing: f64, lag: f64, scale: f64) -> Vec<f64> {
    let groups = (len as f64 * dt / spacing) as usize + 1;
    (0..len)
        .map(|i| {
            let t = i as f64 * dt - lag;
            (0..groups)
                .map(|k| {
                    let center = 80.0 + k as f64 * spacing;
                    let amplitude = scale * (0.5 + 0.25 * (k % 3) as f64);
                    let x = t - center;
                    amplitude * (-(x / 30.0).powi(2)).exp() * (2.0 * PI * x / 20.0).cos()
                })
                .sum::<f64>()
        })
        .collect()
}

fn assert_invariants(windows: &[Window], config: &Config, len: usize) {
    for w in windows {
        assert!(w.left < w.right && w.right <= len);
        assert!(w.max_cc_value >= config.cc_acceptance_level && w.max_cc_value <= 1.0 + 1e-12);
        assert!(w.dlna.is_finite());
    }
    for pair in windows.windows(2) {
        assert!(pair[0].left < pair[1].left);
        assert!(pair[0].right <= pair[1].left);
    }
}

fn run(observed: &Trace, synthetic: &Trace, config: &Config) -> Vec<Window> {
    select_windows(observed, synthetic, config, EventSource::default(), None)
        .unwrap()
        .windows
}

// ============================================================================
// CATEGORY 1: LONG TRACES
// ============================================================================

/// One hour at 1 Hz with a wave group every 250 s.
#[test]
fn stress_one_hour_wave_train() {
    let len = 3600;
    let observed = trace(wave_train(len, 250, 1.0, 0.8), 1.0);
    let synthetic = trace(wave_train(len, 250, 0.0, 1.0), 1.0);
    let config = Config::new(10.0, 40.0).unwrap();

    let windows = run(&observed, &synthetic, &config);
    assert!(!windows.is_empty(), "must select windows on a clean wave train");
    assert_invariants(&windows, &config, len);
    assert!(windows.iter().all(|w| w.cc_shift == 1));
}

/// 20 Hz sampling: shifts and lengths are counted in samples, not seconds.
#[test]
fn stress_high_sample_rate() {
    let len = 12_000;
    let observed = trace(sampled_wave_train(len, 0.05, 150.0, 1.5, 1.0), 0.05);
    let synthetic = trace(sampled_wave_train(len, 0.05, 150.0, 0.0, 1.0), 0.05);
    let config = Config::new(10.0, 40.0).unwrap();

    let windows = run(&observed, &synthetic, &config);
    assert!(!windows.is_empty());
    assert_invariants(&windows, &config, len);
    for w in &windows {
        assert_eq!(w.cc_shift, 30);
        assert!((w.cc_shift_in_seconds() - 1.5).abs() < 1e-9);
    }
}

// ============================================================================
// CATEGORY 2: PATHOLOGICAL SAMPLE VALUES
// ============================================================================

#[test]
fn stress_all_zero_traces() {
    let zeros = trace(vec![0.0; 2000], 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    assert!(run(&zeros, &zeros, &config).is_empty());
}

#[test]
fn stress_zero_observed_against_signal() {
    let observed = trace(vec![0.0; 1500], 1.0);
    let synthetic = trace(wave_train(1500, 300, 0.0, 1.0), 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    // No energy in the observed trace: every candidate scores -1.
    assert!(run(&observed, &synthetic, &config).is_empty());
}

#[test]
fn stress_constant_traces() {
    let constant = trace(vec![3.5; 400], 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    let windows = run(&constant, &constant, &config);
    assert_invariants(&windows, &config, 400);
}

#[test]
fn stress_glitch_in_observed() {
    let mut data = wave_train(1500, 300, 0.0, 1.0);
    data[700] = 1e6;
    let observed = trace(data, 1.0);
    let synthetic = trace(wave_train(1500, 300, 0.0, 1.0), 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    let windows = run(&observed, &synthetic, &config);
    assert_invariants(&windows, &config, 1500);
    // A window holding the glitch is dominated by it.
    assert!(windows.iter().all(|w| !(w.left..w.right).contains(&700)));
}

#[test]
fn stress_huge_amplitudes() {
    let observed = trace(wave_train(1200, 300, 0.0, 1e150), 1.0);
    let synthetic = trace(wave_train(1200, 300, 0.0, 1e150), 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    let windows = run(&observed, &synthetic, &config);
    assert!(!windows.is_empty());
    assert_invariants(&windows, &config, 1200);
    assert!(windows.iter().all(|w| (w.max_cc_value - 1.0).abs() < 1e-9));
}

#[test]
fn stress_tiny_amplitudes() {
    let observed = trace(wave_train(1200, 300, 0.0, 1e-150), 1.0);
    let synthetic = trace(wave_train(1200, 300, 0.0, 1e-150), 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    // The long-term average never clears its floor, so nothing is picked.
    assert!(run(&observed, &synthetic, &config).is_empty());
}

#[test]
fn stress_polarity_flip() {
    let observed = trace(wave_train(1500, 300, 0.0, -1.0), 1.0);
    let synthetic = trace(wave_train(1500, 300, 0.0, 1.0), 1.0);
    let config = Config::new(10.0, 40.0).unwrap();
    // Anti-correlated at zero lag; the best lag sits half a period away.
    let windows = run(&observed, &synthetic, &config);
    assert_invariants(&windows, &config, 1500);
    assert!(windows.iter().all(|w| w.cc_shift != 0));
}

// ============================================================================
// CATEGORY 3: DEGENERATE SHAPES
// ============================================================================

#[test]
fn stress_very_short_traces() {
    let config = Config::new(10.0, 40.0).unwrap();
    for len in 1..8 {
        let data: Vec<f64> = (0..len).map(|i| (i as f64).sin()).collect();
        let t = trace(data, 1.0);
        assert!(run(&t, &t, &config).is_empty(), "len {len}");
    }
}

#[test]
fn stress_shift_range_longer_than_trace() {
    let observed = trace(wave_train(300, 150, 3.0, 1.0), 1.0);
    let synthetic = trace(wave_train(300, 150, 0.0, 1.0), 1.0);
    let config = Config::builder(10.0, 40.0)
        .tshift_acceptance_level(1000.0)
        .build()
        .unwrap();
    let windows = run(&observed, &synthetic, &config);
    assert_invariants(&windows, &config, 300);
}

#[test]
fn stress_permissive_configuration() {
    let len = 1500;
    let observed = trace(wave_train(len, 120, 2.0, 1.1), 1.0);
    let synthetic = trace(wave_train(len, 120, 0.0, 1.0), 1.0);
    let config = Config::builder(10.0, 40.0)
        .coefficients([0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0])
        .cc_acceptance_level(-1.0)
        .dlna_acceptance_level(100.0)
        .build()
        .unwrap();
    let windows = run(&observed, &synthetic, &config);
    assert!(!windows.is_empty());
    assert_invariants(&windows, &config, len);
}
