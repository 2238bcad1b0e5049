//! Benchmarks for window selection.
//!
//! Run with: cargo bench -p seiswin --bench selection_bench

use std::f64::consts::PI;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seiswin::envelope::envelope;
use seiswin::similarity::measure;
use seiswin::stalta::Picks;
use seiswin::{select_windows, Config, EventSource, Trace};

fn wave_train(len: usize, lag: f64, scale: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 - lag;
            (0..len / 250 + 1)
                .map(|k| {
                    let x = t - (80.0 + 250.0 * k as f64);
                    scale * (-(x / 30.0).powi(2)).exp() * (2.0 * PI * x / 20.0).cos()
                })
                .sum::<f64>()
        })
        .collect()
}

fn trace(data: Vec<f64>) -> Trace {
    Trace::new(data, 1.0, Utc.with_ymd_and_hms(2010, 2, 27, 6, 34, 14).unwrap())
}

// ============================================================================
// Picker Benchmarks
// ============================================================================

fn bench_picker(c: &mut Criterion) {
    let mut group = c.benchmark_group("picker");

    for len in [1_000usize, 4_000, 16_000].iter() {
        let data = wave_train(*len, 0.0, 1.0);
        group.throughput(Throughput::Elements(*len as u64));

        group.bench_with_input(BenchmarkId::new("envelope", len), len, |b, _| {
            b.iter(|| envelope(black_box(&data)))
        });

        let env = envelope(&data);
        group.bench_with_input(BenchmarkId::new("stalta_extrema", len), len, |b, _| {
            b.iter(|| Picks::from_envelope(black_box(&env), 1.0, 10.0))
        });
    }

    group.finish();
}

// ============================================================================
// Similarity Benchmarks
// ============================================================================

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");
    let observed = wave_train(4_000, 3.0, 1.2);
    let synthetic = wave_train(4_000, 0.0, 1.0);

    for max_shift in [10usize, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::new("measure", max_shift), max_shift, |b, &k| {
            b.iter(|| measure(black_box(&observed), black_box(&synthetic), 1_000, 1_400, k))
        });
    }

    group.finish();
}

// ============================================================================
// End-to-end Benchmarks
// ============================================================================

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_windows");
    let config = Config::new(10.0, 40.0).unwrap();

    for len in [1_800usize, 3_600, 7_200].iter() {
        let observed = trace(wave_train(*len, 2.0, 1.2));
        let synthetic = trace(wave_train(*len, 0.0, 1.0));
        group.throughput(Throughput::Elements(*len as u64));

        group.bench_with_input(BenchmarkId::new("wave_train", len), len, |b, _| {
            b.iter(|| {
                select_windows(
                    black_box(&observed),
                    black_box(&synthetic),
                    &config,
                    EventSource::default(),
                    None,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    name = selection_benches;
    config = Criterion::default();
    targets = bench_picker, bench_similarity, bench_selection
);

criterion_main!(selection_benches);
