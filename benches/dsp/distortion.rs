//! Benchmarks for the waveshaper curve.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use labsynth::dsp::distortion::{ShaperCurve, CURVE_RESOLUTION};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    // Curve construction happens on the control thread on every knob move
    group.bench_function("build_curve", |b| {
        b.iter(|| ShaperCurve::new(black_box(60.0), CURVE_RESOLUTION))
    });

    let curve = ShaperCurve::new(60.0, CURVE_RESOLUTION);
    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.05).sin() * 0.8)
            .collect();
        let mut buffer = input.clone();

        group.bench_with_input(BenchmarkId::new("shape", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                curve.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
