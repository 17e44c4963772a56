//! Benchmarks for parameter timelines.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use labsynth::dsp::{AutomationEvent, Param};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/param");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let block_sec = size as f64 / SAMPLE_RATE as f64;

        // Static: the common case, a single fill
        let mut param = Param::new(0.5);
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| param.render(black_box(&mut buffer), 0.0, SAMPLE_RATE))
        });

        // Target approach: an exp() per sample that never finishes
        let mut param = Param::new(200.0);
        param.schedule(AutomationEvent::target(2_000.0, 0.0, 0.1));
        let mut t = 0.0;
        group.bench_with_input(BenchmarkId::new("target", size), &size, |b, _| {
            b.iter(|| {
                param.render(black_box(&mut buffer), t, SAMPLE_RATE);
                t += block_sec;
            })
        });

        // Envelope-like ramps rescheduled each block
        let mut param = Param::new(0.0);
        let mut t = 0.0;
        group.bench_with_input(BenchmarkId::new("ramps", size), &size, |b, _| {
            b.iter(|| {
                param.cancel_and_hold(t);
                param.schedule(AutomationEvent::linear(0.3, t + block_sec * 0.25));
                param.schedule(AutomationEvent::exponential(1.0e-4, t + block_sec));
                param.render(black_box(&mut buffer), t, SAMPLE_RATE);
                t += block_sec;
            })
        });
    }

    group.finish();
}
