//! Benchmarks for the state-variable low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use labsynth::dsp::filter::{Coefficients, SVFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed cutoff: coefficients computed once per block
        let mut filter = SVFilter::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), 1_000.0, 4.0, SAMPLE_RATE);
            })
        });

        // Swept cutoff: coefficients recomputed every sample, as under LFO
        let mut filter = SVFilter::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_swept", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let cutoff = 500.0 + 2.0 * i as f32;
                    let coeffs = Coefficients::new(cutoff, 4.0, SAMPLE_RATE);
                    *sample = filter.next_sample(*sample, coeffs);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
