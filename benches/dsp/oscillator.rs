//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use labsynth::{dsp::oscillator::OscillatorBlock, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine - transcendental, Sawtooth/Square - PolyBLEP, Triangle - abs
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(440.0), SAMPLE_RATE);
                })
            });
        }

        // Per-sample frequency, as during a glide
        let freqs: Vec<f32> = (0..size)
            .map(|i| 261.63 + 32.0 * i as f32 / size as f32)
            .collect();
        let mut osc = OscillatorBlock::new(Waveform::Sawtooth);
        group.bench_with_input(BenchmarkId::new("sawtooth_modulated", size), &size, |b, _| {
            b.iter(|| {
                osc.render_modulated(black_box(&mut buffer), black_box(&freqs), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
