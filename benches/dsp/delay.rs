//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use labsynth::dsp::delay::DelayLine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Test with different delay times (in samples)
    let delay_times: &[f32] = &[
        480.5,    // ~10ms at 48kHz
        4_800.25, // ~100ms at 48kHz
        48_000.0, // 1 second at 48kHz
    ];

    for &size in BLOCK_SIZES {
        // Generate a test signal
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let delay_ms = delay_samples / 48.0;

            // Read-modify-write with feedback, fractional read
            let mut delay = DelayLine::new(SAMPLE_RATE);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("feedback_{}ms", delay_ms as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        for sample in buffer.iter_mut() {
                            let wet = delay.read(black_box(delay_samples));
                            delay.write(*sample + wet * 0.5);
                            *sample += wet;
                        }
                        black_box(&buffer);
                    })
                },
            );
        }
    }

    group.finish();
}
