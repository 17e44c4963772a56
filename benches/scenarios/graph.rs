//! Benchmarks for the full signal chain.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use labsynth::{
    graph::node::{GraphNode, RenderCtx},
    keymap::KEYMAP,
    patch::presets::PresetBank,
    synth::{
        assembler::SignalGraph,
        message::Command,
        renderer::{RenderClock, Renderer},
        voice::VoiceController,
    },
    EngineConfig, Patch,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn held_note(patch: &Patch) -> SignalGraph {
    let mut graph = SignalGraph::new(SAMPLE_RATE, patch, &EngineConfig::default());
    let mut commands = Vec::new();
    VoiceController::default().note_on(&KEYMAP[9], patch, 0.0, &mut commands);
    for command in commands {
        graph.apply(command, 0.0);
    }
    graph
}

pub fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/graph");
    let presets = PresetBank::factory();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let block_sec = size as f64 / SAMPLE_RATE as f64;

        // init: saw, no modulation, no effects - baseline cost of the chain
        // wobble: sub on, LFO sweeping the cutoff, shaper and delay active
        for name in ["init", "wobble"] {
            let patch = presets.get(name).copied().unwrap_or_default();
            let mut graph = held_note(&patch);
            let mut t = 0.0;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    graph.render_block(black_box(&mut buffer), &RenderCtx::new(SAMPLE_RATE, t));
                    t += block_sec;
                })
            });
        }
    }

    group.finish();
}

pub fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/renderer");
    let patch = Patch::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let block_sec = size as f64 / SAMPLE_RATE as f64;

        // A new note every block: command drain, voice steal, envelope reschedule
        let graph = SignalGraph::new(SAMPLE_RATE, &patch, &EngineConfig::default());
        let mut renderer = Renderer::new(graph, VecDeque::<Command>::new(), RenderClock::new());
        let mut voice = VoiceController::default();
        let mut step = 0usize;

        group.bench_with_input(BenchmarkId::new("note_per_block", size), &size, |b, _| {
            b.iter(|| {
                let now = renderer.frame() as f64 / SAMPLE_RATE as f64 + block_sec;
                let note = &KEYMAP[step % KEYMAP.len()];
                voice.note_on(note, &patch, now, renderer.commands_mut());
                step += 1;
                renderer.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
