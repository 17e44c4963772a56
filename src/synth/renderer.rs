use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer};

use crate::{
    dsp::distortion::ShaperCurve,
    graph::node::{GraphNode, RenderCtx},
    synth::{
        assembler::SignalGraph,
        message::{Command, CommandReceiver},
    },
    MAX_BLOCK_SIZE,
};

/// Frames rendered so far, shared between the render and control threads.
#[derive(Debug, Clone, Default)]
pub struct RenderClock {
    frames: Arc<AtomicU64>,
}

impl RenderClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Seconds rendered at `sample_rate`.
    pub fn seconds(&self, sample_rate: f32) -> f64 {
        self.frames() as f64 / sample_rate as f64
    }

    pub(crate) fn publish(&self, frames: u64) {
        self.frames.store(frames, Ordering::Release);
    }
}

/// Render-thread half of the engine.
///
/// Owns the signal graph. Each block it drains pending commands, hands any
/// replaced shaper curve back to the control thread, renders, and publishes
/// the new frame count.
pub struct Renderer<R: CommandReceiver = Consumer<Command>> {
    graph: SignalGraph,
    commands: R,
    retired: Option<Producer<ShaperCurve>>,
    clock: RenderClock,
    frame: u64,
}

impl<R: CommandReceiver> Renderer<R> {
    pub fn new(graph: SignalGraph, commands: R, clock: RenderClock) -> Self {
        clock.publish(0);
        Self {
            graph,
            commands,
            retired: None,
            clock,
            frame: 0,
        }
    }

    /// Send replaced shaper curves to `retired` instead of dropping them here.
    pub fn with_retired(mut self, retired: Producer<ShaperCurve>) -> Self {
        self.retired = Some(retired);
        self
    }

    /// Fill `out` with mono samples, any length.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(block);
        }
    }

    fn render_block(&mut self, block: &mut [f32]) {
        let ctx = RenderCtx::at_frame(self.graph.sample_rate(), self.frame);

        while let Some(command) = self.commands.pop() {
            if let Some(old) = self.graph.apply(command, ctx.time) {
                self.retire(old);
            }
        }

        self.graph.render_block(block, &ctx);

        self.frame += block.len() as u64;
        self.clock.publish(self.frame);
    }

    fn retire(&mut self, curve: ShaperCurve) {
        if let Some(tx) = self.retired.as_mut() {
            // The engine caps curves in flight at capacity, so this never fills.
            let returned = tx.push(curve).is_ok();
            debug_assert!(returned, "shaper curve return ring overflowed");
        }
    }

    /// The receiving end of the command queue. Offline drivers can push into
    /// it directly when it is also a [`CommandSink`](crate::synth::message::CommandSink).
    pub fn commands_mut(&mut self) -> &mut R {
        &mut self.commands
    }

    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn clock(&self) -> &RenderClock {
        &self.clock
    }
}
