use rtrb::{Producer, PushError};

use crate::graph::node::{GraphNode, RenderCtx};

/// Read-only tap feeding a visualizer on another thread.
///
/// Copies every sample it sees into a ring buffer and leaves the signal
/// untouched. When the ring is full the rest of the block is dropped: the
/// audio thread never waits on a slow reader.
pub struct ProbeTap {
    tx: Producer<f32>,
}

impl ProbeTap {
    pub fn new(tx: Producer<f32>) -> Self {
        Self { tx }
    }
}

impl GraphNode for ProbeTap {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        // Push block to the reader, non-blocking (drop on overflow)
        for &s in out.iter() {
            if let Err(PushError::Full(_)) = self.tx.push(s) {
                break;
            }
        }
    }
}
