use crate::dsp::distortion::ShaperCurve;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Shaper Node
===========

Runs the signal through a `ShaperCurve`. The curve itself is never edited in
place: a new one is built elsewhere and handed over with `swap`, which
returns the old curve so the caller can dispose of it off the audio thread.

Amount 0 is an exact pass-through, so the node skips the lookup entirely.
*/

pub struct ShaperNode {
    curve: ShaperCurve,
}

impl ShaperNode {
    pub fn new(curve: ShaperCurve) -> Self {
        Self { curve }
    }

    /// Install `curve` and hand back the one it replaces.
    pub fn swap(&mut self, curve: ShaperCurve) -> ShaperCurve {
        std::mem::replace(&mut self.curve, curve)
    }

    pub fn amount(&self) -> f32 {
        self.curve.amount()
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        if self.curve.amount() == 0.0 {
            return;
        }
        self.curve.render(out);
    }
}
