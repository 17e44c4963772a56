use crate::{
    dsp::param::Param,
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Voltage-controlled amplifier: multiplies the signal by an automated gain.
///
/// The envelope never touches samples directly. It schedules events on this
/// node's gain `Param`, and the node applies them per sample.
pub struct AmpNode {
    gain: Param,
    last_gain: f32,
    temp_buffer: Vec<f32>,
}

impl AmpNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: Param::new(gain),
            last_gain: gain,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn gain_mut(&mut self) -> &mut Param {
        &mut self.gain
    }

    pub fn gain_at(&self, t: f64) -> f32 {
        self.gain.value_at(t)
    }

    /// Gain applied to the last sample rendered.
    pub fn last_gain(&self) -> f32 {
        self.last_gain
    }
}

impl GraphNode for AmpNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len().min(MAX_BLOCK_SIZE);
        if len == 0 {
            return;
        }

        // Slice temp buffer to match output size (RT-safe, no allocation)
        let frames = &mut self.temp_buffer[..len];
        self.gain.render(frames, ctx.time, ctx.sample_rate);

        for (o, g) in out.iter_mut().zip(frames.iter()) {
            *o *= *g;
        }
        self.last_gain = frames[len - 1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::param::AutomationEvent;

    #[test]
    fn gain_follows_schedule() {
        let mut amp = AmpNode::new(0.0);
        amp.gain_mut().cancel_and_hold(0.0);
        amp.gain_mut().schedule(AutomationEvent::linear(1.0, 0.01));

        let ctx = RenderCtx::at_frame(1_000.0, 0);
        let mut out = vec![1.0; 20];
        amp.render_block(&mut out, &ctx);

        assert_eq!(out[0], 0.0);
        assert!((out[5] - 0.5).abs() < 1e-5);
        assert!((out[15] - 1.0).abs() < 1e-6);
        assert!((amp.last_gain() - 1.0).abs() < 1e-6);
    }
}
