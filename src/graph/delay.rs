use crate::{
    dsp::{delay::DelayLine, param::Param},
    graph::node::{GraphNode, RenderCtx},
    patch::ranges::MAX_FEEDBACK,
    MAX_BLOCK_SIZE,
};

/*
Feedback Delay
==============

    in ──┬────────────────────────────────(+)──→ out
         │                                 ↑
         └─→(+)──→[ delay line ]──┬──→[ mix ]
             ↑                    │
             └────[ feedback ]←───┘

Every pass around the loop multiplies the echo by `feedback`. With feedback
below 1 each repeat is quieter than the last and the tail dies out. At 1 or
above the loop keeps or gains energy and the output grows without bound, so
feedback is clamped below 1 here no matter what the param says.

Time, feedback and mix are all `Param`s. Sweeping the time param while echoes
are in the line bends their pitch, the classic tape-delay warble.
*/

pub struct FeedbackDelayNode {
    line: DelayLine,
    time: Param,
    feedback: Param,
    mix: Param,
    time_buf: Vec<f32>,
    feedback_buf: Vec<f32>,
    mix_buf: Vec<f32>,
}

impl FeedbackDelayNode {
    pub fn new(sample_rate: f32, time_sec: f32, feedback: f32, mix: f32) -> Self {
        Self {
            line: DelayLine::new(sample_rate),
            time: Param::new(time_sec),
            feedback: Param::new(feedback),
            mix: Param::new(mix),
            time_buf: vec![0.0; MAX_BLOCK_SIZE],
            feedback_buf: vec![0.0; MAX_BLOCK_SIZE],
            mix_buf: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn time_mut(&mut self) -> &mut Param {
        &mut self.time
    }

    pub fn feedback_mut(&mut self) -> &mut Param {
        &mut self.feedback
    }

    pub fn mix_mut(&mut self) -> &mut Param {
        &mut self.mix
    }

    pub fn time_at(&self, t: f64) -> f32 {
        self.time.value_at(t)
    }

    pub fn feedback_at(&self, t: f64) -> f32 {
        self.feedback.value_at(t)
    }

    pub fn mix_at(&self, t: f64) -> f32 {
        self.mix.value_at(t)
    }
}

impl GraphNode for FeedbackDelayNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len().min(MAX_BLOCK_SIZE);
        let time = &mut self.time_buf[..len];
        let feedback = &mut self.feedback_buf[..len];
        let mix = &mut self.mix_buf[..len];
        self.time.render(time, ctx.time, ctx.sample_rate);
        self.feedback.render(feedback, ctx.time, ctx.sample_rate);
        self.mix.render(mix, ctx.time, ctx.sample_rate);

        for i in 0..len {
            let dry = out[i];
            // The write below lands one sample after the newest one, so read
            // one sample short of the requested delay.
            let delay_samples = time[i] * ctx.sample_rate - 1.0;
            let echo = self.line.read(delay_samples.max(0.0));
            let gain = feedback[i].clamp(0.0, MAX_FEEDBACK);

            self.line.write(dry + echo * gain);
            out[i] = dry + echo * mix[i].clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn impulse_response(node: &mut FeedbackDelayNode, len: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; len];
        buffer[0] = 1.0;
        let mut offset = 0;
        for chunk in buffer.chunks_mut(256) {
            node.render_block(chunk, &RenderCtx::at_frame(SAMPLE_RATE, offset));
            offset += chunk.len() as u64;
        }
        buffer
    }

    #[test]
    fn echo_arrives_after_delay_time() {
        let mut node = FeedbackDelayNode::new(SAMPLE_RATE, 0.1, 0.0, 1.0);
        let out = impulse_response(&mut node, 300);

        assert_eq!(out[0], 1.0);
        assert!((out[100] - 1.0).abs() < 1e-6, "echo at 100: {}", out[100]);
        assert!(out[1..100].iter().all(|&s| s == 0.0));
        assert!(out[101..].iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn zero_mix_is_dry() {
        let mut node = FeedbackDelayNode::new(SAMPLE_RATE, 0.05, 0.5, 0.0);
        let out = impulse_response(&mut node, 200);
        assert_eq!(out[0], 1.0);
        assert!(out[1..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn repeats_decay_by_feedback() {
        let mut node = FeedbackDelayNode::new(SAMPLE_RATE, 0.1, 0.5, 1.0);
        let out = impulse_response(&mut node, 400);
        assert!((out[100] - 1.0).abs() < 1e-6);
        assert!((out[200] - 0.5).abs() < 1e-6);
        assert!((out[300] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn runaway_feedback_is_clamped() {
        let mut node = FeedbackDelayNode::new(SAMPLE_RATE, 0.01, 5.0, 1.0);
        let out = impulse_response(&mut node, 20_000);
        let tail_peak = out[19_000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 1.0, "feedback loop diverged: {tail_peak}");
    }
}
