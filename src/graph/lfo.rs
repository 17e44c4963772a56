use crate::{
    dsp::{oscillator::OscillatorBlock, param::Param},
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO is an oscillator that runs at sub-audio frequencies to modulate
parameters over time. Unlike audio oscillators (20 Hz - 20 kHz), LFOs
typically operate between 0.05 Hz - 20 Hz.

Vocabulary
----------

  control-rate    Frequencies below human hearing. These oscillators move
                  other things instead of making sound.

  depth           How far the LFO swings, in the unit of whatever it drives.
                  Here that is Hz of filter cutoff.

  bipolar         Output swings positive AND negative: -depth to +depth, so
                  the cutoff moves above and below where the knob sits.


Typical Rates
-------------

    0.05 - 0.5 Hz   Slow sweeps, evolving pads
    0.5 - 2 Hz      Classic auto-wah
    2 - 7 Hz        Wobble bass territory
    7 - 20 Hz       Fast flutter, approaching audio-rate grit


Free-Running
------------

This LFO starts when the graph is built and never resets on note events. Two
notes played a second apart hear different parts of the sweep, which keeps
repeated notes from sounding mechanical. Rate and depth are `Param`s, so
turning either knob eases into the new value instead of jumping.

Output is `sin(phase) · depth` per sample, ready to add to a cutoff.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    rate: Param,
    depth: Param,
    rate_buf: Vec<f32>,
    depth_buf: Vec<f32>,
}

impl LfoNode {
    pub fn sine(rate_hz: f32, depth_hz: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            rate: Param::new(rate_hz),
            depth: Param::new(depth_hz),
            rate_buf: vec![0.0; MAX_BLOCK_SIZE],
            depth_buf: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn rate_mut(&mut self) -> &mut Param {
        &mut self.rate
    }

    pub fn depth_mut(&mut self) -> &mut Param {
        &mut self.depth
    }

    pub fn rate_at(&self, t: f64) -> f32 {
        self.rate.value_at(t)
    }

    pub fn depth_at(&self, t: f64) -> f32 {
        self.depth.value_at(t)
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len().min(MAX_BLOCK_SIZE);
        let rate = &mut self.rate_buf[..len];
        let depth = &mut self.depth_buf[..len];
        self.rate.render(rate, ctx.time, ctx.sample_rate);
        self.depth.render(depth, ctx.time, ctx.sample_rate);

        for i in 0..len {
            out[i] = self.osc.next_sample(rate[i].max(0.0), ctx.sample_rate) * depth[i];
        }
    }
}
