use crate::{
    config::EngineConfig,
    dsp::{distortion::ShaperCurve, param::Param},
    graph::{
        amplify::AmpNode,
        delay::FeedbackDelayNode,
        distortion::ShaperNode,
        filter::FilterNode,
        lfo::LfoNode,
        node::{GraphNode, RenderCtx},
        oscillator::{OscId, OscNode},
        probe::ProbeTap,
    },
    patch::{Patch, Waveform},
    synth::message::{Command, ParamId},
    MAX_BLOCK_SIZE,
};

/*
Signal Graph
============

One fixed chain, built once and never rewired:

    [osc pool] ─→ (Σ) ─→ [amp] ─→ [shaper] ─→ [filter] ─┬──────────→ (+) ─→ out ─→ [probe]
                                                ↑       └─→ [delay] ──↑
                                              [lfo]

  osc pool   Fixed number of oscillator slots. The voice binds at most two
             (main + sub) at a time; the rest absorb the tails of voices
             that are fading out while a new note starts.
  amp        Amplitude stage. The envelope lives here as automation.
  shaper     Waveshaping with a swappable lookup curve.
  filter     Resonant low-pass; the LFO output is added to its cutoff.
  delay      Feedback echo; the node sums dry and wet itself.
  probe      Copies the master output to a visualizer.

Everything is allocated in `new`, on the control thread, before the graph
moves to the render thread. `apply` and `render_block` never allocate.
*/

pub struct SignalGraph {
    sample_rate: f32,
    oscillators: Vec<OscNode>,
    amp: AmpNode,
    shaper: ShaperNode,
    filter: FilterNode,
    lfo: LfoNode,
    delay: FeedbackDelayNode,
    probe: Option<ProbeTap>,
    voice_buf: Vec<f32>,
    lfo_buf: Vec<f32>,
}

impl SignalGraph {
    pub fn new(sample_rate: f32, patch: &Patch, config: &EngineConfig) -> Self {
        let patch = patch.clamped();
        let m = &patch.modulation;
        let fx = &patch.effects;

        Self {
            sample_rate,
            oscillators: (0..config.oscillator_pool.max(2))
                .map(|_| OscNode::idle())
                .collect(),
            amp: AmpNode::new(0.0),
            shaper: ShaperNode::new(ShaperCurve::new(
                fx.distortion_amount,
                config.shaper_resolution,
            )),
            filter: FilterNode::lowpass(m.filter_cutoff_hz, m.filter_resonance_q),
            lfo: LfoNode::sine(m.lfo_rate_hz, m.lfo_depth_hz),
            delay: FeedbackDelayNode::new(
                sample_rate,
                fx.delay_time_sec,
                fx.delay_feedback,
                fx.delay_mix,
            ),
            probe: None,
            voice_buf: vec![0.0; MAX_BLOCK_SIZE],
            lfo_buf: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn with_probe(mut self, probe: ProbeTap) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Carry out one command, moving its time to no earlier than `earliest`.
    ///
    /// Returns the shaper curve a `SetShaperCurve` replaced, so the caller can
    /// send it somewhere it may be freed.
    pub fn apply(&mut self, command: Command, earliest: f64) -> Option<ShaperCurve> {
        match command {
            Command::Automate { param, op } => {
                if let Some(target) = self.param_mut(param) {
                    target.apply(op.not_before(earliest));
                }
            }
            Command::StartOscillator {
                id,
                waveform,
                frequency,
                level,
                at,
            } => {
                let slot = self.free_slot();
                self.oscillators[slot].start(id, waveform, frequency, level, at.max(earliest));
            }
            Command::StopOscillator { id, at } => {
                if let Some(osc) = self.oscillator_mut(id) {
                    osc.stop(at.max(earliest));
                }
            }
            Command::SetWaveform { id, waveform } => {
                if let Some(osc) = self.oscillator_mut(id) {
                    osc.set_waveform(waveform);
                }
            }
            Command::SetShaperCurve(curve) => return Some(self.shaper.swap(curve)),
        }
        None
    }

    fn param_mut(&mut self, id: ParamId) -> Option<&mut Param> {
        match id {
            ParamId::Amplitude => Some(self.amp.gain_mut()),
            ParamId::Frequency(osc) => self.oscillator_mut(osc).map(OscNode::frequency_mut),
            ParamId::FilterCutoff => Some(self.filter.cutoff_mut()),
            ParamId::FilterResonance => Some(self.filter.resonance_mut()),
            ParamId::LfoRate => Some(self.lfo.rate_mut()),
            ParamId::LfoDepth => Some(self.lfo.depth_mut()),
            ParamId::DelayTime => Some(self.delay.time_mut()),
            ParamId::DelayFeedback => Some(self.delay.feedback_mut()),
            ParamId::DelayMix => Some(self.delay.mix_mut()),
        }
    }

    /// Scheduled value of a graph parameter at `t`.
    pub fn param_value(&self, id: ParamId, t: f64) -> Option<f32> {
        let value = match id {
            ParamId::Amplitude => self.amp.gain_at(t),
            ParamId::Frequency(osc) => self.oscillator(osc)?.frequency_at(t),
            ParamId::FilterCutoff => self.filter.cutoff_at(t),
            ParamId::FilterResonance => self.filter.resonance_at(t),
            ParamId::LfoRate => self.lfo.rate_at(t),
            ParamId::LfoDepth => self.lfo.depth_at(t),
            ParamId::DelayTime => self.delay.time_at(t),
            ParamId::DelayFeedback => self.delay.feedback_at(t),
            ParamId::DelayMix => self.delay.mix_at(t),
        };
        Some(value)
    }

    /// A free slot, or failing that the one closest to stopping.
    fn free_slot(&self) -> usize {
        if let Some(index) = self.oscillators.iter().position(OscNode::is_free) {
            return index;
        }
        self.oscillators
            .iter()
            .enumerate()
            .filter_map(|(i, osc)| osc.stop_at().map(|t| (i, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn oscillator(&self, id: OscId) -> Option<&OscNode> {
        self.oscillators.iter().find(|osc| osc.id() == Some(id))
    }

    fn oscillator_mut(&mut self, id: OscId) -> Option<&mut OscNode> {
        self.oscillators.iter_mut().find(|osc| osc.id() == Some(id))
    }

    /// Ids bound to a slot, whether or not they have started sounding.
    pub fn live_oscillators(&self) -> impl Iterator<Item = OscId> + '_ {
        self.oscillators.iter().filter_map(OscNode::id)
    }

    /// Ids that produced output during the last rendered block.
    pub fn sounding_ids(&self) -> impl Iterator<Item = OscId> + '_ {
        self.oscillators.iter().filter_map(OscNode::sounded)
    }

    /// Frequency `id` is scheduled to play at `t`.
    pub fn oscillator_frequency(&self, id: OscId, t: f64) -> Option<f32> {
        self.oscillator(id).map(|osc| osc.frequency_at(t))
    }

    pub fn oscillator_waveform(&self, id: OscId) -> Option<Waveform> {
        self.oscillator(id).map(OscNode::waveform)
    }

    /// Envelope gain on the last rendered sample.
    pub fn amplitude(&self) -> f32 {
        self.amp.last_gain()
    }

    pub fn distortion_amount(&self) -> f32 {
        self.shaper.amount()
    }
}

impl GraphNode for SignalGraph {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len().min(MAX_BLOCK_SIZE);
        let out = &mut out[..len];
        out.fill(0.0);

        let voice = &mut self.voice_buf[..len];
        for osc in self.oscillators.iter_mut() {
            // Free slots still render so their `sounded` flag clears.
            let active = osc.is_active();
            osc.render_block(voice, ctx);
            if active {
                for (o, v) in out.iter_mut().zip(voice.iter()) {
                    *o += v;
                }
            }
        }

        self.amp.render_block(out, ctx);
        self.shaper.render_block(out, ctx);

        let lfo = &mut self.lfo_buf[..len];
        self.lfo.render_block(lfo, ctx);
        self.filter.render_modulated(out, lfo, ctx);

        self.delay.render_block(out, ctx);

        if let Some(probe) = self.probe.as_mut() {
            probe.render_block(out, ctx);
        }
    }
}
