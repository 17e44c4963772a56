use crate::dsp::{oscillator::OscillatorBlock, param::Param};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::patch::Waveform;
use crate::MAX_BLOCK_SIZE;

/*
Audio Oscillator Slot
=====================

An oscillator is the fundamental sound source in a synthesizer. It generates
a repeating waveform at a specific frequency (pitch), producing the raw
audio material that gets shaped by the envelope, shaper, filter and delay.

Waveforms and their character:

  Sawtooth   Bright, buzzy. All harmonics, falling off as 1/n.
  Square     Hollow, woody. Odd harmonics only, 1/n.
  Sine       Pure. Fundamental only.
  Triangle   Soft. Odd harmonics, falling off as 1/n².

Slots and Lifetimes
-------------------

The graph owns a fixed pool of `OscNode` slots, allocated once. A slot is
either free or bound to an `OscId` handed out by the voice controller:

           start(id, at)                 stop(at)
    free ────────────────→ scheduled ─────────────→ stopping ──→ free
                           (silent until `at`)     (silent from `at` on)

Start and stop times are honoured to the sample. A voice steal stops the old
slot and starts the new one at the SAME instant, so there is never a sample
where both play.

Frequency is a `Param`, so a glide is a `Target` event on the slot that is
already playing. The slot, its phase, and its id all stay the same.
*/

/// Opaque handle to a live oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OscId(pub u32);

pub struct OscNode {
    osc: OscillatorBlock,
    id: Option<OscId>,
    frequency: Param,
    level: f32,
    start_at: f64,
    stop_at: f64,
    sounded: Option<OscId>,
    freq_buf: Vec<f32>,
}

impl OscNode {
    /// An unbound slot.
    pub fn idle() -> Self {
        Self {
            osc: OscillatorBlock::new(Waveform::default()),
            id: None,
            frequency: Param::new(440.0),
            level: 0.0,
            start_at: f64::INFINITY,
            stop_at: f64::INFINITY,
            sounded: None,
            freq_buf: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Bind the slot to `id` and begin sounding at `at`.
    pub fn start(&mut self, id: OscId, waveform: Waveform, frequency: f32, level: f32, at: f64) {
        self.osc.set_waveform(waveform);
        self.osc.reset();
        self.id = Some(id);
        self.frequency.reset(frequency, at);
        self.level = level;
        self.start_at = at;
        self.stop_at = f64::INFINITY;
        self.sounded = None;
    }

    /// Stop at `at`. An earlier stop wins over a later one.
    pub fn stop(&mut self, at: f64) {
        self.stop_at = self.stop_at.min(at);
    }

    pub fn id(&self) -> Option<OscId> {
        self.id
    }

    pub fn is_free(&self) -> bool {
        self.id.is_none()
    }

    pub fn stop_at(&self) -> Option<f64> {
        self.stop_at.is_finite().then_some(self.stop_at)
    }

    /// Id that produced output during the last rendered block, if any.
    /// Still set when the slot freed itself at the end of that block.
    pub fn sounded(&self) -> Option<OscId> {
        self.sounded
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.osc.set_waveform(waveform);
    }

    pub fn frequency_mut(&mut self) -> &mut Param {
        &mut self.frequency
    }

    /// Scheduled frequency at `t`.
    pub fn frequency_at(&self, t: f64) -> f32 {
        self.frequency.value_at(t)
    }

    fn release(&mut self) {
        self.id = None;
        self.start_at = f64::INFINITY;
        self.stop_at = f64::INFINITY;
        self.frequency.reset(440.0, 0.0);
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.sounded = None;
        if self.id.is_none() {
            out.fill(0.0);
            return;
        }

        let len = out.len().min(MAX_BLOCK_SIZE);
        let freqs = &mut self.freq_buf[..len];
        self.frequency.render(freqs, ctx.time, ctx.sample_rate);

        for (i, sample) in out.iter_mut().enumerate().take(len) {
            let t = ctx.sample_time(i);
            *sample = if t >= self.start_at && t < self.stop_at {
                self.sounded = self.id;
                self.osc.next_sample(freqs[i], ctx.sample_rate) * self.level
            } else {
                0.0
            };
        }

        if ctx.end_time(len) >= self.stop_at {
            self.release();
        }
    }

    fn is_active(&self) -> bool {
        self.id.is_some()
    }
}
