//! Parameter snapshots: the full sound of the instrument as plain values.
//!
//! A [`Patch`] is what presets store and what the randomizer produces. The
//! engine never applies one in bulk; it walks the fields through the same
//! setters used for manual control.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod presets;
pub mod random;

/// Declared valid ranges for every patch field.
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const ATTACK_SEC: RangeInclusive<f32> = 0.001..=2.0;
    pub const DECAY_SEC: RangeInclusive<f32> = 0.01..=2.0;
    pub const SUSTAIN_RATIO: RangeInclusive<f32> = 0.0..=1.0;
    pub const RELEASE_SEC: RangeInclusive<f32> = 0.01..=3.0;

    pub const FILTER_CUTOFF_HZ: RangeInclusive<f32> = 20.0..=20_000.0;
    pub const FILTER_RESONANCE_Q: RangeInclusive<f32> = 0.1..=20.0;
    pub const LFO_RATE_HZ: RangeInclusive<f32> = 0.05..=20.0;
    pub const LFO_DEPTH_HZ: RangeInclusive<f32> = 0.0..=5_000.0;

    pub const DISTORTION_AMOUNT: RangeInclusive<f32> = 0.0..=100.0;
    pub const DELAY_TIME_SEC: RangeInclusive<f32> = 0.0..=2.0;
    /// Upper bound is strictly below 1 to keep the echo loop stable.
    pub const DELAY_FEEDBACK: RangeInclusive<f32> = 0.0..=MAX_FEEDBACK;
    pub const DELAY_MIX: RangeInclusive<f32> = 0.0..=1.0;

    pub const GLIDE_TIME_SEC: RangeInclusive<f32> = 0.0..=1.0;

    /// Largest feedback gain the delay accepts.
    pub const MAX_FEEDBACK: f32 = 0.99;
}

/// Map NaN to `fallback`, leave everything else alone.
#[inline]
pub(crate) fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value
    }
}

/// Clamp a magnitude that must be non-negative and finite.
#[inline]
pub(crate) fn magnitude(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Clamp into `[lo, hi]`, sending NaN to `lo`.
#[inline]
pub(crate) fn bounded(value: f32, lo: f32, hi: f32) -> f32 {
    finite_or(value, lo).clamp(lo, hi)
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sawtooth,
    Square,
    Sine,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sawtooth,
        Waveform::Square,
        Waveform::Sine,
        Waveform::Triangle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
        }
    }

    /// Next waveform in display order, wrapping around.
    pub fn next(&self) -> Waveform {
        let index = Self::ALL.iter().position(|w| w == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParameters {
    pub attack_sec: f32,
    pub decay_sec: f32,
    pub sustain_ratio: f32,
    pub release_sec: f32,
}

impl EnvelopeParameters {
    pub fn clamped(self) -> Self {
        Self {
            attack_sec: magnitude(self.attack_sec),
            decay_sec: magnitude(self.decay_sec),
            sustain_ratio: bounded(self.sustain_ratio, 0.0, 1.0),
            release_sec: magnitude(self.release_sec),
        }
    }
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self {
            attack_sec: 0.01,
            decay_sec: 0.2,
            sustain_ratio: 0.6,
            release_sec: 0.4,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationParameters {
    pub filter_cutoff_hz: f32,
    pub filter_resonance_q: f32,
    pub lfo_rate_hz: f32,
    pub lfo_depth_hz: f32,
}

impl ModulationParameters {
    /// Only non-finite and negative values are corrected here; range limits
    /// belong to whoever draws the knobs.
    pub fn clamped(self) -> Self {
        Self {
            filter_cutoff_hz: magnitude(self.filter_cutoff_hz),
            filter_resonance_q: magnitude(self.filter_resonance_q),
            lfo_rate_hz: magnitude(self.lfo_rate_hz),
            lfo_depth_hz: magnitude(self.lfo_depth_hz),
        }
    }
}

impl Default for ModulationParameters {
    fn default() -> Self {
        Self {
            filter_cutoff_hz: 2_000.0,
            filter_resonance_q: 1.0,
            lfo_rate_hz: 2.0,
            lfo_depth_hz: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    pub distortion_amount: f32,
    pub delay_time_sec: f32,
    pub delay_feedback: f32,
    pub delay_mix: f32,
}

impl EffectParameters {
    pub fn clamped(self) -> Self {
        Self {
            distortion_amount: bounded(self.distortion_amount, 0.0, 100.0),
            delay_time_sec: bounded(self.delay_time_sec, 0.0, 2.0),
            delay_feedback: bounded(self.delay_feedback, 0.0, ranges::MAX_FEEDBACK),
            delay_mix: bounded(self.delay_mix, 0.0, 1.0),
        }
    }
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            distortion_amount: 0.0,
            delay_time_sec: 0.3,
            delay_feedback: 0.3,
            delay_mix: 0.0,
        }
    }
}

/// Complete parameter set of the instrument.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Patch {
    pub waveform: Waveform,
    pub sub_osc_enabled: bool,
    pub envelope: EnvelopeParameters,
    pub modulation: ModulationParameters,
    pub effects: EffectParameters,
    pub glide_time_sec: f32,
}

impl Patch {
    pub fn clamped(self) -> Self {
        Self {
            waveform: self.waveform,
            sub_osc_enabled: self.sub_osc_enabled,
            envelope: self.envelope.clamped(),
            modulation: self.modulation.clamped(),
            effects: self.effects.clamped(),
            glide_time_sec: magnitude(self.glide_time_sec),
        }
    }

    /// True if every field lies inside [`ranges`].
    pub fn is_within_ranges(&self) -> bool {
        let env = &self.envelope;
        let m = &self.modulation;
        let fx = &self.effects;

        ranges::ATTACK_SEC.contains(&env.attack_sec)
            && ranges::DECAY_SEC.contains(&env.decay_sec)
            && ranges::SUSTAIN_RATIO.contains(&env.sustain_ratio)
            && ranges::RELEASE_SEC.contains(&env.release_sec)
            && ranges::FILTER_CUTOFF_HZ.contains(&m.filter_cutoff_hz)
            && ranges::FILTER_RESONANCE_Q.contains(&m.filter_resonance_q)
            && ranges::LFO_RATE_HZ.contains(&m.lfo_rate_hz)
            && ranges::LFO_DEPTH_HZ.contains(&m.lfo_depth_hz)
            && ranges::DISTORTION_AMOUNT.contains(&fx.distortion_amount)
            && ranges::DELAY_TIME_SEC.contains(&fx.delay_time_sec)
            && ranges::DELAY_FEEDBACK.contains(&fx.delay_feedback)
            && ranges::DELAY_MIX.contains(&fx.delay_mix)
            && ranges::GLIDE_TIME_SEC.contains(&self.glide_time_sec)
    }
}
