//! Random patch generation.
//!
//! Every field is drawn on its own from its declared range in
//! [`ranges`](crate::patch::ranges). No field looks at any other: a
//! screaming resonance with a three-second release is a valid result, and
//! finding combinations like that is the point of the button.

use rand::Rng;

use crate::patch::{
    ranges, EffectParameters, EnvelopeParameters, ModulationParameters, Patch, Waveform,
};
use std::ops::RangeInclusive;

#[inline]
fn draw<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f32>) -> f32 {
    rng.random_range(range)
}

/// Frequencies feel linear on a log scale, so cutoff is drawn in octaves.
fn draw_log<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f32>) -> f32 {
    let (lo, hi) = (range.start().ln(), range.end().ln());
    rng.random_range(lo..=hi)
        .exp()
        .clamp(*range.start(), *range.end())
}

pub fn random_patch<R: Rng + ?Sized>(rng: &mut R) -> Patch {
    let waveform = Waveform::ALL[rng.random_range(0..Waveform::ALL.len())];

    Patch {
        waveform,
        sub_osc_enabled: rng.random_bool(0.5),
        envelope: EnvelopeParameters {
            attack_sec: draw(rng, ranges::ATTACK_SEC),
            decay_sec: draw(rng, ranges::DECAY_SEC),
            sustain_ratio: draw(rng, ranges::SUSTAIN_RATIO),
            release_sec: draw(rng, ranges::RELEASE_SEC),
        },
        modulation: ModulationParameters {
            filter_cutoff_hz: draw_log(rng, ranges::FILTER_CUTOFF_HZ),
            filter_resonance_q: draw(rng, ranges::FILTER_RESONANCE_Q),
            lfo_rate_hz: draw(rng, ranges::LFO_RATE_HZ),
            lfo_depth_hz: draw(rng, ranges::LFO_DEPTH_HZ),
        },
        effects: EffectParameters {
            distortion_amount: draw(rng, ranges::DISTORTION_AMOUNT),
            delay_time_sec: draw(rng, ranges::DELAY_TIME_SEC),
            delay_feedback: draw(rng, ranges::DELAY_FEEDBACK),
            delay_mix: draw(rng, ranges::DELAY_MIX),
        },
        glide_time_sec: draw(rng, ranges::GLIDE_TIME_SEC),
    }
}
