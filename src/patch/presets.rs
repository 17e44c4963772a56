//! Named factory patches.
//!
//! Each preset is a starting point, not a finished sound. Study the numbers
//! to see how a handful of parameters produces very different instruments:
//!
//! - `init`    plain sawtooth, filter half open, no effects
//! - `bass`    square + sub-octave, dark filter, snappy envelope
//! - `lead`    bright sawtooth with a touch of glide and echo
//! - `pad`     slow attack and release, gentle filter sweep, wet delay
//! - `pluck`   triangle, zero sustain, fast decay
//! - `acid`    resonant sawtooth with drive and a quick LFO
//! - `wobble`  deep, slow LFO on a resonant filter

use crate::patch::{EffectParameters, EnvelopeParameters, ModulationParameters, Patch, Waveform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub patch: Patch,
}

const fn patch(
    waveform: Waveform,
    sub_osc_enabled: bool,
    envelope: (f32, f32, f32, f32),
    modulation: (f32, f32, f32, f32),
    effects: (f32, f32, f32, f32),
    glide_time_sec: f32,
) -> Patch {
    Patch {
        waveform,
        sub_osc_enabled,
        envelope: EnvelopeParameters {
            attack_sec: envelope.0,
            decay_sec: envelope.1,
            sustain_ratio: envelope.2,
            release_sec: envelope.3,
        },
        modulation: ModulationParameters {
            filter_cutoff_hz: modulation.0,
            filter_resonance_q: modulation.1,
            lfo_rate_hz: modulation.2,
            lfo_depth_hz: modulation.3,
        },
        effects: EffectParameters {
            distortion_amount: effects.0,
            delay_time_sec: effects.1,
            delay_feedback: effects.2,
            delay_mix: effects.3,
        },
        glide_time_sec,
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "init",
        patch: patch(
            Waveform::Sawtooth,
            false,
            (0.01, 0.2, 0.6, 0.4),
            (2_000.0, 1.0, 2.0, 0.0),
            (0.0, 0.3, 0.3, 0.0),
            0.0,
        ),
    },
    Preset {
        name: "bass",
        patch: patch(
            Waveform::Square,
            true,
            (0.01, 0.1, 0.7, 0.15),
            (500.0, 2.0, 0.5, 0.0),
            (10.0, 0.25, 0.2, 0.0),
            0.0,
        ),
    },
    Preset {
        name: "lead",
        patch: patch(
            Waveform::Sawtooth,
            false,
            (0.01, 0.1, 0.6, 0.2),
            (2_500.0, 3.0, 5.0, 150.0),
            (5.0, 0.35, 0.35, 0.25),
            0.06,
        ),
    },
    Preset {
        name: "pad",
        patch: patch(
            Waveform::Sawtooth,
            false,
            (0.3, 0.1, 0.8, 0.5),
            (2_500.0, 0.8, 0.3, 600.0),
            (0.0, 0.5, 0.5, 0.45),
            0.0,
        ),
    },
    Preset {
        name: "pluck",
        patch: patch(
            Waveform::Triangle,
            false,
            (0.001, 0.15, 0.0, 0.1),
            (4_000.0, 1.5, 2.0, 0.0),
            (0.0, 0.18, 0.4, 0.3),
            0.0,
        ),
    },
    Preset {
        name: "acid",
        patch: patch(
            Waveform::Sawtooth,
            false,
            (0.005, 0.25, 0.3, 0.12),
            (800.0, 12.0, 6.0, 500.0),
            (40.0, 0.375, 0.45, 0.3),
            0.08,
        ),
    },
    Preset {
        name: "wobble",
        patch: patch(
            Waveform::Square,
            true,
            (0.02, 0.3, 0.9, 0.3),
            (900.0, 8.0, 1.5, 800.0),
            (20.0, 0.5, 0.3, 0.2),
            0.0,
        ),
    },
];

/// Lookup table over [`PRESETS`].
#[derive(Debug, Clone, Copy)]
pub struct PresetBank {
    presets: &'static [Preset],
}

impl PresetBank {
    pub fn factory() -> Self {
        Self { presets: PRESETS }
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&Patch> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| &p.patch)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.presets.iter().map(|p| p.name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetBank {
    fn default() -> Self {
        Self::factory()
    }
}
