use crate::{
    dsp::param::{Automation, AutomationEvent},
    patch::EnvelopeParameters,
    MIN_TIME,
};

/*
ADSR Envelope Schedules
=======================

The envelope does not run its own per-sample state machine. It turns a note
event into a short list of automation operations for the amplitude `Param`,
and the param timeline does the per-sample work on the rendering thread.

Vocabulary
----------

  peak        Highest level the attack reaches. A fixed headroom (0.3) so a
              distorted, resonant patch still leaves room before clipping.

  sustain     Level held while the key is down, as a ratio of peak.

  floor       Where release aims. Release is an exponential curve, and an
              exponential curve can never reach zero, so it aims at a tiny
              positive value instead.


The Shape
---------

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
   S·pk │   ╱               ╲
        │  ╱                 ╲_
  floor └─╱────────────────────‾‾──→ Time
        Attack Decay  Sustain  Release
        linear linear  (held)  exponential

Attack and decay are LINEAR ramps (the "pluck"); release is EXPONENTIAL (the
"settle"). Mixing the two is deliberate: each phase keeps the curve that
gives the instrument its character.


Schedules
---------

Attack at t0:

    hold(t0)
    linear → peak             arriving t0 + attack
    linear → sustain · peak   arriving t0 + attack + decay

Release at t1:

    hold(t1)                  captures whatever level is sounding now
    exponential → floor       arriving t1 + release

Both schedules start with a hold. Without it, a new attack would queue
behind the old decay ramps and start from a level that was only planned,
not the level that is actually playing. That mismatch is the classic source
of envelope clicks.
*/

/// Default peak amplitude of the envelope.
pub const PEAK_LEVEL: f32 = 0.3;

/// Release target. Never zero so the exponential ramp stays defined.
pub const RELEASE_FLOOR: f32 = 1.0e-4;

/// A release schedule plus the time the tail reaches the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseSchedule {
    pub steps: [Automation; 2],
    pub end: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvelopeGenerator {
    peak: f32,
    floor: f32,
}

impl EnvelopeGenerator {
    pub fn new() -> Self {
        Self {
            peak: PEAK_LEVEL,
            floor: RELEASE_FLOOR,
        }
    }

    pub fn with_levels(peak: f32, floor: f32) -> Self {
        Self {
            peak: peak.max(0.0),
            floor: floor.max(f32::MIN_POSITIVE),
        }
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Attack + decay ramps starting at `t0`.
    pub fn attack(&self, params: &EnvelopeParameters, t0: f64) -> [Automation; 3] {
        let peak_at = t0 + f64::from(params.attack_sec.max(MIN_TIME));
        let sustain_at = peak_at + f64::from(params.decay_sec.max(MIN_TIME));
        let sustain_level = self.peak * params.sustain_ratio.clamp(0.0, 1.0);

        [
            Automation::CancelAndHold { at: t0 },
            Automation::Schedule(AutomationEvent::linear(self.peak, peak_at)),
            Automation::Schedule(AutomationEvent::linear(sustain_level, sustain_at)),
        ]
    }

    /// Release tail starting at `t1` from whatever level is sounding.
    pub fn release(&self, params: &EnvelopeParameters, t1: f64) -> ReleaseSchedule {
        let end = t1 + f64::from(params.release_sec.max(MIN_TIME));

        ReleaseSchedule {
            steps: [
                Automation::CancelAndHold { at: t1 },
                Automation::Schedule(AutomationEvent::exponential(self.floor, end)),
            ],
            end,
        }
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
