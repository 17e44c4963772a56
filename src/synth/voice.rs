use log::debug;

use crate::{
    dsp::{
        envelope::EnvelopeGenerator,
        param::{Automation, AutomationEvent},
    },
    keymap::NoteEntry,
    patch::{Patch, Waveform},
    synth::message::{dispatch, Command, CommandSink, OscId, ParamId},
};

/*
Voice Controller
================

One voice, driven by note events from the control thread. All decisions are
made here; the render thread only sees the timed commands that result.

    Idle ──note_on──→ Sounding ──note_off(current)──→ Idle
                        │  ↑
                        └──┘ note_on(other): steal or glide

Stealing (glide = 0)
--------------------

      amp  ──────╮
                  ╲  anti-click fade
                   ╲_______╱‾‾‾ attack of the new note
                   ↑
         old oscillators stop, new ones start, same instant

The old oscillators stop at exactly the instant the new ones start, so two
voices never sound together. A note-on from Idle while the last release tail
is still audible gets the same treatment, since the amplitude control is
shared.

Until a fade reaches zero, the schedule behind it belongs to the fade. A
release or another steal arriving inside that window holds at the silent
boundary instead of at `now`, so the ramp to zero is never cut short:

      amp  ──────╮
                  ╲
                   ╲___________   release or next steal starts here
                   ↑
                 boundary

Gliding (glide > 0)
-------------------

The playing oscillators stay. Their frequency approaches the new pitch with
time constant glide/3, so about 95% of the distance is covered after the
glide time. The envelope is not retriggered.
*/

/// Level of the sub-oscillator relative to the main one.
pub const SUB_LEVEL: f32 = 0.5;

const SUB_WAVEFORM: Waveform = Waveform::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoicePhase {
    #[default]
    Idle,
    Sounding,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoiceState {
    pub phase: VoicePhase,
    pub current_note: Option<NoteEntry>,
    pub oscillator: Option<OscId>,
    pub sub_oscillator: Option<OscId>,
}

/// Oscillators of a released note that have not reached the floor yet.
#[derive(Debug, Clone, Copy)]
struct ReleaseTail {
    ends_at: f64,
    oscillators: [Option<OscId>; 2],
}

pub struct VoiceController {
    envelope: EnvelopeGenerator,
    anti_click_sec: f64,
    state: VoiceState,
    tail: Option<ReleaseTail>,
    /// End of the last anti-click fade. Amplitude is zero there.
    fade_until: f64,
    next_id: u32,
}

impl VoiceController {
    pub fn new(envelope: EnvelopeGenerator, anti_click_sec: f32) -> Self {
        Self {
            envelope,
            anti_click_sec: f64::from(anti_click_sec.max(0.0)),
            state: VoiceState::default(),
            tail: None,
            fade_until: f64::NEG_INFINITY,
            next_id: 0,
        }
    }

    pub fn state(&self) -> &VoiceState {
        &self.state
    }

    pub fn anti_click_sec(&self) -> f64 {
        self.anti_click_sec
    }

    pub fn is_sounding(&self) -> bool {
        self.state.phase == VoicePhase::Sounding
    }

    /// Returns false when the event changed nothing.
    pub fn note_on<S: CommandSink + ?Sized>(
        &mut self,
        note: &NoteEntry,
        patch: &Patch,
        now: f64,
        sink: &mut S,
    ) -> bool {
        match self.state.current_note {
            Some(current) if current.key_id == note.key_id => false,
            Some(_) if patch.glide_time_sec > 0.0 => {
                self.glide(note, patch.glide_time_sec, now, sink);
                true
            }
            Some(_) => {
                let start = self.fade_out(now, sink);
                self.stop_current(start, sink);
                self.begin(note, patch, start, sink);
                true
            }
            None => {
                let start = match self.tail.take() {
                    Some(tail) if tail.ends_at > now => {
                        let start = self.fade_out(now, sink);
                        for id in tail.oscillators.into_iter().flatten() {
                            dispatch(sink, Command::StopOscillator { id, at: start });
                        }
                        start
                    }
                    _ => now,
                };
                self.begin(note, patch, start, sink);
                true
            }
        }
    }

    /// Release `note` if it is the one sounding.
    pub fn note_off<S: CommandSink + ?Sized>(
        &mut self,
        note: &NoteEntry,
        patch: &Patch,
        now: f64,
        sink: &mut S,
    ) -> bool {
        match self.state.current_note {
            Some(current) if current.key_id == note.key_id => {}
            _ => return false,
        }

        let from = now.max(self.fade_until);
        let release = self.envelope.release(&patch.envelope.clamped(), from);
        for op in release.steps {
            dispatch(sink, Command::automate(ParamId::Amplitude, op));
        }
        self.stop_current(release.end, sink);

        self.tail = Some(ReleaseTail {
            ends_at: release.end,
            oscillators: [self.state.oscillator, self.state.sub_oscillator],
        });
        debug!("release {} until {:.3}s", note.note_name, release.end);
        self.state = VoiceState::default();
        true
    }

    fn begin<S: CommandSink + ?Sized>(
        &mut self,
        note: &NoteEntry,
        patch: &Patch,
        start: f64,
        sink: &mut S,
    ) {
        let frequency = note.frequency_hz;
        let oscillator = self.start_oscillator(patch.waveform, frequency, 1.0, start, sink);
        let sub_oscillator = patch.sub_osc_enabled.then(|| {
            self.start_oscillator(SUB_WAVEFORM, frequency / 2.0, SUB_LEVEL, start, sink)
        });

        for op in self.envelope.attack(&patch.envelope.clamped(), start) {
            dispatch(sink, Command::automate(ParamId::Amplitude, op));
        }

        debug!("attack {} at {:.3}s", note.note_name, start);
        self.state = VoiceState {
            phase: VoicePhase::Sounding,
            current_note: Some(*note),
            oscillator: Some(oscillator),
            sub_oscillator,
        };
    }

    fn glide<S: CommandSink + ?Sized>(&mut self, note: &NoteEntry, glide_sec: f32, now: f64, sink: &mut S) {
        let tau = glide_sec / 3.0;
        let targets = [
            (self.state.oscillator, note.frequency_hz),
            (self.state.sub_oscillator, note.frequency_hz / 2.0),
        ];

        for (id, frequency) in targets {
            let Some(id) = id else { continue };
            let param = ParamId::Frequency(id);
            dispatch(sink, Command::automate(param, Automation::CancelAndHold { at: now }));
            dispatch(
                sink,
                Command::automate(
                    param,
                    Automation::Schedule(AutomationEvent::target(frequency, now, tau)),
                ),
            );
        }

        debug!("glide to {} over {glide_sec:.3}s", note.note_name);
        self.state.current_note = Some(*note);
    }

    /// Hold the amplitude at `now` and ramp it to zero. Returns when the
    /// ramp ends. Inside a fade already under way, cuts back to its end.
    fn fade_out<S: CommandSink + ?Sized>(&mut self, now: f64, sink: &mut S) -> f64 {
        if now < self.fade_until {
            dispatch(
                sink,
                Command::automate(
                    ParamId::Amplitude,
                    Automation::CancelAndHold { at: self.fade_until },
                ),
            );
            return self.fade_until;
        }

        let end = now + self.anti_click_sec;
        dispatch(
            sink,
            Command::automate(ParamId::Amplitude, Automation::CancelAndHold { at: now }),
        );
        dispatch(
            sink,
            Command::automate(
                ParamId::Amplitude,
                Automation::Schedule(AutomationEvent::linear(0.0, end)),
            ),
        );
        self.fade_until = end;
        end
    }

    fn stop_current<S: CommandSink + ?Sized>(&self, at: f64, sink: &mut S) {
        for id in [self.state.oscillator, self.state.sub_oscillator]
            .into_iter()
            .flatten()
        {
            dispatch(sink, Command::StopOscillator { id, at });
        }
    }

    fn start_oscillator<S: CommandSink + ?Sized>(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        level: f32,
        at: f64,
        sink: &mut S,
    ) -> OscId {
        let id = OscId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        dispatch(
            sink,
            Command::StartOscillator {
                id,
                waveform,
                frequency,
                level,
                at,
            },
        );
        id
    }
}

impl Default for VoiceController {
    fn default() -> Self {
        Self::new(EnvelopeGenerator::new(), 0.01)
    }
}
