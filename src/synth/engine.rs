use log::{debug, info, warn};
use rand::Rng;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    analysis::Probe,
    config::EngineConfig,
    dsp::{
        distortion::ShaperCurve,
        envelope::EnvelopeGenerator,
        param::{Automation, AutomationEvent},
    },
    error::HostError,
    graph::probe::ProbeTap,
    host::{AudioHost, HostStatus},
    keymap::{self, NoteEntry},
    patch::{bounded, magnitude, presets::PresetBank, random::random_patch, ranges, Patch, Waveform},
    synth::{
        assembler::SignalGraph,
        message::{dispatch, Command, OscId, ParamId},
        renderer::{RenderClock, Renderer},
        voice::{VoiceController, VoiceState},
    },
};

/*
Engine
======

The control-thread face of the synthesizer. Everything a keyboard, a knob or
a preset button does ends up here.

    control thread                          render thread
    ──────────────                          ─────────────
    Engine ──── Command ring ─────────────→ Renderer ─→ SignalGraph ─→ host
      ↑  ↑                                     │  │
      │  └──────── retired shaper curves ──────┘  │
      └─────────── probe samples ─────────────────┘
                   RenderClock (frames rendered)

Nothing is built until the first note or an explicit `start()`. Before that,
setters only edit the patch, and the graph is assembled from it when the host
comes up.

Timing: the control side never knows exactly where the render thread is. It
reads the frame clock, adds a small lookahead, and schedules there. Anything
that still arrives late is moved to the start of the block that drains it.

Queue budget: knob moves are staged, one latest value per parameter, and only
sent while the command ring keeps `VOICE_HEADROOM` slots free. A note event is
refused outright when that headroom is gone, so the voice state never moves
ahead of what the render thread was told.
*/

/// Slots kept free for one note event. A steal needs nine commands.
const VOICE_HEADROOM: usize = 16;

/// Everything that exists once the host is up.
struct Runtime {
    commands: Producer<Command>,
    retired: Consumer<ShaperCurve>,
    clock: RenderClock,
    sample_rate: f32,
    lookahead_frames: u64,
    smoothing_time_constant: f32,
    probe: Probe,
    /// Latest unsent target per smoothed parameter.
    pending_params: Vec<(ParamId, f32)>,
    pending_waveform: Option<(OscId, Waveform)>,
    /// Curves the render side holds that will come back through `retired`.
    curves_in_flight: usize,
    /// Newest curve not yet sent because the return ring could overflow.
    pending_curve: Option<ShaperCurve>,
    curve_capacity: usize,
}

impl Runtime {
    /// Render-clock time new events are scheduled at.
    fn now(&self) -> f64 {
        let frames = self.clock.frames() + self.lookahead_frames;
        frames as f64 / self.sample_rate as f64
    }

    /// True if `batch` commands fit without eating into the voice headroom.
    fn has_room(&self, batch: usize) -> bool {
        self.commands.slots() >= batch + VOICE_HEADROOM
    }

    fn stage_param(&mut self, param: ParamId, value: f32) {
        match self.pending_params.iter_mut().find(|(p, _)| *p == param) {
            Some(entry) => entry.1 = value,
            None => self.pending_params.push((param, value)),
        }
    }

    /// Free returned curves and send whatever is staged, as far as the
    /// headroom allows.
    fn pump(&mut self) {
        while self.retired.pop().is_ok() {
            self.curves_in_flight = self.curves_in_flight.saturating_sub(1);
        }

        if let Some((id, waveform)) = self.pending_waveform {
            if self.has_room(1) {
                dispatch(&mut self.commands, Command::SetWaveform { id, waveform });
                self.pending_waveform = None;
            }
        }

        let now = self.now();
        let tau = self.smoothing_time_constant;
        while !self.pending_params.is_empty() && self.has_room(2) {
            let (param, value) = self.pending_params.remove(0);
            let commands = &mut self.commands;
            dispatch(commands, Command::automate(param, Automation::CancelAndHold { at: now }));
            dispatch(
                commands,
                Command::automate(
                    param,
                    Automation::Schedule(AutomationEvent::target(value, now, tau)),
                ),
            );
        }

        if self.curves_in_flight < self.curve_capacity && self.has_room(1) {
            if let Some(curve) = self.pending_curve.take() {
                if dispatch(&mut self.commands, Command::SetShaperCurve(curve)) {
                    self.curves_in_flight += 1;
                }
            }
        }
    }
}

pub struct Engine<H: AudioHost> {
    host: H,
    config: EngineConfig,
    patch: Patch,
    presets: PresetBank,
    voice: VoiceController,
    status: HostStatus,
    runtime: Option<Runtime>,
}

impl<H: AudioHost> Engine<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    pub fn with_config(host: H, config: EngineConfig) -> Self {
        let envelope = EnvelopeGenerator::with_levels(config.peak_level, config.release_floor);
        let voice = VoiceController::new(envelope, config.anti_click_sec);

        Self {
            host,
            config,
            patch: Patch::default(),
            presets: PresetBank::factory(),
            voice,
            status: HostStatus::Dormant,
            runtime: None,
        }
    }

    /// Bring the audio side up if it is not already.
    pub fn start(&mut self) -> HostStatus {
        if self.status == HostStatus::Dormant {
            if let Err(err) = self.launch() {
                self.fail(err);
            }
        }
        self.status
    }

    fn launch(&mut self) -> Result<(), HostError> {
        let sample_rate = self.host.open()?;
        let config = &self.config;

        let (command_tx, command_rx) =
            RingBuffer::new(config.command_capacity.max(2 * VOICE_HEADROOM));
        let (curve_tx, curve_rx) = RingBuffer::new(config.curve_return_capacity.max(1));
        let (probe_tx, probe_rx) = RingBuffer::new(config.probe_capacity.max(1));
        let clock = RenderClock::new();

        let graph =
            SignalGraph::new(sample_rate, &self.patch, config).with_probe(ProbeTap::new(probe_tx));
        let renderer = Renderer::new(graph, command_rx, clock.clone()).with_retired(curve_tx);

        self.host.launch(renderer)?;

        self.runtime = Some(Runtime {
            commands: command_tx,
            retired: curve_rx,
            clock,
            sample_rate,
            lookahead_frames: config.lookahead_frames,
            smoothing_time_constant: config.smoothing_time_constant,
            probe: Probe::new(probe_rx, sample_rate),
            pending_params: Vec::new(),
            pending_waveform: None,
            curves_in_flight: 0,
            pending_curve: None,
            curve_capacity: config.curve_return_capacity.max(1),
        });
        self.status = HostStatus::Running;
        info!("engine started at {sample_rate} Hz");
        Ok(())
    }

    fn fail(&mut self, err: HostError) {
        warn!("audio host unavailable, engine disabled: {err}");
        self.status = HostStatus::Unavailable;
    }

    pub fn status(&self) -> HostStatus {
        self.status
    }

    pub fn suspend(&mut self) {
        if self.status != HostStatus::Running {
            return;
        }
        match self.host.suspend() {
            Ok(()) => self.status = HostStatus::Suspended,
            Err(err) => self.fail(err),
        }
    }

    pub fn resume(&mut self) {
        if self.status != HostStatus::Suspended {
            return;
        }
        match self.host.resume() {
            Ok(()) => {
                self.status = HostStatus::Running;
                self.flush();
            }
            Err(err) => self.fail(err),
        }
    }

    /// Send changes held back while the command ring was busy. Front ends
    /// call this once per frame.
    pub fn flush(&mut self) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.pump();
        }
    }

    fn is_disabled(&self) -> bool {
        self.status == HostStatus::Unavailable
    }

    // ---- notes -------------------------------------------------------------

    pub fn note_on(&mut self, key_id: char) {
        match keymap::lookup(key_id) {
            Some(note) => self.play_note(&note),
            None => debug!("no note bound to {key_id:?}"),
        }
    }

    pub fn note_off(&mut self, key_id: char) {
        match keymap::lookup(key_id) {
            Some(note) => self.release_note(&note),
            None => debug!("no note bound to {key_id:?}"),
        }
    }

    pub fn play_note(&mut self, note: &NoteEntry) {
        match self.start() {
            HostStatus::Running => {}
            HostStatus::Suspended => {
                debug!("suspended, ignoring {}", note.note_name);
                return;
            }
            HostStatus::Dormant | HostStatus::Unavailable => return,
        }

        let patch = self.patch;
        if let Some((runtime, now)) = schedule_point(&mut self.runtime) {
            if runtime.has_room(0) {
                self.voice.note_on(note, &patch, now, &mut runtime.commands);
            } else {
                warn!("command queue full, dropping note-on {}", note.note_name);
            }
        }
    }

    pub fn release_note(&mut self, note: &NoteEntry) {
        if self.is_disabled() {
            return;
        }
        let patch = self.patch;
        if let Some((runtime, now)) = schedule_point(&mut self.runtime) {
            if runtime.has_room(0) {
                self.voice.note_off(note, &patch, now, &mut runtime.commands);
            } else {
                warn!("command queue full, dropping note-off {}", note.note_name);
            }
        }
    }

    // ---- sound parameters --------------------------------------------------

    /// Applies to the main oscillator at once. The sub-oscillator is always a
    /// square.
    pub fn set_oscillator_type(&mut self, waveform: Waveform) {
        if self.is_disabled() {
            return;
        }
        self.patch.waveform = waveform;

        let Some(id) = self.voice.state().oscillator else {
            return;
        };
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.pending_waveform = Some((id, waveform));
            runtime.pump();
        }
    }

    /// Takes effect from the next note.
    pub fn set_sub_osc_enabled(&mut self, enabled: bool) {
        if self.is_disabled() {
            return;
        }
        self.patch.sub_osc_enabled = enabled;
    }

    /// Update any subset of the envelope. Used by the next attack or release.
    pub fn set_envelope(
        &mut self,
        attack_sec: Option<f32>,
        decay_sec: Option<f32>,
        sustain_ratio: Option<f32>,
        release_sec: Option<f32>,
    ) {
        if self.is_disabled() {
            return;
        }
        let env = &mut self.patch.envelope;
        if let Some(v) = attack_sec {
            env.attack_sec = v;
        }
        if let Some(v) = decay_sec {
            env.decay_sec = v;
        }
        if let Some(v) = sustain_ratio {
            env.sustain_ratio = v;
        }
        if let Some(v) = release_sec {
            env.release_sec = v;
        }
        *env = env.clamped();
    }

    pub fn set_filter_cutoff(&mut self, hz: f32) {
        let hz = magnitude(hz);
        self.smooth(ParamId::FilterCutoff, hz, |p| p.modulation.filter_cutoff_hz = hz);
    }

    pub fn set_filter_resonance(&mut self, q: f32) {
        let q = magnitude(q);
        self.smooth(ParamId::FilterResonance, q, |p| p.modulation.filter_resonance_q = q);
    }

    pub fn set_lfo_rate(&mut self, hz: f32) {
        let hz = magnitude(hz);
        self.smooth(ParamId::LfoRate, hz, |p| p.modulation.lfo_rate_hz = hz);
    }

    pub fn set_lfo_depth(&mut self, hz: f32) {
        let hz = magnitude(hz);
        self.smooth(ParamId::LfoDepth, hz, |p| p.modulation.lfo_depth_hz = hz);
    }

    pub fn set_delay_time(&mut self, seconds: f32) {
        let seconds = bounded(seconds, 0.0, *ranges::DELAY_TIME_SEC.end());
        self.smooth(ParamId::DelayTime, seconds, |p| p.effects.delay_time_sec = seconds);
    }

    /// Feedback of 1 or more would never decay; it is held just below.
    pub fn set_delay_feedback(&mut self, amount: f32) {
        let amount = bounded(amount, 0.0, ranges::MAX_FEEDBACK);
        self.smooth(ParamId::DelayFeedback, amount, |p| p.effects.delay_feedback = amount);
    }

    pub fn set_delay_mix(&mut self, mix: f32) {
        let mix = bounded(mix, 0.0, 1.0);
        self.smooth(ParamId::DelayMix, mix, |p| p.effects.delay_mix = mix);
    }

    /// Rebuilds the shaper curve here and swaps it in on the render thread.
    pub fn set_distortion_amount(&mut self, amount: f32) {
        if self.is_disabled() {
            return;
        }
        let amount = bounded(amount, 0.0, *ranges::DISTORTION_AMOUNT.end());
        if amount == self.patch.effects.distortion_amount {
            return;
        }
        self.patch.effects.distortion_amount = amount;

        let resolution = self.config.shaper_resolution;
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.pending_curve = Some(ShaperCurve::new(amount, resolution));
            runtime.pump();
        }
    }

    pub fn set_glide_time(&mut self, seconds: f32) {
        if self.is_disabled() {
            return;
        }
        self.patch.glide_time_sec = magnitude(seconds);
    }

    /// Record `value` in the patch and, if running, approach it smoothly.
    fn smooth(&mut self, param: ParamId, value: f32, update: impl FnOnce(&mut Patch)) {
        if self.is_disabled() {
            return;
        }
        update(&mut self.patch);

        if let Some(runtime) = self.runtime.as_mut() {
            runtime.stage_param(param, value);
            runtime.pump();
        }
    }

    // ---- patches -----------------------------------------------------------

    /// Returns false if no preset has that name.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match self.presets.get(name).copied() {
            Some(patch) => {
                debug!("preset {name}");
                self.apply_patch(&patch);
                true
            }
            None => {
                debug!("unknown preset {name:?}");
                false
            }
        }
    }

    pub fn randomize(&mut self) -> Patch {
        self.randomize_with(&mut rand::rng())
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Patch {
        let patch = random_patch(rng);
        self.apply_patch(&patch);
        patch
    }

    /// Push every field of `patch` through its setter.
    pub fn apply_patch(&mut self, patch: &Patch) {
        let env = &patch.envelope;
        let m = &patch.modulation;
        let fx = &patch.effects;

        self.set_oscillator_type(patch.waveform);
        self.set_sub_osc_enabled(patch.sub_osc_enabled);
        self.set_envelope(
            Some(env.attack_sec),
            Some(env.decay_sec),
            Some(env.sustain_ratio),
            Some(env.release_sec),
        );
        self.set_filter_cutoff(m.filter_cutoff_hz);
        self.set_filter_resonance(m.filter_resonance_q);
        self.set_lfo_rate(m.lfo_rate_hz);
        self.set_lfo_depth(m.lfo_depth_hz);
        self.set_distortion_amount(fx.distortion_amount);
        self.set_delay_time(fx.delay_time_sec);
        self.set_delay_feedback(fx.delay_feedback);
        self.set_delay_mix(fx.delay_mix);
        self.set_glide_time(patch.glide_time_sec);
    }

    // ---- inspection --------------------------------------------------------

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn presets(&self) -> &PresetBank {
        &self.presets
    }

    pub fn voice_state(&self) -> &VoiceState {
        self.voice.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.runtime.as_ref().map(|rt| rt.sample_rate)
    }

    /// Seconds the render thread has produced so far.
    pub fn render_time(&self) -> Option<f64> {
        self.runtime
            .as_ref()
            .map(|rt| rt.clock.seconds(rt.sample_rate))
    }

    pub fn probe_mut(&mut self) -> Option<&mut Probe> {
        self.runtime.as_mut().map(|rt| &mut rt.probe)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Runtime plus the time a new event should be scheduled at. Takes the field
/// rather than the engine so callers can hold the voice at the same time.
fn schedule_point(runtime: &mut Option<Runtime>) -> Option<(&mut Runtime, f64)> {
    let runtime = runtime.as_mut()?;
    runtime.pump();
    let now = runtime.now();
    Some((runtime, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OfflineHost;

    fn engine() -> Engine<OfflineHost> {
        Engine::new(OfflineHost::new(48_000.0))
    }

    #[test]
    fn setters_before_start_only_edit_the_patch() {
        let mut engine = engine();
        engine.set_filter_cutoff(800.0);
        engine.set_delay_feedback(1.5);
        engine.set_distortion_amount(30.0);

        assert_eq!(engine.status(), HostStatus::Dormant);
        assert_eq!(engine.patch().modulation.filter_cutoff_hz, 800.0);
        assert_eq!(engine.patch().effects.delay_feedback, ranges::MAX_FEEDBACK);
        assert!(engine.host().renderer().is_none());
    }

    #[test]
    fn first_note_starts_the_host() {
        let mut engine = engine();
        engine.note_on('a');
        assert_eq!(engine.status(), HostStatus::Running);
        assert_eq!(engine.sample_rate(), Some(48_000.0));
        assert!(engine.probe_mut().is_some());
    }

    #[test]
    fn unmapped_key_is_ignored() {
        let mut engine = engine();
        engine.note_on('z');
        assert_eq!(engine.status(), HostStatus::Dormant);
        assert!(engine.voice_state().current_note.is_none());
    }

    #[test]
    fn distortion_curves_never_overflow_the_return_ring() {
        let config = EngineConfig {
            curve_return_capacity: 2,
            shaper_resolution: 64,
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_config(OfflineHost::new(48_000.0), config);
        engine.start();

        for step in 1..=10 {
            engine.set_distortion_amount(step as f32 * 5.0);
        }
        let runtime = engine.runtime.as_ref().expect("started");
        assert_eq!(runtime.curves_in_flight, 2);
        assert!(runtime.pending_curve.is_some());

        let mut out = vec![0.0; 256];
        engine.host_mut().render(&mut out);
        // Any scheduling call reclaims returned curves and flushes the newest.
        engine.set_filter_cutoff(1_000.0);
        engine.host_mut().render(&mut out);

        let graph = engine.host().renderer().expect("launched").graph();
        assert_eq!(graph.distortion_amount(), 50.0);
    }

    #[test]
    fn waveform_change_reaches_the_live_oscillator() {
        let mut engine = engine();
        engine.note_on('a');
        let id = engine.voice_state().oscillator.expect("note playing");

        engine.set_oscillator_type(Waveform::Triangle);
        let mut out = vec![0.0; 256];
        engine.host_mut().render(&mut out);

        let graph = engine.host().renderer().expect("launched").graph();
        assert_eq!(graph.oscillator_waveform(id), Some(Waveform::Triangle));
    }

    #[test]
    fn staged_setters_keep_only_the_latest_value() {
        let mut engine = engine();
        engine.start();
        engine.suspend();

        for step in 0..2_000 {
            engine.set_filter_cutoff(200.0 + step as f32);
        }
        let runtime = engine.runtime.as_ref().expect("started");
        assert!(runtime.has_room(0));
        assert_eq!(runtime.pending_params, vec![(ParamId::FilterCutoff, 2_199.0)]);
    }

    #[test]
    fn unknown_preset_changes_nothing() {
        let mut engine = engine();
        let before = *engine.patch();
        assert!(!engine.apply_preset("does-not-exist"));
        assert_eq!(*engine.patch(), before);
        assert!(engine.apply_preset("Bass"));
        assert_eq!(Some(engine.patch()), engine.presets().get("bass"));
    }
}
