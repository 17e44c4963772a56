//! Keyboard handling and the main loop

use std::{
    collections::HashMap,
    io::stdout,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use labsynth::{keymap, CpalHost, Engine, HostStatus};
use log::info;
use ratatui::DefaultTerminal;

use crate::ui::{self, View};

/// Without key release events, a note ends this long after its last
/// auto-repeat.
const RELEASE_FALLBACK: Duration = Duration::from_millis(350);

const FRAME: Duration = Duration::from_millis(16);

pub struct App {
    engine: Engine<CpalHost>,
    /// Whether the terminal reports key releases.
    key_releases: bool,
    /// Held note keys and when each was last seen.
    held: HashMap<char, Instant>,
    scope: Vec<f32>,
    spectrum: Vec<(f64, f64)>,
    message: String,
    should_quit: bool,
}

impl App {
    pub fn new() -> EyreResult<Self> {
        let key_releases = supports_keyboard_enhancement().unwrap_or(false);
        if key_releases {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        info!("key release events: {key_releases}");

        Ok(Self {
            engine: Engine::new(CpalHost::new()),
            key_releases,
            held: HashMap::new(),
            scope: Vec::new(),
            spectrum: Vec::new(),
            message: String::from("play with a w s e d f t g y h u j k"),
            should_quit: false,
        })
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.expire_held_notes();
            self.engine.flush();
            self.poll_probe();

            terminal.draw(|frame| {
                ui::render(
                    frame,
                    &View {
                        patch: self.engine.patch(),
                        voice: self.engine.voice_state(),
                        status: self.engine.status(),
                        sample_rate: self.engine.sample_rate(),
                        scope: &self.scope,
                        spectrum: &self.spectrum,
                        message: &self.message,
                    },
                )
            })?;

            if event::poll(FRAME)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        if self.key_releases {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        Ok(())
    }

    fn poll_probe(&mut self) {
        if let Some(probe) = self.engine.probe_mut() {
            self.scope.clear();
            self.scope.extend_from_slice(probe.time_domain());
            self.spectrum.clear();
            self.spectrum.extend_from_slice(probe.frequency_domain());
        }
    }

    fn expire_held_notes(&mut self) {
        if self.key_releases {
            return;
        }
        let now = Instant::now();
        let expired: Vec<char> = self
            .held
            .iter()
            .filter(|(_, seen)| now.duration_since(**seen) > RELEASE_FALLBACK)
            .map(|(&key, _)| key)
            .collect();
        for key in expired {
            self.held.remove(&key);
            self.engine.note_off(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(c) = key.code {
            if keymap::lookup(c).is_some() {
                self.handle_note(c, key.kind);
                return;
            }
        }

        if key.kind != KeyEventKind::Press {
            return;
        }

        let patch = *self.engine.patch();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                let name = self.engine.presets().names().nth(index);
                if let Some(name) = name {
                    self.engine.apply_preset(name);
                    self.message = format!("preset {name}");
                }
            }
            KeyCode::Char('r') => {
                self.engine.randomize();
                self.message = String::from("randomized");
            }
            KeyCode::Char('z') => {
                let next = patch.waveform.next();
                self.engine.set_oscillator_type(next);
                self.message = format!("waveform {}", next.name());
            }
            KeyCode::Char('x') => self.engine.set_sub_osc_enabled(!patch.sub_osc_enabled),
            KeyCode::Up => self
                .engine
                .set_filter_cutoff((patch.modulation.filter_cutoff_hz * 1.12).min(20_000.0)),
            KeyCode::Down => self
                .engine
                .set_filter_cutoff((patch.modulation.filter_cutoff_hz / 1.12).max(20.0)),
            KeyCode::Right => self
                .engine
                .set_filter_resonance(patch.modulation.filter_resonance_q + 0.5),
            KeyCode::Left => self
                .engine
                .set_filter_resonance((patch.modulation.filter_resonance_q - 0.5).max(0.1)),
            KeyCode::Char(']') => self
                .engine
                .set_distortion_amount(patch.effects.distortion_amount + 5.0),
            KeyCode::Char('[') => self
                .engine
                .set_distortion_amount(patch.effects.distortion_amount - 5.0),
            KeyCode::Char('.') => self.engine.set_delay_mix(patch.effects.delay_mix + 0.1),
            KeyCode::Char(',') => self.engine.set_delay_mix(patch.effects.delay_mix - 0.1),
            KeyCode::Char('=') => self.engine.set_glide_time(patch.glide_time_sec + 0.05),
            KeyCode::Char('-') => self.engine.set_glide_time((patch.glide_time_sec - 0.05).max(0.0)),
            KeyCode::Char('l') => self.engine.set_lfo_depth(patch.modulation.lfo_depth_hz + 100.0),
            KeyCode::Char('L') => self
                .engine
                .set_lfo_depth((patch.modulation.lfo_depth_hz - 100.0).max(0.0)),
            KeyCode::Char('\'') => self.engine.set_lfo_rate(patch.modulation.lfo_rate_hz * 1.25),
            KeyCode::Char(';') => self.engine.set_lfo_rate(patch.modulation.lfo_rate_hz / 1.25),
            KeyCode::Char(' ') => match self.engine.status() {
                HostStatus::Running => {
                    self.engine.suspend();
                    self.message = String::from("suspended");
                }
                HostStatus::Suspended => {
                    self.engine.resume();
                    self.message = String::from("resumed");
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_note(&mut self, c: char, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held.insert(c, Instant::now());
                self.engine.note_on(c);
                if self.engine.status() == HostStatus::Unavailable {
                    self.message = String::from("no audio output, see labsynth.log");
                }
            }
            KeyEventKind::Release => {
                self.held.remove(&c);
                self.engine.note_off(c);
            }
        }
    }
}
