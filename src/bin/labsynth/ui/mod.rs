//! TUI module for labsynth
//!
//! Layout, top to bottom: patch panel, oscilloscope, spectrum, keyboard,
//! help bar.

mod keyboard;
mod panel;
mod spectrum;
mod waveform;

use labsynth::{HostStatus, Patch, VoiceState};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use keyboard::render_keyboard;
use panel::render_panel;
use spectrum::render_spectrum;
use waveform::render_waveform;

/// Everything one frame needs, borrowed from the app.
pub struct View<'a> {
    pub patch: &'a Patch,
    pub voice: &'a VoiceState,
    pub status: HostStatus,
    pub sample_rate: Option<f32>,
    pub scope: &'a [f32],
    pub spectrum: &'a [(f64, f64)],
    pub message: &'a str,
}

pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),  // Patch panel
            Constraint::Min(8),     // Waveform
            Constraint::Length(10), // Spectrum
            Constraint::Length(4),  // Keyboard
            Constraint::Length(1),  // Help bar
        ])
        .split(frame.area());

    render_panel(frame, chunks[0], view);
    render_waveform(frame, chunks[1], view.scope);
    render_spectrum(frame, chunks[2], view.spectrum);
    render_keyboard(frame, chunks[3], view.voice);

    let help = Paragraph::new(
        " [1-7] Preset  [R] Random  [Z] Wave  [X] Sub  [↑↓] Cutoff  [←→] Q  \
         [[ ]] Drive  [, .] Delay  [- =] Glide  [L/l ; '] LFO  [Space] Pause  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
