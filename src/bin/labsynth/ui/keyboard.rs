//! One-octave keyboard showing which computer key plays which note

use labsynth::{
    keymap::{KeyClass, KEYMAP},
    VoiceState,
};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Columns per white key.
const KEY_WIDTH: usize = 4;

fn row(class: KeyClass, playing: Option<char>) -> Line<'static> {
    let mut spans = Vec::new();
    let mut column = 0;

    for entry in KEYMAP.iter().filter(|e| e.key_class == class) {
        let x = (entry.visual_offset * KEY_WIDTH as f32).round() as usize;
        if x > column {
            spans.push(Span::raw(" ".repeat(x - column)));
            column = x;
        }

        let style = if playing == Some(entry.key_id) {
            Style::default().fg(Color::Black).bg(Color::LightCyan)
        } else if class == KeyClass::Black {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Black).bg(Color::Gray)
        };
        let label = format!("{:^width$}", entry.key_id, width = KEY_WIDTH - 1);
        column += label.chars().count();
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, voice: &VoiceState) {
    let playing = voice.current_note.map(|n| n.key_id);
    let lines = vec![row(KeyClass::Black, playing), row(KeyClass::White, playing)];

    let block = Block::default().title(" Keys ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
