//! Patch and engine status

use labsynth::HostStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:>10} "), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

pub fn render_panel(frame: &mut Frame, area: Rect, view: &View) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let p = view.patch;
    let env = &p.envelope;
    let m = &p.modulation;
    let fx = &p.effects;

    let (status, color) = match view.status {
        HostStatus::Dormant => ("waiting", Color::DarkGray),
        HostStatus::Running => ("running", Color::Green),
        HostStatus::Suspended => ("paused", Color::Yellow),
        HostStatus::Unavailable => ("no audio", Color::Red),
    };
    let note = view
        .voice
        .current_note
        .map_or("-", |n| n.note_name);

    let engine = vec![
        Line::from(Span::styled(
            status,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        field(
            "rate",
            view.sample_rate
                .map_or_else(|| String::from("-"), |sr| format!("{sr} Hz")),
        ),
        field("note", note.to_string()),
        Line::from(Span::styled(view.message, Style::default().fg(Color::Cyan))),
    ];

    let oscillator = vec![
        field("wave", p.waveform.name().to_string()),
        field("sub", if p.sub_osc_enabled { "on" } else { "off" }.to_string()),
        field("glide", format!("{:.2} s", p.glide_time_sec)),
        field("drive", format!("{:.0}", fx.distortion_amount)),
    ];

    let envelope = vec![
        field("attack", format!("{:.3} s", env.attack_sec)),
        field("decay", format!("{:.3} s", env.decay_sec)),
        field("sustain", format!("{:.2}", env.sustain_ratio)),
        field("release", format!("{:.3} s", env.release_sec)),
    ];

    let modulation = vec![
        field("cutoff", format!("{:.0} Hz", m.filter_cutoff_hz)),
        field("Q", format!("{:.2}", m.filter_resonance_q)),
        field(
            "lfo",
            format!("{:.2} Hz / {:.0} Hz", m.lfo_rate_hz, m.lfo_depth_hz),
        ),
        field(
            "delay",
            format!(
                "{:.2} s fb {:.2} mix {:.2}",
                fx.delay_time_sec, fx.delay_feedback, fx.delay_mix
            ),
        ),
    ];

    let sections = [
        (" Engine ", engine),
        (" Oscillator ", oscillator),
        (" Envelope ", envelope),
        (" Filter / FX ", modulation),
    ];
    for ((title, lines), area) in sections.into_iter().zip(columns.iter()) {
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), *area);
    }
}
