use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::shared::DisplayState;

use super::grid::draw_step_grid;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                              // transport header
            Constraint::Length(state.rows.len() as u16 + 3),    // grid + ruler + border
            Constraint::Length(1),                              // status / prompt
            Constraint::Min(0),
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_step_grid(frame, sections[1], state);
    draw_status(frame, sections[2], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let transport = if state.playing {
        Span::styled("▶ PLAY", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("■ STOP", Style::default().fg(Color::DarkGray))
    };
    let name = state.pattern_name.as_deref().unwrap_or("untitled");

    let line = Line::from(vec![
        transport,
        Span::raw(format!("   {} bpm", state.bpm)),
        Span::raw(format!("   {} steps", state.step_count)),
        Span::raw(format!("   master {:>3}%", (state.master_volume * 100.0).round() as u32)),
        Span::styled(format!("   [{}]", name), Style::default().fg(Color::Cyan)),
    ]);
    let header = Paragraph::new(line).block(Block::bordered().title(" beatgrid "));
    frame.render_widget(header, area);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let line = match &state.prompt {
        Some(text) => Line::from(vec![
            Span::styled("save as: ", Style::default().fg(Color::Yellow)),
            Span::raw(text.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        None => Line::from(Span::styled(state.status.clone(), Style::default().fg(Color::Gray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}
