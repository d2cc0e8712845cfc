use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::shared::{DisplayState, RowDisplay, SoundStatus};

const LABEL_WIDTH: usize = 8;

pub fn draw_step_grid(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut lines = Vec::with_capacity(state.rows.len() + 1);
    lines.push(step_ruler(state));
    for (row_idx, row) in state.rows.iter().enumerate() {
        lines.push(row_line(row_idx, row, state));
    }
    let grid = Paragraph::new(lines).block(Block::bordered().title(" pattern "));
    frame.render_widget(grid, area);
}

// beat numbers above the cells, playhead marked
fn step_ruler(state: &DisplayState) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(LABEL_WIDTH + 9))];
    for step in 0..state.step_count {
        let text = if step % 4 == 0 { format!("{:<2}", step / 4 + 1) } else { "  ".into() };
        let style = if state.playhead == Some(step) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn row_line(row_idx: usize, row: &RowDisplay, state: &DisplayState) -> Line<'static> {
    let label_style = match row.loaded {
        SoundStatus::Ready => Style::default(),
        SoundStatus::Loading => Style::default().fg(Color::DarkGray),
        SoundStatus::Failed => Style::default().fg(Color::Red),
    };
    let mut label: String = row.label.chars().take(LABEL_WIDTH).collect();
    while label.chars().count() < LABEL_WIDTH {
        label.push(' ');
    }

    let mut spans = vec![
        Span::styled(label, label_style),
        Span::raw(format!(" {:>3}% ", (row.volume * 100.0).round() as u32)),
        flag("M", row.muted, Color::Red),
        flag("S", row.soloed, Color::Green),
        Span::raw(" "),
    ];

    for (step, &active) in row.cells.iter().enumerate() {
        let under_cursor = state.cursor == (row_idx, step);
        let on_playhead = state.playhead == Some(step);
        let glyph = if active { "■ " } else if step % 4 == 0 { "┆ " } else { "· " };

        let mut style = match (active, on_playhead) {
            (true, true) => Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::LightMagenta),
            (false, true) => Style::default().fg(Color::Yellow),
            (false, false) => Style::default().fg(Color::DarkGray),
        };
        if under_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(glyph, style));
    }
    Line::from(spans)
}

fn flag(text: &'static str, on: bool, color: Color) -> Span<'static> {
    if on {
        Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(text, Style::default().fg(Color::DarkGray))
    }
}
