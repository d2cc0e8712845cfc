use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::VOLUME_STEP;
use crate::shared::InputEvent;

use super::mode::TuiState;

// poll for a key within `timeout` and resolve it into semantic input events
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key, ts));
    }
    Ok(vec![])
}

pub fn handle_key(key: KeyEvent, ts: &TuiState) -> Vec<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![InputEvent::Quit];
    }
    if ts.prompt_active {
        return resolve_prompt(key.code);
    }

    let event = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::PlayPress,

        KeyCode::Up => InputEvent::CursorUp,
        KeyCode::Down => InputEvent::CursorDown,
        KeyCode::Left => InputEvent::CursorLeft,
        KeyCode::Right => InputEvent::CursorRight,
        KeyCode::Enter => InputEvent::ToggleCell,
        KeyCode::Char('c') => InputEvent::ClearGrid,

        // tempo: +/- by one, shifted by ten
        KeyCode::Char('+') | KeyCode::Char('=') => InputEvent::AdjustTempo(1),
        KeyCode::Char('-') => InputEvent::AdjustTempo(-1),
        KeyCode::PageUp => InputEvent::AdjustTempo(10),
        KeyCode::PageDown => InputEvent::AdjustTempo(-10),

        KeyCode::Char(']') => InputEvent::AdjustSteps(1),
        KeyCode::Char('[') => InputEvent::AdjustSteps(-1),

        KeyCode::Char('.') => InputEvent::AdjustVolume(VOLUME_STEP),
        KeyCode::Char(',') => InputEvent::AdjustVolume(-VOLUME_STEP),
        KeyCode::Char('>') => InputEvent::AdjustMaster(VOLUME_STEP),
        KeyCode::Char('<') => InputEvent::AdjustMaster(-VOLUME_STEP),
        KeyCode::Char('m') => InputEvent::ToggleMute,
        KeyCode::Char('s') => InputEvent::ToggleSolo,

        KeyCode::Char('w') => InputEvent::BeginSave,
        KeyCode::Char('l') => InputEvent::LoadNext,
        KeyCode::Char('L') => InputEvent::LoadPrevious,

        _ => return vec![],
    };
    vec![event]
}

// while naming a pattern, everything is text except the editing keys
fn resolve_prompt(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Enter => vec![InputEvent::PromptConfirm],
        KeyCode::Esc => vec![InputEvent::PromptCancel],
        KeyCode::Backspace => vec![InputEvent::PromptBackspace],
        KeyCode::Char(c) => vec![InputEvent::PromptChar(c)],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_transport_and_grid() {
        let ts = TuiState::default();
        assert_eq!(handle_key(key(KeyCode::Char(' ')), &ts), [InputEvent::PlayPress]);
        assert_eq!(handle_key(key(KeyCode::Enter), &ts), [InputEvent::ToggleCell]);
        assert_eq!(handle_key(key(KeyCode::Char(']')), &ts), [InputEvent::AdjustSteps(1)]);
        assert!(handle_key(key(KeyCode::F(5)), &ts).is_empty());
    }

    #[test]
    fn prompt_swallows_command_keys() {
        let ts = TuiState { prompt_active: true, ..TuiState::default() };
        assert_eq!(handle_key(key(KeyCode::Char('q')), &ts), [InputEvent::PromptChar('q')]);
        assert_eq!(handle_key(key(KeyCode::Esc), &ts), [InputEvent::PromptCancel]);
        assert_eq!(handle_key(key(KeyCode::Enter), &ts), [InputEvent::PromptConfirm]);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ts = TuiState { prompt_active: true, ..TuiState::default() };
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(ctrl_c, &ts), [InputEvent::Quit]);
    }
}
