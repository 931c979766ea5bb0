//! Terminal event handling.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use cue_core::{Key, KeyInput};
use std::time::Duration;

/// Terminal event types.
#[derive(Debug)]
pub enum TermEvent {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// No event (tick).
    Tick,
}

/// Poll for terminal events with a timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<TermEvent> {
    if event::poll(timeout)? {
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(TermEvent::Key(key)),
            Event::Resize(w, h) => Ok(TermEvent::Resize(w, h)),
            _ => Ok(TermEvent::Tick),
        }
    } else {
        Ok(TermEvent::Tick)
    }
}

/// Check if a key event is Ctrl+C.
pub fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Translate a terminal key into the menu's key model.
///
/// Ctrl is the model-cycling modifier.
pub fn to_key_input(key: &KeyEvent) -> KeyInput {
    let mapped = match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Modifier(_) => Key::Modifier,
        _ => Key::Other,
    };
    KeyInput {
        key: mapped,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::ModifierKeyCode;

    #[test]
    fn test_ctrl_arrow_cycles_models() {
        let input = to_key_input(&KeyEvent::new(KeyCode::Down, KeyModifiers::CONTROL));
        assert_eq!(input, KeyInput::ctrl(Key::Down));
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            to_key_input(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
            KeyInput::plain(Key::Char('x'))
        );
        assert_eq!(
            to_key_input(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)).key,
            Key::Escape
        );
        assert_eq!(
            to_key_input(&KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)).key,
            Key::Other
        );
    }

    #[test]
    fn test_bare_modifier() {
        let key = KeyEvent::new(
            KeyCode::Modifier(ModifierKeyCode::LeftControl),
            KeyModifiers::CONTROL,
        );
        assert_eq!(to_key_input(&key).key, Key::Modifier);
    }

    #[test]
    fn test_quit() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
