//! Abstract input events
//!
//! Screens react to a small handheld-style button set. Keyboards map onto it,
//! and in text-input mode printable keys edit the query directly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input event understood by the navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    /// Activate the selection (A button)
    Select,
    /// Stop playback or leave the screen (B button)
    Back,
    /// Open search (X button)
    Search,
    /// Toggle favorite (Y button)
    Favorite,
    /// Typed character (text input only)
    Char(char),
    Backspace,
    Submit,
    Quit,
}

/// Map a key press while browsing
pub fn from_key(key: KeyEvent) -> Option<Input> {
    if let Some(input) = global(key) {
        return Some(input);
    }
    let input = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Input::Up,
        KeyCode::Down | KeyCode::Char('j') => Input::Down,
        KeyCode::Left | KeyCode::Char('h') => Input::Left,
        KeyCode::Right | KeyCode::Char('l') => Input::Right,
        KeyCode::Enter | KeyCode::Char('a') => Input::Select,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => Input::Back,
        KeyCode::Char('x') | KeyCode::Char('/') => Input::Search,
        KeyCode::Char('y') | KeyCode::Char('f') => Input::Favorite,
        KeyCode::Char('q') => Input::Quit,
        _ => return None,
    };
    Some(input)
}

/// Map a key press while the search box is focused
pub fn from_text_key(key: KeyEvent) -> Option<Input> {
    if let Some(input) = global(key) {
        return Some(input);
    }
    let input = match key.code {
        KeyCode::Up => Input::Up,
        KeyCode::Down => Input::Down,
        KeyCode::Left => Input::Left,
        KeyCode::Right => Input::Right,
        KeyCode::Tab => Input::Select,
        KeyCode::Enter => Input::Submit,
        KeyCode::Esc => Input::Back,
        KeyCode::Backspace => Input::Backspace,
        KeyCode::Char(c) => Input::Char(c),
        _ => return None,
    };
    Some(input)
}

fn global(key: KeyEvent) -> Option<Input> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        Some(Input::Quit)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_browse_mapping() {
        assert_eq!(from_key(key(KeyCode::Down)), Some(Input::Down));
        assert_eq!(from_key(key(KeyCode::Char('k'))), Some(Input::Up));
        assert_eq!(from_key(key(KeyCode::Enter)), Some(Input::Select));
        assert_eq!(from_key(key(KeyCode::Esc)), Some(Input::Back));
        assert_eq!(from_key(key(KeyCode::Char('/'))), Some(Input::Search));
        assert_eq!(from_key(key(KeyCode::Char('y'))), Some(Input::Favorite));
        assert_eq!(from_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_text_mapping() {
        assert_eq!(from_text_key(key(KeyCode::Char('q'))), Some(Input::Char('q')));
        assert_eq!(from_text_key(key(KeyCode::Enter)), Some(Input::Submit));
        assert_eq!(from_text_key(key(KeyCode::Backspace)), Some(Input::Backspace));
        assert_eq!(from_text_key(key(KeyCode::Esc)), Some(Input::Back));
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(from_key(ctrl_c), Some(Input::Quit));
        assert_eq!(from_text_key(ctrl_c), Some(Input::Quit));
    }
}
