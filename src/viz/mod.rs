//! Interactive terminal views
//!
//! Each view is its own module and implements [`visitflow::Renderer`].

pub mod globe;
pub mod panel;

use crossterm::event::{KeyCode, KeyModifiers};

/// What the frame loop should do after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Refresh,
}

/// Runtime state for interactive controls
pub struct VizState {
    pub speed: f32,        // Current speed (time per frame)
    pub paused: bool,
    pub show_help: bool,
    pub show_panel: bool,
}

impl VizState {
    pub fn new(initial_speed: f32) -> Self {
        Self {
            speed: initial_speed,
            paused: false,
            show_help: false,
            show_panel: true,
        }
    }

    /// Handle the keys every view shares.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return KeyAction::Quit,
            KeyCode::Char('r') => return KeyAction::Refresh,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('p') => self.show_panel = !self.show_panel,
            // Number keys: change speed (1=fastest, 9=slowest)
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                self.speed = match c {
                    '1' => 0.01,
                    '2' => 0.02,
                    '3' => 0.03,
                    '4' => 0.04,
                    '5' => 0.05,
                    '6' => 0.07,
                    '7' => 0.1,
                    '8' => 0.15,
                    _ => 0.2,
                };
            }
            _ => {}
        }
        KeyAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_keys() {
        let mut state = VizState::new(0.04);
        let none = KeyModifiers::NONE;
        assert_eq!(state.handle_key(KeyCode::Char('q'), none), KeyAction::Quit);
        assert_eq!(state.handle_key(KeyCode::Char('r'), none), KeyAction::Refresh);
        assert_eq!(state.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL), KeyAction::Quit);
        assert_eq!(state.handle_key(KeyCode::Char('c'), none), KeyAction::None);

        state.handle_key(KeyCode::Char(' '), none);
        assert!(state.paused);
        state.handle_key(KeyCode::Char('1'), none);
        assert_eq!(state.speed, 0.01);
        state.handle_key(KeyCode::Char('p'), none);
        assert!(!state.show_panel);
    }
}
