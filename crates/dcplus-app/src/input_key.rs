//! Terminal-independent key events
//!
//! Keys are converted from crossterm at the TUI boundary, so the handler and
//! its tests never depend on a terminal library.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// Printable character
    Char(char),
    /// Character with Ctrl held
    CharCtrl(char),

    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,

    Enter,
    Esc,
    Backspace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_is_distinct_from_plain() {
        assert_ne!(InputKey::CharCtrl('c'), InputKey::Char('c'));
        assert_eq!(InputKey::Char('q'), InputKey::Char('q'));
    }
}
