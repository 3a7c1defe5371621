//! Platform-agnostic key events.
//!
//! Front-ends map their native keyboard input to [`Key`]. The terminal's
//! line editor never sees raw platform input.

use serde::{Deserialize, Serialize};

/// A single key press delivered to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Printable character typed.
    Char(char),
    /// Character typed with Ctrl held (stored lowercase).
    Ctrl(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Escape,
}

impl Key {
    /// Map a raw control byte (`0x01..=0x1A`) to its `Ctrl` key.
    ///
    /// Tab, Enter and Backspace keep their dedicated variants.
    pub fn from_control_byte(b: u8) -> Option<Key> {
        match b {
            b'\t' => Some(Key::Tab),
            b'\r' | b'\n' => Some(Key::Enter),
            0x7f => Some(Key::Backspace),
            0x1b => Some(Key::Escape),
            0x01..=0x1a => Some(Key::Ctrl((b'a' + b - 1) as char)),
            _ => None,
        }
    }
}
