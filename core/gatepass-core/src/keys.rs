//! Key press model for the scanner listener.
//!
//! Hosts translate their native key events (terminal, webview, HID) into
//! [`KeyPress`] values. Focus travels with the press so the listener can
//! stay out of the way of normal typing.

use std::fmt;
use std::str::FromStr;

use crate::error::GateError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Function(u8),
    /// Anything the listener has no use for (arrows, modifiers alone, ...).
    Other(String),
}

impl Key {
    /// A key that types exactly one visible character.
    pub fn printable_char(&self) -> Option<char> {
        match self {
            Key::Char(c) if !c.is_control() => Some(*c),
            _ => None,
        }
    }
}

impl FromStr for Key {
    type Err = GateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "tab" => Ok(Key::Tab),
            "escape" | "esc" => Ok(Key::Escape),
            "backspace" => Ok(Key::Backspace),
            "space" => Ok(Key::Char(' ')),
            lower => lower
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=24).contains(n))
                .map(Key::Function)
                .ok_or_else(|| GateError::InvalidKey(value.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "Space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Escape => write!(f, "Escape"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Function(n) => write!(f, "F{}", n),
            Key::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Where keyboard focus was when the key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusTarget {
    #[default]
    None,
    TextInput,
    TextArea,
    ContentEditable,
    /// Element marked as not wanting scanner input.
    ScanOptOut,
}

impl FocusTarget {
    /// Presses landing in these targets belong to the user, not the scanner.
    pub fn is_scan_exempt(&self) -> bool {
        !matches!(self, FocusTarget::None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub focus: FocusTarget,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            focus: FocusTarget::None,
        }
    }

    pub fn in_focus(key: Key, focus: FocusTarget) -> Self {
        Self { key, focus }
    }
}
