//! # Input keys
//!
//! ## Overview
//!
//! This module contains the representation of a single key typed into the interpreter, and
//! the grammar for Vim's bracketed key names (`<Esc>`, `<C-w>`, `<lt>`, ...).
//!
//! ## Example
//!
//! ```
//! use vimsim::key::Key;
//!
//! let esc: Key = "<Esc>".parse().unwrap();
//! assert_eq!(esc.to_string(), "<Esc>");
//!
//! let ctl: Key = "<c-W>".parse().unwrap();
//! assert_eq!(ctl.get_ctl(), Some('w'));
//! ```
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyModifiers};

pub(crate) mod parse;

/// Errors that occur while interpreting key strings.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
    /// Failure to interpret a key string.
    #[error("Invalid key string: {0:?}")]
    InvalidKey(String),

    /// Empty key string.
    #[error("Empty key string")]
    EmptyKey,
}

/// A single key, either a printable character or a named key with optional modifiers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl Key {
    /// Create a new key.
    ///
    /// The `SHIFT` modifier is dropped for characters, since the character itself already
    /// reflects it.
    pub fn new(code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        if let KeyCode::Char(_) = code {
            modifiers -= KeyModifiers::SHIFT;
        }

        Self { code, modifiers }
    }

    /// The key code.
    pub fn code(&self) -> KeyCode {
        self.code
    }

    /// The modifiers held while pressing this key.
    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    /// Return the character this key types, if it is an unmodified character.
    pub fn get_char(&self) -> Option<char> {
        if let KeyCode::Char(c) = self.code {
            if self.modifiers.is_empty() {
                return Some(c);
            }
        }

        None
    }

    /// Return the lowercase letter of a `<C-...>` key.
    pub fn get_ctl(&self) -> Option<char> {
        if let KeyCode::Char(c) = self.code {
            if self.modifiers == KeyModifiers::CONTROL {
                return Some(c);
            }
        }

        None
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Key::new(code, KeyModifiers::NONE)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::new(KeyCode::Char(c), KeyModifiers::NONE)
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut chars = input.chars();

        match (chars.next(), chars.next()) {
            (None, _) => Err(KeyError::EmptyKey),
            (Some(c), None) => Ok(Key::from(c)),
            _ => {
                match parse::parse_bracket(input) {
                    Ok(("", bracket)) => {
                        bracket.resolve().ok_or_else(|| KeyError::InvalidKey(input.to_string()))
                    },
                    _ => Err(KeyError::InvalidKey(input.to_string())),
                }
            },
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mods = String::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            mods.push_str("C-");
        }

        if self.modifiers.contains(KeyModifiers::SHIFT) {
            mods.push_str("S-");
        }

        if self.modifiers.contains(KeyModifiers::ALT) {
            mods.push_str("A-");
        }

        if self.modifiers.contains(KeyModifiers::SUPER) {
            mods.push_str("D-");
        }

        let name = match self.code {
            KeyCode::Char(c) if mods.is_empty() => {
                return match c {
                    '<' => write!(f, "<lt>"),
                    '\n' => write!(f, "<NL>"),
                    c => write!(f, "{c}"),
                };
            },
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char('<') => "lt".to_string(),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Backspace => "BS".to_string(),
            KeyCode::Enter => "CR".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Null => "Nul".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => return write!(f, "<S-Tab>"),
            KeyCode::F(n) => format!("F{n}"),
            _ => "Nul".to_string(),
        };

        write!(f, "<{mods}{name}>")
    }
}
