//! # Common types
//!
//! ## Overview
//!
//! Small vocabulary types shared by the buffer, the motions, the register store and the
//! command executor.
use serde::{Deserialize, Serialize};

/// Represent movement along a 1-dimensional line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum MoveDir1D {
    /// Move backwards, or to a previous point.
    Previous,

    /// Move forwards, or to a following point.
    Next,
}

impl MoveDir1D {
    /// Returns the flipped value of this direction.
    pub fn flip(&self) -> MoveDir1D {
        match self {
            MoveDir1D::Previous => MoveDir1D::Next,
            MoveDir1D::Next => MoveDir1D::Previous,
        }
    }
}

/// The shape of a piece of text, or of a range within a buffer.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetShape {
    /// A series of characters.
    #[default]
    #[serde(rename = "character")]
    CharWise,

    /// A series of whole lines.
    #[serde(rename = "line")]
    LineWise,
}

/// How words are delimited when moving by words.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WordStyle {
    /// Either a sequence of alphanumeric characters and underscores, or a sequence of other
    /// non-blank characters.
    ///
    /// Vim calls this a `word`.
    Little,

    /// A sequence of non-blank characters.
    ///
    /// Vim calls this a `WORD`.
    Big,
}

impl WordStyle {
    /// Classify a character, returning 0 for whitespace and distinct non-zero values for
    /// characters that can belong to the same word.
    pub fn classify(&self, c: char) -> u8 {
        if c.is_whitespace() {
            return 0;
        }

        match self {
            WordStyle::Big => 1,
            WordStyle::Little => {
                if c.is_alphanumeric() || c == '_' {
                    2
                } else {
                    1
                }
            },
        }
    }
}

/// Locations for temporarily storing yanked and deleted text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Register {
    /// The default register.
    ///
    /// For example, `""` in Vim.
    Unnamed,

    /// Recently deleted text, where 0 is the most recent deletion.
    ///
    /// For example, `"[1-9]` in Vim.
    RecentlyDeleted(usize),

    /// Most recently deleted text that was shorter than a line.
    ///
    /// For example, `"-` in Vim.
    SmallDelete,

    /// A register containing the last copied text.
    ///
    /// For example, `"0` in Vim.
    LastYanked,

    /// A register named by a lowercase letter.
    ///
    /// For example, `"[a-z]` in Vim.
    Named(char),

    /// A register that discards all content written to it.
    ///
    /// For example, `"_` in Vim.
    Blackhole,
}

impl Register {
    /// Interpret the character following `"` in Normal or Visual mode.
    ///
    /// The returned flag indicates whether writes should append to the register's current
    /// contents, which is the case for uppercase register names.
    pub fn from_char(c: char) -> Option<(Register, bool)> {
        let reg = match c {
            '"' | '*' | '+' => (Register::Unnamed, false),
            '0' => (Register::LastYanked, false),
            '1'..='9' => (Register::RecentlyDeleted(c as usize - '1' as usize), false),
            '-' => (Register::SmallDelete, false),
            '_' => (Register::Blackhole, false),
            'a'..='z' => (Register::Named(c), false),
            'A'..='Z' => (Register::Named(c.to_ascii_lowercase()), true),
            _ => return None,
        };

        Some(reg)
    }

    /// The character Vim uses to name this register.
    pub fn name(&self) -> char {
        match self {
            Register::Unnamed => '"',
            Register::RecentlyDeleted(n) => char::from_digit((*n as u32 + 1).min(9), 10).unwrap_or('9'),
            Register::SmallDelete => '-',
            Register::LastYanked => '0',
            Register::Named(c) => *c,
            Register::Blackhole => '_',
        }
    }
}

/// A search for a character within the current line, as done by `f`, `F`, `t` and `T`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CharSearch {
    /// The character being searched for.
    pub ch: char,

    /// Which direction to search in.
    pub dir: MoveDir1D,

    /// Whether to stop just before the character (`t` and `T`).
    pub till: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_names() {
        assert_eq!(Register::from_char('a'), Some((Register::Named('a'), false)));
        assert_eq!(Register::from_char('A'), Some((Register::Named('a'), true)));
        assert_eq!(Register::from_char('1'), Some((Register::RecentlyDeleted(0), false)));
        assert_eq!(Register::from_char('9'), Some((Register::RecentlyDeleted(8), false)));
        assert_eq!(Register::from_char('_'), Some((Register::Blackhole, false)));
        assert_eq!(Register::from_char('!'), None);

        assert_eq!(Register::RecentlyDeleted(0).name(), '1');
        assert_eq!(Register::Named('q').name(), 'q');
        assert_eq!(Register::Unnamed.name(), '"');
    }

    #[test]
    fn test_word_classes() {
        let little = WordStyle::Little;
        let big = WordStyle::Big;

        assert_eq!(little.classify(' '), 0);
        assert_eq!(little.classify('a'), little.classify('_'));
        assert_ne!(little.classify('a'), little.classify('.'));
        assert_eq!(big.classify('a'), big.classify('.'));
        assert_eq!(big.classify('\t'), 0);
    }
}
