//! # Keystroke tokenizer
//!
//! ## Overview
//!
//! The tokenizer turns raw keystroke text, as produced by a model, into [Token] values. It is
//! pull-based: the caller hands it whatever input is currently available, and it either
//! returns the next token along with how many bytes it consumed, or asks for more input.
//!
//! The sequence of tokens produced depends only on the concatenated input, and never on how
//! that input was split into chunks. The current [Mode] only controls *when* tokens are
//! released: while typing a command line, tokens are held back until a key that ends the
//! command line has arrived.
//!
//! ## Example
//!
//! ```
//! use vimsim::{tokenize, Token};
//!
//! let tokens = tokenize("dw<Esc><div>");
//! let names: Vec<String> = tokens.iter().map(Token::to_string).collect();
//!
//! assert_eq!(names, vec!["d", "w", "<Esc>", "<div>"]);
//! ```
use std::fmt;

use crossterm::event::KeyCode;

use crate::key::{parse::parse_bracket, Key};
use crate::state::Mode;

/// A single unit of keystroke input.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Token {
    /// A recognized key.
    Key(Key),

    /// A well-formed bracketed name that isn't a key, like `<div>`.
    ///
    /// This does nothing in Normal and Visual mode, and is typed literally elsewhere.
    Unknown(String),
}

impl Token {
    /// Whether this token ends a command line that is being typed.
    pub fn is_terminator(&self) -> bool {
        match self {
            Token::Key(key) => {
                match key.code() {
                    KeyCode::Enter | KeyCode::Esc => true,
                    KeyCode::Char('\n') => key.modifiers().is_empty(),
                    KeyCode::Char('c') => key.get_ctl().is_some(),
                    _ => false,
                }
            },
            Token::Unknown(_) => false,
        }
    }
}

impl From<Key> for Token {
    fn from(key: Key) -> Self {
        Token::Key(key)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Key(key) => write!(f, "{key}"),
            Token::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// The result of asking the tokenizer for the next token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scan {
    /// A token, and the number of bytes of input it consumed.
    Token(Token, usize),

    /// More input is needed before the next token can be decided.
    NeedMoreInput,
}

fn scan_one(input: &str, at_eof: bool) -> Scan {
    let mut chars = input.chars();

    let Some(c) = chars.next() else {
        return Scan::NeedMoreInput;
    };

    match c {
        '<' => {
            match parse_bracket(input) {
                Ok((rest, bracket)) => {
                    let len = input.len() - rest.len();
                    let token = match bracket.resolve() {
                        Some(key) => Token::Key(key),
                        None => Token::Unknown(input[..len].to_string()),
                    };

                    Scan::Token(token, len)
                },
                Err(nom::Err::Incomplete(_)) if !at_eof => Scan::NeedMoreInput,
                Err(_) => Scan::Token(Token::Key(Key::from('<')), 1),
            }
        },
        '\r' => {
            let enter = Token::Key(Key::from(KeyCode::Enter));

            match chars.next() {
                Some('\n') => Scan::Token(enter, 2),
                Some(_) => Scan::Token(enter, 1),
                None if at_eof => Scan::Token(enter, 1),
                None => Scan::NeedMoreInput,
            }
        },
        '\n' => Scan::Token(Token::Key(Key::from(KeyCode::Enter)), 1),
        c => Scan::Token(Token::Key(Key::from(c)), c.len_utf8()),
    }
}

fn has_terminator(input: &str) -> bool {
    let mut off = 0;

    while let Scan::Token(token, len) = scan_one(&input[off..], false) {
        if token.is_terminator() {
            return true;
        }

        off += len;
    }

    false
}

/// Decide the next token at the start of `input`.
///
/// When `at_eof` is true, no further input will arrive, so anything still ambiguous is
/// resolved: an unfinished `<...` becomes a literal `<`, and command-line input that was being
/// held back is released.
pub fn next_token(input: &str, mode: Mode, at_eof: bool) -> Scan {
    if mode == Mode::CommandLine && !at_eof && !has_terminator(input) {
        return Scan::NeedMoreInput;
    }

    scan_one(input, at_eof)
}

/// Split complete keystroke input into tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut off = 0;

    while let Scan::Token(token, len) = scan_one(&input[off..], true) {
        tokens.push(token);
        off += len;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    macro_rules! tok {
        ($k: expr) => {
            Token::Key(key!($k))
        };
    }

    macro_rules! unknown {
        ($s: expr) => {
            Token::Unknown(String::from($s))
        };
    }

    fn scan(input: &str, mode: Mode) -> Scan {
        next_token(input, mode, false)
    }

    #[test]
    fn test_plain_chars() {
        assert_eq!(scan("dw", Mode::Normal), Scan::Token(tok!('d'), 1));
        assert_eq!(scan("ñx", Mode::Normal), Scan::Token(tok!('ñ'), 2));
        assert_eq!(scan("", Mode::Normal), Scan::NeedMoreInput);
        assert_eq!(next_token("", Mode::Normal, true), Scan::NeedMoreInput);
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(scan("<Esc>x", Mode::Insert), Scan::Token(tok!(KeyCode::Esc), 5));
        assert_eq!(scan("<C-w>", Mode::Insert), Scan::Token(Token::Key(ctl!('w')), 5));
        assert_eq!(scan("<div>", Mode::Normal), Scan::Token(unknown!("<div>"), 5));
        assert_eq!(
            scan("<M-x>", Mode::Normal),
            Scan::Token(Token::Key(key!('x', KeyModifiers::ALT)), 5)
        );
    }

    #[test]
    fn test_truncated_bracket() {
        assert_eq!(scan("<Es", Mode::Normal), Scan::NeedMoreInput);
        assert_eq!(scan("<", Mode::Insert), Scan::NeedMoreInput);
        assert_eq!(next_token("<Es", Mode::Normal, true), Scan::Token(tok!('<'), 1));
    }

    #[test]
    fn test_literal_lt() {
        assert_eq!(scan("<<", Mode::Normal), Scan::Token(tok!('<'), 1));
        assert_eq!(scan("< x", Mode::Insert), Scan::Token(tok!('<'), 1));
        assert_eq!(scan("<a b>", Mode::Insert), Scan::Token(tok!('<'), 1));
    }

    #[test]
    fn test_raw_newlines() {
        assert_eq!(scan("\nx", Mode::Normal), Scan::Token(tok!(KeyCode::Enter), 1));
        assert_eq!(scan("\r\nx", Mode::Normal), Scan::Token(tok!(KeyCode::Enter), 2));
        assert_eq!(scan("\rx", Mode::Normal), Scan::Token(tok!(KeyCode::Enter), 1));
        assert_eq!(scan("\r", Mode::Normal), Scan::NeedMoreInput);
        assert_eq!(next_token("\r", Mode::Normal, true), Scan::Token(tok!(KeyCode::Enter), 1));
    }

    #[test]
    fn test_command_line_gating() {
        assert_eq!(scan("s/a/b/", Mode::CommandLine), Scan::NeedMoreInput);
        assert_eq!(scan("s/a/b/<C", Mode::CommandLine), Scan::NeedMoreInput);
        assert_eq!(scan("s/a/b/<CR>", Mode::CommandLine), Scan::Token(tok!('s'), 1));
        assert_eq!(scan("s/a/b/\n", Mode::CommandLine), Scan::Token(tok!('s'), 1));
        assert_eq!(scan("s<Esc>", Mode::CommandLine), Scan::Token(tok!('s'), 1));
        assert_eq!(scan("s<C-c>", Mode::CommandLine), Scan::Token(tok!('s'), 1));
        assert_eq!(scan("<lt>abc", Mode::CommandLine), Scan::NeedMoreInput);

        // Tokens are released at the end of input even without a terminator.
        assert_eq!(next_token("s/a/b/", Mode::CommandLine, true), Scan::Token(tok!('s'), 1));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("ix<Esc>"), vec![tok!('i'), tok!('x'), tok!(KeyCode::Esc)]);
        assert_eq!(tokenize("a<Es"), vec![tok!('a'), tok!('<'), tok!('E'), tok!('s')]);
        assert_eq!(tokenize("<span>"), vec![unknown!("<span>")]);
        assert_eq!(tokenize(""), vec![]);
    }

    #[test]
    fn test_display() {
        let shown: Vec<String> = tokenize("a<lt><CR><x>").iter().map(ToString::to_string).collect();

        assert_eq!(shown, vec!["a", "<lt>", "<CR>", "<x>"]);
    }
}
