use std::ops::BitOr;

use crossterm::event::{KeyCode, KeyModifiers};

use nom::{
    branch::alt,
    bytes::streaming::take_while_m_n,
    character::streaming::{char, one_of, satisfy},
    combinator::recognize,
    multi::many0,
    sequence::terminated,
    IResult,
};

use super::Key;

/// Longest key name accepted between the angle brackets.
pub(crate) const MAX_KEY_NAME: usize = 16;

/// A bracketed key as written, before its name is interpreted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct BracketKey<'a> {
    pub mods: KeyModifiers,
    pub name: &'a str,
}

fn parse_modifier(input: &str) -> IResult<&str, KeyModifiers> {
    /*
     * Parse the modifier prefixes in things like <C-...>, <S-...>, <A-...>, <M-...> and
     * <D-...>. Vim accepts these in either case.
     */
    let (input, m) = terminated(one_of("CSAMDcsamd"), char('-'))(input)?;

    let m = match m.to_ascii_uppercase() {
        'C' => KeyModifiers::CONTROL,
        'S' => KeyModifiers::SHIFT,
        'A' | 'M' => KeyModifiers::ALT,
        _ => KeyModifiers::SUPER,
    };

    Ok((input, m))
}

fn parse_word(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, MAX_KEY_NAME, |c: char| c.is_ascii_alphanumeric())(input)
}

fn parse_symbol(input: &str) -> IResult<&str, &str> {
    recognize(satisfy(|c: char| !c.is_whitespace()))(input)
}

/// Parse a bracketed key name, like `<Esc>`, `<C-[>` or `<div>`.
///
/// These are streaming parsers: input that could still become a valid bracket once more
/// characters arrive produces [nom::Err::Incomplete].
pub(crate) fn parse_bracket(input: &str) -> IResult<&str, BracketKey<'_>> {
    let (input, _) = char('<')(input)?;
    let (input, m) = many0(parse_modifier)(input)?;

    let (input, name) = if m.is_empty() {
        parse_word(input)?
    } else {
        alt((parse_word, parse_symbol))(input)?
    };

    let (input, _) = char('>')(input)?;

    let mods = m.into_iter().fold(KeyModifiers::NONE, BitOr::bitor);

    Ok((input, BracketKey { mods, name }))
}

fn named_key(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();

    let code = match lower.as_str() {
        "cr" | "return" | "enter" => KeyCode::Enter,
        "nl" | "newline" | "linefeed" | "lf" => KeyCode::Char('\n'),
        "esc" => KeyCode::Esc,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        "nul" => KeyCode::Null,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        _ => {
            let n = lower.strip_prefix('f')?.parse::<u8>().ok()?;

            if (1..=12).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        },
    };

    Some(code)
}

impl BracketKey<'_> {
    /// Interpret the bracket's name, returning `None` for names that aren't keys.
    pub(crate) fn resolve(&self) -> Option<Key> {
        let mut m = self.mods;
        let mut chars = self.name.chars();

        if let (Some(c), None) = (chars.next(), chars.next()) {
            if m.is_empty() {
                // Single characters need a modifier, so <a> is just text.
                return None;
            }

            if m.contains(KeyModifiers::CONTROL) {
                m -= KeyModifiers::SHIFT;

                let k = match c.to_ascii_lowercase() {
                    'i' => Key::from(KeyCode::Tab),
                    'j' => Key::from(KeyCode::Char('\n')),
                    'm' => Key::from(KeyCode::Enter),
                    '[' => Key::from(KeyCode::Esc),
                    'h' | '?' => Key::from(KeyCode::Backspace),
                    '@' => Key::new(KeyCode::Char(' '), m),
                    c => Key::new(KeyCode::Char(c), m),
                };

                return Some(k);
            }

            if m.contains(KeyModifiers::SHIFT) {
                let c = c.to_ascii_uppercase();

                return Some(Key::new(KeyCode::Char(c), m));
            }

            return Some(Key::new(KeyCode::Char(c), m));
        }

        let code = named_key(self.name)?;

        if code == KeyCode::Tab && m == KeyModifiers::SHIFT {
            return Some(Key::from(KeyCode::BackTab));
        }

        if let KeyCode::Char(c) = code {
            if m.contains(KeyModifiers::CONTROL) {
                m -= KeyModifiers::SHIFT;

                return Some(Key::new(KeyCode::Char(c), m));
            }
        }

        Some(Key::new(code, m))
    }
}
