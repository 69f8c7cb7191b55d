//! # Vim keybindings
//!
//! ## Overview
//!
//! This module interprets [tokens](Token) the way Vim would, one at a time. Each mode has its
//! own handler, and [apply] picks the right one for the state it's given:
//!
//! - Normal mode: counts, registers, operators, motions and text objects
//! - Visual and Visual Line mode: extending a selection and acting on it
//! - Insert and Replace mode: typing, including repeating an insert with a count
//! - Command-line mode: editing and running `:` commands and `/` and `?` searches
//!
//! Handlers either change the state, ignore the token, or fail. A failing token leaves the text
//! and cursor as they were, cancels whatever was partially typed, and is reported through
//! [Outcome::error].
use crossterm::event::{KeyCode, KeyModifiers};
use tracing::{debug, trace};

use crate::errors::{EditError, EditResult};
use crate::key::Key;
use crate::state::{Mode, VimState};
use crate::tokenizer::Token;

mod cmdline;
pub mod command;
mod insert;
mod normal;
mod ops;
pub(crate) mod regex;
mod visual;

/// The result of interpreting a single token.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// The state after the token.
    pub state: VimState,

    /// Why the token failed, if it did.
    pub error: Option<EditError>,
}

/// Whether a handler did anything with a token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Effect {
    Changed,
    Ignored,
}

/// Tokens, reduced to what the mode handlers care about.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum KeyClass {
    Char(char),
    Text(String),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Ctrl(char),
    Other,
}

impl KeyClass {
    fn from_key(key: &Key) -> KeyClass {
        if let Some(c) = key.get_ctl() {
            return match c {
                'h' => KeyClass::Backspace,
                'i' => KeyClass::Tab,
                'j' | 'm' => KeyClass::Enter,
                '[' => KeyClass::Escape,
                c => KeyClass::Ctrl(c),
            };
        }

        let mods = match key.code() {
            KeyCode::Char(_) => key.modifiers() - KeyModifiers::SHIFT,
            _ => key.modifiers(),
        };

        match key.code() {
            KeyCode::Char('\n' | '\r') => KeyClass::Enter,
            KeyCode::Char('\t') => KeyClass::Tab,
            KeyCode::Char(c) if mods.is_empty() => KeyClass::Char(c),
            _ if !mods.is_empty() => KeyClass::Other,
            KeyCode::Enter => KeyClass::Enter,
            KeyCode::Esc => KeyClass::Escape,
            KeyCode::Backspace => KeyClass::Backspace,
            KeyCode::Delete => KeyClass::Delete,
            KeyCode::Tab => KeyClass::Tab,
            KeyCode::Left => KeyClass::Left,
            KeyCode::Right => KeyClass::Right,
            KeyCode::Up => KeyClass::Up,
            KeyCode::Down => KeyClass::Down,
            KeyCode::Home => KeyClass::Home,
            KeyCode::End => KeyClass::End,
            _ => KeyClass::Other,
        }
    }
}

impl From<&Token> for KeyClass {
    fn from(token: &Token) -> Self {
        match token {
            Token::Key(key) => KeyClass::from_key(key),
            Token::Unknown(text) => KeyClass::Text(text.clone()),
        }
    }
}

fn dispatch(state: &mut VimState, key: &KeyClass, token: &Token) -> EditResult<Effect> {
    match state.mode {
        Mode::Normal => normal::handle(state, key),
        Mode::Visual | Mode::VisualLine => visual::handle(state, key),
        Mode::Insert | Mode::Replace => insert::handle(state, key, token),
        Mode::CommandLine => cmdline::handle(state, key),
    }
}

/// Cancel whatever was partially typed after a failure.
///
/// A key that leaves Insert mode still does, even when repeating the insert failed.
fn recover(state: &mut VimState, key: &KeyClass) {
    match (state.mode, key) {
        (Mode::CommandLine, _) => {
            state.mode = state.persist.cmdline_origin;
            state.command_line.clear();
        },
        (Mode::Insert | Mode::Replace, KeyClass::Escape | KeyClass::Ctrl('c')) => {
            insert::finish(state);
        },
        _ => {},
    }

    state.reset_pending();
}

/// Interpret a single token, producing the next state.
///
/// The given state is never modified. Tokens that mean nothing in the current mode produce an
/// identical state.
pub fn apply(state: &VimState, token: &Token) -> Outcome {
    let key = KeyClass::from(token);
    let mut next = state.clone();

    match dispatch(&mut next, &key, token) {
        Ok(Effect::Changed) => {
            trace!(?token, mode = ?next.mode, "applied token");

            Outcome { state: next, error: None }
        },
        Ok(Effect::Ignored) => {
            debug!(?token, mode = ?state.mode, "ignored token");

            Outcome { state: state.clone(), error: None }
        },
        Err(error) => {
            debug!(?token, %error, "token failed");

            let mut state = state.clone();
            recover(&mut state, &key);

            Outcome { state, error: Some(error) }
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    /// Feed a key sequence to a state, stopping at the first error.
    pub(crate) fn run(state: VimState, keys: &str) -> Result<VimState, (VimState, EditError)> {
        let mut state = state;

        for token in tokenize(keys) {
            let outcome = apply(&state, &token);

            if let Some(err) = outcome.error {
                return Err((outcome.state, err));
            }

            state = outcome.state;
        }

        Ok(state)
    }

    /// Feed a key sequence to a new state for `text`, expecting no errors.
    pub(crate) fn keys(text: &str, keys: &str) -> VimState {
        match run(VimState::new(text), keys) {
            Ok(state) => state,
            Err((_, err)) => panic!("keys {keys:?} failed: {err}"),
        }
    }

    /// Feed a key sequence to a state, returning the error from the final key.
    pub(crate) fn fails(state: VimState, keys: &str) -> (VimState, EditError) {
        match run(state, keys) {
            Ok(_) => panic!("keys {keys:?} didn't fail"),
            Err(res) => res,
        }
    }

    #[test]
    fn test_classify() {
        let class = |s: &str| KeyClass::from(&tokenize(s)[0]);

        assert_eq!(class("x"), KeyClass::Char('x'));
        assert_eq!(class("X"), KeyClass::Char('X'));
        assert_eq!(class("<CR>"), KeyClass::Enter);
        assert_eq!(class("\n"), KeyClass::Enter);
        assert_eq!(class("<C-j>"), KeyClass::Enter);
        assert_eq!(class("<Esc>"), KeyClass::Escape);
        assert_eq!(class("<C-[>"), KeyClass::Escape);
        assert_eq!(class("<C-h>"), KeyClass::Backspace);
        assert_eq!(class("<C-w>"), KeyClass::Ctrl('w'));
        assert_eq!(class("<Tab>"), KeyClass::Tab);
        assert_eq!(class("<S-Left>"), KeyClass::Other);
        assert_eq!(class("<S-Up>"), KeyClass::Other);
        assert_eq!(class("<S-CR>"), KeyClass::Other);
        assert_eq!(class("<S-x>"), KeyClass::Char('X'));
        assert_eq!(class("<F5>"), KeyClass::Other);
        assert_eq!(class("<div>"), KeyClass::Text("<div>".into()));
    }

    #[test]
    fn test_ignored_token_is_identity() {
        let state = keys("hello", "l");
        let outcome = apply(&state, &tokenize("<F5>")[0]);

        assert_eq!(outcome.state, state);
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn test_failure_restores_state() {
        let state = keys("hello\nworld", "d");
        let (state, err) = fails(state, "/zzz<CR>");

        assert_eq!(err.to_string(), "Pattern not found: zzz");
        assert_eq!(state.text(), "hello\nworld");
        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(state.pending_operator(), None);
        assert_eq!(state.command_line(), None);
    }
}
