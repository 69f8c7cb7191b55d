//! # Command-line mode
//!
//! ## Overview
//!
//! Typing `:`, `/` or `?` opens the command line. Keys are collected until `<CR>`, which runs the
//! text as an ex command or a search, or until `<Esc>`, which throws it away.
use crate::commands::CommandError;
use crate::editing::motion::Motion;
use crate::errors::EditResult;
use crate::prelude::{MoveDir1D, WordStyle};
use crate::state::{Mode, VimState};

use super::command::{self, parse::split_delimited};
use super::{normal, regex, Effect, KeyClass};

/// Open the command line with some initial text.
pub(super) fn enter(state: &mut VimState, text: String) {
    state.persist.cmdline_origin = state.mode;
    state.mode = Mode::CommandLine;
    state.command_line = text;
}

fn leave(state: &mut VimState) -> Effect {
    state.mode = state.persist.cmdline_origin;
    state.command_line.clear();
    state.reset_pending();

    Effect::Changed
}

/// Length in bytes of the character that opened the command line.
fn prefix_len(state: &VimState) -> usize {
    state.command_line.chars().next().map_or(0, char::len_utf8)
}

fn delete_word(state: &mut VimState) {
    let start = prefix_len(state);
    let style = WordStyle::Little;
    let body: Vec<char> = state.command_line[start..].chars().collect();
    let mut n = body.len();

    while n > 0 && style.classify(body[n - 1]) == 0 {
        n -= 1;
    }

    if n > 0 {
        let class = style.classify(body[n - 1]);

        while n > 0 && style.classify(body[n - 1]) == class {
            n -= 1;
        }
    }

    let kept: String = body[..n].iter().collect();
    state.command_line.truncate(start);
    state.command_line.push_str(&kept);
}

fn search(state: &mut VimState, dir: MoveDir1D, body: &str) -> EditResult<Effect> {
    let delim = match dir {
        MoveDir1D::Next => '/',
        MoveDir1D::Previous => '?',
    };
    let (pattern, _) = split_delimited(body, delim);

    let pattern = if pattern.is_empty() {
        match &state.persist.last_search {
            Some((last, _)) => last.clone(),
            None => return Err(CommandError::NoPreviousPattern.into()),
        }
    } else {
        pattern
    };

    let regex = regex::compile(&pattern, &state.config, None)?;
    let wrap = state.config.wrapscan;

    state.persist.last_search = Some((pattern, dir));

    normal::run_motion(state, Motion::Search(regex, dir, wrap))
}

fn execute(state: &mut VimState) -> EditResult<Effect> {
    let text = std::mem::take(&mut state.command_line);
    let mut chars = text.chars();
    let prefix = chars.next();
    let body = chars.as_str();

    state.mode = state.persist.cmdline_origin;

    match prefix {
        Some('/') => search(state, MoveDir1D::Next, body),
        Some('?') => search(state, MoveDir1D::Previous, body),
        _ => {
            state.reset_pending();

            if !body.trim_start_matches([' ', ':']).is_empty() {
                command::execute(state, body)?;
            }

            state.mode = Mode::Normal;
            state.clamp_cursor_x();

            Ok(Effect::Changed)
        },
    }
}

/// Handle a token in Command-line mode.
pub(super) fn handle(state: &mut VimState, key: &KeyClass) -> EditResult<Effect> {
    match key {
        KeyClass::Char(c) => {
            state.command_line.push(*c);
        },
        KeyClass::Text(text) => {
            state.command_line.push_str(text);
        },
        KeyClass::Tab => {
            state.command_line.push('\t');
        },
        KeyClass::Backspace => {
            if state.command_line.len() <= prefix_len(state) {
                return Ok(leave(state));
            }

            state.command_line.pop();
        },
        KeyClass::Ctrl('u') => {
            let start = prefix_len(state);
            state.command_line.truncate(start);
        },
        KeyClass::Ctrl('w') => delete_word(state),
        KeyClass::Escape | KeyClass::Ctrl('c') => return Ok(leave(state)),
        KeyClass::Enter => return execute(state),
        _ => return Ok(Effect::Ignored),
    }

    Ok(Effect::Changed)
}
