//! # Insert and Replace mode
//!
//! ## Overview
//!
//! Typing in Insert mode adds text before the cursor, while Replace mode overwrites the text
//! under it. Tokens typed since entering either mode are kept so that a count given to the
//! command that entered it (`3ix<Esc>`, `2ofoo<Esc>`) can repeat them when leaving.
use tracing::debug;

use crate::editing::cursor::Cursor;
use crate::errors::EditResult;
use crate::prelude::{MoveDir1D, WordStyle};
use crate::state::{InsertKind, InsertSession, Mode, VimState};
use crate::tokenizer::Token;

use super::ops;
use super::{Effect, KeyClass};

/// The most tokens that leaving Insert mode will replay.
const REPLAY_LIMIT: usize = 1 << 20;

fn type_char(state: &mut VimState, c: char) {
    let cursor = state.cursor.clone();
    let len = state.buffer.get_columns(cursor.y);

    if state.mode == Mode::Replace {
        let old = if cursor.x < len {
            let end = Cursor::new(cursor.y, cursor.x + 1);
            state.buffer.delete(&cursor, &end).chars().next()
        } else {
            None
        };

        if let Some(session) = state.persist.insert.as_mut() {
            session.replaced.push(old);
        }
    }

    let end = state.buffer.insert_text(&cursor, c.encode_utf8(&mut [0; 4]));
    state.cursor = end;
}

fn type_tab(state: &mut VimState) {
    if !state.config.expandtab {
        type_char(state, '\t');
        return;
    }

    let tabstop = state.config.tabstop.max(1);
    let spaces = tabstop - state.cursor.x % tabstop;

    for _ in 0..spaces {
        type_char(state, ' ');
    }
}

fn split_line(state: &mut VimState) -> EditResult<()> {
    state.check_lines(1)?;

    if state.mode == Mode::Replace {
        if let Some(session) = state.persist.insert.as_mut() {
            session.replaced.push(None);
        }
    }

    let cursor = state.cursor.clone();
    state.cursor = state.buffer.insert_text(&cursor, "\n");

    Ok(())
}

/// Delete the character before the cursor, joining with the previous line in the first column.
fn delete_before(state: &mut VimState) {
    let cursor = state.cursor.clone();

    if let Some(prev) = state.buffer.prev_pos(&cursor) {
        state.buffer.delete(&prev, &cursor);
        state.cursor = prev;
    }
}

fn backspace(state: &mut VimState) {
    if state.mode != Mode::Replace {
        delete_before(state);
        return;
    }

    let restore = state.persist.insert.as_mut().and_then(|session| session.replaced.pop());

    match restore {
        Some(Some(old)) => {
            delete_before(state);

            let cursor = state.cursor.clone();
            state.buffer.insert_text(&cursor, old.encode_utf8(&mut [0; 4]));
        },
        Some(None) => {
            delete_before(state);
        },
        None => {
            // Only move over text that wasn't typed in this session.
            if let Some(prev) = state.buffer.prev_pos(&state.cursor) {
                if prev.y == state.cursor.y {
                    state.cursor = prev;
                }
            }
        },
    }
}

fn delete_under(state: &mut VimState) {
    let cursor = state.cursor.clone();

    if let Some(next) = state.buffer.next_pos(&cursor) {
        state.buffer.delete(&cursor, &next);
    }
}

/// Delete the word before the cursor, as `<C-w>` does.
fn delete_word_before(state: &mut VimState) {
    let cursor = state.cursor.clone();

    if cursor.x == 0 {
        delete_before(state);
        return;
    }

    let chars: Vec<char> = state.buffer.line(cursor.y).chars().take(cursor.x).collect();
    let style = WordStyle::Little;
    let mut x = chars.len();

    while x > 0 && style.classify(chars[x - 1]) == 0 {
        x -= 1;
    }

    if x > 0 {
        let class = style.classify(chars[x - 1]);

        while x > 0 && style.classify(chars[x - 1]) == class {
            x -= 1;
        }
    }

    let start = Cursor::new(cursor.y, x);
    state.buffer.delete(&start, &cursor);
    state.cursor = start;
}

/// Delete from the start of the line up to the cursor, as `<C-u>` does.
fn delete_line_before(state: &mut VimState) {
    let cursor = state.cursor.clone();

    if cursor.x == 0 {
        delete_before(state);
        return;
    }

    let start = Cursor::new(cursor.y, 0);
    state.buffer.delete(&start, &cursor);
    state.cursor = start;
}

/// Move the cursor, which starts a new insert that won't be repeated.
fn move_cursor(state: &mut VimState, key: &KeyClass) {
    let y = state.cursor.y;
    let len = state.buffer.get_columns(y);

    match key {
        KeyClass::Left => {
            state.cursor.left(1);
        },
        KeyClass::Right => {
            state.cursor.right(1);
        },
        KeyClass::Up => {
            state.cursor.up(1);
        },
        KeyClass::Down => {
            state.cursor.down(1);
        },
        KeyClass::Home => {
            state.cursor = Cursor::new(y, 0);
        },
        KeyClass::End => {
            state.cursor = Cursor::new(y, len);
        },
        _ => {},
    }

    match key {
        KeyClass::Up | KeyClass::Down => state.clamp_cursor(),
        _ => state.clamp_cursor_x(),
    }

    if let Some(session) = state.persist.insert.as_mut() {
        *session = InsertSession::new(session.kind, 1);
    }
}

fn type_key(state: &mut VimState, key: &KeyClass) -> EditResult<Effect> {
    match key {
        KeyClass::Char(c) => type_char(state, *c),
        KeyClass::Text(text) => {
            for c in text.chars() {
                type_char(state, c);
            }
        },
        KeyClass::Enter => split_line(state)?,
        KeyClass::Tab => type_tab(state),
        KeyClass::Backspace => backspace(state),
        KeyClass::Delete => delete_under(state),
        KeyClass::Ctrl('w') => delete_word_before(state),
        KeyClass::Ctrl('u') => delete_line_before(state),
        KeyClass::Left |
        KeyClass::Right |
        KeyClass::Up |
        KeyClass::Down |
        KeyClass::Home |
        KeyClass::End => move_cursor(state, key),
        KeyClass::Escape | KeyClass::Ctrl(_) | KeyClass::Other => return Ok(Effect::Ignored),
    }

    Ok(Effect::Changed)
}

/// Return to Normal mode.
pub(super) fn finish(state: &mut VimState) {
    state.persist.insert = None;
    state.mode = Mode::Normal;
    state.cursor.left(1);
    state.clamp_cursor_x();
}

/// Repeat the session's typing for the rest of its count, then return to Normal mode.
///
/// When the repeats don't fit in the buffer, none of them happen and the error is returned.
fn leave(state: &mut VimState) -> EditResult<Effect> {
    if let Some(session) = state.persist.insert.take() {
        let repeats = session.count.saturating_sub(1);

        if repeats > 0 && !session.keys.is_empty() {
            let repeats = repeats.min(REPLAY_LIMIT / session.keys.len());

            if let Err(err) = replay(state, &session, repeats) {
                debug!(%err, "not repeating insert");
                return Err(err);
            }
        }
    }

    finish(state);

    Ok(Effect::Changed)
}

/// The most bytes that typing `token` can add.
fn typed_len(token: &Token, tabstop: usize) -> usize {
    match KeyClass::from(token) {
        KeyClass::Char(c) => c.len_utf8(),
        KeyClass::Text(text) => text.len(),
        KeyClass::Enter => 1,
        KeyClass::Tab => tabstop.max(1),
        _ => 0,
    }
}

fn replay(state: &mut VimState, session: &InsertSession, repeats: usize) -> EditResult<()> {
    let tabstop = state.config.tabstop;
    let typed = session.keys.iter().map(|token| typed_len(token, tabstop)).sum::<usize>();

    // Opening a line adds a line break.
    state.check_bytes(typed.saturating_add(1).saturating_mul(repeats))?;

    for _ in 0..repeats {
        match session.kind {
            InsertKind::OpenBelow | InsertKind::OpenAbove => {
                ops::open_line(state, MoveDir1D::Next)?;
            },
            InsertKind::Insert | InsertKind::Replace => {},
        }

        for token in session.keys.iter() {
            type_key(state, &KeyClass::from(token))?;
        }
    }

    Ok(())
}

/// Handle a token in Insert or Replace mode.
pub(super) fn handle(state: &mut VimState, key: &KeyClass, token: &Token) -> EditResult<Effect> {
    if let KeyClass::Escape | KeyClass::Ctrl('c') = key {
        return leave(state);
    }

    let effect = type_key(state, key)?;

    if effect == Effect::Changed {
        let moved = matches!(
            key,
            KeyClass::Left |
                KeyClass::Right |
                KeyClass::Up |
                KeyClass::Down |
                KeyClass::Home |
                KeyClass::End
        );

        if let Some(session) = state.persist.insert.as_mut().filter(|_| !moved) {
            session.keys.push(token.clone());
        }
    }

    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterpreterConfig;
    use crate::env::vim::tests::{fails, keys, run};
    use crate::errors::EditError;

    fn pos(state: &VimState) -> (usize, usize) {
        (state.cursor_line(), state.cursor_col())
    }

    #[test]
    fn test_typing() {
        let state = keys("", "ihello<Esc>");
        assert_eq!(state.text(), "hello");
        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(pos(&state), (0, 4));

        let state = keys("", "ia<CR>b<Tab>c<Esc>");
        assert_eq!(state.lines(), &strs!["a", "b\tc"]);

        let state = keys("", "i<div><Esc>");
        assert_eq!(state.text(), "<div>");

        let state = keys("ab", "A\ncd<C-c>");
        assert_eq!(state.lines(), &strs!["ab", "cd"]);
        assert_eq!(pos(&state), (1, 1));
    }

    #[test]
    fn test_insert_mode_state() {
        let state = keys("abc", "li");
        assert_eq!(state.mode(), Mode::Insert);
        assert_eq!(pos(&state), (0, 1));

        let state = keys("abc", "A");
        assert_eq!(pos(&state), (0, 3));
    }

    #[test]
    fn test_backspace() {
        let state = keys("abc", "A<BS><BS><Esc>");
        assert_eq!(state.text(), "a");

        let state = keys("ab\ncd", "ji<BS><Esc>");
        assert_eq!(state.text(), "abcd");
        assert_eq!(pos(&state), (0, 1));

        let state = keys("ab", "i<BS><BS>x<Esc>");
        assert_eq!(state.text(), "xab");
    }

    #[test]
    fn test_delete_keys() {
        let state = keys("ab\ncd", "A<Del><Esc>");
        assert_eq!(state.text(), "abcd");

        let state = keys("foo bar", "A<C-w><Esc>");
        assert_eq!(state.text(), "foo ");

        let state = keys("foo bar  ", "A<C-w><Esc>");
        assert_eq!(state.text(), "foo ");

        let state = keys("foo bar", "A<C-u><Esc>");
        assert_eq!(state.text(), "");
    }

    #[test]
    fn test_replace_mode() {
        let state = keys("abcd", "Rxy<Esc>");
        assert_eq!(state.text(), "xycd");
        assert_eq!(pos(&state), (0, 1));

        let state = keys("ab", "Rwxyz<Esc>");
        assert_eq!(state.text(), "wxyz");

        let state = keys("abcd", "Rxyz<BS><BS><Esc>");
        assert_eq!(state.text(), "xbcd");

        let state = keys("ab", "lRxyz<BS><BS><BS><BS><Esc>");
        assert_eq!(state.text(), "ab");
        assert_eq!(pos(&state), (0, 0));
    }

    #[test]
    fn test_count_repeat() {
        let state = keys("", "3ix<Esc>");
        assert_eq!(state.text(), "xxx");
        assert_eq!(pos(&state), (0, 2));

        let state = keys("", "2ofoo<Esc>");
        assert_eq!(state.lines(), &strs!["", "foo", "foo"]);
        assert_eq!(pos(&state), (2, 2));

        let state = keys("z", "2Oab<Esc>");
        assert_eq!(state.lines(), &strs!["ab", "ab", "z"]);

        let state = keys("", "3ia<Left>b<Esc>");
        assert_eq!(state.text(), "ba");
    }

    #[test]
    fn test_count_repeat_limits() {
        let mut config = InterpreterConfig::default();
        config.max_bytes(10);

        let state = VimState::with_config("", config);
        let state = run(state, "3iab<Esc>").unwrap();
        assert_eq!(state.text(), "ababab");

        let state = VimState::with_config("", config);
        let (state, err) = fails(state, "5iab<Esc>");
        assert_eq!(err, EditError::TooManyBytes(10));
        assert_eq!(state.text(), "ab");
        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(pos(&state), (0, 1));

        let mut config = InterpreterConfig::default();
        config.max_lines(3);

        let state = VimState::with_config("z", config);
        let (state, err) = fails(state, "5ofoo<Esc>");
        assert_eq!(err, EditError::TooManyLines(3));
        assert_eq!(state.lines(), &strs!["z", "foo"]);
        assert_eq!(state.mode(), Mode::Normal);
    }

    #[test]
    fn test_enter_line_limit() {
        let mut config = InterpreterConfig::default();
        config.max_lines(2);

        let state = VimState::with_config("a\nb", config);
        let (state, err) = fails(state, "A<CR>");

        assert_eq!(err.to_string(), "Buffer would exceed the 2 line limit");
        assert_eq!(state.mode(), Mode::Insert);
        assert_eq!(state.text(), "a\nb");
    }

    #[test]
    fn test_expandtab() {
        let mut config = InterpreterConfig::default();
        config.expandtab(true).tabstop(4);

        let state = VimState::with_config("", config);
        let state = run(state, "iab<Tab>c<Esc>").unwrap();

        assert_eq!(state.text(), "ab  c");
    }
}
