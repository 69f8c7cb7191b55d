//! # Visual mode
//!
//! ## Overview
//!
//! Visual mode selects text between an anchor and the cursor. Motions move the cursor and so
//! extend the selection, while operators act on the selection and return to Normal mode.
//! Visual Line mode always selects whole lines.
use crate::editing::cursor::Cursor;
use crate::editing::motion::{Motion, TextObject};
use crate::errors::EditResult;
use crate::prelude::{MoveDir1D, TargetShape};
use crate::state::{InsertKind, Mode, Operator, PendingKey, VimState};
use crate::util::sort2;

use super::normal;
use super::ops::{self, EditRange};
use super::{cmdline, Effect, KeyClass};

fn anchor(state: &VimState) -> Cursor {
    state.visual_anchor.clone().unwrap_or_else(|| state.cursor.clone())
}

/// The first and last selected lines.
fn selected_lines(state: &VimState) -> (usize, usize) {
    sort2(anchor(state).y, state.cursor.y)
}

/// The selected text, as an operator sees it.
fn selection(state: &VimState) -> EditRange {
    match state.mode {
        Mode::VisualLine => {
            let (s, e) = selected_lines(state);

            EditRange::lines(s, e)
        },
        _ => {
            let (start, end) = sort2(anchor(state), state.cursor.clone());

            EditRange::chars(start, state.buffer.after(&end))
        },
    }
}

fn leave(state: &mut VimState) -> Effect {
    state.end_visual();
    state.reset_pending();
    state.clamp_cursor_x();

    Effect::Changed
}

fn operate(state: &mut VimState, op: Operator, lines: bool) -> EditResult<Effect> {
    let range = if lines {
        let (s, e) = selected_lines(state);

        EditRange::lines(s, e)
    } else {
        selection(state)
    };

    state.end_visual();

    ops::apply_operator(state, op, range)
}

fn shift(state: &mut VimState, dir: MoveDir1D) -> EditResult<Effect> {
    let levels = state.take_count().unwrap_or(1);
    let (s, e) = selected_lines(state);

    state.end_visual();
    state.reset_pending();
    ops::shift_lines(state, s, e, levels, dir)?;
    state.goto_first_word(s);

    Ok(Effect::Changed)
}

fn join(state: &mut VimState, spaces: bool) -> EditResult<Effect> {
    let (s, e) = selected_lines(state);
    let count = (e - s + 1).max(2);

    state.end_visual();
    state.reset_pending();
    ops::join(state, s, count, spaces);

    Ok(Effect::Changed)
}

fn insert(state: &mut VimState, append: bool) -> EditResult<Effect> {
    let range = selection(state);

    state.end_visual();
    state.reset_pending();

    state.cursor = match (append, range.shape) {
        (false, _) => range.start,
        (true, TargetShape::CharWise) => range.end,
        (true, TargetShape::LineWise) => {
            Cursor::new(range.end.y, state.buffer.get_columns(range.end.y))
        },
    };
    ops::start_insert(state, InsertKind::Insert, 1);

    Ok(Effect::Changed)
}

fn switch(state: &mut VimState, mode: Mode) -> Effect {
    if state.mode == mode {
        return leave(state);
    }

    state.mode = mode;
    state.reset_pending();

    Effect::Changed
}

fn select_object(state: &mut VimState, inner: bool, c: char) -> Effect {
    let count = state.take_count().unwrap_or(1);
    state.reset_pending();

    let Some(obj) = TextObject::from_char(c) else {
        return Effect::Changed;
    };

    if let Some((start, end)) = obj.range(&state.buffer, &state.cursor, inner, count) {
        let last = state.buffer.prev_pos(&end).unwrap_or_else(|| start.clone());

        state.visual_anchor = Some(start);
        state.cursor = last;
        state.clamp_cursor_x();
    }

    Effect::Changed
}

fn g_key(state: &mut VimState, c: char) -> EditResult<Effect> {
    match c {
        'g' => normal::run_motion(state, Motion::GotoLine(MoveDir1D::Previous)),
        'J' => join(state, false),
        '~' => operate(state, Operator::ToggleCase, false),
        'u' => operate(state, Operator::Lowercase, false),
        'U' => operate(state, Operator::Uppercase, false),
        _ => {
            state.reset_pending();

            Ok(Effect::Changed)
        },
    }
}

fn pending_key(state: &mut VimState, pending: PendingKey, key: &KeyClass) -> EditResult<Effect> {
    let KeyClass::Char(c) = key else {
        state.reset_pending();
        return Ok(Effect::Changed);
    };
    let c = *c;

    match pending {
        PendingKey::G => g_key(state, c),
        PendingKey::Register => Ok(normal::select_register(state, c)),
        PendingKey::Replace => {
            let range = selection(state);

            state.end_visual();
            state.reset_pending();
            ops::replace_range(state, &range, c);

            Ok(Effect::Changed)
        },
        PendingKey::Find(dir, till) => normal::find_char(state, dir, till, c),
        PendingKey::TextObject(inner) => Ok(select_object(state, inner, c)),
        PendingKey::Record | PendingKey::Discard => {
            state.reset_pending();

            Ok(Effect::Changed)
        },
    }
}

fn set_pending_key(state: &mut VimState, key: PendingKey) -> EditResult<Effect> {
    state.pending.key = Some(key);

    Ok(Effect::Changed)
}

fn visual_char(state: &mut VimState, c: char) -> EditResult<Effect> {
    if normal::count_digit(state, c) {
        return Ok(Effect::Changed);
    }

    match c {
        'd' | 'x' => operate(state, Operator::Delete, false),
        'D' | 'X' => operate(state, Operator::Delete, true),
        'y' => operate(state, Operator::Yank, false),
        'Y' => operate(state, Operator::Yank, true),
        'c' | 's' => operate(state, Operator::Change, false),
        'C' | 'S' | 'R' => operate(state, Operator::Change, true),
        '~' => operate(state, Operator::ToggleCase, false),
        'u' => operate(state, Operator::Lowercase, false),
        'U' => operate(state, Operator::Uppercase, false),
        '>' => shift(state, MoveDir1D::Next),
        '<' => shift(state, MoveDir1D::Previous),
        'J' => join(state, true),
        'p' | 'P' => {
            let count = state.take_count().unwrap_or(1);
            let range = selection(state);

            state.end_visual();
            ops::put_over(state, range, count)
        },
        'I' => insert(state, false),
        'A' => insert(state, true),
        'o' | 'O' => {
            if let Some(anchor) = state.visual_anchor.take() {
                state.visual_anchor = Some(state.cursor.clone());
                state.cursor = anchor;
            }

            state.reset_pending();

            Ok(Effect::Changed)
        },
        'v' => Ok(switch(state, Mode::Visual)),
        'V' => Ok(switch(state, Mode::VisualLine)),
        ':' => {
            state.end_visual();
            state.reset_pending();
            cmdline::enter(state, String::from(":'<,'>"));

            Ok(Effect::Changed)
        },
        '/' | '?' => {
            cmdline::enter(state, c.to_string());

            Ok(Effect::Changed)
        },
        '"' => set_pending_key(state, PendingKey::Register),
        'g' => set_pending_key(state, PendingKey::G),
        'r' => set_pending_key(state, PendingKey::Replace),
        'f' => set_pending_key(state, PendingKey::Find(MoveDir1D::Next, false)),
        'F' => set_pending_key(state, PendingKey::Find(MoveDir1D::Previous, false)),
        't' => set_pending_key(state, PendingKey::Find(MoveDir1D::Next, true)),
        'T' => set_pending_key(state, PendingKey::Find(MoveDir1D::Previous, true)),
        'i' | 'a' => set_pending_key(state, PendingKey::TextObject(c == 'i')),
        c => {
            match normal::motion_char(state, c) {
                Some(res) => res,
                None => Ok(normal::cancel(state)),
            }
        },
    }
}

/// Handle a token in Visual or Visual Line mode.
pub(super) fn handle(state: &mut VimState, key: &KeyClass) -> EditResult<Effect> {
    if let KeyClass::Text(_) | KeyClass::Other = key {
        return Ok(Effect::Ignored);
    }

    if let Some(pending) = state.pending.key.take() {
        return pending_key(state, pending, key);
    }

    match key {
        KeyClass::Escape | KeyClass::Ctrl('c') => Ok(leave(state)),
        KeyClass::Delete => operate(state, Operator::Delete, false),
        KeyClass::Char(c) => visual_char(state, *c),
        key => {
            match normal::motion_key(key) {
                Some(motion) => normal::run_motion(state, motion),
                None => Ok(normal::cancel(state)),
            }
        },
    }
}
