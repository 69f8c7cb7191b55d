//! # Operators
//!
//! ## Overview
//!
//! Operators act on a region of text chosen by a motion, a text object, or a Visual selection.
//! This module turns those into an [EditRange] and applies operators, pastes and joins to it,
//! updating the registers and cursor the way Vim does.
use crate::editing::buffer::TextBuffer;
use crate::editing::cursor::Cursor;
use crate::editing::motion::{MotionKind, MotionTarget};
use crate::editing::store::{RegisterCell, RegisterPutFlags};
use crate::errors::{EditError, EditResult};
use crate::prelude::{MoveDir1D, Register, TargetShape};
use crate::state::{InsertKind, InsertSession, Mode, Operator, VimState};
use crate::util::sort2;

use super::Effect;

/// The text an operator acts on.
///
/// Character-wise ranges run from `start` up to, but not including, `end`. Line-wise ranges
/// cover every line from `start.y` through `end.y`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct EditRange {
    pub start: Cursor,
    pub end: Cursor,
    pub shape: TargetShape,
}

impl EditRange {
    pub fn chars(start: Cursor, end: Cursor) -> Self {
        EditRange { start, end, shape: TargetShape::CharWise }
    }

    pub fn lines(a: usize, b: usize) -> Self {
        let (a, b) = sort2(a, b);

        EditRange {
            start: Cursor::new(a, 0),
            end: Cursor::new(b, 0),
            shape: TargetShape::LineWise,
        }
    }
}

/// The range between the cursor and where a motion lands.
pub(super) fn motion_range(buf: &TextBuffer, cursor: &Cursor, target: &MotionTarget) -> EditRange {
    match target.kind {
        MotionKind::LineWise => EditRange::lines(cursor.y, target.pos.y),
        MotionKind::Inclusive => {
            let (start, end) = sort2(cursor.clone(), target.pos.clone());
            let end = buf.after(&end);

            EditRange::chars(start, end)
        },
        MotionKind::Exclusive => {
            let (start, end) = sort2(cursor.clone(), target.pos.clone());

            if end.x == 0 && end.y > start.y {
                /*
                 * An exclusive motion that ends in the first column of a later line stops at
                 * the end of the line before. If it also began at or before the first
                 * non-blank character, then it becomes line-wise.
                 */
                if start.x <= buf.first_word(start.y) {
                    return EditRange::lines(start.y, end.y - 1);
                }

                let end = Cursor::new(end.y - 1, buf.get_columns(end.y - 1));

                return EditRange::chars(start, end);
            }

            EditRange::chars(start, end)
        },
    }
}

fn put_register(state: &mut VimState, reg: &Register, append: bool, cell: RegisterCell, del: bool) {
    let mut flags = RegisterPutFlags::NONE;

    if append {
        flags |= RegisterPutFlags::APPEND;
    }

    if del {
        flags |= RegisterPutFlags::DELETE;
    }

    state.registers.put(reg, cell, flags);
}

fn copy_range(buf: &TextBuffer, range: &EditRange) -> RegisterCell {
    match range.shape {
        TargetShape::CharWise => RegisterCell::new(range.shape, buf.slice(&range.start, &range.end)),
        TargetShape::LineWise => {
            let mut text = buf.get_line_range(range.start.y, range.end.y).join("\n");
            text.push('\n');

            RegisterCell::new(range.shape, text)
        },
    }
}

/// Delete a range, storing what was removed in a register.
fn delete_range(state: &mut VimState, range: &EditRange, reg: &Register, append: bool) {
    let cell = copy_range(&state.buffer, range);

    if cell.is_empty() {
        return;
    }

    match range.shape {
        TargetShape::CharWise => {
            state.buffer.delete(&range.start, &range.end);
        },
        TargetShape::LineWise => {
            state.buffer.delete_lines(range.start.y, range.end.y);
        },
    }

    put_register(state, reg, append, cell, true);
}

/// Apply an operator to a range, leaving Normal mode's pending keys behind.
pub(super) fn apply_operator(
    state: &mut VimState,
    op: Operator,
    range: EditRange,
) -> EditResult<Effect> {
    let (reg, append) = state.take_register();
    state.reset_pending();

    match op {
        Operator::Delete => {
            delete_range(state, &range, &reg, append);

            match range.shape {
                TargetShape::CharWise => {
                    state.cursor = range.start;
                    state.clamp_cursor_x();
                },
                TargetShape::LineWise => {
                    state.goto_first_word(range.start.y);
                },
            }
        },
        Operator::Yank => {
            let cell = copy_range(&state.buffer, &range);

            if !cell.is_empty() {
                put_register(state, &reg, append, cell, false);
            }

            match range.shape {
                TargetShape::CharWise => {
                    state.cursor = range.start;
                },
                TargetShape::LineWise => {
                    if state.cursor.y != range.start.y {
                        state.cursor = Cursor::new(range.start.y, state.cursor.x);
                    }
                },
            }

            state.clamp_cursor_x();
        },
        Operator::Change => {
            match range.shape {
                TargetShape::CharWise => {
                    delete_range(state, &range, &reg, append);
                    state.cursor = range.start;
                },
                TargetShape::LineWise => {
                    let (s, e) = (range.start.y, range.end.y);
                    let cell = copy_range(&state.buffer, &range);

                    state.buffer.replace_lines(s, e, vec![String::new()]);
                    put_register(state, &reg, append, cell, true);
                    state.cursor = Cursor::new(s, 0);
                },
            }

            start_insert(state, InsertKind::Insert, 1);
        },
        Operator::ShiftRight | Operator::ShiftLeft => {
            let dir = if op == Operator::ShiftRight {
                MoveDir1D::Next
            } else {
                MoveDir1D::Previous
            };

            shift_lines(state, range.start.y, range.end.y, 1, dir)?;
            state.goto_first_word(range.start.y);
        },
        Operator::ToggleCase | Operator::Lowercase | Operator::Uppercase => {
            change_case(state, &range, op);

            match range.shape {
                TargetShape::CharWise => {
                    state.cursor = range.start;
                },
                TargetShape::LineWise => {
                    if state.cursor.y != range.start.y {
                        state.cursor = Cursor::new(range.start.y, state.cursor.x);
                    }
                },
            }

            state.clamp_cursor_x();
        },
    }

    Ok(Effect::Changed)
}

/// Switch to Insert or Replace mode, starting a new session to repeat on `<Esc>`.
pub(super) fn start_insert(state: &mut VimState, kind: InsertKind, count: usize) {
    state.mode = match kind {
        InsertKind::Replace => Mode::Replace,
        _ => Mode::Insert,
    };
    state.persist.insert = Some(InsertSession::new(kind, count));
    state.reset_pending();
    state.clamp_cursor_x();
}

/// Open a new line below or above the cursor's line, moving the cursor onto it.
pub(super) fn open_line(state: &mut VimState, dir: MoveDir1D) -> EditResult<()> {
    state.check_lines(1)?;

    let y = match dir {
        MoveDir1D::Next => state.cursor.y + 1,
        MoveDir1D::Previous => state.cursor.y,
    };

    state.buffer.insert_lines(y, vec![String::new()]);
    state.cursor = Cursor::new(y, 0);

    Ok(())
}

/// Shift lines by `levels` indentation levels.
///
/// Fails without changing anything if the new indentation wouldn't fit in the buffer.
pub(super) fn shift_lines(
    state: &mut VimState,
    s: usize,
    e: usize,
    levels: usize,
    dir: MoveDir1D,
) -> EditResult<()> {
    let config = state.config;
    let amount = config.shift_width().saturating_mul(levels);
    let mut room = state.byte_room();
    let mut shifted = vec![];

    for y in s..=e.min(state.buffer.max_line_idx()) {
        let line = state.buffer.line(y);

        if line.is_empty() {
            continue;
        }

        let width = config.indent_width(line);
        let width = match dir {
            MoveDir1D::Next => width.saturating_add(amount),
            MoveDir1D::Previous => width.saturating_sub(amount),
        };

        let body = line.trim_start_matches([' ', '\t']);
        let grow = config.indent_len(width).saturating_sub(line.len() - body.len());

        room = room.checked_sub(grow).ok_or(EditError::TooManyBytes(config.max_bytes))?;
        shifted.push((y, format!("{}{}", config.indent_text(width), body)));
    }

    for (y, text) in shifted {
        state.buffer.set_line(y, text);
    }

    Ok(())
}

fn convert_case(text: &str, op: Operator) -> String {
    match op {
        Operator::Lowercase => text.to_lowercase(),
        Operator::Uppercase => text.to_uppercase(),
        _ => {
            text.chars()
                .flat_map(|c| {
                    let s: Vec<char> = if c.is_lowercase() {
                        c.to_uppercase().collect()
                    } else {
                        c.to_lowercase().collect()
                    };

                    s.into_iter()
                })
                .collect()
        },
    }
}

fn change_case(state: &mut VimState, range: &EditRange, op: Operator) {
    match range.shape {
        TargetShape::CharWise => {
            let text = state.buffer.slice(&range.start, &range.end);

            if text.is_empty() {
                return;
            }

            state.buffer.delete(&range.start, &range.end);
            state.buffer.insert_text(&range.start, &convert_case(&text, op));
        },
        TargetShape::LineWise => {
            for y in range.start.y..=range.end.y.min(state.buffer.max_line_idx()) {
                let text = convert_case(state.buffer.line(y), op);
                state.buffer.set_line(y, text);
            }
        },
    }
}

/// Toggle the case of `count` characters under and after the cursor, as `~` does.
pub(super) fn toggle_chars(state: &mut VimState, count: usize) {
    let y = state.cursor.y;
    let len = state.buffer.get_columns(y);

    if len == 0 {
        return;
    }

    let x = state.cursor.x.min(len - 1);
    let end = x.saturating_add(count).min(len);
    let range = EditRange::chars(Cursor::new(y, x), Cursor::new(y, end));

    change_case(state, &range, Operator::ToggleCase);
    state.cursor = Cursor::new(y, end.min(state.buffer.get_columns(y).saturating_sub(1)));
}

/// Replace `count` characters starting at the cursor with `c`, as `r` does.
pub(super) fn replace_chars(state: &mut VimState, c: char, count: usize) -> EditResult<Effect> {
    let y = state.cursor.y;
    let x = state.cursor.x;
    let len = state.buffer.get_columns(y);

    state.reset_pending();

    if len == 0 || x.saturating_add(count) > len {
        return Ok(Effect::Changed);
    }

    let start = Cursor::new(y, x);
    let end = Cursor::new(y, x + count);

    if c == '\n' {
        state.check_lines(1)?;
        state.buffer.delete(&start, &end);
        state.buffer.insert_text(&start, "\n");
        state.goto_first_word(y + 1);

        return Ok(Effect::Changed);
    }

    let text: String = std::iter::repeat(c).take(count).collect();
    state.buffer.delete(&start, &end);
    state.buffer.insert_text(&start, &text);
    state.cursor = Cursor::new(y, x + count - 1);

    Ok(Effect::Changed)
}

/// Replace every character in a range with `c`, keeping line breaks.
pub(super) fn replace_range(state: &mut VimState, range: &EditRange, c: char) {
    let (start, end) = match range.shape {
        TargetShape::CharWise => (range.start.clone(), range.end.clone()),
        TargetShape::LineWise => {
            let e = range.end.y.min(state.buffer.max_line_idx());
            (Cursor::new(range.start.y, 0), Cursor::new(e, state.buffer.get_columns(e)))
        },
    };

    let text = state.buffer.slice(&start, &end);

    if text.is_empty() {
        return;
    }

    let replaced: String = text.chars().map(|t| if t == '\n' { t } else { c }).collect();
    state.buffer.delete(&start, &end);
    state.buffer.insert_text(&start, &replaced);
    state.cursor = start;
    state.clamp_cursor_x();
}

/// Join `count` lines starting at line `y`.
pub(super) fn join(state: &mut VimState, y: usize, count: usize, spaces: bool) {
    if let Some(col) = state.buffer.join_lines(y, count, spaces) {
        state.cursor = Cursor::new(y, col);
        state.clamp_cursor_x();
    }
}

/// Paste a register's contents `count` times, after (`p`) or before (`P`) the cursor.
pub(super) fn put(
    state: &mut VimState,
    cell: &RegisterCell,
    dir: MoveDir1D,
    count: usize,
) -> EditResult<Effect> {
    state.reset_pending();

    if cell.is_empty() {
        return Ok(Effect::Changed);
    }

    let count = count.max(1);

    match cell.shape {
        TargetShape::LineWise => {
            let text = cell.value.strip_suffix('\n').unwrap_or(&cell.value);
            let lines: Vec<String> = text.split('\n').map(String::from).collect();
            let total = lines.len().saturating_mul(count);

            state.check_lines(total)?;
            state.check_bytes(cell.value.len().saturating_mul(count))?;

            let mut all = Vec::with_capacity(total);
            for _ in 0..count {
                all.extend(lines.iter().cloned());
            }

            let y = match dir {
                MoveDir1D::Next => state.cursor.y + 1,
                MoveDir1D::Previous => state.cursor.y,
            };

            state.buffer.insert_lines(y, all);
            state.goto_first_word(y);
        },
        TargetShape::CharWise => {
            let added = cell.value.matches('\n').count().saturating_mul(count);
            state.check_lines(added)?;
            state.check_bytes(cell.value.len().saturating_mul(count))?;

            let text = cell.value.repeat(count);
            let y = state.cursor.y;
            let len = state.buffer.get_columns(y);
            let x = match dir {
                MoveDir1D::Next if len > 0 => (state.cursor.x + 1).min(len),
                _ => state.cursor.x.min(len),
            };

            let at = Cursor::new(y, x);
            let end = state.buffer.insert_text(&at, &text);

            if added == 0 {
                state.cursor = Cursor::new(y, end.x.saturating_sub(1));
            } else {
                state.cursor = at;
            }

            state.clamp_cursor_x();
        },
    }

    Ok(Effect::Changed)
}

/// Replace a Visual selection with a register's contents.
pub(super) fn put_over(state: &mut VimState, range: EditRange, count: usize) -> EditResult<Effect> {
    let (reg, _) = state.take_register();
    let cell = state.registers.get(&reg);

    if cell.is_empty() {
        state.reset_pending();
        return Ok(Effect::Changed);
    }

    let count = count.max(1);
    let added = cell.value.matches('\n').count().saturating_mul(count);
    state.check_lines(added.saturating_add(1))?;
    state.check_bytes(cell.value.len().saturating_mul(count))?;

    let removed = copy_range(&state.buffer, &range);

    match (range.shape, cell.shape) {
        (TargetShape::LineWise, TargetShape::LineWise) => {
            let text = cell.value.strip_suffix('\n').unwrap_or(&cell.value);
            let lines: Vec<String> = text.split('\n').map(String::from).collect();
            let mut all = vec![];
            for _ in 0..count {
                all.extend(lines.iter().cloned());
            }

            state.buffer.replace_lines(range.start.y, range.end.y, all);
            state.goto_first_word(range.start.y);
        },
        (TargetShape::LineWise, TargetShape::CharWise) => {
            let text = cell.value.repeat(count);
            let lines: Vec<String> = text.split('\n').map(String::from).collect();

            state.buffer.replace_lines(range.start.y, range.end.y, lines);
            state.goto_first_word(range.start.y);
        },
        (TargetShape::CharWise, TargetShape::LineWise) => {
            /*
             * Putting lines over characters splits the line around the selection and puts the
             * new lines in between.
             */
            state.buffer.delete(&range.start, &range.end);

            let mut text = String::from("\n");
            text.push_str(&cell.value.repeat(count));
            state.buffer.insert_text(&range.start, &text);
            state.goto_first_word(range.start.y + 1);
        },
        (TargetShape::CharWise, TargetShape::CharWise) => {
            state.buffer.delete(&range.start, &range.end);

            let end = state.buffer.insert_text(&range.start, &cell.value.repeat(count));

            if cell.value.contains('\n') {
                state.cursor = range.start.clone();
            } else {
                state.cursor = Cursor::new(end.y, end.x.saturating_sub(1));
            }
        },
    }

    if !removed.is_empty() {
        put_register(state, &Register::Unnamed, false, removed, true);
    }

    state.reset_pending();
    state.clamp_cursor_x();

    Ok(Effect::Changed)
}
