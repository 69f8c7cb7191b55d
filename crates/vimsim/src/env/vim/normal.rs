//! # Normal mode
//!
//! ## Overview
//!
//! Normal mode keys build up a command from an optional register, counts, an operator, and a
//! motion or text object. Partially typed commands live in [VimState]'s pending state between
//! tokens, so that each token can be interpreted on its own.
use crate::commands::CommandError;
use crate::editing::cursor::Cursor;
use crate::editing::motion::{self, Motion, TextObject};
use crate::errors::EditResult;
use crate::prelude::{CharSearch, MoveDir1D, Register, WordStyle};
use crate::state::{InsertKind, Mode, Operator, PendingKey, PendingOperator, VimState};

use super::ops::{self, EditRange};
use super::{cmdline, command, regex, Effect, KeyClass};

/// The motion bound to a key, when it doesn't depend on earlier commands.
pub(super) fn motion_key(key: &KeyClass) -> Option<Motion> {
    let motion = match key {
        KeyClass::Char(c) => {
            match c {
                'h' => Motion::Left,
                'l' | ' ' => Motion::Right,
                'j' => Motion::Down,
                'k' => Motion::Up,
                'w' => Motion::WordStart(WordStyle::Little, MoveDir1D::Next),
                'W' => Motion::WordStart(WordStyle::Big, MoveDir1D::Next),
                'b' => Motion::WordStart(WordStyle::Little, MoveDir1D::Previous),
                'B' => Motion::WordStart(WordStyle::Big, MoveDir1D::Previous),
                'e' => Motion::WordEnd(WordStyle::Little),
                'E' => Motion::WordEnd(WordStyle::Big),
                '0' => Motion::LineStart,
                '^' => Motion::FirstWord,
                '$' => Motion::LineEnd,
                '_' => Motion::CurrentLineFirstWord,
                '+' => Motion::LineFirstWord(MoveDir1D::Next),
                '-' => Motion::LineFirstWord(MoveDir1D::Previous),
                'G' => Motion::GotoLine(MoveDir1D::Next),
                '%' => Motion::MatchPair,
                '{' => Motion::Paragraph(MoveDir1D::Previous),
                '}' => Motion::Paragraph(MoveDir1D::Next),
                _ => return None,
            }
        },
        KeyClass::Backspace | KeyClass::Left => Motion::Left,
        KeyClass::Right => Motion::Right,
        KeyClass::Up | KeyClass::Ctrl('p') => Motion::Up,
        KeyClass::Down | KeyClass::Ctrl('n') => Motion::Down,
        KeyClass::Enter => Motion::LineFirstWord(MoveDir1D::Next),
        KeyClass::Home => Motion::LineStart,
        KeyClass::End => Motion::LineEnd,
        _ => return None,
    };

    Some(motion)
}

/// Move the cursor with a motion, or apply the pending operator to the text it covers.
pub(super) fn run_motion(state: &mut VimState, motion: Motion) -> EditResult<Effect> {
    let count = state.take_count();
    let operator = state.pending.operator.as_ref().map(|op| op.operator);
    let target = motion.eval(&state.buffer, &state.cursor, count, operator.is_some());

    let Some(target) = target else {
        if let Motion::Search(..) = motion {
            let pattern = state.persist.last_search.as_ref().map(|s| s.0.clone());

            return Err(CommandError::PatternNotFound(pattern.unwrap_or_default()).into());
        }

        state.reset_pending();

        return Ok(Effect::Changed);
    };

    if let Some(op) = operator {
        let range = ops::motion_range(&state.buffer, &state.cursor, &target);

        return ops::apply_operator(state, op, range);
    }

    state.reset_pending();
    state.cursor = target.pos;
    state.clamp_cursor();

    if !matches!(motion, Motion::Up | Motion::Down | Motion::LineEnd) {
        state.cursor.xgoal = state.cursor.x;
    }

    Ok(Effect::Changed)
}

/// Run the motion bound to a character, if there is one.
pub(super) fn motion_char(state: &mut VimState, c: char) -> Option<EditResult<Effect>> {
    let res = match c {
        'n' | 'N' => search_next(state, c == 'N'),
        '*' => search_word(state, MoveDir1D::Next),
        '#' => search_word(state, MoveDir1D::Previous),
        ';' | ',' => repeat_find(state, c == ','),
        '0' if state.pending.count.is_some() => return None,
        c => run_motion(state, motion_key(&KeyClass::Char(c))?),
    };

    Some(res)
}

/// Handle a count digit, if `c` is one.
pub(super) fn count_digit(state: &mut VimState, c: char) -> bool {
    match c {
        '1'..='9' => {},
        '0' if state.pending.count.is_some() => {},
        _ => return false,
    }

    let digit = c.to_digit(10).unwrap_or(0) as usize;
    state.push_count_digit(digit);

    return true;
}

fn search_next(state: &mut VimState, reverse: bool) -> EditResult<Effect> {
    let Some((pattern, dir)) = state.persist.last_search.clone() else {
        return Err(CommandError::NoPreviousPattern.into());
    };

    let dir = if reverse { dir.flip() } else { dir };
    let regex = regex::compile(&pattern, &state.config, None)?;
    let wrap = state.config.wrapscan;

    run_motion(state, Motion::Search(regex, dir, wrap))
}

fn search_word(state: &mut VimState, dir: MoveDir1D) -> EditResult<Effect> {
    let Some((word, start)) = motion::word_at(&state.buffer, &state.cursor) else {
        return Err(CommandError::Error("No string under cursor".into()).into());
    };

    let pattern = format!("\\<{}\\>", regex::escape(&word));
    let regex = regex::compile(&pattern, &state.config, None)?;
    let wrap = state.config.wrapscan;

    state.persist.last_search = Some((pattern, dir));

    if state.pending.operator.is_none() {
        state.cursor = start;
    }

    run_motion(state, Motion::Search(regex, dir, wrap))
}

fn repeat_find(state: &mut VimState, reverse: bool) -> EditResult<Effect> {
    let Some(search) = state.persist.last_find else {
        state.reset_pending();
        return Ok(Effect::Changed);
    };

    let search = if reverse {
        CharSearch { dir: search.dir.flip(), ..search }
    } else {
        search
    };

    run_motion(state, Motion::FindChar(search, true))
}

/// Search for a character within the line, remembering it for `;` and `,`.
pub(super) fn find_char(
    state: &mut VimState,
    dir: MoveDir1D,
    till: bool,
    ch: char,
) -> EditResult<Effect> {
    let search = CharSearch { ch, dir, till };
    state.persist.last_find = Some(search);

    run_motion(state, Motion::FindChar(search, false))
}

/// Interpret the character after `"`.
pub(super) fn select_register(state: &mut VimState, c: char) -> Effect {
    match Register::from_char(c) {
        Some(reg) => {
            state.pending.register = Some(reg);
        },
        None => {
            state.reset_pending();
        },
    }

    Effect::Changed
}

/// Forget a partially typed command, ignoring the key if there was nothing to forget.
pub(super) fn cancel(state: &mut VimState) -> Effect {
    let idle = state.pending.operator.is_none() &&
        state.pending.count.is_none() &&
        state.pending.register.is_none();

    if idle {
        return Effect::Ignored;
    }

    state.reset_pending();

    return Effect::Changed;
}

fn begin_operator(state: &mut VimState, op: Operator) -> EditResult<Effect> {
    match state.pending.operator.as_ref().map(|pending| pending.operator) {
        Some(pending) if pending == op => line_operator(state, op),
        Some(_) => {
            state.reset_pending();

            Ok(Effect::Changed)
        },
        None => {
            let count = state.pending.count.take();
            state.pending.operator = Some(PendingOperator { operator: op, count });

            Ok(Effect::Changed)
        },
    }
}

/// Apply an operator to `count` lines, as `dd` and `yy` do.
fn line_operator(state: &mut VimState, op: Operator) -> EditResult<Effect> {
    let count = state.take_count().unwrap_or(1).max(1);
    let y = state.cursor.y;
    let end = y.saturating_add(count - 1).min(state.buffer.max_line_idx());

    ops::apply_operator(state, op, EditRange::lines(y, end))
}

/// Apply an operator with a fixed motion, as `x` and `D` do.
fn shortcut(state: &mut VimState, op: Operator, motion: Motion) -> EditResult<Effect> {
    state.pending.operator = Some(PendingOperator { operator: op, count: None });

    run_motion(state, motion)
}

fn text_object(state: &mut VimState, inner: bool, c: char) -> EditResult<Effect> {
    let Some(op) = state.pending.operator.as_ref().map(|op| op.operator) else {
        state.reset_pending();
        return Ok(Effect::Changed);
    };

    let Some(obj) = TextObject::from_char(c) else {
        state.reset_pending();
        return Ok(Effect::Changed);
    };

    let count = state.take_count().unwrap_or(1);

    let Some((start, end)) = obj.range(&state.buffer, &state.cursor, inner, count) else {
        state.reset_pending();
        return Ok(Effect::Changed);
    };

    let range = if start.x == 0 && end.x == 0 && end.y > start.y {
        EditRange::lines(start.y, end.y - 1)
    } else {
        EditRange::chars(start, end)
    };

    ops::apply_operator(state, op, range)
}

fn g_key(state: &mut VimState, c: char) -> EditResult<Effect> {
    match c {
        'g' => run_motion(state, Motion::GotoLine(MoveDir1D::Previous)),
        'j' => run_motion(state, Motion::Down),
        'k' => run_motion(state, Motion::Up),
        '0' => run_motion(state, Motion::LineStart),
        '^' => run_motion(state, Motion::FirstWord),
        '$' => run_motion(state, Motion::LineEnd),
        '~' => begin_operator(state, Operator::ToggleCase),
        'u' => begin_operator(state, Operator::Lowercase),
        'U' => begin_operator(state, Operator::Uppercase),
        'J' if state.pending.operator.is_none() => {
            let count = state.take_count().unwrap_or(2).max(2);
            let y = state.cursor.y;
            state.reset_pending();
            ops::join(state, y, count, false);

            Ok(Effect::Changed)
        },
        'I' if state.pending.operator.is_none() => {
            let count = state.take_count().unwrap_or(1);
            state.cursor = Cursor::new(state.cursor.y, 0);
            ops::start_insert(state, InsertKind::Insert, count);

            Ok(Effect::Changed)
        },
        _ => {
            state.reset_pending();

            Ok(Effect::Changed)
        },
    }
}

fn pending_key(state: &mut VimState, pending: PendingKey, key: &KeyClass) -> EditResult<Effect> {
    let ch = match key {
        KeyClass::Char(c) => Some(*c),
        KeyClass::Enter => Some('\n'),
        KeyClass::Tab => Some('\t'),
        _ => None,
    };

    let Some(c) = ch else {
        state.reset_pending();
        return Ok(Effect::Changed);
    };

    match pending {
        PendingKey::G => g_key(state, c),
        PendingKey::Register => Ok(select_register(state, c)),
        PendingKey::Replace => {
            let count = state.take_count().unwrap_or(1);

            ops::replace_chars(state, c, count)
        },
        PendingKey::Find(dir, till) => find_char(state, dir, till, c),
        PendingKey::TextObject(inner) => text_object(state, inner, c),
        PendingKey::Record => {
            if Register::from_char(c).is_some() {
                state.persist.recording = true;
            }

            state.reset_pending();

            Ok(Effect::Changed)
        },
        PendingKey::Discard => {
            state.reset_pending();

            Ok(Effect::Changed)
        },
    }
}

fn insert(state: &mut VimState, kind: InsertKind, x: usize) -> EditResult<Effect> {
    let count = state.take_count().unwrap_or(1);

    match kind {
        InsertKind::OpenBelow => ops::open_line(state, MoveDir1D::Next)?,
        InsertKind::OpenAbove => ops::open_line(state, MoveDir1D::Previous)?,
        InsertKind::Insert | InsertKind::Replace => {
            state.cursor = Cursor::new(state.cursor.y, x);
        },
    }

    ops::start_insert(state, kind, count);

    Ok(Effect::Changed)
}

fn paste(state: &mut VimState, dir: MoveDir1D) -> EditResult<Effect> {
    let (reg, _) = state.take_register();
    let count = state.take_count().unwrap_or(1);
    let cell = state.registers.get(&reg);

    ops::put(state, &cell, dir, count)
}

fn visual(state: &mut VimState, mode: Mode) -> Effect {
    state.reset_pending();
    state.visual_anchor = Some(state.cursor.clone());
    state.mode = mode;

    Effect::Changed
}

fn command_line(state: &mut VimState) -> EditResult<Effect> {
    let text = match state.take_count() {
        None => String::from(":"),
        Some(1) => String::from(":."),
        Some(n) => format!(":.,.+{}", n - 1),
    };

    state.reset_pending();
    cmdline::enter(state, text);

    Ok(Effect::Changed)
}

fn set_pending_key(state: &mut VimState, key: PendingKey) -> EditResult<Effect> {
    state.pending.key = Some(key);

    Ok(Effect::Changed)
}

/// Keys that run a command, rather than moving or starting an operator.
fn command_char(state: &mut VimState, c: char) -> EditResult<Effect> {
    let (x, y) = (state.cursor.x, state.cursor.y);
    let len = state.buffer.get_columns(y);

    match c {
        'x' => shortcut(state, Operator::Delete, Motion::Right),
        'X' => shortcut(state, Operator::Delete, Motion::Left),
        'D' => shortcut(state, Operator::Delete, Motion::LineEnd),
        'C' => shortcut(state, Operator::Change, Motion::LineEnd),
        's' => shortcut(state, Operator::Change, Motion::Right),
        'S' => line_operator(state, Operator::Change),
        'Y' => line_operator(state, Operator::Yank),
        '~' => {
            let count = state.take_count().unwrap_or(1);
            state.reset_pending();
            ops::toggle_chars(state, count);

            Ok(Effect::Changed)
        },
        'J' => {
            let count = state.take_count().unwrap_or(2).max(2);
            state.reset_pending();
            ops::join(state, y, count, true);

            Ok(Effect::Changed)
        },
        'r' => set_pending_key(state, PendingKey::Replace),
        'i' => insert(state, InsertKind::Insert, x),
        'a' => insert(state, InsertKind::Insert, (x + 1).min(len)),
        'I' => {
            let x = if state.buffer.line(y).trim().is_empty() {
                len
            } else {
                state.buffer.first_word(y)
            };

            insert(state, InsertKind::Insert, x)
        },
        'A' => insert(state, InsertKind::Insert, len),
        'o' => insert(state, InsertKind::OpenBelow, 0),
        'O' => insert(state, InsertKind::OpenAbove, 0),
        'R' => insert(state, InsertKind::Replace, x),
        'p' => paste(state, MoveDir1D::Next),
        'P' => paste(state, MoveDir1D::Previous),
        'v' => Ok(visual(state, Mode::Visual)),
        'V' => Ok(visual(state, Mode::VisualLine)),
        ':' => command_line(state),
        '/' | '?' => {
            cmdline::enter(state, c.to_string());

            Ok(Effect::Changed)
        },
        '&' => {
            state.reset_pending();
            command::execute(state, "s")?;
            state.clamp_cursor_x();

            Ok(Effect::Changed)
        },
        'q' if state.persist.recording => {
            state.persist.recording = false;
            state.reset_pending();

            Ok(Effect::Changed)
        },
        'q' => set_pending_key(state, PendingKey::Record),
        'm' | '@' | 'z' | 'Z' | '\'' | '`' => set_pending_key(state, PendingKey::Discard),
        _ => Ok(cancel(state)),
    }
}

fn normal_char(state: &mut VimState, c: char) -> EditResult<Effect> {
    let operator = state.pending.operator.as_ref().map(|op| op.operator);

    if let Some(op) = operator {
        if c == op.line_key() {
            return line_operator(state, op);
        }
    }

    if count_digit(state, c) {
        return Ok(Effect::Changed);
    }

    match c {
        '"' if operator.is_none() => set_pending_key(state, PendingKey::Register),
        'g' => set_pending_key(state, PendingKey::G),
        'f' => set_pending_key(state, PendingKey::Find(MoveDir1D::Next, false)),
        'F' => set_pending_key(state, PendingKey::Find(MoveDir1D::Previous, false)),
        't' => set_pending_key(state, PendingKey::Find(MoveDir1D::Next, true)),
        'T' => set_pending_key(state, PendingKey::Find(MoveDir1D::Previous, true)),
        'i' | 'a' if operator.is_some() => set_pending_key(state, PendingKey::TextObject(c == 'i')),
        'd' => begin_operator(state, Operator::Delete),
        'c' => begin_operator(state, Operator::Change),
        'y' => begin_operator(state, Operator::Yank),
        '>' => begin_operator(state, Operator::ShiftRight),
        '<' => begin_operator(state, Operator::ShiftLeft),
        'w' | 'W' if operator == Some(Operator::Change) => {
            let style = if c == 'w' { WordStyle::Little } else { WordStyle::Big };
            let blank = state.buffer.char_at(&state.cursor).map_or(true, char::is_whitespace);

            if blank {
                run_motion(state, Motion::WordStart(style, MoveDir1D::Next))
            } else {
                run_motion(state, Motion::WordEndCurrent(style))
            }
        },
        '/' | '?' => command_char(state, c),
        c => {
            if let Some(res) = motion_char(state, c) {
                return res;
            }

            if operator.is_some() {
                state.reset_pending();

                return Ok(Effect::Changed);
            }

            command_char(state, c)
        },
    }
}

/// Handle a token in Normal mode.
pub(super) fn handle(state: &mut VimState, key: &KeyClass) -> EditResult<Effect> {
    if let KeyClass::Text(_) | KeyClass::Other = key {
        return Ok(Effect::Ignored);
    }

    if let Some(pending) = state.pending.key.take() {
        return pending_key(state, pending, key);
    }

    match key {
        KeyClass::Char(c) => normal_char(state, *c),
        KeyClass::Escape | KeyClass::Ctrl('c') => Ok(cancel(state)),
        KeyClass::Delete => shortcut(state, Operator::Delete, Motion::Right),
        key => {
            match motion_key(key) {
                Some(motion) => run_motion(state, motion),
                None => Ok(cancel(state)),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::store::RegisterCell;
    use crate::env::vim::tests::{fails, keys, run};
    use crate::prelude::TargetShape;

    fn pos(state: &VimState) -> (usize, usize) {
        (state.cursor_line(), state.cursor_col())
    }

    #[test]
    fn test_basic_motions() {
        let state = keys("x", "h");
        assert_eq!(state.text(), "x");
        assert_eq!(pos(&state), (0, 0));

        let state = keys("hello world\nfoo", "wl");
        assert_eq!(pos(&state), (0, 7));

        let state = keys("hello world\nfoo", "$j");
        assert_eq!(pos(&state), (1, 2));

        let state = keys("hello world\nfoo", "$jk");
        assert_eq!(pos(&state), (0, 10));

        let state = keys("a\nb\nc\nd", "3G");
        assert_eq!(pos(&state), (2, 0));

        let state = keys("a\nb\nc\nd", "Ggg");
        assert_eq!(pos(&state), (0, 0));

        let state = keys("abc", "100l");
        assert_eq!(pos(&state), (0, 2));
    }

    #[test]
    fn test_counts() {
        let state = keys("abcdef", "3x");
        assert_eq!(state.text(), "def");

        let state = keys("a b c d e f", "2d2w");
        assert_eq!(state.text(), "e f");

        let state = keys("0123456789", "10x");
        assert_eq!(state.text(), "");

        let state = keys("abc", "2");
        assert_eq!(state.pending_count(), Some(2));
    }

    #[test]
    fn test_delete_word() {
        let state = keys("hello world", "dw");
        assert_eq!(state.text(), "world");

        let state = keys("hello world", "wdw");
        assert_eq!(state.text(), "hello ");
        assert_eq!(pos(&state), (0, 5));

        let state = keys("one\ntwo", "dw");
        assert_eq!(state.text(), "\ntwo");

        let state = keys("hello world", "de");
        assert_eq!(state.text(), " world");
    }

    #[test]
    fn test_delete_lines() {
        let state = keys("a\nb\nc", "dd");
        assert_eq!(state.text(), "b\nc");
        assert_eq!(pos(&state), (0, 0));

        let state = keys("a\nb\nc", "G2dd");
        assert_eq!(state.text(), "a\nb");
        assert_eq!(pos(&state), (1, 0));

        let state = keys("a\nb\nc", "dj");
        assert_eq!(state.text(), "c");

        let state = keys("a\nb\nc", "3dd");
        assert_eq!(state.text(), "");
        assert_eq!(state.lines(), &strs![""]);
    }

    #[test]
    fn test_change() {
        let state = keys("hello world", "cwbye<Esc>");
        assert_eq!(state.text(), "bye world");
        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(pos(&state), (0, 2));

        let state = keys("  indented\nnext", "ccnew<Esc>");
        assert_eq!(state.text(), "new\nnext");

        let state = keys("hello world", "wC!<Esc>");
        assert_eq!(state.text(), "hello !");

        let state = keys("abc", "2sX<Esc>");
        assert_eq!(state.text(), "Xc");
    }

    #[test]
    fn test_operator_pending() {
        let state = keys("hello", "d");
        assert_eq!(
            state.pending_operator(),
            Some(&PendingOperator { operator: Operator::Delete, count: None })
        );

        let state = keys("hello", "2y");
        assert_eq!(state.pending_operator().map(|op| op.count), Some(Some(2)));

        // A different operator cancels.
        let state = keys("hello", "dy");
        assert_eq!(state.pending_operator(), None);
        assert_eq!(state.text(), "hello");

        let state = keys("hello", "d<Esc>");
        assert_eq!(state.pending_operator(), None);
    }

    #[test]
    fn test_find_and_repeat() {
        let state = keys("a,b,c,d", "f,;");
        assert_eq!(pos(&state), (0, 3));

        let state = keys("a,b,c,d", "$F,;");
        assert_eq!(pos(&state), (0, 3));

        let state = keys("a,b,c,d", "$F,;,");
        assert_eq!(pos(&state), (0, 5));

        let state = keys("a,b,c,d", "dt,");
        assert_eq!(state.text(), ",b,c,d");

        let state = keys("a,b,c,d", "df,");
        assert_eq!(state.text(), "b,c,d");
    }

    #[test]
    fn test_text_objects() {
        let state = keys("foo(bar, baz)", "fbdi(");
        assert_eq!(state.text(), "foo()");

        let state = keys("say \"hi there\" ok", "fhci\"yo<Esc>");
        assert_eq!(state.text(), "say \"yo\" ok");

        let state = keys("one two three", "wdaw");
        assert_eq!(state.text(), "one three");

        let state = keys("fn {\n  a\n  b\n}", "jdi{");
        assert_eq!(state.text(), "fn {\n}");
    }

    #[test]
    fn test_join() {
        let state = keys("a\n  b\nc", "J");
        assert_eq!(state.text(), "a b\nc");
        assert_eq!(pos(&state), (0, 1));

        let state = keys("a\n  b\nc", "3J");
        assert_eq!(state.text(), "a b c");

        let state = keys("a\n  b", "gJ");
        assert_eq!(state.text(), "a  b");

        let state = keys("a\nb", "jJ");
        assert_eq!(state.text(), "a\nb");
    }

    #[test]
    fn test_insert_positions() {
        let state = keys("  abc", "Ix<Esc>");
        assert_eq!(state.text(), "  xabc");

        let state = keys("abc", "Ax<Esc>");
        assert_eq!(state.text(), "abcx");

        let state = keys("abc", "ax<Esc>");
        assert_eq!(state.text(), "axbc");

        let state = keys("abc", "ox<Esc>");
        assert_eq!(state.lines(), &strs!["abc", "x"]);

        let state = keys("abc", "Ox<Esc>");
        assert_eq!(state.lines(), &strs!["x", "abc"]);
    }

    #[test]
    fn test_yank_put() {
        let state = keys("a\nb\nc", "yyp");
        assert_eq!(state.text(), "a\na\nb\nc");
        assert_eq!(pos(&state), (1, 0));

        let state = keys("hello world", "yw$p");
        assert_eq!(state.text(), "hello worldhello ");

        let state = keys("hello", "\"_x\"_xp");
        assert_eq!(state.text(), "llo");

        let state = keys("hello", "\"byl\"bp");
        assert_eq!(state.text(), "hhello");
        assert_eq!(state.registers().get(&Register::Named('b')), RegisterCell::from("h"));

        let state = keys("hello", "ddp");
        assert_eq!(state.lines(), &strs!["", "hello"]);

        let state = keys("abc", "p");
        assert_eq!(state.text(), "abc");
    }

    #[test]
    fn test_paste_limit() {
        let mut config = crate::config::InterpreterConfig::default();
        config.max_lines(3);

        let state = VimState::with_config("a\nb", config);
        let (state, err) = fails(state, "yy2p");

        assert_eq!(err.to_string(), "Buffer would exceed the 3 line limit");
        assert_eq!(state.text(), "a\nb");
        assert_eq!(
            state.registers().get(&Register::Unnamed),
            RegisterCell::new(TargetShape::LineWise, "a\n")
        );
    }

    #[test]
    fn test_search() {
        let state = keys("foo bar\nbaz bar", "/bar<CR>");
        assert_eq!(pos(&state), (0, 4));
        assert_eq!(state.mode(), Mode::Normal);

        let state = keys("foo bar\nbaz bar", "/bar<CR>n");
        assert_eq!(pos(&state), (1, 4));

        let state = keys("foo bar\nbaz bar", "/bar<CR>nn");
        assert_eq!(pos(&state), (0, 4));

        let state = keys("foo bar\nbaz bar", "G?ba<CR>");
        assert_eq!(pos(&state), (0, 4));

        let state = keys("foo bar baz", "d/baz<CR>");
        assert_eq!(state.text(), "baz");

        let state = keys("one two one", "*");
        assert_eq!(pos(&state), (0, 8));

        let (_, err) = fails(VimState::new("abc"), "n");
        assert_eq!(err.to_string(), "No previous regular expression");
    }

    #[test]
    fn test_count_cmdline() {
        let state = keys("a\nb\nc", "3:");
        assert_eq!(state.command_line(), Some(":.,.+2"));
        assert_eq!(state.mode(), Mode::CommandLine);
    }

    #[test]
    fn test_noops() {
        let state = keys("abc", "l");

        for noop in ["u", ".", "<C-r>", "Q", "<F1>"] {
            let res = run(state.clone(), noop).unwrap();
            assert_eq!(res, state, "{noop} should do nothing");
        }

        let res = run(state.clone(), "ma").unwrap();
        assert_eq!(res.text(), "abc");
        assert_eq!(pos(&res), (0, 1));

        let res = run(state.clone(), "qaxq").unwrap();
        assert_eq!(res.text(), "ac");
    }
}
