//! # Motions and text objects
//!
//! ## Overview
//!
//! A [Motion] moves a [Cursor] through a [TextBuffer]. When a motion follows an operator, the
//! text between the cursor and the motion's target is what the operator acts on, and the
//! motion's [MotionKind] decides whether the target character is included or whether whole lines
//! are affected.
//!
//! Text objects ([TextObject]) select a range around the cursor instead of moving it.
use regex::Regex;

use super::buffer::TextBuffer;
use super::cursor::Cursor;
use crate::prelude::{CharSearch, MoveDir1D, WordStyle};
use crate::util::{byte_offset, char_index};

/// How the text between the cursor and a motion's target is selected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MotionKind {
    /// The character at the target is not included.
    Exclusive,

    /// The character at the target is included.
    Inclusive,

    /// Every line between the cursor and the target is included.
    LineWise,
}

/// Where a motion lands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MotionTarget {
    /// The target position.
    pub pos: Cursor,

    /// How the range up to the target is selected.
    pub kind: MotionKind,
}

impl MotionTarget {
    fn new(pos: Cursor, kind: MotionKind) -> Self {
        MotionTarget { pos, kind }
    }
}

/// Cursor movements.
#[derive(Clone, Debug)]
pub enum Motion {
    /// Move left within the line (`h`).
    Left,

    /// Move right within the line (`l`).
    Right,

    /// Move up, keeping the column goal (`k`).
    Up,

    /// Move down, keeping the column goal (`j`).
    Down,

    /// Move up or down to the first non-blank character (`-`, `+`).
    LineFirstWord(MoveDir1D),

    /// Move `count - 1` lines down to the first non-blank character (`_`).
    CurrentLineFirstWord,

    /// Move to the start of a word (`w`, `W`, `b`, `B`).
    WordStart(WordStyle, MoveDir1D),

    /// Move to the end of a word (`e`, `E`).
    WordEnd(WordStyle),

    /// Move to the end of the word under the cursor, as `cw` does.
    WordEndCurrent(WordStyle),

    /// Move to the first column (`0`).
    LineStart,

    /// Move to the first non-blank character (`^`).
    FirstWord,

    /// Move to the end of the line, `count - 1` lines down (`$`).
    LineEnd,

    /// Move to the line given by the count, or to the last line (`G`) or first line (`gg`)
    /// without one.
    GotoLine(MoveDir1D),

    /// Search for a character within the line (`f`, `F`, `t`, `T`).
    ///
    /// The flag indicates a repeated search (`;`, `,`), which skips over an adjacent match when
    /// searching until a character.
    FindChar(CharSearch, bool),

    /// Jump to the bracket matching the next one on the line (`%`).
    MatchPair,

    /// Move to the next or previous blank line (`}`, `{`).
    Paragraph(MoveDir1D),

    /// Move to the next or previous match of a pattern (`/`, `?`, `n`, `N`).
    Search(Regex, MoveDir1D, bool),
}

impl Motion {
    /// Whether this motion moves between lines while keeping the column goal.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Motion::Up | Motion::Down)
    }

    /// Calculate where this motion lands.
    ///
    /// When `operator` is true, the motion is being used to select text, which lets it land on
    /// the end of a line. Returns `None` when the motion fails, like `fx` when there is no `x`
    /// after the cursor.
    pub fn eval(
        &self,
        buf: &TextBuffer,
        cursor: &Cursor,
        count: Option<usize>,
        operator: bool,
    ) -> Option<MotionTarget> {
        let n = count.unwrap_or(1).max(1);
        let y = cursor.y.min(buf.max_line_idx());
        let len = buf.get_columns(y);

        match self {
            Motion::Left => {
                let x = cursor.x.min(len).saturating_sub(n);

                Some(MotionTarget::new(Cursor::new(y, x), MotionKind::Exclusive))
            },
            Motion::Right => {
                let max = buf.max_column_idx(y, operator);
                let x = cursor.x.saturating_add(n).min(max);

                Some(MotionTarget::new(Cursor::new(y, x), MotionKind::Exclusive))
            },
            Motion::Up | Motion::Down => {
                let target = if let Motion::Up = self {
                    y.saturating_sub(n)
                } else {
                    y.saturating_add(n).min(buf.max_line_idx())
                };

                if target == y && operator {
                    return None;
                }

                let mut pos = cursor.clone();
                pos.y = target;
                pos.x = pos.xgoal.min(buf.max_column_idx(target, false));

                Some(MotionTarget::new(pos, MotionKind::LineWise))
            },
            Motion::LineFirstWord(dir) => {
                let target = match dir {
                    MoveDir1D::Previous => y.saturating_sub(n),
                    MoveDir1D::Next => y.saturating_add(n).min(buf.max_line_idx()),
                };

                if target == y && operator {
                    return None;
                }

                let pos = Cursor::new(target, buf.first_word(target));

                Some(MotionTarget::new(pos, MotionKind::LineWise))
            },
            Motion::CurrentLineFirstWord => {
                let target = y.saturating_add(n - 1).min(buf.max_line_idx());
                let pos = Cursor::new(target, buf.first_word(target));

                Some(MotionTarget::new(pos, MotionKind::LineWise))
            },
            Motion::WordStart(style, MoveDir1D::Next) => {
                let mut pos = Cursor::new(y, cursor.x.min(len));

                for i in 0..n {
                    let last = i + 1 == n;
                    pos = word_start_next(buf, &pos, *style, operator && last);
                }

                Some(MotionTarget::new(pos, MotionKind::Exclusive))
            },
            Motion::WordStart(style, MoveDir1D::Previous) => {
                let mut pos = Cursor::new(y, cursor.x.min(len));

                for _ in 0..n {
                    pos = word_start_prev(buf, &pos, *style);
                }

                Some(MotionTarget::new(pos, MotionKind::Exclusive))
            },
            Motion::WordEnd(style) => {
                let mut pos = Cursor::new(y, cursor.x.min(len));

                for _ in 0..n {
                    pos = word_end_next(buf, &pos, *style);
                }

                Some(MotionTarget::new(pos, MotionKind::Inclusive))
            },
            Motion::WordEndCurrent(style) => {
                let mut pos = word_end_current(buf, &Cursor::new(y, cursor.x.min(len)), *style);

                for _ in 1..n {
                    pos = word_end_next(buf, &pos, *style);
                }

                Some(MotionTarget::new(pos, MotionKind::Inclusive))
            },
            Motion::LineStart => Some(MotionTarget::new(Cursor::new(y, 0), MotionKind::Exclusive)),
            Motion::FirstWord => {
                let pos = Cursor::new(y, buf.first_word(y));

                Some(MotionTarget::new(pos, MotionKind::Exclusive))
            },
            Motion::LineEnd => {
                let target = y.saturating_add(n - 1).min(buf.max_line_idx());

                if operator {
                    let pos = Cursor::new(target, buf.get_columns(target));

                    return Some(MotionTarget::new(pos, MotionKind::Exclusive));
                }

                let mut pos = Cursor::new(target, buf.max_column_idx(target, false));
                pos.goal_end();

                Some(MotionTarget::new(pos, MotionKind::Inclusive))
            },
            Motion::GotoLine(default) => {
                let target = match (count, default) {
                    (Some(c), _) => c.max(1) - 1,
                    (None, MoveDir1D::Previous) => 0,
                    (None, MoveDir1D::Next) => buf.max_line_idx(),
                };
                let target = target.min(buf.max_line_idx());
                let pos = Cursor::new(target, buf.first_word(target));

                Some(MotionTarget::new(pos, MotionKind::LineWise))
            },
            Motion::FindChar(search, repeat) => {
                let x = find_char(buf.line(y), cursor.x, search, *repeat, n)?;
                let kind = match search.dir {
                    MoveDir1D::Next => MotionKind::Inclusive,
                    MoveDir1D::Previous => MotionKind::Exclusive,
                };

                Some(MotionTarget::new(Cursor::new(y, x), kind))
            },
            Motion::MatchPair => {
                if let Some(pct) = count {
                    let pct = pct.min(100);
                    let target = (pct * buf.get_lines()).div_ceil(100).max(1) - 1;
                    let target = target.min(buf.max_line_idx());
                    let pos = Cursor::new(target, buf.first_word(target));

                    return Some(MotionTarget::new(pos, MotionKind::LineWise));
                }

                let pos = match_pair(buf, &Cursor::new(y, cursor.x))?;

                Some(MotionTarget::new(pos, MotionKind::Inclusive))
            },
            Motion::Paragraph(dir) => {
                let pos = paragraph(buf, y, *dir, n);

                Some(MotionTarget::new(pos, MotionKind::Exclusive))
            },
            Motion::Search(regex, dir, wrap) => {
                let mut pos = Cursor::new(y, cursor.x.min(len));

                for _ in 0..n {
                    pos = search(buf, &pos, regex, *dir, *wrap)?;
                }

                Some(MotionTarget::new(pos, MotionKind::Exclusive))
            },
        }
    }
}

fn class_at(buf: &TextBuffer, pos: &Cursor, style: WordStyle) -> u8 {
    buf.char_at(pos).map(|c| style.classify(c)).unwrap_or(0)
}

fn is_empty_line_pos(buf: &TextBuffer, pos: &Cursor) -> bool {
    pos.x == 0 && buf.is_empty_line(pos.y)
}

fn word_start_next(buf: &TextBuffer, pos: &Cursor, style: WordStyle, stop_eol: bool) -> Cursor {
    let start = class_at(buf, pos, style);
    let mut p = pos.clone();

    if start != 0 {
        loop {
            match buf.next_pos(&p) {
                Some(next) => {
                    p = next;

                    if class_at(buf, &p, style) != start {
                        break;
                    }
                },
                None => return buf.end_of_buffer(),
            }
        }
    }

    loop {
        if class_at(buf, &p, style) != 0 {
            return p;
        }

        if p != *pos && is_empty_line_pos(buf, &p) {
            return p;
        }

        if stop_eol && buf.is_eol(&p) {
            return p;
        }

        match buf.next_pos(&p) {
            Some(next) => p = next,
            None => return buf.end_of_buffer(),
        }
    }
}

fn word_start_prev(buf: &TextBuffer, pos: &Cursor, style: WordStyle) -> Cursor {
    let mut p = match buf.prev_pos(pos) {
        Some(prev) => prev,
        None => return pos.clone(),
    };

    while class_at(buf, &p, style) == 0 {
        if is_empty_line_pos(buf, &p) {
            return p;
        }

        match buf.prev_pos(&p) {
            Some(prev) => p = prev,
            None => return p,
        }
    }

    let class = class_at(buf, &p, style);

    loop {
        match buf.prev_pos(&p) {
            Some(prev) if class_at(buf, &prev, style) == class => p = prev,
            _ => return p,
        }
    }
}

fn word_end_next(buf: &TextBuffer, pos: &Cursor, style: WordStyle) -> Cursor {
    let mut p = match buf.next_pos(pos) {
        Some(next) => next,
        None => return pos.clone(),
    };

    while class_at(buf, &p, style) == 0 {
        match buf.next_pos(&p) {
            Some(next) => p = next,
            None => return p,
        }
    }

    word_end_current(buf, &p, style)
}

fn word_end_current(buf: &TextBuffer, pos: &Cursor, style: WordStyle) -> Cursor {
    let class = class_at(buf, pos, style);
    let mut p = pos.clone();

    loop {
        match buf.next_pos(&p) {
            Some(next) if class_at(buf, &next, style) == class && !buf.is_eol(&next) => p = next,
            _ => return p,
        }
    }
}

fn find_char(line: &str, x: usize, search: &CharSearch, repeat: bool, n: usize) -> Option<usize> {
    let chars: Vec<char> = line.chars().collect();
    let skip = usize::from(search.till && repeat);

    match search.dir {
        MoveDir1D::Next => {
            let start = x + 1 + skip;
            let idx = (start..chars.len()).filter(|&i| chars[i] == search.ch).nth(n - 1)?;

            Some(if search.till { idx - 1 } else { idx })
        },
        MoveDir1D::Previous => {
            let end = x.min(chars.len()).checked_sub(skip)?;
            let idx = (0..end).rev().filter(|&i| chars[i] == search.ch).nth(n - 1)?;

            Some(if search.till { idx + 1 } else { idx })
        },
    }
}

fn bracket_pair(c: char) -> Option<(char, char, MoveDir1D)> {
    match c {
        '(' => Some(('(', ')', MoveDir1D::Next)),
        '[' => Some(('[', ']', MoveDir1D::Next)),
        '{' => Some(('{', '}', MoveDir1D::Next)),
        ')' => Some(('(', ')', MoveDir1D::Previous)),
        ']' => Some(('[', ']', MoveDir1D::Previous)),
        '}' => Some(('{', '}', MoveDir1D::Previous)),
        _ => None,
    }
}

/// Walk from `from` in `dir` until finding the unmatched `target` bracket.
fn find_unmatched(
    buf: &TextBuffer,
    from: &Cursor,
    open: char,
    close: char,
    dir: MoveDir1D,
) -> Option<Cursor> {
    let (target, other) = match dir {
        MoveDir1D::Next => (close, open),
        MoveDir1D::Previous => (open, close),
    };

    let mut depth = 0usize;
    let mut p = from.clone();

    loop {
        p = match dir {
            MoveDir1D::Next => buf.next_pos(&p)?,
            MoveDir1D::Previous => buf.prev_pos(&p)?,
        };

        match buf.char_at(&p) {
            Some(c) if c == target => {
                if depth == 0 {
                    return Some(p);
                }

                depth -= 1;
            },
            Some(c) if c == other => depth += 1,
            _ => {},
        }
    }
}

fn match_pair(buf: &TextBuffer, cursor: &Cursor) -> Option<Cursor> {
    let line: Vec<char> = buf.line(cursor.y).chars().collect();
    let (x, (open, close, dir)) = (cursor.x..line.len())
        .find_map(|x| bracket_pair(line[x]).map(|pair| (x, pair)))?;

    find_unmatched(buf, &Cursor::new(cursor.y, x), open, close, dir)
}

fn paragraph(buf: &TextBuffer, y: usize, dir: MoveDir1D, count: usize) -> Cursor {
    let max = buf.max_line_idx();
    let mut y = y as isize;
    let step: isize = match dir {
        MoveDir1D::Next => 1,
        MoveDir1D::Previous => -1,
    };
    let inside = |y: isize| y >= 0 && y <= max as isize;

    for _ in 0..count {
        while inside(y) && buf.is_empty_line(y as usize) {
            y += step;
        }

        while inside(y) && !buf.is_empty_line(y as usize) {
            y += step;
        }
    }

    if inside(y) {
        Cursor::new(y as usize, 0)
    } else if let MoveDir1D::Next = dir {
        buf.end_of_buffer()
    } else {
        Cursor::new(0, 0)
    }
}

/// Find the next match of `regex` after `from`, or the previous one before it.
///
/// Each line is matched separately. When `wrap` is true, the search continues from the other
/// end of the buffer.
pub fn search(
    buf: &TextBuffer,
    from: &Cursor,
    regex: &Regex,
    dir: MoveDir1D,
    wrap: bool,
) -> Option<Cursor> {
    let max = buf.max_line_idx();
    let y0 = from.y.min(max);
    let off0 = byte_offset(buf.line(y0), from.x);
    let starts = |y: usize| -> Vec<usize> { regex.find_iter(buf.line(y)).map(|m| m.start()).collect() };
    let found = |y: usize, off: usize| Some(Cursor::new(y, char_index(buf.line(y), off)));

    match dir {
        MoveDir1D::Next => {
            if let Some(off) = starts(y0).into_iter().find(|&s| s > off0) {
                return found(y0, off);
            }

            for y in y0 + 1..=max {
                if let Some(&off) = starts(y).first() {
                    return found(y, off);
                }
            }

            if wrap {
                for y in 0..=y0 {
                    let hit = starts(y).into_iter().find(|&s| y < y0 || s <= off0);

                    if let Some(off) = hit {
                        return found(y, off);
                    }
                }
            }
        },
        MoveDir1D::Previous => {
            if let Some(off) = starts(y0).into_iter().rev().find(|&s| s < off0) {
                return found(y0, off);
            }

            for y in (0..y0).rev() {
                if let Some(&off) = starts(y).last() {
                    return found(y, off);
                }
            }

            if wrap {
                for y in (y0..=max).rev() {
                    let hit = starts(y).into_iter().rev().find(|&s| y > y0 || s >= off0);

                    if let Some(off) = hit {
                        return found(y, off);
                    }
                }
            }
        },
    }

    None
}

/// The keyword under or after the cursor, as used by `*` and `#`.
pub fn word_at(buf: &TextBuffer, cursor: &Cursor) -> Option<(String, Cursor)> {
    let chars: Vec<char> = buf.line(cursor.y).chars().collect();
    let style = WordStyle::Little;
    let is_word = |c: char| style.classify(c) == 2;

    let x = (cursor.x..chars.len()).find(|&x| is_word(chars[x]))?;
    let start = (0..=x).rev().take_while(|&i| is_word(chars[i])).last().unwrap_or(x);
    let end = (x..chars.len()).take_while(|&i| is_word(chars[i])).last().unwrap_or(x) + 1;

    Some((chars[start..end].iter().collect(), Cursor::new(cursor.y, start)))
}

/// Regions of text selected around the cursor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextObject {
    /// A word (`iw`, `aw`, `iW`, `aW`).
    Word(WordStyle),

    /// A quoted string (`i"`, `a'`, ...).
    Quote(char),

    /// A bracketed block (`i(`, `a{`, ...), given its opening and closing characters.
    Bracket(char, char),
}

impl TextObject {
    /// Interpret the character following `i` or `a`.
    pub fn from_char(c: char) -> Option<TextObject> {
        let obj = match c {
            'w' => TextObject::Word(WordStyle::Little),
            'W' => TextObject::Word(WordStyle::Big),
            '"' | '\'' | '`' => TextObject::Quote(c),
            '(' | ')' | 'b' => TextObject::Bracket('(', ')'),
            '[' | ']' => TextObject::Bracket('[', ']'),
            '{' | '}' | 'B' => TextObject::Bracket('{', '}'),
            '<' | '>' => TextObject::Bracket('<', '>'),
            _ => return None,
        };

        Some(obj)
    }

    /// Select the range of this object around the cursor, as a start position and an exclusive
    /// end position.
    ///
    /// `inner` selects the `i` variant, which excludes surrounding whitespace or delimiters.
    pub fn range(
        &self,
        buf: &TextBuffer,
        cursor: &Cursor,
        inner: bool,
        count: usize,
    ) -> Option<(Cursor, Cursor)> {
        let count = count.max(1);

        match self {
            TextObject::Word(style) => word_object(buf, cursor, *style, inner, count),
            TextObject::Quote(quote) => quote_object(buf, cursor, *quote, inner),
            TextObject::Bracket(open, close) => {
                bracket_object(buf, cursor, *open, *close, inner, count)
            },
        }
    }
}

fn word_object(
    buf: &TextBuffer,
    cursor: &Cursor,
    style: WordStyle,
    inner: bool,
    count: usize,
) -> Option<(Cursor, Cursor)> {
    let y = cursor.y;
    let chars: Vec<char> = buf.line(y).chars().collect();

    if chars.is_empty() {
        return None;
    }

    let class = |i: usize| style.classify(chars[i]);
    let run_end = |i: usize| {
        let c = class(i);
        (i..chars.len()).find(|&j| class(j) != c).unwrap_or(chars.len())
    };

    let x = cursor.x.min(chars.len() - 1);
    let c0 = class(x);
    let mut start = (0..=x).rev().take_while(|&i| class(i) == c0).last().unwrap_or(x);
    let mut end = run_end(x);

    if inner {
        for _ in 1..count {
            if end >= chars.len() {
                break;
            }

            end = run_end(end);
        }

        return Some((Cursor::new(y, start), Cursor::new(y, end)));
    }

    if c0 == 0 {
        // Leading whitespace, then the word after it.
        if end < chars.len() {
            end = run_end(end);
        }
    } else if end < chars.len() && class(end) == 0 {
        end = run_end(end);
    } else {
        // No trailing whitespace, so take the whitespace before the word.
        start = (0..start).rev().take_while(|&i| class(i) == 0).last().unwrap_or(start);
    }

    for _ in 1..count {
        if end >= chars.len() {
            break;
        }

        end = run_end(end);

        if end < chars.len() && class(end) == 0 {
            end = run_end(end);
        }
    }

    Some((Cursor::new(y, start), Cursor::new(y, end)))
}

fn quote_object(
    buf: &TextBuffer,
    cursor: &Cursor,
    quote: char,
    inner: bool,
) -> Option<(Cursor, Cursor)> {
    let y = cursor.y;
    let chars: Vec<char> = buf.line(y).chars().collect();
    let x = cursor.x;

    let quotes: Vec<usize> = (0..chars.len())
        .filter(|&i| chars[i] == quote && (i == 0 || chars[i - 1] != '\\'))
        .collect();

    let (s, e) = if let Some(idx) = quotes.iter().position(|&q| q == x) {
        if idx % 2 == 0 {
            (x, *quotes.get(idx + 1)?)
        } else {
            (quotes[idx - 1], x)
        }
    } else {
        let pairs: Vec<(usize, usize)> = quotes.chunks_exact(2).map(|p| (p[0], p[1])).collect();

        pairs
            .iter()
            .find(|(s, e)| *s < x && x < *e)
            .or_else(|| pairs.iter().find(|(s, _)| *s > x))
            .copied()?
    };

    if inner {
        return Some((Cursor::new(y, s + 1), Cursor::new(y, e)));
    }

    let is_blank = |i: usize| chars[i] == ' ' || chars[i] == '\t';
    let trailing = (e + 1..chars.len()).take_while(|&i| is_blank(i)).count();

    if trailing > 0 {
        return Some((Cursor::new(y, s), Cursor::new(y, e + 1 + trailing)));
    }

    let leading = (0..s).rev().take_while(|&i| is_blank(i)).count();

    Some((Cursor::new(y, s - leading), Cursor::new(y, e + 1)))
}

fn bracket_object(
    buf: &TextBuffer,
    cursor: &Cursor,
    open: char,
    close: char,
    inner: bool,
    count: usize,
) -> Option<(Cursor, Cursor)> {
    let mut start = match buf.char_at(cursor) {
        Some(c) if c == open => cursor.clone(),
        Some(c) if c == close => find_unmatched(buf, cursor, open, close, MoveDir1D::Previous)?,
        _ => find_unmatched(buf, cursor, open, close, MoveDir1D::Previous)?,
    };

    for _ in 1..count {
        start = find_unmatched(buf, &start, open, close, MoveDir1D::Previous)?;
    }

    let end = find_unmatched(buf, &start, open, close, MoveDir1D::Next)?;

    if !inner {
        return Some((start, buf.after(&end)));
    }

    let mut istart = buf.after(&start);
    let mut iend = end.clone();

    if end.y > start.y {
        if buf.is_eol(&istart) {
            istart = Cursor::new(start.y + 1, 0);
        }

        let before_close = buf.line(end.y).chars().take(end.x).all(char::is_whitespace);

        if before_close && istart.y < end.y {
            iend = Cursor::new(end.y, 0);
        }
    }

    Some((istart, iend))
}
