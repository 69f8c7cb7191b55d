//! # Text buffer
//!
//! ## Overview
//!
//! A [TextBuffer] holds the text being edited as a list of lines without their terminating
//! newlines. It always has at least one line. Splitting the initial text and joining the lines
//! back together are exact inverses, so an untouched buffer serializes to its input.
//!
//! Positions inside the buffer are [Cursor] values whose column is a character index. A column
//! equal to the line's length is the position of the line break itself, which is how ranges
//! spanning multiple lines are expressed: the range from `(0, 3)` to `(1, 0)` covers exactly the
//! newline at the end of a three character first line.
use super::cursor::Cursor;
use crate::util::byte_offset;

/// The lines of text being edited.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        TextBuffer { lines: vec![String::new()] }
    }
}

impl TextBuffer {
    /// Create a buffer by splitting `text` at every newline.
    pub fn new(text: &str) -> Self {
        let lines = text.split('\n').map(String::from).collect();

        TextBuffer { lines }
    }

    /// Create a buffer from a list of lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.is_empty() {
            return TextBuffer::default();
        }

        TextBuffer { lines }
    }

    /// The buffer's contents, with lines joined by newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// The buffer's lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The number of lines.
    pub fn get_lines(&self) -> usize {
        self.lines.len()
    }

    /// The size of the buffer's text in bytes, counting line breaks.
    pub fn byte_len(&self) -> usize {
        self.lines.iter().map(String::len).sum::<usize>() + self.lines.len() - 1
    }

    /// The index of the last line.
    pub fn max_line_idx(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// The text of a line, or an empty string past the end of the buffer.
    pub fn line(&self, y: usize) -> &str {
        self.lines.get(y).map(String::as_str).unwrap_or("")
    }

    /// The number of characters in a line.
    pub fn get_columns(&self, y: usize) -> usize {
        self.line(y).chars().count()
    }

    /// The largest column a cursor may have on a line.
    ///
    /// When `lastcol` is true the cursor may sit after the last character, as it does in Insert
    /// mode.
    pub fn max_column_idx(&self, y: usize, lastcol: bool) -> usize {
        let len = self.get_columns(y);

        if lastcol {
            len
        } else {
            len.saturating_sub(1)
        }
    }

    /// Move a cursor back inside the buffer, honoring its column goal.
    pub fn clamp(&self, cursor: &mut Cursor, lastcol: bool) {
        cursor.y = cursor.y.min(self.max_line_idx());

        let max = self.max_column_idx(cursor.y, lastcol);
        cursor.x = cursor.xgoal.min(max);
    }

    /// Move a cursor back inside the buffer, making its current column the column goal.
    pub fn clamp_x(&self, cursor: &mut Cursor, lastcol: bool) {
        cursor.y = cursor.y.min(self.max_line_idx());

        let max = self.max_column_idx(cursor.y, lastcol);
        cursor.set_x(cursor.x.min(max));
    }

    /// The character at a position, or `None` at the end of a line.
    pub fn char_at(&self, cursor: &Cursor) -> Option<char> {
        self.line(cursor.y).chars().nth(cursor.x)
    }

    /// The column of the first non-blank character of a line.
    ///
    /// On a line containing only whitespace, this is the line's last column.
    pub fn first_word(&self, y: usize) -> usize {
        let line = self.line(y);

        match line.chars().position(|c| !c.is_whitespace()) {
            Some(x) => x,
            None => line.chars().count().saturating_sub(1),
        }
    }

    /// Whether a position is at the end of its line.
    pub fn is_eol(&self, cursor: &Cursor) -> bool {
        cursor.x >= self.get_columns(cursor.y)
    }

    /// Whether a position is on an empty line.
    pub fn is_empty_line(&self, y: usize) -> bool {
        self.line(y).is_empty()
    }

    /// The position after a character, treating the end of each line as a position.
    pub fn next_pos(&self, cursor: &Cursor) -> Option<Cursor> {
        if cursor.x < self.get_columns(cursor.y) {
            Some(Cursor::new(cursor.y, cursor.x + 1))
        } else if cursor.y < self.max_line_idx() {
            Some(Cursor::new(cursor.y + 1, 0))
        } else {
            None
        }
    }

    /// The position before a character, treating the end of each line as a position.
    pub fn prev_pos(&self, cursor: &Cursor) -> Option<Cursor> {
        if cursor.x > 0 {
            Some(Cursor::new(cursor.y, cursor.x.min(self.get_columns(cursor.y)) - 1))
        } else if cursor.y > 0 {
            Some(Cursor::new(cursor.y - 1, self.get_columns(cursor.y - 1)))
        } else {
            None
        }
    }

    /// The position just past the end of the text.
    pub fn end_of_buffer(&self) -> Cursor {
        let y = self.max_line_idx();

        Cursor::new(y, self.get_columns(y))
    }

    /// The exclusive end of a range that includes the character at `cursor`.
    ///
    /// For a position at the end of a line, this includes the line break.
    pub fn after(&self, cursor: &Cursor) -> Cursor {
        if cursor.x < self.get_columns(cursor.y) {
            Cursor::new(cursor.y, cursor.x + 1)
        } else if cursor.y < self.max_line_idx() {
            Cursor::new(cursor.y + 1, 0)
        } else {
            self.end_of_buffer()
        }
    }

    fn normalize(&self, cursor: &Cursor) -> (usize, usize) {
        let y = cursor.y.min(self.max_line_idx());
        let x = cursor.x.min(self.get_columns(y));

        (y, x)
    }

    /// The text between two positions, `start` inclusive and `end` exclusive.
    pub fn slice(&self, start: &Cursor, end: &Cursor) -> String {
        let (sy, sx) = self.normalize(start);
        let (ey, ex) = self.normalize(end);

        if (sy, sx) >= (ey, ex) {
            return String::new();
        }

        let first = self.line(sy);

        if sy == ey {
            return first[byte_offset(first, sx)..byte_offset(first, ex)].to_string();
        }

        let last = self.line(ey);
        let mut res = String::from(&first[byte_offset(first, sx)..]);

        for line in &self.lines[sy + 1..ey] {
            res.push('\n');
            res.push_str(line);
        }

        res.push('\n');
        res.push_str(&last[..byte_offset(last, ex)]);

        res
    }

    /// Remove the text between two positions, returning it.
    pub fn delete(&mut self, start: &Cursor, end: &Cursor) -> String {
        let (sy, sx) = self.normalize(start);
        let (ey, ex) = self.normalize(end);

        if (sy, sx) >= (ey, ex) {
            return String::new();
        }

        let removed = self.slice(start, end);
        let first = self.line(sy);
        let last = self.line(ey);
        let joined = format!("{}{}", &first[..byte_offset(first, sx)], &last[byte_offset(last, ex)..]);

        self.lines.splice(sy..=ey, std::iter::once(joined));

        removed
    }

    /// Insert text at a position, returning the position just after the inserted text.
    pub fn insert_text(&mut self, at: &Cursor, text: &str) -> Cursor {
        let (y, x) = self.normalize(at);
        let line = self.line(y);
        let off = byte_offset(line, x);
        let prefix = line[..off].to_string();
        let suffix = line[off..].to_string();

        let mut parts: Vec<&str> = text.split('\n').collect();
        let last = parts.pop().unwrap_or("");

        if parts.is_empty() {
            self.lines[y] = format!("{prefix}{last}{suffix}");

            return Cursor::new(y, x + last.chars().count());
        }

        let mut new_lines = Vec::with_capacity(parts.len() + 1);
        new_lines.push(format!("{prefix}{}", parts[0]));
        new_lines.extend(parts[1..].iter().map(|s| s.to_string()));
        new_lines.push(format!("{last}{suffix}"));

        let end = Cursor::new(y + new_lines.len() - 1, last.chars().count());
        self.lines.splice(y..=y, new_lines);

        end
    }

    /// Copy the lines from `start` to `end`, inclusive.
    pub fn get_line_range(&self, start: usize, end: usize) -> Vec<String> {
        let end = end.min(self.max_line_idx());

        if start > end {
            return vec![];
        }

        self.lines[start..=end].to_vec()
    }

    /// Remove the lines from `start` to `end`, inclusive, returning them.
    ///
    /// Removing every line leaves a single empty line behind.
    pub fn delete_lines(&mut self, start: usize, end: usize) -> Vec<String> {
        let end = end.min(self.max_line_idx());

        if start > end {
            return vec![];
        }

        let removed = self.lines.drain(start..=end).collect();

        if self.lines.is_empty() {
            self.lines.push(String::new());
        }

        removed
    }

    /// Delete every line whose index appears in `ys`, which must be sorted.
    ///
    /// Returns how many lines were removed.
    pub fn delete_each_line(&mut self, ys: &[usize]) -> usize {
        let before = self.lines.len();
        let mut ys = ys.iter().peekable();
        let mut idx = 0;

        self.lines.retain(|_| {
            let hit = ys.next_if(|y| **y == idx).is_some();
            idx += 1;
            !hit
        });

        if self.lines.is_empty() {
            self.lines.push(String::new());
        }

        before - self.lines.len()
    }

    /// Insert lines so that the first of them has index `at`.
    pub fn insert_lines(&mut self, at: usize, lines: Vec<String>) {
        let at = at.min(self.lines.len());

        self.lines.splice(at..at, lines);
    }

    /// Replace the lines from `start` to `end`, inclusive.
    pub fn replace_lines(&mut self, start: usize, end: usize, lines: Vec<String>) {
        let end = end.min(self.max_line_idx());
        let start = start.min(end);

        self.lines.splice(start..=end, lines);

        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }

    /// Replace the text of a line.
    pub fn set_line(&mut self, y: usize, text: String) {
        if let Some(line) = self.lines.get_mut(y) {
            *line = text;
        }
    }

    /// Join `count` lines starting at `y` into one, returning the column where the last join
    /// happened.
    ///
    /// When `spaces` is true, the joined lines lose their leading whitespace and are separated
    /// by a single space, as Vim's `J` does. Otherwise the lines are concatenated as they are.
    /// Returns `None` when there is no following line to join.
    pub fn join_lines(&mut self, y: usize, count: usize, spaces: bool) -> Option<usize> {
        if y >= self.max_line_idx() {
            return None;
        }

        let joins = count.saturating_sub(1).max(1).min(self.max_line_idx() - y);
        let mut col = 0;

        for _ in 0..joins {
            let next = self.lines.remove(y + 1);
            let cur = &mut self.lines[y];

            if !spaces {
                col = cur.chars().count();
                cur.push_str(&next);
                continue;
            }

            let next = next.trim_start();
            let len = cur.chars().count();

            if next.is_empty() {
                col = len;
            } else if cur.is_empty() || cur.ends_with(char::is_whitespace) || next.starts_with(')') {
                col = len;
                cur.push_str(next);
            } else {
                col = len;
                cur.push(' ');
                cur.push_str(next);
            }
        }

        Some(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::new(text)
    }

    #[test]
    fn test_split_exact() {
        assert_eq!(buffer("").lines(), &strs![""]);
        assert_eq!(buffer("a\n").lines(), &strs!["a", ""]);
        assert_eq!(buffer("a\r\nb").lines(), &strs!["a\r", "b"]);
        assert_eq!(buffer("a\n\nb\n").text(), "a\n\nb\n");
        assert_eq!(TextBuffer::from_lines(vec![]).text(), "");
    }

    #[test]
    fn test_clamp() {
        let buf = buffer("hello\n\nab");
        let mut cursor = Cursor::new(9, 9);

        buf.clamp(&mut cursor, false);
        assert_eq!((cursor.y, cursor.x), (2, 1));

        cursor = Cursor::new(1, 4);
        buf.clamp(&mut cursor, false);
        assert_eq!((cursor.y, cursor.x), (1, 0));

        cursor = Cursor::new(0, 5);
        buf.clamp(&mut cursor, true);
        assert_eq!((cursor.y, cursor.x), (0, 5));
    }

    #[test]
    fn test_positions() {
        let buf = buffer("ab\n\nc");

        assert_eq!(buf.next_pos(&Cursor::new(0, 1)), Some(Cursor::new(0, 2)));
        assert_eq!(buf.next_pos(&Cursor::new(0, 2)), Some(Cursor::new(1, 0)));
        assert_eq!(buf.next_pos(&Cursor::new(2, 1)), None);
        assert_eq!(buf.prev_pos(&Cursor::new(2, 0)), Some(Cursor::new(1, 0)));
        assert_eq!(buf.prev_pos(&Cursor::new(1, 0)), Some(Cursor::new(0, 2)));
        assert_eq!(buf.prev_pos(&Cursor::new(0, 0)), None);
        assert_eq!(buf.after(&Cursor::new(0, 2)), Cursor::new(1, 0));
        assert_eq!(buf.after(&Cursor::new(2, 0)), Cursor::new(2, 1));
        assert_eq!(buf.end_of_buffer(), Cursor::new(2, 1));
    }

    #[test]
    fn test_first_word() {
        let buf = buffer("  foo\n   \n\nbar");

        assert_eq!(buf.first_word(0), 2);
        assert_eq!(buf.first_word(1), 2);
        assert_eq!(buf.first_word(2), 0);
        assert_eq!(buf.first_word(3), 0);
    }

    #[test]
    fn test_slice_delete() {
        let mut buf = buffer("hello\nwörld\nfoo");

        assert_eq!(buf.slice(&Cursor::new(0, 1), &Cursor::new(0, 3)), "el");
        assert_eq!(buf.slice(&Cursor::new(0, 3), &Cursor::new(2, 1)), "lo\nwörld\nf");
        assert_eq!(buf.slice(&Cursor::new(0, 5), &Cursor::new(1, 0)), "\n");
        assert_eq!(buf.slice(&Cursor::new(1, 2), &Cursor::new(1, 2)), "");

        assert_eq!(buf.delete(&Cursor::new(1, 1), &Cursor::new(1, 3)), "ör");
        assert_eq!(buf.text(), "hello\nwld\nfoo");

        assert_eq!(buf.delete(&Cursor::new(0, 4), &Cursor::new(1, 1)), "o\nw");
        assert_eq!(buf.text(), "hellld\nfoo");
    }

    #[test]
    fn test_insert_text() {
        let mut buf = buffer("abc");

        assert_eq!(buf.insert_text(&Cursor::new(0, 1), "XY"), Cursor::new(0, 3));
        assert_eq!(buf.text(), "aXYbc");

        assert_eq!(buf.insert_text(&Cursor::new(0, 3), "1\n2\n3"), Cursor::new(2, 1));
        assert_eq!(buf.text(), "aXY1\n2\n3bc");

        assert_eq!(buf.insert_text(&Cursor::new(2, 3), "\n"), Cursor::new(3, 0));
        assert_eq!(buf.text(), "aXY1\n2\n3bc\n");
    }

    #[test]
    fn test_lines() {
        let mut buf = buffer("a\nb\nc");

        assert_eq!(buf.delete_lines(0, 1), strs!["a", "b"]);
        assert_eq!(buf.text(), "c");

        assert_eq!(buf.delete_lines(0, 5), strs!["c"]);
        assert_eq!(buf.lines(), &strs![""]);

        buf.insert_lines(1, strs!["x", "y"]);
        assert_eq!(buf.text(), "\nx\ny");

        buf.replace_lines(0, 0, strs!["w"]);
        assert_eq!(buf.text(), "w\nx\ny");
        assert_eq!(buf.get_line_range(1, 9), strs!["x", "y"]);
    }

    #[test]
    fn test_byte_len() {
        assert_eq!(TextBuffer::default().byte_len(), 0);
        assert_eq!(TextBuffer::new("ab\n").byte_len(), 3);
        assert_eq!(TextBuffer::new("añ\nb").byte_len(), 5);
    }

    #[test]
    fn test_delete_each_line() {
        let mut buf = TextBuffer::new("a\nb\nc\nd");
        assert_eq!(buf.delete_each_line(&[0, 2]), 2);
        assert_eq!(buf.text(), "b\nd");

        assert_eq!(buf.delete_each_line(&[0, 1, 5]), 2);
        assert_eq!(buf.text(), "");
        assert_eq!(buf.get_lines(), 1);
    }

    #[test]
    fn test_join_spaces() {
        let mut buf = buffer("foo\n   bar\n)\n\nbaz ");

        assert_eq!(buf.join_lines(0, 2, true), Some(3));
        assert_eq!(buf.text(), "foo bar\n)\n\nbaz ");

        assert_eq!(buf.join_lines(0, 3, true), Some(8));
        assert_eq!(buf.text(), "foo bar)\nbaz ");

        let mut buf = buffer("a \nb\n\nc");
        assert_eq!(buf.join_lines(0, 10, true), Some(3));
        assert_eq!(buf.text(), "a b c");

        assert_eq!(buf.join_lines(0, 2, true), None);
    }

    #[test]
    fn test_join_raw() {
        let mut buf = buffer("foo\n  bar");

        assert_eq!(buf.join_lines(0, 2, false), Some(3));
        assert_eq!(buf.text(), "foo  bar");
    }
}
