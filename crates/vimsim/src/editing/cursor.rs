//! # Cursors
//!
//! ## Overview
//!
//! A [Cursor] is a line and a character column, plus the column that vertical movement tries
//! to return to.
use std::cmp::{Ord, Ordering, PartialOrd};

/// A position within a buffer.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Cursor {
    pub(crate) xgoal: usize,
    pub(crate) x: usize,
    pub(crate) y: usize,
}

impl Cursor {
    /// Create a cursor at the given line and column.
    pub fn new(line: usize, column: usize) -> Cursor {
        Cursor { xgoal: column, x: column, y: line }
    }

    /// The column, as a character index into the line.
    pub fn get_x(&self) -> usize {
        self.x
    }

    /// The line index.
    pub fn get_y(&self) -> usize {
        self.y
    }

    /// Set the column, which also becomes the column goal.
    pub fn set_x(&mut self, x: usize) {
        self.x = x;
        self.xgoal = x;
    }

    /// Set the line, leaving the column goal as it is.
    pub fn set_y(&mut self, y: usize) {
        self.y = y;
    }

    /// Make the cursor want to stay at the end of lines when moving vertically.
    pub(crate) fn goal_end(&mut self) {
        self.xgoal = usize::MAX;
    }

    /// Move left, stopping at the first column.
    pub fn left(&mut self, off: usize) {
        self.x = self.x.saturating_sub(off);
        self.xgoal = self.x;
    }

    /// Move right. Callers clamp the result to the line.
    pub fn right(&mut self, off: usize) {
        self.x = self.x.saturating_add(off);
        self.xgoal = self.x;
    }

    /// Move down. Callers clamp the result to the buffer.
    pub fn down(&mut self, off: usize) {
        self.y = self.y.saturating_add(off);
    }

    /// Move up, stopping at the first line.
    pub fn up(&mut self, off: usize) {
        self.y = self.y.saturating_sub(off);
    }

    fn compare(&self, other: &Cursor) -> Ordering {
        let ycmp = self.y.cmp(&other.y);

        if ycmp != Ordering::Equal {
            return ycmp;
        }

        let xcmp = self.x.cmp(&other.x);

        if xcmp != Ordering::Equal {
            return xcmp;
        }

        self.xgoal.cmp(&other.xgoal)
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Cursor) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Cursor) -> Ordering {
        self.compare(other)
    }
}
