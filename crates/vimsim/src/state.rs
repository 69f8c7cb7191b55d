//! # Interpreter state
//!
//! ## Overview
//!
//! A [VimState] is everything the interpreter knows after some number of keys: the buffer, the
//! cursor, the current [Mode], any partially typed command, the registers, and the settings it
//! runs with. Interpreting a key never changes a state in place. Instead,
//! [apply](crate::env::vim::apply) produces a new value, which makes every intermediate state
//! available for replay.
//!
//! ## Example
//!
//! ```
//! use vimsim::{Mode, Token, VimState};
//!
//! let state = VimState::new("hello world");
//! let state = state.apply(&Token::from(vimsim::key::Key::from('w'))).state;
//!
//! assert_eq!(state.mode(), Mode::Normal);
//! assert_eq!(state.cursor_col(), 6);
//! ```
use serde::{Deserialize, Serialize};

use crate::config::InterpreterConfig;
use crate::editing::buffer::TextBuffer;
use crate::editing::cursor::Cursor;
use crate::editing::store::RegisterStore;
use crate::env::vim::{apply, Outcome};
use crate::prelude::{CharSearch, MoveDir1D, Register};
use crate::tokenizer::Token;

/// The editing modes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    /// Keys are commands and motions.
    #[default]
    Normal,

    /// Keys type text.
    Insert,

    /// Keys overwrite text.
    Replace,

    /// Motions extend a character-wise selection.
    Visual,

    /// Motions extend a line-wise selection.
    VisualLine,

    /// Keys are typed into the command line.
    CommandLine,
}

impl Mode {
    /// Whether this is one of the Visual modes.
    pub fn is_visual(&self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine)
    }

    /// Whether the cursor may sit just past the end of a line in this mode.
    pub fn allows_eol(&self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }
}

/// Commands that act on a range of text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    /// Delete text (`d`).
    Delete,

    /// Delete text and start Insert mode (`c`).
    Change,

    /// Copy text into a register (`y`).
    Yank,

    /// Indent lines (`>`).
    ShiftRight,

    /// Remove indentation from lines (`<`).
    ShiftLeft,

    /// Switch the case of characters (`g~`).
    ToggleCase,

    /// Make characters lowercase (`gu`).
    Lowercase,

    /// Make characters uppercase (`gU`).
    Uppercase,
}

impl Operator {
    /// The key that, typed right after this operator, makes it act on whole lines.
    pub(crate) fn line_key(&self) -> char {
        match self {
            Operator::Delete => 'd',
            Operator::Change => 'c',
            Operator::Yank => 'y',
            Operator::ShiftRight => '>',
            Operator::ShiftLeft => '<',
            Operator::ToggleCase => '~',
            Operator::Lowercase => 'u',
            Operator::Uppercase => 'U',
        }
    }
}

/// An operator waiting for the motion or text object it will act on.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct PendingOperator {
    /// The operator.
    pub operator: Operator,

    /// The count typed before the operator, if any.
    pub count: Option<usize>,
}

/// Keys that need one more key before they can do anything.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum PendingKey {
    /// After `g`.
    G,

    /// After `"`.
    Register,

    /// After `r`.
    Replace,

    /// After `f`, `F`, `t` or `T`.
    Find(MoveDir1D, bool),

    /// After `i` or `a` while an operator is pending, or in Visual mode.
    TextObject(bool),

    /// After `q`, which starts recording into a register.
    Record,

    /// After keys whose argument is accepted and discarded, like `m` or `@`.
    Discard,
}

/// Partially typed Normal and Visual mode commands.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Pending {
    pub operator: Option<PendingOperator>,
    pub count: Option<usize>,
    pub key: Option<PendingKey>,
    pub register: Option<(Register, bool)>,
}

/// How the current insert session started, which decides how it gets repeated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum InsertKind {
    Insert,
    OpenBelow,
    OpenAbove,
    Replace,
}

/// Typing done since entering Insert or Replace mode.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct InsertSession {
    pub kind: InsertKind,
    pub count: usize,
    pub keys: Vec<Token>,

    /// For each character typed in Replace mode, the character it overwrote.
    pub replaced: Vec<Option<char>>,
}

impl InsertSession {
    pub fn new(kind: InsertKind, count: usize) -> Self {
        InsertSession { kind, count, keys: vec![], replaced: vec![] }
    }
}

/// The previous `:substitute`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Substitution {
    pub pattern: String,
    pub replacement: String,
    pub flags: String,
}

/// Information that carries over between commands.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Persist {
    pub last_search: Option<(String, MoveDir1D)>,
    pub last_find: Option<CharSearch>,
    pub last_substitute: Option<Substitution>,

    /// The first and last line of the most recent Visual selection.
    pub last_visual: Option<(usize, usize)>,

    /// The mode to go back to when leaving the command line.
    pub cmdline_origin: Mode,

    pub insert: Option<InsertSession>,
    pub recording: bool,
}

/// A complete snapshot of the interpreter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VimState {
    pub(crate) buffer: TextBuffer,
    pub(crate) cursor: Cursor,
    pub(crate) mode: Mode,
    pub(crate) command_line: String,
    pub(crate) pending: Pending,
    pub(crate) registers: RegisterStore,
    pub(crate) visual_anchor: Option<Cursor>,
    pub(crate) persist: Persist,
    pub(crate) config: InterpreterConfig,
}

impl Default for VimState {
    fn default() -> Self {
        VimState::new("")
    }
}

impl VimState {
    /// Start editing `text` in Normal mode, with the cursor on the first character.
    pub fn new(text: &str) -> Self {
        VimState::with_config(text, InterpreterConfig::default())
    }

    /// Start editing `text` using the given settings.
    pub fn with_config(text: &str, config: InterpreterConfig) -> Self {
        VimState {
            buffer: TextBuffer::new(text),
            cursor: Cursor::default(),
            mode: Mode::Normal,
            command_line: String::new(),
            pending: Pending::default(),
            registers: RegisterStore::default(),
            visual_anchor: None,
            persist: Persist::default(),
            config,
        }
    }

    /// Interpret a single token, producing the next state.
    pub fn apply(&self, token: &Token) -> Outcome {
        apply(self, token)
    }

    /// The lines of the buffer.
    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    /// The buffer's text, with lines joined by newlines.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// The line the cursor is on.
    pub fn cursor_line(&self) -> usize {
        self.cursor.y
    }

    /// The cursor's column, counted in characters.
    pub fn cursor_col(&self) -> usize {
        self.cursor.x
    }

    /// The cursor.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The text typed at the command line, including its leading `:`, `/` or `?`.
    ///
    /// This is only present in [Mode::CommandLine].
    pub fn command_line(&self) -> Option<&str> {
        if self.mode == Mode::CommandLine {
            Some(self.command_line.as_str())
        } else {
            None
        }
    }

    /// The operator waiting for a motion, if any.
    pub fn pending_operator(&self) -> Option<&PendingOperator> {
        self.pending.operator.as_ref()
    }

    /// The count typed so far, if any.
    pub fn pending_count(&self) -> Option<usize> {
        self.pending.count
    }

    /// The registers.
    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    /// The other end of the selection in Visual mode, as a line and column.
    pub fn visual_anchor(&self) -> Option<(usize, usize)> {
        self.visual_anchor.as_ref().map(|c| (c.y, c.x))
    }

    /// The settings this state is interpreted with.
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Forget any partially typed command.
    pub(crate) fn reset_pending(&mut self) {
        self.pending = Pending::default();
    }

    /// Take the register selected for the next command.
    pub(crate) fn take_register(&mut self) -> (Register, bool) {
        self.pending.register.take().unwrap_or((Register::Unnamed, false))
    }

    /// Take the typed count, multiplied by the pending operator's count.
    pub(crate) fn take_count(&mut self) -> Option<usize> {
        let op = self.pending.operator.as_ref().and_then(|op| op.count);

        let count = match (op, self.pending.count.take()) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
        };

        count.map(|c| self.config.clamp_count(c))
    }

    /// Add a digit to the typed count.
    pub(crate) fn push_count_digit(&mut self, digit: usize) {
        let count = self.pending.count.unwrap_or(0).saturating_mul(10).saturating_add(digit);

        self.pending.count = Some(self.config.clamp_count(count));
    }

    /// Keep the cursor inside the buffer, honoring the column goal.
    pub(crate) fn clamp_cursor(&mut self) {
        let lastcol = self.mode.allows_eol();
        self.buffer.clamp(&mut self.cursor, lastcol);
    }

    /// Keep the cursor inside the buffer, making its column the new goal.
    pub(crate) fn clamp_cursor_x(&mut self) {
        let lastcol = self.mode.allows_eol();
        self.buffer.clamp_x(&mut self.cursor, lastcol);
    }

    /// Move to a line and its first non-blank character.
    pub(crate) fn goto_first_word(&mut self, y: usize) {
        let y = y.min(self.buffer.max_line_idx());

        self.cursor = Cursor::new(y, self.buffer.first_word(y));
    }

    /// Leave Visual mode, remembering the lines it covered.
    pub(crate) fn end_visual(&mut self) {
        if let Some(anchor) = self.visual_anchor.take() {
            let (a, b) = (anchor.y, self.cursor.y);
            self.persist.last_visual = Some((a.min(b), a.max(b)));
        }

        if self.mode.is_visual() {
            self.mode = Mode::Normal;
        }
    }

    /// How many more bytes of text the buffer can hold.
    pub(crate) fn byte_room(&self) -> usize {
        self.config.max_bytes.saturating_sub(self.buffer.byte_len())
    }

    /// Check that an edit adding `added` bytes stays within the size limit.
    pub(crate) fn check_bytes(&self, added: usize) -> Result<(), crate::errors::EditError> {
        if added > self.byte_room() {
            return Err(crate::errors::EditError::TooManyBytes(self.config.max_bytes));
        }

        Ok(())
    }

    /// Check that an edit adding `added` lines stays within the line limit.
    pub(crate) fn check_lines(&self, added: usize) -> Result<(), crate::errors::EditError> {
        let max = self.config.max_lines;

        if self.buffer.get_lines().saturating_add(added) > max {
            return Err(crate::errors::EditError::TooManyLines(max));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = VimState::new("a\nb\n");

        assert_eq!(state.lines(), &strs!["a", "b", ""]);
        assert_eq!(state.text(), "a\nb\n");
        assert_eq!((state.cursor_line(), state.cursor_col()), (0, 0));
        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(state.command_line(), None);
        assert_eq!(state.pending_operator(), None);
        assert_eq!(state.visual_anchor(), None);
    }

    #[test]
    fn test_counts() {
        let mut state = VimState::new("");

        state.push_count_digit(2);
        state.push_count_digit(5);
        assert_eq!(state.pending_count(), Some(25));

        state.pending.operator = Some(PendingOperator { operator: Operator::Delete, count: Some(3) });
        assert_eq!(state.take_count(), Some(75));
        assert_eq!(state.pending_count(), None);
        assert_eq!(state.take_count(), Some(3));

        state.pending.operator = None;
        assert_eq!(state.take_count(), None);

        for _ in 0..10 {
            state.push_count_digit(9);
        }

        assert_eq!(state.pending_count(), Some(10_000));
    }

    #[test]
    fn test_take_register() {
        let mut state = VimState::new("");

        assert_eq!(state.take_register(), (Register::Unnamed, false));

        state.pending.register = Some((Register::Named('a'), true));
        assert_eq!(state.take_register(), (Register::Named('a'), true));
        assert_eq!(state.take_register(), (Register::Unnamed, false));
    }

    #[test]
    fn test_end_visual() {
        let mut state = VimState::new("a\nb\nc");

        state.mode = Mode::VisualLine;
        state.visual_anchor = Some(Cursor::new(2, 0));
        state.cursor = Cursor::new(1, 0);
        state.end_visual();

        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(state.persist.last_visual, Some((1, 2)));
        assert_eq!(state.visual_anchor(), None);
    }

    #[test]
    fn test_check_lines() {
        let mut config = InterpreterConfig::default();
        config.max_lines(3);

        let state = VimState::with_config("a\nb", config);

        assert!(state.check_lines(1).is_ok());
        assert_eq!(state.check_lines(2), Err(crate::errors::EditError::TooManyLines(3)));
    }

    #[test]
    fn test_check_bytes() {
        let mut config = InterpreterConfig::default();
        config.max_bytes(8);

        let state = VimState::with_config("ab\ncd", config);

        assert_eq!(state.byte_room(), 3);
        assert!(state.check_bytes(3).is_ok());
        assert_eq!(state.check_bytes(4), Err(crate::errors::EditError::TooManyBytes(8)));

        let state = VimState::with_config("0123456789", config);
        assert_eq!(state.byte_room(), 0);
    }
}
