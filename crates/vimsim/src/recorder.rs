//! # Step recording
//!
//! ## Overview
//!
//! Every token that gets interpreted produces one [Step]: a snapshot of the buffer, cursor and
//! mode right after the token, along with the error the token caused, if any. A [Recording]
//! keeps the steps together with the states they started and ended in, so that they can be
//! replayed or scored.
//!
//! Input can be interpreted all at once with [simulate], or as it arrives with a [Session].
//! Both produce the same steps for the same keystrokes, however the input is split up.
//!
//! ## Example
//!
//! ```
//! use vimsim::{InterpreterConfig, Session};
//!
//! let mut session = Session::new("hello world");
//!
//! assert_eq!(session.feed("d").len(), 1);
//! assert_eq!(session.feed("w<Es").len(), 1);
//! assert_eq!(session.feed("c>").len(), 1);
//!
//! let recording = session.into_recording();
//! assert_eq!(recording.final_text(), "world");
//! assert_eq!(recording.replay(), recording.steps);
//! ```
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InterpreterConfig;
use crate::env::vim::Outcome;
use crate::state::{Mode, VimState};
use crate::tokenizer::{next_token, Scan, Token};

/// A snapshot of the interpreter after a single token.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// The token, written the way it would be typed.
    pub token: String,

    /// The buffer's text.
    pub text: String,

    /// The line the cursor is on, counting from 0.
    pub cursor_line: usize,

    /// The column the cursor is in, counting characters from 0.
    pub cursor_col: usize,

    /// The mode after the token.
    pub mode: Mode,

    /// The command line being typed, in [Mode::CommandLine].
    pub command_line: Option<String>,

    /// Why the token failed, if it did.
    pub error: Option<String>,
}

impl Step {
    fn new(token: &Token, outcome: &Outcome) -> Self {
        let state = &outcome.state;

        Step {
            token: token.to_string(),
            text: state.text(),
            cursor_line: state.cursor_line(),
            cursor_col: state.cursor_col(),
            mode: state.mode(),
            command_line: state.command_line().map(String::from),
            error: outcome.error.as_ref().map(ToString::to_string),
        }
    }
}

/// The complete history of interpreting some keystrokes.
#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    /// The state before any tokens.
    pub initial: VimState,

    /// The state after the last token.
    pub final_state: VimState,

    /// Every token that was interpreted.
    pub tokens: Vec<Token>,

    /// One step for each token.
    pub steps: Vec<Step>,
}

impl Recording {
    /// Interpret the recorded tokens again, starting from the initial state.
    pub fn replay(&self) -> Vec<Step> {
        let mut state = self.initial.clone();
        let mut steps = Vec::with_capacity(self.tokens.len());

        for token in self.tokens.iter() {
            let outcome = state.apply(token);
            steps.push(Step::new(token, &outcome));
            state = outcome.state;
        }

        steps
    }

    /// The buffer's text after the last token.
    pub fn final_text(&self) -> String {
        self.final_state.text()
    }
}

/// Interpret keystrokes as they arrive.
///
/// Input that can't be turned into a token yet, like the start of a `<...>` key name, is kept
/// until the next call to [Session::feed] or [Session::finish].
#[derive(Clone, Debug)]
pub struct Session {
    initial: VimState,
    state: VimState,
    input: String,
    tokens: Vec<Token>,
    steps: Vec<Step>,
}

impl Session {
    /// Start a session editing `text` with the default settings.
    pub fn new(text: &str) -> Self {
        Session::with_config(text, InterpreterConfig::default())
    }

    /// Start a session editing `text` with the given settings.
    pub fn with_config(text: &str, config: InterpreterConfig) -> Self {
        let state = VimState::with_config(text, config);

        Session {
            initial: state.clone(),
            state,
            input: String::new(),
            tokens: vec![],
            steps: vec![],
        }
    }

    /// Add more keystrokes, returning the steps for the tokens they completed.
    pub fn feed(&mut self, chunk: &str) -> &[Step] {
        self.input.push_str(chunk);
        self.consume(false)
    }

    /// Signal that no more keystrokes are coming, and interpret whatever input remains.
    pub fn finish(&mut self) -> &[Step] {
        self.consume(true)
    }

    /// The current state.
    pub fn state(&self) -> &VimState {
        &self.state
    }

    /// Every step so far.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Stop interpreting, and keep what happened so far.
    ///
    /// Input that hasn't been turned into tokens is dropped. Call [Session::finish] first to
    /// interpret it.
    pub fn into_recording(self) -> Recording {
        Recording {
            initial: self.initial,
            final_state: self.state,
            tokens: self.tokens,
            steps: self.steps,
        }
    }

    fn at_limit(&self) -> bool {
        self.state.config().max_steps.is_some_and(|max| self.steps.len() >= max)
    }

    fn consume(&mut self, at_eof: bool) -> &[Step] {
        let start = self.steps.len();
        let mut off = 0;

        while off < self.input.len() {
            if self.at_limit() {
                debug!(steps = self.steps.len(), "step limit reached, discarding input");
                off = self.input.len();
                break;
            }

            match next_token(&self.input[off..], self.state.mode(), at_eof) {
                Scan::Token(token, len) => {
                    off += len;
                    self.step(token);
                },
                Scan::NeedMoreInput => break,
            }
        }

        self.input.replace_range(..off, "");

        &self.steps[start..]
    }

    fn step(&mut self, token: Token) {
        let outcome = self.state.apply(&token);

        self.steps.push(Step::new(&token, &outcome));
        self.tokens.push(token);
        self.state = outcome.state;
    }
}

/// Interpret all of `keys`, starting from `text`.
pub fn simulate(text: &str, keys: &str, config: InterpreterConfig) -> Recording {
    let mut session = Session::with_config(text, config);

    session.feed(keys);
    session.finish();
    session.into_recording()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate() {
        let rec = simulate("hello world", "dw", InterpreterConfig::default());

        assert_eq!(rec.final_text(), "world");
        assert_eq!(rec.initial.text(), "hello world");
        assert_eq!(rec.steps.len(), 2);
        assert_eq!(rec.steps[0].token, "d");
        assert_eq!(rec.steps[0].text, "hello world");
        assert_eq!(rec.steps[1].text, "world");
        assert_eq!(rec.steps[1].mode, Mode::Normal);
        assert_eq!(rec.steps[1].error, None);
    }

    #[test]
    fn test_step_errors() {
        let rec = simulate("abc", ":frob<CR>x", InterpreterConfig::default());

        let last = rec.steps.len() - 1;
        assert_eq!(rec.steps[last - 1].error.as_deref(), Some("Invalid command: frob"));
        assert_eq!(rec.steps[last].error, None);
        assert_eq!(rec.final_text(), "bc");
    }

    #[test]
    fn test_command_line_steps() {
        let rec = simulate("abc", ":s/b/x/\n", InterpreterConfig::default());

        assert_eq!(rec.steps[0].mode, Mode::CommandLine);
        assert_eq!(rec.steps[0].command_line.as_deref(), Some(":"));
        assert_eq!(rec.steps[3].command_line.as_deref(), Some(":s/b"));

        let last = rec.steps.last().unwrap();
        assert_eq!(last.token, "<CR>");
        assert_eq!(last.command_line, None);
        assert_eq!(last.text, "axc");
    }

    #[test]
    fn test_feed_holds_partial_input() {
        let mut session = Session::new("abc");

        assert_eq!(session.feed("<Es").len(), 0);
        assert_eq!(session.feed("c>x").len(), 2);
        assert_eq!(session.state().text(), "bc");

        assert_eq!(session.feed(":s/b/").len(), 1);
        assert_eq!(session.state().mode(), Mode::CommandLine);
        assert_eq!(session.state().command_line(), Some(":"));
        assert_eq!(session.feed("y/<CR>").len(), 7);
        assert_eq!(session.state().text(), "yc");
    }

    #[test]
    fn test_finish_releases_input() {
        let mut session = Session::new("abc");

        assert_eq!(session.feed(":s/b").len(), 1);
        assert_eq!(session.finish().len(), 3);
        assert_eq!(session.state().mode(), Mode::CommandLine);

        let mut session = Session::new("abc");
        session.feed("i<");
        assert_eq!(session.steps().len(), 1);
        session.finish();
        assert_eq!(session.state().text(), "<abc");
    }

    #[test]
    fn test_max_steps() {
        let mut config = InterpreterConfig::default();
        config.max_steps(Some(2));

        let rec = simulate("abcdef", "xxxx", config);
        assert_eq!(rec.steps.len(), 2);
        assert_eq!(rec.final_text(), "cdef");

        let mut session = Session::with_config("abc", config);
        session.feed("xx");
        assert_eq!(session.feed("x").len(), 0);
        assert_eq!(session.state().text(), "c");
    }

    #[test]
    fn test_replay() {
        let rec = simulate("a\nb\nab\nc", ":g/b/d<CR>x", InterpreterConfig::default());

        assert_eq!(rec.replay(), rec.steps);
        assert_eq!(rec.final_text(), "a\n");
    }
}
