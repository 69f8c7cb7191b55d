//! # Interpreter configuration
//!
//! ## Overview
//!
//! Settings that control limits and option-dependent behavior of the interpreter. A copy of
//! the configuration travels inside every [VimState](crate::state::VimState).
//!
//! ## Example
//!
//! ```
//! use vimsim::InterpreterConfig;
//!
//! let mut config = InterpreterConfig::default();
//! config.max_steps(Some(500)).ignorecase(true);
//!
//! assert_eq!(config.max_steps, Some(500));
//! assert_eq!(config.max_count, 10_000);
//! ```
use serde::{Deserialize, Serialize};

/// Limits and options used while interpreting keystrokes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Upper bound on any count typed before a command.
    pub max_count: usize,

    /// Upper bound on the number of lines in the buffer.
    ///
    /// Edits that would go past this fail, and leave the buffer unchanged.
    pub max_lines: usize,

    /// Upper bound on the size of the buffer's text, in bytes.
    ///
    /// Pastes, repeated inserts, substitutions and other edits that copy text fail instead of
    /// growing the buffer past this. Typing a single key isn't checked.
    pub max_bytes: usize,

    /// Upper bound on the number of keys interpreted by a session.
    pub max_steps: Option<usize>,

    /// Number of columns to shift by with `>` and `<`.
    pub shiftwidth: usize,

    /// Width of a tab, used when shifting and when expanding tabs.
    pub tabstop: usize,

    /// Whether to type spaces instead of a tab in Insert mode, and when shifting.
    pub expandtab: bool,

    /// Whether searches ignore case.
    pub ignorecase: bool,

    /// Whether a search containing uppercase letters overrides `ignorecase`.
    pub smartcase: bool,

    /// Whether searches wrap around the end of the buffer.
    pub wrapscan: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_count: 10_000,
            max_lines: 100_000,
            max_bytes: 10 * 1024 * 1024,
            max_steps: None,
            shiftwidth: 8,
            tabstop: 8,
            expandtab: false,
            ignorecase: false,
            smartcase: false,
            wrapscan: true,
        }
    }
}

impl InterpreterConfig {
    /// Set the upper bound on typed counts.
    pub fn max_count(&mut self, max_count: usize) -> &mut Self {
        self.max_count = max_count.max(1);
        self
    }

    /// Set the upper bound on buffer lines.
    pub fn max_lines(&mut self, max_lines: usize) -> &mut Self {
        self.max_lines = max_lines.max(1);
        self
    }

    /// Set the upper bound on the buffer's size in bytes.
    pub fn max_bytes(&mut self, max_bytes: usize) -> &mut Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Set the upper bound on interpreted keys.
    pub fn max_steps(&mut self, max_steps: Option<usize>) -> &mut Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the shift width.
    pub fn shiftwidth(&mut self, shiftwidth: usize) -> &mut Self {
        self.shiftwidth = shiftwidth;
        self
    }

    /// Set the tab width.
    pub fn tabstop(&mut self, tabstop: usize) -> &mut Self {
        self.tabstop = tabstop.max(1);
        self
    }

    /// Set whether to expand tabs into spaces.
    pub fn expandtab(&mut self, expandtab: bool) -> &mut Self {
        self.expandtab = expandtab;
        self
    }

    /// Set whether searches ignore case.
    pub fn ignorecase(&mut self, ignorecase: bool) -> &mut Self {
        self.ignorecase = ignorecase;
        self
    }

    /// Set whether uppercase letters in a pattern make it case-sensitive.
    pub fn smartcase(&mut self, smartcase: bool) -> &mut Self {
        self.smartcase = smartcase;
        self
    }

    /// Set whether searches wrap around the buffer.
    pub fn wrapscan(&mut self, wrapscan: bool) -> &mut Self {
        self.wrapscan = wrapscan;
        self
    }

    /// Clamp a typed count to the configured limit.
    pub fn clamp_count(&self, count: usize) -> usize {
        count.min(self.max_count)
    }

    /// Columns covered by one level of indentation.
    pub(crate) fn shift_width(&self) -> usize {
        if self.shiftwidth == 0 {
            self.tabstop.max(1)
        } else {
            self.shiftwidth
        }
    }

    /// Whitespace that indents text to display column `width`.
    pub(crate) fn indent_text(&self, width: usize) -> String {
        let tabstop = self.tabstop.max(1);

        if self.expandtab {
            " ".repeat(width)
        } else {
            let mut s = "\t".repeat(width / tabstop);
            s.push_str(&" ".repeat(width % tabstop));
            s
        }
    }

    /// Length in bytes of the whitespace [indent_text](Self::indent_text) would produce.
    pub(crate) fn indent_len(&self, width: usize) -> usize {
        if self.expandtab {
            width
        } else {
            let tabstop = self.tabstop.max(1);

            width / tabstop + width % tabstop
        }
    }

    /// Display width of leading whitespace.
    pub(crate) fn indent_width(&self, line: &str) -> usize {
        let tabstop = self.tabstop.max(1);

        line.chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .fold(0, |w, c| if c == '\t' { w + tabstop - w % tabstop } else { w + 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InterpreterConfig::default();

        assert_eq!(config.max_count, 10_000);
        assert_eq!(config.max_lines, 100_000);
        assert_eq!(config.max_bytes, 10_485_760);
        assert_eq!(config.max_steps, None);
        assert_eq!(config.shiftwidth, 8);
        assert!(config.wrapscan);
        assert!(!config.ignorecase);
    }

    #[test]
    fn test_setters() {
        let mut config = InterpreterConfig::default();
        config.max_count(0).tabstop(4).shiftwidth(4).expandtab(true);

        assert_eq!(config.max_count, 1);
        assert_eq!(config.clamp_count(50), 1);
        assert_eq!(config.shift_width(), 4);
        assert_eq!(config.indent_text(6), "      ");
        assert_eq!(config.indent_len(6), 6);

        config.expandtab(false);
        assert_eq!(config.indent_text(6), "\t  ");
        assert_eq!(config.indent_len(6), 3);
        assert_eq!(config.indent_width("\t  x"), 6);
        assert_eq!(config.indent_width("  \tx"), 4);

        config.shiftwidth(0);
        assert_eq!(config.shift_width(), 4);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: InterpreterConfig =
            serde_json::from_str(r#"{"max_lines": 50, "ignorecase": true}"#).unwrap();

        assert_eq!(config.max_lines, 50);
        assert!(config.ignorecase);
        assert_eq!(config.max_count, 10_000);
        assert!(config.wrapscan);
    }
}
