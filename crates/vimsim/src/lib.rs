//! # vimsim
//!
//! ## Overview
//!
//! This crate interprets a stream of Vim keystrokes against a text buffer, the way Vim would,
//! and records what the buffer, cursor and mode looked like after every key. It is meant for
//! replaying editing sessions that were typed without a real editor attached, so it does no
//! I/O and never blocks: input goes in as text, and [Step] snapshots come out.
//!
//! The pieces are:
//!
//! - the [tokenizer], which splits keystroke text like `dw<Esc>` into [Token] values
//! - [VimState], an immutable snapshot of the interpreter, and [apply], which produces the
//!   state after a token
//! - the [recorder] module's [simulate] and [Session], which drive the two above and keep the
//!   resulting [Recording]
//!
//! ## Example
//!
//! ```
//! use vimsim::{simulate, InterpreterConfig, Mode};
//!
//! let recording = simulate("banana\napple\ncherry", ":sort<CR>", InterpreterConfig::default());
//!
//! assert_eq!(recording.final_text(), "apple\nbanana\ncherry");
//! assert_eq!(recording.steps.len(), 6);
//! assert_eq!(recording.steps[5].mode, Mode::Normal);
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

#[macro_use]
mod util;

pub mod commands;
pub mod config;
pub mod editing;
pub mod env;
pub mod errors;
pub mod key;
pub mod prelude;
pub mod recorder;
pub mod state;
pub mod tokenizer;

pub use crossterm;

pub use self::config::InterpreterConfig;
pub use self::env::vim::{apply, Outcome};
pub use self::recorder::{simulate, Recording, Session, Step};
pub use self::state::{Mode, VimState};
pub use self::tokenizer::{next_token, tokenize, Scan, Token};
