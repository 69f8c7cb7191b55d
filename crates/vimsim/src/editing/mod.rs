//! # Editing support
//!
//! ## Overview
//!
//! This module contains the pieces the interpreter edits with, independent of which keys
//! trigger them: the line-based [buffer::TextBuffer], the [cursor::Cursor], [motions](motion)
//! and text objects, and the [register store](store).
pub mod buffer;
pub mod cursor;
pub mod motion;
pub mod store;
