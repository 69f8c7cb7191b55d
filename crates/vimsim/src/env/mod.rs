//! # Keybinding environments
//!
//! ## Overview
//!
//! This module contains the code that decides what each key does. Only Vim's keybindings are
//! interpreted, in the [vim] module.
pub mod vim;
