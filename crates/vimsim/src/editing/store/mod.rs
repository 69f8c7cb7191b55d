//! # Register storage
//!
//! ## Overview
//!
//! The [RegisterStore] holds yanked and deleted text. It is part of every
//! [VimState](crate::state::VimState), so a state's registers are a plain value that gets
//! copied along with the rest of the state.
//!
//! ## Example
//!
//! ```
//! use vimsim::editing::store::{RegisterCell, RegisterPutFlags, RegisterStore};
//! use vimsim::prelude::{Register, TargetShape};
//!
//! let mut store = RegisterStore::default();
//! let cell = RegisterCell::new(TargetShape::LineWise, "hello\n");
//!
//! store.put(&Register::Named('a'), cell.clone(), RegisterPutFlags::NONE);
//!
//! assert_eq!(store.get(&Register::Named('a')), cell);
//! assert_eq!(store.get(&Register::Unnamed), cell);
//! ```
mod register;

pub use self::register::{RegisterCell, RegisterPutFlags, RegisterStore};
