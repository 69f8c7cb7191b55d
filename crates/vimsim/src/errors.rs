//! # Error Types
//!
//! ## Overview
//!
//! This module contains the error type that a step of interpretation can be annotated with.
//! None of these errors stop interpretation: the state is left as it was before the failing
//! key, and the next key is processed normally.
pub use crate::commands::CommandError;
pub use crate::key::KeyError;

/// Errors returned from editing operations.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum EditError {
    /// Failure while running a command typed at the command line, or a search.
    #[error("{0}")]
    CommandFailure(#[from] CommandError),

    /// Failure due to an edit that would produce too many lines.
    #[error("Buffer would exceed the {0} line limit")]
    TooManyLines(usize),

    /// Failure due to an edit that would make the buffer too large.
    #[error("Buffer would exceed the {0} byte limit")]
    TooManyBytes(usize),
}

/// Common result type for editing operations.
pub type EditResult<V> = Result<V, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EditError::from(CommandError::PatternNotFound("foo".into()));
        assert_eq!(err.to_string(), "Pattern not found: foo");

        let err = EditError::TooManyLines(100);
        assert_eq!(err.to_string(), "Buffer would exceed the 100 line limit");

        let err = EditError::TooManyBytes(4096);
        assert_eq!(err.to_string(), "Buffer would exceed the 4096 byte limit");

        let err = EditError::from(CommandError::InvalidCommand("frob".into()));
        assert_eq!(err.to_string(), "Invalid command: frob");
    }
}
