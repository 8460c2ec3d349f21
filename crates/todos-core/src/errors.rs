//! Validation error types.

use thiserror::Error;

/// Errors raised when user input cannot become part of a [`Task`](crate::Task).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Description is empty or only whitespace.
    #[error("task description must not be blank")]
    BlankDescription,
    /// Description exceeds the maximum length.
    #[error("task description is {actual} characters, limit is {limit}")]
    DescriptionTooLong {
        /// Maximum accepted characters.
        limit: usize,
        /// Characters in the rejected input (after trimming).
        actual: usize,
    },
    /// A persisted or parsed literal is not a known variant.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// Which enumeration was being parsed.
        kind: &'static str,
        /// The rejected literal.
        value: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
