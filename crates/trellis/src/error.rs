//! Error types for the binding engine.
//!
//! Only strict path parsing surfaces errors. Everything that can fail at
//! resolution time (missing properties, out-of-range indices, `None`
//! intermediates) is reported as broken-link state on the walker instead,
//! never as an error value or a panic.

use thiserror::Error;

/// Failures from strict path parsing.
///
/// [`BindingPath::parse_lenient`](crate::binding::BindingPath::parse_lenient)
/// converts all of these into an unusable path instead of returning them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path starts with `.`.
    #[error("binding path must not start with '.'")]
    LeadingDot,

    /// A `.` or `[` delimiter produced an empty segment.
    #[error("empty segment at byte offset {offset}")]
    EmptySegment {
        /// Byte offset of the empty segment in the path string.
        offset: usize,
    },

    /// An indexer segment is not a bare non-negative integer followed by `]`.
    #[error("invalid index segment '[{segment}'")]
    InvalidIndexSegment {
        /// The offending segment text, excluding the opening `[`.
        segment: String,
    },

    /// A property segment is not a valid identifier.
    #[error("invalid identifier '{segment}'")]
    InvalidIdentifier {
        /// The offending segment text.
        segment: String,
    },
}
