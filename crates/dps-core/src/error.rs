//! # Error Types
//!
//! Parse failures for the small textual formats owned by this crate.
//! Per-document validation problems are not errors; see [`crate::issue`].

use thiserror::Error;

/// Error parsing a core textual value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The string is not a well-formed `namespace:path` identifier.
    #[error("invalid resource identifier '{input}': {reason}")]
    InvalidResourceId {
        /// The rejected input.
        input: String,
        /// Which rule the input broke.
        reason: String,
    },

    /// A path expression (e.g. `../type`) could not be parsed.
    #[error("invalid path expression '{input}': {reason}")]
    InvalidPathExpr {
        /// The rejected expression.
        input: String,
        /// Which rule the expression broke.
        reason: String,
    },
}
