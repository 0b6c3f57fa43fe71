//! Error types for trie construction.

use thiserror::Error;

/// Errors reported by the trie.
///
/// Lookups and mutations report absence through `Option`/`bool`, and visitor
/// aborts come back as the visitor's own error type, so this only covers
/// setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid configuration: {field} = {value} (expected {expected})")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: usize,
        /// Accepted range.
        expected: &'static str,
    },
}

/// Result type alias using the trie [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
