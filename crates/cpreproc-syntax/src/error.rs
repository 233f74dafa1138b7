//! Error types for edits, reparsing and configuration.
//!
//! Malformed source text is never an error: it shows up as `ERROR` and
//! missing nodes in the tree. These types cover misuse of the API.

#![allow(missing_docs)]

use thiserror::Error;

/// An edit descriptor that does not fit the old and new source texts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// `start_byte <= old_end_byte` and `start_byte <= new_end_byte` do not hold.
    #[error("edit range is not ordered (start {start}, old end {old_end}, new end {new_end})")]
    Unordered {
        start: usize,
        old_end: usize,
        new_end: usize,
    },

    /// The edited range reaches past the end of the old source.
    #[error("edit old end {old_end} is past the end of the old source ({len} bytes)")]
    OutOfBounds { old_end: usize, len: usize },

    /// An edit offset splits a UTF-8 character.
    #[error("edit offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// The new source length does not match the edit.
    #[error("new source has {actual} bytes, but the edit implies {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The texts differ outside the edited range.
    #[error("old and new source differ at byte {offset}, outside the edited range")]
    TextMismatch { offset: usize },

    /// A row/column point disagrees with its byte offset.
    #[error("{which} point {row}:{column} does not match byte offset {offset}")]
    PointMismatch {
        which: &'static str,
        row: usize,
        column: usize,
        offset: usize,
    },
}

/// Why [`Parser::reparse`](crate::Parser::reparse) refused to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReparseError {
    /// The edit descriptor is inconsistent.
    #[error("invalid edit: {0}")]
    InvalidEdit(#[from] EditError),

    /// The old tree was built by a different grammar build.
    #[error("old tree was built by a different grammar (fingerprint {found:#x}, expected {expected:#x})")]
    LanguageMismatch { expected: u64, found: u64 },
}

/// Errors loading a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("invalid parser config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A setting is out of range.
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue {
        key: &'static str,
        message: String,
    },
}
