//! Error types for the osu! replay parser.
//!
//! Every failure aborts the parse that raised it. Position tracking in the
//! replay format depends on every earlier field having been read exactly
//! right, so there is no local recovery and no partial record.

use thiserror::Error;

/// The main error type for replay parsing operations.
///
/// # Example
///
/// ```
/// use osr_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::truncated(8, 4))
/// }
///
/// assert!(example_operation().is_err());
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading the replay file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A read would run past the end of the buffer.
    ///
    /// Raised for fixed-width fields, string lengths, string bytes and the
    /// compressed payload alike. An unterminated length prefix running off
    /// the end of the buffer is reported here as well.
    #[error("Truncated input: expected {expected} bytes, but only {available} available")]
    TruncatedInput {
        /// The absolute number of bytes the read needed.
        expected: usize,
        /// The length of the buffer.
        available: usize,
    },

    /// A string length prefix does not fit in 64 bits.
    #[error("Malformed variable-length integer at offset {offset}")]
    MalformedVarint {
        /// Offset of the first byte of the encoded integer.
        offset: usize,
    },

    /// The replay frame payload could not be decompressed.
    #[error("Decompression failed: {reason}")]
    DecompressionFailed {
        /// A description of the codec failure.
        reason: String,
    },

    /// The creation time cannot be represented as a calendar date-time.
    #[error("Timestamp out of range: {ticks} ticks")]
    InvalidTimestamp {
        /// The raw tick count read from the replay.
        ticks: u64,
    },

    /// A healthbar token is not a `time|life` pair of numbers.
    ///
    /// Only raised when strict healthbar parsing is requested.
    #[error("Malformed healthbar token: {token:?}")]
    MalformedHealthbar {
        /// The offending token, after trimming.
        token: String,
    },
}

impl ParserError {
    /// Creates a `TruncatedInput` error with the given sizes.
    ///
    /// # Arguments
    ///
    /// * `expected` - The number of bytes that were needed
    /// * `available` - The number of bytes actually available
    #[must_use]
    pub fn truncated(expected: usize, available: usize) -> Self {
        ParserError::TruncatedInput {
            expected,
            available,
        }
    }

    /// Creates a `DecompressionFailed` error from any displayable cause.
    #[must_use]
    pub fn decompression_failed(reason: impl std::fmt::Display) -> Self {
        ParserError::DecompressionFailed {
            reason: reason.to_string(),
        }
    }

    /// Returns whether this error means the input ended too early.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, ParserError::TruncatedInput { .. })
    }
}

/// A specialized Result type for replay parsing operations.
pub type Result<T> = std::result::Result<T, ParserError>;
