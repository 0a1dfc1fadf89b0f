//! Decompression of the replay frame payload.
//!
//! The record reader never calls a codec directly. It is handed a
//! [`Decompressor`], so callers can swap in a different codec, offload the
//! work elsewhere, or inject a mock in tests.
//!
//! # Usage
//!
//! [`LzmaDecompressor`] handles the payloads the game writes. Any closure
//! with the right signature is a decompressor too:
//!
//! ```
//! use osr_parser::decompress::{decompress, Decompressor};
//! use osr_parser::error::Result;
//!
//! let passthrough = |bytes: &[u8]| -> Result<Vec<u8>> { Ok(bytes.to_vec()) };
//! assert_eq!(passthrough.decompress(b"abc").unwrap(), b"abc");
//!
//! // The default codec
//! assert!(decompress(&[]).unwrap().is_empty());
//! ```

pub mod lzma;

pub use lzma::{LzmaDecompressor, LZMA_HEADER_SIZE};

use crate::error::Result;

/// A codec turning the compressed payload into raw frame bytes.
///
/// Implementations report every failure as
/// [`ParserError::DecompressionFailed`](crate::error::ParserError::DecompressionFailed).
pub trait Decompressor {
    /// Decompresses a complete payload.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::DecompressionFailed` if the payload is
    /// malformed or truncated.
    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>>;
}

impl<F> Decompressor for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>>,
{
    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        self(compressed)
    }
}

/// Decompresses a payload with the default LZMA codec.
///
/// # Errors
///
/// Returns `ParserError::DecompressionFailed` if the payload is not a valid
/// LZMA stream.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    LzmaDecompressor.decompress(compressed)
}
