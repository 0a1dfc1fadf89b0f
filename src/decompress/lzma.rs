//! LZMA decompression of the replay frame payload.
//!
//! The payload is a legacy LZMA ("alone") stream:
//! - 1 byte: lc/lp/pb properties
//! - 4 bytes: dictionary size (u32 LE)
//! - 8 bytes: uncompressed size (u64 LE), `0xFFFF_FFFF_FFFF_FFFF` if unknown
//! - compressed data, ending in an end marker when the size is unknown
//!
//! # Example
//!
//! ```
//! use osr_parser::decompress::{Decompressor, LzmaDecompressor};
//!
//! let mut compressed = Vec::new();
//! lzma_rs::lzma_compress(&mut &b"0|256|-500|0,"[..], &mut compressed).unwrap();
//!
//! let frames = LzmaDecompressor.decompress(&compressed).unwrap();
//! assert_eq!(frames, b"0|256|-500|0,");
//! ```

use tracing::trace;

use super::Decompressor;
use crate::error::{ParserError, Result};

/// Size of the LZMA "alone" header.
pub const LZMA_HEADER_SIZE: usize = 13;

/// Decompressor for the LZMA streams embedded in replays.
///
/// An empty payload decompresses to empty output; replays without frame
/// data write a payload length of zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzmaDecompressor;

impl Decompressor for LzmaDecompressor {
    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        if compressed.is_empty() {
            return Ok(Vec::new());
        }

        if compressed.len() < LZMA_HEADER_SIZE {
            return Err(ParserError::decompression_failed(format!(
                "LZMA header needs {LZMA_HEADER_SIZE} bytes, payload has {}",
                compressed.len()
            )));
        }

        let mut input = compressed;
        let mut output = Vec::new();
        lzma_rs::lzma_decompress(&mut input, &mut output).map_err(|e| {
            ParserError::decompression_failed(format!(
                "invalid LZMA stream ({} bytes): {e}",
                compressed.len()
            ))
        })?;

        trace!(
            compressed = compressed.len(),
            decompressed = output.len(),
            "LZMA payload decompressed"
        );

        Ok(output)
    }
}
