//! # OSR Parser
//!
//! A strict, bounds-checked parser for osu! replay (.osr) files.
//!
//! A replay is a flat little-endian record: scalar header fields,
//! length-prefixed strings, a healthbar graph, a tick timestamp and an
//! LZMA-compressed stream of input frames. Every read is bounds checked and
//! the first error aborts the parse.
//!
//! ## Quick Start
//!
//! ```no_run
//! use osr_parser::{Replay, Result};
//!
//! fn summarize(data: &[u8]) -> Result<()> {
//!     let replay = Replay::parse(data)?;
//!
//!     println!("Player: {}", replay.player);
//!     println!("Score: {} ({}x)", replay.score, replay.max_combo);
//!     println!("Mods: {}", replay.mod_flags());
//!     println!("Played at: {}", replay.timestamp);
//!     println!("Frames: {} bytes", replay.replay_data.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`binary`] - Sequential cursor with little-endian, LEB128 and string reads
//! - [`format`] - Format constants and the gamemode enumeration
//! - [`mods`] - Typed view of the mods bitmask
//! - [`decompress`] - The pluggable payload codec and its LZMA implementation
//! - [`replay`] - The record reader, healthbar and timestamp decoding
//!
//! ## Custom Codecs
//!
//! The frame payload is decompressed by whatever [`Decompressor`] the
//! caller supplies; [`Replay::parse`] uses [`LzmaDecompressor`].
//!
//! ```
//! use osr_parser::{ParseOptions, Replay, Result};
//!
//! // Skip decompression entirely
//! let skip = |_: &[u8]| -> Result<Vec<u8>> { Ok(Vec::new()) };
//! # let data: Vec<u8> = Vec::new();
//! let result = Replay::parse_with(&data, skip, ParseOptions::default());
//! assert!(result.is_err()); // empty input is truncated
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod binary;
pub mod decompress;
pub mod error;
pub mod format;
pub mod mods;
pub mod replay;

// Re-export commonly used types at the crate root
pub use binary::{decode_uleb128, Cursor};
pub use decompress::{decompress, Decompressor, LzmaDecompressor};
pub use error::{ParserError, Result};
pub use format::{Gamemode, EPOCH_TICKS, STRING_PRESENT};
pub use mods::Mods;
pub use replay::{
    parse_healthbar, parse_healthbar_with, ticks_to_unix_millis, AccuracyCounts, HealthPoint,
    HealthbarMode, ParseOptions, Replay, ReplayReader,
};
