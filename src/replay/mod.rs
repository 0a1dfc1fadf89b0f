//! Replay record deserialization.
//!
//! An `.osr` file is read front to back in one fixed order. Strings are
//! length-prefixed, so no field has a fixed offset; a single misread shifts
//! every field after it, and the reader therefore stops at the first error.
//!
//! # Record Layout
//!
//! | Field        | Encoding                                   |
//! |--------------|--------------------------------------------|
//! | gamemode     | u8                                         |
//! | version      | i32                                        |
//! | beatmap hash | string                                     |
//! | player       | string                                     |
//! | replay hash  | string                                     |
//! | counts       | 6 x i16 (300, 100, 50, 300k, 100k, miss)   |
//! | score        | i32                                        |
//! | max combo    | i16                                        |
//! | perfect      | u8                                         |
//! | mods         | i32                                        |
//! | healthbar    | string of `time\|life` tokens              |
//! | timestamp    | u64 ticks                                  |
//! | payload      | i32 length + LZMA bytes                    |
//! | score id     | i64, absent in older revisions             |
//!
//! Strings are a `0x0B` marker, a ULEB128 byte length and UTF-8 text, or a
//! single other byte for an empty string. All integers are little-endian.
//!
//! # Example
//!
//! ```no_run
//! use osr_parser::Replay;
//!
//! let data = std::fs::read("replay.osr")?;
//! let replay = Replay::parse(&data)?;
//!
//! println!("{} scored {} ({}x)", replay.player, replay.score, replay.max_combo);
//! println!("Mods: {}", replay.mod_flags());
//! # Ok::<(), osr_parser::error::ParserError>(())
//! ```

pub mod accuracy;
pub mod healthbar;
pub mod timestamp;

pub use accuracy::AccuracyCounts;
pub use healthbar::{parse_healthbar, parse_healthbar_with, HealthPoint, HealthbarMode};
pub use timestamp::{ticks_to_datetime, ticks_to_unix_millis};

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::binary::Cursor;
use crate::decompress::{Decompressor, LzmaDecompressor};
use crate::error::Result;
use crate::format::Gamemode;
use crate::mods::Mods;

/// Options controlling how lenient the reader is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// How malformed healthbar tokens are handled.
    pub healthbar: HealthbarMode,
}

impl ParseOptions {
    /// Options that reject malformed healthbar tokens.
    #[must_use]
    pub fn strict() -> Self {
        ParseOptions {
            healthbar: HealthbarMode::Strict,
        }
    }
}

/// A fully parsed replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    /// Raw gamemode byte; see [`Replay::gamemode_kind`].
    pub gamemode: u8,

    /// Game version that wrote the replay, e.g. `20200104`.
    pub version: i32,

    /// MD5 of the beatmap played. May be empty.
    pub beatmap_hash: String,

    /// Player name. May be empty.
    pub player: String,

    /// MD5 of the replay. May be empty.
    pub replay_hash: String,

    /// Judgement counts.
    pub accuracy: AccuracyCounts,

    /// Total score shown on the results screen.
    pub score: i32,

    /// Highest combo shown on the results screen.
    pub max_combo: i16,

    /// `1` for a full combo.
    pub perfect: u8,

    /// Raw mods bitmask; see [`Replay::mod_flags`].
    pub mods: i32,

    /// Life over time, in file order.
    pub healthbar: Vec<HealthPoint>,

    /// When the replay was recorded, to the millisecond.
    pub timestamp: DateTime<Utc>,

    /// Decompressed frame stream: comma-separated `w|x|y|z` events.
    pub replay_data: String,

    /// Online score ID, `None` for revisions that predate the field.
    pub score_id: Option<i64>,
}

impl Replay {
    /// Parses a replay with the LZMA codec and default options.
    ///
    /// # Errors
    ///
    /// - `ParserError::TruncatedInput` if any field is cut off
    /// - `ParserError::MalformedVarint` if a string length is corrupt
    /// - `ParserError::DecompressionFailed` if the frame payload is corrupt
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(data, LzmaDecompressor, ParseOptions::default())
    }

    /// Parses a replay with the given codec and options.
    ///
    /// # Errors
    ///
    /// Same as [`Replay::parse`], plus `ParserError::MalformedHealthbar`
    /// under strict healthbar parsing.
    pub fn parse_with<D: Decompressor>(
        data: &[u8],
        decompressor: D,
        options: ParseOptions,
    ) -> Result<Self> {
        ReplayReader::with_options(data, decompressor, options).deserialize()
    }

    /// Reads and parses a replay file.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::IoError` if the file cannot be read, otherwise
    /// the same errors as [`Replay::parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// The gamemode, if the byte names a known one.
    #[must_use]
    pub fn gamemode_kind(&self) -> Option<Gamemode> {
        Gamemode::from_u8(self.gamemode)
    }

    /// The mods bitmask as typed flags.
    #[must_use]
    pub fn mod_flags(&self) -> Mods {
        Mods::from_raw(self.mods)
    }

    /// Returns whether the play was a full combo.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.perfect == 1
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Reads a [`Replay`] out of a byte buffer.
///
/// The reader owns its cursor and codec. Calling
/// [`deserialize`](ReplayReader::deserialize) again starts over from the
/// first byte and yields a fresh record.
#[derive(Debug)]
pub struct ReplayReader<'a, D> {
    cursor: Cursor<'a>,
    decompressor: D,
    options: ParseOptions,
}

impl<'a, D: Decompressor> ReplayReader<'a, D> {
    /// Creates a reader with default options.
    #[must_use]
    pub fn new(data: &'a [u8], decompressor: D) -> Self {
        Self::with_options(data, decompressor, ParseOptions::default())
    }

    /// Creates a reader with the given options.
    #[must_use]
    pub fn with_options(data: &'a [u8], decompressor: D, options: ParseOptions) -> Self {
        ReplayReader {
            cursor: Cursor::new(data),
            decompressor,
            options,
        }
    }

    /// Byte offset reached by the last call to `deserialize`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Parses the buffer from the start.
    ///
    /// # Errors
    ///
    /// Any read, healthbar or codec error aborts the parse; no partial
    /// record is returned.
    pub fn deserialize(&mut self) -> Result<Replay> {
        self.cursor.reset();
        debug!(bytes = self.cursor.len(), "parsing replay");

        let cursor = &mut self.cursor;

        let gamemode = cursor.read_u8()?;
        let version = cursor.read_i32_le()?;
        let beatmap_hash = cursor.read_string()?;
        let player = cursor.read_string()?;
        let replay_hash = cursor.read_string()?;
        let accuracy = AccuracyCounts::read(cursor)?;
        let score = cursor.read_i32_le()?;
        let max_combo = cursor.read_i16_le()?;
        let perfect = cursor.read_u8()?;
        let mods = cursor.read_i32_le()?;
        let healthbar = parse_healthbar_with(&cursor.read_string()?, self.options.healthbar)?;
        let timestamp = ticks_to_datetime(cursor.read_u64_le()?)?;

        // A negative length reads as a huge one and fails the bounds check.
        #[allow(clippy::cast_sign_loss)]
        let payload_len = cursor.read_i32_le()? as u32;
        let payload = cursor.read_bytes(payload_len as usize)?;

        let score_id = if cursor.has_remaining() {
            Some(cursor.read_i64_le()?)
        } else {
            None
        };

        trace!(
            offset = cursor.position(),
            payload = payload.len(),
            "header read, decompressing frames"
        );
        let frames = self.decompressor.decompress(payload)?;
        let replay_data = String::from_utf8(frames)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());

        let replay = Replay {
            gamemode,
            version,
            beatmap_hash,
            player,
            replay_hash,
            accuracy,
            score,
            max_combo,
            perfect,
            mods,
            healthbar,
            timestamp,
            replay_data,
            score_id,
        };

        debug!(
            player = %replay.player,
            version = replay.version,
            gamemode = replay.gamemode,
            frames = replay.replay_data.len(),
            "replay parsed"
        );

        Ok(replay)
    }
}
