//! Constants and enumerations of the osu! replay (.osr) format.
//!
//! An `.osr` file is a flat sequence of little-endian fields with no magic
//! bytes and no section table. The field order is fixed; see
//! [`crate::replay`] for the full layout.
//!
//! # Example
//!
//! ```
//! use osr_parser::format::Gamemode;
//!
//! assert_eq!(Gamemode::from_u8(3), Some(Gamemode::Mania));
//! assert_eq!(Gamemode::from_u8(7), None);
//! ```

use serde::Serialize;

/// Presence byte announcing that string content follows.
///
/// Any other value means the string is empty and nothing else was written.
pub const STRING_PRESENT: u8 = 0x0B;

/// Ticks between 0001-01-01T00:00:00Z and the Unix epoch.
///
/// One tick is 100 nanoseconds.
pub const EPOCH_TICKS: u64 = 621_355_968_000_000_000;

/// Number of 100ns ticks in one millisecond.
pub const TICKS_PER_MILLISECOND: u64 = 10_000;

/// The ruleset a replay was played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gamemode {
    /// osu!standard
    Standard = 0,
    /// osu!taiko
    Taiko = 1,
    /// osu!catch
    Catch = 2,
    /// osu!mania
    Mania = 3,
}

impl Gamemode {
    /// Maps the raw gamemode byte to a known ruleset.
    ///
    /// Returns `None` for values outside 0-3; the parser keeps such bytes
    /// as-is rather than rejecting the replay.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Gamemode::Standard),
            1 => Some(Gamemode::Taiko),
            2 => Some(Gamemode::Catch),
            3 => Some(Gamemode::Mania),
            _ => None,
        }
    }

    /// Returns the display name of the ruleset.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Gamemode::Standard => "osu!standard",
            Gamemode::Taiko => "osu!taiko",
            Gamemode::Catch => "osu!catch",
            Gamemode::Mania => "osu!mania",
        }
    }
}

impl std::fmt::Display for Gamemode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
