//! Judgement counts of a play.

use serde::Serialize;

use crate::binary::Cursor;
use crate::error::Result;

/// Number of hits at each judgement tier.
///
/// The format stores six i16 counters whose meaning depends on the
/// gamemode; the field names follow osu!standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AccuracyCounts {
    /// 300s.
    pub count_300: i16,
    /// 100s in standard and catch, 150s in taiko, 200s in mania.
    pub count_100: i16,
    /// 50s in standard and mania, small fruits in catch.
    pub count_50: i16,
    /// Gekis in standard, max 300s in mania.
    pub count_300k: i16,
    /// Katus in standard, 100s in mania.
    pub count_100k: i16,
    /// Misses.
    pub count_miss: i16,
}

impl AccuracyCounts {
    /// Size of the six counters on disk.
    pub const SIZE: usize = 12;

    /// Reads the six counters in file order.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` if fewer than 12 bytes remain.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(AccuracyCounts {
            count_300: cursor.read_i16_le()?,
            count_100: cursor.read_i16_le()?,
            count_50: cursor.read_i16_le()?,
            count_300k: cursor.read_i16_le()?,
            count_100k: cursor.read_i16_le()?,
            count_miss: cursor.read_i16_le()?,
        })
    }

    /// Sum of all six counters.
    #[must_use]
    pub fn total(&self) -> i32 {
        [
            self.count_300,
            self.count_100,
            self.count_50,
            self.count_300k,
            self.count_100k,
            self.count_miss,
        ]
        .into_iter()
        .map(i32::from)
        .sum()
    }
}
