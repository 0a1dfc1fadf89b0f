//! Gameplay modifier flags.
//!
//! The replay stores the active mods as a single 32-bit integer with one bit
//! per modifier. [`Mods`] gives that integer a typed view; bits the format
//! does not define are preserved rather than dropped.

use serde::{Serialize, Serializer};

bitflags::bitflags! {
    /// Bitmask of the mods active during a play.
    ///
    /// # Example
    ///
    /// ```
    /// use osr_parser::Mods;
    ///
    /// let mods = Mods::from_raw(24);
    /// assert_eq!(mods, Mods::HIDDEN | Mods::HARD_ROCK);
    /// assert_eq!(mods.names(), vec!["HIDDEN", "HARD_ROCK"]);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u32 {
        /// No Fail.
        const NO_FAIL = 1;
        /// Easy.
        const EASY = 1 << 1;
        /// Played on a touch device.
        const TOUCH_DEVICE = 1 << 2;
        /// Hidden.
        const HIDDEN = 1 << 3;
        /// Hard Rock.
        const HARD_ROCK = 1 << 4;
        /// Sudden Death.
        const SUDDEN_DEATH = 1 << 5;
        /// Double Time.
        const DOUBLE_TIME = 1 << 6;
        /// Relax.
        const RELAX = 1 << 7;
        /// Half Time.
        const HALF_TIME = 1 << 8;
        /// Always written together with `DOUBLE_TIME`.
        const NIGHTCORE = 1 << 9;
        /// Flashlight.
        const FLASHLIGHT = 1 << 10;
        /// Autoplay.
        const AUTOPLAY = 1 << 11;
        /// Spun Out.
        const SPUN_OUT = 1 << 12;
        /// Autopilot.
        const AUTOPILOT = 1 << 13;
        /// Always written together with `SUDDEN_DEATH`.
        const PERFECT = 1 << 14;
        /// 4K (mania).
        const KEY4 = 1 << 15;
        /// 5K (mania).
        const KEY5 = 1 << 16;
        /// 6K (mania).
        const KEY6 = 1 << 17;
        /// 7K (mania).
        const KEY7 = 1 << 18;
        /// 8K (mania).
        const KEY8 = 1 << 19;
        /// Fade In (mania).
        const FADE_IN = 1 << 20;
        /// Random (mania).
        const RANDOM = 1 << 21;
        /// Cinema.
        const CINEMA = 1 << 22;
        /// Target Practice.
        const TARGET = 1 << 23;
        /// 9K (mania).
        const KEY9 = 1 << 24;
        /// Co-op (mania).
        const KEY_COOP = 1 << 25;
        /// 1K (mania).
        const KEY1 = 1 << 26;
        /// 3K (mania).
        const KEY3 = 1 << 27;
        /// 2K (mania).
        const KEY2 = 1 << 28;
        /// ScoreV2.
        const SCORE_V2 = 1 << 29;
        /// Mirror (mania).
        const MIRROR = 1 << 30;
    }
}

impl Mods {
    /// No mods.
    pub const NONE: Mods = Mods::empty();

    /// Builds the flag set from the signed integer stored in the replay.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_raw(raw: i32) -> Self {
        Mods::from_bits_retain(raw as u32)
    }

    /// Names of the known flags that are set, in bit order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Serialize for Mods {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl std::fmt::Display for Mods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        f.write_str(&self.names().join("|"))
    }
}
