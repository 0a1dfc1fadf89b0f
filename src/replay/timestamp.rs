//! Conversion of the replay's tick timestamp.
//!
//! The creation time is stored as a u64 count of 100ns ticks since
//! 0001-01-01T00:00:00Z. The arithmetic is done in `i128` so that no tick
//! value, including ones before the Unix epoch, can overflow or lose
//! precision.

use chrono::{DateTime, Utc};

use crate::error::{ParserError, Result};
use crate::format::{EPOCH_TICKS, TICKS_PER_MILLISECOND};

/// Converts a tick count to milliseconds since the Unix epoch.
///
/// Division truncates toward zero, so sub-millisecond remainders are
/// dropped for times on either side of the epoch.
///
/// # Example
///
/// ```
/// use osr_parser::replay::timestamp::ticks_to_unix_millis;
///
/// assert_eq!(ticks_to_unix_millis(621_355_968_000_000_000), 0);
/// assert_eq!(ticks_to_unix_millis(621_355_968_100_000_000), 10_000);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn ticks_to_unix_millis(ticks: u64) -> i64 {
    let millis =
        (i128::from(ticks) - i128::from(EPOCH_TICKS)) / i128::from(TICKS_PER_MILLISECOND);
    // |millis| <= u64::MAX / 10_000, well inside i64
    millis as i64
}

/// Converts a tick count to a UTC date-time.
///
/// # Errors
///
/// Returns `ParserError::InvalidTimestamp` if the instant is outside the
/// range `chrono` can represent. Every u64 tick count lands between years
/// 1 and 58456, so this does not happen with current `chrono` bounds.
pub fn ticks_to_datetime(ticks: u64) -> Result<DateTime<Utc>> {
    let millis = ticks_to_unix_millis(ticks);
    DateTime::from_timestamp_millis(millis).ok_or_else(|| ParserError::InvalidTimestamp { ticks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(ticks_to_unix_millis(EPOCH_TICKS), 0);
    }

    #[test]
    fn test_ten_seconds_after_epoch() {
        assert_eq!(ticks_to_unix_millis(621_355_968_100_000_000), 10_000);
    }

    #[test]
    fn test_sub_millisecond_truncates() {
        assert_eq!(ticks_to_unix_millis(EPOCH_TICKS + 9_999), 0);
        assert_eq!(ticks_to_unix_millis(EPOCH_TICKS + 10_001), 1);
    }

    #[test]
    fn test_before_epoch_truncates_toward_zero() {
        assert_eq!(ticks_to_unix_millis(EPOCH_TICKS - 9_999), 0);
        assert_eq!(ticks_to_unix_millis(EPOCH_TICKS - 10_000), -1);
        assert_eq!(ticks_to_unix_millis(0), -62_135_596_800_000);
    }

    #[test]
    fn test_large_ticks_keep_precision() {
        // Beyond 2^53, where a float intermediate would round
        let ticks = 637_144_704_001_234_567;
        assert_eq!(ticks_to_unix_millis(ticks), 1_578_873_600_123);
        assert_eq!(ticks_to_unix_millis(u64::MAX), 1_782_538_810_570_955);
    }

    #[test]
    fn test_ticks_to_datetime() {
        let dt = ticks_to_datetime(621_355_968_100_000_000).unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-01T00:00:10+00:00");

        // 2020-01-13T00:00:00.123Z
        let dt = ticks_to_datetime(637_144_704_001_234_567).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_578_873_600_123);
    }

    #[test]
    fn test_ticks_to_datetime_extremes() {
        assert!(ticks_to_datetime(0).is_ok());
        assert!(ticks_to_datetime(u64::MAX).is_ok());
    }
}
