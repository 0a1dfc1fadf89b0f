//! Healthbar graph parsing.
//!
//! The healthbar is stored as a single string of comma-separated
//! `time|life` tokens, for example `"1000|1,2500|0.92,4000|0.5,"`.
//! `time` is milliseconds into the song and `life` ranges from 0 to 1.
//!
//! Replays in the wild contain stray commas, padding and the occasional
//! garbled number. [`HealthbarMode::Lenient`] tolerates all of it: blank
//! parts read as `0` and unreadable or missing numbers become `NaN`; [`HealthbarMode::Strict`] rejects the
//! replay instead.

use serde::Serialize;

use crate::error::{ParserError, Result};

/// Separator between healthbar tokens.
pub const TOKEN_SEPARATOR: char = ',';

/// Separator between the time and life parts of a token.
pub const FIELD_SEPARATOR: char = '|';

/// Amount of life at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthPoint {
    /// Milliseconds into the song.
    pub timestamp: f64,
    /// Life, from 0 to 1.
    pub percentage: f64,
}

/// How unreadable healthbar tokens are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthbarMode {
    /// Blank parts read as `0`, unreadable numbers become `NaN` and extra
    /// `|` parts are ignored.
    #[default]
    Lenient,
    /// Every token must be exactly two numbers.
    Strict,
}

/// Parses a healthbar string, tolerating malformed numbers.
///
/// # Example
///
/// ```
/// use osr_parser::replay::healthbar::parse_healthbar;
///
/// let points = parse_healthbar("1000|1.0,2500|0.92,,  4000|0.5  ,");
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[1].timestamp, 2500.0);
/// assert_eq!(points[1].percentage, 0.92);
/// ```
#[must_use]
pub fn parse_healthbar(s: &str) -> Vec<HealthPoint> {
    tokens(s).map(parse_token_lenient).collect()
}

/// Parses a healthbar string with the given strictness.
///
/// # Errors
///
/// In [`HealthbarMode::Strict`], returns `ParserError::MalformedHealthbar`
/// for the first token that is not exactly two numbers. Lenient parsing
/// never fails.
pub fn parse_healthbar_with(s: &str, mode: HealthbarMode) -> Result<Vec<HealthPoint>> {
    match mode {
        HealthbarMode::Lenient => Ok(parse_healthbar(s)),
        HealthbarMode::Strict => tokens(s).map(parse_token_strict).collect(),
    }
}

fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(TOKEN_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(str::trim)
}

fn parse_token_lenient(token: &str) -> HealthPoint {
    let mut parts = token.split(FIELD_SEPARATOR);
    HealthPoint {
        timestamp: parse_number(parts.next()),
        percentage: parse_number(parts.next()),
    }
}

fn parse_token_strict(token: &str) -> Result<HealthPoint> {
    let malformed = || ParserError::MalformedHealthbar {
        token: token.to_string(),
    };

    let mut parts = token.split(FIELD_SEPARATOR);
    let (Some(time), Some(life), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let number = |part: &str| {
        let value = to_number(part);
        if trim(part).is_empty() || value.is_nan() {
            Err(malformed())
        } else {
            Ok(value)
        }
    };

    Ok(HealthPoint {
        timestamp: number(time)?,
        percentage: number(life)?,
    })
}

/// A missing part has no value at all and reads as `NaN`.
fn parse_number(part: Option<&str>) -> f64 {
    part.map_or(f64::NAN, to_number)
}

fn trim(part: &str) -> &str {
    part.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Converts one part the way the game's own tooling reads numbers.
///
/// A blank part is `0`. Decimal and exponent forms, `Infinity` with an
/// optional sign and unsigned `0x`/`0o`/`0b` integers are accepted. Anything
/// else, including Rust's `inf` and `nan` spellings, is `NaN`.
fn to_number(part: &str) -> f64 {
    let s = trim(part);
    if s.is_empty() {
        return 0.0;
    }

    if let Some(value) = parse_radix_integer(s) {
        return value;
    }

    let (sign, unsigned) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };

    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }

    // str::parse also takes inf/infinity/nan; only digit-led forms get through
    if unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn parse_radix_integer(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };

    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let value = digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}
