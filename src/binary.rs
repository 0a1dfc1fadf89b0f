//! Sequential binary reading for osu! replay files.
//!
//! This module provides [`Cursor`], a forward-only reader over a borrowed
//! byte buffer. It knows how to read little-endian integers, raw byte runs,
//! unsigned LEB128 integers and the format's length-prefixed strings. It
//! attaches no meaning to the values it reads.
//!
//! All reads are bounds checked. A read that cannot be satisfied fails with
//! [`ParserError::TruncatedInput`] and leaves the position where it was.
//!
//! # Example
//!
//! ```
//! use osr_parser::binary::Cursor;
//!
//! let data = [0x03, 0x34, 0x12, 0x0B, 0x02, b'H', b'i', 0x00];
//! let mut cursor = Cursor::new(&data);
//!
//! assert_eq!(cursor.read_u8().unwrap(), 3);
//! assert_eq!(cursor.read_i16_le().unwrap(), 0x1234);
//! assert_eq!(cursor.read_string().unwrap(), "Hi");
//! assert_eq!(cursor.read_string().unwrap(), "");
//! assert!(!cursor.has_remaining());
//! ```

use crate::error::{ParserError, Result};
use crate::format::STRING_PRESENT;

/// Longest valid encoding of a 64-bit LEB128 integer.
const MAX_ULEB128_LEN: usize = 10;

/// Forward-only reader over a borrowed byte buffer.
///
/// The cursor is owned by a single parse; it is not meant to be shared.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data, position: 0 }
    }

    /// Moves the cursor back to the start of the buffer.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Current byte offset from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Returns whether at least one byte is left to read.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.position < self.data.len()
    }

    /// Reads exactly `len` bytes and returns a view into the buffer.
    ///
    /// Reading zero bytes always succeeds, even at the end of the buffer.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                ParserError::truncated(self.position.saturating_add(len), self.data.len())
            })?;

        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` at the end of the buffer.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a little-endian i16.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` if fewer than 2 bytes remain.
    pub fn read_i16_le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian i32.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` if fewer than 4 bytes remain.
    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian u64 over its full unsigned range.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` if fewer than 8 bytes remain.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian i64.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TruncatedInput` if fewer than 8 bytes remain.
    pub fn read_i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Reads an unsigned LEB128 integer.
    ///
    /// # Errors
    ///
    /// - `ParserError::TruncatedInput` if the encoding runs off the buffer
    /// - `ParserError::MalformedVarint` if the value does not fit in a u64
    pub fn read_uleb128(&mut self) -> Result<u64> {
        let (value, len) = decode_uleb128_at(self.data, self.position)?;
        self.position += len;
        Ok(value)
    }

    /// Reads a length-prefixed string.
    ///
    /// Layout:
    /// - 1 byte: presence marker; anything but `0x0B` means an empty string
    ///   and nothing further is consumed
    /// - ULEB128: byte length of the text
    /// - N bytes: the text, UTF-8
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD rather than failing.
    ///
    /// # Errors
    ///
    /// - `ParserError::TruncatedInput` if the marker, length or text is cut off
    /// - `ParserError::MalformedVarint` if the length does not fit in a u64
    pub fn read_string(&mut self) -> Result<String> {
        if self.read_u8()? != STRING_PRESENT {
            return Ok(String::new());
        }

        let len = self.read_uleb128()?;
        let len = usize::try_from(len).map_err(|_| ParserError::truncated(usize::MAX, self.len()))?;
        let bytes = self.read_bytes(len)?;

        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Decodes an unsigned LEB128 integer from the start of `bytes`.
///
/// Returns the decoded value and the number of bytes its encoding used.
///
/// # Errors
///
/// - `ParserError::TruncatedInput` if the last byte still has its
///   continuation bit set
/// - `ParserError::MalformedVarint` if the value does not fit in a u64
///
/// # Example
///
/// ```
/// use osr_parser::binary::decode_uleb128;
///
/// assert_eq!(decode_uleb128(&[0x00]).unwrap(), (0, 1));
/// assert_eq!(decode_uleb128(&[0xE5, 0x8E, 0x26]).unwrap(), (624_485, 3));
/// ```
pub fn decode_uleb128(bytes: &[u8]) -> Result<(u64, usize)> {
    decode_uleb128_at(bytes, 0)
}

fn decode_uleb128_at(data: &[u8], start: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;

    for (index, shift) in (0..MAX_ULEB128_LEN).zip((0u32..).step_by(7)) {
        let offset = start + index;
        let byte = *data
            .get(offset)
            .ok_or_else(|| ParserError::truncated(offset + 1, data.len()))?;
        let low = u64::from(byte & 0x7F);

        // The tenth byte carries only bit 63.
        if shift == 63 && low > 1 {
            return Err(ParserError::MalformedVarint { offset: start });
        }

        value |= low << shift;

        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }

    Err(ParserError::MalformedVarint { offset: start })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================
    // Fixed-width reads
    // ========================

    #[test]
    fn test_read_u8_sequence() {
        let data = [0x01, 0xFF];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 1);
        assert_eq!(cursor.read_u8().unwrap(), 0xFF);
        assert_eq!(cursor.position(), 2);
        assert!(cursor.read_u8().unwrap_err().is_truncated());
    }

    #[test]
    fn test_read_i16_le_negative() {
        let data = [0xFE, 0xFF];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_i16_le().unwrap(), -2);
    }

    #[test]
    fn test_read_i32_le_basic() {
        // 20200104, a typical game version
        let data = 20_200_104i32.to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_i32_le().unwrap(), 20_200_104);
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn test_read_u64_le_full_range() {
        let data = u64::MAX.to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u64_le().unwrap(), u64::MAX);
    }

    #[test]
    fn test_read_i64_le_basic() {
        let data = 3_101_457_438i64.to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_i64_le().unwrap(), 3_101_457_438);
    }

    #[test]
    fn test_partial_read_is_truncated() {
        let data = [0x78, 0x56, 0x34];
        let mut cursor = Cursor::new(&data);
        let result = cursor.read_i32_le();
        assert!(matches!(
            result,
            Err(ParserError::TruncatedInput {
                expected: 4,
                available: 3
            })
        ));
        // Failed reads do not move the cursor
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_read_on_empty_buffer() {
        let mut cursor = Cursor::new(&[]);
        assert!(cursor.is_empty());
        assert!(!cursor.has_remaining());
        assert!(cursor.read_u8().unwrap_err().is_truncated());
        assert!(cursor.read_u64_le().unwrap_err().is_truncated());
    }

    // ========================
    // read_bytes tests
    // ========================

    #[test]
    fn test_read_bytes_borrows() {
        let data = b"abcdef";
        let mut cursor = Cursor::new(data);
        let head = cursor.read_bytes(2).unwrap();
        let tail = cursor.read_bytes(4).unwrap();
        assert_eq!(head, b"ab");
        assert_eq!(tail, b"cdef");
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_read_bytes_zero_length_at_end() {
        let data = [0x01];
        let mut cursor = Cursor::new(&data);
        cursor.read_u8().unwrap();
        assert_eq!(cursor.read_bytes(0).unwrap(), &[] as &[u8]);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_read_bytes_overflow() {
        let data = b"osr!";
        let mut cursor = Cursor::new(data);
        cursor.read_bytes(2).unwrap();
        let result = cursor.read_bytes(4);
        assert!(matches!(
            result,
            Err(ParserError::TruncatedInput {
                expected: 6,
                available: 4
            })
        ));
    }

    #[test]
    fn test_read_bytes_huge_length() {
        let data = [0u8; 4];
        let mut cursor = Cursor::new(&data);
        cursor.read_u8().unwrap();
        assert!(cursor.read_bytes(usize::MAX).unwrap_err().is_truncated());
    }

    #[test]
    fn test_reset() {
        let data = [0x2A, 0x00];
        let mut cursor = Cursor::new(&data);
        cursor.read_i16_le().unwrap();
        cursor.reset();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u8().unwrap(), 0x2A);
    }

    // ========================
    // LEB128 tests
    // ========================

    #[test]
    fn test_decode_uleb128_vectors() {
        assert_eq!(decode_uleb128(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode_uleb128(&[0x7F]).unwrap(), (127, 1));
        assert_eq!(decode_uleb128(&[0x80, 0x01]).unwrap(), (128, 2));
        assert_eq!(decode_uleb128(&[0xE5, 0x8E, 0x26]).unwrap(), (624_485, 3));
    }

    #[test]
    fn test_decode_uleb128_ignores_trailing_bytes() {
        assert_eq!(decode_uleb128(&[0x20, 0xFF, 0xFF]).unwrap(), (32, 1));
    }

    #[test]
    fn test_decode_uleb128_max() {
        let encoded = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert_eq!(decode_uleb128(&encoded).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_decode_uleb128_unterminated() {
        let result = decode_uleb128(&[0x80, 0x80]);
        assert!(matches!(
            result,
            Err(ParserError::TruncatedInput {
                expected: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_decode_uleb128_overflow() {
        let too_wide = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(
            decode_uleb128(&too_wide),
            Err(ParserError::MalformedVarint { offset: 0 })
        ));

        let too_long = [0x80; 11];
        assert!(matches!(
            decode_uleb128(&too_long),
            Err(ParserError::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_read_uleb128_advances() {
        let data = [0x01, 0xE5, 0x8E, 0x26, 0x05];
        let mut cursor = Cursor::new(&data);
        cursor.read_u8().unwrap();
        assert_eq!(cursor.read_uleb128().unwrap(), 624_485);
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.read_u8().unwrap(), 5);
    }

    #[test]
    fn test_read_uleb128_reports_absolute_offset() {
        let data = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut cursor = Cursor::new(&data);
        cursor.read_i16_le().unwrap();
        assert!(matches!(
            cursor.read_uleb128(),
            Err(ParserError::MalformedVarint { offset: 2 })
        ));
    }

    // ========================
    // read_string tests
    // ========================

    #[test]
    fn test_read_string_present() {
        let mut data = vec![0x0B, 0x0E];
        data.extend_from_slice(b"minhducsun2002");
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "minhducsun2002");
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn test_read_string_absent_consumes_one_byte() {
        // Whatever follows the marker is left alone
        let data = [0x00, 0x0B, 0x05, 0xFF];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "");
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_read_string_any_other_marker_is_absent() {
        // 0x05 would be a valid length byte, but it is not the presence marker
        for marker in [0x05, 0x0A, 0x0C, 0xFF] {
            let data = [marker, 0x02, b'H', b'i'];
            let mut cursor = Cursor::new(&data);
            assert_eq!(cursor.read_string().unwrap(), "", "marker {marker:#04x}");
            assert_eq!(cursor.position(), 1);
            assert_eq!(cursor.read_u8().unwrap(), 0x02);
        }
    }

    #[test]
    fn test_read_string_present_but_zero_length() {
        let data = [0x0B, 0x00];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "");
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_read_string_multibyte_length() {
        let text = "x".repeat(200);
        let mut data = vec![0x0B, 0xC8, 0x01];
        data.extend_from_slice(text.as_bytes());
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), text);
    }

    #[test]
    fn test_read_string_utf8() {
        let text = "Ünïcødé プレイヤー";
        let mut data = vec![0x0B, u8::try_from(text.len()).unwrap()];
        data.extend_from_slice(text.as_bytes());
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), text);
    }

    #[test]
    fn test_read_string_invalid_utf8_is_replaced() {
        let data = [0x0B, 0x03, b'a', 0xFF, b'b'];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn test_read_string_text_truncated() {
        let data = [0x0B, 0x05, b'a', b'b'];
        let mut cursor = Cursor::new(&data);
        let result = cursor.read_string();
        assert!(matches!(
            result,
            Err(ParserError::TruncatedInput {
                expected: 7,
                available: 4
            })
        ));
    }

    #[test]
    fn test_read_string_length_truncated() {
        let data = [0x0B, 0x80];
        let mut cursor = Cursor::new(&data);
        assert!(cursor.read_string().unwrap_err().is_truncated());
    }

    #[test]
    fn test_read_string_missing_marker() {
        let mut cursor = Cursor::new(&[]);
        assert!(cursor.read_string().unwrap_err().is_truncated());
    }
}
