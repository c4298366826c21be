//! Fixed-width text fields.
//!
//! Every text field in a payload occupies a fixed number of bytes: UTF-8
//! text, then at least one NUL, zero padded to the width. Text that does not
//! fit is truncated on a character boundary rather than rejected.
//!
//! # Example
//!
//! ```
//! use console_link::codec::FixedText;
//! use bytes::BytesMut;
//!
//! let mut buf = BytesMut::new();
//! FixedText::put(&mut buf, "snake", 8);
//! assert_eq!(&buf[..], b"snake\0\0\0");
//!
//! let mut cursor = &buf[..];
//! assert_eq!(FixedText::get(&mut cursor, 8), "snake");
//! ```

use bytes::{Buf, BufMut};

/// Codec for NUL-padded fixed-width text.
pub struct FixedText;

impl FixedText {
    /// Longest prefix of `text` that fits in a field of `width` bytes,
    /// leaving room for the terminator.
    pub fn truncate(text: &str, width: usize) -> &str {
        let max = width.saturating_sub(1);
        if text.len() <= max {
            return text;
        }
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Write `text` as a field of exactly `width` bytes.
    pub fn put<B: BufMut>(buf: &mut B, text: &str, width: usize) {
        let text = Self::truncate(text, width);
        buf.put_slice(text.as_bytes());
        buf.put_bytes(0, width - text.len());
    }

    /// Read a field of exactly `width` bytes.
    ///
    /// Stops at the first NUL; invalid UTF-8 is replaced.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `width` bytes remain. Callers check the payload
    /// length first.
    pub fn get<B: Buf>(buf: &mut B, width: usize) -> String {
        let mut field = vec![0u8; width];
        buf.copy_to_slice(&mut field);
        let end = field.iter().position(|&b| b == 0).unwrap_or(width);
        String::from_utf8_lossy(&field[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_short_text_padded() {
        let mut buf = BytesMut::new();
        FixedText::put(&mut buf, "hi", 6);
        assert_eq!(&buf[..], b"hi\0\0\0\0");
    }

    #[test]
    fn test_long_text_truncated_with_terminator() {
        let mut buf = BytesMut::new();
        FixedText::put(&mut buf, "abcdefgh", 4);
        assert_eq!(&buf[..], b"abc\0");

        let mut cursor = &buf[..];
        assert_eq!(FixedText::get(&mut cursor, 4), "abc");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 'é' is two bytes; a 3-byte field leaves room for 2 bytes of text.
        assert_eq!(FixedText::truncate("aé", 3), "a");
        assert_eq!(FixedText::truncate("éa", 3), "é");
    }

    #[test]
    fn test_empty_text() {
        let mut buf = BytesMut::new();
        FixedText::put(&mut buf, "", 3);
        assert_eq!(&buf[..], b"\0\0\0");

        let mut cursor = &buf[..];
        assert_eq!(FixedText::get(&mut cursor, 3), "");
    }

    #[test]
    fn test_unterminated_field_reads_full_width() {
        let raw = b"full";
        let mut cursor = &raw[..];
        assert_eq!(FixedText::get(&mut cursor, 4), "full");
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let raw = [b'o', 0xFF, b'k', 0];
        let mut cursor = &raw[..];
        assert_eq!(FixedText::get(&mut cursor, 4), "o\u{FFFD}k");
    }
}
