//! Position-tracking cursor over a sentinel-terminated buffer.
//!
//! The cursor advances byte-by-byte while maintaining the 1-based
//! line/column of the current position; advancing over `\n` resets the
//! column to 1 and increments the line. EOF is the sentinel byte `0x00`
//! (wherever it appears — interior NULs terminate scanning too, by the
//! buffer contract).
//!
//! The cursor is [`Copy`], so the lexer can work on a local snapshot and
//! commit it back only once a token (or skipped unit) is complete.

use lucite_ir::{Name, SourceLocation};

/// Cursor over a sentinel-terminated byte buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
///
/// # Invariant
///
/// `buf` ends with at least three `0x00` bytes past `source_len`, so
/// `peek()` and `peek2()` are always in bounds.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: u32,
    source_len: u32,
    file: Name,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8], source_len: u32, file: Name) -> Self {
        debug_assert!(buf.len() >= source_len as usize + 3, "missing sentinel pad");
        debug_assert_eq!(buf[source_len as usize], 0, "sentinel byte must be 0x00");
        Cursor {
            buf,
            pos: 0,
            source_len,
            file,
            line: 1,
            column: 1,
        }
    }

    /// The byte at the current position; `0` at EOF.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// One byte of lookahead. Safe at any position.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf[self.pos as usize + 1]
    }

    /// Two bytes of lookahead. Safe at any position.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.buf[self.pos as usize + 2]
    }

    /// Whether the cursor sits on the end-of-file sentinel.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current() == 0
    }

    /// Advance one byte, maintaining line/column bookkeeping.
    #[inline]
    pub fn advance(&mut self) {
        if self.current() == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    /// Read the current byte and advance over it.
    #[inline]
    pub fn bump(&mut self) -> u8 {
        let c = self.current();
        self.advance();
        c
    }

    /// Byte offset of the current position.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Location of the current position.
    #[inline]
    pub fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.file, self.line, self.column)
    }

    /// Byte distance from `start` to this cursor; the token-length
    /// measure (cursor subtraction).
    #[inline]
    pub fn distance_from(&self, start: &Cursor<'_>) -> u32 {
        debug_assert!(self.pos >= start.pos);
        self.pos - start.pos
    }

    /// Source text between `start` and this cursor.
    ///
    /// Returns the empty string if the range is not valid UTF-8; token
    /// boundaries produced by the lexer are always ASCII, so this does
    /// not happen in practice.
    pub fn slice_from(&self, start: &Cursor<'a>) -> &'a str {
        let bytes = &self.buf[start.pos as usize..self.pos as usize];
        std::str::from_utf8(bytes).unwrap_or_default()
    }

    /// Skip ahead to the next `\n` or EOF without examining each byte.
    ///
    /// Used by the line-comment scanner. Correct only because the skipped
    /// region contains no newline: the column advances by the byte count.
    pub fn skip_to_newline_or_eof(&mut self) {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        // The comment body may contain an interior NUL, which is EOF by
        // the buffer contract; stop there as well.
        let newline = memchr::memchr(b'\n', remaining);
        let nul = memchr::memchr(0, remaining);
        let offset = match (newline, nul) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => remaining.len(),
        };
        self.pos += offset as u32;
        self.column += offset as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceBuffer;

    #[test]
    fn advancing_tracks_line_and_column() {
        let buf = SourceBuffer::new(Name::EMPTY, "ab\ncd");
        let mut cursor = buf.cursor();
        assert_eq!((cursor.loc().line, cursor.loc().column), (1, 1));
        cursor.advance(); // past 'a'
        assert_eq!((cursor.loc().line, cursor.loc().column), (1, 2));
        cursor.advance(); // past 'b'
        cursor.advance(); // past '\n'
        assert_eq!((cursor.loc().line, cursor.loc().column), (2, 1));
        cursor.advance(); // past 'c'
        assert_eq!((cursor.loc().line, cursor.loc().column), (2, 2));
    }

    #[test]
    fn bump_returns_then_advances() {
        let buf = SourceBuffer::new(Name::EMPTY, "xy");
        let mut cursor = buf.cursor();
        assert_eq!(cursor.bump(), b'x');
        assert_eq!(cursor.current(), b'y');
    }

    #[test]
    fn peek_is_safe_at_end() {
        let buf = SourceBuffer::new(Name::EMPTY, "a");
        let cursor = buf.cursor();
        assert_eq!(cursor.peek(), 0);
        assert_eq!(cursor.peek2(), 0);
    }

    #[test]
    fn copy_snapshots_are_independent() {
        let buf = SourceBuffer::new(Name::EMPTY, "hello");
        let mut cursor = buf.cursor();
        cursor.advance();
        let saved = cursor;
        cursor.advance();
        cursor.advance();
        assert_eq!(saved.pos(), 1);
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.distance_from(&saved), 2);
    }

    #[test]
    fn slice_recovers_text() {
        let buf = SourceBuffer::new(Name::EMPTY, "foo bar");
        let mut cursor = buf.cursor();
        let start = cursor;
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.slice_from(&start), "foo");
    }

    #[test]
    fn skip_to_newline_stops_at_newline() {
        let buf = SourceBuffer::new(Name::EMPTY, "// comment\nint");
        let mut cursor = buf.cursor();
        cursor.skip_to_newline_or_eof();
        assert_eq!(cursor.current(), b'\n');
        assert_eq!(cursor.loc().column, 11);
    }

    #[test]
    fn skip_to_newline_stops_at_eof() {
        let buf = SourceBuffer::new(Name::EMPTY, "// trailing");
        let mut cursor = buf.cursor();
        cursor.skip_to_newline_or_eof();
        assert!(cursor.is_eof());
    }

    #[test]
    fn interior_nul_reads_as_eof() {
        let buf = SourceBuffer::new(Name::EMPTY, "a\0b");
        let mut cursor = buf.cursor();
        cursor.advance();
        assert!(cursor.is_eof());
    }
}
