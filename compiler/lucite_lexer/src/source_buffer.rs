//! NUL-sentinel-terminated source buffer.
//!
//! The lexer scans a byte buffer terminated by an appended `0x00`
//! sentinel, which it treats as end of file; no separate bounds checks are
//! needed in the scanning loops. Two further zero bytes of padding make
//! one- and two-byte lookahead safe at any position.
//!
//! A NUL byte inside the source is indistinguishable from the sentinel by
//! design: the cursor contract says byte 0 is EOF wherever it appears.

use crate::Cursor;
use lucite_ir::Name;
use std::path::Path;
use thiserror::Error;

/// Zero bytes appended after the source: 1 sentinel + 2 lookahead pads.
const SENTINEL_PAD: usize = 3;

/// Failed to load a source file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open file: {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: source file larger than 4 GiB")]
    TooLarge { path: String },
}

/// A source buffer: the file's bytes plus the NUL sentinel and padding.
pub struct SourceBuffer {
    /// `[source..., 0x00, 0x00, 0x00]`
    buf: Vec<u8>,
    source_len: u32,
    /// Interned file name, carried into every `SourceLocation`.
    file: Name,
}

impl SourceBuffer {
    /// Build a buffer from in-memory source. `file` is the interned file
    /// name used for locations.
    pub fn new(file: Name, source: &str) -> Self {
        debug_assert!(source.len() < u32::MAX as usize, "source too large");
        let mut buf = Vec::with_capacity(source.len() + SENTINEL_PAD);
        buf.extend_from_slice(source.as_bytes());
        buf.extend_from_slice(&[0; SENTINEL_PAD]);
        SourceBuffer {
            buf,
            source_len: source.len() as u32,
            file,
        }
    }

    /// Read a file into a sentinel-terminated buffer.
    pub fn from_file(file: Name, path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if bytes.len() >= u32::MAX as usize {
            return Err(SourceError::TooLarge {
                path: path.display().to_string(),
            });
        }
        let source_len = bytes.len() as u32;
        let mut buf = bytes;
        buf.extend_from_slice(&[0; SENTINEL_PAD]);
        Ok(SourceBuffer {
            buf,
            source_len,
            file,
        })
    }

    /// A cursor positioned at byte 0, line 1, column 1.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source_len, self.file)
    }

    /// Length of the source content (excluding sentinel and padding).
    #[inline]
    pub fn len(&self) -> u32 {
        self.source_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }

    /// Interned file name.
    #[inline]
    pub fn file(&self) -> Name {
        self.file
    }

    /// Source bytes without sentinel or padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// Recover the spelling of a token from its byte offset and length.
    ///
    /// Returns the empty string if the range is not valid UTF-8 (cannot
    /// happen for ranges produced by the lexer, whose token boundaries are
    /// ASCII).
    pub fn text(&self, offset: u32, len: u32) -> &str {
        let start = offset as usize;
        let end = (offset + len).min(self.source_len) as usize;
        std::str::from_utf8(&self.buf[start..end]).unwrap_or_default()
    }
}
