//! Source locations.
//!
//! A [`SourceLocation`] names a point in a source file as the user sees it:
//! file, 1-based line, 1-based column. Locations are compared only for
//! diagnostics, never for program meaning.

use crate::Name;
use std::fmt;

/// A point in a source file: file name handle + 1-based line and column.
///
/// Immutable once produced by the lexer's cursor. The file name is an
/// interned [`Name`] so the location stays a small `Copy` value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourceLocation {
    pub file: Name,
    pub line: u32,
    pub column: u32,
}

/// Size assertion: a location is three u32s.
const _: () = assert!(std::mem::size_of::<SourceLocation>() == 12);

impl SourceLocation {
    /// Invalid location sentinel, used before a location is known.
    ///
    /// Line 0 never occurs in real locations (lines are 1-based).
    pub const NONE: SourceLocation = SourceLocation {
        file: Name::EMPTY,
        line: 0,
        column: 0,
    };

    /// Create a location. Lines and columns are 1-based.
    #[inline]
    pub const fn new(file: Name, line: u32, column: u32) -> Self {
        SourceLocation { file, line, column }
    }

    /// Whether this is a real location (not the [`NONE`](Self::NONE) sentinel).
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.line != 0
    }

    /// `line:N, col:M` form used by the AST dumper.
    pub fn to_position(self) -> String {
        format!("line:{}, col:{}", self.line, self.column)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_invalid() {
        assert!(!SourceLocation::NONE.is_valid());
        assert_eq!(SourceLocation::default(), SourceLocation::NONE);
    }

    #[test]
    fn real_location_is_valid() {
        let loc = SourceLocation::new(Name::EMPTY, 3, 7);
        assert!(loc.is_valid());
        assert_eq!(loc.to_string(), "3:7");
        assert_eq!(loc.to_position(), "line:3, col:7");
    }
}
