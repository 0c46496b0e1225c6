//! Identifier table.
//!
//! Interns identifier spellings to [`Name`] handles and classifies each
//! spelling as a keyword or a plain identifier on first interning. One
//! table exists per translation unit and lives for the whole compilation;
//! it is not designed for concurrent mutation — a parallel driver must
//! give each translation unit its own table.

use crate::token::KEYWORDS;
use crate::{Name, TokenKind};
use rustc_hash::FxHashMap;
use std::cell::Cell;

/// Per-spelling identifier data, allocated once and never freed.
pub struct IdentifierInfo {
    name: &'static str,
    token_kind: TokenKind,
    /// Extension slot for later symbol binding. Opaque to the front end
    /// core; zero means unbound.
    ext: Cell<u32>,
}

impl IdentifierInfo {
    /// The interned spelling.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `TokenKind::Identifier` for plain identifiers, or the keyword kind
    /// the spelling matched at interning time.
    #[inline]
    pub fn token_kind(&self) -> TokenKind {
        self.token_kind
    }

    /// Read the opaque binding slot.
    #[inline]
    pub fn ext(&self) -> u32 {
        self.ext.get()
    }

    /// Store into the opaque binding slot.
    #[inline]
    pub fn set_ext(&self, value: u32) {
        self.ext.set(value);
    }
}

/// Interns identifier spellings, classifying keywords on first sight.
///
/// Spellings are leaked to `'static` so [`IdentifierInfo::name`] can hand
/// out references without lifetime plumbing; the table is process-lifetime
/// state and is never torn down.
pub struct IdentifierTable {
    map: FxHashMap<&'static str, Name>,
    infos: Vec<IdentifierInfo>,
}

impl IdentifierTable {
    /// Create a table with the empty string at index 0 and every C99
    /// keyword pre-interned with its token kind.
    pub fn new() -> Self {
        let mut table = IdentifierTable {
            map: FxHashMap::default(),
            infos: Vec::with_capacity(64),
        };
        table.insert("", TokenKind::Identifier);
        for &(spelling, kind) in KEYWORDS {
            table.insert(spelling, kind);
        }
        table
    }

    fn insert(&mut self, spelling: &str, kind: TokenKind) -> Name {
        let leaked: &'static str = Box::leak(spelling.to_owned().into_boxed_str());
        let name = Name::from_raw(self.infos.len() as u32);
        self.infos.push(IdentifierInfo {
            name: leaked,
            token_kind: kind,
            ext: Cell::new(0),
        });
        self.map.insert(leaked, name);
        name
    }

    /// Intern a spelling, returning the same handle for equal spellings.
    ///
    /// First interning classifies the spelling: keyword spellings were
    /// pre-interned with their kinds, so anything new here is a plain
    /// identifier.
    pub fn intern(&mut self, spelling: &str) -> Name {
        if let Some(&name) = self.map.get(spelling) {
            return name;
        }
        self.insert(spelling, TokenKind::Identifier)
    }

    /// Identifier data for a handle.
    #[inline]
    pub fn info(&self, name: Name) -> &IdentifierInfo {
        &self.infos[name.index()]
    }

    /// The spelling for a handle.
    #[inline]
    pub fn spelling(&self, name: Name) -> &'static str {
        self.infos[name.index()].name
    }

    /// Number of interned spellings (including the pre-interned set).
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        // The empty string and keywords are always present.
        false
    }
}

impl Default for IdentifierTable {
    fn default() -> Self {
        Self::new()
    }
}
