//! Declaration-specifier and declarator accumulators.
//!
//! [`DeclSpec`] is the mutable accumulator the parser fills while
//! scanning a declaration-specifier run left to right. Each `set_*`
//! method enforces mutual exclusivity within its specifier category and
//! reports conflicts without stopping the scan — it returns `true` on
//! failure and the parser still advances past the offending token.
//! [`DeclSpec::finish`] then applies the standard elision rules
//! (`unsigned` → `unsigned int`, `short` → `short int`, …) so the spec is
//! self-consistent even after errors.
//!
//! [`Declarator`] accumulates the shape around a name — pointer, array
//! and function chunks — together with the context that decides whether a
//! name is required, optional, or forbidden.

use lucite_diagnostic::DiagnosticEngine;
use lucite_ir::{Expr, Name, QualType, Qualifiers, SourceLocation, StorageClass, TypeId};

/// Width specifier: `short`, `long`, `long long`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TypeSpecWidth {
    #[default]
    Unspecified,
    Short,
    Long,
    LongLong,
}

/// Sign specifier: `signed` / `unsigned`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TypeSpecSign {
    #[default]
    Unspecified,
    Signed,
    Unsigned,
}

/// Core type specifier.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TypeSpecType {
    #[default]
    Unspecified,
    Void,
    Char,
    Int,
    Float,
    Double,
    Bool,
    Enum,
    Union,
    Struct,
    /// A typedef name.
    Typename,
    /// Erroneous type; consumers must not derive a type from it.
    Error,
}

/// The resolved representation behind a `Struct`/`Union`/`Enum`/
/// `Typename` type specifier.
#[derive(Copy, Clone, Debug)]
pub enum TypeRep {
    /// A typedef name's aliased type.
    Alias(QualType),
    /// A record or enum type in the arena.
    Tag(TypeId),
}

/// Which flavors of specifiers a [`DeclSpec`] accumulated.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ParsedSpecifiers(u8);

impl ParsedSpecifiers {
    pub const NONE: ParsedSpecifiers = ParsedSpecifiers(0);
    pub const STORAGE_CLASS: u8 = 1;
    pub const TYPE_SPECIFIER: u8 = 2;
    pub const TYPE_QUALIFIER: u8 = 4;
    pub const FUNCTION_SPECIFIER: u8 = 8;

    #[inline]
    pub fn contains(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Accumulator for one declaration-specifier run.
#[derive(Debug, Default)]
pub struct DeclSpec {
    pub storage_class: StorageClass,
    pub type_spec_width: TypeSpecWidth,
    pub type_spec_sign: TypeSpecSign,
    pub type_spec_type: TypeSpecType,
    pub type_qualifiers: Qualifiers,
    pub inline_specified: bool,
    /// For `Typename`/`Struct`/`Union`/`Enum`, the type it resolved to.
    pub type_rep: Option<TypeRep>,

    pub storage_class_loc: SourceLocation,
    pub tsw_loc: SourceLocation,
    pub tss_loc: SourceLocation,
    pub tst_loc: SourceLocation,
    pub tq_const_loc: SourceLocation,
    pub tq_restrict_loc: SourceLocation,
    pub tq_volatile_loc: SourceLocation,
    pub inline_loc: SourceLocation,
}

impl DeclSpec {
    pub fn new() -> Self {
        DeclSpec::default()
    }

    /// Whether any type specifier (core, width, or sign) was seen.
    pub fn has_type_specifier(&self) -> bool {
        self.type_spec_type != TypeSpecType::Unspecified
            || self.type_spec_width != TypeSpecWidth::Unspecified
            || self.type_spec_sign != TypeSpecSign::Unspecified
    }

    /// Bitmask of which specifier flavors were parsed.
    pub fn parsed_specifiers(&self) -> ParsedSpecifiers {
        let mut mask = 0;
        if self.storage_class != StorageClass::Unspecified {
            mask |= ParsedSpecifiers::STORAGE_CLASS;
        }
        if !self.type_qualifiers.is_empty() {
            mask |= ParsedSpecifiers::TYPE_QUALIFIER;
        }
        if self.has_type_specifier() {
            mask |= ParsedSpecifiers::TYPE_SPECIFIER;
        }
        if self.inline_specified {
            mask |= ParsedSpecifiers::FUNCTION_SPECIFIER;
        }
        ParsedSpecifiers(mask)
    }

    /// True if no specifier tokens were parsed at all.
    pub fn is_empty(&self) -> bool {
        self.parsed_specifiers().is_none()
    }

    // The set_* methods return `true` if the specifier could not be
    // applied; the caller consumes the token either way.

    pub fn set_storage_class(
        &mut self,
        sc: StorageClass,
        loc: SourceLocation,
        diag: &DiagnosticEngine,
    ) -> bool {
        if self.storage_class != StorageClass::Unspecified {
            diag.error(loc, "invalid declaration specifier combination");
            return true;
        }
        self.storage_class = sc;
        self.storage_class_loc = loc;
        false
    }

    pub fn set_type_spec_width(
        &mut self,
        width: TypeSpecWidth,
        loc: SourceLocation,
        diag: &DiagnosticEngine,
    ) -> bool {
        // Only long -> long long may upgrade an already-set width.
        if self.type_spec_width != TypeSpecWidth::Unspecified
            && (width != TypeSpecWidth::LongLong || self.type_spec_width != TypeSpecWidth::Long)
        {
            diag.error(loc, "invalid declaration specifier combination");
            return true;
        }
        self.type_spec_width = width;
        self.tsw_loc = loc;
        false
    }

    pub fn set_type_spec_sign(
        &mut self,
        sign: TypeSpecSign,
        loc: SourceLocation,
        diag: &DiagnosticEngine,
    ) -> bool {
        if self.type_spec_sign != TypeSpecSign::Unspecified {
            diag.error(loc, "invalid declaration specifier combination");
            return true;
        }
        self.type_spec_sign = sign;
        self.tss_loc = loc;
        false
    }

    pub fn set_type_spec_type(
        &mut self,
        tst: TypeSpecType,
        loc: SourceLocation,
        rep: Option<TypeRep>,
        diag: &DiagnosticEngine,
    ) -> bool {
        if self.type_spec_type != TypeSpecType::Unspecified {
            diag.error(loc, "invalid declaration specifier combination");
            return true;
        }
        self.type_spec_type = tst;
        self.type_rep = rep;
        self.tst_loc = loc;
        false
    }

    /// Force the erroneous-type state after an unrecoverable specifier
    /// problem.
    pub fn set_type_spec_error(&mut self) {
        self.type_spec_type = TypeSpecType::Error;
        self.type_rep = None;
        self.tst_loc = SourceLocation::NONE;
    }

    pub fn set_type_qual(
        &mut self,
        qual: Qualifiers,
        loc: SourceLocation,
        diag: &DiagnosticEngine,
    ) -> bool {
        if self.type_qualifiers.intersects(qual) {
            diag.error(loc, "duplicate declaration specifier");
            return true;
        }
        self.type_qualifiers |= qual;
        if qual.contains(Qualifiers::CONST) {
            self.tq_const_loc = loc;
        } else if qual.contains(Qualifiers::RESTRICT) {
            self.tq_restrict_loc = loc;
        } else if qual.contains(Qualifiers::VOLATILE) {
            self.tq_volatile_loc = loc;
        } else {
            debug_assert!(false, "unknown type qualifier");
        }
        false
    }

    pub fn set_inline(&mut self, loc: SourceLocation, diag: &DiagnosticEngine) -> bool {
        if self.inline_specified {
            diag.warning(loc, "duplicate 'inline' declaration specifier");
        }
        self.inline_specified = true;
        self.inline_loc = loc;
        false
    }

    pub fn clear_storage_class(&mut self) {
        self.storage_class = StorageClass::Unspecified;
        self.storage_class_loc = SourceLocation::NONE;
    }

    pub fn clear_function_specs(&mut self) {
        self.inline_specified = false;
        self.inline_loc = SourceLocation::NONE;
    }

    /// Final analysis and elision rules. After this, the spec is
    /// self-consistent even if errors were reported; re-running on an
    /// already-finished, error-free spec changes nothing.
    pub fn finish(&mut self, diag: &DiagnosticEngine) {
        // signed/unsigned are only valid with int or char.
        if self.type_spec_sign != TypeSpecSign::Unspecified {
            if self.type_spec_type == TypeSpecType::Unspecified {
                // signed -> signed int, unsigned -> unsigned int.
                self.type_spec_type = TypeSpecType::Int;
            } else if self.type_spec_type != TypeSpecType::Int
                && self.type_spec_type != TypeSpecType::Char
            {
                diag.error(self.tss_loc, "invalid sign specifier");
                // signed float -> float.
                self.type_spec_sign = TypeSpecSign::Unspecified;
            }
        }

        // Validate the width of the type.
        match self.type_spec_width {
            TypeSpecWidth::Unspecified => {}
            TypeSpecWidth::Short | TypeSpecWidth::LongLong => {
                if self.type_spec_type == TypeSpecType::Unspecified {
                    // short -> short int, long long -> long long int.
                    self.type_spec_type = TypeSpecType::Int;
                } else if self.type_spec_type != TypeSpecType::Int {
                    diag.error(
                        self.tsw_loc,
                        if self.type_spec_width == TypeSpecWidth::Short {
                            "invalid short specifier"
                        } else {
                            "invalid long long specifier"
                        },
                    );
                    self.type_spec_type = TypeSpecType::Int;
                }
            }
            TypeSpecWidth::Long => {
                // long double and long int are fine.
                if self.type_spec_type == TypeSpecType::Unspecified {
                    self.type_spec_type = TypeSpecType::Int;
                } else if self.type_spec_type != TypeSpecType::Int
                    && self.type_spec_type != TypeSpecType::Double
                {
                    diag.error(self.tsw_loc, "invalid long specifier");
                    self.type_spec_type = TypeSpecType::Int;
                }
            }
        }
    }

    /// Whether this spec may legally stand without a declarator: only
    /// tag declarations (`struct foo;`) can, and never with `typedef`.
    pub fn is_missing_declarator_ok(&self) -> bool {
        matches!(
            self.type_spec_type,
            TypeSpecType::Struct | TypeSpecType::Union | TypeSpecType::Enum
        ) && self.storage_class != StorageClass::Typedef
    }
}

/// One named parameter inside a function declarator chunk.
#[derive(Debug)]
pub struct ParamInfo {
    pub name: Name,
    pub loc: SourceLocation,
    pub ty: QualType,
}

/// One layer of declarator shape, pushed while parsing.
///
/// The chunk list ends up in outer-to-inner order with respect to the
/// derived type: for `int *p[4]`, the array chunk (p *is* an array)
/// precedes the pointer chunk, so the type builder applies the list in
/// reverse, innermost constructor first.
#[derive(Debug)]
pub enum DeclaratorChunk {
    Pointer {
        quals: Qualifiers,
        loc: SourceLocation,
    },
    Array {
        quals: Qualifiers,
        /// `[static N]` (function parameters only).
        has_static: bool,
        /// `[*]`: a VLA of unspecified size; `size` is `None`.
        is_star: bool,
        /// The size expression, or `None` for `[]` and `[*]`.
        size: Option<Box<Expr>>,
        loc: SourceLocation,
    },
    Function {
        /// True if at least one typed parameter was written.
        has_prototype: bool,
        /// Prototype ends with `, ...`.
        variadic: bool,
        params: Vec<ParamInfo>,
        loc: SourceLocation,
    },
}

/// Where a declarator appears; decides whether a name is required,
/// optional, or forbidden.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DeclaratorContext {
    /// File-scope declaration.
    File,
    /// Within a function prototype.
    Prototype,
    /// Abstract declarator for a type name.
    TypeName,
    /// Struct/union field.
    Member,
    /// Declaration inside a block.
    Block,
    /// First clause of a `for`.
    ForInit,
}

/// Whether the declarator named anything.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DeclaratorKind {
    /// No identifier (abstract declarator).
    Abstract,
    /// Has an identifier.
    Normal,
}

/// Accumulated declarator: the shape layers around an (optional) name.
#[derive(Debug)]
pub struct Declarator {
    pub context: DeclaratorContext,
    pub kind: DeclaratorKind,
    pub name: Name,
    pub name_loc: SourceLocation,
    pub chunks: Vec<DeclaratorChunk>,
    /// Set when the declarator or its spec was malformed; consumers must
    /// check before deriving a type.
    pub invalid: bool,
    /// Set when the declarator was written inside grouping parentheses.
    pub grouping_parens: bool,
}

impl Declarator {
    /// Start a declarator for `context`; `invalid` is seeded from the
    /// spec's error state.
    pub fn new(ds: &DeclSpec, context: DeclaratorContext) -> Self {
        Declarator {
            context,
            kind: DeclaratorKind::Abstract,
            name: Name::EMPTY,
            name_loc: SourceLocation::NONE,
            chunks: Vec::new(),
            invalid: ds.type_spec_type == TypeSpecType::Error,
            grouping_parens: false,
        }
    }

    /// May the identifier be omitted? True for type names and
    /// prototypes.
    pub fn may_omit_identifier(&self) -> bool {
        matches!(
            self.context,
            DeclaratorContext::TypeName | DeclaratorContext::Prototype
        )
    }

    /// May an identifier appear at all? False only for type names.
    pub fn may_have_identifier(&self) -> bool {
        self.context != DeclaratorContext::TypeName
    }

    /// Have we parsed past the point where a name would appear? (True
    /// even when the context did not require one.)
    pub fn is_past_identifier(&self) -> bool {
        self.name_loc.is_valid()
    }

    pub fn has_name(&self) -> bool {
        self.kind != DeclaratorKind::Abstract
    }

    /// Record the name position; an empty name marks an abstract
    /// declarator.
    pub fn set_identifier(&mut self, name: Name, loc: SourceLocation) {
        self.name = name;
        self.name_loc = loc;
        self.kind = if name == Name::EMPTY {
            DeclaratorKind::Abstract
        } else {
            DeclaratorKind::Normal
        };
    }
}

/// A struct-declarator: a declarator with an optional bit-field width.
#[derive(Debug)]
pub struct FieldDeclarator {
    pub d: Declarator,
    pub bit_width: Option<Box<Expr>>,
}

impl FieldDeclarator {
    pub fn new(ds: &DeclSpec) -> Self {
        FieldDeclarator {
            d: Declarator::new(ds, DeclaratorContext::Member),
            bit_width: None,
        }
    }
}
