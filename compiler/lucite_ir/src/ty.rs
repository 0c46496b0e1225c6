//! The C type model.
//!
//! Types live in an arena owned by the type context (`lucite_types`) and
//! are addressed by [`TypeId`]. A [`QualType`] pairs a `TypeId` with a
//! const/restrict/volatile bit-set; two `QualType`s are equal iff handle
//! and qualifier bits match. The arena does no uniquing: constructing a
//! second `int *` yields a new `TypeId`, but canonical-type identity (the
//! `canon` field) is still id-based equality, as required for structural
//! type checks.
//!
//! # Canonical types
//!
//! Every arena entry records the [`TypeId`] reached by stripping all
//! typedefs. A type is its own canonical type iff it is directly one of
//! the non-typedef variants.

use crate::ast::{Expr, FieldDecl};
use crate::Name;
use bitflags::bitflags;
use std::fmt;

/// Index of a type in the type arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Sentinel for "no type". [`QualType::NULL`] carries it.
    pub const INVALID: TypeId = TypeId(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "TypeId(invalid)")
        } else {
            write!(f, "TypeId({})", self.0)
        }
    }
}

bitflags! {
    /// Type qualifier bit-set [C99 6.7.3].
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Qualifiers: u8 {
        const CONST = 1 << 0;
        const RESTRICT = 1 << 1;
        const VOLATILE = 1 << 2;
    }
}

/// A (possibly) qualified type: a type handle plus qualifier bits.
///
/// `QualType` never owns the type it references. The null value stands in
/// for "no type yet / type checking failed"; callers of the semantic
/// analyzer must check for it before deriving anything from the type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualType {
    pub ty: TypeId,
    pub quals: Qualifiers,
}

/// Size assertion: QualType stays a register-sized value.
const _: () = assert!(std::mem::size_of::<QualType>() <= 8);

impl QualType {
    /// The null type: no handle, no qualifiers.
    pub const NULL: QualType = QualType {
        ty: TypeId::INVALID,
        quals: Qualifiers::empty(),
    };

    /// Unqualified reference to `ty`.
    #[inline]
    pub const fn new(ty: TypeId) -> Self {
        QualType {
            ty,
            quals: Qualifiers::empty(),
        }
    }

    /// Qualified reference to `ty`.
    #[inline]
    pub const fn with_quals(ty: TypeId, quals: Qualifiers) -> Self {
        QualType { ty, quals }
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.ty.is_invalid()
    }

    /// The same type with all qualifiers dropped.
    #[inline]
    pub const fn unqualified(self) -> Self {
        QualType::new(self.ty)
    }

    #[inline]
    pub fn has_qualifiers(self) -> bool {
        !self.quals.is_empty()
    }

    #[inline]
    pub fn is_const_qualified(self) -> bool {
        self.quals.contains(Qualifiers::CONST)
    }

    #[inline]
    pub fn is_restrict_qualified(self) -> bool {
        self.quals.contains(Qualifiers::RESTRICT)
    }

    #[inline]
    pub fn is_volatile_qualified(self) -> bool {
        self.quals.contains(Qualifiers::VOLATILE)
    }
}

/// The 18 ranked arithmetic kinds, `_Bool` through `long double`.
///
/// Layout groups kinds so the classification predicates are range checks:
/// unsigned integers first (`Bool..=ULongLong`), then signed integers
/// (`CharS..=LongLong`), then floating kinds (`Float..=LongDouble`).
/// Plain `char` appears twice (`CharU`/`CharS`) because its signedness is
/// target-chosen; likewise `wchar_t`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ArithKind {
    Bool,
    CharU,
    UChar,
    WCharU,
    UShort,
    UInt,
    ULong,
    ULongLong,
    CharS,
    SChar,
    WCharS,
    Short,
    Int,
    Long,
    LongLong,
    Float,
    Double,
    LongDouble,
}

impl ArithKind {
    #[inline]
    pub fn is_signed_integer(self) -> bool {
        (ArithKind::CharS..=ArithKind::LongLong).contains(&self)
    }

    #[inline]
    pub fn is_unsigned_integer(self) -> bool {
        (ArithKind::Bool..=ArithKind::ULongLong).contains(&self)
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    #[inline]
    pub fn is_floating(self) -> bool {
        (ArithKind::Float..=ArithKind::LongDouble).contains(&self)
    }

    /// C spelling of the kind.
    pub fn spelling(self) -> &'static str {
        match self {
            ArithKind::Bool => "_Bool",
            ArithKind::CharU | ArithKind::CharS => "char",
            ArithKind::UChar => "unsigned char",
            ArithKind::WCharU | ArithKind::WCharS => "wchar_t",
            ArithKind::UShort => "unsigned short",
            ArithKind::UInt => "unsigned int",
            ArithKind::ULong => "unsigned long",
            ArithKind::ULongLong => "unsigned long long",
            ArithKind::SChar => "signed char",
            ArithKind::Short => "short",
            ArithKind::Int => "int",
            ArithKind::Long => "long",
            ArithKind::LongLong => "long long",
            ArithKind::Float => "float",
            ArithKind::Double => "double",
            ArithKind::LongDouble => "long double",
        }
    }
}

/// Struct or union.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RecordKind {
    Struct,
    Union,
}

impl RecordKind {
    pub fn spelling(self) -> &'static str {
        match self {
            RecordKind::Struct => "struct",
            RecordKind::Union => "union",
        }
    }
}

/// Pointer type: owns its pointee reference.
///
/// Completeness of a pointer is independent of the pointee's definition
/// status.
#[derive(Debug)]
pub struct PointerType {
    pub pointee: QualType,
}

/// Array size classification.
#[derive(Debug)]
pub enum ArrayKind {
    /// `T a[N]` with a known constant element count.
    Constant(u64),
    /// Variable-length array (`T a[n]` / `T a[*]`).
    Variable,
}

/// Array type: element type, constant-or-variable size, and the size
/// expression as written (absent for `[]` and for string-literal types).
#[derive(Debug)]
pub struct ArrayType {
    pub elem: QualType,
    pub kind: ArrayKind,
    pub size_expr: Option<Box<Expr>>,
}

/// Function prototype: return type, parameter types, variadic flag.
/// Old-style unprototyped functions are not represented.
#[derive(Debug)]
pub struct FunctionType {
    pub ret: QualType,
    pub params: Vec<QualType>,
    pub variadic: bool,
}

/// Struct or union type, owning its ordered field declarations.
///
/// `complete` distinguishes a defined record from a forward reference
/// (`struct foo;` / `struct foo *p;` before the definition).
#[derive(Debug)]
pub struct RecordType {
    pub kind: RecordKind,
    /// Tag name; `Name::EMPTY` for anonymous records.
    pub name: Name,
    pub fields: Vec<FieldDecl>,
    pub complete: bool,
}

/// One `name [= value]` enumerator inside an enum definition.
#[derive(Debug)]
pub struct Enumerator {
    pub name: Name,
    pub loc: crate::SourceLocation,
    /// The initializer expression as written, if any.
    pub value: Option<Box<Expr>>,
}

/// Enumeration type. The underlying integer type is fixed to `int`:
/// ISO C99 has no fixed-underlying-type declarations.
#[derive(Debug)]
pub struct EnumType {
    pub name: Name,
    pub underlying: QualType,
    pub enumerators: Vec<Enumerator>,
}

/// A typedef alias. Its canonical type is the aliased type's canonical.
#[derive(Debug)]
pub struct TypedefType {
    pub name: Name,
    pub aliased: QualType,
}

/// Closed set of type variants.
#[derive(Debug)]
pub enum TypeKind {
    Void,
    Arith(ArithKind),
    Pointer(PointerType),
    Array(ArrayType),
    Function(FunctionType),
    Record(RecordType),
    Enum(EnumType),
    Typedef(TypedefType),
}

/// One arena-allocated type with its canonical-type handle.
#[derive(Debug)]
pub struct Type {
    pub kind: TypeKind,
    /// The type reached by stripping all typedefs. Self-referential for
    /// every non-typedef variant.
    pub canon: TypeId,
}

impl Type {
    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    /// Arithmetic per [C99 6.2.5p18]: real arithmetic kinds and enums
    /// (whose underlying type is `int`).
    #[inline]
    pub fn is_arithmetic(&self) -> bool {
        matches!(self.kind, TypeKind::Arith(_) | TypeKind::Enum(_))
    }

    #[inline]
    pub fn is_signed_integer(&self) -> bool {
        match &self.kind {
            TypeKind::Arith(kind) => kind.is_signed_integer(),
            // Underlying type of enum is int in this implementation.
            TypeKind::Enum(_) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(&self.kind, TypeKind::Arith(kind) if kind.is_unsigned_integer())
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        matches!(&self.kind, TypeKind::Arith(kind) if kind.is_floating())
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    /// The arithmetic kind, if this is directly an arithmetic type.
    #[inline]
    pub fn as_arith(&self) -> Option<ArithKind> {
        match self.kind {
            TypeKind::Arith(kind) => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qual_type_equality_is_handle_plus_quals() {
        let a = QualType::new(TypeId::from_raw(1));
        let b = QualType::new(TypeId::from_raw(1));
        let c = QualType::with_quals(TypeId::from_raw(1), Qualifiers::CONST);
        let d = QualType::new(TypeId::from_raw(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(c.unqualified(), a);
    }

    #[test]
    fn null_qual_type() {
        assert!(QualType::NULL.is_null());
        assert!(!QualType::new(TypeId::from_raw(0)).is_null());
        assert!(!QualType::NULL.has_qualifiers());
    }

    #[test]
    fn arith_kind_ranges_partition() {
        use ArithKind::*;
        let all = [
            Bool, CharU, UChar, WCharU, UShort, UInt, ULong, ULongLong, CharS, SChar, WCharS,
            Short, Int, Long, LongLong, Float, Double, LongDouble,
        ];
        assert_eq!(all.len(), 18);
        for kind in all {
            let classes = [
                kind.is_unsigned_integer(),
                kind.is_signed_integer(),
                kind.is_floating(),
            ];
            assert_eq!(
                classes.iter().filter(|&&c| c).count(),
                1,
                "{kind:?} must be in exactly one class"
            );
        }
        assert!(Bool.is_unsigned_integer());
        assert!(CharS.is_signed_integer());
        assert!(LongDouble.is_floating());
        assert!(Int.is_integer() && !Int.is_floating());
    }

    #[test]
    fn qualifier_bits_are_independent() {
        let q = Qualifiers::CONST | Qualifiers::VOLATILE;
        let qt = QualType::with_quals(TypeId::from_raw(0), q);
        assert!(qt.is_const_qualified());
        assert!(qt.is_volatile_qualified());
        assert!(!qt.is_restrict_qualified());
    }
}
