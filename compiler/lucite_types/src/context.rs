//! The per-translation-unit type context.

use lucite_ir::{
    ArithKind, ArrayKind, ArrayType, EnumType, Enumerator, Expr, FieldDecl, FunctionType, Name,
    PointerType, QualType, RecordKind, RecordType, Type, TypeId, TypeKind, TypedefType,
};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Bit width of an arithmetic kind on the LP64 target this front end
/// assumes: 32-bit `int`, 64-bit `long` and pointers.
pub const fn arith_bit_width(kind: ArithKind) -> u64 {
    match kind {
        ArithKind::Bool => 8,
        ArithKind::CharU | ArithKind::CharS | ArithKind::SChar | ArithKind::UChar => 8,
        ArithKind::Short | ArithKind::UShort => 16,
        ArithKind::WCharU | ArithKind::WCharS | ArithKind::Int | ArithKind::UInt => 32,
        ArithKind::Long | ArithKind::ULong | ArithKind::LongLong | ArithKind::ULongLong => 64,
        ArithKind::Float => 32,
        ArithKind::Double => 64,
        ArithKind::LongDouble => 128,
    }
}

/// Pointer width in bits (LP64).
const POINTER_WIDTH: u64 = 64;

/// `type_size` could not produce an answer.
///
/// Aggregate and function sizing needs layout rules (alignment, padding,
/// bit-field packing) that are outside this front end's scope; asking for
/// such a size is answered explicitly rather than silently wrong.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeSizeError {
    #[error("cannot compute size of {0} type")]
    Unsupported(&'static str),
}

/// Builtin types, created once per context.
///
/// The plain `char` type uses the signed flavor; `wchar_t` likewise.
pub struct BuiltinTypes {
    pub void_ty: QualType,
    pub bool_ty: QualType,
    pub char_ty: QualType,
    pub signed_char_ty: QualType,
    pub wchar_ty: QualType,
    pub short_ty: QualType,
    pub int_ty: QualType,
    pub long_ty: QualType,
    pub long_long_ty: QualType,
    pub unsigned_char_ty: QualType,
    pub unsigned_short_ty: QualType,
    pub unsigned_int_ty: QualType,
    pub unsigned_long_ty: QualType,
    pub unsigned_long_long_ty: QualType,
    pub float_ty: QualType,
    pub double_ty: QualType,
    pub long_double_ty: QualType,
}

/// Owns every [`Type`] of one translation unit and answers the
/// arithmetic-type queries.
///
/// Construction is not uniqued: building `int *` twice yields two
/// `TypeId`s. Canonical-type identity (the `canon` handle each entry
/// carries) is what structural checks compare.
pub struct TypeContext {
    types: Vec<Type>,
    pub builtins: BuiltinTypes,
    size_cache: FxHashMap<TypeId, u64>,
}

impl TypeContext {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(64);
        let mut alloc = |kind: TypeKind| {
            let id = TypeId::from_raw(types.len() as u32);
            types.push(Type { kind, canon: id });
            QualType::new(id)
        };

        let builtins = BuiltinTypes {
            void_ty: alloc(TypeKind::Void),
            bool_ty: alloc(TypeKind::Arith(ArithKind::Bool)),
            char_ty: alloc(TypeKind::Arith(ArithKind::CharS)),
            signed_char_ty: alloc(TypeKind::Arith(ArithKind::SChar)),
            wchar_ty: alloc(TypeKind::Arith(ArithKind::WCharS)),
            short_ty: alloc(TypeKind::Arith(ArithKind::Short)),
            int_ty: alloc(TypeKind::Arith(ArithKind::Int)),
            long_ty: alloc(TypeKind::Arith(ArithKind::Long)),
            long_long_ty: alloc(TypeKind::Arith(ArithKind::LongLong)),
            unsigned_char_ty: alloc(TypeKind::Arith(ArithKind::UChar)),
            unsigned_short_ty: alloc(TypeKind::Arith(ArithKind::UShort)),
            unsigned_int_ty: alloc(TypeKind::Arith(ArithKind::UInt)),
            unsigned_long_ty: alloc(TypeKind::Arith(ArithKind::ULong)),
            unsigned_long_long_ty: alloc(TypeKind::Arith(ArithKind::ULongLong)),
            float_ty: alloc(TypeKind::Arith(ArithKind::Float)),
            double_ty: alloc(TypeKind::Arith(ArithKind::Double)),
            long_double_ty: alloc(TypeKind::Arith(ArithKind::LongDouble)),
        };

        TypeContext {
            types,
            builtins,
            size_cache: FxHashMap::default(),
        }
    }

    fn alloc(&mut self, kind: TypeKind, canon: Option<TypeId>) -> TypeId {
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(Type {
            kind,
            canon: canon.unwrap_or(id),
        });
        id
    }

    /// The type for a handle.
    #[inline]
    pub fn ty(&self, id: TypeId) -> &Type {
        debug_assert!(!id.is_invalid(), "dereferencing the invalid TypeId");
        &self.types[id.index()]
    }

    /// Strip typedefs (accumulating their qualifiers) down to the
    /// canonical type.
    pub fn canonical(&self, qt: QualType) -> QualType {
        let mut quals = qt.quals;
        let mut id = qt.ty;
        loop {
            match &self.ty(id).kind {
                TypeKind::Typedef(td) => {
                    quals |= td.aliased.quals;
                    id = td.aliased.ty;
                }
                _ => break,
            }
        }
        QualType::with_quals(self.ty(id).canon, quals)
    }

    /// A type is canonical-and-unqualified iff its canonical handle is
    /// itself and it carries no qualifiers. Several rank/promotion
    /// algorithms assert this before inspecting the arithmetic kind.
    pub fn is_canonical_unqualified(&self, qt: QualType) -> bool {
        !qt.is_null() && self.ty(qt.ty).canon == qt.ty && !qt.has_qualifiers()
    }

    // === Type construction ===

    /// Build a pointer type. The canonical type is a pointer to the
    /// canonical pointee (allocated alongside when the pointee is
    /// sugared).
    pub fn pointer_type(&mut self, pointee: QualType) -> QualType {
        let canon_pointee = self.canonical(pointee);
        let canon = if canon_pointee == pointee {
            None
        } else {
            Some(self.alloc(
                TypeKind::Pointer(PointerType {
                    pointee: canon_pointee,
                }),
                None,
            ))
        };
        QualType::new(self.alloc(TypeKind::Pointer(PointerType { pointee }), canon))
    }

    /// Build a constant-size array type.
    pub fn constant_array_type(
        &mut self,
        elem: QualType,
        size: u64,
        size_expr: Option<Box<Expr>>,
    ) -> QualType {
        let canon_elem = self.canonical(elem);
        let canon = if canon_elem == elem && size_expr.is_none() {
            None
        } else {
            Some(self.alloc(
                TypeKind::Array(ArrayType {
                    elem: canon_elem,
                    kind: ArrayKind::Constant(size),
                    size_expr: None,
                }),
                None,
            ))
        };
        QualType::new(self.alloc(
            TypeKind::Array(ArrayType {
                elem,
                kind: ArrayKind::Constant(size),
                size_expr,
            }),
            canon,
        ))
    }

    /// Build a variable-length array type.
    pub fn variable_array_type(&mut self, elem: QualType, size_expr: Option<Box<Expr>>) -> QualType {
        let canon_elem = self.canonical(elem);
        let canon = if canon_elem == elem && size_expr.is_none() {
            None
        } else {
            Some(self.alloc(
                TypeKind::Array(ArrayType {
                    elem: canon_elem,
                    kind: ArrayKind::Variable,
                    size_expr: None,
                }),
                None,
            ))
        };
        QualType::new(self.alloc(
            TypeKind::Array(ArrayType {
                elem,
                kind: ArrayKind::Variable,
                size_expr,
            }),
            canon,
        ))
    }

    /// Build a function type from its return and parameter types.
    pub fn function_type(
        &mut self,
        ret: QualType,
        params: Vec<QualType>,
        variadic: bool,
    ) -> QualType {
        let canon_ret = self.canonical(ret);
        let canon_params: Vec<QualType> = params.iter().map(|&p| self.canonical(p)).collect();
        let canon = if canon_ret == ret && canon_params == params {
            None
        } else {
            Some(self.alloc(
                TypeKind::Function(FunctionType {
                    ret: canon_ret,
                    params: canon_params,
                    variadic,
                }),
                None,
            ))
        };
        QualType::new(self.alloc(
            TypeKind::Function(FunctionType {
                ret,
                params,
                variadic,
            }),
            canon,
        ))
    }

    /// Create a record type. Pass an empty field list and
    /// `complete = false` for a forward reference; fill it in later with
    /// [`complete_record`](Self::complete_record).
    pub fn record_type(
        &mut self,
        kind: RecordKind,
        name: Name,
        fields: Vec<FieldDecl>,
        complete: bool,
    ) -> TypeId {
        self.alloc(
            TypeKind::Record(RecordType {
                kind,
                name,
                fields,
                complete,
            }),
            None,
        )
    }

    /// Install the field list of a previously forward-declared record and
    /// mark it complete.
    pub fn complete_record(&mut self, id: TypeId, fields: Vec<FieldDecl>) {
        match &mut self.types[id.index()].kind {
            TypeKind::Record(record) => {
                record.fields = fields;
                record.complete = true;
            }
            _ => debug_assert!(false, "complete_record on non-record"),
        }
    }

    /// Create an enum type. The underlying type is always `int`.
    pub fn enum_type(&mut self, name: Name, enumerators: Vec<Enumerator>) -> TypeId {
        let underlying = self.builtins.int_ty;
        self.alloc(
            TypeKind::Enum(EnumType {
                name,
                underlying,
                enumerators,
            }),
            None,
        )
    }

    /// Create a typedef alias. Its canonical type is the aliased type's
    /// canonical type.
    pub fn typedef_type(&mut self, name: Name, aliased: QualType) -> TypeId {
        let canon = self.canonical(aliased).ty;
        self.alloc(TypeKind::Typedef(TypedefType { name, aliased }), Some(canon))
    }

    // === Sizing ===

    /// Size of a type in bits, memoized per handle.
    ///
    /// Arithmetic kinds resolve via the fixed width table, void is 0,
    /// pointers are 64, constant arrays multiply out, enums and typedefs
    /// delegate. Records, functions and variable-length arrays need
    /// layout rules this core does not implement and return
    /// [`TypeSizeError::Unsupported`].
    pub fn type_size(&mut self, id: TypeId) -> Result<u64, TypeSizeError> {
        if let Some(&width) = self.size_cache.get(&id) {
            return Ok(width);
        }

        enum Step {
            Done(u64),
            Delegate(TypeId),
            Scale(TypeId, u64),
            Unsupported(&'static str),
        }

        let step = match &self.ty(id).kind {
            TypeKind::Void => Step::Done(0),
            TypeKind::Arith(kind) => Step::Done(arith_bit_width(*kind)),
            TypeKind::Pointer(_) => Step::Done(POINTER_WIDTH),
            TypeKind::Enum(e) => Step::Delegate(e.underlying.ty),
            TypeKind::Typedef(t) => Step::Delegate(t.aliased.ty),
            TypeKind::Array(a) => match a.kind {
                ArrayKind::Constant(count) => Step::Scale(a.elem.ty, count),
                ArrayKind::Variable => Step::Unsupported("variable-length array"),
            },
            TypeKind::Function(_) => Step::Unsupported("function"),
            TypeKind::Record(r) => match r.kind {
                RecordKind::Struct => Step::Unsupported("struct"),
                RecordKind::Union => Step::Unsupported("union"),
            },
        };

        let width = match step {
            Step::Done(w) => w,
            Step::Delegate(inner) => self.type_size(inner)?,
            Step::Scale(elem, count) => self.type_size(elem)?.saturating_mul(count),
            Step::Unsupported(what) => return Err(TypeSizeError::Unsupported(what)),
        };
        self.size_cache.insert(id, width);
        Ok(width)
    }

    // === Conversion ranks [C99 6.3.1.1p1] ===

    /// Integer conversion rank, a total order from `_Bool` (1) to
    /// `long long` (6). Enum types rank as their underlying `int`.
    ///
    /// Precondition: `id` is canonical-unqualified and an integer (or
    /// enum) type; violating it is a compiler bug, not an input error.
    pub fn integer_rank(&self, id: TypeId) -> u32 {
        debug_assert!(
            self.is_canonical_unqualified(QualType::new(id)),
            "integer_rank requires a canonical type"
        );
        let ty = self.ty(id);
        if let TypeKind::Enum(e) = &ty.kind {
            return self.integer_rank(self.canonical(e.underlying).ty);
        }
        let kind = match ty.as_arith() {
            Some(kind) => kind,
            None => {
                debug_assert!(false, "integer_rank on non-arithmetic type");
                return 0;
            }
        };
        match kind {
            ArithKind::Bool => 1,
            ArithKind::CharU | ArithKind::CharS | ArithKind::SChar | ArithKind::UChar => 2,
            ArithKind::Short | ArithKind::UShort => 3,
            ArithKind::WCharU | ArithKind::WCharS | ArithKind::Int | ArithKind::UInt => 4,
            ArithKind::Long | ArithKind::ULong => 5,
            ArithKind::LongLong | ArithKind::ULongLong => 6,
            ArithKind::Float | ArithKind::Double | ArithKind::LongDouble => {
                debug_assert!(false, "integer_rank on a floating type");
                0
            }
        }
    }

    /// Floating conversion rank: `float` (7) < `double` (8) <
    /// `long double` (9), above every integer rank.
    pub fn floating_rank(&self, id: TypeId) -> u32 {
        debug_assert!(
            self.is_canonical_unqualified(QualType::new(id)),
            "floating_rank requires a canonical type"
        );
        match self.ty(id).as_arith() {
            Some(ArithKind::Float) => 7,
            Some(ArithKind::Double) => 8,
            Some(ArithKind::LongDouble) => 9,
            _ => {
                debug_assert!(false, "floating_rank on a non-floating type");
                0
            }
        }
    }

    // === Integer promotion [C99 6.3.1.1p2] ===

    /// Whether the type promotes to `int`/`unsigned int` in expressions:
    /// `_Bool`, the `char` kinds, and the `short` kinds.
    ///
    /// Enum types are not promotable here: their underlying type is
    /// already `int`. (Strict C99 ranks enums by their compatible type;
    /// this implementation pins them to `int` and skips promotion.)
    pub fn is_promotable_integer(&self, qt: QualType) -> bool {
        let canon = self.canonical(qt);
        match self.ty(canon.ty).as_arith() {
            Some(
                ArithKind::Bool
                | ArithKind::CharU
                | ArithKind::CharS
                | ArithKind::SChar
                | ArithKind::UChar
                | ArithKind::Short
                | ArithKind::UShort,
            ) => true,
            _ => false,
        }
    }

    /// The type a promotable integer promotes to: `int`, unless the value
    /// range does not fit (an unsigned type as wide as `int`), in which
    /// case `unsigned int`.
    ///
    /// Precondition: `qt` is promotable (see
    /// [`is_promotable_integer`](Self::is_promotable_integer)); calling
    /// this on anything else is a compiler bug.
    pub fn promoted_integer_type(&self, qt: QualType) -> QualType {
        let canon = self.canonical(qt);
        let ty = self.ty(canon.ty);
        if ty.is_signed_integer() {
            return self.builtins.int_ty;
        }
        let kind = match ty.as_arith() {
            Some(kind) => kind,
            None => {
                debug_assert!(false, "promoted_integer_type on non-arithmetic type");
                return self.builtins.int_ty;
            }
        };
        debug_assert!(
            kind.is_unsigned_integer() && arith_bit_width(kind) <= arith_bit_width(ArithKind::Int),
            "promoted_integer_type on a non-promotable type"
        );
        if arith_bit_width(kind) != arith_bit_width(ArithKind::Int) {
            self.builtins.int_ty
        } else {
            self.builtins.unsigned_int_ty
        }
    }

    /// Bit-field promotion is not implemented: this always reports "no
    /// promotion applies". A complete implementation would promote a
    /// bit-field of width < `int`'s to `int`.
    pub fn promotable_bit_field(&self, _expr: &Expr) -> QualType {
        QualType::NULL
    }

    /// Number of types allocated so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        // Builtins are always present.
        false
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}
