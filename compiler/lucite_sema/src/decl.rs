//! Declarator-to-type translation.
//!
//! Turns a finished [`DeclSpec`] plus a parsed [`Declarator`] into the
//! declared [`QualType`]: first the base type from the specifiers, then
//! the declarator chunks. The chunk list is in outer-to-inner order with
//! respect to the derived type, so chunks apply in reverse — innermost
//! type constructor first — which is exactly C's "declaration mimics
//! use" reading.

use crate::{DeclSpec, Declarator, DeclaratorChunk, Sema, TypeRep, TypeSpecSign, TypeSpecType,
            TypeSpecWidth};
use lucite_ir::{QualType, SourceLocation};

impl<'d> Sema<'d> {
    /// The base type denoted by a finished declaration-specifier set.
    ///
    /// Returns [`QualType::NULL`] for an erroneous spec. A spec with no
    /// type specifier at all falls back to C89 implicit `int` with a
    /// warning.
    pub fn convert_decl_spec_to_type(&mut self, ds: &DeclSpec, loc: SourceLocation) -> QualType {
        let unsigned = ds.type_spec_sign == TypeSpecSign::Unsigned;
        let b = &self.context().builtins;
        let base = match ds.type_spec_type {
            TypeSpecType::Error => return QualType::NULL,
            TypeSpecType::Void => b.void_ty,
            TypeSpecType::Bool => b.bool_ty,
            TypeSpecType::Char => match ds.type_spec_sign {
                TypeSpecSign::Unspecified => b.char_ty,
                TypeSpecSign::Signed => b.signed_char_ty,
                TypeSpecSign::Unsigned => b.unsigned_char_ty,
            },
            TypeSpecType::Int => match ds.type_spec_width {
                TypeSpecWidth::Unspecified => {
                    if unsigned {
                        b.unsigned_int_ty
                    } else {
                        b.int_ty
                    }
                }
                TypeSpecWidth::Short => {
                    if unsigned {
                        b.unsigned_short_ty
                    } else {
                        b.short_ty
                    }
                }
                TypeSpecWidth::Long => {
                    if unsigned {
                        b.unsigned_long_ty
                    } else {
                        b.long_ty
                    }
                }
                TypeSpecWidth::LongLong => {
                    if unsigned {
                        b.unsigned_long_long_ty
                    } else {
                        b.long_long_ty
                    }
                }
            },
            TypeSpecType::Float => b.float_ty,
            TypeSpecType::Double => {
                if ds.type_spec_width == TypeSpecWidth::Long {
                    b.long_double_ty
                } else {
                    b.double_ty
                }
            }
            TypeSpecType::Struct | TypeSpecType::Union | TypeSpecType::Enum => {
                match ds.type_rep {
                    Some(TypeRep::Tag(id)) => QualType::new(id),
                    _ => return QualType::NULL,
                }
            }
            TypeSpecType::Typename => match ds.type_rep {
                Some(TypeRep::Alias(qt)) => qt,
                _ => return QualType::NULL,
            },
            TypeSpecType::Unspecified => {
                self.diag()
                    .warning(loc, "type specifier missing, defaults to 'int'");
                b.int_ty
            }
        };
        QualType::with_quals(base.ty, base.quals | ds.type_qualifiers)
    }

    /// Derive the declared type from spec + declarator.
    ///
    /// Array size expressions are moved out of the chunks into the
    /// constructed array types. Consumers must check for a NULL result:
    /// an invalid declarator never yields a usable type.
    pub fn type_for_declarator(
        &mut self,
        ds: &DeclSpec,
        d: &mut Declarator,
        loc: SourceLocation,
    ) -> QualType {
        tracing::trace!(invalid = d.invalid, "type_for_declarator");
        if d.invalid || ds.type_spec_type == TypeSpecType::Error {
            return QualType::NULL;
        }
        let mut ty = self.convert_decl_spec_to_type(ds, loc);
        if ty.is_null() {
            return QualType::NULL;
        }

        // Apply chunks innermost-constructor-first (reverse list order).
        for i in (0..d.chunks.len()).rev() {
            match &mut d.chunks[i] {
                DeclaratorChunk::Pointer { quals, .. } => {
                    let quals = *quals;
                    let ptr = self.context_mut().pointer_type(ty);
                    ty = QualType::with_quals(ptr.ty, quals);
                }
                DeclaratorChunk::Array { quals, size, .. } => {
                    let quals = *quals;
                    let size_expr = size.take();
                    let arr = match size_expr {
                        // [] (incomplete) and [*] have no constant size.
                        None => self.context_mut().variable_array_type(ty, None),
                        Some(expr) => match self.evaluate_integer_constant(&expr) {
                            Some(count) => self
                                .context_mut()
                                .constant_array_type(ty, count, Some(expr)),
                            None => self.context_mut().variable_array_type(ty, Some(expr)),
                        },
                    };
                    ty = QualType::with_quals(arr.ty, quals);
                }
                DeclaratorChunk::Function {
                    variadic,
                    params,
                    loc: chunk_loc,
                    ..
                } => {
                    let variadic = *variadic;
                    let chunk_loc = *chunk_loc;
                    let param_tys: Vec<QualType> = params.iter().map(|p| p.ty).collect();
                    let ret = self.context().ty(self.context().canonical(ty).ty);
                    if ret.is_function() || ret.is_array() {
                        self.diag().error(
                            chunk_loc,
                            "function cannot return a function or array type",
                        );
                        d.invalid = true;
                        return QualType::NULL;
                    }
                    ty = self.context_mut().function_type(ty, param_tys, variadic);
                }
            }
        }
        ty
    }

    /// Parameter type adjustment [C99 6.7.5.3p7-8]: a parameter of array
    /// type becomes a pointer to the element type, and a parameter of
    /// function type becomes a pointer to the function.
    pub fn adjust_parameter_type(&mut self, ty: QualType) -> QualType {
        use lucite_ir::TypeKind;
        if ty.is_null() {
            return ty;
        }
        let canon = self.context().canonical(ty);
        let adjusted = match &self.context().ty(canon.ty).kind {
            TypeKind::Array(a) => Some(a.elem),
            TypeKind::Function(_) => Some(ty.unqualified()),
            _ => None,
        };
        match adjusted {
            Some(inner) => self.context_mut().pointer_type(inner),
            None => ty,
        }
    }
}
