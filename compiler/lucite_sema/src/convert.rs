//! Implicit conversions [C99 6.3].
//!
//! Integer promotion, the usual arithmetic conversions, and the
//! per-operator operand checks. Every conversion that changes an
//! operand's static type wraps that operand in an implicit-cast node
//! tagged with the appropriate cast kind.

use crate::Sema;
use lucite_ir::{ArithKind, CastKind, Expr, ExprKind, QualType, TypeKind};
use lucite_types::arith_bit_width;

/// Which operand(s) the usual arithmetic conversions decided to convert.
enum IntConversion {
    /// Already the same type.
    None,
    ConvertLhs(QualType),
    ConvertRhs(QualType),
    ConvertBoth(QualType),
}

impl<'d> Sema<'d> {
    /// Wrap `expr` in an implicit cast to `ty`, unless it already has
    /// exactly that type.
    pub fn implicit_cast_to(&self, expr: Expr, ty: QualType, cast: CastKind) -> Expr {
        if expr.ty == ty {
            return expr;
        }
        let loc = expr.loc;
        Expr::new(
            ExprKind::ImplicitCast {
                cast,
                operand: Box::new(expr),
            },
            ty,
            loc,
        )
    }

    /// Integer promotions [C99 6.3.1.1p2]: `_Bool`, the char kinds and
    /// the short kinds promote to `int` (or `unsigned int` when the
    /// value range forces it). Non-promotable operands pass through.
    pub fn integer_promotions(&mut self, expr: Expr) -> Expr {
        // Bit-field promotion would come first; it is not implemented
        // and always reports "no promotion".
        let bit_field_ty = self.context().promotable_bit_field(&expr);
        if !bit_field_ty.is_null() {
            return self.implicit_cast_to(expr, bit_field_ty, CastKind::IntegralCast);
        }
        let ty = expr.ty;
        if !ty.is_null() && self.context().is_promotable_integer(ty) {
            let promoted = self.context().promoted_integer_type(ty);
            return self.implicit_cast_to(expr, promoted, CastKind::IntegralCast);
        }
        expr
    }

    /// Usual arithmetic conversions [C99 6.3.1.8]: reconcile two
    /// arithmetic operands into one common type, wrapping converted
    /// operands in implicit casts. Returns the operands and the common
    /// result type.
    ///
    /// Qualifiers are ignored for conversion purposes.
    pub fn usual_arithmetic_conversions(
        &mut self,
        lhs: Expr,
        rhs: Expr,
    ) -> (Expr, Expr, QualType) {
        let lhs_ty = self.context().canonical(lhs.ty).unqualified();
        let rhs_ty = self.context().canonical(rhs.ty).unqualified();
        debug_assert!(
            self.context().ty(lhs_ty.ty).is_arithmetic()
                && self.context().ty(rhs_ty.ty).is_arithmetic(),
            "usual arithmetic conversions need arithmetic operands"
        );

        if self.context().ty(lhs_ty.ty).is_floating()
            || self.context().ty(rhs_ty.ty).is_floating()
        {
            return self.handle_floating_conversions(lhs, rhs, lhs_ty, rhs_ty);
        }
        self.handle_integer_conversions(lhs, rhs)
    }

    /// At least one side is floating: promote the lower floating rank to
    /// the higher; an integer side converts to the floating type.
    fn handle_floating_conversions(
        &mut self,
        lhs: Expr,
        rhs: Expr,
        lhs_ty: QualType,
        rhs_ty: QualType,
    ) -> (Expr, Expr, QualType) {
        let lhs_floating = self.context().ty(lhs_ty.ty).is_floating();
        let rhs_floating = self.context().ty(rhs_ty.ty).is_floating();

        if lhs_floating && rhs_floating {
            let lhs_rank = self.context().floating_rank(lhs_ty.ty);
            let rhs_rank = self.context().floating_rank(rhs_ty.ty);
            if lhs_rank == rhs_rank {
                return (lhs, rhs, lhs_ty);
            }
            if lhs_rank > rhs_rank {
                let rhs = self.implicit_cast_to(rhs, lhs_ty, CastKind::FloatingCast);
                return (lhs, rhs, lhs_ty);
            }
            let lhs = self.implicit_cast_to(lhs, rhs_ty, CastKind::FloatingCast);
            return (lhs, rhs, rhs_ty);
        }

        if lhs_floating {
            let rhs = self.implicit_cast_to(rhs, lhs_ty, CastKind::IntegralToFloating);
            (lhs, rhs, lhs_ty)
        } else {
            let lhs = self.implicit_cast_to(lhs, rhs_ty, CastKind::IntegralToFloating);
            (lhs, rhs, rhs_ty)
        }
    }

    /// Both sides are integers: promote both, then reconcile ranks and
    /// signedness.
    fn handle_integer_conversions(&mut self, lhs: Expr, rhs: Expr) -> (Expr, Expr, QualType) {
        let lhs = self.integer_promotions(lhs);
        let rhs = self.integer_promotions(rhs);
        let lhs_ty = self.context().canonical(lhs.ty).unqualified();
        let rhs_ty = self.context().canonical(rhs.ty).unqualified();

        let conversion = self.pick_integer_conversion(lhs_ty, rhs_ty);
        match conversion {
            IntConversion::None => (lhs, rhs, lhs_ty),
            IntConversion::ConvertLhs(to) => {
                let lhs = self.implicit_cast_to(lhs, to, CastKind::IntegralCast);
                (lhs, rhs, to)
            }
            IntConversion::ConvertRhs(to) => {
                let rhs = self.implicit_cast_to(rhs, to, CastKind::IntegralCast);
                (lhs, rhs, to)
            }
            IntConversion::ConvertBoth(to) => {
                let lhs = self.implicit_cast_to(lhs, to, CastKind::IntegralCast);
                let rhs = self.implicit_cast_to(rhs, to, CastKind::IntegralCast);
                (lhs, rhs, to)
            }
        }
    }

    /// The rank/signedness case analysis of C99 6.3.1.8 over two
    /// promoted integer types.
    fn pick_integer_conversion(&self, lhs_ty: QualType, rhs_ty: QualType) -> IntConversion {
        if lhs_ty == rhs_ty {
            return IntConversion::None;
        }
        let ctx = self.context();
        let lhs_rank = ctx.integer_rank(lhs_ty.ty);
        let rhs_rank = ctx.integer_rank(rhs_ty.ty);
        let lhs_signed = ctx.ty(lhs_ty.ty).is_signed_integer();
        let rhs_signed = ctx.ty(rhs_ty.ty).is_signed_integer();

        if lhs_signed == rhs_signed {
            // Same signedness: the higher rank wins.
            return if lhs_rank > rhs_rank {
                IntConversion::ConvertRhs(lhs_ty)
            } else {
                IntConversion::ConvertLhs(rhs_ty)
            };
        }

        // Mixed signedness.
        let (signed_ty, signed_rank, unsigned_ty, unsigned_rank, signed_is_lhs) = if lhs_signed {
            (lhs_ty, lhs_rank, rhs_ty, rhs_rank, true)
        } else {
            (rhs_ty, rhs_rank, lhs_ty, lhs_rank, false)
        };

        if unsigned_rank >= signed_rank {
            // The unsigned type absorbs the signed one.
            return if signed_is_lhs {
                IntConversion::ConvertLhs(unsigned_ty)
            } else {
                IntConversion::ConvertRhs(unsigned_ty)
            };
        }
        if self.integer_width(signed_ty) > self.integer_width(unsigned_ty) {
            // The signed type can represent every unsigned value.
            return if signed_is_lhs {
                IntConversion::ConvertRhs(signed_ty)
            } else {
                IntConversion::ConvertLhs(signed_ty)
            };
        }
        // Same width, signed rank higher: both convert to the unsigned
        // counterpart of the signed type.
        IntConversion::ConvertBoth(self.unsigned_counterpart(signed_ty))
    }

    fn integer_width(&self, ty: QualType) -> u64 {
        match self.context().ty(ty.ty).as_arith() {
            Some(kind) => arith_bit_width(kind),
            None => {
                // Enums size as their underlying int.
                arith_bit_width(ArithKind::Int)
            }
        }
    }

    /// The unsigned type corresponding to a (promoted) signed integer
    /// type.
    fn unsigned_counterpart(&self, ty: QualType) -> QualType {
        let b = &self.context().builtins;
        match self.context().ty(ty.ty).as_arith() {
            Some(ArithKind::Long) => b.unsigned_long_ty,
            Some(ArithKind::LongLong) => b.unsigned_long_long_ty,
            Some(ArithKind::Int | ArithKind::WCharS) => b.unsigned_int_ty,
            other => {
                debug_assert!(false, "no unsigned counterpart for {other:?}");
                b.unsigned_int_ty
            }
        }
    }

    // === Per-operator operand checking ===
    //
    // Each checker returns the (possibly cast-wrapped) operands and the
    // result type; a null result type means the operands did not satisfy
    // the operator's constraints and the caller must cope.

    fn is_arithmetic_operand(&self, expr: &Expr) -> bool {
        !expr.ty.is_null() && self.context().ty(self.context().canonical(expr.ty).ty).is_arithmetic()
    }

    fn is_integer_operand(&self, expr: &Expr) -> bool {
        if expr.ty.is_null() {
            return false;
        }
        let canon = self.context().canonical(expr.ty);
        let ty = self.context().ty(canon.ty);
        ty.is_arithmetic() && !ty.is_floating()
    }

    fn is_pointer_operand(&self, expr: &Expr) -> bool {
        if expr.ty.is_null() {
            return false;
        }
        let canon = self.context().canonical(expr.ty);
        matches!(self.context().ty(canon.ty).kind, TypeKind::Pointer(_))
    }

    /// Addition [C99 6.5.6]: arithmetic + arithmetic via the usual
    /// conversions, or pointer + integer.
    pub fn check_addition_operands(&mut self, lhs: Expr, rhs: Expr) -> (Expr, Expr, QualType) {
        if self.is_arithmetic_operand(&lhs) && self.is_arithmetic_operand(&rhs) {
            return self.usual_arithmetic_conversions(lhs, rhs);
        }
        if self.is_pointer_operand(&lhs) && self.is_integer_operand(&rhs) {
            let ty = lhs.ty;
            return (lhs, rhs, ty);
        }
        if self.is_integer_operand(&lhs) && self.is_pointer_operand(&rhs) {
            let ty = rhs.ty;
            return (lhs, rhs, ty);
        }
        (lhs, rhs, QualType::NULL)
    }

    /// Subtraction [C99 6.5.6]: arithmetic via the usual conversions,
    /// pointer - integer, or pointer - pointer (yielding `long`, the
    /// ptrdiff type here).
    pub fn check_subtraction_operands(&mut self, lhs: Expr, rhs: Expr) -> (Expr, Expr, QualType) {
        if self.is_arithmetic_operand(&lhs) && self.is_arithmetic_operand(&rhs) {
            return self.usual_arithmetic_conversions(lhs, rhs);
        }
        if self.is_pointer_operand(&lhs) && self.is_integer_operand(&rhs) {
            let ty = lhs.ty;
            return (lhs, rhs, ty);
        }
        if self.is_pointer_operand(&lhs) && self.is_pointer_operand(&rhs) {
            let long_ty = self.context().builtins.long_ty;
            return (lhs, rhs, long_ty);
        }
        (lhs, rhs, QualType::NULL)
    }

    /// `*` and `/` need arithmetic operands; `%` needs integers.
    pub fn check_multiplicative_operands(
        &mut self,
        lhs: Expr,
        rhs: Expr,
        integer_only: bool,
    ) -> (Expr, Expr, QualType) {
        let ok = if integer_only {
            self.is_integer_operand(&lhs) && self.is_integer_operand(&rhs)
        } else {
            self.is_arithmetic_operand(&lhs) && self.is_arithmetic_operand(&rhs)
        };
        if ok {
            self.usual_arithmetic_conversions(lhs, rhs)
        } else {
            (lhs, rhs, QualType::NULL)
        }
    }

    /// Shifts [C99 6.5.7]: both operands promote independently; the
    /// result has the promoted left type. No common type is formed.
    pub fn check_shift_operands(&mut self, lhs: Expr, rhs: Expr) -> (Expr, Expr, QualType) {
        if !(self.is_integer_operand(&lhs) && self.is_integer_operand(&rhs)) {
            return (lhs, rhs, QualType::NULL);
        }
        let lhs = self.integer_promotions(lhs);
        let rhs = self.integer_promotions(rhs);
        let ty = self.context().canonical(lhs.ty).unqualified();
        (lhs, rhs, ty)
    }

    /// Bitwise `&`/`^`/`|` [C99 6.5.10-12]: integer operands through the
    /// usual conversions.
    pub fn check_bitwise_operands(&mut self, lhs: Expr, rhs: Expr) -> (Expr, Expr, QualType) {
        if self.is_integer_operand(&lhs) && self.is_integer_operand(&rhs) {
            self.usual_arithmetic_conversions(lhs, rhs)
        } else {
            (lhs, rhs, QualType::NULL)
        }
    }

    /// Relational/equality operators convert their operands like
    /// arithmetic ones but always produce `int`.
    pub fn check_comparison_operands(&mut self, lhs: Expr, rhs: Expr) -> (Expr, Expr, QualType) {
        let int_ty = self.context().builtins.int_ty;
        if self.is_arithmetic_operand(&lhs) && self.is_arithmetic_operand(&rhs) {
            let (lhs, rhs, common) = self.usual_arithmetic_conversions(lhs, rhs);
            if common.is_null() {
                return (lhs, rhs, QualType::NULL);
            }
            return (lhs, rhs, int_ty);
        }
        if self.is_pointer_operand(&lhs) && self.is_pointer_operand(&rhs) {
            return (lhs, rhs, int_ty);
        }
        (lhs, rhs, QualType::NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucite_diagnostic::DiagnosticEngine;
    use lucite_ir::SourceLocation;

    fn lit(ty: QualType) -> Expr {
        Expr::new(ExprKind::IntConst(1), ty, SourceLocation::NONE)
    }

    fn float_lit(ty: QualType) -> Expr {
        Expr::new(ExprKind::FloatConst(1.5), ty, SourceLocation::NONE)
    }

    fn cast_kind(expr: &Expr) -> Option<CastKind> {
        match &expr.kind {
            ExprKind::ImplicitCast { cast, .. } => Some(*cast),
            _ => None,
        }
    }

    #[test]
    fn equal_types_need_no_conversion() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let (lhs, rhs, common) = sema.usual_arithmetic_conversions(lit(int_ty), lit(int_ty));
        assert_eq!(common, int_ty);
        assert_eq!(cast_kind(&lhs), None);
        assert_eq!(cast_kind(&rhs), None);
    }

    #[test]
    fn small_integers_promote_to_int() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let char_ty = sema.context().builtins.char_ty;
        let int_ty = sema.context().builtins.int_ty;
        let (lhs, rhs, common) = sema.usual_arithmetic_conversions(lit(char_ty), lit(char_ty));
        assert_eq!(common, int_ty);
        assert_eq!(cast_kind(&lhs), Some(CastKind::IntegralCast));
        assert_eq!(cast_kind(&rhs), Some(CastKind::IntegralCast));
    }

    #[test]
    fn same_signedness_higher_rank_wins() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let long_ty = sema.context().builtins.long_ty;
        let (lhs, rhs, common) = sema.usual_arithmetic_conversions(lit(int_ty), lit(long_ty));
        assert_eq!(common, long_ty);
        assert_eq!(cast_kind(&lhs), Some(CastKind::IntegralCast));
        assert_eq!(cast_kind(&rhs), None);
    }

    #[test]
    fn unsigned_of_equal_rank_absorbs_signed() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let uint_ty = sema.context().builtins.unsigned_int_ty;
        let (lhs, _rhs, common) = sema.usual_arithmetic_conversions(lit(int_ty), lit(uint_ty));
        assert_eq!(common, uint_ty);
        assert_eq!(cast_kind(&lhs), Some(CastKind::IntegralCast));
    }

    #[test]
    fn wider_signed_absorbs_narrower_unsigned() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let long_ty = sema.context().builtins.long_ty;
        let uint_ty = sema.context().builtins.unsigned_int_ty;
        let (_lhs, rhs, common) = sema.usual_arithmetic_conversions(lit(long_ty), lit(uint_ty));
        assert_eq!(common, long_ty);
        assert_eq!(cast_kind(&rhs), Some(CastKind::IntegralCast));
    }

    #[test]
    fn equal_width_mixed_signedness_goes_unsigned() {
        // long vs unsigned long: unsigned rank >= signed rank, so the
        // unsigned side wins directly.
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let long_ty = sema.context().builtins.long_ty;
        let ulong_ty = sema.context().builtins.unsigned_long_ty;
        let (lhs, _rhs, common) = sema.usual_arithmetic_conversions(lit(long_ty), lit(ulong_ty));
        assert_eq!(common, ulong_ty);
        assert_eq!(cast_kind(&lhs), Some(CastKind::IntegralCast));
    }

    #[test]
    fn floating_beats_integer_with_integral_to_floating_cast() {
        // The scenario from `unsigned long long x = 3.14L + 114;`: the
        // long double operand forces the integer side to long double.
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let long_double_ty = sema.context().builtins.long_double_ty;
        let (lhs, rhs, common) =
            sema.usual_arithmetic_conversions(float_lit(long_double_ty), lit(int_ty));
        assert_eq!(common, long_double_ty);
        assert_eq!(cast_kind(&lhs), None);
        assert_eq!(cast_kind(&rhs), Some(CastKind::IntegralToFloating));
        assert_eq!(rhs.ty, long_double_ty);
    }

    #[test]
    fn lower_floating_rank_promotes() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let float_ty = sema.context().builtins.float_ty;
        let double_ty = sema.context().builtins.double_ty;
        let (lhs, rhs, common) =
            sema.usual_arithmetic_conversions(float_lit(float_ty), float_lit(double_ty));
        assert_eq!(common, double_ty);
        assert_eq!(cast_kind(&lhs), Some(CastKind::FloatingCast));
        assert_eq!(cast_kind(&rhs), None);
    }

    #[test]
    fn shift_keeps_promoted_left_type() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let char_ty = sema.context().builtins.char_ty;
        let long_ty = sema.context().builtins.long_ty;
        let int_ty = sema.context().builtins.int_ty;
        let (lhs, rhs, ty) = sema.check_shift_operands(lit(char_ty), lit(long_ty));
        // char << long: the left side promotes to int and that is the
        // result type; the right side is not converted to a common type.
        assert_eq!(ty, int_ty);
        assert_eq!(cast_kind(&lhs), Some(CastKind::IntegralCast));
        assert_eq!(cast_kind(&rhs), None);
    }

    #[test]
    fn comparison_results_are_int() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let long_ty = sema.context().builtins.long_ty;
        let double_ty = sema.context().builtins.double_ty;
        let int_ty = sema.context().builtins.int_ty;
        let (_lhs, rhs, ty) = sema.check_comparison_operands(lit(long_ty), float_lit(double_ty));
        assert_eq!(ty, int_ty);
        assert_eq!(cast_kind(&rhs), None);
    }

    #[test]
    fn non_arithmetic_operands_leave_a_null_type() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let (_lhs, _rhs, ty) =
            sema.check_multiplicative_operands(lit(QualType::NULL), lit(int_ty), false);
        assert!(ty.is_null());
    }

    #[test]
    fn pointer_plus_integer_keeps_pointer_type() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let ptr_ty = sema.context_mut().pointer_type(int_ty);
        let (_lhs, _rhs, ty) = sema.check_addition_operands(lit(ptr_ty), lit(int_ty));
        assert_eq!(ty, ptr_ty);
        let (_lhs, _rhs, ty) = sema.check_subtraction_operands(lit(ptr_ty), lit(ptr_ty));
        assert_eq!(ty, sema.context().builtins.long_ty);
    }

    #[test]
    fn remainder_requires_integers() {
        let diag = DiagnosticEngine::buffered();
        let mut sema = Sema::new(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let double_ty = sema.context().builtins.double_ty;
        let (_lhs, _rhs, ty) =
            sema.check_multiplicative_operands(lit(int_ty), float_lit(double_ty), true);
        assert!(ty.is_null());
    }
}
