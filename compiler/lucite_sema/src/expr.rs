//! Binary-expression construction and the precedence-pitfall
//! diagnostics.

use crate::{Scope, Sema};
use lucite_ir::{BinaryOp, Expr, ExprKind, QualType, SourceLocation};

impl<'d> Sema<'d> {
    /// Build a binary expression the parser requested.
    ///
    /// Before type checking, two advisory diagnostics catch the classic
    /// precedence mistakes `a & b == c` and `1 << 2 + 4`. Both are
    /// warnings only; the tree is built either way, with the grammar's
    /// grouping.
    pub fn act_on_binary_op(
        &mut self,
        _scope: &Scope,
        op_loc: SourceLocation,
        op: BinaryOp,
        lhs: Expr,
        rhs: Expr,
    ) -> Expr {
        tracing::trace!(op = op.spelling(), "act_on_binary_op");
        if op.is_bitwise() {
            self.diagnose_bitwise_precedence(op, op_loc, &lhs, &rhs);
        }
        if op.is_shift() {
            self.diagnose_additive_in_shift(op, op_loc, &lhs, &rhs);
        }
        self.create_builtin_binary_expr(op_loc, op, lhs, rhs)
    }

    /// Type-check the operands per operator class and build the node.
    /// Operand checks that fail leave the node's type null.
    fn create_builtin_binary_expr(
        &mut self,
        op_loc: SourceLocation,
        op: BinaryOp,
        lhs: Expr,
        rhs: Expr,
    ) -> Expr {
        let (lhs, rhs, result_ty) = match op {
            BinaryOp::Add => self.check_addition_operands(lhs, rhs),
            BinaryOp::Sub => self.check_subtraction_operands(lhs, rhs),
            BinaryOp::Mul | BinaryOp::Div => {
                self.check_multiplicative_operands(lhs, rhs, false)
            }
            BinaryOp::Rem => self.check_multiplicative_operands(lhs, rhs, true),
            BinaryOp::Shl | BinaryOp::Shr => self.check_shift_operands(lhs, rhs),
            BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEq
            | BinaryOp::GreaterEq
            | BinaryOp::Eq
            | BinaryOp::NotEq => self.check_comparison_operands(lhs, rhs),
            BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::BitOr => {
                self.check_bitwise_operands(lhs, rhs)
            }
            BinaryOp::LogicAnd | BinaryOp::LogicOr => {
                let int_ty = self.context().builtins.int_ty;
                (lhs, rhs, int_ty)
            }
            BinaryOp::Assign => {
                let ty = if lhs.ty.is_null() {
                    QualType::NULL
                } else {
                    lhs.ty.unqualified()
                };
                (lhs, rhs, ty)
            }
            BinaryOp::Comma => {
                let ty = rhs.ty;
                (lhs, rhs, ty)
            }
        };

        Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            result_ty,
            op_loc,
        )
    }

    /// Build a unary expression with its result type.
    ///
    /// `&` builds a pointer to the operand type, `*` peels one, `+`/`-`/
    /// `~` apply the integer promotions, `!` yields `int`, and the
    /// increment/decrement forms keep the operand's type. Operands that
    /// defeat the rules leave the node's type null.
    pub fn act_on_unary_op(
        &mut self,
        op_loc: SourceLocation,
        op: lucite_ir::UnaryOp,
        operand: Expr,
    ) -> Expr {
        use lucite_ir::{TypeKind, UnaryOp};
        let (operand, ty) = match op {
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                let ty = operand.ty;
                (operand, ty)
            }
            UnaryOp::AddrOf => {
                if operand.ty.is_null() {
                    (operand, QualType::NULL)
                } else {
                    let ty = self.context_mut().pointer_type(operand.ty);
                    (operand, ty)
                }
            }
            UnaryOp::Deref => {
                let pointee = if operand.ty.is_null() {
                    QualType::NULL
                } else {
                    let canon = self.context().canonical(operand.ty);
                    match &self.context().ty(canon.ty).kind {
                        TypeKind::Pointer(p) => p.pointee,
                        TypeKind::Array(a) => a.elem,
                        _ => QualType::NULL,
                    }
                };
                (operand, pointee)
            }
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => {
                if !operand.ty.is_null()
                    && self
                        .context()
                        .ty(self.context().canonical(operand.ty).ty)
                        .is_arithmetic()
                {
                    let operand = self.integer_promotions(operand);
                    let ty = self.context().canonical(operand.ty).unqualified();
                    (operand, ty)
                } else {
                    (operand, QualType::NULL)
                }
            }
            UnaryOp::LogicNot => {
                let int_ty = self.context().builtins.int_ty;
                (operand, int_ty)
            }
        };
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
            op_loc,
        )
    }

    /// Build a `.`/`->` member access, resolving the member's type when
    /// the base is (a pointer to) a complete record that has it.
    pub fn act_on_member_access(
        &mut self,
        op_loc: SourceLocation,
        base: Expr,
        member: lucite_ir::Name,
        arrow: bool,
    ) -> Expr {
        use lucite_ir::TypeKind;
        let ty = 'resolve: {
            if base.ty.is_null() {
                break 'resolve QualType::NULL;
            }
            let mut record = self.context().canonical(base.ty);
            if arrow {
                record = match &self.context().ty(record.ty).kind {
                    TypeKind::Pointer(p) => self.context().canonical(p.pointee),
                    _ => break 'resolve QualType::NULL,
                };
            }
            match &self.context().ty(record.ty).kind {
                TypeKind::Record(r) => r
                    .fields
                    .iter()
                    .find(|f| f.name == member)
                    .map_or(QualType::NULL, |f| f.ty),
                _ => QualType::NULL,
            }
        };
        Expr::new(
            ExprKind::Member {
                base: Box::new(base),
                member,
                arrow,
            },
            ty,
            op_loc,
        )
    }

    /// Warn when a bitwise operator's operand is a comparison: the
    /// bitwise operator binds tighter than the user probably thinks
    /// (`0x1 & 0x4 == 0`).
    fn diagnose_bitwise_precedence(
        &self,
        op: BinaryOp,
        op_loc: SourceLocation,
        lhs: &Expr,
        rhs: &Expr,
    ) {
        let left_comp = lhs.as_binary_op().is_some_and(BinaryOp::is_comparison);
        let right_comp = rhs.as_binary_op().is_some_and(BinaryOp::is_comparison);
        if left_comp == right_comp {
            return;
        }

        // Bitwise operators are sometimes chained as eager logical ops;
        // don't diagnose that idiom.
        let left_bitwise = lhs.as_binary_op().is_some_and(BinaryOp::is_bitwise);
        let right_bitwise = rhs.as_binary_op().is_some_and(BinaryOp::is_bitwise);
        if left_bitwise || right_bitwise {
            return;
        }

        let cmp_op = if left_comp {
            lhs.as_binary_op()
        } else {
            rhs.as_binary_op()
        };
        let Some(cmp_op) = cmp_op else { return };
        self.diag().warning(
            op_loc,
            format!(
                "'{}' has lower precedence than '{}', '{}' will be evaluated first",
                op.spelling(),
                cmp_op.spelling(),
                cmp_op.spelling()
            ),
        );
    }

    /// Warn when a shift's operand is an additive expression
    /// (`1 << 2 + 4` shifts by 6, not 2+anything).
    fn diagnose_additive_in_shift(
        &self,
        op: BinaryOp,
        op_loc: SourceLocation,
        lhs: &Expr,
        rhs: &Expr,
    ) {
        let left_additive = lhs.as_binary_op().is_some_and(BinaryOp::is_additive);
        let right_additive = rhs.as_binary_op().is_some_and(BinaryOp::is_additive);
        if left_additive == right_additive {
            return;
        }

        let add_op = if left_additive {
            lhs.as_binary_op()
        } else {
            rhs.as_binary_op()
        };
        let Some(add_op) = add_op else { return };
        self.diag().warning(
            op_loc,
            format!(
                "'{}' has lower precedence than '{}', '{}' will be evaluated first",
                op.spelling(),
                add_op.spelling(),
                add_op.spelling()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScopeFlags, ScopeStack};
    use lucite_diagnostic::DiagnosticEngine;

    fn int_lit(sema: &Sema<'_>, value: u64) -> Expr {
        Expr::new(
            ExprKind::IntConst(value),
            sema.context().builtins.int_ty,
            SourceLocation::NONE,
        )
    }

    fn binary(sema: &mut Sema<'_>, stack: &ScopeStack, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        sema.act_on_binary_op(stack.current(), SourceLocation::NONE, op, lhs, rhs)
    }

    fn setup(diag: &DiagnosticEngine) -> (Sema<'_>, ScopeStack) {
        let sema = Sema::new(diag);
        let mut stack = ScopeStack::new();
        stack.enter(ScopeFlags::DECL);
        (sema, stack)
    }

    #[test]
    fn bitwise_and_of_comparison_warns_naming_the_comparison() {
        let diag = DiagnosticEngine::buffered();
        let (mut sema, stack) = setup(&diag);
        let a = int_lit(&sema, 1);
        let b = int_lit(&sema, 4);
        let zero = int_lit(&sema, 0);
        // 0x1 & (0x4 == 0) as the grammar parses it.
        let cmp = binary(&mut sema, &stack, BinaryOp::Eq, b, zero);
        let _ = binary(&mut sema, &stack, BinaryOp::BitAnd, a, cmp);

        let diags = diag.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "'&' has lower precedence than '==', '==' will be evaluated first"
        );
    }

    #[test]
    fn shift_of_additive_warns_naming_plus() {
        let diag = DiagnosticEngine::buffered();
        let (mut sema, stack) = setup(&diag);
        let one = int_lit(&sema, 1);
        let two = int_lit(&sema, 2);
        let four = int_lit(&sema, 4);
        // 1 << (2 + 4) as the grammar parses it.
        let sum = binary(&mut sema, &stack, BinaryOp::Add, two, four);
        let shift = binary(&mut sema, &stack, BinaryOp::Shl, one, sum);

        let diags = diag.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "'<<' has lower precedence than '+', '+' will be evaluated first"
        );
        // The tree is still built with the grammar's grouping.
        match shift.kind {
            ExprKind::Binary { op: BinaryOp::Shl, .. } => {}
            other => panic!("expected shift node, got {other:?}"),
        }
    }

    #[test]
    fn comparisons_on_both_sides_do_not_warn() {
        let diag = DiagnosticEngine::buffered();
        let (mut sema, stack) = setup(&diag);
        let lhs = {
            let a = int_lit(&sema, 1);
            let b = int_lit(&sema, 2);
            binary(&mut sema, &stack, BinaryOp::Less, a, b)
        };
        let rhs = {
            let a = int_lit(&sema, 3);
            let b = int_lit(&sema, 4);
            binary(&mut sema, &stack, BinaryOp::Greater, a, b)
        };
        let _ = binary(&mut sema, &stack, BinaryOp::BitAnd, lhs, rhs);
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn bitwise_chains_do_not_warn() {
        // (a & b) & (c == d): the left side is itself bitwise, which is
        // the eager-logical-op idiom; no warning.
        let diag = DiagnosticEngine::buffered();
        let (mut sema, stack) = setup(&diag);
        let inner = {
            let a = int_lit(&sema, 1);
            let b = int_lit(&sema, 2);
            binary(&mut sema, &stack, BinaryOp::BitAnd, a, b)
        };
        let cmp = {
            let c = int_lit(&sema, 3);
            let d = int_lit(&sema, 4);
            binary(&mut sema, &stack, BinaryOp::Eq, c, d)
        };
        let _ = binary(&mut sema, &stack, BinaryOp::BitAnd, inner, cmp);
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn parenthesized_operand_suppresses_the_warning() {
        let diag = DiagnosticEngine::buffered();
        let (mut sema, stack) = setup(&diag);
        let one = int_lit(&sema, 1);
        let two = int_lit(&sema, 2);
        let four = int_lit(&sema, 4);
        let sum = binary(&mut sema, &stack, BinaryOp::Add, two, four);
        let sum_loc = sum.loc;
        let paren = Expr::new(ExprKind::Paren(Box::new(sum)), QualType::NULL, sum_loc);
        let _ = binary(&mut sema, &stack, BinaryOp::Shl, one, paren);
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn assignment_takes_unqualified_left_type() {
        let diag = DiagnosticEngine::buffered();
        let (mut sema, stack) = setup(&diag);
        let int_ty = sema.context().builtins.int_ty;
        let lhs = Expr::new(
            ExprKind::DeclRef(lucite_ir::Name::from_raw(7)),
            QualType::with_quals(int_ty.ty, lucite_ir::Qualifiers::VOLATILE),
            SourceLocation::NONE,
        );
        let rhs = int_lit(&sema, 3);
        let node = binary(&mut sema, &stack, BinaryOp::Assign, lhs, rhs);
        assert_eq!(node.ty, int_ty);
    }
}
