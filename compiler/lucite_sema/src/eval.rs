//! Integer constant-expression evaluation.
//!
//! A small folder over the expression tree, used for array bounds and
//! (eventually) bit-field widths. Anything it cannot fold — references,
//! calls, floating operands — yields `None`, and the caller falls back
//! to treating the size as non-constant.

use crate::Sema;
use lucite_ir::{BinaryOp, Expr, ExprKind, SizeofArg, UnaryOp};

impl<'d> Sema<'d> {
    /// Evaluate `expr` as an unsigned integer constant, or `None` if it
    /// is not one.
    pub fn evaluate_integer_constant(&mut self, expr: &Expr) -> Option<u64> {
        match &expr.kind {
            ExprKind::IntConst(value) => Some(*value),
            ExprKind::CharConst(value) => Some(*value as u64),
            ExprKind::Paren(inner) => self.evaluate_integer_constant(inner),
            ExprKind::ImplicitCast { operand, .. } | ExprKind::Cast { operand } => {
                self.evaluate_integer_constant(operand)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate_integer_constant(operand)?;
                match op {
                    UnaryOp::Plus => Some(value),
                    UnaryOp::Minus => Some(value.wrapping_neg()),
                    UnaryOp::BitNot => Some(!value),
                    UnaryOp::LogicNot => Some(u64::from(value == 0)),
                    _ => None,
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.evaluate_integer_constant(lhs)?;
                let r = self.evaluate_integer_constant(rhs)?;
                match op {
                    BinaryOp::Add => Some(l.wrapping_add(r)),
                    BinaryOp::Sub => Some(l.wrapping_sub(r)),
                    BinaryOp::Mul => Some(l.wrapping_mul(r)),
                    BinaryOp::Div => l.checked_div(r),
                    BinaryOp::Rem => l.checked_rem(r),
                    BinaryOp::Shl => Some(l.wrapping_shl(r as u32)),
                    BinaryOp::Shr => Some(l.wrapping_shr(r as u32)),
                    BinaryOp::BitAnd => Some(l & r),
                    BinaryOp::BitXor => Some(l ^ r),
                    BinaryOp::BitOr => Some(l | r),
                    BinaryOp::Less => Some(u64::from(l < r)),
                    BinaryOp::Greater => Some(u64::from(l > r)),
                    BinaryOp::LessEq => Some(u64::from(l <= r)),
                    BinaryOp::GreaterEq => Some(u64::from(l >= r)),
                    BinaryOp::Eq => Some(u64::from(l == r)),
                    BinaryOp::NotEq => Some(u64::from(l != r)),
                    BinaryOp::LogicAnd => Some(u64::from(l != 0 && r != 0)),
                    BinaryOp::LogicOr => Some(u64::from(l != 0 || r != 0)),
                    BinaryOp::Assign | BinaryOp::Comma => None,
                }
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let c = self.evaluate_integer_constant(cond)?;
                if c != 0 {
                    self.evaluate_integer_constant(then_expr)
                } else {
                    self.evaluate_integer_constant(else_expr)
                }
            }
            ExprKind::Sizeof(arg) => {
                let ty = match arg {
                    SizeofArg::Type(ty) => *ty,
                    SizeofArg::Expr(e) => e.ty,
                };
                if ty.is_null() {
                    return None;
                }
                let bits = self.context_mut().type_size(ty.ty).ok()?;
                Some(bits / 8)
            }
            _ => None,
        }
    }
}
