//! Expression nodes.

use crate::{Name, QualType, SourceLocation};

/// Unary operator kinds. `sizeof` is not here — it gets its own node
/// since it can operate on a type name as well as an expression.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum UnaryOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddrOf,
    Deref,
    Plus,
    Minus,
    BitNot,
    LogicNot,
}

impl UnaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
            UnaryOp::AddrOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::LogicNot => "!",
        }
    }

    #[inline]
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

/// Binary operator kinds.
///
/// The ordering is meaningful: comparison operators form the contiguous
/// range `Less..=NotEq` and bitwise operators `BitAnd..=BitOr`, so the
/// operator-class predicates used by the precedence-pitfall diagnostics
/// are range checks.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Eq,
    NotEq,
    BitAnd,
    BitXor,
    BitOr,
    LogicAnd,
    LogicOr,
    Assign,
    Comma,
}

impl BinaryOp {
    #[inline]
    pub fn is_additive(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub)
    }

    #[inline]
    pub fn is_comparison(self) -> bool {
        (BinaryOp::Less..=BinaryOp::NotEq).contains(&self)
    }

    #[inline]
    pub fn is_bitwise(self) -> bool {
        (BinaryOp::BitAnd..=BinaryOp::BitOr).contains(&self)
    }

    #[inline]
    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    pub fn spelling(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicAnd => "&&",
            BinaryOp::LogicOr => "||",
            BinaryOp::Assign => "=",
            BinaryOp::Comma => ",",
        }
    }
}

/// Compiler-inserted cast classification.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CastKind {
    IntegralCast,
    FloatingCast,
    IntegralToFloating,
    LValueToRValue,
    ArrayToPointerDecay,
    FunctionToPointerDecay,
}

impl CastKind {
    pub fn spelling(self) -> &'static str {
        match self {
            CastKind::IntegralCast => "IntegralCast",
            CastKind::FloatingCast => "FloatingCast",
            CastKind::IntegralToFloating => "IntegralToFloating",
            CastKind::LValueToRValue => "LValueToRValue",
            CastKind::ArrayToPointerDecay => "ArrayToPointerDecay",
            CastKind::FunctionToPointerDecay => "FunctionToPointerDecay",
        }
    }
}

/// Argument of a `sizeof`: either an expression or a parenthesized
/// type name.
#[derive(Clone, Debug)]
pub enum SizeofArg {
    Expr(Box<Expr>),
    Type(QualType),
}

/// One expression node: kind, static type, source location.
///
/// The type is [`QualType::NULL`] when type checking could not assign one
/// (unresolved name, failed operand check); downstream code must handle
/// that rather than assume a valid handle.
///
/// `Clone` exists for the compound-assignment desugaring (`a += b`
/// duplicates `a` into the rewritten right-hand side).
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: QualType,
    pub loc: SourceLocation,
}

/// Closed set of expression variants. Constants own their literal value;
/// composite expressions own their sub-expressions.
#[derive(Clone, Debug)]
pub enum ExprKind {
    IntConst(u64),
    FloatConst(f64),
    CharConst(i32),
    StringLit(String),
    /// Reference to a declared name.
    DeclRef(Name),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Sizeof(SizeofArg),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// Compiler-inserted type-changing wrapper; the target type is the
    /// node's `ty`.
    ImplicitCast {
        cast: CastKind,
        operand: Box<Expr>,
    },
    /// User-written `(type-name) expr`; the target type is the node's `ty`.
    Cast {
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        base: Box<Expr>,
        member: Name,
        /// `true` for `->`, `false` for `.`.
        arrow: bool,
    },
    /// Brace-enclosed initializer list.
    InitList(Vec<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: QualType, loc: SourceLocation) -> Self {
        Expr { kind, ty, loc }
    }

    /// The binary operator of this node, if it is directly a binary
    /// expression. Deliberately does not see through parentheses: a
    /// parenthesized operand is evidence the programmer already resolved
    /// the precedence question, so the pitfall diagnostics must not fire.
    #[inline]
    pub fn as_binary_op(&self) -> Option<BinaryOp> {
        match &self.kind {
            ExprKind::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_range_is_exact() {
        for op in [
            BinaryOp::Less,
            BinaryOp::Greater,
            BinaryOp::LessEq,
            BinaryOp::GreaterEq,
            BinaryOp::Eq,
            BinaryOp::NotEq,
        ] {
            assert!(op.is_comparison(), "{op:?}");
            assert!(!op.is_bitwise(), "{op:?}");
        }
        assert!(!BinaryOp::LogicAnd.is_comparison());
        assert!(!BinaryOp::Add.is_comparison());
    }

    #[test]
    fn bitwise_range_is_exact() {
        for op in [BinaryOp::BitAnd, BinaryOp::BitXor, BinaryOp::BitOr] {
            assert!(op.is_bitwise(), "{op:?}");
        }
        assert!(!BinaryOp::Shl.is_bitwise());
        assert!(!BinaryOp::LogicOr.is_bitwise());
    }

    #[test]
    fn additive_and_shift_classes() {
        assert!(BinaryOp::Add.is_additive());
        assert!(BinaryOp::Sub.is_additive());
        assert!(!BinaryOp::Mul.is_additive());
        assert!(BinaryOp::Shl.is_shift());
        assert!(BinaryOp::Shr.is_shift());
        assert!(!BinaryOp::BitAnd.is_shift());
    }

    #[test]
    fn as_binary_op_does_not_see_through_parens() {
        let inner = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(Expr::new(
                    ExprKind::IntConst(1),
                    QualType::NULL,
                    SourceLocation::NONE,
                )),
                rhs: Box::new(Expr::new(
                    ExprKind::IntConst(2),
                    QualType::NULL,
                    SourceLocation::NONE,
                )),
            },
            QualType::NULL,
            SourceLocation::NONE,
        );
        assert_eq!(inner.as_binary_op(), Some(BinaryOp::Add));
        let paren = Expr::new(
            ExprKind::Paren(Box::new(inner)),
            QualType::NULL,
            SourceLocation::NONE,
        );
        assert_eq!(paren.as_binary_op(), None);
    }
}
