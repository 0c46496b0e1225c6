//! Expression parsing.
//!
//! A precedence-climbing cascade of dedicated methods, matching C99's
//! grammar layer by layer: comma → assignment → conditional → logical-or
//! → … → multiplicative → cast → unary → postfix → primary. Tiers with a
//! single operator share [`Parser::parse_simple_binary`].
//!
//! Assignment is right-associative; compound assignments desugar at
//! parse time (`a += b` becomes `a = a + b`, the rewritten right-hand
//! side built as an ordinary binary-op node before being wrapped in the
//! assignment).

use crate::{stack, Parser};
use lucite_ir::{
    BinaryOp, Expr, ExprKind, QualType, SizeofArg, SourceLocation, TokenKind, UnaryOp,
};

impl<'src, 'ids, 'd> Parser<'src, 'ids, 'd> {
    /// expression: assignment-expression (',' assignment-expression)*
    pub fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_simple_binary(
            Self::parse_assignment_expression,
            TokenKind::Comma,
            BinaryOp::Comma,
        )
    }

    /// Left-associative tiers with exactly one operator: logical-or/and,
    /// the three bitwise tiers, and the top-level comma.
    fn parse_simple_binary(
        &mut self,
        term: fn(&mut Self) -> Option<Expr>,
        kind: TokenKind,
        op: BinaryOp,
    ) -> Option<Expr> {
        let mut lhs = term(self)?;
        while self.tok.is(kind) {
            let loc = self.consume_token();
            let rhs = term(self)?;
            lhs = self.act_on_binary(loc, op, lhs, rhs);
        }
        Some(lhs)
    }

    fn act_on_binary(
        &mut self,
        loc: SourceLocation,
        op: BinaryOp,
        lhs: Expr,
        rhs: Expr,
    ) -> Expr {
        let Self { sema, scopes, .. } = self;
        sema.act_on_binary_op(scopes.current(), loc, op, lhs, rhs)
    }

    /// assignment-expression: conditional-expression, optionally
    /// followed by an assignment operator and another
    /// assignment-expression (right-associative).
    pub fn parse_assignment_expression(&mut self) -> Option<Expr> {
        stack::ensure_sufficient_stack(|| self.parse_assignment_expression_inner())
    }

    fn parse_assignment_expression_inner(&mut self) -> Option<Expr> {
        let lhs = self.parse_conditional_expression()?;
        // Compound assignments carry the operator their right side
        // rewrites with.
        let op = match self.tok.kind() {
            TokenKind::Equal => BinaryOp::Assign,
            TokenKind::StarEqual => BinaryOp::Mul,
            TokenKind::SlashEqual => BinaryOp::Div,
            TokenKind::PercentEqual => BinaryOp::Rem,
            TokenKind::PlusEqual => BinaryOp::Add,
            TokenKind::MinusEqual => BinaryOp::Sub,
            TokenKind::LessLessEqual => BinaryOp::Shl,
            TokenKind::GreaterGreaterEqual => BinaryOp::Shr,
            TokenKind::AmpEqual => BinaryOp::BitAnd,
            TokenKind::CaretEqual => BinaryOp::BitXor,
            TokenKind::PipeEqual => BinaryOp::BitOr,
            // A lone conditional expression.
            _ => return Some(lhs),
        };
        let loc = self.consume_token();
        let mut rhs = self.parse_assignment_expression()?;
        // a += b  =>  a = (a + b)
        if op != BinaryOp::Assign {
            rhs = self.act_on_binary(loc, op, lhs.clone(), rhs);
        }
        Some(self.act_on_binary(loc, BinaryOp::Assign, lhs, rhs))
    }

    /// conditional-expression: logical-or ('?' expression ':'
    /// conditional-expression)?
    pub fn parse_conditional_expression(&mut self) -> Option<Expr> {
        let cond = self.parse_logical_or_expression()?;
        if self.tok.is_not(TokenKind::Question) {
            return Some(cond);
        }
        let loc = self.consume_token();
        let then_expr = self.parse_expression()?;
        if !self.expect_and_consume(TokenKind::Colon, "expected ':' in conditional expression") {
            return None;
        }
        let else_expr = self.parse_conditional_expression()?;
        // Full conditional typing would run the arithmetic conversions
        // over the arms; matching types are enough for this front end.
        let ty = if !then_expr.ty.is_null() && then_expr.ty == else_expr.ty {
            then_expr.ty
        } else {
            QualType::NULL
        };
        Some(Expr::new(
            ExprKind::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            ty,
            loc,
        ))
    }

    fn parse_logical_or_expression(&mut self) -> Option<Expr> {
        self.parse_simple_binary(
            Self::parse_logical_and_expression,
            TokenKind::PipePipe,
            BinaryOp::LogicOr,
        )
    }

    fn parse_logical_and_expression(&mut self) -> Option<Expr> {
        self.parse_simple_binary(
            Self::parse_bit_or_expression,
            TokenKind::AmpAmp,
            BinaryOp::LogicAnd,
        )
    }

    fn parse_bit_or_expression(&mut self) -> Option<Expr> {
        self.parse_simple_binary(
            Self::parse_bit_xor_expression,
            TokenKind::Pipe,
            BinaryOp::BitOr,
        )
    }

    fn parse_bit_xor_expression(&mut self) -> Option<Expr> {
        self.parse_simple_binary(
            Self::parse_bit_and_expression,
            TokenKind::Caret,
            BinaryOp::BitXor,
        )
    }

    fn parse_bit_and_expression(&mut self) -> Option<Expr> {
        self.parse_simple_binary(
            Self::parse_equality_expression,
            TokenKind::Amp,
            BinaryOp::BitAnd,
        )
    }

    fn parse_equality_expression(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_relational_expression()?;
        loop {
            let op = match self.tok.kind() {
                TokenKind::EqualEqual => BinaryOp::Eq,
                TokenKind::ExclaimEqual => BinaryOp::NotEq,
                _ => return Some(lhs),
            };
            let loc = self.consume_token();
            let rhs = self.parse_relational_expression()?;
            lhs = self.act_on_binary(loc, op, lhs, rhs);
        }
    }

    fn parse_relational_expression(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_shift_expression()?;
        loop {
            let op = match self.tok.kind() {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEq,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEq,
                _ => return Some(lhs),
            };
            let loc = self.consume_token();
            let rhs = self.parse_shift_expression()?;
            lhs = self.act_on_binary(loc, op, lhs, rhs);
        }
    }

    fn parse_shift_expression(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_additive_expression()?;
        loop {
            let op = match self.tok.kind() {
                TokenKind::LessLess => BinaryOp::Shl,
                TokenKind::GreaterGreater => BinaryOp::Shr,
                _ => return Some(lhs),
            };
            let loc = self.consume_token();
            let rhs = self.parse_additive_expression()?;
            lhs = self.act_on_binary(loc, op, lhs, rhs);
        }
    }

    fn parse_additive_expression(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_multiplicative_expression()?;
        loop {
            let op = match self.tok.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Some(lhs),
            };
            let loc = self.consume_token();
            let rhs = self.parse_multiplicative_expression()?;
            lhs = self.act_on_binary(loc, op, lhs, rhs);
        }
    }

    fn parse_multiplicative_expression(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_cast_expression()?;
        loop {
            let op = match self.tok.kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Some(lhs),
            };
            let loc = self.consume_token();
            let rhs = self.parse_cast_expression()?;
            lhs = self.act_on_binary(loc, op, lhs, rhs);
        }
    }

    /// cast-expression: '(' type-name ')' cast-expression, a compound
    /// literal, or a unary expression. The `(` is disambiguated after
    /// consumption: a type-specifier keyword or a known typedef name
    /// begins a type name.
    pub(crate) fn parse_cast_expression(&mut self) -> Option<Expr> {
        if self.tok.is_not(TokenKind::LParen) {
            return self.parse_unary_expression();
        }
        let lparen_loc = self.consume_token();

        if self.is_first_of_type_name() {
            let ty = self.parse_type_name();
            self.expect_and_consume(TokenKind::RParen, "expected ')'");
            if self.tok.is(TokenKind::LBrace) {
                // Compound literal: '(' type-name ')' '{' init-list '}'.
                let mut init = self.parse_initializer()?;
                init.ty = ty;
                return self.parse_postfix_suffix(init);
            }
            let operand = self.parse_cast_expression()?;
            return Some(Expr::new(
                ExprKind::Cast {
                    operand: Box::new(operand),
                },
                ty,
                lparen_loc,
            ));
        }

        // Plain parenthesized expression; postfix suffixes may follow.
        let inner = self.parse_expression()?;
        self.expect_and_consume(TokenKind::RParen, "expected ')'");
        let ty = inner.ty;
        let paren = Expr::new(ExprKind::Paren(Box::new(inner)), ty, lparen_loc);
        self.parse_postfix_suffix(paren)
    }

    fn parse_unary_expression(&mut self) -> Option<Expr> {
        let op = match self.tok.kind() {
            TokenKind::PlusPlus => return self.parse_prefix_inc_dec(UnaryOp::PreInc),
            TokenKind::MinusMinus => return self.parse_prefix_inc_dec(UnaryOp::PreDec),
            TokenKind::Amp => UnaryOp::AddrOf,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Exclaim => UnaryOp::LogicNot,
            TokenKind::Sizeof => return self.parse_sizeof(),
            _ => return self.parse_postfix_expression(),
        };
        let loc = self.consume_token();
        let operand = self.parse_cast_expression()?;
        Some(self.sema.act_on_unary_op(loc, op, operand))
    }

    fn parse_prefix_inc_dec(&mut self, op: UnaryOp) -> Option<Expr> {
        let loc = self.consume_token();
        let operand = self.parse_unary_expression()?;
        Some(self.sema.act_on_unary_op(loc, op, operand))
    }

    /// sizeof unary-expression | sizeof '(' type-name ')'.
    /// The result type is `unsigned long` (this target's `size_t`).
    fn parse_sizeof(&mut self) -> Option<Expr> {
        let loc = self.consume_token();
        let size_t_ty = self.sema.context().builtins.unsigned_long_ty;

        if self.tok.is(TokenKind::LParen) {
            let lparen_loc = self.consume_token();
            if self.is_first_of_type_name() {
                let ty = self.parse_type_name();
                self.expect_and_consume(TokenKind::RParen, "expected ')'");
                return Some(Expr::new(
                    ExprKind::Sizeof(SizeofArg::Type(ty)),
                    size_t_ty,
                    loc,
                ));
            }
            // sizeof (expr): the parenthesized expression is an ordinary
            // unary operand and may grow postfix suffixes.
            let inner = self.parse_expression()?;
            self.expect_and_consume(TokenKind::RParen, "expected ')'");
            let inner_ty = inner.ty;
            let paren = Expr::new(ExprKind::Paren(Box::new(inner)), inner_ty, lparen_loc);
            let operand = self.parse_postfix_suffix(paren)?;
            return Some(Expr::new(
                ExprKind::Sizeof(SizeofArg::Expr(Box::new(operand))),
                size_t_ty,
                loc,
            ));
        }

        let operand = self.parse_unary_expression()?;
        Some(Expr::new(
            ExprKind::Sizeof(SizeofArg::Expr(Box::new(operand))),
            size_t_ty,
            loc,
        ))
    }

    fn parse_postfix_expression(&mut self) -> Option<Expr> {
        let expr = self.parse_primary_expression()?;
        self.parse_postfix_suffix(expr)
    }

    /// The series of postfix suffixes: subscripts, calls, member access,
    /// postfix `++`/`--`.
    ///
    /// `a[i]` desugars to `*(a + i)` [C99 6.5.2.1p2]; the AST keeps no
    /// separate subscript node.
    pub(crate) fn parse_postfix_suffix(&mut self, mut expr: Expr) -> Option<Expr> {
        loop {
            match self.tok.kind() {
                TokenKind::LSquare => {
                    let loc = self.consume_token();
                    let index = self.parse_expression()?;
                    self.expect_and_consume(TokenKind::RSquare, "expected ']'");
                    let sum = self.act_on_binary(loc, BinaryOp::Add, expr, index);
                    expr = self.sema.act_on_unary_op(loc, UnaryOp::Deref, sum);
                }
                TokenKind::LParen => {
                    let loc = self.consume_token();
                    let mut args = Vec::new();
                    if self.tok.is_not(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_assignment_expression()?);
                            if self.tok.is(TokenKind::Comma) {
                                self.consume_token();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect_and_consume(TokenKind::RParen, "expected ')'");
                    let ty = self.call_result_type(&expr);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        ty,
                        loc,
                    );
                }
                TokenKind::Period | TokenKind::Arrow => {
                    let arrow = self.tok.is(TokenKind::Arrow);
                    let loc = self.consume_token();
                    if self.tok.is_not(TokenKind::Identifier) {
                        self.diag.error(self.tok.loc(), "expected member name");
                        return Some(expr);
                    }
                    let member = self.tok.ident().unwrap_or_default();
                    self.consume_token();
                    expr = self.sema.act_on_member_access(loc, expr, member, arrow);
                }
                TokenKind::PlusPlus => {
                    let loc = self.consume_token();
                    expr = self.sema.act_on_unary_op(loc, UnaryOp::PostInc, expr);
                }
                TokenKind::MinusMinus => {
                    let loc = self.consume_token();
                    expr = self.sema.act_on_unary_op(loc, UnaryOp::PostDec, expr);
                }
                _ => return Some(expr),
            }
        }
    }

    /// The return type of calling `callee`, through function pointers.
    fn call_result_type(&self, callee: &Expr) -> QualType {
        use lucite_ir::TypeKind;
        if callee.ty.is_null() {
            return QualType::NULL;
        }
        let mut canon = self.sema.context().canonical(callee.ty);
        if let TypeKind::Pointer(p) = &self.sema.context().ty(canon.ty).kind {
            canon = self.sema.context().canonical(p.pointee);
        }
        match &self.sema.context().ty(canon.ty).kind {
            TypeKind::Function(f) => f.ret,
            _ => QualType::NULL,
        }
    }

    fn parse_primary_expression(&mut self) -> Option<Expr> {
        match self.tok.kind() {
            TokenKind::Identifier => {
                let name = self.tok.ident().unwrap_or_default();
                let loc = self.consume_token();
                // Best-effort binding: unresolved references keep a null
                // type rather than failing the parse.
                let ty = self.sema.lookup_value(name).unwrap_or(QualType::NULL);
                Some(Expr::new(ExprKind::DeclRef(name), ty, loc))
            }
            TokenKind::NumericConstant => {
                let loc = self.tok.loc();
                let text = self.token_text();
                let ret = self.sema.act_on_numeric_constant(text, loc);
                self.consume_token();
                ret
            }
            TokenKind::CharConstant => {
                let loc = self.tok.loc();
                let text = self.token_text();
                let ret = self.sema.act_on_char_constant(text, loc);
                self.consume_token();
                ret
            }
            TokenKind::StringLiteral => self.parse_string_literals(),
            TokenKind::LParen => {
                let loc = self.consume_token();
                let inner = self.parse_expression()?;
                self.expect_and_consume(TokenKind::RParen, "expected ')'");
                let ty = inner.ty;
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), ty, loc))
            }
            _ => {
                self.diag.error(self.tok.loc(), "expected primary expression");
                None
            }
        }
    }

    /// Adjacent string literals concatenate into a single string
    /// expression (`"ab" "cd"` is one `"abcd"`).
    fn parse_string_literals(&mut self) -> Option<Expr> {
        let loc = self.tok.loc();
        let mut pieces: Vec<&'src str> = Vec::new();
        while self.tok.is(TokenKind::StringLiteral) {
            pieces.push(self.token_text());
            self.consume_token();
        }
        Some(self.sema.act_on_string_literals(&pieces, loc))
    }
}
