//! Statement parsing.
//!
//! Each construct pushes a scope flagged with the control flow it may
//! legally contain: loops are break+continue scopes, conditions live in
//! control scopes, compound statements in block scopes. `break` and
//! `continue` validate against those flags through the scope stack.

use crate::Parser;
use lucite_ir::{Stmt, StmtKind, TokenKind};
use lucite_sema::{DeclaratorContext, ScopeFlags};

impl<'src, 'ids, 'd> Parser<'src, 'ids, 'd> {
    /// statement: any of the C99 statement forms this front end models.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.tok.kind() {
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Break => {
                let loc = self.consume_token();
                if self.scopes.break_target().is_none() {
                    self.diag
                        .error(loc, "'break' statement not in loop or switch statement");
                }
                self.expect_and_consume(TokenKind::Semi, "expected ';'");
                Some(Stmt::new(StmtKind::Break, loc))
            }
            TokenKind::Continue => {
                let loc = self.consume_token();
                if self.scopes.continue_target().is_none() {
                    self.diag
                        .error(loc, "'continue' statement not in loop statement");
                }
                self.expect_and_consume(TokenKind::Semi, "expected ';'");
                Some(Stmt::new(StmtKind::Continue, loc))
            }
            TokenKind::Return => {
                let loc = self.consume_token();
                let value = if self.tok.is(TokenKind::Semi) {
                    None
                } else {
                    self.parse_expression().map(Box::new)
                };
                self.expect_and_consume(TokenKind::Semi, "expected ';'");
                Some(Stmt::new(StmtKind::Return(value), loc))
            }
            TokenKind::Semi => {
                let loc = self.consume_token();
                Some(Stmt::new(StmtKind::Null, loc))
            }
            _ if self.is_declaration_start() => Some(self.parse_declaration_statement()),
            _ => self.parse_expression_statement(),
        }
    }

    /// compound-statement: '{' statement* '}' in a fresh block scope.
    pub(crate) fn parse_compound_statement(&mut self) -> Option<Stmt> {
        let lbrace_loc = self.tok.loc();
        if !self.expect_and_consume(TokenKind::LBrace, "expected '{'") {
            return None;
        }
        self.enter_scope(ScopeFlags::DECL | ScopeFlags::BLOCK);
        let mut stmts = Vec::new();
        while self.tok.is_not(TokenKind::RBrace) && self.tok.is_not(TokenKind::Eof) {
            let before = self.tok.loc();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    // Resynchronize at the next statement boundary.
                    self.skip_until(&[TokenKind::Semi, TokenKind::RBrace], false, true);
                    if self.tok.is(TokenKind::Semi) {
                        self.consume_token();
                    }
                    if self.tok.loc() == before
                        && self.tok.is_not(TokenKind::RBrace)
                        && self.tok.is_not(TokenKind::Eof)
                    {
                        self.consume_token();
                    }
                }
            }
        }
        self.expect_and_consume(TokenKind::RBrace, "expected '}'");
        self.exit_scope();
        Some(Stmt::new(StmtKind::Compound(stmts), lbrace_loc))
    }

    fn parse_if_statement(&mut self) -> Option<Stmt> {
        let loc = self.consume_token();
        if !self.expect_and_consume(TokenKind::LParen, "expected '(' after 'if'") {
            return None;
        }
        self.enter_scope(ScopeFlags::CONTROL | ScopeFlags::DECL);
        let cond = self.parse_expression();
        self.expect_and_consume(TokenKind::RParen, "expected ')'");
        let then_stmt = self.parse_statement();
        let else_stmt = if self.tok.is(TokenKind::Else) {
            self.consume_token();
            self.parse_statement()
        } else {
            None
        };
        self.exit_scope();

        Some(Stmt::new(
            StmtKind::If {
                cond: Box::new(cond?),
                then_stmt: Box::new(then_stmt?),
                else_stmt: else_stmt.map(Box::new),
            },
            loc,
        ))
    }

    fn parse_while_statement(&mut self) -> Option<Stmt> {
        let loc = self.consume_token();
        if !self.expect_and_consume(TokenKind::LParen, "expected '(' after 'while'") {
            return None;
        }
        self.enter_scope(
            ScopeFlags::BREAK | ScopeFlags::CONTINUE | ScopeFlags::CONTROL | ScopeFlags::DECL,
        );
        let cond = self.parse_expression();
        self.expect_and_consume(TokenKind::RParen, "expected ')'");
        let body = self.parse_statement();
        self.exit_scope();

        Some(Stmt::new(
            StmtKind::While {
                cond: Box::new(cond?),
                body: Box::new(body?),
            },
            loc,
        ))
    }

    fn parse_do_statement(&mut self) -> Option<Stmt> {
        let loc = self.consume_token();
        self.enter_scope(ScopeFlags::BREAK | ScopeFlags::CONTINUE | ScopeFlags::DECL);
        let body = self.parse_statement();
        self.exit_scope();

        if !self.expect_and_consume(TokenKind::While, "expected 'while' in do/while loop") {
            return None;
        }
        if !self.expect_and_consume(TokenKind::LParen, "expected '(' after 'while'") {
            return None;
        }
        let cond = self.parse_expression();
        self.expect_and_consume(TokenKind::RParen, "expected ')'");
        self.expect_and_consume(TokenKind::Semi, "expected ';' after do/while statement");

        Some(Stmt::new(
            StmtKind::DoWhile {
                body: Box::new(body?),
                cond: Box::new(cond?),
            },
            loc,
        ))
    }

    fn parse_for_statement(&mut self) -> Option<Stmt> {
        let loc = self.consume_token();
        if !self.expect_and_consume(TokenKind::LParen, "expected '(' after 'for'") {
            return None;
        }
        self.enter_scope(
            ScopeFlags::BREAK | ScopeFlags::CONTINUE | ScopeFlags::CONTROL | ScopeFlags::DECL,
        );

        // Clause 1: declaration (which consumes its ';'), expression
        // statement, or empty.
        let init = if self.tok.is(TokenKind::Semi) {
            self.consume_token();
            None
        } else if self.is_declaration_start() {
            let decl_loc = self.tok.loc();
            let decls = self.parse_declaration(DeclaratorContext::ForInit);
            Some(Box::new(Stmt::new(StmtKind::Decl(decls), decl_loc)))
        } else {
            let expr_loc = self.tok.loc();
            let expr = self.parse_expression();
            self.expect_and_consume(TokenKind::Semi, "expected ';' in 'for' statement");
            expr.map(|e| Box::new(Stmt::new(StmtKind::Expr(Box::new(e)), expr_loc)))
        };

        let cond = if self.tok.is(TokenKind::Semi) {
            None
        } else {
            self.parse_expression().map(Box::new)
        };
        self.expect_and_consume(TokenKind::Semi, "expected ';' in 'for' statement");

        let step = if self.tok.is(TokenKind::RParen) {
            None
        } else {
            self.parse_expression().map(Box::new)
        };
        self.expect_and_consume(TokenKind::RParen, "expected ')'");

        let body = self.parse_statement();
        self.exit_scope();

        Some(Stmt::new(
            StmtKind::For {
                init,
                cond,
                step,
                body: Box::new(body?),
            },
            loc,
        ))
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let loc = self.tok.loc();
        match self.parse_expression() {
            Some(expr) => {
                self.expect_and_consume(TokenKind::Semi, "expected ';' after expression");
                Some(Stmt::new(StmtKind::Expr(Box::new(expr)), loc))
            }
            // Error already reported; the caller resynchronizes.
            None => None,
        }
    }
}
