//! Recursive-descent parser for the Lucite C99 front end.
//!
//! The parser is a state machine over the token stream with exactly one
//! token of lookahead (`tok`). It pulls tokens from the lexer on demand,
//! asks the semantic analyzer for every type-sensitive decision, and
//! builds the AST.
//!
//! # Error recovery
//!
//! Every parse error is reported once and followed by a resynchronization
//! attempt ([`Parser::skip_until`]); the parser never aborts. Malformed
//! subtrees surface as `None` expressions or invalid-flagged declarators,
//! which downstream code checks before deriving anything.
//!
//! # Organization
//!
//! Grammar areas extend `Parser` from their own modules, the declaration
//! grammar in [`decl`], expressions in [`expr`], statements in [`stmt`].

mod decl;
mod expr;
mod stack;
mod stmt;

#[cfg(test)]
mod grammar_tests;

use lucite_diagnostic::DiagnosticEngine;
use lucite_ir::{IdentifierTable, SourceLocation, Token, TokenKind, TransUnit};
use lucite_lexer::{Lexer, SourceBuffer};
use lucite_sema::{ScopeFlags, ScopeStack, Sema};

/// The parser for one translation unit.
///
/// Owns the semantic analyzer and the scope stack; borrows the source
/// buffer, the identifier table and the diagnostic engine from the
/// driver.
pub struct Parser<'src, 'ids, 'd> {
    lexer: Lexer<'src, 'd>,
    buffer: &'src SourceBuffer,
    ids: &'ids mut IdentifierTable,
    /// The one token of lookahead. All parsing methods assume it is
    /// valid.
    tok: Token,
    /// Location of the most recently consumed token.
    prev_tok_loc: SourceLocation,
    sema: Sema<'d>,
    scopes: ScopeStack,
    diag: &'d DiagnosticEngine,
}

impl<'src, 'ids, 'd> Parser<'src, 'ids, 'd> {
    pub fn new(
        buffer: &'src SourceBuffer,
        ids: &'ids mut IdentifierTable,
        diag: &'d DiagnosticEngine,
    ) -> Self {
        let mut parser = Parser {
            lexer: Lexer::new(buffer, diag),
            buffer,
            ids,
            tok: Token::new(),
            prev_tok_loc: SourceLocation::NONE,
            sema: Sema::new(diag),
            scopes: ScopeStack::new(),
            diag,
        };
        // Prime the lookahead token.
        parser.consume_token();
        parser
    }

    /// The semantic analyzer (and through it, the type context).
    pub fn sema(&self) -> &Sema<'d> {
        &self.sema
    }

    /// Location of the most recently consumed token.
    pub fn prev_token_loc(&self) -> SourceLocation {
        self.prev_tok_loc
    }

    /// Hand the semantic analyzer back to the driver once parsing is
    /// done; the type context inside is needed to interpret the AST.
    pub fn into_sema(self) -> Sema<'d> {
        self.sema
    }

    /// Parse one whole translation unit: external declarations until
    /// EOF. Runs to completion regardless of errors.
    pub fn parse_translation_unit(&mut self) -> TransUnit {
        tracing::debug!("parse_translation_unit");
        self.enter_scope(ScopeFlags::DECL);
        let mut unit = TransUnit::default();
        while self.tok.is_not(TokenKind::Eof) {
            let before = self.tok.loc();
            unit.decls.extend(self.parse_external_declaration());
            // Guarantee progress even on unrecoverable garbage.
            if self.tok.loc() == before && self.tok.is_not(TokenKind::Eof) {
                self.consume_token();
            }
        }
        self.exit_scope();
        unit
    }

    // === Token plumbing ===

    /// Consume the current lookahead token and lex the next one.
    /// Returns the consumed token's location.
    pub(crate) fn consume_token(&mut self) -> SourceLocation {
        let consumed = self.tok.loc();
        self.prev_tok_loc = consumed;
        let Self { lexer, ids, tok, .. } = self;
        lexer.lex(ids, tok);
        consumed
    }

    /// If the lookahead is `kind`, consume it and return true; otherwise
    /// report `msg` at the lookahead and return false (consuming
    /// nothing).
    pub(crate) fn expect_and_consume(&mut self, kind: TokenKind, msg: &str) -> bool {
        if self.tok.is(kind) {
            self.consume_token();
            true
        } else {
            self.diag.error(self.tok.loc(), msg);
            false
        }
    }

    /// Read tokens until one of `kinds` is found, then consume it
    /// (unless `dont_consume`). If `stop_at_semi` is set, a `;` stops the
    /// skip without being consumed. Returns whether a target was found;
    /// EOF always stops the skip.
    pub(crate) fn skip_until(
        &mut self,
        kinds: &[TokenKind],
        stop_at_semi: bool,
        dont_consume: bool,
    ) -> bool {
        loop {
            for &kind in kinds {
                if self.tok.is(kind) {
                    if !dont_consume {
                        self.consume_token();
                    }
                    return true;
                }
            }
            match self.tok.kind() {
                TokenKind::Eof => return false,
                TokenKind::Semi if stop_at_semi => return false,
                _ => {
                    self.consume_token();
                }
            }
        }
    }

    /// Spelling of the current literal token, straight from the source
    /// buffer.
    pub(crate) fn token_text(&self) -> &'src str {
        self.buffer.text(self.tok.literal_offset(), self.tok.len())
    }

    // === Scopes ===

    pub(crate) fn enter_scope(&mut self, flags: ScopeFlags) {
        self.scopes.enter(flags);
    }

    /// Leave the current scope, notifying the semantic analyzer if the
    /// scope declared anything.
    pub(crate) fn exit_scope(&mut self) {
        let loc = self.tok.loc();
        let Self { scopes, sema, .. } = self;
        scopes.exit(|scope| {
            if !scope.decl_empty() {
                sema.act_on_pop_scope(loc, scope);
            }
        });
    }
}
