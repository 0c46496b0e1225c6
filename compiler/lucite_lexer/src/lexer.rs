//! The pull-based lexer.
//!
//! [`Lexer::lex`] produces exactly one token per call and advances the
//! cursor past it; repeated calls yield a left-to-right tokenization of
//! the buffer, terminating with an EOF token that is then returned on
//! every subsequent call without further advancement.
//!
//! Vertical whitespace and both comment forms never become tokens: they
//! restart tokenization (a loop standing in for the classic goto).
//! Lexical errors — unterminated comment or literal, empty character
//! constant, stray characters — are reported once and recovered from by
//! emitting the best-effort token computed so far; the stream never
//! aborts.

use crate::{Cursor, SourceBuffer};
use lucite_diagnostic::DiagnosticEngine;
use lucite_ir::{IdentifierTable, SourceLocation, Token, TokenKind};

#[inline]
fn is_number_body(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'.'
}

#[inline]
fn is_identifier_body(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[inline]
fn is_vertical_or_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Lexer over one source buffer.
///
/// The identifier table is passed into [`lex`](Self::lex) by the caller
/// (the parser or driver owns it); the lexer installs interned identifier
/// data and keyword classifications into the tokens it forms.
pub struct Lexer<'src, 'd> {
    /// Committed position: start of the next token.
    cursor: Cursor<'src>,
    diag: &'d DiagnosticEngine,
}

impl<'src, 'd> Lexer<'src, 'd> {
    pub fn new(buffer: &'src SourceBuffer, diag: &'d DiagnosticEngine) -> Self {
        Lexer {
            cursor: buffer.cursor(),
            diag,
        }
    }

    /// Lex one token into `tok`.
    pub fn lex(&mut self, ids: &mut IdentifierTable, tok: &mut Token) {
        tok.clear();
        // Each iteration restarts tokenization after whitespace or a
        // comment was skipped.
        loop {
            // Work on a local copy; commit to self.cursor per unit.
            let mut cur = self.cursor;

            // Fast-skip horizontal whitespace.
            if matches!(cur.current(), b' ' | b'\t') {
                cur.advance();
                while matches!(cur.current(), b' ' | b'\t') {
                    cur.advance();
                }
                self.cursor = cur;
            }

            let loc = cur.loc();
            let c = cur.bump();

            let kind = match c {
                0 => {
                    // EOF. Do not advance: later calls keep returning it.
                    tok.set_kind(TokenKind::Eof);
                    tok.set_loc(loc);
                    return;
                }
                b'?' => TokenKind::Question,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'[' => TokenKind::LSquare,
                b']' => TokenKind::RSquare,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b'~' => TokenKind::Tilde,
                b';' => TokenKind::Semi,
                b',' => TokenKind::Comma,
                b':' => {
                    if cur.current() == b'>' {
                        cur.advance();
                        TokenKind::RSquare // ':>' -> ']'
                    } else {
                        TokenKind::Colon
                    }
                }
                b'=' => {
                    if cur.current() == b'=' {
                        cur.advance();
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Equal
                    }
                }
                b'.' => {
                    if cur.current().is_ascii_digit() {
                        cur.advance();
                        return self.lex_numeric_constant(tok, cur, loc);
                    } else if cur.current() == b'.' && cur.peek() == b'.' {
                        cur.advance();
                        cur.advance();
                        TokenKind::Ellipsis
                    } else {
                        TokenKind::Period
                    }
                }
                b'&' => match cur.current() {
                    b'&' => {
                        cur.advance();
                        TokenKind::AmpAmp
                    }
                    b'=' => {
                        cur.advance();
                        TokenKind::AmpEqual
                    }
                    _ => TokenKind::Amp,
                },
                b'*' => {
                    if cur.current() == b'=' {
                        cur.advance();
                        TokenKind::StarEqual
                    } else {
                        TokenKind::Star
                    }
                }
                b'+' => match cur.current() {
                    b'+' => {
                        cur.advance();
                        TokenKind::PlusPlus
                    }
                    b'=' => {
                        cur.advance();
                        TokenKind::PlusEqual
                    }
                    _ => TokenKind::Plus,
                },
                b'-' => match cur.current() {
                    b'-' => {
                        cur.advance();
                        TokenKind::MinusMinus
                    }
                    b'>' => {
                        cur.advance();
                        TokenKind::Arrow
                    }
                    b'=' => {
                        cur.advance();
                        TokenKind::MinusEqual
                    }
                    _ => TokenKind::Minus,
                },
                b'!' => {
                    if cur.current() == b'=' {
                        cur.advance();
                        TokenKind::ExclaimEqual
                    } else {
                        TokenKind::Exclaim
                    }
                }
                b'/' => match cur.current() {
                    b'/' => {
                        cur.advance();
                        self.skip_line_comment(cur);
                        continue;
                    }
                    b'*' => {
                        cur.advance();
                        self.skip_block_comment(cur, loc);
                        continue;
                    }
                    b'=' => {
                        cur.advance();
                        TokenKind::SlashEqual
                    }
                    _ => TokenKind::Slash,
                },
                b'%' => match cur.current() {
                    b'=' => {
                        cur.advance();
                        TokenKind::PercentEqual
                    }
                    b'>' => {
                        cur.advance();
                        TokenKind::RBrace // '%>' -> '}'
                    }
                    b':' => {
                        cur.advance();
                        if cur.current() == b'%' && cur.peek() == b':' {
                            cur.advance();
                            cur.advance();
                            TokenKind::HashHash // '%:%:' -> '##'
                        } else {
                            TokenKind::Hash // '%:' -> '#'
                        }
                    }
                    _ => TokenKind::Percent,
                },
                b'<' => match (cur.current(), cur.peek()) {
                    (b'<', b'=') => {
                        cur.advance();
                        cur.advance();
                        TokenKind::LessLessEqual
                    }
                    (b'<', _) => {
                        cur.advance();
                        TokenKind::LessLess
                    }
                    (b'=', _) => {
                        cur.advance();
                        TokenKind::LessEqual
                    }
                    (b':', _) => {
                        cur.advance();
                        TokenKind::LSquare // '<:' -> '['
                    }
                    (b'%', _) => {
                        cur.advance();
                        TokenKind::LBrace // '<%' -> '{'
                    }
                    _ => TokenKind::Less,
                },
                b'>' => match (cur.current(), cur.peek()) {
                    (b'>', b'=') => {
                        cur.advance();
                        cur.advance();
                        TokenKind::GreaterGreaterEqual
                    }
                    (b'>', _) => {
                        cur.advance();
                        TokenKind::GreaterGreater
                    }
                    (b'=', _) => {
                        cur.advance();
                        TokenKind::GreaterEqual
                    }
                    _ => TokenKind::Greater,
                },
                b'^' => {
                    if cur.current() == b'=' {
                        cur.advance();
                        TokenKind::CaretEqual
                    } else {
                        TokenKind::Caret
                    }
                }
                b'|' => match cur.current() {
                    b'=' => {
                        cur.advance();
                        TokenKind::PipeEqual
                    }
                    b'|' => {
                        cur.advance();
                        TokenKind::PipePipe
                    }
                    _ => TokenKind::Pipe,
                },
                b'#' => {
                    if cur.current() == b'#' {
                        cur.advance();
                        TokenKind::HashHash
                    } else {
                        TokenKind::Hash
                    }
                }
                b'\'' => return self.lex_char_constant(tok, cur, loc),
                b'"' => return self.lex_string_literal(tok, cur, loc),
                b'\r' => {
                    if cur.current() == b'\n' {
                        cur.advance();
                    }
                    self.skip_whitespace(cur);
                    continue;
                }
                b'\n' | b' ' | b'\t' | 0x0b | 0x0c => {
                    self.skip_whitespace(cur);
                    continue;
                }
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                    return self.lex_identifier(ids, tok, cur, loc)
                }
                b'0'..=b'9' => return self.lex_numeric_constant(tok, cur, loc),
                other => {
                    self.diag
                        .error(loc, format!("unexpected character '{}'", other as char));
                    TokenKind::Unknown
                }
            };

            self.form_token(tok, cur, kind, loc);
            return;
        }
    }

    /// Fill in `tok` from the committed start up to `tok_end`, then
    /// commit the cursor.
    fn form_token(&mut self, tok: &mut Token, tok_end: Cursor<'src>, kind: TokenKind, loc: SourceLocation) {
        tok.set_len(tok_end.distance_from(&self.cursor));
        tok.set_loc(loc);
        tok.set_kind(kind);
        self.cursor = tok_end;
    }

    /// Skip a run of whitespace characters and commit.
    fn skip_whitespace(&mut self, mut cur: Cursor<'src>) {
        while is_vertical_or_space(cur.current()) {
            cur.advance();
        }
        self.cursor = cur;
    }

    /// We just read `//`. Skip to (and over) the terminating newline.
    fn skip_line_comment(&mut self, mut cur: Cursor<'src>) {
        cur.skip_to_newline_or_eof();
        if cur.current() == b'\n' {
            cur.advance();
        }
        self.cursor = cur;
    }

    /// We just read `/*`. Skip until the `*/` that terminates the
    /// comment; reaching EOF first is an error.
    fn skip_block_comment(&mut self, mut cur: Cursor<'src>, open_loc: SourceLocation) {
        let mut prev = 0u8;
        loop {
            let c = cur.current();
            if c == 0 {
                self.diag.error(open_loc, "unterminated block comment");
                break;
            }
            if c == b'/' && prev == b'*' {
                cur.advance();
                break;
            }
            prev = c;
            cur.advance();
        }
        self.cursor = cur;
    }

    /// Lex the rest of a numeric constant; the first character is behind
    /// `cur`. Accepts any run of alphanumeric-or-`.` characters plus a
    /// sign directly after an exponent marker (`1e+12`, `0x1p-3`);
    /// format validation is the classifier's job.
    fn lex_numeric_constant(&mut self, tok: &mut Token, mut cur: Cursor<'src>, loc: SourceLocation) {
        loop {
            let mut prev = 0u8;
            while is_number_body(cur.current()) {
                prev = cur.bump();
            }
            let c = cur.current();
            // A sign continues the literal only after e/E (decimal
            // exponent) or p/P (hex binary exponent).
            if matches!(c, b'+' | b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P') {
                cur.advance();
                continue;
            }
            break;
        }
        let offset = self.cursor.pos();
        self.form_token(tok, cur, TokenKind::NumericConstant, loc);
        tok.set_literal_offset(offset);
    }

    /// Lex the rest of a character constant, after the opening `'`.
    fn lex_char_constant(&mut self, tok: &mut Token, mut cur: Cursor<'src>, loc: SourceLocation) {
        let mut c = cur.current();
        if c == b'\'' {
            self.diag.error(loc, "empty character constant");
            cur.advance();
            self.form_token(tok, cur, TokenKind::Unknown, loc);
            return;
        }

        loop {
            if c == b'\\' {
                // Skip the escaped character: it cannot terminate the
                // constant.
                cur.advance();
            } else if matches!(c, b'\n' | b'\r' | 0) {
                self.diag.error(loc, "unterminated character constant");
                self.form_token(tok, cur, TokenKind::Unknown, loc);
                return;
            }
            cur.advance();
            c = cur.current();
            if c == b'\'' {
                break;
            }
        }

        let offset = self.cursor.pos();
        cur.advance(); // Consume the closing quote.
        self.form_token(tok, cur, TokenKind::CharConstant, loc);
        tok.set_literal_offset(offset);
    }

    /// Lex the rest of a string literal, after the opening `"`.
    fn lex_string_literal(&mut self, tok: &mut Token, mut cur: Cursor<'src>, loc: SourceLocation) {
        let mut c = cur.current();
        while c != b'"' {
            if c == b'\\' {
                cur.advance();
            } else if matches!(c, b'\n' | b'\r' | 0) {
                self.diag.error(loc, "unterminated string literal");
                self.form_token(tok, cur, TokenKind::Unknown, loc);
                return;
            }
            cur.advance();
            c = cur.current();
        }

        let offset = self.cursor.pos();
        cur.advance(); // Consume the closing quote.
        self.form_token(tok, cur, TokenKind::StringLiteral, loc);
        tok.set_literal_offset(offset);
    }

    /// Lex the rest of an identifier, then resolve it through the
    /// identifier table; keyword spellings come back with their keyword
    /// kind already classified.
    fn lex_identifier(
        &mut self,
        ids: &mut IdentifierTable,
        tok: &mut Token,
        mut cur: Cursor<'src>,
        loc: SourceLocation,
    ) {
        while is_identifier_body(cur.current()) {
            cur.advance();
        }
        let spelling = cur.slice_from(&self.cursor);
        let name = ids.intern(spelling);
        let kind = ids.info(name).token_kind();
        self.form_token(tok, cur, kind, loc);
        tok.set_ident(name);
    }
}
