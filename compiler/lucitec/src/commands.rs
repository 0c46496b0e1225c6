//! Driver commands: `lex` and `parse`.

use crate::dump::AstDumper;
use lucite_diagnostic::DiagnosticEngine;
use lucite_ir::{IdentifierTable, Name, Token, TokenKind};
use lucite_lexer::{Lexer, SourceBuffer};
use lucite_parse::Parser;
use std::path::Path;

/// Load a source file, interning its name for locations.
fn load(
    path: &str,
    ids: &mut IdentifierTable,
    diag: &DiagnosticEngine,
) -> Option<(SourceBuffer, Name)> {
    let file = ids.intern(path);
    diag.set_file_name(path);
    match SourceBuffer::from_file(file, Path::new(path)) {
        Ok(buffer) => Some((buffer, file)),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

/// The token's user-visible spelling: interned text for identifiers and
/// keywords, source text for literals, fixed text for punctuators.
fn token_spelling<'a>(tok: &Token, ids: &IdentifierTable, buffer: &'a SourceBuffer) -> &'a str {
    if let Some(name) = tok.ident() {
        return ids.spelling(name);
    }
    if tok.is_literal() {
        return buffer.text(tok.literal_offset(), tok.len());
    }
    tok.kind().spelling().unwrap_or("")
}

/// Tokenize a file and print the token stream, one spelling per token.
/// Returns the process exit code.
pub fn lex_file(path: &str) -> i32 {
    let diag = DiagnosticEngine::to_stderr();
    let mut ids = IdentifierTable::new();
    let Some((buffer, _)) = load(path, &mut ids, &diag) else {
        return 1;
    };

    let mut lexer = Lexer::new(&buffer, &diag);
    let mut tok = Token::new();
    let mut line = String::new();
    loop {
        lexer.lex(&mut ids, &mut tok);
        if tok.is(TokenKind::Eof) {
            break;
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token_spelling(&tok, &ids, &buffer));
    }
    println!("{line}");

    if let Some(summary) = diag.summary() {
        println!("{summary}");
    }
    i32::from(diag.has_errors())
}

/// Parse a file, dump the AST, and print the diagnostic tally.
/// Returns the process exit code.
pub fn parse_file(path: &str) -> i32 {
    let diag = DiagnosticEngine::to_stderr();
    let mut ids = IdentifierTable::new();
    let Some((buffer, _)) = load(path, &mut ids, &diag) else {
        return 1;
    };

    let mut parser = Parser::new(&buffer, &mut ids, &diag);
    let unit = parser.parse_translation_unit();
    let sema = parser.into_sema();

    let mut dumper = AstDumper::new(sema.context(), &ids);
    dumper.dump_translation_unit(&unit);
    print!("{}", dumper.finish());

    if let Some(summary) = diag.summary() {
        println!("{summary}");
    }
    i32::from(diag.has_errors())
}
