//! End-to-end tests over the whole front end: source text in, typed
//! AST and diagnostics out.

use lucite_diagnostic::{DiagnosticEngine, Severity};
use lucite_ir::{
    ArrayKind, CastKind, DeclKind, ExprKind, IdentifierTable, Name, Token, TokenKind, TypeKind,
};
use lucite_lexer::{Lexer, NumericLiteral, SourceBuffer};
use lucite_parse::Parser;

struct Parsed {
    unit: lucite_ir::TransUnit,
    sema: lucite_sema::Sema<'static>,
    diagnostics: Vec<lucite_diagnostic::Diagnostic>,
}

fn parse(src: &str) -> Parsed {
    let diag: &'static DiagnosticEngine = Box::leak(Box::new(DiagnosticEngine::buffered()));
    let mut ids = IdentifierTable::new();
    let buffer = SourceBuffer::new(Name::EMPTY, src);
    let mut parser = Parser::new(&buffer, &mut ids, diag);
    let unit = parser.parse_translation_unit();
    let sema = parser.into_sema();
    Parsed {
        unit,
        sema,
        diagnostics: diag.take_diagnostics(),
    }
}

#[test]
fn scenario_a_hex_literal_is_one_int_token() {
    // `0x1F` — one numeric-constant token, radix 16, integer kind,
    // classified type int.
    let diag = DiagnosticEngine::buffered();
    let mut ids = IdentifierTable::new();
    let buffer = SourceBuffer::new(Name::EMPTY, "0x1F");
    let mut lexer = Lexer::new(&buffer, &diag);
    let mut tok = Token::new();
    lexer.lex(&mut ids, &mut tok);
    assert_eq!(tok.kind(), TokenKind::NumericConstant);
    let text = buffer.text(tok.literal_offset(), tok.len());
    assert_eq!(text, "0x1F");
    lexer.lex(&mut ids, &mut tok);
    assert_eq!(tok.kind(), TokenKind::Eof);

    let lit = NumericLiteral::parse(text);
    assert_eq!(lit.error, None);
    assert_eq!(lit.radix(), 16);
    assert!(lit.is_integer_literal());

    let parsed = parse("int x = 0x1F;");
    assert!(parsed.diagnostics.is_empty());
    let DeclKind::Var(var) = &parsed.unit.decls[0].kind else {
        panic!("expected variable");
    };
    let Some(init) = var.init.as_deref() else {
        panic!("expected initializer");
    };
    assert_eq!(init.ty, parsed.sema.context().builtins.int_ty);
    assert!(matches!(init.kind, ExprKind::IntConst(0x1F)));
}

#[test]
fn scenario_b_shift_groups_additive_and_warns() {
    // `1 << 2 + 4` parses as `1 << (2 + 4)` with a warning naming '+'.
    let parsed = parse("int x = 1 << 2 + 4;");
    let warnings: Vec<_> = parsed
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].message,
        "'<<' has lower precedence than '+', '+' will be evaluated first"
    );

    let DeclKind::Var(var) = &parsed.unit.decls[0].kind else {
        panic!("expected variable");
    };
    let Some(init) = var.init.as_deref() else {
        panic!("expected initializer");
    };
    let ExprKind::Binary { op, rhs, .. } = &init.kind else {
        panic!("expected binary initializer");
    };
    assert_eq!(*op, lucite_ir::BinaryOp::Shl);
    assert_eq!(rhs.as_binary_op(), Some(lucite_ir::BinaryOp::Add));
}

#[test]
fn scenario_c_record_fields_share_base_spec() {
    // `struct { int a:1; int b:7; }` yields two fields with bit-widths
    // 1 and 7 sharing one base specifier.
    let parsed = parse("struct bits { int a:1; int b:7; };");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let DeclKind::Record { ty } = &parsed.unit.decls[0].kind else {
        panic!("expected record declaration");
    };
    let TypeKind::Record(record) = &parsed.sema.context().ty(*ty).kind else {
        panic!("expected record type");
    };
    let int_ty = parsed.sema.context().builtins.int_ty;
    assert_eq!(record.fields.len(), 2);
    for field in &record.fields {
        assert_eq!(field.ty, int_ty);
    }
    let widths: Vec<u64> = record
        .fields
        .iter()
        .map(|f| match f.bit_width.as_deref() {
            Some(expr) => match expr.kind {
                ExprKind::IntConst(v) => v,
                _ => panic!("expected constant width"),
            },
            None => panic!("expected bit width"),
        })
        .collect();
    assert_eq!(widths, vec![1, 7]);
}

#[test]
fn scenario_d_string_concatenation() {
    // `"ab" "cd"` lexes as two tokens but parses as one string of
    // content "abcd" with type char[5].
    let parsed = parse("char *s = \"ab\" \"cd\";");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let DeclKind::Var(var) = &parsed.unit.decls[0].kind else {
        panic!("expected variable");
    };
    let Some(init) = var.init.as_deref() else {
        panic!("expected initializer");
    };
    let ExprKind::StringLit(content) = &init.kind else {
        panic!("expected string literal, got {:?}", init.kind);
    };
    assert_eq!(content, "abcd");
    let TypeKind::Array(arr) = &parsed.sema.context().ty(init.ty.ty).kind else {
        panic!("expected array type");
    };
    assert!(matches!(arr.kind, ArrayKind::Constant(5)));
    assert_eq!(arr.elem, parsed.sema.context().builtins.char_ty);
}

#[test]
fn scenario_e_long_double_forces_conversion() {
    // `unsigned long long x = 3.14L + 114;` — the long double operand
    // forces the usual arithmetic conversion; the integer operand is
    // wrapped in an integral-to-floating implicit cast.
    let parsed = parse("unsigned long long x = 3.14L + 114;");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let DeclKind::Var(var) = &parsed.unit.decls[0].kind else {
        panic!("expected variable");
    };
    assert_eq!(
        var.ty,
        parsed.sema.context().builtins.unsigned_long_long_ty
    );
    let Some(init) = var.init.as_deref() else {
        panic!("expected initializer");
    };
    let long_double = parsed.sema.context().builtins.long_double_ty;
    assert_eq!(init.ty, long_double);
    let ExprKind::Binary { lhs, rhs, .. } = &init.kind else {
        panic!("expected binary initializer");
    };
    assert!(matches!(lhs.kind, ExprKind::FloatConst(_)));
    let ExprKind::ImplicitCast { cast, operand } = &rhs.kind else {
        panic!("expected implicit cast, got {:?}", rhs.kind);
    };
    assert_eq!(*cast, CastKind::IntegralToFloating);
    assert_eq!(rhs.ty, long_double);
    assert!(matches!(operand.kind, ExprKind::IntConst(114)));
}

#[test]
fn comment_only_round_trip_is_a_single_eof() {
    // Tokenizing comment-and-whitespace-only input yields exactly one
    // EOF token.
    let diag = DiagnosticEngine::buffered();
    let mut ids = IdentifierTable::new();
    let buffer = SourceBuffer::new(Name::EMPTY, "  /* only */ // comments\n\t \n");
    let mut lexer = Lexer::new(&buffer, &diag);
    let mut tok = Token::new();
    lexer.lex(&mut ids, &mut tok);
    assert_eq!(tok.kind(), TokenKind::Eof);
    assert_eq!(diag.error_count(), 0);
}

#[test]
fn whole_unit_with_errors_still_reaches_the_end() {
    // Diagnostics accumulate across the unit; parsing never stops at
    // the first error.
    let parsed = parse(
        "int a = ;\n\
         long b = 2;\n\
         struct s { int x:1; };\n\
         unsigned c = 0xFF;\n",
    );
    assert!(!parsed.diagnostics.is_empty());
    // The well-formed declarations all survived.
    let vars: Vec<_> = parsed
        .unit
        .decls
        .iter()
        .filter(|d| matches!(d.kind, DeclKind::Var(_)))
        .collect();
    assert!(vars.len() >= 3, "got {} declarations", vars.len());
}

#[test]
fn typedefs_resolve_through_the_whole_pipeline() {
    let parsed = parse(
        "typedef unsigned long word;\n\
         typedef word *word_ptr;\n\
         word w = 3;\n\
         word_ptr p;\n",
    );
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let DeclKind::Var(w) = &parsed.unit.decls[2].kind else {
        panic!("expected w");
    };
    let canon = parsed.sema.context().canonical(w.ty);
    assert_eq!(canon, parsed.sema.context().builtins.unsigned_long_ty);

    let DeclKind::Var(p) = &parsed.unit.decls[3].kind else {
        panic!("expected p");
    };
    let canon = parsed.sema.context().canonical(p.ty);
    let TypeKind::Pointer(ptr) = &parsed.sema.context().ty(canon.ty).kind else {
        panic!("expected pointer canonical type");
    };
    let pointee_canon = parsed.sema.context().canonical(ptr.pointee);
    assert_eq!(
        pointee_canon,
        parsed.sema.context().builtins.unsigned_long_ty
    );
}

#[test]
fn functions_parse_with_bodies_and_calls() {
    let parsed = parse(
        "int square(int n) { return n * n; }\n\
         int main(void) {\n\
             int total;\n\
             total = square(7);\n\
             return total;\n\
         }\n",
    );
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.unit.decls.len(), 2);
    for decl in &parsed.unit.decls {
        let DeclKind::Function(f) = &decl.kind else {
            panic!("expected function");
        };
        assert!(f.body.is_some());
    }
}
