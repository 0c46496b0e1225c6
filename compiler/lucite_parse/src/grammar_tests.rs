//! Grammar-level tests driving the whole front end over source text.

use crate::Parser;
use lucite_diagnostic::{Diagnostic, DiagnosticEngine};
use lucite_ir::{
    ArrayKind, BinaryOp, CastKind, Decl, DeclKind, Expr, ExprKind, IdentifierTable, Name,
    StmtKind, TypeKind, UnaryOp,
};
use lucite_lexer::SourceBuffer;
use lucite_sema::Sema;
use pretty_assertions::assert_eq;

/// Run `f` over a parser for `src`; returns its result plus the
/// diagnostics and the sema (for type inspection).
fn with_source<R>(
    src: &str,
    f: impl for<'a, 'b, 'c> FnOnce(&mut Parser<'a, 'b, 'c>) -> R,
) -> (R, Vec<Diagnostic>, SemaBox) {
    let diag: &'static DiagnosticEngine = Box::leak(Box::new(DiagnosticEngine::buffered()));
    let mut ids = IdentifierTable::new();
    let buffer = SourceBuffer::new(Name::EMPTY, src);
    let mut parser = Parser::new(&buffer, &mut ids, diag);
    let out = f(&mut parser);
    let sema = parser.into_sema();
    let diags = diag.take_diagnostics();
    (out, diags, SemaBox { sema })
}

/// Keeps the sema alive past the parser for type queries in assertions.
struct SemaBox {
    sema: Sema<'static>,
}

fn parse_expr(src: &str) -> (Option<Expr>, Vec<Diagnostic>, SemaBox) {
    with_source(src, |p| {
        p.enter_scope(lucite_sema::ScopeFlags::DECL);
        p.parse_expression()
    })
}

fn parse_unit(src: &str) -> (Vec<Decl>, Vec<Diagnostic>, SemaBox) {
    let (unit, diags, sema) = with_source(src, |p| p.parse_translation_unit());
    (unit.decls, diags, sema)
}

fn expr_or_panic(expr: Option<Expr>) -> Expr {
    match expr {
        Some(e) => e,
        None => panic!("expression failed to parse"),
    }
}

// === Expressions ===

#[test]
fn additive_is_left_associative() {
    let (expr, diags, _) = parse_expr("1 - 2 + 3");
    assert!(diags.is_empty(), "{diags:?}");
    let expr = expr_or_panic(expr);
    // ((1 - 2) + 3)
    let ExprKind::Binary { op: BinaryOp::Add, lhs, .. } = expr.kind else {
        panic!("expected +, got {:?}", expr.kind);
    };
    assert_eq!(lhs.as_binary_op(), Some(BinaryOp::Sub));
}

#[test]
fn precedence_layers_nest_correctly() {
    let (expr, _, _) = parse_expr("1 + 2 * 3");
    let expr = expr_or_panic(expr);
    let ExprKind::Binary { op: BinaryOp::Add, rhs, .. } = expr.kind else {
        panic!("expected + at the top");
    };
    assert_eq!(rhs.as_binary_op(), Some(BinaryOp::Mul));
}

#[test]
fn shift_binds_looser_than_additive_and_warns() {
    // Scenario: 1 << 2 + 4 parses as 1 << (2 + 4) and warns that '+'
    // binds tighter.
    let (expr, diags, _) = parse_expr("1 << 2 + 4");
    let expr = expr_or_panic(expr);
    let ExprKind::Binary { op: BinaryOp::Shl, rhs, .. } = expr.kind else {
        panic!("expected << at the top, got {:?}", expr.kind);
    };
    assert_eq!(rhs.as_binary_op(), Some(BinaryOp::Add));
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].message,
        "'<<' has lower precedence than '+', '+' will be evaluated first"
    );
}

#[test]
fn bitwise_comparison_pitfall_warns() {
    let (_, diags, _) = parse_expr("1 & 2 == 0");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("'&' has lower precedence than '=='"));
}

#[test]
fn parenthesized_pitfall_stays_silent() {
    let (_, diags, _) = parse_expr("1 << (2 + 4)");
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn compound_assignment_desugars() {
    // a += b  =>  a = (a + b)
    let (expr, _, _) = parse_expr("a += 1");
    let expr = expr_or_panic(expr);
    let ExprKind::Binary { op: BinaryOp::Assign, lhs, rhs } = expr.kind else {
        panic!("expected assignment at the top, got {:?}", expr.kind);
    };
    assert!(matches!(lhs.kind, ExprKind::DeclRef(_)));
    let ExprKind::Binary { op: BinaryOp::Add, lhs: inner_lhs, .. } = rhs.kind else {
        panic!("expected rewritten +, got {:?}", rhs.kind);
    };
    assert!(matches!(inner_lhs.kind, ExprKind::DeclRef(_)));
}

#[test]
fn assignment_is_right_associative() {
    let (expr, _, _) = parse_expr("a = b = 1");
    let expr = expr_or_panic(expr);
    let ExprKind::Binary { op: BinaryOp::Assign, rhs, .. } = expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(rhs.as_binary_op(), Some(BinaryOp::Assign));
}

#[test]
fn ternary_requires_colon() {
    let (expr, diags, _) = parse_expr("1 ? 2 : 3");
    let expr = expr_or_panic(expr);
    assert!(matches!(expr.kind, ExprKind::Ternary { .. }));
    assert!(diags.is_empty());

    let (expr, diags, _) = parse_expr("1 ? 2 ; 3");
    assert!(expr.is_none());
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("expected ':'"));
}

#[test]
fn subscript_desugars_to_deref_of_addition() {
    let (expr, _, _) = parse_expr("a[3]");
    let expr = expr_or_panic(expr);
    let ExprKind::Unary { op: UnaryOp::Deref, operand } = expr.kind else {
        panic!("expected deref, got {:?}", expr.kind);
    };
    assert_eq!(operand.as_binary_op(), Some(BinaryOp::Add));
}

#[test]
fn call_and_member_postfix() {
    let (expr, _, _) = parse_expr("f(1, 2).x->y");
    let expr = expr_or_panic(expr);
    let ExprKind::Member { base, arrow: true, .. } = expr.kind else {
        panic!("expected ->, got {:?}", expr.kind);
    };
    let ExprKind::Member { base, arrow: false, .. } = base.kind else {
        panic!("expected .");
    };
    let ExprKind::Call { args, .. } = base.kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
}

#[test]
fn string_literals_concatenate_with_nul_sized_array() {
    // Scenario: "ab" "cd" lexes as two tokens but parses into one
    // string expression of content "abcd" and type char[5].
    let (expr, diags, ctx) = parse_expr("\"ab\" \"cd\"");
    assert!(diags.is_empty());
    let expr = expr_or_panic(expr);
    let ExprKind::StringLit(content) = &expr.kind else {
        panic!("expected string literal, got {:?}", expr.kind);
    };
    assert_eq!(content, "abcd");
    match &ctx.sema.context().ty(expr.ty.ty).kind {
        TypeKind::Array(arr) => assert!(matches!(arr.kind, ArrayKind::Constant(5))),
        other => panic!("expected array type, got {other:?}"),
    }
}

#[test]
fn sizeof_expression_and_type_name() {
    let (expr, _, _) = parse_expr("sizeof x");
    assert!(matches!(
        expr_or_panic(expr).kind,
        ExprKind::Sizeof(lucite_ir::SizeofArg::Expr(_))
    ));

    let (expr, diags, ctx) = parse_expr("sizeof (unsigned long)");
    assert!(diags.is_empty(), "{diags:?}");
    let expr = expr_or_panic(expr);
    let ExprKind::Sizeof(lucite_ir::SizeofArg::Type(ty)) = expr.kind else {
        panic!("expected sizeof(type)");
    };
    assert_eq!(ty, ctx.sema.context().builtins.unsigned_long_ty);
}

#[test]
fn cast_expression_builds_a_cast_node() {
    let (expr, diags, ctx) = parse_expr("(long) 1");
    assert!(diags.is_empty(), "{diags:?}");
    let expr = expr_or_panic(expr);
    assert!(matches!(expr.kind, ExprKind::Cast { .. }));
    assert_eq!(expr.ty, ctx.sema.context().builtins.long_ty);
}

#[test]
fn usual_arithmetic_conversion_happens_in_expressions() {
    // int + long double: the int side gains an IntegralToFloating cast.
    let (expr, _, ctx) = parse_expr("114 + 3.14L");
    let expr = expr_or_panic(expr);
    assert_eq!(expr.ty, ctx.sema.context().builtins.long_double_ty);
    let ExprKind::Binary { lhs, .. } = expr.kind else {
        panic!("expected binary node");
    };
    let ExprKind::ImplicitCast { cast, .. } = lhs.kind else {
        panic!("expected implicit cast around the int operand, got {:?}", lhs.kind);
    };
    assert_eq!(cast, CastKind::IntegralToFloating);
}

#[test]
fn hex_literal_scenario() {
    // Scenario: 0x1F — one numeric-constant token, radix 16, integer
    // kind, type int.
    let (expr, diags, ctx) = parse_expr("0x1F");
    assert!(diags.is_empty());
    let expr = expr_or_panic(expr);
    assert!(matches!(expr.kind, ExprKind::IntConst(0x1F)));
    assert_eq!(expr.ty, ctx.sema.context().builtins.int_ty);
}

// === Declarations ===

fn single_var(decls: &[Decl]) -> &lucite_ir::VarDecl {
    match decls {
        [Decl { kind: DeclKind::Var(v), .. }] => v,
        other => panic!("expected one variable declaration, got {other:?}"),
    }
}

#[test]
fn scenario_unsigned_long_long_with_float_init() {
    // unsigned long long x = 3.14L + 114;
    let (decls, diags, ctx) = parse_unit("unsigned long long x = 3.14L + 114;");
    assert!(diags.is_empty(), "{diags:?}");
    let var = single_var(&decls);
    assert_eq!(var.ty, ctx.sema.context().builtins.unsigned_long_long_ty);
    let init = var.init.as_deref().unwrap_or_else(|| panic!("missing init"));
    assert_eq!(init.ty, ctx.sema.context().builtins.long_double_ty);
    let ExprKind::Binary { rhs, .. } = &init.kind else {
        panic!("expected binary init");
    };
    assert!(matches!(
        rhs.kind,
        ExprKind::ImplicitCast { cast: CastKind::IntegralToFloating, .. }
    ));
}

#[test]
fn pointer_and_array_declarators() {
    let (decls, diags, ctx) = parse_unit("int *p[4];");
    assert!(diags.is_empty(), "{diags:?}");
    let var = single_var(&decls);
    // Array of four pointers to int.
    match &ctx.sema.context().ty(var.ty.ty).kind {
        TypeKind::Array(arr) => {
            assert!(matches!(arr.kind, ArrayKind::Constant(4)));
            assert!(matches!(
                ctx.sema.context().ty(arr.elem.ty).kind,
                TypeKind::Pointer(_)
            ));
        }
        other => panic!("expected array, got {other:?}"),
    }

    let (decls, diags, ctx) = parse_unit("int (*q)[4];");
    assert!(diags.is_empty(), "{diags:?}");
    let var = single_var(&decls);
    // Pointer to array of four ints.
    match &ctx.sema.context().ty(var.ty.ty).kind {
        TypeKind::Pointer(p) => {
            assert!(matches!(
                ctx.sema.context().ty(p.pointee.ty).kind,
                TypeKind::Array(_)
            ));
        }
        other => panic!("expected pointer, got {other:?}"),
    }
}

#[test]
fn one_spec_many_declarators() {
    let (decls, diags, ctx) = parse_unit("int a, *b, c[2];");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(decls.len(), 3);
    let tys: Vec<&TypeKind> = decls
        .iter()
        .map(|d| match &d.kind {
            DeclKind::Var(v) => &ctx.sema.context().ty(v.ty.ty).kind,
            other => panic!("expected var, got {other:?}"),
        })
        .collect();
    assert!(matches!(tys[0], TypeKind::Arith(_)));
    assert!(matches!(tys[1], TypeKind::Pointer(_)));
    assert!(matches!(tys[2], TypeKind::Array(_)));
}

#[test]
fn struct_bitfields_share_one_spec() {
    // Scenario: struct { int a:1; int b:7; } yields a record with two
    // fields of bit-widths 1 and 7 — and `int a, b:3;` shares the base
    // spec across the comma list.
    let (decls, diags, ctx) = parse_unit("struct s { int a:1; int b:7; };");
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Record { ty }, .. }] = decls.as_slice() else {
        panic!("expected record declaration, got {decls:?}");
    };
    let TypeKind::Record(record) = &ctx.sema.context().ty(*ty).kind else {
        panic!("expected record type");
    };
    assert!(record.complete);
    assert_eq!(record.fields.len(), 2);
    assert!(record.fields.iter().all(|f| f.bit_width.is_some()));
    let int_ty = ctx.sema.context().builtins.int_ty;
    assert!(record.fields.iter().all(|f| f.ty == int_ty));

    let widths: Vec<u64> = record
        .fields
        .iter()
        .map(|f| match f.bit_width.as_deref() {
            Some(Expr { kind: ExprKind::IntConst(v), .. }) => *v,
            other => panic!("expected constant bit width, got {other:?}"),
        })
        .collect();
    assert_eq!(widths, vec![1, 7]);
}

#[test]
fn comma_list_with_bitfield_shares_spec() {
    let (decls, diags, ctx) = parse_unit("struct s { int a, b:3; };");
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Record { ty }, .. }] = decls.as_slice() else {
        panic!("expected record declaration");
    };
    let TypeKind::Record(record) = &ctx.sema.context().ty(*ty).kind else {
        panic!("expected record type");
    };
    assert_eq!(record.fields.len(), 2);
    let int_ty = ctx.sema.context().builtins.int_ty;
    assert_eq!(record.fields[0].ty, int_ty);
    assert!(record.fields[0].bit_width.is_none());
    assert_eq!(record.fields[1].ty, int_ty);
    assert!(record.fields[1].bit_width.is_some());
}

#[test]
fn forward_reference_creates_incomplete_record() {
    let (decls, diags, ctx) = parse_unit("struct node *head;");
    assert!(diags.is_empty(), "{diags:?}");
    let var = single_var(&decls);
    let TypeKind::Pointer(p) = &ctx.sema.context().ty(var.ty.ty).kind else {
        panic!("expected pointer");
    };
    let TypeKind::Record(record) = &ctx.sema.context().ty(p.pointee.ty).kind else {
        panic!("expected record pointee");
    };
    assert!(!record.complete);
}

#[test]
fn record_definition_completes_earlier_forward_decl() {
    let (decls, diags, ctx) =
        parse_unit("struct node; struct node { int v; }; struct node n;");
    assert!(diags.is_empty(), "{diags:?}");
    let var = match &decls.last().map(|d| &d.kind) {
        Some(DeclKind::Var(v)) => v,
        other => panic!("expected trailing var, got {other:?}"),
    };
    let TypeKind::Record(record) = &ctx.sema.context().ty(var.ty.ty).kind else {
        panic!("expected record type");
    };
    assert!(record.complete);
    assert_eq!(record.fields.len(), 1);
}

#[test]
fn typedef_names_become_type_specifiers() {
    let (decls, diags, ctx) = parse_unit("typedef unsigned long size_type; size_type n;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(decls.len(), 2);
    let var = match &decls[1].kind {
        DeclKind::Var(v) => v,
        other => panic!("expected var, got {other:?}"),
    };
    // The variable's type is the typedef sugar; its canonical type is
    // unsigned long.
    let canon = ctx.sema.context().canonical(var.ty);
    assert_eq!(canon, ctx.sema.context().builtins.unsigned_long_ty);
}

#[test]
fn typedef_does_not_leak_into_member_names() {
    // `typedef int X;` then a member named X must not misparse as a
    // nested type specifier.
    let (decls, diags, ctx) = parse_unit("typedef int X; struct s { short X; };");
    assert!(diags.is_empty(), "{diags:?}");
    let [_, Decl { kind: DeclKind::Record { ty }, .. }] = decls.as_slice() else {
        panic!("expected typedef then record");
    };
    let TypeKind::Record(record) = &ctx.sema.context().ty(*ty).kind else {
        panic!("expected record type");
    };
    assert_eq!(record.fields.len(), 1);
    assert_eq!(record.fields[0].ty, ctx.sema.context().builtins.short_ty);
}

#[test]
fn enum_definitions_bind_constants_as_ints() {
    let (decls, diags, ctx) = parse_unit("enum color { RED, GREEN = 2, BLUE, };");
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Enum { ty }, .. }] = decls.as_slice() else {
        panic!("expected enum declaration, got {decls:?}");
    };
    let TypeKind::Enum(e) = &ctx.sema.context().ty(*ty).kind else {
        panic!("expected enum type");
    };
    assert_eq!(e.enumerators.len(), 3);
    assert_eq!(e.underlying, ctx.sema.context().builtins.int_ty);
    assert!(e.enumerators[1].value.is_some());
}

#[test]
fn enum_forward_reference_is_an_error() {
    let (_, diags, _) = parse_unit("enum missing *p;");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("forward references to 'enum'"));
}

#[test]
fn function_definition_with_body() {
    let (decls, diags, ctx) = parse_unit(
        "int add(int a, int b) { return a + b; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Function(f), .. }] = decls.as_slice() else {
        panic!("expected function, got {decls:?}");
    };
    assert_eq!(f.params.len(), 2);
    assert!(f.body.is_some());
    let TypeKind::Function(fty) = &ctx.sema.context().ty(f.ty.ty).kind else {
        panic!("expected function type");
    };
    assert_eq!(fty.ret, ctx.sema.context().builtins.int_ty);
    assert_eq!(fty.params.len(), 2);
}

#[test]
fn prototype_with_void_takes_no_parameters() {
    let (decls, diags, ctx) = parse_unit("int f(void);");
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Function(f), .. }] = decls.as_slice() else {
        panic!("expected function prototype");
    };
    assert!(f.body.is_none());
    let TypeKind::Function(fty) = &ctx.sema.context().ty(f.ty.ty).kind else {
        panic!("expected function type");
    };
    assert!(fty.params.is_empty());
}

#[test]
fn variadic_prototype() {
    let (decls, diags, ctx) = parse_unit("int printf(const char *fmt, ...);");
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Function(f), .. }] = decls.as_slice() else {
        panic!("expected function prototype");
    };
    let TypeKind::Function(fty) = &ctx.sema.context().ty(f.ty.ty).kind else {
        panic!("expected function type");
    };
    assert!(fty.variadic);
    assert_eq!(fty.params.len(), 1);
}

// === Statements ===

#[test]
fn statements_parse_inside_function_bodies() {
    let (decls, diags, _) = parse_unit(
        "int main(void) {\n\
         \x20   int i;\n\
         \x20   for (i = 0; i < 10; i++) {\n\
         \x20       if (i == 5) { break; } else { continue; }\n\
         \x20   }\n\
         \x20   while (i) { i--; }\n\
         \x20   do { i++; } while (i < 3);\n\
         \x20   return 0;\n\
         }\n",
    );
    assert!(diags.is_empty(), "{diags:?}");
    let [Decl { kind: DeclKind::Function(f), .. }] = decls.as_slice() else {
        panic!("expected function");
    };
    let Some(body) = f.body.as_deref() else {
        panic!("expected body");
    };
    let StmtKind::Compound(stmts) = &body.kind else {
        panic!("expected compound body");
    };
    assert_eq!(stmts.len(), 5);
}

#[test]
fn break_outside_loop_is_an_error() {
    let (_, diags, _) = parse_unit("int main(void) { break; return 0; }");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("'break' statement not in loop"));
}

#[test]
fn continue_binds_to_innermost_loop() {
    let (_, diags, _) = parse_unit(
        "int main(void) { while (1) { while (2) { continue; } break; } return 0; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

// === Error recovery ===

#[test]
fn malformed_declaration_recovers_at_semicolon() {
    let (decls, diags, _) = parse_unit("int 42; long y;");
    assert!(!diags.is_empty());
    // The second declaration still parses.
    assert!(decls
        .iter()
        .any(|d| matches!(&d.kind, DeclKind::Var(v) if v.init.is_none())));
}

#[test]
fn duplicate_specifiers_do_not_stop_the_scan() {
    let (decls, diags, ctx) = parse_unit("unsigned signed int x;");
    assert_eq!(diags.len(), 1);
    // The scan kept the first sign and still produced a declaration.
    let var = single_var(&decls);
    assert_eq!(var.ty, ctx.sema.context().builtins.unsigned_int_ty);
}

#[test]
fn missing_member_name_is_reported_with_context() {
    let (_, diags, _) = parse_unit("struct s { int *; };");
    assert!(diags
        .iter()
        .any(|d| d.message.contains("expected member name or semicolon")));
}

#[test]
fn member_free_specifier_warns_unless_it_is_a_lone_tag() {
    let (_, diags, _) = parse_unit("struct s { int; int a; };");
    assert!(diags
        .iter()
        .any(|d| d.message.contains("does not declare a member")));

    // A tag standing alone is permitted.
    let (_, diags, _) = parse_unit("struct outer { struct inner; int a; };");
    assert!(!diags
        .iter()
        .any(|d| d.message.contains("does not declare a member")));
}

#[test]
fn unterminated_input_reaches_eof_without_hanging() {
    let (_, diags, _) = parse_unit("int x = ");
    assert!(!diags.is_empty());
}

#[test]
fn keyword_classification_flows_from_the_identifier_table() {
    // `while` in expression position is a parse error, not an
    // identifier.
    let (expr, diags, _) = parse_expr("while");
    assert!(expr.is_none());
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("expected primary expression"));
}
