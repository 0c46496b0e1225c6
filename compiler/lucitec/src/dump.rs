//! AST dumper.
//!
//! The out-of-core consumer of the front end's output: walks the tree by
//! matching over the closed node sets and renders one line per node with
//! `|--`/`` `-- `` branch prefixes.
//!
//! Types render in C's two-part declarator form — a prefix and a suffix
//! around the (absent) name — so `int (*)[4]` and `int *[4]` come out
//! readable.

use lucite_ir::{
    ArrayKind, Decl, DeclKind, Expr, ExprKind, IdentifierTable, Name, QualType, SizeofArg, Stmt,
    StmtKind, TransUnit, TypeKind,
};
use lucite_types::TypeContext;
use std::fmt::Write;

/// Render the two-part C spelling of a type.
pub fn type_repr(ctx: &TypeContext, ty: QualType) -> (String, String) {
    if ty.is_null() {
        return ("<null>".to_owned(), String::new());
    }
    let mut prefix = String::new();
    if ty.is_const_qualified() {
        prefix.push_str("const ");
    }
    if ty.is_volatile_qualified() {
        prefix.push_str("volatile ");
    }
    if ty.is_restrict_qualified() {
        prefix.push_str("restrict ");
    }
    let (inner_prefix, suffix) = type_repr_inner(ctx, ty);
    prefix.push_str(&inner_prefix);
    (prefix, suffix)
}

fn type_repr_inner(ctx: &TypeContext, ty: QualType) -> (String, String) {
    match &ctx.ty(ty.ty).kind {
        TypeKind::Void => ("void".to_owned(), String::new()),
        TypeKind::Arith(kind) => (kind.spelling().to_owned(), String::new()),
        TypeKind::Pointer(p) => {
            let (mut prefix, mut suffix) = type_repr(ctx, p.pointee);
            if !prefix.ends_with(['*', ' ']) {
                prefix.push(' ');
            }
            // Parenthesize so 'int (*)[4]' keeps its meaning.
            if ctx.ty(ctx.canonical(p.pointee).ty).is_array() {
                prefix.push('(');
                suffix.insert(0, ')');
            }
            prefix.push('*');
            (prefix, suffix)
        }
        TypeKind::Array(a) => {
            let (prefix, mut suffix) = type_repr(ctx, a.elem);
            let dim = match a.kind {
                ArrayKind::Constant(n) => format!("[{n}]"),
                ArrayKind::Variable => "[*]".to_owned(),
            };
            suffix.insert_str(0, &dim);
            (prefix, suffix)
        }
        TypeKind::Function(f) => {
            let (prefix, mut suffix) = type_repr(ctx, f.ret);
            let mut params = String::from("(");
            for (i, &p) in f.params.iter().enumerate() {
                if i > 0 {
                    params.push_str(", ");
                }
                let (pp, ps) = type_repr(ctx, p);
                params.push_str(&pp);
                params.push_str(&ps);
            }
            if f.variadic {
                if !f.params.is_empty() {
                    params.push_str(", ");
                }
                params.push_str("...");
            }
            if f.params.is_empty() && !f.variadic {
                params.push_str("void");
            }
            params.push(')');
            suffix.insert_str(0, &params);
            (prefix, suffix)
        }
        TypeKind::Record(r) => (format!("{} {}", r.kind.spelling(), "<tag>"), String::new()),
        TypeKind::Enum(_) => ("enum <tag>".to_owned(), String::new()),
        TypeKind::Typedef(t) => type_repr(ctx, t.aliased),
    }
}

/// One-string form of [`type_repr`].
pub fn type_spelling(ctx: &TypeContext, ty: QualType) -> String {
    let (prefix, suffix) = type_repr(ctx, ty);
    format!("{prefix}{suffix}")
}

/// Dumps a tree into a string, one node per line with branch prefixes.
pub struct AstDumper<'a> {
    ctx: &'a TypeContext,
    ids: &'a IdentifierTable,
    out: String,
    /// Indentation of every line below the current node.
    prefix: String,
}

impl<'a> AstDumper<'a> {
    pub fn new(ctx: &'a TypeContext, ids: &'a IdentifierTable) -> Self {
        AstDumper {
            ctx,
            ids,
            out: String::new(),
            prefix: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn name(&self, name: Name) -> &str {
        if name == Name::EMPTY {
            "<anonymous>"
        } else {
            self.ids.spelling(name)
        }
    }

    fn ty(&self, ty: QualType) -> String {
        type_spelling(self.ctx, ty)
    }

    fn child(&mut self, dump: impl FnOnce(&mut Self)) {
        let _ = write!(self.out, "{}|--", self.prefix);
        self.prefix.push_str("|  ");
        dump(self);
        self.prefix.truncate(self.prefix.len() - 3);
    }

    fn last_child(&mut self, dump: impl FnOnce(&mut Self)) {
        let _ = write!(self.out, "{}`--", self.prefix);
        self.prefix.push_str("   ");
        dump(self);
        self.prefix.truncate(self.prefix.len() - 3);
    }

    pub fn dump_translation_unit(&mut self, unit: &TransUnit) {
        let _ = writeln!(self.out, "TranslationUnit");
        for (i, decl) in unit.decls.iter().enumerate() {
            if i + 1 == unit.decls.len() {
                self.last_child(|d| d.dump_decl(decl));
            } else {
                self.child(|d| d.dump_decl(decl));
            }
        }
    }

    pub fn dump_decl(&mut self, decl: &Decl) {
        let pos = decl.loc.to_position();
        match &decl.kind {
            DeclKind::Empty => {
                let _ = writeln!(self.out, "EmptyDecl <{pos}>");
            }
            DeclKind::Var(var) => {
                let name = self.name(var.name).to_owned();
                let ty = self.ty(var.ty);
                let _ = writeln!(self.out, "VarDecl <{pos}> {name} '{ty}'");
                if let Some(init) = &var.init {
                    self.last_child(|d| d.dump_expr(init));
                }
            }
            DeclKind::Function(func) => {
                let name = self.name(func.name).to_owned();
                let ty = self.ty(func.ty);
                let _ = writeln!(self.out, "FunctionDecl <{pos}> {name} '{ty}'");
                let param_count = func.params.len();
                for (i, param) in func.params.iter().enumerate() {
                    let is_last = i + 1 == param_count && func.body.is_none();
                    let line = format!(
                        "ParmVarDecl <{}> {} '{}'\n",
                        param.loc.to_position(),
                        self.name(param.name),
                        self.ty(param.ty)
                    );
                    if is_last {
                        self.last_child(|d| d.out.push_str(&line));
                    } else {
                        self.child(|d| d.out.push_str(&line));
                    }
                }
                if let Some(body) = &func.body {
                    self.last_child(|d| d.dump_stmt(body));
                }
            }
            DeclKind::Typedef { name, ty } => {
                let spelling = self.name(*name).to_owned();
                let ty = self.ty(*ty);
                let _ = writeln!(self.out, "TypedefDecl <{pos}> {spelling} '{ty}'");
            }
            DeclKind::Record { ty } => {
                let ctx = self.ctx;
                let (kind, name, fields) = match &ctx.ty(*ty).kind {
                    TypeKind::Record(r) => (r.kind.spelling(), r.name, &r.fields),
                    _ => return,
                };
                let tag = self.name(name).to_owned();
                let _ = writeln!(self.out, "RecordDecl <{pos}> {kind} {tag}");
                let count = fields.len();
                for (i, field) in fields.iter().enumerate() {
                    let line = format!(
                        "FieldDecl <{}> {} '{}'\n",
                        field.loc.to_position(),
                        self.name(field.name),
                        self.ty(field.ty)
                    );
                    let bit_width = field.bit_width.as_deref();
                    let dump_one = |d: &mut Self| {
                        d.out.push_str(&line);
                        if let Some(width) = bit_width {
                            d.last_child(|d| d.dump_expr(width));
                        }
                    };
                    if i + 1 == count {
                        self.last_child(dump_one);
                    } else {
                        self.child(dump_one);
                    }
                }
            }
            DeclKind::Enum { ty } => {
                let ctx = self.ctx;
                let (name, enumerators) = match &ctx.ty(*ty).kind {
                    TypeKind::Enum(e) => (e.name, &e.enumerators),
                    _ => return,
                };
                let tag = self.name(name).to_owned();
                let _ = writeln!(self.out, "EnumDecl <{pos}> {tag}");
                let count = enumerators.len();
                for (i, e) in enumerators.iter().enumerate() {
                    let line = format!(
                        "EnumConstantDecl <{}> {} 'int'\n",
                        e.loc.to_position(),
                        self.name(e.name)
                    );
                    let value = e.value.as_deref();
                    let dump_one = |d: &mut Self| {
                        d.out.push_str(&line);
                        if let Some(value) = value {
                            d.last_child(|d| d.dump_expr(value));
                        }
                    };
                    if i + 1 == count {
                        self.last_child(dump_one);
                    } else {
                        self.child(dump_one);
                    }
                }
            }
        }
    }

    pub fn dump_stmt(&mut self, stmt: &Stmt) {
        let pos = stmt.loc.to_position();
        match &stmt.kind {
            StmtKind::Null => {
                let _ = writeln!(self.out, "NullStmt <{pos}>");
            }
            StmtKind::Expr(expr) => {
                let _ = writeln!(self.out, "ExprStmt <{pos}>");
                self.last_child(|d| d.dump_expr(expr));
            }
            StmtKind::Decl(decls) => {
                let _ = writeln!(self.out, "DeclStmt <{pos}>");
                let count = decls.len();
                for (i, decl) in decls.iter().enumerate() {
                    if i + 1 == count {
                        self.last_child(|d| d.dump_decl(decl));
                    } else {
                        self.child(|d| d.dump_decl(decl));
                    }
                }
            }
            StmtKind::Compound(stmts) => {
                let _ = writeln!(self.out, "CompoundStmt <{pos}>");
                let count = stmts.len();
                for (i, stmt) in stmts.iter().enumerate() {
                    if i + 1 == count {
                        self.last_child(|d| d.dump_stmt(stmt));
                    } else {
                        self.child(|d| d.dump_stmt(stmt));
                    }
                }
            }
            StmtKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                let _ = writeln!(self.out, "IfStmt <{pos}>");
                self.child(|d| d.dump_expr(cond));
                match else_stmt {
                    Some(else_stmt) => {
                        self.child(|d| d.dump_stmt(then_stmt));
                        self.last_child(|d| d.dump_stmt(else_stmt));
                    }
                    None => self.last_child(|d| d.dump_stmt(then_stmt)),
                }
            }
            StmtKind::While { cond, body } => {
                let _ = writeln!(self.out, "WhileStmt <{pos}>");
                self.child(|d| d.dump_expr(cond));
                self.last_child(|d| d.dump_stmt(body));
            }
            StmtKind::DoWhile { body, cond } => {
                let _ = writeln!(self.out, "DoStmt <{pos}>");
                self.child(|d| d.dump_stmt(body));
                self.last_child(|d| d.dump_expr(cond));
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let _ = writeln!(self.out, "ForStmt <{pos}>");
                if let Some(init) = init {
                    self.child(|d| d.dump_stmt(init));
                }
                if let Some(cond) = cond {
                    self.child(|d| d.dump_expr(cond));
                }
                if let Some(step) = step {
                    self.child(|d| d.dump_expr(step));
                }
                self.last_child(|d| d.dump_stmt(body));
            }
            StmtKind::Break => {
                let _ = writeln!(self.out, "BreakStmt <{pos}>");
            }
            StmtKind::Continue => {
                let _ = writeln!(self.out, "ContinueStmt <{pos}>");
            }
            StmtKind::Return(value) => {
                let _ = writeln!(self.out, "ReturnStmt <{pos}>");
                if let Some(value) = value {
                    self.last_child(|d| d.dump_expr(value));
                }
            }
        }
    }

    pub fn dump_expr(&mut self, expr: &Expr) {
        let pos = expr.loc.to_position();
        let ty = self.ty(expr.ty);
        match &expr.kind {
            ExprKind::IntConst(value) => {
                let _ = writeln!(self.out, "IntegerConstant <{pos}> '{ty}' {value}");
            }
            ExprKind::FloatConst(value) => {
                let _ = writeln!(self.out, "FloatingConstant <{pos}> '{ty}' {value}");
            }
            ExprKind::CharConst(value) => {
                let _ = writeln!(self.out, "CharacterConstant <{pos}> '{ty}' {value}");
            }
            ExprKind::StringLit(content) => {
                let _ = writeln!(self.out, "StringLiteral <{pos}> '{ty}' \"{content}\"");
            }
            ExprKind::DeclRef(name) => {
                let spelling = self.name(*name).to_owned();
                let _ = writeln!(self.out, "DeclRefExpr <{pos}> '{ty}' {spelling}");
            }
            ExprKind::Paren(inner) => {
                let _ = writeln!(self.out, "ParenExpr <{pos}> '{ty}'");
                self.last_child(|d| d.dump_expr(inner));
            }
            ExprKind::Unary { op, operand } => {
                let fixity = if op.is_postfix() { "postfix" } else { "prefix" };
                let _ = writeln!(
                    self.out,
                    "UnaryExpr <{pos}> '{ty}' {fixity} '{}'",
                    op.spelling()
                );
                self.last_child(|d| d.dump_expr(operand));
            }
            ExprKind::Sizeof(arg) => match arg {
                SizeofArg::Expr(operand) => {
                    let _ = writeln!(self.out, "SizeofExpr <{pos}> '{ty}' sizeof");
                    self.last_child(|d| d.dump_expr(operand));
                }
                SizeofArg::Type(of_ty) => {
                    let _ = writeln!(
                        self.out,
                        "SizeofExpr <{pos}> '{ty}' sizeof '{}'",
                        self.ty(*of_ty)
                    );
                }
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let _ = writeln!(self.out, "BinaryExpr <{pos}> '{ty}' '{}'", op.spelling());
                self.child(|d| d.dump_expr(lhs));
                self.last_child(|d| d.dump_expr(rhs));
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let _ = writeln!(self.out, "TernaryExpr <{pos}> '{ty}'");
                self.child(|d| d.dump_expr(cond));
                self.child(|d| d.dump_expr(then_expr));
                self.last_child(|d| d.dump_expr(else_expr));
            }
            ExprKind::ImplicitCast { cast, operand } => {
                let _ = writeln!(
                    self.out,
                    "ImplicitCastExpr <{pos}> '{ty}' <{}>",
                    cast.spelling()
                );
                self.last_child(|d| d.dump_expr(operand));
            }
            ExprKind::Cast { operand } => {
                let _ = writeln!(self.out, "CastExpr <{pos}> '{ty}'");
                self.last_child(|d| d.dump_expr(operand));
            }
            ExprKind::Call { callee, args } => {
                let _ = writeln!(self.out, "CallExpr <{pos}> '{ty}'");
                if args.is_empty() {
                    self.last_child(|d| d.dump_expr(callee));
                } else {
                    self.child(|d| d.dump_expr(callee));
                    let count = args.len();
                    for (i, arg) in args.iter().enumerate() {
                        if i + 1 == count {
                            self.last_child(|d| d.dump_expr(arg));
                        } else {
                            self.child(|d| d.dump_expr(arg));
                        }
                    }
                }
            }
            ExprKind::Member {
                base,
                member,
                arrow,
            } => {
                let sep = if *arrow { "->" } else { "." };
                let member_name = self.name(*member).to_owned();
                let _ = writeln!(self.out, "MemberExpr <{pos}> '{ty}' {sep}{member_name}");
                self.last_child(|d| d.dump_expr(base));
            }
            ExprKind::InitList(elements) => {
                let _ = writeln!(self.out, "InitListExpr <{pos}> '{ty}'");
                let count = elements.len();
                for (i, element) in elements.iter().enumerate() {
                    if i + 1 == count {
                        self.last_child(|d| d.dump_expr(element));
                    } else {
                        self.child(|d| d.dump_expr(element));
                    }
                }
            }
        }
    }
}
