//! Abstract syntax tree.
//!
//! Three closed node categories — expressions, declarations, statements —
//! each a tagged enum over a single-owner boxed tree. The parser owns
//! every node it constructs; the tree has no cycles, so plain ownership
//! suffices and consumers walk it by pattern matching.

mod decl;
mod expr;
mod stmt;

pub use decl::{
    Decl, DeclKind, FieldDecl, FunctionDecl, ParamDecl, StorageClass, TransUnit, VarDecl,
};
pub use expr::{BinaryOp, CastKind, Expr, ExprKind, SizeofArg, UnaryOp};
pub use stmt::{Stmt, StmtKind};
