//! Statement nodes.

use crate::{Decl, Expr, SourceLocation};

/// Closed set of statement variants.
#[derive(Debug)]
pub enum StmtKind {
    /// A lone `;`.
    Null,
    Expr(Box<Expr>),
    /// A declaration statement; one statement can introduce several
    /// declarators (`int a, *b;`).
    Decl(Vec<Decl>),
    Compound(Vec<Stmt>),
    If {
        cond: Box<Expr>,
        then_stmt: Box<Stmt>,
        else_stmt: Option<Box<Stmt>>,
    },
    While {
        cond: Box<Expr>,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Box<Expr>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Box<Expr>>),
}

/// One statement node.
#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: SourceLocation,
}

impl Stmt {
    pub fn new(kind: StmtKind, loc: SourceLocation) -> Self {
        Stmt { kind, loc }
    }
}
