//! Declaration nodes.

use crate::{Expr, Name, QualType, SourceLocation, Stmt, TypeId};

/// Storage-class specifier attached to a declaration [C99 6.7.1].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum StorageClass {
    #[default]
    Unspecified,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

/// A variable declaration, possibly with an initializer.
#[derive(Debug)]
pub struct VarDecl {
    pub name: Name,
    pub ty: QualType,
    pub storage: StorageClass,
    pub init: Option<Box<Expr>>,
}

/// One named parameter in a function definition or prototype.
#[derive(Debug)]
pub struct ParamDecl {
    pub name: Name,
    pub ty: QualType,
    pub loc: SourceLocation,
}

/// A function declaration or definition.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Name,
    /// The full function type (return + parameters + variadic flag).
    pub ty: QualType,
    pub storage: StorageClass,
    pub params: Vec<ParamDecl>,
    /// The compound-statement body; `None` for a plain declaration.
    pub body: Option<Box<Stmt>>,
}

/// A struct/union member declaration, with an optional bit-field width.
///
/// Field declarations are owned by the record type in the type arena
/// (single owner, no cycles); the AST's record declaration references the
/// type by id.
#[derive(Debug)]
pub struct FieldDecl {
    /// `Name::EMPTY` for an unnamed bit-field or anonymous member.
    pub name: Name,
    pub ty: QualType,
    pub bit_width: Option<Box<Expr>>,
    pub loc: SourceLocation,
}

/// Closed set of declaration variants.
#[derive(Debug)]
pub enum DeclKind {
    /// A lone `;` at file or block scope.
    Empty,
    Var(VarDecl),
    Function(FunctionDecl),
    Typedef {
        name: Name,
        ty: QualType,
    },
    /// A struct/union declaration; the record type (and its fields) lives
    /// in the type arena.
    Record {
        ty: TypeId,
    },
    /// An enum declaration; the enum type (and its enumerators) lives in
    /// the type arena.
    Enum {
        ty: TypeId,
    },
}

/// One declaration node.
#[derive(Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub loc: SourceLocation,
}

impl Decl {
    pub fn new(kind: DeclKind, loc: SourceLocation) -> Self {
        Decl { kind, loc }
    }
}

/// A whole translation unit: the ordered external declarations.
#[derive(Debug, Default)]
pub struct TransUnit {
    pub decls: Vec<Decl>,
}
