//! Core IR for the Lucite C99 front end.
//!
//! This crate holds the leaf data model every other compiler crate builds
//! on: source locations, interned identifiers, the token model, the type
//! model, and the abstract syntax tree.
//!
//! # Design
//!
//! - AST nodes are tagged enums in a single-owner boxed tree — consumers
//!   pattern-match over the closed node sets instead of implementing
//!   visitor overrides, so a new node kind is a compile-time exhaustiveness
//!   error rather than a silently missing override.
//! - Types live in an arena (owned by `lucite_types`) and are addressed by
//!   [`TypeId`]; a [`QualType`] is a `TypeId` plus a qualifier bit-set.
//! - Identifier spellings are interned once per process in the
//!   [`IdentifierTable`]; tokens carry the interned [`Name`] handle.

pub mod ast;
mod interner;
mod loc;
mod name;
mod token;
mod ty;

pub use ast::{
    BinaryOp, CastKind, Decl, DeclKind, Expr, ExprKind, FieldDecl, FunctionDecl, ParamDecl,
    SizeofArg, Stmt, StmtKind, StorageClass, TransUnit, UnaryOp, VarDecl,
};
pub use interner::{IdentifierInfo, IdentifierTable};
pub use loc::SourceLocation;
pub use name::Name;
pub use token::{Token, TokenData, TokenKind};
pub use ty::{
    ArithKind, ArrayKind, ArrayType, EnumType, Enumerator, FunctionType, PointerType, QualType,
    Qualifiers, RecordKind, RecordType, Type, TypeId, TypeKind, TypedefType,
};
