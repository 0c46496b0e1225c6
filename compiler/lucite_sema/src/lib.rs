//! Semantic analysis for the Lucite C99 front end.
//!
//! [`Sema`] mediates every type-sensitive AST construction the parser
//! requests: literal classification and typing, the C99 conversion rules
//! for binary operators, declarator-to-type translation, and name
//! binding. All of its checks are advisory — they emit diagnostics or
//! leave a null result type for callers to handle, but never abort the
//! parse.
//!
//! The `DeclSpec`/`Declarator` accumulators live here rather than in the
//! parser crate: they sit on the boundary where syntax becomes types.

mod convert;
mod decl;
mod declspec;
mod eval;
mod expr;
mod literal;
mod scope;

pub use declspec::{
    DeclSpec, Declarator, DeclaratorChunk, DeclaratorContext, DeclaratorKind, FieldDeclarator,
    ParamInfo, ParsedSpecifiers, TypeRep, TypeSpecSign, TypeSpecType, TypeSpecWidth,
};
pub use scope::{Namespace, Scope, ScopeFlags, ScopeStack};

use lucite_diagnostic::DiagnosticEngine;
use lucite_ir::{Name, QualType, SourceLocation, TypeId};
use lucite_types::TypeContext;
use rustc_hash::FxHashMap;

/// The semantic analyzer for one translation unit.
///
/// Owns the [`TypeContext`] and the name-binding tables. Bindings are
/// shadow stacks keyed by interned name: entering a scope pushes, and
/// [`act_on_pop_scope`](Sema::act_on_pop_scope) pops everything the
/// scope declared.
pub struct Sema<'d> {
    ctx: TypeContext,
    diag: &'d DiagnosticEngine,
    typedefs: FxHashMap<Name, Vec<QualType>>,
    values: FxHashMap<Name, Vec<QualType>>,
    tags: FxHashMap<Name, Vec<TypeId>>,
}

impl<'d> Sema<'d> {
    pub fn new(diag: &'d DiagnosticEngine) -> Self {
        Sema {
            ctx: TypeContext::new(),
            diag,
            typedefs: FxHashMap::default(),
            values: FxHashMap::default(),
            tags: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn context(&self) -> &TypeContext {
        &self.ctx
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut TypeContext {
        &mut self.ctx
    }

    #[inline]
    pub fn diag(&self) -> &'d DiagnosticEngine {
        self.diag
    }

    // === Name binding ===
    //
    // The identifier table's extension slot is the hook a full symbol
    // table would use; here bindings are name-keyed shadow stacks, which
    // is all the front end core needs.

    /// Bind a typedef name in `scope`.
    pub fn bind_typedef(&mut self, scope: &mut Scope, name: Name, ty: QualType) {
        self.typedefs.entry(name).or_default().push(ty);
        scope.add_decl(Namespace::TypedefName, name);
    }

    /// The type a typedef name currently denotes, if any.
    pub fn lookup_typedef(&self, name: Name) -> Option<QualType> {
        self.typedefs.get(&name).and_then(|s| s.last()).copied()
    }

    /// Bind a variable/function/enumerator name in `scope`.
    pub fn bind_value(&mut self, scope: &mut Scope, name: Name, ty: QualType) {
        self.values.entry(name).or_default().push(ty);
        scope.add_decl(Namespace::Value, name);
    }

    /// The type of an ordinary identifier, if it is bound.
    pub fn lookup_value(&self, name: Name) -> Option<QualType> {
        self.values.get(&name).and_then(|s| s.last()).copied()
    }

    /// Bind a struct/union/enum tag in `scope`.
    pub fn bind_tag(&mut self, scope: &mut Scope, name: Name, ty: TypeId) {
        self.tags.entry(name).or_default().push(ty);
        scope.add_decl(Namespace::Tag, name);
    }

    /// The type a tag currently denotes, if any.
    pub fn lookup_tag(&self, name: Name) -> Option<TypeId> {
        self.tags.get(&name).and_then(|s| s.last()).copied()
    }

    /// Scope-exit hook: unbind everything the scope declared.
    ///
    /// The parser calls this only for scopes that declared something.
    pub fn act_on_pop_scope(&mut self, _loc: SourceLocation, scope: &Scope) {
        if scope.decl_empty() {
            return;
        }
        debug_assert!(
            scope.flags().contains(ScopeFlags::DECL),
            "scope should not contain decls"
        );
        for &(ns, name) in scope.decls() {
            match ns {
                Namespace::TypedefName => pop_binding(&mut self.typedefs, name),
                Namespace::Value => pop_binding(&mut self.values, name),
                Namespace::Tag => pop_binding(&mut self.tags, name),
            }
        }
    }
}

/// Pop the innermost binding of `name`, dropping the entry when the
/// shadow stack empties.
fn pop_binding<T>(map: &mut FxHashMap<Name, Vec<T>>, name: Name) {
    if let Some(stack) = map.get_mut(&name) {
        stack.pop();
        if stack.is_empty() {
            map.remove(&name);
        }
    }
}
