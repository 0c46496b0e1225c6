//! Scopes and the scope stack.
//!
//! A [`Scope`] is a nestable symbol-visibility region with flags for the
//! control-flow constructs it may legally contain. Scopes live in a
//! parser-owned [`ScopeStack`]; parent links are stack indices. Exiting
//! scopes are recycled through a small free-list to bound allocation
//! churn — pooling is an optimization, not a contract.

use bitflags::bitflags;
use lucite_ir::Name;

bitflags! {
    /// What a scope is and what it may contain.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct ScopeFlags: u8 {
        /// Function scope; labels live here.
        const FUNC = 1 << 0;
        /// A while/do/switch/for that `break` can target.
        const BREAK = 1 << 1;
        /// A while/do/for that `continue` can target.
        const CONTINUE = 1 << 2;
        /// May directly contain declarations.
        const DECL = 1 << 3;
        /// The controlling scope of an if/switch/while/for.
        const CONTROL = 1 << 4;
        /// The body of a struct/union definition.
        const RECORD = 1 << 5;
        /// Block scope.
        const BLOCK = 1 << 6;
        /// Parameters of a function prototype.
        const PROTOTYPE = 1 << 7;
    }
}

/// Which binding table a declared name went into.
///
/// C keeps ordinary identifiers and tags in separate name spaces; typedef
/// names are ordinary but tracked separately so the parser can ask "is
/// this a type name" cheaply.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Namespace {
    Value,
    TypedefName,
    Tag,
}

/// One scope's state. Created (or recycled) on entering a syntactic
/// construct, destroyed or pooled on leaving it; never shared across
/// constructs.
#[derive(Debug, Default)]
pub struct Scope {
    flags: ScopeFlags,
    depth: u32,
    parent: Option<usize>,
    func_parent: Option<usize>,
    break_parent: Option<usize>,
    continue_parent: Option<usize>,
    control_parent: Option<usize>,
    block_parent: Option<usize>,
    /// Names declared directly in this scope, with their namespace, in
    /// declaration order.
    decls: Vec<(Namespace, Name)>,
}

impl Scope {
    /// (Re)initialize for reuse from the pool.
    fn init(&mut self, parent: Option<(usize, &Scope)>, self_index: usize, flags: ScopeFlags) {
        self.flags = flags;
        self.decls.clear();
        match parent {
            Some((idx, p)) => {
                self.parent = Some(idx);
                self.depth = p.depth + 1;
                self.func_parent = p.func_parent;
                self.break_parent = p.break_parent;
                self.continue_parent = p.continue_parent;
                self.control_parent = p.control_parent;
                self.block_parent = p.block_parent;
            }
            None => {
                self.parent = None;
                self.depth = 0;
                self.func_parent = None;
                self.break_parent = None;
                self.continue_parent = None;
                self.control_parent = None;
                self.block_parent = None;
            }
        }
        // If this scope is a function or can hold break/continue,
        // remember it for nested lookups.
        if flags.contains(ScopeFlags::FUNC) {
            self.func_parent = Some(self_index);
        }
        if flags.contains(ScopeFlags::BREAK) {
            self.break_parent = Some(self_index);
        }
        if flags.contains(ScopeFlags::CONTINUE) {
            self.continue_parent = Some(self_index);
        }
        if flags.contains(ScopeFlags::CONTROL) {
            self.control_parent = Some(self_index);
        }
        if flags.contains(ScopeFlags::BLOCK) {
            self.block_parent = Some(self_index);
        }
    }

    #[inline]
    pub fn flags(&self) -> ScopeFlags {
        self.flags
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn is_block_scope(&self) -> bool {
        self.flags.contains(ScopeFlags::BLOCK)
    }

    #[inline]
    pub fn is_record_scope(&self) -> bool {
        self.flags.contains(ScopeFlags::RECORD)
    }

    #[inline]
    pub fn is_prototype_scope(&self) -> bool {
        self.flags.contains(ScopeFlags::PROTOTYPE)
    }

    /// Record a name declared directly in this scope.
    pub fn add_decl(&mut self, ns: Namespace, name: Name) {
        self.decls.push((ns, name));
    }

    /// Whether `name` was declared directly in this scope.
    pub fn is_decl_scope(&self, ns: Namespace, name: Name) -> bool {
        self.decls.iter().any(|&(n, d)| n == ns && d == name)
    }

    pub fn decls(&self) -> &[(Namespace, Name)] {
        &self.decls
    }

    pub fn decl_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Free-list capacity: scopes beyond this many are simply dropped.
const SCOPE_POOL_SIZE: usize = 16;

/// Stack of live scopes plus the recycling pool.
pub struct ScopeStack {
    scopes: Vec<Scope>,
    pool: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            scopes: Vec::new(),
            pool: Vec::new(),
        }
    }

    /// Push a scope with `flags`, recycling a pooled one when available.
    pub fn enter(&mut self, flags: ScopeFlags) {
        let mut scope = self.pool.pop().unwrap_or_default();
        let self_index = self.scopes.len();
        match self.scopes.last() {
            Some(parent) => scope.init(Some((self_index - 1, parent)), self_index, flags),
            None => scope.init(None, self_index, flags),
        }
        self.scopes.push(scope);
    }

    /// Pop the current scope and hand it to `on_exit` (the semantic
    /// analyzer's pop hook), then recycle it.
    pub fn exit(&mut self, mut on_exit: impl FnMut(&Scope)) {
        let scope = match self.scopes.pop() {
            Some(scope) => scope,
            None => {
                debug_assert!(false, "exit with no scope on the stack");
                return;
            }
        };
        on_exit(&scope);
        if self.pool.len() < SCOPE_POOL_SIZE {
            self.pool.push(scope);
        }
    }

    /// The innermost scope. Valid only between `enter` and the matching
    /// `exit`.
    pub fn current(&self) -> &Scope {
        debug_assert!(!self.scopes.is_empty(), "no current scope");
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        debug_assert!(!self.scopes.is_empty(), "no current scope");
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The scope a `break` in the current scope would exit, or `None`
    /// outside any breakable construct. A plain block scope in the way
    /// means the nearest candidate is not actually a loop/switch here.
    pub fn break_target(&self) -> Option<usize> {
        let idx = self.current().break_parent?;
        if self.scopes[idx].is_block_scope() {
            None
        } else {
            Some(idx)
        }
    }

    /// The scope a `continue` in the current scope would re-enter.
    pub fn continue_target(&self) -> Option<usize> {
        let idx = self.current().continue_parent?;
        if self.scopes[idx].is_block_scope() {
            None
        } else {
            Some(idx)
        }
    }

    /// How many scopes are waiting in the free-list (test hook).
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
