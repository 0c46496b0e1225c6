//! Declaration parsing: specifiers, declarators, records, enums,
//! init-declarator lists, and external definitions.

use crate::{stack, Parser};
use lucite_ir::{
    Decl, DeclKind, Enumerator, Expr, ExprKind, FieldDecl, FunctionDecl, Name, ParamDecl,
    QualType, Qualifiers, RecordKind, SourceLocation, Stmt, StmtKind, StorageClass, TokenKind,
    TypeId, TypeKind, UnaryOp, VarDecl,
};
use lucite_sema::{
    DeclSpec, Declarator, DeclaratorChunk, DeclaratorContext, FieldDeclarator, ParamInfo,
    ParsedSpecifiers, ScopeFlags, TypeRep, TypeSpecSign, TypeSpecType, TypeSpecWidth,
};

/// How a record specifier is being used.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum TagUseKind {
    /// `struct foo { ... }`
    Definition,
    /// `struct foo;`
    Declaration,
    /// `struct foo x`
    Reference,
}

impl<'src, 'ids, 'd> Parser<'src, 'ids, 'd> {
    /// Whether the lookahead can begin a type name: a type-specifier
    /// keyword, a qualifier, a tag keyword, or a known typedef name.
    pub(crate) fn is_first_of_type_name(&self) -> bool {
        match self.tok.kind() {
            TokenKind::Void
            | TokenKind::Char
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Bool
            | TokenKind::Short
            | TokenKind::Long
            | TokenKind::Signed
            | TokenKind::Unsigned
            | TokenKind::Struct
            | TokenKind::Union
            | TokenKind::Enum
            | TokenKind::Const
            | TokenKind::Restrict
            | TokenKind::Volatile => true,
            TokenKind::Identifier => self
                .tok
                .ident()
                .is_some_and(|name| self.sema.lookup_typedef(name).is_some()),
            _ => false,
        }
    }

    /// Whether the lookahead can begin a declaration (type-name starters
    /// plus storage classes and `inline`).
    pub(crate) fn is_declaration_start(&self) -> bool {
        matches!(
            self.tok.kind(),
            TokenKind::Typedef
                | TokenKind::Extern
                | TokenKind::Static
                | TokenKind::Auto
                | TokenKind::Register
                | TokenKind::Inline
        ) || self.is_first_of_type_name()
    }

    /// external-declaration: a lone `;`, a declaration, or a function
    /// definition.
    pub(crate) fn parse_external_declaration(&mut self) -> Vec<Decl> {
        if self.tok.is(TokenKind::Semi) {
            let loc = self.consume_token();
            return vec![Decl::new(DeclKind::Empty, loc)];
        }
        self.parse_declaration(DeclaratorContext::File)
    }

    /// declaration: declaration-specifiers init-declarator-list? ';'
    /// — or, at file scope, a function definition when the declarator is
    /// a function declarator followed by `{`.
    pub(crate) fn parse_declaration(&mut self, context: DeclaratorContext) -> Vec<Decl> {
        let ds_loc = self.tok.loc();
        let mut ds = DeclSpec::new();
        self.parse_declaration_specifiers(&mut ds);

        // Free-standing specifier set: only tag declarations may omit
        // the declarator.
        if self.tok.is(TokenKind::Semi) {
            self.consume_token();
            if !ds.is_missing_declarator_ok() {
                self.diag.warning(ds_loc, "declaration does not declare anything");
            }
            return vec![self.tag_decl(&ds, ds_loc)];
        }

        let mut d = Declarator::new(&ds, context);
        self.parse_declarator(&mut d);

        // `int f(...) {` at file scope is a definition; the function
        // chunk closest to the name is the type's outermost constructor.
        if context == DeclaratorContext::File
            && self.tok.is(TokenKind::LBrace)
            && matches!(d.chunks.first(), Some(DeclaratorChunk::Function { .. }))
        {
            return vec![self.parse_function_definition(&ds, d, ds_loc)];
        }

        self.parse_init_declarator_list(&ds, d, context, ds_loc)
    }

    /// The declaration a lone specifier set stands for.
    fn tag_decl(&self, ds: &DeclSpec, loc: SourceLocation) -> Decl {
        let kind = match (ds.type_spec_type, ds.type_rep) {
            (TypeSpecType::Struct | TypeSpecType::Union, Some(TypeRep::Tag(ty))) => {
                DeclKind::Record { ty }
            }
            (TypeSpecType::Enum, Some(TypeRep::Tag(ty))) => DeclKind::Enum { ty },
            _ => DeclKind::Empty,
        };
        Decl::new(kind, loc)
    }

    /// declaration-specifiers: any mix of storage-class, type, qualifier
    /// and function specifiers, accumulated left to right. Conflicts are
    /// reported by the `DeclSpec` setters and the scan continues past the
    /// offending token.
    pub(crate) fn parse_declaration_specifiers(&mut self, ds: &mut DeclSpec) {
        loop {
            let loc = self.tok.loc();
            let _invalid = match self.tok.kind() {
                // typedef-name. An identifier can only be a type
                // specifier if we haven't already seen one; without this
                // check `typedef int X; struct Y { short X; };` would
                // misparse the member as `short int`.
                TokenKind::Identifier => {
                    if ds.has_type_specifier() {
                        ds.finish(self.diag);
                        return;
                    }
                    let alias = self.tok.ident().and_then(|n| self.sema.lookup_typedef(n));
                    match alias {
                        Some(alias) => ds.set_type_spec_type(
                            TypeSpecType::Typename,
                            loc,
                            Some(TypeRep::Alias(alias)),
                            self.diag,
                        ),
                        // Not a type name: the declarator starts here.
                        None => {
                            ds.finish(self.diag);
                            return;
                        }
                    }
                }

                // storage-class-specifier
                TokenKind::Typedef => {
                    ds.set_storage_class(StorageClass::Typedef, loc, self.diag)
                }
                TokenKind::Extern => ds.set_storage_class(StorageClass::Extern, loc, self.diag),
                TokenKind::Static => ds.set_storage_class(StorageClass::Static, loc, self.diag),
                TokenKind::Auto => ds.set_storage_class(StorageClass::Auto, loc, self.diag),
                TokenKind::Register => {
                    ds.set_storage_class(StorageClass::Register, loc, self.diag)
                }

                // function-specifier
                TokenKind::Inline => ds.set_inline(loc, self.diag),

                // type-specifier width and sign
                TokenKind::Short => ds.set_type_spec_width(TypeSpecWidth::Short, loc, self.diag),
                TokenKind::Long => {
                    if ds.type_spec_width == TypeSpecWidth::Long {
                        ds.set_type_spec_width(TypeSpecWidth::LongLong, loc, self.diag)
                    } else {
                        ds.set_type_spec_width(TypeSpecWidth::Long, loc, self.diag)
                    }
                }
                TokenKind::Signed => ds.set_type_spec_sign(TypeSpecSign::Signed, loc, self.diag),
                TokenKind::Unsigned => {
                    ds.set_type_spec_sign(TypeSpecSign::Unsigned, loc, self.diag)
                }

                // core type-specifiers
                TokenKind::Void => {
                    ds.set_type_spec_type(TypeSpecType::Void, loc, None, self.diag)
                }
                TokenKind::Char => {
                    ds.set_type_spec_type(TypeSpecType::Char, loc, None, self.diag)
                }
                TokenKind::Int => ds.set_type_spec_type(TypeSpecType::Int, loc, None, self.diag),
                TokenKind::Float => {
                    ds.set_type_spec_type(TypeSpecType::Float, loc, None, self.diag)
                }
                TokenKind::Double => {
                    ds.set_type_spec_type(TypeSpecType::Double, loc, None, self.diag)
                }
                TokenKind::Bool => {
                    ds.set_type_spec_type(TypeSpecType::Bool, loc, None, self.diag)
                }

                // record-specifier
                TokenKind::Struct | TokenKind::Union => {
                    self.parse_record_specifier(loc, ds);
                    continue;
                }

                // enum-specifier
                TokenKind::Enum => {
                    self.consume_token();
                    self.parse_enum_specifier(loc, ds);
                    continue;
                }

                // type-qualifier
                TokenKind::Const => ds.set_type_qual(Qualifiers::CONST, loc, self.diag),
                TokenKind::Restrict => ds.set_type_qual(Qualifiers::RESTRICT, loc, self.diag),
                TokenKind::Volatile => ds.set_type_qual(Qualifiers::VOLATILE, loc, self.diag),

                _ => {
                    ds.finish(self.diag);
                    return;
                }
            };
            // Conflicts were diagnosed by the setter; keep scanning.
            self.consume_token();
        }
    }

    /// specifier-qualifier-list: declaration-specifiers restricted to
    /// type specifiers and qualifiers; anything else is stripped with an
    /// error.
    pub(crate) fn parse_specifier_qualifier_list(&mut self, ds: &mut DeclSpec) {
        self.parse_declaration_specifiers(ds);

        let specs = ds.parsed_specifiers();
        if specs.is_none() {
            self.diag
                .error(self.tok.loc(), "require type specifier or type qualifier");
            ds.set_type_spec_error();
        }
        if specs.contains(ParsedSpecifiers::STORAGE_CLASS) {
            if ds.storage_class_loc.is_valid() {
                self.diag
                    .error(ds.storage_class_loc, "storage class specifier is not allowed");
            }
            ds.clear_storage_class();
        }
        if specs.contains(ParsedSpecifiers::FUNCTION_SPECIFIER) {
            if ds.inline_specified {
                self.diag
                    .error(ds.inline_loc, "function specifier is not allowed");
            }
            ds.clear_function_specs();
        }
    }

    /// type-qualifier-list: const/restrict/volatile, in any order.
    fn parse_type_qualifier_list_opt(&mut self, ds: &mut DeclSpec) {
        loop {
            let loc = self.tok.loc();
            let _invalid = match self.tok.kind() {
                TokenKind::Const => ds.set_type_qual(Qualifiers::CONST, loc, self.diag),
                TokenKind::Volatile => ds.set_type_qual(Qualifiers::VOLATILE, loc, self.diag),
                TokenKind::Restrict => ds.set_type_qual(Qualifiers::RESTRICT, loc, self.diag),
                _ => {
                    ds.finish(self.diag);
                    return;
                }
            };
            self.consume_token();
        }
    }

    /// type-name: specifier-qualifier-list abstract-declarator?
    pub(crate) fn parse_type_name(&mut self) -> QualType {
        let loc = self.tok.loc();
        let mut ds = DeclSpec::new();
        self.parse_specifier_qualifier_list(&mut ds);

        let mut d = Declarator::new(&ds, DeclaratorContext::TypeName);
        self.parse_declarator(&mut d);

        if d.invalid {
            return QualType::NULL;
        }
        self.sema.type_for_declarator(&ds, &mut d, loc)
    }

    // === Declarators ===

    /// declarator: pointer* direct-declarator. Checks well-formedness
    /// and issues diagnostics.
    pub(crate) fn parse_declarator(&mut self, d: &mut Declarator) {
        stack::ensure_sufficient_stack(|| self.parse_declarator_internal(d));
    }

    /// A leading `*` (with optional qualifiers) recurses for the rest of
    /// the declarator, then records its pointer chunk — so the chunk
    /// list comes out in outer-to-inner order for the derived type.
    fn parse_declarator_internal(&mut self, d: &mut Declarator) {
        if self.tok.is_not(TokenKind::Star) {
            self.parse_direct_declarator(d);
            return;
        }

        let loc = self.consume_token();
        let mut ptr_ds = DeclSpec::new();
        self.parse_type_qualifier_list_opt(&mut ptr_ds);
        self.parse_declarator_internal(d);
        d.chunks.push(DeclaratorChunk::Pointer {
            quals: ptr_ds.type_qualifiers,
            loc,
        });
    }

    /// direct-declarator: a name (where allowed), a parenthesized
    /// declarator, or an omitted identifier in abstract contexts,
    /// followed by array/function suffixes.
    fn parse_direct_declarator(&mut self, d: &mut Declarator) {
        if self.tok.is(TokenKind::Identifier) && d.may_have_identifier() {
            let name = self.tok.ident().unwrap_or_default();
            d.set_identifier(name, self.tok.loc());
            self.consume_token();
        } else if self.tok.is(TokenKind::LParen) {
            // e.g. "char (*x)" or "int (*y)(float)"
            self.parse_paren_declarator(d);
        } else if d.may_omit_identifier() {
            d.set_identifier(Name::EMPTY, self.tok.loc());
        } else {
            let msg = if d.context == DeclaratorContext::Member {
                "expected member name or semicolon"
            } else {
                "expected identifier after '('"
            };
            self.diag.error(self.tok.loc(), msg);
            d.set_identifier(Name::EMPTY, self.tok.loc());
            d.invalid = true;
        }

        loop {
            if self.tok.is(TokenKind::LParen) {
                let lparen_loc = self.consume_token();
                self.parse_function_params(d, lparen_loc);
            } else if self.tok.is(TokenKind::LSquare) {
                self.parse_bracket_declarator(d);
            } else {
                break;
            }
        }
    }

    /// `(` at the direct-declarator position: either grouping parens
    /// around a nested declarator, or — when what follows starts a type
    /// name or is `)` — a parameter list of an omitted name.
    fn parse_paren_declarator(&mut self, d: &mut Declarator) {
        let lparen_loc = self.consume_token();
        if self.tok.is(TokenKind::RParen) || self.is_first_of_type_name() {
            if !d.is_past_identifier() {
                d.set_identifier(Name::EMPTY, lparen_loc);
            }
            self.parse_function_params(d, lparen_loc);
        } else {
            d.grouping_parens = true;
            self.parse_declarator_internal(d);
            if !self.expect_and_consume(TokenKind::RParen, "expected ')'") {
                self.skip_until(&[TokenKind::RParen], true, false);
            }
        }
    }

    /// Parameter list after a consumed `(`. Parameters live in a
    /// function-prototype scope; array and function parameter types
    /// adjust to pointers.
    fn parse_function_params(&mut self, d: &mut Declarator, lparen_loc: SourceLocation) {
        self.enter_scope(ScopeFlags::PROTOTYPE | ScopeFlags::DECL);
        let mut params: Vec<ParamInfo> = Vec::new();
        let mut variadic = false;
        let mut has_prototype = false;

        if self.tok.is_not(TokenKind::RParen) {
            loop {
                if self.tok.is(TokenKind::Ellipsis) {
                    if params.is_empty() {
                        self.diag.error(
                            self.tok.loc(),
                            "ISO C requires a named parameter before '...'",
                        );
                    }
                    variadic = true;
                    self.consume_token();
                    break;
                }
                has_prototype = true;
                let param_loc = self.tok.loc();
                let mut pds = DeclSpec::new();
                self.parse_declaration_specifiers(&mut pds);
                let mut pd = Declarator::new(&pds, DeclaratorContext::Prototype);
                self.parse_declarator(&mut pd);
                let ty = self.sema.type_for_declarator(&pds, &mut pd, param_loc);
                let ty = self.sema.adjust_parameter_type(ty);
                params.push(ParamInfo {
                    name: pd.name,
                    loc: pd.name_loc,
                    ty,
                });
                if self.tok.is(TokenKind::Comma) {
                    self.consume_token();
                } else {
                    break;
                }
            }
        }
        if !self.expect_and_consume(TokenKind::RParen, "expected ')'") {
            self.skip_until(&[TokenKind::RParen], true, false);
        }
        self.exit_scope();

        // `f(void)`: one unnamed void parameter means "takes nothing".
        if params.len() == 1 && params[0].name == Name::EMPTY && !params[0].ty.is_null() {
            let canon = self.sema.context().canonical(params[0].ty);
            if self.sema.context().ty(canon.ty).is_void() {
                params.clear();
                has_prototype = true;
            }
        }

        d.chunks.push(DeclaratorChunk::Function {
            has_prototype,
            variadic,
            params,
            loc: lparen_loc,
        });
    }

    /// Array suffix `[...]`: optional `static`, qualifiers, and a size
    /// that is a `*`, an assignment expression, or absent.
    fn parse_bracket_declarator(&mut self, d: &mut Declarator) {
        let lsquare_loc = self.consume_token();
        let mut quals_ds = DeclSpec::new();
        let mut has_static = false;
        if self.tok.is(TokenKind::Static) {
            has_static = true;
            self.consume_token();
        }
        self.parse_type_qualifier_list_opt(&mut quals_ds);
        if self.tok.is(TokenKind::Static) {
            has_static = true;
            self.consume_token();
        }

        let mut is_star = false;
        let mut size = None;
        if self.tok.is(TokenKind::RSquare) {
            // [] — size comes from an initializer or stays incomplete.
        } else if self.tok.is(TokenKind::Star) {
            // `[*]` or an expression that happens to start with a deref.
            let star_loc = self.consume_token();
            if self.tok.is(TokenKind::RSquare) {
                is_star = true;
            } else {
                let operand = self.parse_cast_expression();
                size = operand
                    .map(|e| self.sema.act_on_unary_op(star_loc, UnaryOp::Deref, e))
                    .map(Box::new);
            }
        } else {
            size = self.parse_assignment_expression().map(Box::new);
        }

        if !self.expect_and_consume(TokenKind::RSquare, "expected ']'") {
            self.skip_until(&[TokenKind::RSquare], true, false);
        }
        d.chunks.push(DeclaratorChunk::Array {
            quals: quals_ds.type_qualifiers,
            has_static,
            is_star,
            size,
            loc: lsquare_loc,
        });
    }

    // === Records ===

    /// struct-or-union-specifier. The keyword is the current token.
    fn parse_record_specifier(&mut self, kw_loc: SourceLocation, ds: &mut DeclSpec) {
        let (tag_type, record_kind) = if self.tok.is(TokenKind::Struct) {
            (TypeSpecType::Struct, RecordKind::Struct)
        } else {
            (TypeSpecType::Union, RecordKind::Union)
        };
        self.consume_token();

        // The (optional) tag name.
        let mut name = Name::EMPTY;
        if self.tok.is(TokenKind::Identifier) {
            name = self.tok.ident().unwrap_or_default();
            self.consume_token();
        }

        // Three options: 'struct foo;' forward-declares, 'struct foo {'
        // defines, anything else is a reference.
        let use_kind = if self.tok.is(TokenKind::LBrace) {
            TagUseKind::Definition
        } else if self.tok.is(TokenKind::Semi) {
            TagUseKind::Declaration
        } else {
            TagUseKind::Reference
        };

        if name == Name::EMPTY && use_kind != TagUseKind::Definition {
            self.diag
                .error(kw_loc, "declaration of anonymous record must be a definition");
            // Skip the rest of this declarator, up to the comma or
            // semicolon.
            self.skip_until(&[TokenKind::Comma], true, false);
            return;
        }

        let id = match use_kind {
            TagUseKind::Definition => {
                let id = self.record_for_definition(record_kind, name, kw_loc);
                self.parse_struct_union_body(kw_loc, id);
                id
            }
            TagUseKind::Declaration | TagUseKind::Reference => {
                self.record_for_reference(record_kind, name, kw_loc)
            }
        };
        ds.set_type_spec_type(tag_type, kw_loc, Some(TypeRep::Tag(id)), self.diag);
    }

    /// The record type a definition fills in: a matching incomplete
    /// forward declaration if one is visible, otherwise a fresh type
    /// bound to the tag.
    fn record_for_definition(
        &mut self,
        kind: RecordKind,
        name: Name,
        loc: SourceLocation,
    ) -> TypeId {
        if name != Name::EMPTY {
            if let Some(existing) = self.sema.lookup_tag(name) {
                match &self.sema.context().ty(existing).kind {
                    TypeKind::Record(r) if r.kind == kind && !r.complete => return existing,
                    TypeKind::Record(r) if r.kind == kind => {
                        self.diag.error(
                            loc,
                            format!("redefinition of '{} {}'", kind.spelling(), self.ids.spelling(name)),
                        );
                    }
                    _ => {
                        self.diag.error(
                            loc,
                            "tag type does not match previous declaration",
                        );
                    }
                }
            }
        }
        let id = self
            .sema
            .context_mut()
            .record_type(kind, name, Vec::new(), false);
        if name != Name::EMPTY {
            let Self { sema, scopes, .. } = self;
            sema.bind_tag(scopes.current_mut(), name, id);
        }
        id
    }

    /// The record type a non-defining use denotes: the visible tag, or a
    /// fresh incomplete record bound now and completed later.
    fn record_for_reference(
        &mut self,
        kind: RecordKind,
        name: Name,
        _loc: SourceLocation,
    ) -> TypeId {
        if let Some(existing) = self.sema.lookup_tag(name) {
            return existing;
        }
        let id = self
            .sema
            .context_mut()
            .record_type(kind, name, Vec::new(), false);
        let Self { sema, scopes, .. } = self;
        sema.bind_tag(scopes.current_mut(), name, id);
        id
    }

    /// struct/union body: a sequence of struct-declarations between
    /// braces, completing `record_id` with the collected fields.
    fn parse_struct_union_body(&mut self, _loc: SourceLocation, record_id: TypeId) {
        let lbrace_loc = self.consume_token(); // '{'
        self.enter_scope(ScopeFlags::RECORD | ScopeFlags::DECL);
        let mut fields: Vec<FieldDecl> = Vec::new();

        while self.tok.is_not(TokenKind::RBrace) && self.tok.is_not(TokenKind::Eof) {
            // Each iteration reads one struct-declaration: one DeclSpec
            // shared across a comma-separated struct-declarator-list.
            let mut ds = DeclSpec::new();
            let mut declarators: Vec<FieldDeclarator> = Vec::new();
            self.parse_struct_declaration(&mut ds, &mut declarators);

            for mut fd in declarators {
                let floc = if fd.d.name_loc.is_valid() {
                    fd.d.name_loc
                } else {
                    lbrace_loc
                };
                let ty = self.sema.type_for_declarator(&ds, &mut fd.d, floc);
                fields.push(FieldDecl {
                    name: fd.d.name,
                    ty,
                    bit_width: fd.bit_width,
                    loc: floc,
                });
            }

            if self.tok.is(TokenKind::Semi) {
                self.consume_token();
            } else if self.tok.is(TokenKind::RBrace) {
                self.diag
                    .error(self.tok.loc(), "expected ';' at end of declaration list");
                break;
            } else {
                self.diag
                    .error(self.tok.loc(), "expected ';' at end of declaration list");
                self.skip_until(&[TokenKind::RBrace], true, true);
            }
        }

        self.expect_and_consume(TokenKind::RBrace, "expected '}'");
        self.exit_scope();
        self.sema.context_mut().complete_record(record_id, fields);
    }

    /// struct-declaration: specifier-qualifier-list followed by a
    /// comma-separated list of declarator-or-bitfield pairs, all sharing
    /// the one spec (`int a, b:3;`).
    fn parse_struct_declaration(
        &mut self,
        ds: &mut DeclSpec,
        declarators: &mut Vec<FieldDeclarator>,
    ) {
        let ds_loc = self.tok.loc();
        self.parse_specifier_qualifier_list(ds);

        // A free-standing declaration specifier: only a lone tag may
        // omit the member declarator.
        if self.tok.is(TokenKind::Semi) {
            if !ds.is_missing_declarator_ok() {
                self.diag
                    .warning(ds_loc, "declaration does not declare a member");
            }
            return;
        }

        loop {
            let mut fd = FieldDeclarator::new(ds);

            // struct-declarator:
            //     declarator
            //     declarator{opt} ':' constant-expression
            if self.tok.is_not(TokenKind::Colon) {
                self.parse_declarator(&mut fd.d);
            }
            if self.tok.is(TokenKind::Colon) {
                self.consume_token();
                fd.bit_width = self.parse_conditional_expression().map(Box::new);
            }
            declarators.push(fd);

            // The end of the struct-declarator-list.
            if self.tok.is_not(TokenKind::Comma) {
                return;
            }
            self.consume_token();
        }
    }

    // === Enums ===

    /// enum-specifier, after the consumed `enum` keyword: an optional
    /// tag and either an enumerator-list body or a reference. ISO C99
    /// forbids forward references to enum types.
    fn parse_enum_specifier(&mut self, kw_loc: SourceLocation, ds: &mut DeclSpec) {
        let mut name = Name::EMPTY;
        if self.tok.is(TokenKind::Identifier) {
            name = self.tok.ident().unwrap_or_default();
            self.consume_token();
        }

        if self.tok.is_not(TokenKind::LBrace) {
            // A reference; valid only for an already-defined enum.
            let id = match self.sema.lookup_tag(name) {
                Some(id) => id,
                None => {
                    self.diag
                        .error(kw_loc, "ISO C forbids forward references to 'enum' types");
                    self.sema.context_mut().enum_type(name, Vec::new())
                }
            };
            ds.set_type_spec_type(TypeSpecType::Enum, kw_loc, Some(TypeRep::Tag(id)), self.diag);
            return;
        }

        self.consume_token(); // '{'
        let int_ty = self.sema.context().builtins.int_ty;
        let mut enumerators = Vec::new();
        while self.tok.is_not(TokenKind::RBrace) && self.tok.is_not(TokenKind::Eof) {
            if self.tok.is_not(TokenKind::Identifier) {
                self.diag.error(self.tok.loc(), "expected identifier in enumerator list");
                self.skip_until(&[TokenKind::RBrace], true, true);
                break;
            }
            let ename = self.tok.ident().unwrap_or_default();
            let eloc = self.consume_token();
            let value = if self.tok.is(TokenKind::Equal) {
                self.consume_token();
                self.parse_conditional_expression().map(Box::new)
            } else {
                None
            };
            enumerators.push(Enumerator {
                name: ename,
                loc: eloc,
                value,
            });
            // Enum constants are ordinary identifiers of type int.
            let Self { sema, scopes, .. } = self;
            sema.bind_value(scopes.current_mut(), ename, int_ty);

            if self.tok.is(TokenKind::Comma) {
                self.consume_token(); // Trailing comma is allowed.
            } else {
                break;
            }
        }
        self.expect_and_consume(TokenKind::RBrace, "expected '}'");

        let id = self.sema.context_mut().enum_type(name, enumerators);
        if name != Name::EMPTY {
            let Self { sema, scopes, .. } = self;
            sema.bind_tag(scopes.current_mut(), name, id);
        }
        ds.set_type_spec_type(TypeSpecType::Enum, kw_loc, Some(TypeRep::Tag(id)), self.diag);
    }

    // === Init declarators and definitions ===

    /// init-declarator-list after the first (already parsed) declarator:
    /// `declarator ('=' initializer)? (',' declarator ('=' init)?)* ';'`
    fn parse_init_declarator_list(
        &mut self,
        ds: &DeclSpec,
        first: Declarator,
        context: DeclaratorContext,
        ds_loc: SourceLocation,
    ) -> Vec<Decl> {
        let mut decls = Vec::new();
        let mut d = first;
        loop {
            if let Some(decl) = self.finish_init_declarator(ds, d, ds_loc) {
                decls.push(decl);
            }
            if self.tok.is(TokenKind::Comma) {
                self.consume_token();
                d = Declarator::new(ds, context);
                self.parse_declarator(&mut d);
            } else {
                break;
            }
        }
        if !self.expect_and_consume(TokenKind::Semi, "expected ';' after declaration") {
            self.skip_until(&[TokenKind::Semi], false, false);
        }
        decls
    }

    /// Turn one parsed declarator (plus optional initializer) into a
    /// declaration and bind its name.
    fn finish_init_declarator(
        &mut self,
        ds: &DeclSpec,
        mut d: Declarator,
        ds_loc: SourceLocation,
    ) -> Option<Decl> {
        let loc = if d.name_loc.is_valid() { d.name_loc } else { ds_loc };
        let ty = self.sema.type_for_declarator(ds, &mut d, loc);

        if ds.storage_class == StorageClass::Typedef {
            if !d.has_name() || ty.is_null() {
                return None;
            }
            let alias_id = self.sema.context_mut().typedef_type(d.name, ty);
            let alias = QualType::new(alias_id);
            let Self { sema, scopes, .. } = self;
            sema.bind_typedef(scopes.current_mut(), d.name, alias);
            return Some(Decl::new(DeclKind::Typedef { name: d.name, ty: alias }, loc));
        }

        // A function declarator without a body is a prototype
        // declaration.
        if matches!(d.chunks.first(), Some(DeclaratorChunk::Function { .. })) && d.has_name() {
            if !ty.is_null() {
                let Self { sema, scopes, .. } = self;
                sema.bind_value(scopes.current_mut(), d.name, ty);
            }
            let params = function_chunk_params(&d);
            return Some(Decl::new(
                DeclKind::Function(FunctionDecl {
                    name: d.name,
                    ty,
                    storage: ds.storage_class,
                    params,
                    body: None,
                }),
                loc,
            ));
        }

        let init = if self.tok.is(TokenKind::Equal) {
            self.consume_token();
            self.parse_initializer().map(Box::new)
        } else {
            None
        };

        if !d.has_name() {
            // The declarator already produced a diagnostic if a name was
            // required here.
            return None;
        }
        if !ty.is_null() {
            let Self { sema, scopes, .. } = self;
            sema.bind_value(scopes.current_mut(), d.name, ty);
        }
        Some(Decl::new(
            DeclKind::Var(VarDecl {
                name: d.name,
                ty,
                storage: ds.storage_class,
                init,
            }),
            loc,
        ))
    }

    /// initializer: assignment-expression or a brace-enclosed
    /// initializer list (possibly nested, trailing comma allowed).
    pub(crate) fn parse_initializer(&mut self) -> Option<Expr> {
        if self.tok.is_not(TokenKind::LBrace) {
            return self.parse_assignment_expression();
        }
        let loc = self.consume_token();
        let mut elements = Vec::new();
        if self.tok.is_not(TokenKind::RBrace) {
            loop {
                match self.parse_initializer() {
                    Some(e) => elements.push(e),
                    None => {
                        self.skip_until(&[TokenKind::Comma, TokenKind::RBrace], true, true);
                    }
                }
                if self.tok.is(TokenKind::Comma) {
                    self.consume_token();
                    if self.tok.is(TokenKind::RBrace) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.expect_and_consume(TokenKind::RBrace, "expected '}'");
        Some(Expr::new(ExprKind::InitList(elements), QualType::NULL, loc))
    }

    /// function-definition: the declaration grammar already parsed the
    /// specifiers and declarator; here the parameters are bound in a
    /// fresh function scope and the body is parsed.
    fn parse_function_definition(
        &mut self,
        ds: &DeclSpec,
        mut d: Declarator,
        ds_loc: SourceLocation,
    ) -> Decl {
        let loc = if d.name_loc.is_valid() { d.name_loc } else { ds_loc };
        let ty = self.sema.type_for_declarator(ds, &mut d, loc);
        tracing::debug!(name = self.ids.spelling(d.name), "function definition");

        // Bind the function name first so the body can recurse.
        if d.has_name() && !ty.is_null() {
            let Self { sema, scopes, .. } = self;
            sema.bind_value(scopes.current_mut(), d.name, ty);
        }
        let params = function_chunk_params(&d);

        self.enter_scope(ScopeFlags::FUNC | ScopeFlags::DECL);
        for param in &params {
            if param.name != Name::EMPTY && !param.ty.is_null() {
                let Self { sema, scopes, .. } = self;
                sema.bind_value(scopes.current_mut(), param.name, param.ty);
            }
        }
        let body = self.parse_compound_statement();
        self.exit_scope();

        Decl::new(
            DeclKind::Function(FunctionDecl {
                name: d.name,
                ty,
                storage: ds.storage_class,
                params,
                body: body.map(Box::new),
            }),
            loc,
        )
    }
}

/// The parameter declarations recorded in a declarator's (outermost)
/// function chunk.
fn function_chunk_params(d: &Declarator) -> Vec<ParamDecl> {
    match d.chunks.first() {
        Some(DeclaratorChunk::Function { params, .. }) => params
            .iter()
            .map(|p| ParamDecl {
                name: p.name,
                ty: p.ty,
                loc: p.loc,
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl<'src, 'ids, 'd> Parser<'src, 'ids, 'd> {
    /// A declaration in statement position.
    pub(crate) fn parse_declaration_statement(&mut self) -> Stmt {
        let loc = self.tok.loc();
        let decls = self.parse_declaration(DeclaratorContext::Block);
        Stmt::new(StmtKind::Decl(decls), loc)
    }
}
