//! Constructors for common node shapes.
//!
//! Everything here goes through [`AstContext::make_compound`], so every
//! node produced is checked against the shape table. Builders mirror the
//! `kind(children...)` and `kind(field = value)` notations used by macro
//! code:
//!
//! ```
//! use bough_ast::{AstContext, NodeKind, NodeBuilder};
//!
//! let mut ctx = AstContext::new();
//! let callee = ctx.ident("echo");
//! let arg = ctx.str_lit("hi");
//! let call = NodeBuilder::new(NodeKind::Command)
//!     .child(callee)
//!     .child(arg)
//!     .build(&mut ctx)
//!     .unwrap();
//! assert_eq!(ctx.child_count(call).unwrap(), 2);
//! ```

use bough_core::{Span, Symbol, symbols};

use crate::context::{AstContext, Payload};
use crate::error::{AstError, AstResult};
use crate::kind::NodeKind;
use crate::refs::NodeRef;

symbols! {
    OP_AS => "as",
    OP_RANGE => "..",
    OP_EXPORT => "*",
}

/// Fluent `kind(children...)` construction.
pub struct NodeBuilder {
    kind: NodeKind,
    children: Vec<NodeRef>,
    span: Option<Span>,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            span: None,
        }
    }

    pub fn child(mut self, child: NodeRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = NodeRef>) -> Self {
        self.children.extend(children);
        self
    }

    /// Fill an optional slot, using the sentinel for `None`.
    pub fn opt(self, child: Option<NodeRef>) -> Self {
        self.child(child.unwrap_or(NodeRef::EMPTY))
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self, ctx: &mut AstContext) -> AstResult<NodeRef> {
        let node = ctx.make_compound(self.kind, self.children)?;
        if let Some(span) = self.span {
            ctx.set_span(node, span)?;
        }
        Ok(node)
    }
}

/// Intermediate nodes built on the way to a composite node.
#[derive(Default)]
struct Parts(Vec<NodeRef>);

impl Parts {
    fn add(&mut self, node: AstResult<NodeRef>) -> AstResult<NodeRef> {
        let node = node?;
        self.0.push(node);
        Ok(node)
    }
}

impl AstContext {
    /// Run a multi-node construction. If it fails, every intermediate node
    /// recorded in `Parts` gives its children back, so the caller's nodes
    /// are detached again and may be reused.
    fn composite(
        &mut self,
        build: impl FnOnce(&mut AstContext, &mut Parts) -> AstResult<NodeRef>,
    ) -> AstResult<NodeRef> {
        let mut parts = Parts::default();
        let result = build(self, &mut parts);
        if result.is_err() {
            for &part in parts.0.iter().rev() {
                self.dismantle(part);
            }
        }
        result
    }
}

/// One branch of a multi-way branch (`CaseStmt`) or variant group.
#[derive(Clone, Debug)]
pub enum CaseBranch {
    /// `of v1, v2: body`; values may be `Range` nodes.
    Of { values: Vec<NodeRef>, body: NodeRef },
    /// `elif cond: body`.
    Elif { cond: NodeRef, body: NodeRef },
    /// Fallthrough body; only valid as the last branch.
    Else(NodeRef),
}

/// An entry of an object field list.
#[derive(Clone, Debug)]
pub enum FieldEntry {
    /// A plain `IdentDefs` field declaration.
    Field(NodeRef),
    Variant(VariantGroup),
}

/// Fields selected by the value of a discriminator field.
#[derive(Clone, Debug)]
pub struct VariantGroup {
    /// The discriminator, an `IdentDefs` entry.
    pub discriminator: NodeRef,
    pub branches: Vec<VariantBranch>,
    pub otherwise: Option<Vec<FieldEntry>>,
}

#[derive(Clone, Debug)]
pub struct VariantBranch {
    pub values: Vec<NodeRef>,
    pub fields: Vec<FieldEntry>,
}

/// Fluent `kind(field = value)` construction of routine definitions.
///
/// Unset slots become the sentinel, except the formal parameter list which
/// is always present.
pub struct RoutineBuilder {
    kind: NodeKind,
    name: NodeRef,
    pattern: Option<NodeRef>,
    generic_params: Vec<NodeRef>,
    return_type: Option<NodeRef>,
    params: Vec<NodeRef>,
    pragmas: Vec<NodeRef>,
    body: Option<NodeRef>,
    span: Option<Span>,
}

impl RoutineBuilder {
    /// A named routine of the given kind (`ProcDef`, `MacroDef`, ...).
    pub fn new(kind: NodeKind, name: NodeRef) -> Self {
        Self {
            kind,
            name,
            pattern: None,
            generic_params: Vec::new(),
            return_type: None,
            params: Vec::new(),
            pragmas: Vec::new(),
            body: None,
            span: None,
        }
    }

    /// An anonymous `LambdaExpr`.
    pub fn lambda() -> Self {
        Self::new(NodeKind::LambdaExpr, NodeRef::EMPTY)
    }

    /// Term-rewriting pattern slot.
    pub fn pattern(mut self, pattern: NodeRef) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Add a generic parameter entry (`IdentDefs`).
    pub fn generic_param(mut self, def: NodeRef) -> Self {
        self.generic_params.push(def);
        self
    }

    /// Add a parameter entry (`IdentDefs`); several names may share it.
    pub fn param(mut self, def: NodeRef) -> Self {
        self.params.push(def);
        self
    }

    pub fn returns(mut self, ty: NodeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn pragma(mut self, entry: NodeRef) -> Self {
        self.pragmas.push(entry);
        self
    }

    pub fn body(mut self, body: NodeRef) -> Self {
        self.body = Some(body);
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self, ctx: &mut AstContext) -> AstResult<NodeRef> {
        if !self.kind.is_routine() {
            return Err(AstError::malformed(self.kind, "not a routine kind"));
        }
        ctx.composite(move |ctx, parts| {
            let generics = if self.generic_params.is_empty() {
                NodeRef::EMPTY
            } else {
                parts.add(ctx.generic_params(self.generic_params))?
            };
            let formal = parts.add(ctx.formal_params(self.return_type, self.params))?;
            let pragmas = if self.pragmas.is_empty() {
                NodeRef::EMPTY
            } else {
                parts.add(ctx.pragma(self.pragmas))?
            };
            let mut builder = NodeBuilder::new(self.kind)
                .child(self.name)
                .opt(self.pattern)
                .child(generics)
                .child(formal)
                .child(pragmas)
                .child(NodeRef::EMPTY)
                .opt(self.body);
            builder.span = self.span;
            builder.build(ctx)
        })
    }
}

impl AstContext {
    // ========================================================================
    // Literals and names
    // ========================================================================

    pub fn ident(&mut self, name: &str) -> NodeRef {
        self.ident_sym(Symbol::from_dynamic(name))
    }

    /// Identifier from an already-interned name.
    pub fn ident_sym(&mut self, name: Symbol) -> NodeRef {
        self.push(NodeKind::Ident, Payload::Ident(name))
    }

    pub fn int_lit(&mut self, value: i64) -> NodeRef {
        self.push(NodeKind::IntLit, Payload::Int(value))
    }

    pub fn float_lit(&mut self, value: f64) -> NodeRef {
        self.push(NodeKind::FloatLit, Payload::Float(value))
    }

    pub fn str_lit(&mut self, value: &str) -> NodeRef {
        self.push(NodeKind::StrLit, Payload::Text(value.into()))
    }

    pub fn char_lit(&mut self, value: u8) -> NodeRef {
        self.push(NodeKind::CharLit, Payload::Int(value.into()))
    }

    pub fn nil_lit(&mut self) -> NodeRef {
        self.push(NodeKind::NilLit, Payload::None)
    }

    pub fn comment(&mut self, text: &str) -> NodeRef {
        self.push(NodeKind::CommentStmt, Payload::Text(text.into()))
    }

    // ========================================================================
    // Calls and operators
    // ========================================================================

    pub fn call(
        &mut self,
        callee: NodeRef,
        args: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::Call)
            .child(callee)
            .children(args)
            .build(self)
    }

    pub fn command(
        &mut self,
        callee: NodeRef,
        args: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::Command)
            .child(callee)
            .children(args)
            .build(self)
    }

    /// `callee"text"`, with the text as a raw or triple-quoted string.
    pub fn call_str_lit(
        &mut self,
        callee: NodeRef,
        text: &str,
        triple: bool,
    ) -> AstResult<NodeRef> {
        let kind = if triple {
            NodeKind::TripleStrLit
        } else {
            NodeKind::RStrLit
        };
        let lit = self.make_text(kind, text)?;
        self.make_compound(NodeKind::CallStrLit, [callee, lit])
    }

    pub fn infix(&mut self, op: &str, left: NodeRef, right: NodeRef) -> AstResult<NodeRef> {
        let op = self.ident(op);
        self.make_compound(NodeKind::Infix, [op, left, right])
    }

    pub fn prefix(&mut self, op: &str, operand: NodeRef) -> AstResult<NodeRef> {
        let op = self.ident(op);
        self.make_compound(NodeKind::Prefix, [op, operand])
    }

    pub fn postfix(&mut self, op: &str, operand: NodeRef) -> AstResult<NodeRef> {
        let op = self.ident(op);
        self.make_compound(NodeKind::Postfix, [op, operand])
    }

    /// `name*`: marks a declared name as exported.
    pub fn export_marker(&mut self, name: NodeRef) -> AstResult<NodeRef> {
        let op = self.ident_sym(OP_EXPORT());
        self.make_compound(NodeKind::Postfix, [op, name])
    }

    /// `lo .. hi` in general expression position.
    pub fn range_op(&mut self, lo: NodeRef, hi: NodeRef) -> AstResult<NodeRef> {
        let op = self.ident_sym(OP_RANGE());
        self.make_compound(NodeKind::Infix, [op, lo, hi])
    }

    /// `lo .. hi` as a case-branch value.
    pub fn case_range(&mut self, lo: NodeRef, hi: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Range, [lo, hi])
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// `name: value`.
    pub fn colon_pair(&mut self, name: NodeRef, value: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::ExprColonExpr, [name, value])
    }

    /// `name = value` as a named argument.
    pub fn named_arg(&mut self, name: NodeRef, value: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::ExprEqExpr, [name, value])
    }

    pub fn dot_expr(&mut self, object: NodeRef, member: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::DotExpr, [object, member])
    }

    pub fn bracket_expr(
        &mut self,
        object: NodeRef,
        indices: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::BracketExpr)
            .child(object)
            .children(indices)
            .build(self)
    }

    pub fn par(&mut self, inner: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Par, [inner])
    }

    pub fn tuple(&mut self, elems: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::TupleConstr, elems)
    }

    pub fn array(&mut self, elems: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Bracket, elems)
    }

    pub fn set(&mut self, elems: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Curly, elems)
    }

    /// Table constructor from `ExprColonExpr` pairs.
    pub fn table(&mut self, pairs: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::TableConstr, pairs)
    }

    pub fn obj_constr(
        &mut self,
        ty: NodeRef,
        fields: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::ObjConstr)
            .child(ty)
            .children(fields)
            .build(self)
    }

    pub fn deref(&mut self, operand: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::DerefExpr, [operand])
    }

    pub fn addr(&mut self, operand: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Addr, [operand])
    }

    pub fn cast(&mut self, ty: NodeRef, operand: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Cast, [ty, operand])
    }

    /// Conditional expression from `(condition, value)` branches.
    pub fn if_expr(
        &mut self,
        branches: impl IntoIterator<Item = (NodeRef, NodeRef)>,
        else_value: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        self.conditional(
            NodeKind::IfExpr,
            NodeKind::ElifExpr,
            NodeKind::ElseExpr,
            branches,
            else_value,
        )
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn stmt_list(&mut self, stmts: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::StmtList, stmts)
    }

    pub fn asgn(&mut self, target: NodeRef, value: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Asgn, [target, value])
    }

    /// Conditional statement from `(condition, body)` branches. Without an
    /// else body the node simply ends after the last branch.
    pub fn if_stmt(
        &mut self,
        branches: impl IntoIterator<Item = (NodeRef, NodeRef)>,
        else_body: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        self.conditional(
            NodeKind::IfStmt,
            NodeKind::ElifBranch,
            NodeKind::Else,
            branches,
            else_body,
        )
    }

    pub fn when_stmt(
        &mut self,
        branches: impl IntoIterator<Item = (NodeRef, NodeRef)>,
        else_body: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        self.conditional(
            NodeKind::WhenStmt,
            NodeKind::ElifBranch,
            NodeKind::Else,
            branches,
            else_body,
        )
    }

    fn conditional(
        &mut self,
        kind: NodeKind,
        branch_kind: NodeKind,
        else_kind: NodeKind,
        branches: impl IntoIterator<Item = (NodeRef, NodeRef)>,
        otherwise: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        self.composite(|ctx, parts| {
            let mut children = Vec::new();
            for (cond, body) in branches {
                children.push(parts.add(ctx.make_compound(branch_kind, [cond, body]))?);
            }
            if let Some(body) = otherwise {
                children.push(parts.add(ctx.make_compound(else_kind, [body]))?);
            }
            ctx.make_compound(kind, children)
        })
    }

    pub fn case_stmt(
        &mut self,
        subject: NodeRef,
        branches: impl IntoIterator<Item = CaseBranch>,
    ) -> AstResult<NodeRef> {
        self.composite(|ctx, parts| {
            let mut children = vec![subject];
            for branch in branches {
                children.push(parts.add(ctx.case_branch(branch))?);
            }
            ctx.make_compound(NodeKind::CaseStmt, children)
        })
    }

    fn case_branch(&mut self, branch: CaseBranch) -> AstResult<NodeRef> {
        match branch {
            CaseBranch::Of { values, body } => NodeBuilder::new(NodeKind::OfBranch)
                .children(values)
                .child(body)
                .build(self),
            CaseBranch::Elif { cond, body } => {
                self.make_compound(NodeKind::ElifBranch, [cond, body])
            }
            CaseBranch::Else(body) => self.make_compound(NodeKind::Else, [body]),
        }
    }

    pub fn while_stmt(&mut self, cond: NodeRef, body: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::WhileStmt, [cond, body])
    }

    pub fn for_stmt(
        &mut self,
        vars: impl IntoIterator<Item = NodeRef>,
        iterable: NodeRef,
        body: NodeRef,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::ForStmt)
            .children(vars)
            .child(iterable)
            .child(body)
            .build(self)
    }

    /// `try` with `(exception types, handler)` clauses. An empty type list
    /// catches everything.
    pub fn try_stmt(
        &mut self,
        body: NodeRef,
        handlers: impl IntoIterator<Item = (Vec<NodeRef>, NodeRef)>,
        finally: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        self.composite(|ctx, parts| {
            let mut children = vec![body];
            for (types, handler) in handlers {
                let branch = NodeBuilder::new(NodeKind::ExceptBranch)
                    .children(types)
                    .child(handler)
                    .build(ctx);
                children.push(parts.add(branch)?);
            }
            if let Some(finally) = finally {
                children.push(parts.add(ctx.make_compound(NodeKind::Finally, [finally]))?);
            }
            ctx.make_compound(NodeKind::TryStmt, children)
        })
    }

    pub fn return_stmt(&mut self, value: Option<NodeRef>) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::ReturnStmt).opt(value).build(self)
    }

    pub fn yield_stmt(&mut self, value: Option<NodeRef>) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::YieldStmt).opt(value).build(self)
    }

    pub fn discard_stmt(&mut self, value: Option<NodeRef>) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::DiscardStmt).opt(value).build(self)
    }

    pub fn raise_stmt(&mut self, value: Option<NodeRef>) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::RaiseStmt).opt(value).build(self)
    }

    pub fn break_stmt(&mut self, label: Option<NodeRef>) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::BreakStmt).opt(label).build(self)
    }

    pub fn continue_stmt(&mut self, label: Option<NodeRef>) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::ContinueStmt).opt(label).build(self)
    }

    pub fn block_stmt(&mut self, label: Option<NodeRef>, body: NodeRef) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::BlockStmt)
            .opt(label)
            .child(body)
            .build(self)
    }

    // ========================================================================
    // Imports
    // ========================================================================

    pub fn import_stmt(
        &mut self,
        modules: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::ImportStmt, modules)
    }

    /// `import module as alias`, expressed with an `as` infix.
    pub fn import_as(&mut self, module: NodeRef, alias: NodeRef) -> AstResult<NodeRef> {
        let op = self.ident_sym(OP_AS());
        self.composite(|ctx, parts| {
            let aliased = parts.add(ctx.make_compound(NodeKind::Infix, [op, module, alias]))?;
            ctx.make_compound(NodeKind::ImportStmt, [aliased])
        })
    }

    pub fn import_except(
        &mut self,
        module: NodeRef,
        excluded: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::ImportExceptStmt)
            .child(module)
            .children(excluded)
            .build(self)
    }

    pub fn from_import(
        &mut self,
        module: NodeRef,
        names: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::FromStmt)
            .child(module)
            .children(names)
            .build(self)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Binding entry: one or more names sharing a type and default value.
    pub fn ident_defs(
        &mut self,
        names: impl IntoIterator<Item = NodeRef>,
        ty: Option<NodeRef>,
        value: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::IdentDefs)
            .children(names)
            .opt(ty)
            .opt(value)
            .build(self)
    }

    pub fn var_section(&mut self, defs: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::VarSection, defs)
    }

    pub fn let_section(&mut self, defs: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::LetSection, defs)
    }

    /// Constant entry. The value is mandatory: `None` fails the shape check.
    pub fn const_def(
        &mut self,
        name: NodeRef,
        ty: Option<NodeRef>,
        value: Option<NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::ConstDef)
            .child(name)
            .opt(ty)
            .opt(value)
            .build(self)
    }

    pub fn const_section(
        &mut self,
        defs: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::ConstSection, defs)
    }

    pub fn type_def(
        &mut self,
        name: NodeRef,
        generic_params: Option<NodeRef>,
        body: NodeRef,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::TypeDef)
            .child(name)
            .opt(generic_params)
            .child(body)
            .build(self)
    }

    pub fn type_section(
        &mut self,
        defs: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::TypeSection, defs)
    }

    pub fn generic_params(
        &mut self,
        defs: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::GenericParams, defs)
    }

    pub fn formal_params(
        &mut self,
        return_type: Option<NodeRef>,
        params: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::FormalParams)
            .opt(return_type)
            .children(params)
            .build(self)
    }

    pub fn pragma(&mut self, entries: impl IntoIterator<Item = NodeRef>) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::Pragma, entries)
    }

    pub fn pragma_expr(&mut self, subject: NodeRef, pragma: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::PragmaExpr, [subject, pragma])
    }

    // ========================================================================
    // Type bodies
    // ========================================================================

    /// Object type body. `base` is wrapped in `OfInherit`; an empty field
    /// list still produces a `RecList`.
    pub fn object_ty(
        &mut self,
        pragma: Option<NodeRef>,
        base: Option<NodeRef>,
        fields: Vec<FieldEntry>,
    ) -> AstResult<NodeRef> {
        self.composite(|ctx, parts| {
            let inherit = match base {
                Some(base) => parts.add(ctx.make_compound(NodeKind::OfInherit, [base]))?,
                None => NodeRef::EMPTY,
            };
            let fields = ctx.field_list_in(parts, fields);
            let fields = parts.add(fields)?;
            NodeBuilder::new(NodeKind::ObjectTy)
                .opt(pragma)
                .child(inherit)
                .child(fields)
                .build(ctx)
        })
    }

    /// Build a `RecList`, expanding variant groups into `RecCase` nodes.
    pub fn field_list(&mut self, entries: Vec<FieldEntry>) -> AstResult<NodeRef> {
        self.composite(|ctx, parts| ctx.field_list_in(parts, entries))
    }

    fn field_list_in(&mut self, parts: &mut Parts, entries: Vec<FieldEntry>) -> AstResult<NodeRef> {
        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let child = match entry {
                FieldEntry::Field(def) => def,
                FieldEntry::Variant(group) => {
                    let group = self.variant_group(parts, group);
                    parts.add(group)?
                }
            };
            children.push(child);
        }
        self.make_compound(NodeKind::RecList, children)
    }

    fn variant_group(&mut self, parts: &mut Parts, group: VariantGroup) -> AstResult<NodeRef> {
        let mut children = vec![group.discriminator];
        for branch in group.branches {
            let fields = self.field_list_in(parts, branch.fields);
            let fields = parts.add(fields)?;
            let branch = NodeBuilder::new(NodeKind::OfBranch)
                .children(branch.values)
                .child(fields)
                .build(self);
            children.push(parts.add(branch)?);
        }
        if let Some(otherwise) = group.otherwise {
            let fields = self.field_list_in(parts, otherwise);
            let fields = parts.add(fields)?;
            children.push(parts.add(self.make_compound(NodeKind::Else, [fields]))?);
        }
        self.make_compound(NodeKind::RecCase, children)
    }

    pub fn enum_ty(
        &mut self,
        pragma: Option<NodeRef>,
        fields: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        NodeBuilder::new(NodeKind::EnumTy)
            .opt(pragma)
            .children(fields)
            .build(self)
    }

    /// Enum member with an explicit value.
    pub fn enum_field(&mut self, name: NodeRef, value: NodeRef) -> AstResult<NodeRef> {
        self.make_compound(NodeKind::EnumFieldDef, [name, value])
    }
}
