//! AstContext: arena-based mutable tree storage.
//!
//! Every node lives in a `PrimaryMap` owned by the context and is addressed
//! by a [`NodeRef`]. Parents hold child refs, and each node records its
//! parent so that single ownership can be enforced on every attach.
//!
//! Slot 0 of every context is the absence sentinel ([`NodeRef::EMPTY`]). It
//! is immutable, has no parent and may fill any number of optional slots.

use std::borrow::Cow;

use bough_core::{Span, Symbol};
use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::error::{AstError, AstResult};
use crate::kind::{NodeKind, PayloadClass};
use crate::refs::{NodeRef, SymbolId};
use crate::shape;

pub(crate) type ChildList = SmallVec<[NodeRef; 4]>;

/// The single active payload of a node. Which variant is active follows
/// from the node's kind and is checked by every constructor.
#[derive(Clone, Debug)]
pub(crate) enum Payload {
    None,
    Int(i64),
    Float(f64),
    Text(Box<str>),
    Ident(Symbol),
    Sym { name: Symbol, binding: SymbolId },
    Children(ChildList),
}

/// Data for a single node in the arena.
#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) payload: Payload,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeRef>,
}

/// Arena owning every node of one or more trees.
///
/// Trees are identified by their root `NodeRef`. Subtrees move between
/// parents within the same context; nodes are released when the context is
/// dropped.
pub struct AstContext {
    nodes: PrimaryMap<NodeRef, NodeData>,
}

impl AstContext {
    /// Create a context holding only the absence sentinel.
    pub fn new() -> Self {
        let mut nodes = PrimaryMap::new();
        let sentinel = nodes.push(NodeData {
            kind: NodeKind::Empty,
            payload: Payload::None,
            span: Span::default(),
            parent: None,
        });
        debug_assert_eq!(sentinel, NodeRef::EMPTY);
        Self { nodes }
    }

    /// Number of nodes allocated so far, the sentinel included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn data(&self, node: NodeRef) -> &NodeData {
        &self.nodes[node]
    }

    pub(crate) fn push(&mut self, kind: NodeKind, payload: Payload) -> NodeRef {
        self.nodes.push(NodeData {
            kind,
            payload,
            span: Span::default(),
            parent: None,
        })
    }

    // ========================================================================
    // Primitive constructors
    // ========================================================================

    /// The absence sentinel.
    pub fn empty(&self) -> NodeRef {
        NodeRef::EMPTY
    }

    /// Build a node of a payload-less kind. `Empty` yields the sentinel.
    pub fn make_leaf(&mut self, kind: NodeKind) -> AstResult<NodeRef> {
        match kind {
            NodeKind::Empty => Ok(NodeRef::EMPTY),
            _ if kind.payload_class() == PayloadClass::None => Ok(self.push(kind, Payload::None)),
            _ => Err(AstError::malformed(
                kind,
                format_args!("expected {} payload", kind.payload_class()),
            )),
        }
    }

    /// Build an integer literal, checking the value fits the kind's width.
    pub fn make_int(&mut self, kind: NodeKind, value: i64) -> AstResult<NodeRef> {
        if kind.payload_class() != PayloadClass::Int {
            return Err(AstError::malformed(
                kind,
                format_args!("integer value given, expected {} payload", kind.payload_class()),
            ));
        }
        if let Some((lo, hi)) = kind.int_bounds() {
            if !(lo..=hi).contains(&value) {
                return Err(AstError::malformed(
                    kind,
                    format_args!("value {value} outside {lo}..={hi}"),
                ));
            }
        }
        Ok(self.push(kind, Payload::Int(value)))
    }

    pub fn make_float(&mut self, kind: NodeKind, value: f64) -> AstResult<NodeRef> {
        if kind.payload_class() != PayloadClass::Float {
            return Err(AstError::malformed(
                kind,
                format_args!("float value given, expected {} payload", kind.payload_class()),
            ));
        }
        if kind == NodeKind::Float32Lit && value.is_finite() && value.abs() > f32::MAX as f64 {
            return Err(AstError::malformed(
                kind,
                format_args!("value {value} does not fit in 32 bits"),
            ));
        }
        Ok(self.push(kind, Payload::Float(value)))
    }

    /// Build a string literal, comment or identifier.
    ///
    /// `Sym` nodes need a binding and are built with [`make_sym`](Self::make_sym).
    pub fn make_text(&mut self, kind: NodeKind, text: &str) -> AstResult<NodeRef> {
        let payload = match kind {
            NodeKind::Ident => Payload::Ident(Symbol::from_dynamic(text)),
            NodeKind::Sym => {
                return Err(AstError::malformed(
                    kind,
                    "a resolved symbol needs a binding; use make_sym",
                ));
            }
            _ if kind.payload_class() == PayloadClass::Text => Payload::Text(text.into()),
            _ => {
                return Err(AstError::malformed(
                    kind,
                    format_args!("text value given, expected {} payload", kind.payload_class()),
                ));
            }
        };
        Ok(self.push(kind, payload))
    }

    /// Build an already-resolved symbol node.
    pub fn make_sym(&mut self, name: Symbol, binding: SymbolId) -> NodeRef {
        self.push(NodeKind::Sym, Payload::Sym { name, binding })
    }

    /// Build a compound node from detached children, checking its shape.
    pub fn make_compound(
        &mut self,
        kind: NodeKind,
        children: impl IntoIterator<Item = NodeRef>,
    ) -> AstResult<NodeRef> {
        if !kind.is_compound() {
            return Err(AstError::malformed(
                kind,
                format_args!("children given, expected {} payload", kind.payload_class()),
            ));
        }
        let children: ChildList = children.into_iter().collect();
        self.check_detached(&children)?;
        shape::check_shape(self, kind, &children)?;

        let node = self.nodes.next_key();
        self.adopt(node, &children);
        Ok(self.push(kind, Payload::Children(children)))
    }

    /// Start a compound node with no children, for incremental assembly.
    ///
    /// The shape is not checked until [`validate`](Self::validate).
    pub fn new_node(&mut self, kind: NodeKind) -> AstResult<NodeRef> {
        if !kind.is_compound() {
            return Err(AstError::malformed(
                kind,
                format_args!("expected {} payload", kind.payload_class()),
            ));
        }
        Ok(self.push(kind, Payload::Children(ChildList::new())))
    }

    /// Copy a subtree. The copy is detached; symbol bindings and spans are
    /// kept, and sentinel slots stay the sentinel.
    pub fn deep_copy(&mut self, node: NodeRef) -> NodeRef {
        if node == NodeRef::EMPTY {
            return node;
        }
        let root = self.copy_head(node);
        let mut pending = vec![(node, root)];
        while let Some((original, copy)) = pending.pop() {
            let children = match &self.nodes[original].payload {
                Payload::Children(children) => children.clone(),
                _ => continue,
            };
            for child in children {
                let child_copy = if child == NodeRef::EMPTY {
                    child
                } else {
                    let child_copy = self.copy_head(child);
                    self.nodes[child_copy].parent = Some(copy);
                    pending.push((child, child_copy));
                    child_copy
                };
                self.children_mut(copy).push(child_copy);
            }
        }
        root
    }

    /// A detached copy of one node with its span; compound copies start with
    /// no children.
    fn copy_head(&mut self, node: NodeRef) -> NodeRef {
        let data = &self.nodes[node];
        let (kind, span) = (data.kind, data.span);
        let payload = match &data.payload {
            Payload::Children(_) => Payload::Children(ChildList::new()),
            payload => payload.clone(),
        };
        let copy = self.push(kind, payload);
        self.nodes[copy].span = span;
        copy
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn kind(&self, node: NodeRef) -> NodeKind {
        self.nodes[node].kind
    }

    pub fn span(&self, node: NodeRef) -> Span {
        self.nodes[node].span
    }

    /// The node currently owning `node`, if any.
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node].parent
    }

    /// Whether `node` is an absence marker. Compares kinds, not identity.
    pub fn is_empty(&self, node: NodeRef) -> bool {
        self.kind(node) == NodeKind::Empty
    }

    pub fn children(&self, node: NodeRef) -> AstResult<&[NodeRef]> {
        let data = &self.nodes[node];
        match &data.payload {
            Payload::Children(children) => Ok(children),
            _ => Err(AstError::invalid_access(data.kind, "list children of")),
        }
    }

    pub fn child_count(&self, node: NodeRef) -> AstResult<usize> {
        let data = &self.nodes[node];
        match &data.payload {
            Payload::Children(children) => Ok(children.len()),
            _ => Err(AstError::invalid_access(data.kind, "count children of")),
        }
    }

    /// Indexed child access. Optional slots hold the sentinel, so a
    /// successful lookup always yields a real node.
    pub fn child(&self, node: NodeRef, index: usize) -> AstResult<NodeRef> {
        let data = &self.nodes[node];
        match &data.payload {
            Payload::Children(children) => children
                .get(index)
                .copied()
                .ok_or_else(|| AstError::index_out_of_range(data.kind, index, children.len())),
            _ => Err(AstError::invalid_access(data.kind, "index into")),
        }
    }

    pub fn last_child(&self, node: NodeRef) -> AstResult<Option<NodeRef>> {
        Ok(self.children(node)?.last().copied())
    }

    pub fn int_value(&self, node: NodeRef) -> AstResult<i64> {
        let data = &self.nodes[node];
        match data.payload {
            Payload::Int(value) => Ok(value),
            _ => Err(AstError::wrong_payload(data.kind, PayloadClass::Int)),
        }
    }

    pub fn float_value(&self, node: NodeRef) -> AstResult<f64> {
        let data = &self.nodes[node];
        match data.payload {
            Payload::Float(value) => Ok(value),
            _ => Err(AstError::wrong_payload(data.kind, PayloadClass::Float)),
        }
    }

    /// Text of a string literal, comment, identifier or symbol.
    pub fn text_value(&self, node: NodeRef) -> AstResult<Cow<'_, str>> {
        let data = &self.nodes[node];
        match &data.payload {
            Payload::Text(text) => Ok(Cow::Borrowed(text)),
            Payload::Ident(name) | Payload::Sym { name, .. } => Ok(Cow::Owned(name.to_string())),
            _ => Err(AstError::wrong_payload(data.kind, PayloadClass::Text)),
        }
    }

    /// Interned name of an `Ident` or `Sym`.
    pub fn name(&self, node: NodeRef) -> AstResult<Symbol> {
        let data = &self.nodes[node];
        match data.payload {
            Payload::Ident(name) | Payload::Sym { name, .. } => Ok(name),
            _ => Err(AstError::invalid_access(data.kind, "take the name of")),
        }
    }

    /// Symbol metadata a `Sym` node links to.
    pub fn binding(&self, node: NodeRef) -> AstResult<SymbolId> {
        let data = &self.nodes[node];
        match data.payload {
            Payload::Sym { binding, .. } => Ok(binding),
            _ => Err(AstError::invalid_access(data.kind, "take the binding of")),
        }
    }

    /// Structural equality: same kinds, payloads and children at every depth.
    /// Spans and node identities are ignored.
    pub fn tree_eq(&self, a: NodeRef, b: NodeRef) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            if a == b {
                continue;
            }
            let (da, db) = (&self.nodes[a], &self.nodes[b]);
            if da.kind != db.kind {
                return false;
            }
            let same = match (&da.payload, &db.payload) {
                (Payload::None, Payload::None) => true,
                (Payload::Int(x), Payload::Int(y)) => x == y,
                (Payload::Float(x), Payload::Float(y)) => x.to_bits() == y.to_bits(),
                (Payload::Text(x), Payload::Text(y)) => x == y,
                (Payload::Ident(x), Payload::Ident(y)) => x == y,
                (
                    Payload::Sym { name: x, binding: bx },
                    Payload::Sym { name: y, binding: by },
                ) => x == y && bx == by,
                (Payload::Children(xs), Payload::Children(ys)) => {
                    pending.extend(xs.iter().copied().zip(ys.iter().copied()));
                    xs.len() == ys.len()
                }
                _ => false,
            };
            if !same {
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Record source position for a node. The sentinel has no position.
    pub fn set_span(&mut self, node: NodeRef, span: Span) -> AstResult<()> {
        if node == NodeRef::EMPTY {
            return Err(AstError::invalid_access(NodeKind::Empty, "set the span of"));
        }
        self.nodes[node].span = span;
        Ok(())
    }

    /// Append a detached child.
    pub fn add_child(&mut self, parent: NodeRef, child: NodeRef) -> AstResult<()> {
        let len = self.child_count_for_mutation(parent, "append to")?;
        self.insert_child(parent, len, child)
    }

    /// Insert a detached child before position `index` (`index == len` appends).
    pub fn insert_child(&mut self, parent: NodeRef, index: usize, child: NodeRef) -> AstResult<()> {
        let len = self.child_count_for_mutation(parent, "insert into")?;
        if index > len {
            return Err(AstError::index_out_of_range(self.kind(parent), index, len));
        }
        self.check_attachable(parent, child)?;
        self.children_mut(parent).insert(index, child);
        self.adopt(parent, &[child]);
        tracing::trace!(%parent, %child, index, "attached child");
        Ok(())
    }

    /// Replace the child at `index`, returning the detached previous child.
    pub fn replace_child(
        &mut self,
        parent: NodeRef,
        index: usize,
        child: NodeRef,
    ) -> AstResult<NodeRef> {
        let len = self.child_count_for_mutation(parent, "replace a child of")?;
        if index >= len {
            return Err(AstError::index_out_of_range(self.kind(parent), index, len));
        }
        let old = self.children(parent)?[index];
        if old == child {
            return Ok(old);
        }
        self.check_attachable(parent, child)?;
        self.children_mut(parent)[index] = child;
        self.release(old);
        self.adopt(parent, &[child]);
        tracing::trace!(%parent, %old, new = %child, index, "replaced child");
        Ok(old)
    }

    /// Detach and return the child at `index`.
    pub fn remove_child(&mut self, parent: NodeRef, index: usize) -> AstResult<NodeRef> {
        let len = self.child_count_for_mutation(parent, "remove a child of")?;
        if index >= len {
            return Err(AstError::index_out_of_range(self.kind(parent), index, len));
        }
        let child = self.children_mut(parent).remove(index);
        self.release(child);
        tracing::trace!(%parent, %child, index, "detached child");
        Ok(child)
    }

    /// Detach every child of `parent`, in order.
    pub fn take_children(&mut self, parent: NodeRef) -> AstResult<Vec<NodeRef>> {
        self.child_count_for_mutation(parent, "take the children of")?;
        let children: Vec<NodeRef> = self.children_mut(parent).drain(..).collect();
        for &child in &children {
            self.release(child);
        }
        Ok(children)
    }

    /// Move the child at `index` of `from` to the end of `to`.
    ///
    /// On failure to attach, the child is put back where it was.
    pub fn move_child(&mut self, from: NodeRef, index: usize, to: NodeRef) -> AstResult<NodeRef> {
        let child = self.remove_child(from, index)?;
        if let Err(err) = self.add_child(to, child) {
            self.insert_child(from, index, child)?;
            return Err(err);
        }
        tracing::debug!(%from, %to, %child, "moved subtree");
        Ok(child)
    }

    /// Rewrite an identifier into a resolved symbol, in place.
    ///
    /// The node keeps its `NodeRef`, name, span and parent, so every holder
    /// observes the resolved form. Resolving an already-resolved node to the
    /// same symbol is a no-op; any other binding change is refused.
    pub fn resolve_ident(&mut self, node: NodeRef, binding: SymbolId) -> AstResult<()> {
        let data = &mut self.nodes[node];
        match data.payload {
            Payload::Ident(name) => {
                data.kind = NodeKind::Sym;
                data.payload = Payload::Sym { name, binding };
                tracing::trace!(%node, %name, %binding, "resolved identifier");
                Ok(())
            }
            Payload::Sym {
                binding: existing, ..
            } if existing == binding => Ok(()),
            Payload::Sym {
                name,
                binding: existing,
            } => Err(AstError::conflicting_resolution(name, existing, binding)),
            _ => Err(AstError::invalid_access(data.kind, "resolve")),
        }
    }

    // ========================================================================
    // Ownership bookkeeping
    // ========================================================================

    fn child_count_for_mutation(
        &self,
        parent: NodeRef,
        operation: &'static str,
    ) -> AstResult<usize> {
        let data = &self.nodes[parent];
        match &data.payload {
            Payload::Children(children) => Ok(children.len()),
            _ => Err(AstError::invalid_access(data.kind, operation)),
        }
    }

    fn children_mut(&mut self, parent: NodeRef) -> &mut ChildList {
        match &mut self.nodes[parent].payload {
            Payload::Children(children) => children,
            _ => unreachable!("child list checked by caller"),
        }
    }

    /// Children about to form a new node must all be detached and distinct.
    fn check_detached(&self, children: &[NodeRef]) -> AstResult<()> {
        for (i, &child) in children.iter().enumerate() {
            if child == NodeRef::EMPTY {
                continue;
            }
            if self.nodes[child].parent.is_some() || children[..i].contains(&child) {
                return Err(AstError::already_attached(child));
            }
        }
        Ok(())
    }

    /// `child` may go under `parent` if it is detached and not an ancestor.
    fn check_attachable(&self, parent: NodeRef, child: NodeRef) -> AstResult<()> {
        if child == NodeRef::EMPTY {
            return Ok(());
        }
        if self.nodes[child].parent.is_some() {
            return Err(AstError::already_attached(child));
        }
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(AstError::malformed(
                    self.kind(parent),
                    format_args!("attaching {child} under {parent} would create a cycle"),
                ));
            }
            cursor = self.nodes[node].parent;
        }
        Ok(())
    }

    /// Detach every child of a node that is being abandoned. The node itself
    /// stays in the arena, unreachable and childless.
    pub(crate) fn dismantle(&mut self, node: NodeRef) {
        let children = match &mut self.nodes[node].payload {
            Payload::Children(children) => std::mem::take(children),
            _ => return,
        };
        for &child in &children {
            self.release(child);
        }
        tracing::trace!(%node, released = children.len(), "dismantled node");
    }

    fn adopt(&mut self, parent: NodeRef, children: &[NodeRef]) {
        for &child in children {
            if child != NodeRef::EMPTY {
                self.nodes[child].parent = Some(parent);
            }
        }
    }

    fn release(&mut self, child: NodeRef) {
        if child != NodeRef::EMPTY {
            self.nodes[child].parent = None;
        }
    }
}

impl Default for AstContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AstErrorKind;

    fn three_arg_call(ctx: &mut AstContext) -> NodeRef {
        let callee = ctx.ident("f");
        let args = [ctx.int_lit(1), ctx.int_lit(2)];
        ctx.call(callee, args).unwrap()
    }

    #[test]
    fn sentinel_is_reserved() {
        let mut ctx = AstContext::new();
        assert_eq!(ctx.node_count(), 1);
        assert_eq!(ctx.empty(), NodeRef::EMPTY);
        assert_eq!(ctx.make_leaf(NodeKind::Empty).unwrap(), NodeRef::EMPTY);
        assert_eq!(ctx.node_count(), 1, "sentinel is never reallocated");
    }

    #[test]
    fn sentinel_is_immutable() {
        let mut ctx = AstContext::new();
        let x = ctx.ident("x");
        let err = ctx.add_child(NodeRef::EMPTY, x).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::InvalidAccess { .. }));
        assert!(ctx.set_span(NodeRef::EMPTY, Span::new(1, 2)).is_err());
        assert!(ctx.resolve_ident(NodeRef::EMPTY, SymbolId::from_u32(0)).is_err());
    }

    #[test]
    fn sentinel_may_fill_many_slots() {
        let mut ctx = AstContext::new();
        let err = ctx
            .make_compound(
                NodeKind::IdentDefs,
                [NodeRef::EMPTY, NodeRef::EMPTY, NodeRef::EMPTY],
            )
            .unwrap_err();
        // The name slot of a binding entry is not optional.
        assert!(matches!(err.kind(), AstErrorKind::MalformedNode { .. }));

        let a = ctx.ident("a");
        let defs = ctx
            .make_compound(NodeKind::IdentDefs, [a, NodeRef::EMPTY, NodeRef::EMPTY])
            .unwrap();
        assert_eq!(ctx.parent(NodeRef::EMPTY), None);
        assert_eq!(ctx.parent(a), Some(defs));
    }

    #[test]
    fn scalar_constructors_check_payload_class() {
        let mut ctx = AstContext::new();
        assert!(ctx.make_int(NodeKind::StrLit, 1).is_err());
        assert!(ctx.make_float(NodeKind::IntLit, 1.0).is_err());
        assert!(ctx.make_text(NodeKind::Call, "f").is_err());
        assert!(ctx.make_text(NodeKind::Sym, "f").is_err());
        assert!(ctx.make_leaf(NodeKind::IntLit).is_err());
        assert!(ctx.make_compound(NodeKind::StrLit, []).is_err());
        assert!(ctx.new_node(NodeKind::Ident).is_err());
    }

    #[test]
    fn int_width_is_enforced() {
        let mut ctx = AstContext::new();
        assert!(ctx.make_int(NodeKind::Int8Lit, 127).is_ok());
        assert!(ctx.make_int(NodeKind::Int8Lit, 128).is_err());
        assert!(ctx.make_int(NodeKind::UInt16Lit, -1).is_err());
        assert!(ctx.make_int(NodeKind::CharLit, 256).is_err());
        let max = ctx.make_int(NodeKind::UInt64Lit, u64::MAX as i64).unwrap();
        assert_eq!(ctx.int_value(max).unwrap() as u64, u64::MAX);
    }

    #[test]
    fn float32_range_is_enforced() {
        let mut ctx = AstContext::new();
        assert!(ctx.make_float(NodeKind::Float32Lit, 1.5).is_ok());
        assert!(ctx.make_float(NodeKind::Float32Lit, f64::MAX).is_err());
        assert!(ctx.make_float(NodeKind::Float32Lit, f64::INFINITY).is_ok());
        assert!(ctx.make_float(NodeKind::Float64Lit, f64::MAX).is_ok());
    }

    #[test]
    fn child_access_errors() {
        let mut ctx = AstContext::new();
        let call = three_arg_call(&mut ctx);
        assert_eq!(ctx.child_count(call).unwrap(), 3);

        let err = ctx.child(call, 5).unwrap_err();
        assert_eq!(
            err.kind(),
            &AstErrorKind::IndexOutOfRange {
                kind: NodeKind::Call,
                index: 5,
                len: 3,
            }
        );

        let lit = ctx.child(call, 1).unwrap();
        let err = ctx.child(lit, 0).unwrap_err();
        assert!(matches!(
            err.kind(),
            AstErrorKind::InvalidAccess {
                kind: NodeKind::IntLit,
                ..
            }
        ));
        assert!(ctx.child_count(lit).is_err());
    }

    #[test]
    fn payload_accessors_are_gated() {
        let mut ctx = AstContext::new();
        let lit = ctx.int_lit(7);
        let err = ctx.text_value(lit).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::WrongPayloadKind { .. }));
        assert!(ctx.float_value(lit).is_err());
        assert_eq!(ctx.int_value(lit).unwrap(), 7);

        let s = ctx.str_lit("hi");
        assert_eq!(ctx.text_value(s).unwrap(), "hi");
        assert!(ctx.int_value(s).is_err());
        assert!(ctx.name(s).is_err());
    }

    #[test]
    fn double_attach_is_rejected() {
        let mut ctx = AstContext::new();
        let x = ctx.ident("x");
        let list = ctx.stmt_list([x]).unwrap();
        let other = ctx.stmt_list([]).unwrap();
        let err = ctx.add_child(other, x).unwrap_err();
        assert_eq!(err.kind(), &AstErrorKind::AlreadyAttached { node: x });

        let y = ctx.ident("y");
        let err = ctx.make_compound(NodeKind::StmtList, [y, y]).unwrap_err();
        assert_eq!(err.kind(), &AstErrorKind::AlreadyAttached { node: y });
        assert_eq!(ctx.parent(x), Some(list));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut ctx = AstContext::new();
        let inner = ctx.stmt_list([]).unwrap();
        let outer = ctx.stmt_list([inner]).unwrap();
        let err = ctx.add_child(inner, outer).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::MalformedNode { .. }));
        let err = ctx.add_child(outer, outer).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::MalformedNode { .. }));
    }

    #[test]
    fn replace_and_remove_release_ownership() {
        let mut ctx = AstContext::new();
        let call = three_arg_call(&mut ctx);
        let old = ctx.child(call, 1).unwrap();
        let new = ctx.int_lit(10);
        assert_eq!(ctx.replace_child(call, 1, new).unwrap(), old);
        assert_eq!(ctx.parent(old), None);
        assert_eq!(ctx.parent(new), Some(call));

        let removed = ctx.remove_child(call, 2).unwrap();
        assert_eq!(ctx.parent(removed), None);
        assert_eq!(ctx.child_count(call).unwrap(), 2);

        let taken = ctx.take_children(call).unwrap();
        assert_eq!(taken.len(), 2);
        assert!(taken.iter().all(|&c| ctx.parent(c).is_none()));
        assert_eq!(ctx.child_count(call).unwrap(), 0);
    }

    #[test]
    fn failed_move_restores_source() {
        let mut ctx = AstContext::new();
        let call = three_arg_call(&mut ctx);
        let arg = ctx.child(call, 1).unwrap();
        let lit = ctx.int_lit(3);
        let err = ctx.move_child(call, 1, lit).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::InvalidAccess { .. }));
        assert_eq!(ctx.child(call, 1).unwrap(), arg);
        assert_eq!(ctx.parent(arg), Some(call));
    }

    #[test]
    fn insert_child_positions() {
        let mut ctx = AstContext::new();
        let list = ctx.new_node(NodeKind::StmtList).unwrap();
        let a = ctx.ident("a");
        let b = ctx.ident("b");
        let c = ctx.ident("c");
        ctx.add_child(list, c).unwrap();
        ctx.insert_child(list, 0, a).unwrap();
        ctx.insert_child(list, 1, b).unwrap();
        assert_eq!(ctx.children(list).unwrap(), &[a, b, c]);
        let d = ctx.ident("d");
        assert!(ctx.insert_child(list, 5, d).is_err());
    }

    #[test]
    fn deep_copy_is_detached_and_equal() {
        let mut ctx = AstContext::new();
        let call = three_arg_call(&mut ctx);
        ctx.set_span(call, Span::new(3, 9)).unwrap();
        let list = ctx.stmt_list([call]).unwrap();

        let copy = ctx.deep_copy(call);
        assert_ne!(copy, call);
        assert_eq!(ctx.parent(copy), None);
        assert_eq!(ctx.span(copy), Span::new(3, 9));
        assert!(ctx.tree_eq(copy, call));
        for (&a, &b) in ctx.children(copy).unwrap().iter().zip(ctx.children(call).unwrap()) {
            assert_ne!(a, b);
        }
        assert_eq!(ctx.parent(call), Some(list));
        assert_eq!(ctx.deep_copy(NodeRef::EMPTY), NodeRef::EMPTY);
    }

    #[test]
    fn tree_eq_distinguishes_payloads() {
        let mut ctx = AstContext::new();
        let a = ctx.int_lit(1);
        let b = ctx.int_lit(1);
        let c = ctx.make_int(NodeKind::Int8Lit, 1).unwrap();
        let nan_a = ctx.float_lit(f64::NAN);
        let nan_b = ctx.float_lit(f64::NAN);
        assert!(ctx.tree_eq(a, b));
        assert!(!ctx.tree_eq(a, c));
        assert!(ctx.tree_eq(nan_a, nan_b));
        assert!(!ctx.tree_eq(a, NodeRef::EMPTY));
    }

    #[test]
    fn copy_and_compare_handle_deep_nesting() {
        let mut ctx = AstContext::new();
        let mut chain = ctx.ident("x");
        for _ in 0..200_000 {
            chain = ctx.make_compound(NodeKind::Par, [chain]).unwrap();
        }
        let copy = ctx.deep_copy(chain);
        assert!(ctx.tree_eq(chain, copy));

        let mut leaf = copy;
        while ctx.kind(leaf) == NodeKind::Par {
            leaf = ctx.child(leaf, 0).unwrap();
        }
        ctx.resolve_ident(leaf, SymbolId::from_u32(1)).unwrap();
        assert!(!ctx.tree_eq(chain, copy));
    }

    #[test]
    fn dismantle_releases_children() {
        let mut ctx = AstContext::new();
        let call = three_arg_call(&mut ctx);
        let args = ctx.children(call).unwrap().to_vec();
        ctx.dismantle(call);
        assert_eq!(ctx.child_count(call).unwrap(), 0);
        for arg in args {
            assert_eq!(ctx.parent(arg), None);
        }
    }

    #[test]
    fn resolve_keeps_identity_and_span() {
        let mut ctx = AstContext::new();
        let x = ctx.ident("x");
        ctx.set_span(x, Span::new(4, 5)).unwrap();
        let list = ctx.stmt_list([x]).unwrap();

        let sym = SymbolId::from_u32(7);
        ctx.resolve_ident(x, sym).unwrap();
        assert_eq!(ctx.child(list, 0).unwrap(), x);
        assert_eq!(ctx.kind(x), NodeKind::Sym);
        assert_eq!(ctx.name(x).unwrap(), "x");
        assert_eq!(ctx.binding(x).unwrap(), sym);
        assert_eq!(ctx.span(x), Span::new(4, 5));
        assert_eq!(ctx.parent(x), Some(list));
    }

    #[test]
    fn resolve_rejects_rebinding() {
        let mut ctx = AstContext::new();
        let x = ctx.ident("x");
        ctx.resolve_ident(x, SymbolId::from_u32(1)).unwrap();
        let err = ctx.resolve_ident(x, SymbolId::from_u32(2)).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::ConflictingResolution { .. }));
        assert_eq!(ctx.binding(x).unwrap(), SymbolId::from_u32(1));

        let lit = ctx.int_lit(1);
        let err = ctx.resolve_ident(lit, SymbolId::from_u32(1)).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::InvalidAccess { .. }));
    }
}
