//! Entity references.
//!
//! Each ref type is a thin `u32` wrapper providing type-safe indexing
//! into `PrimaryMap` storage. A `NodeRef` is only meaningful for the
//! `AstContext` that produced it.

use cranelift_entity::entity_impl;

/// Reference to a node in an [`AstContext`](crate::AstContext).
///
/// The reference is the node's identity: in-place rewrites change what the
/// node holds, never which `NodeRef` names it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);
entity_impl!(NodeRef, "node");

impl NodeRef {
    /// The absence sentinel, reserved at index 0 of every context.
    pub const EMPTY: NodeRef = NodeRef(0);
}

/// Reference to symbol metadata owned by the resolution pass.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);
entity_impl!(SymbolId, "sym");

/// Reference to a lexical scope recorded by the resolution pass.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);
entity_impl!(ScopeId, "scope");
