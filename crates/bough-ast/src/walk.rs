//! Pre-order traversal of subtrees.
//!
//! Absent slots (the sentinel) are never visited.

use std::ops::ControlFlow;

use bough_core::Symbol;

use crate::context::AstContext;
use crate::error::AstResult;
use crate::kind::NodeKind;
use crate::refs::{NodeRef, SymbolId};

/// Controls whether to descend into children during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Continue walking and descend into the children.
    Advance,
    /// Skip the children of the current node.
    Skip,
}

/// Walk a node and its descendants in pre-order.
pub fn walk<B>(
    ctx: &AstContext,
    node: NodeRef,
    f: &mut dyn FnMut(NodeRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        if node == NodeRef::EMPTY {
            continue;
        }
        match f(node) {
            ControlFlow::Break(b) => return ControlFlow::Break(b),
            ControlFlow::Continue(WalkAction::Skip) => continue,
            ControlFlow::Continue(WalkAction::Advance) => {}
        }
        if let Ok(children) = ctx.children(node) {
            stack.extend(children.iter().rev().copied());
        }
    }
    ControlFlow::Continue(())
}

/// Walk only nodes of one kind. Nodes of other kinds are still descended into.
pub fn walk_kind<B>(
    ctx: &AstContext,
    node: NodeRef,
    kind: NodeKind,
    f: &mut dyn FnMut(NodeRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    walk(ctx, node, &mut |n| {
        if ctx.kind(n) == kind {
            f(n)
        } else {
            ControlFlow::Continue(WalkAction::Advance)
        }
    })
}

/// Pre-order iterator over a node and its descendants.
pub struct Descendants<'a> {
    ctx: &'a AstContext,
    stack: Vec<NodeRef>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let node = self.stack.pop()?;
        if let Ok(children) = self.ctx.children(node) {
            self.stack.extend(
                children
                    .iter()
                    .rev()
                    .copied()
                    .filter(|&c| c != NodeRef::EMPTY),
            );
        }
        Some(node)
    }
}

pub fn descendants(ctx: &AstContext, root: NodeRef) -> Descendants<'_> {
    let stack = if root == NodeRef::EMPTY {
        Vec::new()
    } else {
        vec![root]
    };
    Descendants { ctx, stack }
}

impl AstContext {
    /// Resolve every identifier under `root` for which `lookup` yields a
    /// symbol. Returns the number of identifiers rewritten.
    ///
    /// Identifiers `lookup` declines are left untouched.
    pub fn rewrite_idents(
        &mut self,
        root: NodeRef,
        mut lookup: impl FnMut(NodeRef, Symbol) -> Option<SymbolId>,
    ) -> AstResult<usize> {
        let idents: Vec<NodeRef> = descendants(self, root)
            .filter(|&n| self.kind(n) == NodeKind::Ident)
            .collect();
        let mut rewritten = 0;
        for node in idents {
            let name = self.name(node)?;
            if let Some(binding) = lookup(node, name) {
                self.resolve_ident(node, binding)?;
                rewritten += 1;
            }
        }
        tracing::debug!(%root, rewritten, "rewrote identifiers");
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ctx: &mut AstContext) -> NodeRef {
        // x = f(y, 1); return
        let (x, f, y, one) = (ctx.ident("x"), ctx.ident("f"), ctx.ident("y"), ctx.int_lit(1));
        let call = ctx.call(f, [y, one]).unwrap();
        let asgn = ctx.asgn(x, call).unwrap();
        let ret = ctx.return_stmt(None).unwrap();
        ctx.stmt_list([asgn, ret]).unwrap()
    }

    #[test]
    fn preorder_skips_sentinel() {
        let mut ctx = AstContext::new();
        let root = sample(&mut ctx);
        let kinds: Vec<NodeKind> = descendants(&ctx, root).map(|n| ctx.kind(n)).collect();
        assert_eq!(
            kinds,
            [
                NodeKind::StmtList,
                NodeKind::Asgn,
                NodeKind::Ident,
                NodeKind::Call,
                NodeKind::Ident,
                NodeKind::Ident,
                NodeKind::IntLit,
                NodeKind::ReturnStmt,
            ]
        );
        assert_eq!(descendants(&ctx, NodeRef::EMPTY).count(), 0);
    }

    #[test]
    fn walk_matches_iterator() {
        let mut ctx = AstContext::new();
        let root = sample(&mut ctx);
        let mut seen = Vec::new();
        let _ = walk::<()>(&ctx, root, &mut |n| {
            seen.push(n);
            ControlFlow::Continue(WalkAction::Advance)
        });
        assert_eq!(seen, descendants(&ctx, root).collect::<Vec<_>>());
    }

    #[test]
    fn walk_skip_and_break() {
        let mut ctx = AstContext::new();
        let root = sample(&mut ctx);

        let mut count = 0;
        let _ = walk::<()>(&ctx, root, &mut |n| {
            count += 1;
            if ctx.kind(n) == NodeKind::Call {
                ControlFlow::Continue(WalkAction::Skip)
            } else {
                ControlFlow::Continue(WalkAction::Advance)
            }
        });
        assert_eq!(count, 5);

        let found = walk(&ctx, root, &mut |n| {
            if ctx.kind(n) == NodeKind::IntLit {
                ControlFlow::Break(n)
            } else {
                ControlFlow::Continue(WalkAction::Advance)
            }
        });
        let ControlFlow::Break(lit) = found else {
            panic!("literal not found");
        };
        assert_eq!(ctx.int_value(lit).unwrap(), 1);
    }

    #[test]
    fn walk_handles_deep_nesting() {
        let mut ctx = AstContext::new();
        let mut chain = ctx.ident("x");
        for _ in 0..200_000 {
            chain = ctx.make_compound(NodeKind::Par, [chain]).unwrap();
        }
        let mut count = 0usize;
        let _ = walk::<()>(&ctx, chain, &mut |_| {
            count += 1;
            ControlFlow::Continue(WalkAction::Advance)
        });
        assert_eq!(count, 200_001);
    }

    #[test]
    fn walk_kind_filters() {
        let mut ctx = AstContext::new();
        let root = sample(&mut ctx);
        let mut names = Vec::new();
        let _ = walk_kind::<()>(&ctx, root, NodeKind::Ident, &mut |n| {
            names.push(ctx.name(n).unwrap().to_string());
            ControlFlow::Continue(WalkAction::Advance)
        });
        assert_eq!(names, ["x", "f", "y"]);
    }

    #[test]
    fn rewrite_resolves_known_names() {
        let mut ctx = AstContext::new();
        let root = sample(&mut ctx);
        let rewritten = ctx
            .rewrite_idents(root, |_, name| match name.to_string().as_str() {
                "x" => Some(SymbolId::from_u32(0)),
                "y" => Some(SymbolId::from_u32(1)),
                _ => None,
            })
            .unwrap();
        assert_eq!(rewritten, 2);
        let kinds: Vec<NodeKind> = descendants(&ctx, root)
            .filter(|&n| matches!(ctx.kind(n), NodeKind::Ident | NodeKind::Sym))
            .map(|n| ctx.kind(n))
            .collect();
        assert_eq!(kinds, [NodeKind::Sym, NodeKind::Ident, NodeKind::Sym]);

        // Already-resolved nodes are no longer identifiers.
        let again = ctx
            .rewrite_idents(root, |_, _| Some(SymbolId::from_u32(2)))
            .unwrap();
        assert_eq!(again, 1);
    }
}
