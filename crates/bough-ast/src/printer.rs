//! Indented debug dump of a subtree.
//!
//! One line per node, kind name followed by its payload:
//!
//! ```text
//! Infix
//!   Ident "+"
//!   IntLit 5
//!   IntLit 3
//! ```
//!
//! This is a structural dump for tests and diagnostics, not source text.

use std::fmt::{self, Write};

use crate::context::{AstContext, Payload};
use crate::kind::NodeKind;
use crate::refs::NodeRef;

/// Dump `node` and its descendants.
pub fn tree_repr(ctx: &AstContext, node: NodeRef) -> String {
    let mut out = String::new();
    write_node(ctx, &mut out, node).expect("fmt::Write to String never fails");
    out
}

/// Dump `node` alone, without children.
pub fn node_repr(ctx: &AstContext, node: NodeRef) -> String {
    let mut out = String::new();
    write_head(ctx, &mut out, node).expect("fmt::Write to String never fails");
    out
}

fn write_node(ctx: &AstContext, f: &mut impl Write, root: NodeRef) -> fmt::Result {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > 0 {
            writeln!(f)?;
        }
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        write_head(ctx, f, node)?;
        if let Payload::Children(children) = &ctx.data(node).payload {
            stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
        }
    }
    Ok(())
}

fn write_head(ctx: &AstContext, f: &mut impl Write, node: NodeRef) -> fmt::Result {
    let data = ctx.data(node);
    f.write_str(data.kind.name())?;
    match &data.payload {
        Payload::None | Payload::Children(_) => Ok(()),
        Payload::Int(v) => match data.kind {
            NodeKind::CharLit => write!(f, " {:?}", char::from(*v as u8)),
            NodeKind::UIntLit | NodeKind::UInt64Lit => write!(f, " {}", *v as u64),
            _ => write!(f, " {v}"),
        },
        Payload::Float(v) => write!(f, " {v:?}"),
        Payload::Text(text) => write!(f, " {text:?}"),
        Payload::Ident(name) => name.with_str(|s| write!(f, " {s:?}")),
        Payload::Sym { name, binding } => name.with_str(|s| write!(f, " {s:?} {binding}")),
    }
}
