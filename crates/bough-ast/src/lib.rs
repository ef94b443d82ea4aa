//! Mutable syntax tree for the bough compiler and its macros.
//!
//! Nodes live in an [`AstContext`] arena and are addressed by [`NodeRef`].
//! Every node carries a [`NodeKind`] and exactly one payload: nothing, an
//! integer, a float, text, or an ordered list of children. Compound kinds
//! follow the shape table in [`shape`]; absent optional slots hold the
//! sentinel [`NodeRef::EMPTY`].
//!
//! ## Quick start
//!
//! ```
//! use bough_ast::{AstContext, NodeKind, SymbolId};
//!
//! let mut ctx = AstContext::new();
//! let (x, one) = (ctx.ident("x"), ctx.int_lit(1));
//! let sum = ctx.infix("+", x, one).unwrap();
//!
//! // The resolution pass rewrites identifiers in place.
//! ctx.resolve_ident(x, SymbolId::from_u32(0)).unwrap();
//! assert_eq!(ctx.kind(ctx.child(sum, 1).unwrap()), NodeKind::Sym);
//! ```

pub mod comment;
pub mod construct;
pub mod context;
pub mod error;
pub mod kind;
pub mod printer;
pub mod refs;
pub mod shape;
pub mod symbol;
pub mod validation;
pub mod walk;

pub use bough_core::{Span, Symbol};
pub use comment::CommentLine;
pub use construct::{
    CaseBranch, FieldEntry, NodeBuilder, RoutineBuilder, VariantBranch, VariantGroup,
};
pub use context::AstContext;
pub use error::{AstError, AstErrorKind, AstResult};
pub use kind::{KindClass, NodeKind, PayloadClass};
pub use printer::{node_repr, tree_repr};
pub use refs::{NodeRef, ScopeId, SymbolId};
pub use shape::Arity;
pub use symbol::{SymbolInfo, SymbolKind, SymbolTable};
pub use validation::ValidationResult;
pub use walk::{WalkAction, descendants, walk, walk_kind};
