//! Shared utilities for the bough syntax tree.

pub mod location;
pub mod symbol;

pub use location::Span;
pub use symbol::Symbol;
