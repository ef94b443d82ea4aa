//! Shape validation for trees assembled incrementally.
//!
//! Nodes built through [`AstContext::make_compound`] are checked on
//! construction. Nodes started with [`AstContext::new_node`] and filled with
//! `add_child`, or edited in place afterwards, are only checked here.

use std::fmt;

use crate::context::AstContext;
use crate::error::{AstError, AstResult};
use crate::refs::NodeRef;
use crate::shape;
use crate::walk::descendants;

/// Every malformed node found under a root, in pre-order.
pub struct ValidationResult {
    pub errors: Vec<(NodeRef, AstError)>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error, if any.
    pub fn into_result(self) -> AstResult<()> {
        match self.errors.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "validation passed");
        }
        writeln!(f, "{} malformed node(s) found:", self.errors.len())?;
        for (node, err) in &self.errors {
            writeln!(f, "  - {node}: {err}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl AstContext {
    /// Check one node against the shape table. Scalar nodes always pass.
    pub fn validate(&self, node: NodeRef) -> AstResult<()> {
        match self.children(node) {
            Ok(children) => shape::check_shape(self, self.kind(node), children),
            Err(_) => Ok(()),
        }
    }

    /// Check every node of the subtree rooted at `root`.
    pub fn validate_tree(&self, root: NodeRef) -> ValidationResult {
        let errors: Vec<(NodeRef, AstError)> = descendants(self, root)
            .filter_map(|node| self.validate(node).err().map(|err| (node, err)))
            .collect();
        if !errors.is_empty() {
            tracing::debug!(%root, count = errors.len(), "malformed nodes in tree");
        }
        ValidationResult { errors }
    }
}
