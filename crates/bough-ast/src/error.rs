//! Error types for tree construction and access.

use bough_core::Symbol;
use derive_more::{Display, From};

use crate::kind::{NodeKind, PayloadClass};
use crate::refs::{NodeRef, SymbolId};

pub type AstResult<T> = Result<T, AstError>;

/// A construction or access error raised synchronously to the producer.
///
/// These always indicate a defect in the calling parser or macro code; the
/// compiler driver is expected to attach positions and report them.
#[derive(Display, Debug, From)]
#[display("{kind}")]
pub struct AstError {
    #[from]
    kind: Box<AstErrorKind>,
}

impl From<AstErrorKind> for AstError {
    fn from(kind: AstErrorKind) -> Self {
        AstError {
            kind: Box::new(kind),
        }
    }
}

impl AstError {
    pub fn kind(&self) -> &AstErrorKind {
        &self.kind
    }

    pub(crate) fn invalid_access(kind: NodeKind, operation: &'static str) -> Self {
        AstErrorKind::InvalidAccess { kind, operation }.into()
    }

    pub(crate) fn index_out_of_range(kind: NodeKind, index: usize, len: usize) -> Self {
        AstErrorKind::IndexOutOfRange { kind, index, len }.into()
    }

    pub(crate) fn wrong_payload(kind: NodeKind, expected: PayloadClass) -> Self {
        AstErrorKind::WrongPayloadKind {
            kind,
            expected,
            actual: kind.payload_class(),
        }
        .into()
    }

    pub(crate) fn malformed(kind: NodeKind, reason: impl std::fmt::Display) -> Self {
        AstErrorKind::MalformedNode {
            kind,
            reason: reason.to_string(),
        }
        .into()
    }

    pub(crate) fn already_attached(node: NodeRef) -> Self {
        AstErrorKind::AlreadyAttached { node }.into()
    }

    pub(crate) fn conflicting_resolution(
        name: Symbol,
        existing: SymbolId,
        requested: SymbolId,
    ) -> Self {
        AstErrorKind::ConflictingResolution {
            name,
            existing,
            requested,
        }
        .into()
    }
}

#[derive(Display, Debug, Clone, PartialEq)]
pub enum AstErrorKind {
    /// Child or payload access on a kind that does not carry it.
    #[display("cannot {operation} a {kind} node")]
    InvalidAccess {
        kind: NodeKind,
        operation: &'static str,
    },

    #[display("child index {index} out of range for {kind} node with {len} children")]
    IndexOutOfRange {
        kind: NodeKind,
        index: usize,
        len: usize,
    },

    /// Scalar accessor used on a node of another payload class.
    #[display("{kind} node has {actual} payload, not {expected}")]
    WrongPayloadKind {
        kind: NodeKind,
        expected: PayloadClass,
        actual: PayloadClass,
    },

    /// Constructor input violates the shape table for `kind`.
    #[display("malformed {kind} node: {reason}")]
    MalformedNode { kind: NodeKind, reason: String },

    /// The node already has a parent; move it out first or deep-copy it.
    #[display("{node} is already owned by another node")]
    AlreadyAttached { node: NodeRef },

    #[display("`{name}` is already resolved to {existing}, cannot rebind to {requested}")]
    ConflictingResolution {
        name: Symbol,
        existing: SymbolId,
        requested: SymbolId,
    },
}

impl std::error::Error for AstError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forwards_to_kind() {
        let err = AstError::index_out_of_range(NodeKind::Call, 5, 3);
        assert_eq!(
            err.to_string(),
            "child index 5 out of range for Call node with 3 children"
        );
    }

    #[test]
    fn wrong_payload_reports_actual_class() {
        let err = AstError::wrong_payload(NodeKind::IntLit, PayloadClass::Text);
        assert_eq!(
            err.kind(),
            &AstErrorKind::WrongPayloadKind {
                kind: NodeKind::IntLit,
                expected: PayloadClass::Text,
                actual: PayloadClass::Int,
            }
        );
        assert_eq!(
            err.to_string(),
            "IntLit node has integer payload, not text"
        );
    }
}
