//! The engine's narrow, recoverable error surface.
//!
//! Almost every malformed input (a cycle, a dangling parent reference, a
//! non-topological order) is a caller-programming error, not a recoverable
//! condition: the engine trusts its input and may produce unspecified
//! output or panic via `debug_assert!` rather than surface a `Result`. The
//! two variants below cover the cases that
//! [`crate::CommitGraph::validate`] can cheaply detect up front, for callers
//! that want eager diagnostics instead of undefined traversal behavior.

use thiserror::Error;

use crate::types::CommitId;

/// Errors raised by [`crate::CommitGraph::validate`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum GraphVisibilityError {
    /// A commit referenced as a parent never appears in the topological
    /// order.
    #[error("commit {0:?} is referenced as a parent but never appears in the topological order")]
    UnknownCommit(CommitId),

    /// The same commit appears more than once in the topological order.
    #[error("commit {0:?} appears more than once in the topological order")]
    DuplicateCommit(CommitId),

    /// A parent does not precede its child in the topological order.
    #[error("topological order is inconsistent: parent {parent:?} of {child:?} does not precede it")]
    OrderViolation {
        /// The parent commit.
        parent: CommitId,
        /// The child commit whose parent list names `parent`.
        child: CommitId,
    },
}
