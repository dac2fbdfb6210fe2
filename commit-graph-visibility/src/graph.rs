//! The forward commit DAG supplied by the caller's commit-graph parser.

use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::error::GraphVisibilityError;
use crate::types::CommitId;

/// A parsed commit DAG: `graph` maps each commit to its parents (in the
/// order the caller's parser observed them; the first parent is used
/// wherever an arbitrary choice must be made), and `order` is a topological
/// order such that every parent of a commit precedes it.
///
/// The engine trusts `order` rather than re-deriving it; call
/// [`CommitGraph::validate`] up front if you want eager diagnostics instead
/// of undefined behavior on malformed input.
#[derive(Clone, Debug, Default)]
pub struct CommitGraph {
    graph: HashMap<CommitId, Vec<CommitId>>,
    order: Vec<CommitId>,
}

impl CommitGraph {
    /// Construct a graph from a parent map and a topological order. Every
    /// commit in `order` should be a key of `graph` (even leaves, mapped to
    /// an empty parent list); this is not checked here, only by
    /// [`CommitGraph::validate`].
    pub fn new(graph: HashMap<CommitId, Vec<CommitId>>, order: Vec<CommitId>) -> Self {
        Self { graph, order }
    }

    /// The parents of `commit`, in input order. Empty if `commit` is a root
    /// or unknown.
    pub fn parents(&self, commit: &CommitId) -> &[CommitId] {
        self.graph.get(commit).map_or(&[], Vec::as_slice)
    }

    /// The topological order supplied by the caller: every parent precedes
    /// its children.
    pub fn order(&self) -> &[CommitId] {
        &self.order
    }

    /// Every commit this graph knows about, as a set.
    pub(crate) fn commits(&self) -> impl Iterator<Item = &CommitId> {
        self.graph.keys()
    }

    /// Check that `order` has no duplicates and is actually topological
    /// (every parent precedes its children), and that every parent
    /// referenced by `graph` is itself a known commit. This is an opt-in
    /// `O(V + E)` pass; the engine does not run it automatically, trusting
    /// the input rather than re-deriving its shape.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), GraphVisibilityError> {
        let mut seen = HashSet::with_capacity(self.order.len());
        for commit in &self.order {
            if !seen.insert(commit) {
                return Err(GraphVisibilityError::DuplicateCommit(commit.clone()));
            }
            for parent in self.parents(commit) {
                if !seen.contains(parent) {
                    if self.graph.contains_key(parent) {
                        return Err(GraphVisibilityError::OrderViolation {
                            parent: parent.clone(),
                            child: commit.clone(),
                        });
                    }
                    return Err(GraphVisibilityError::UnknownCommit(parent.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;

    use super::*;

    fn commit(id: &str) -> CommitId {
        CommitId::from(id)
    }

    #[test]
    fn validate_accepts_a_well_formed_linear_history() {
        let graph = CommitGraph::new(
            hashmap! {
                commit("a") => vec![],
                commit("b") => vec![commit("a")],
                commit("c") => vec![commit("b")],
            },
            vec![commit("a"), commit("b"), commit("c")],
        );
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn validate_rejects_a_parent_appearing_after_its_child() {
        let graph = CommitGraph::new(
            hashmap! {
                commit("a") => vec![],
                commit("b") => vec![commit("a")],
            },
            vec![commit("b"), commit("a")],
        );
        assert_eq!(
            graph.validate(),
            Err(GraphVisibilityError::OrderViolation {
                parent: commit("a"),
                child: commit("b"),
            })
        );
    }

    #[test]
    fn validate_rejects_duplicate_commits() {
        let graph = CommitGraph::new(
            hashmap! { commit("a") => vec![] },
            vec![commit("a"), commit("a")],
        );
        assert_eq!(
            graph.validate(),
            Err(GraphVisibilityError::DuplicateCommit(commit("a")))
        );
    }

    #[test]
    fn validate_rejects_a_dangling_parent_reference() {
        let graph = CommitGraph::new(
            hashmap! { commit("b") => vec![commit("a")] },
            vec![commit("b")],
        );
        assert_eq!(
            graph.validate(),
            Err(GraphVisibilityError::UnknownCommit(commit("a")))
        );
    }
}
