//! Transposing the forward DAG (child → parents) into the reverse DAG
//! (commit → children), needed for the symmetric descendant traversal.

use std::collections::HashMap;

use tracing::instrument;

use crate::graph::CommitGraph;
use crate::types::CommitId;

/// `commit → children`, the transpose of [`CommitGraph`]. Every commit the
/// forward graph knows about is a key here too, defaulting to an empty
/// child list.
#[derive(Clone, Debug, Default)]
pub struct ReverseGraph {
    children: HashMap<CommitId, Vec<CommitId>>,
}

impl ReverseGraph {
    /// The children of `commit`, in the order their parent-edges to
    /// `commit` were discovered. Not semantically meaningful order-wise.
    pub fn children(&self, commit: &CommitId) -> &[CommitId] {
        self.children.get(commit).map_or(&[], Vec::as_slice)
    }
}

/// Build the reverse graph from the forward one: `c ∈ reverse[p] ⇔ p ∈
/// graph[c]`. Duplicate parent entries in the input propagate as duplicate
/// child entries here; the engine does not dedupe.
#[instrument(skip_all)]
pub fn build_reverse_graph(graph: &CommitGraph) -> ReverseGraph {
    let mut children: HashMap<CommitId, Vec<CommitId>> = HashMap::new();
    for commit in graph.commits() {
        children.entry(commit.clone()).or_default();
    }
    for commit in graph.commits() {
        for parent in graph.parents(commit) {
            children.entry(parent.clone()).or_default().push(commit.clone());
        }
    }
    ReverseGraph { children }
}
