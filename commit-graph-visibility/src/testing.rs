//! Testing utilities: small hand-built fixtures plus an arbitrary-DAG
//! generator for property tests.

use std::collections::HashMap;

use crate::graph::CommitGraph;
use crate::types::{CommitId, Token, UploadId, UploadMeta};
use crate::view::CommitGraphView;

/// Shorthand for building a [`CommitId`] in test fixtures.
pub fn commit(id: &str) -> CommitId {
    CommitId::from(id)
}

/// Build a graph from `(commit, parents)` pairs, computing a valid
/// topological order by repeatedly picking any commit whose parents have
/// already been placed. Panics if `edges` describes a cycle or references a
/// parent that isn't itself a key of `edges`.
pub fn graph_from_edges(edges: &[(&str, &[&str])]) -> CommitGraph {
    let parents: HashMap<CommitId, Vec<CommitId>> = edges
        .iter()
        .map(|(id, parents)| {
            (
                commit(id),
                parents.iter().map(|p| commit(p)).collect(),
            )
        })
        .collect();

    let mut order = Vec::with_capacity(parents.len());
    let mut placed: std::collections::HashSet<CommitId> = std::collections::HashSet::new();
    while order.len() < parents.len() {
        let next = parents
            .iter()
            .find(|(id, commit_parents)| {
                !placed.contains(*id) && commit_parents.iter().all(|p| placed.contains(p))
            })
            .map(|(id, _)| id.clone())
            .expect("edges must describe an acyclic graph with only in-set parents");
        placed.insert(next.clone());
        order.push(next);
    }

    CommitGraph::new(parents, order)
}

/// A 14-commit reference DAG with uploads anchored at several commits,
/// spanning three tokens — used across tests to exercise seed selection,
/// resolution, and reconstruction together on one non-trivial shape.
pub fn reference_graph_and_view() -> (CommitGraph, CommitGraphView) {
    let graph = graph_from_edges(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a"]),
        ("d", &["c"]),
        ("e", &["c"]),
        ("g", &["e"]),
        ("f", &["e"]),
        ("h", &["f"]),
        ("i", &["f"]),
        ("l", &["i"]),
        ("n", &["l"]),
        ("j", &["b", "h"]),
        ("k", &["h"]),
        ("m", &["k"]),
    ]);

    let mut view = CommitGraphView::new();
    view.add(UploadMeta::anchored(UploadId(50)), commit("a"), Token::from("T1"));
    view.add(UploadMeta::anchored(UploadId(51)), commit("j"), Token::from("T2"));
    view.add(UploadMeta::anchored(UploadId(52)), commit("c"), Token::from("T3"));
    view.add(UploadMeta::anchored(UploadId(53)), commit("f"), Token::from("T3"));
    view.add(UploadMeta::anchored(UploadId(54)), commit("i"), Token::from("T3"));
    view.add(UploadMeta::anchored(UploadId(55)), commit("h"), Token::from("T3"));
    view.add(UploadMeta::anchored(UploadId(56)), commit("m"), Token::from("T3"));
    view.add(UploadMeta::anchored(UploadId(45)), commit("n"), Token::from("T3"));

    (graph, view)
}

/// Build an arbitrary DAG on `num_commits` labelled commits (`a`, `b`, ...),
/// where each commit's parent set is drawn from the commits already placed,
/// and an arbitrary subset of commits anchors an upload under one of a
/// handful of shared tokens. Used by the universal-property tests (the
/// reconstruction law holds for any graph, not just the hand-picked ones).
#[cfg(test)]
pub fn arb_graph_and_view(
    num_commits: usize,
) -> impl proptest::strategy::Strategy<Value = (CommitGraph, CommitGraphView)> {
    use proptest::prelude::*;

    let labels: Vec<char> = ('a'..='z').take(num_commits).collect();
    let parent_choices = prop::collection::vec(
        prop::collection::vec(any::<bool>(), 0..num_commits),
        num_commits,
    );
    let anchor_choices = prop::collection::vec(prop::option::of(0..3usize), num_commits);

    (Just(labels), parent_choices, anchor_choices).prop_map(|(labels, parent_masks, anchors)| {
        let mut parents: HashMap<CommitId, Vec<CommitId>> = HashMap::new();
        let mut order = Vec::with_capacity(labels.len());
        for (index, label) in labels.iter().enumerate() {
            let id = commit(&label.to_string());
            let mask = &parent_masks[index];
            let commit_parents: Vec<CommitId> = labels[..index]
                .iter()
                .enumerate()
                .filter(|(candidate_index, _)| mask.get(*candidate_index).copied().unwrap_or(false))
                .map(|(_, candidate)| commit(&candidate.to_string()))
                .collect();
            parents.insert(id.clone(), commit_parents);
            order.push(id);
        }
        let graph = CommitGraph::new(parents, order);

        let mut view = CommitGraphView::new();
        for (index, label) in labels.iter().enumerate() {
            if let Some(token_index) = anchors[index] {
                let upload_id = UploadId(1000 + u64::try_from(index).expect("index fits in u64"));
                let token = Token::from(format!("T{token_index}"));
                view.add(UploadMeta::anchored(upload_id), commit(&label.to_string()), token);
            }
        }
        (graph, view)
    })
}
