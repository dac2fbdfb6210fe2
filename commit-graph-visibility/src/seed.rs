//! Seed-set selection and population: the central compression strategy.
//!
//! A commit is a *seed* iff reconstructing its visibility without stored
//! state would be ambiguous (see [`is_seed`]). Seeds carry a fully
//! materialised per-token upload map; every other commit ("transit") is
//! reconstructible from its nearest seed ancestor and descendant, so no
//! storage is needed for it at all.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{instrument, trace};

use crate::graph::CommitGraph;
use crate::reverse::ReverseGraph;
use crate::types::{CommitId, Token, UploadMeta};
use crate::view::CommitGraphView;

/// Which side of the graph a seed pass walks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Walk toward ancestors: `predecessors` is [`CommitGraph::parents`],
    /// iterated in the forward topological order.
    Ancestor,
    /// Walk toward descendants: `predecessors` is [`ReverseGraph::children`]
    /// used as "parents", iterated in reverse topological order.
    Descendant,
}

/// A commit is a seed iff any of:
///
/// 1. It anchors at least one upload.
/// 2. It has more than one child.
/// 3. It has more than one parent.
/// 4. Its sole parent has more than one child.
/// 5. Its sole child has more than one parent.
///
/// The predicate does not depend on direction: the same seed set backs both
/// the ancestor and descendant seed maps.
#[instrument(skip(graph, reverse, view))]
pub fn is_seed(
    graph: &CommitGraph,
    reverse: &ReverseGraph,
    view: &CommitGraphView,
    commit: &CommitId,
) -> bool {
    if !view.anchored_uploads(commit).is_empty() {
        return true;
    }
    let parents = graph.parents(commit);
    let children = reverse.children(commit);
    if children.len() > 1 {
        return true;
    }
    if parents.len() > 1 {
        return true;
    }
    if let [sole_parent] = parents {
        if reverse.children(sole_parent).len() > 1 {
            return true;
        }
    }
    if let [sole_child] = children {
        if graph.parents(sole_child).len() > 1 {
            return true;
        }
    }
    false
}

/// Per-token upload map materialised at a seed commit.
pub type SeedMap = IndexMap<Token, UploadMeta>;

/// Compute the seed set once (it is shared by both directions), then
/// populate the per-token map at every seed commit for the requested
/// `direction`.
///
/// `seeds` must be exactly the set of commits for which [`is_seed`] returns
/// true; callers normally compute it once via [`compute_seed_set`] and reuse
/// it for both the ancestor and descendant passes.
#[instrument(skip(graph, reverse, view, seeds))]
pub fn populate_seeds(
    graph: &CommitGraph,
    reverse: &ReverseGraph,
    view: &CommitGraphView,
    seeds: &HashSet<CommitId>,
    direction: Direction,
) -> HashMap<CommitId, SeedMap> {
    let mut seed_maps: HashMap<CommitId, SeedMap> = HashMap::with_capacity(seeds.len());

    let predecessors = |commit: &CommitId| -> &[CommitId] {
        match direction {
            Direction::Ancestor => graph.parents(commit),
            Direction::Descendant => reverse.children(commit),
        }
    };
    let order_iter: Box<dyn Iterator<Item = &CommitId>> = match direction {
        Direction::Ancestor => Box::new(graph.order().iter()),
        Direction::Descendant => Box::new(graph.order().iter().rev()),
    };

    for commit in order_iter {
        if !seeds.contains(commit) {
            continue;
        }

        let anchored = view.anchored_uploads(commit);
        let mut map: SeedMap = IndexMap::with_capacity(anchored.len());
        for meta in anchored {
            let token = view
                .token_of(meta.upload_id())
                .expect("every anchored upload has a token")
                .clone();
            map.insert(token, UploadMeta::with_distance(meta.upload_id(), 0));
        }

        let mut frontier: Vec<CommitId> = predecessors(commit).to_vec();
        let mut distance: u64 = 1;
        while let [sole] = frontier.as_slice() {
            if seed_maps.contains_key(sole) {
                break;
            }
            frontier = predecessors(sole).to_vec();
            distance += 1;
        }

        for ancestor in &frontier {
            let Some(ancestor_map) = seed_maps.get(ancestor) else {
                continue;
            };
            for (token, meta) in ancestor_map {
                let shifted = meta.bumped(distance);
                match map.get(token) {
                    Some(existing) if existing.tie_break_key() <= shifted.tie_break_key() => {}
                    _ => {
                        map.insert(token.clone(), shifted);
                    }
                }
            }
        }

        trace!(?commit, ?direction, tokens = map.len(), "populated seed");
        seed_maps.insert(commit.clone(), map);
    }

    seed_maps
}

/// Compute the seed set for the whole graph: every commit for which
/// [`is_seed`] holds.
#[instrument(skip(graph, reverse, view))]
pub fn compute_seed_set(
    graph: &CommitGraph,
    reverse: &ReverseGraph,
    view: &CommitGraphView,
) -> HashSet<CommitId> {
    graph
        .order()
        .iter()
        .filter(|commit| is_seed(graph, reverse, view, commit))
        .cloned()
        .collect()
}
