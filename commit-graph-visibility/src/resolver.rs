//! The streaming resolver: for every commit, emit either its full visible
//! upload list or a compact link to its nearest seed ancestor/descendant.

use std::collections::HashMap;

use tracing::trace;

use crate::combine::combine;
use crate::seed::SeedMap;
use crate::types::{CommitId, UploadMeta};

/// The full per-commit visible set, stored directly rather than
/// reconstructed from a link.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VisibilityRelationship {
    /// The commit this relationship describes.
    pub commit: CommitId,
    /// Every upload visible from `commit`, one per token (plus any
    /// `OVERWRITTEN` entries kept so downstream commits can still see what
    /// they superseded). Order is not significant.
    pub uploads: Vec<UploadMeta>,
}

/// A pointer to the nearest seed ancestor and descendant, used as a compact
/// substitute for the full upload list at a transit commit. Either pointer
/// may be absent (the walk ran off the root/tip of the graph in that
/// direction); if both are absent, no `LinkRelationship` is ever emitted
/// for that commit (see [`resolve_commit`]).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkRelationship {
    /// The commit this relationship describes.
    pub commit: CommitId,
    /// The nearest seed commit reachable by walking first-parents.
    pub ancestor: Option<CommitId>,
    /// Number of edges from `commit` to `ancestor`, if present.
    pub ancestor_distance: u64,
    /// The nearest seed commit reachable by walking first-children.
    pub descendant: Option<CommitId>,
    /// Number of edges from `commit` to `descendant`, if present.
    pub descendant_distance: u64,
}

/// One envelope per commit in the output stream: either its full visible
/// set, or a link to the nearest seeds that can reconstruct it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Envelope {
    /// The full upload list is stored directly.
    Visibility(VisibilityRelationship),
    /// A pointer sufficient to reconstruct the upload list on demand.
    Link(LinkRelationship),
}

/// The tunable threshold below how many uploads it is cheaper to store the
/// list outright than to store a link. Not a correctness requirement; only
/// the emitted representation changes, never the uploads a commit resolves
/// to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmissionThresholds {
    /// Maximum combined upload count to emit a full `VisibilityRelationship`
    /// when only one direction (ancestor or descendant) found a seed.
    pub single_direction: usize,
    /// Maximum combined upload count to emit a full `VisibilityRelationship`
    /// when both directions found a seed.
    pub both_directions: usize,
}

impl Default for EmissionThresholds {
    fn default() -> Self {
        Self {
            single_direction: 1,
            both_directions: 2,
        }
    }
}

/// Walk `predecessors(current)`, following the first entry at each step,
/// until a commit present in `seeds` is found (possibly `start` itself, at
/// distance 0). Returns `None` if the walk runs off the root/tip of the
/// graph before finding one.
pub fn nearest_seed(
    start: &CommitId,
    predecessors: impl Fn(&CommitId) -> &[CommitId],
    seeds: &HashMap<CommitId, SeedMap>,
) -> Option<(CommitId, u64)> {
    let mut current = start.clone();
    let mut distance = 0;
    loop {
        if seeds.contains_key(&current) {
            return Some((current, distance));
        }
        let next = predecessors(&current).first()?;
        current = next.clone();
        distance += 1;
    }
}

/// Resolve the envelope for a single commit, given the nearest seed
/// ancestor/descendant it already knows. Returns `None` if nothing is
/// visible from `commit` at all (no uploads are reachable in either
/// direction, or the combined list is empty).
pub fn resolve_commit(
    commit: &CommitId,
    ancestor: Option<(&CommitId, u64, &SeedMap)>,
    descendant: Option<(&CommitId, u64, &SeedMap)>,
    thresholds: EmissionThresholds,
) -> Option<Envelope> {
    if ancestor.is_none() && descendant.is_none() {
        return None;
    }

    let uploads = combine(
        ancestor.map(|(_, distance, map)| (map, distance)),
        descendant.map(|(_, distance, map)| (map, distance)),
    );
    if uploads.is_empty() {
        return None;
    }

    let is_own_seed_at_zero = ancestor.is_some_and(|(_, d, _)| d == 0)
        || descendant.is_some_and(|(_, d, _)| d == 0);
    let threshold = if ancestor.is_some() && descendant.is_some() {
        thresholds.both_directions
    } else {
        thresholds.single_direction
    };

    let envelope = if is_own_seed_at_zero || uploads.len() <= threshold {
        Envelope::Visibility(VisibilityRelationship {
            commit: commit.clone(),
            uploads,
        })
    } else {
        Envelope::Link(LinkRelationship {
            commit: commit.clone(),
            ancestor: ancestor.map(|(c, _, _)| c.clone()),
            ancestor_distance: ancestor.map_or(0, |(_, d, _)| d),
            descendant: descendant.map(|(c, _, _)| c.clone()),
            descendant_distance: descendant.map_or(0, |(_, d, _)| d),
        })
    };
    trace!(?commit, ?envelope, "resolved commit");
    Some(envelope)
}
