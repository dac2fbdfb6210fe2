//! Top-level glue: wire the seed populator and the streaming resolver
//! together into the crate's two public entry points — the streaming
//! relation, and the single-commit `uploads_visible_at` query.

use std::collections::HashMap;

use tracing::instrument;

use crate::combine::combine;
use crate::graph::CommitGraph;
use crate::resolver::{nearest_seed, resolve_commit, Envelope};
use crate::reverse::{build_reverse_graph, ReverseGraph};
use crate::seed::{compute_seed_set, populate_seeds, Direction, SeedMap};
use crate::types::{CommitId, UploadMeta};
use crate::view::CommitGraphView;

pub use crate::resolver::EmissionThresholds;

/// Owns the two seed passes' results for one recomputation and exposes both
/// the streaming relation and the single-commit query over them, so
/// repeated [`GraphVisibilityComputer::uploads_visible_at`] calls don't
/// redo the (relatively expensive) seed population.
///
/// All state here is read-only after construction and lives only for the
/// duration of one recomputation; there is no global state.
pub struct GraphVisibilityComputer<'a> {
    graph: &'a CommitGraph,
    reverse: ReverseGraph,
    ancestor_seeds: HashMap<CommitId, SeedMap>,
    descendant_seeds: HashMap<CommitId, SeedMap>,
    thresholds: EmissionThresholds,
}

impl<'a> GraphVisibilityComputer<'a> {
    /// Run both seed passes with the default emission thresholds.
    #[instrument(skip(graph, view))]
    pub fn new(graph: &'a CommitGraph, view: &CommitGraphView) -> Self {
        Self::with_thresholds(graph, view, EmissionThresholds::default())
    }

    /// Run both seed passes with a caller-supplied emission threshold
    /// tuning, instead of the defaults.
    #[instrument(skip(graph, view))]
    pub fn with_thresholds(
        graph: &'a CommitGraph,
        view: &CommitGraphView,
        thresholds: EmissionThresholds,
    ) -> Self {
        let reverse = build_reverse_graph(graph);
        let seeds = compute_seed_set(graph, &reverse, view);
        let ancestor_seeds = populate_seeds(graph, &reverse, view, &seeds, Direction::Ancestor);
        let descendant_seeds = populate_seeds(graph, &reverse, view, &seeds, Direction::Descendant);
        Self {
            graph,
            reverse,
            ancestor_seeds,
            descendant_seeds,
            thresholds,
        }
    }

    fn nearest_ancestor_seed(&self, commit: &CommitId) -> Option<(CommitId, u64)> {
        nearest_seed(commit, |c| self.graph.parents(c), &self.ancestor_seeds)
    }

    fn nearest_descendant_seed(&self, commit: &CommitId) -> Option<(CommitId, u64)> {
        nearest_seed(commit, |c| self.reverse.children(c), &self.descendant_seeds)
    }

    /// Stream one [`Envelope`] per commit that anchors or sees any upload,
    /// in the topological order the caller supplied. Lazily advances on
    /// demand: dropping the iterator stops the walk immediately and honors
    /// whatever back-pressure the consumer applies (the seed maps
    /// themselves stay owned by the computer, and are dropped with it).
    pub fn stream(&self) -> impl Iterator<Item = Envelope> + '_ {
        self.graph.order().iter().filter_map(move |commit| {
            let ancestor = self.nearest_ancestor_seed(commit);
            let descendant = self.nearest_descendant_seed(commit);
            let ancestor_ref = ancestor
                .as_ref()
                .map(|(seed, distance)| (seed, *distance, &self.ancestor_seeds[seed]));
            let descendant_ref = descendant
                .as_ref()
                .map(|(seed, distance)| (seed, *distance, &self.descendant_seeds[seed]));
            resolve_commit(commit, ancestor_ref, descendant_ref, self.thresholds)
        })
    }

    /// Eagerly drain [`GraphVisibilityComputer::stream`] into a `Vec`.
    pub fn compute_all(&self) -> Vec<Envelope> {
        self.stream().collect()
    }

    /// The combined upload list visible at a single commit, without
    /// streaming the rest of the graph.
    #[instrument(skip(self))]
    pub fn uploads_visible_at(&self, commit: &CommitId) -> Vec<UploadMeta> {
        let ancestor = self.nearest_ancestor_seed(commit);
        let descendant = self.nearest_descendant_seed(commit);
        combine(
            ancestor
                .as_ref()
                .map(|(seed, distance)| (&self.ancestor_seeds[seed], *distance)),
            descendant
                .as_ref()
                .map(|(seed, distance)| (&self.descendant_seeds[seed], *distance)),
        )
    }
}

/// Convenience wrapper around [`GraphVisibilityComputer::new`] and
/// [`GraphVisibilityComputer::compute_all`] for callers that just want the
/// whole relation at once (small repositories, tests).
pub fn compute_all(graph: &CommitGraph, view: &CommitGraphView) -> Vec<Envelope> {
    GraphVisibilityComputer::new(graph, view).compute_all()
}

/// Stream the relation for `computer`. A thin free function mirroring
/// [`GraphVisibilityComputer::stream`], for call sites that otherwise deal
/// only in free functions.
pub fn stream<'a>(computer: &'a GraphVisibilityComputer<'a>) -> impl Iterator<Item = Envelope> + 'a {
    computer.stream()
}

/// Query the combined upload list visible at a single commit.
pub fn uploads_visible_at(computer: &GraphVisibilityComputer, commit: &CommitId) -> Vec<UploadMeta> {
    computer.uploads_visible_at(commit)
}
