//! Computes the commit-graph visibility relation for code-intelligence
//! uploads: for every commit in a repository's commit DAG, which uploads
//! should be considered "visible" from it, broken down per token (a
//! root-path + indexer identifier).
//!
//! The engine is a pure function of its inputs. It does not talk to a
//! version-control server, does not persist anything, and does not
//! schedule recomputation; it only turns a commit DAG plus a populated
//! [`view::CommitGraphView`] into a stream of [`resolver::Envelope`]s that a
//! caller's own persistence layer can write out.

#![warn(missing_docs)]
#![warn(
    clippy::all,
    clippy::as_conversions,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro
)]
#![allow(clippy::too_many_arguments)]

mod combine;
mod compute;
mod error;
mod graph;
mod reverse;
mod rows;
mod seed;
mod types;
mod view;

pub mod resolver;

#[cfg(test)]
pub mod testing;

pub use compute::{compute_all, stream, uploads_visible_at, EmissionThresholds, GraphVisibilityComputer};
pub use error::GraphVisibilityError;
pub use graph::CommitGraph;
pub use resolver::{Envelope, LinkRelationship, VisibilityRelationship};
pub use reverse::{build_reverse_graph, ReverseGraph};
pub use rows::{into_rows, link_row, nearest_upload_rows, NearestUploadRow, NearestUploadsLinkRow};
pub use seed::{is_seed, populate_seeds, Direction};
pub use types::{CommitId, Token, UploadId, UploadMeta, MAX_DISTANCE};
pub use view::CommitGraphView;
