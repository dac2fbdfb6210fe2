//! The row shapes a persistence adapter should expect from an
//! [`crate::Envelope`] stream. This crate does not write these anywhere;
//! it only defines the two table shapes downstream storage is built from.

use itertools::{Either, Itertools};
use serde::Serialize;

use crate::resolver::{Envelope, LinkRelationship, VisibilityRelationship};
use crate::types::{CommitId, UploadId};

/// One row of the `NearestUploads` table: one per upload per
/// full-visibility commit. `distance` is the packed `flags` value (markers
/// + distance); the store is expected to preserve the bit layout as-is.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NearestUploadRow {
    /// The commit this row describes.
    pub commit: CommitId,
    /// The upload visible at `commit`.
    pub upload_id: UploadId,
    /// The packed distance/markers value, written verbatim.
    pub distance: u64,
}

/// One row of the `NearestUploadsLinks` table. Ancestor/descendant are
/// nullable; exactly one of the two may be absent. A row with both absent
/// is never produced (see [`links_for`]).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NearestUploadsLinkRow {
    /// The commit this row describes.
    pub commit: CommitId,
    /// The nearest seed ancestor, if any.
    pub ancestor_commit: Option<CommitId>,
    /// Edges from `commit` to `ancestor_commit`.
    pub ancestor_distance: u64,
    /// The nearest seed descendant, if any.
    pub descendant_commit: Option<CommitId>,
    /// Edges from `commit` to `descendant_commit`.
    pub descendant_distance: u64,
}

/// Expand a [`VisibilityRelationship`] into its `NearestUploads` rows.
pub fn nearest_upload_rows(relationship: &VisibilityRelationship) -> Vec<NearestUploadRow> {
    relationship
        .uploads
        .iter()
        .map(|meta| NearestUploadRow {
            commit: relationship.commit.clone(),
            upload_id: meta.upload_id(),
            distance: meta.flags(),
        })
        .collect()
}

/// Convert a [`LinkRelationship`] into its `NearestUploadsLinks` row.
pub fn link_row(relationship: &LinkRelationship) -> NearestUploadsLinkRow {
    NearestUploadsLinkRow {
        commit: relationship.commit.clone(),
        ancestor_commit: relationship.ancestor.clone(),
        ancestor_distance: relationship.ancestor_distance,
        descendant_commit: relationship.descendant.clone(),
        descendant_distance: relationship.descendant_distance,
    }
}

/// Split a stream of envelopes into the two row tables the persistence
/// layer expects.
pub fn into_rows(
    envelopes: impl IntoIterator<Item = Envelope>,
) -> (Vec<NearestUploadRow>, Vec<NearestUploadsLinkRow>) {
    let (uploads, links): (Vec<Vec<NearestUploadRow>>, Vec<NearestUploadsLinkRow>) = envelopes
        .into_iter()
        .partition_map(|envelope| match envelope {
            Envelope::Visibility(relationship) => Either::Left(nearest_upload_rows(&relationship)),
            Envelope::Link(relationship) => Either::Right(link_row(&relationship)),
        });
    (uploads.into_iter().flatten().collect(), links)
}
