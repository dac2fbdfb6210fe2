//! Core identifiers and the packed per-upload visibility record.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque commit identifier (a hexadecimal object id in practice, but the
/// engine treats it as an arbitrary key). Cheap to clone: internally an
/// `Arc<str>`, since the same id is copied into many seed-map entries and
/// hash-map keys over the course of a single computation.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(Arc<str>);

impl CommitId {
    /// Construct a new commit identifier from any string-like value.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// View this identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// An opaque equivalence-class identifier for uploads: two uploads share a
/// token iff they compete for the same "slot" at any commit (typically
/// derived by the view builder as `hash(root ":" indexer)`).
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Token(Arc<str>);

impl Token {
    /// Construct a new token from any string-like value.
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    /// View this token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for Token {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// An upload identifier, unique within a repository. Smaller values are
/// older and are used as the deterministic tie-breaker when two uploads of
/// the same token are equally near a commit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UploadId(pub u64);

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of low bits of `flags` given over to the distance. The remaining
/// two high bits hold `ANCESTOR_VISIBLE` and `OVERWRITTEN`. 62 bits of
/// distance is unreachable for any real repository, while leaving the
/// marker bits unambiguous for `distance + delta` arithmetic.
const DISTANCE_BITS: u32 = 62;

/// Bit-mask isolating the distance portion of a packed `flags` value.
pub const MAX_DISTANCE: u64 = (1 << DISTANCE_BITS) - 1;

const ANCESTOR_VISIBLE_BIT: u64 = 1 << DISTANCE_BITS;
const OVERWRITTEN_BIT: u64 = 1 << (DISTANCE_BITS + 1);

fn pack(distance: u64, ancestor_visible: bool, overwritten: bool) -> u64 {
    debug_assert!(
        distance <= MAX_DISTANCE,
        "distance {distance} overflows the packed flags representation"
    );
    let mut flags = distance & MAX_DISTANCE;
    if ancestor_visible {
        flags |= ANCESTOR_VISIBLE_BIT;
    }
    if overwritten {
        flags |= OVERWRITTEN_BIT;
    }
    flags
}

/// A record describing one upload's visibility at some commit: which upload,
/// how far (in commit edges) from the commit where it is actually anchored,
/// and whether it was reached by walking toward ancestors or superseded by a
/// closer one.
///
/// The `distance` and two marker bits are packed into a single `flags`
/// integer, matching the column the persistence layer stores them in (see
/// [`crate::rows::NearestUploadRow`]); `UploadMeta` itself round-trips
/// through `serde` as the flat `{upload_id, flags}` pair so that layer can
/// write it out as-is.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct UploadMeta {
    upload_id: UploadId,
    flags: u64,
}

impl fmt::Debug for UploadMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadMeta")
            .field("upload_id", &self.upload_id)
            .field("distance", &self.distance())
            .field("ancestor_visible", &self.ancestor_visible())
            .field("overwritten", &self.overwritten())
            .finish()
    }
}

impl UploadMeta {
    /// An upload anchored at the commit being described: distance zero, no
    /// markers set.
    pub fn anchored(upload_id: UploadId) -> Self {
        Self {
            upload_id,
            flags: pack(0, false, false),
        }
    }

    /// Construct a meta with an explicit distance and no markers, as used
    /// internally by the seed populator (which never sets either marker
    /// bit; those are introduced only when combining ancestor and
    /// descendant visibility for output).
    pub fn with_distance(upload_id: UploadId, distance: u64) -> Self {
        Self {
            upload_id,
            flags: pack(distance, false, false),
        }
    }

    /// The upload this record describes.
    pub fn upload_id(&self) -> UploadId {
        self.upload_id
    }

    /// The packed `flags` value, as written to the `distance` column of the
    /// `NearestUploads` persistence table.
    pub fn flags(&self) -> u64 {
        self.flags
    }

    /// Number of commit edges from the describing commit to this upload's
    /// anchor.
    pub fn distance(&self) -> u64 {
        self.flags & MAX_DISTANCE
    }

    /// Whether this upload was reached by walking toward ancestors.
    pub fn ancestor_visible(&self) -> bool {
        self.flags & ANCESTOR_VISIBLE_BIT != 0
    }

    /// Whether this upload was superseded at this commit by a closer
    /// descendant-side upload of the same token, but kept in the output
    /// anyway.
    pub fn overwritten(&self) -> bool {
        self.flags & OVERWRITTEN_BIT != 0
    }

    /// Bump the distance by `delta`, keeping whatever markers were already
    /// set. Used while propagating a seed's map down a first-parent chain
    /// of transit commits; seed maps never carry marker bits, so in
    /// practice this always operates on bare distances.
    pub fn bumped(&self, delta: u64) -> Self {
        Self {
            upload_id: self.upload_id,
            flags: pack(
                self.distance() + delta,
                self.ancestor_visible(),
                self.overwritten(),
            ),
        }
    }

    /// Produce the ancestor-side output record for a combination at
    /// `extra_distance` edges beyond this record's own distance:
    /// `ANCESTOR_VISIBLE` set, `OVERWRITTEN` cleared (see §4.5).
    pub fn for_ancestor_output(&self, extra_distance: u64) -> Self {
        Self {
            upload_id: self.upload_id,
            flags: pack(self.distance() + extra_distance, true, false),
        }
    }

    /// Produce the descendant-side output record for a combination at
    /// `extra_distance` edges beyond this record's own distance:
    /// `ANCESTOR_VISIBLE` cleared, `OVERWRITTEN` cleared (see §4.5).
    pub fn for_descendant_output(&self, extra_distance: u64) -> Self {
        Self {
            upload_id: self.upload_id,
            flags: pack(self.distance() + extra_distance, false, false),
        }
    }

    /// Return a copy of this record with `OVERWRITTEN` set, keeping
    /// distance and `ANCESTOR_VISIBLE` as-is.
    pub fn with_overwritten(&self) -> Self {
        Self {
            upload_id: self.upload_id,
            flags: pack(self.distance(), self.ancestor_visible(), true),
        }
    }

    /// The tie-break key used whenever two candidate uploads for the same
    /// token are compared: smaller distance wins, ties broken toward the
    /// smaller upload id.
    pub(crate) fn tie_break_key(&self) -> (u64, UploadId) {
        (self.distance(), self.upload_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips() {
        let meta = UploadMeta::with_distance(UploadId(42), 7);
        assert_eq!(meta.upload_id(), UploadId(42));
        assert_eq!(meta.distance(), 7);
        assert!(!meta.ancestor_visible());
        assert!(!meta.overwritten());

        let ancestor = meta.for_ancestor_output(3);
        assert_eq!(ancestor.distance(), 10);
        assert!(ancestor.ancestor_visible());
        assert!(!ancestor.overwritten());

        let overwritten = ancestor.with_overwritten();
        assert_eq!(overwritten.distance(), 10);
        assert!(overwritten.ancestor_visible());
        assert!(overwritten.overwritten());
    }

    #[test]
    fn descendant_output_clears_ancestor_visible() {
        let meta = UploadMeta::anchored(UploadId(1)).for_descendant_output(4);
        assert_eq!(meta.distance(), 4);
        assert!(!meta.ancestor_visible());
        assert!(!meta.overwritten());
    }

    #[test]
    fn tie_break_key_orders_by_distance_then_upload_id() {
        let closer = UploadMeta::with_distance(UploadId(50), 1);
        let farther_but_smaller_id = UploadMeta::with_distance(UploadId(10), 2);
        assert!(closer.tie_break_key() < farther_but_smaller_id.tie_break_key());
    }
}
