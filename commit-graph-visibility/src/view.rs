//! The read-only input index: which uploads are anchored at which commits,
//! and which token each upload belongs to.

use std::collections::HashMap;

use tracing::warn;

use crate::types::{CommitId, Token, UploadId, UploadMeta};

/// A read-only mapping from commit to the uploads defined at that commit,
/// plus a mapping from upload identifier to token. Built once per
/// recomputation by the caller (typically by querying persistent upload
/// state); the engine only ever reads from it.
#[derive(Debug, Default)]
pub struct CommitGraphView {
    meta: HashMap<CommitId, Vec<UploadMeta>>,
    tokens: HashMap<UploadId, Token>,
}

impl CommitGraphView {
    /// Construct an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `meta` is anchored at `commit` and belongs to `token`.
    ///
    /// Calling `add` twice with the same `upload_id` but a different token
    /// is a caller bug; in a debug build it is reported with a
    /// [`tracing::warn!`] and the later call wins — last-write-wins is
    /// acceptable here since it is the caller's own invariant to keep.
    pub fn add(&mut self, meta: UploadMeta, commit: CommitId, token: Token) {
        if cfg!(debug_assertions) {
            if let Some(existing) = self.tokens.get(&meta.upload_id()) {
                if existing != &token {
                    warn!(
                        upload_id = ?meta.upload_id(),
                        old_token = ?existing,
                        new_token = ?token,
                        "upload re-added under a different token; keeping the newest"
                    );
                }
            }
        }
        self.tokens.insert(meta.upload_id(), token);
        self.meta.entry(commit).or_default().push(meta);
    }

    /// The uploads anchored at `commit`, in insertion order. Empty if
    /// `commit` anchors nothing.
    pub fn anchored_uploads(&self, commit: &CommitId) -> &[UploadMeta] {
        self.meta.get(commit).map_or(&[], Vec::as_slice)
    }

    /// The token that `upload_id` belongs to, if it has been added to this
    /// view.
    pub fn token_of(&self, upload_id: UploadId) -> Option<&Token> {
        self.tokens.get(&upload_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_uploads_defaults_to_empty() {
        let view = CommitGraphView::new();
        assert!(view.anchored_uploads(&CommitId::from("a")).is_empty());
    }

    #[test]
    fn add_groups_by_commit_and_records_token() {
        let mut view = CommitGraphView::new();
        let commit = CommitId::from("a");
        view.add(UploadMeta::anchored(UploadId(1)), commit.clone(), Token::from("t1"));
        view.add(UploadMeta::anchored(UploadId(2)), commit.clone(), Token::from("t2"));

        assert_eq!(view.anchored_uploads(&commit).len(), 2);
        assert_eq!(view.token_of(UploadId(1)), Some(&Token::from("t1")));
        assert_eq!(view.token_of(UploadId(2)), Some(&Token::from("t2")));
        assert_eq!(view.token_of(UploadId(3)), None);
    }
}
