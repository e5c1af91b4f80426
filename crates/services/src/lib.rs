//! rustbb/crates/services/src/lib.rs
//!
//! The engines: post/comment/bulk deletion, the search-partitioned listing
//! engine, and the cross-board recency aggregator. Each one talks to
//! persistence and to its external collaborators through the port traits in
//! `domains`, so every engine is testable against mocks and swappable
//! adapters alike.

pub mod delete_batch;
pub mod delete_comment;
pub mod delete_post;
pub mod display;
pub mod list_posts;
pub mod recency;

pub use delete_batch::BatchDeletion;
pub use delete_comment::CommentDeletion;
pub use delete_post::{DeletedCounts, PostDeletion};
pub use list_posts::{
    DecoratedComment, DecoratedPost, ListRequest, ListingDefaults, PostListing, PostPage,
};
pub use recency::{RecencyFeed, RecencyItem, RecencyPage};

use std::sync::Arc;

use domains::{
    AttachmentStore, BbsResult, Board, ListCache, MemberDirectory, PointLedger, PointReason,
    RecencyIndex, SessionGrants, WriteRow, WriteStore,
};

/// The full set of ports an engine may need, shared across engines.
#[derive(Clone)]
pub struct Ports {
    pub store: Arc<dyn WriteStore>,
    pub recency: Arc<dyn RecencyIndex>,
    pub ledger: Arc<dyn PointLedger>,
    pub files: Arc<dyn AttachmentStore>,
    pub cache: Arc<dyn ListCache>,
    pub grants: Arc<dyn SessionGrants>,
    pub members: Arc<dyn MemberDirectory>,
}

impl Ports {
    /// Reverse the ledger entry awarded for authoring `row`; when nothing was
    /// there to reverse, record a compensating negative entry instead, so a
    /// member is never penalized twice for the same deletion. Anonymous rows
    /// never touch the ledger.
    pub(crate) async fn reverse_or_compensate(&self, board: &Board, row: &WriteRow) -> BbsResult<()> {
        let Some(member_id) = row.member_id.as_deref() else {
            return Ok(());
        };
        let reason = if row.is_comment {
            PointReason::Comment
        } else {
            PointReason::Write
        };
        let reversed = self
            .ledger
            .delete_point(member_id, &board.slug, row.id, reason)
            .await?;
        if !reversed {
            let award = match reason {
                PointReason::Write => board.write_point,
                PointReason::Comment => board.comment_point,
            };
            let memo = format!("{} {} {} deleted", board.title, row.id, reason);
            self.ledger
                .save_point(member_id, -award, &memo, &board.slug, row.id, reason)
                .await?;
        }
        Ok(())
    }

    /// Best-effort invalidation of the board's "latest" cache entries.
    /// Runs only after a successful commit; a failure here leaves bounded
    /// staleness, so it is logged and swallowed.
    pub(crate) fn invalidate_latest(&self, board: &str) {
        if let Err(err) = self.cache.delete_prefix(&format!("latest-{board}")) {
            tracing::warn!(%board, %err, "list cache invalidation failed");
        }
    }
}
