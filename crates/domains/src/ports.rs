//! # Core Traits (Ports)
//!
//! The engines in `services` talk to persistence and to every external
//! collaborator (points ledger, attachment store, list cache, session grants,
//! member directory) through these traits. Adapters implement them; with the
//! `testing` feature the generated `MockXxx` types are available to external
//! test crates.

use async_trait::async_trait;

use crate::error::BbsResult;
use crate::models::{
    Board, BoardFile, GrantPurpose, PointReason, RecencyEntry, RecencyQuery, WriteQuery, WriteRow,
};

/// Persistence contract for write rows, boards and their coupled state
/// (counters, notice flags, scraps, recency rows).
///
/// The three `delete_*` mutations are transactional: either every row touched
/// by the call is applied, or none is.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WriteStore: Send + Sync {
    async fn get_board(&self, board: &str) -> BbsResult<Board>;

    async fn get_write(&self, board: &str, id: i64) -> BbsResult<Option<WriteRow>>;

    /// All rows whose `parent_id` equals `parent_id`, ordered by id for
    /// deterministic cascade processing. Includes the post itself.
    async fn thread_rows(&self, board: &str, parent_id: i64) -> BbsResult<Vec<WriteRow>>;

    /// True when another top-level row replies to `write` (same `num`,
    /// `reply_path` extending this row's, different id).
    async fn has_reply_posts(&self, write: &WriteRow) -> BbsResult<bool>;

    /// Direct comments of a post, ordered by `comment_path`.
    async fn comments_of(&self, board: &str, parent_id: i64) -> BbsResult<Vec<WriteRow>>;

    /// Live (not denormalised) count of a post's direct comments.
    async fn live_comment_count(&self, board: &str, parent_id: i64) -> BbsResult<i64>;

    /// One transaction: delete every row with `parent_id == post_id`, the
    /// post's recency entries and scraps, drop the id from the board's notice
    /// list, and decrement the board counters by the given amounts.
    async fn delete_post_cascade(
        &self,
        board: &str,
        post_id: i64,
        posts_removed: i64,
        comments_removed: i64,
    ) -> BbsResult<()>;

    /// One transaction: delete the comment row and its recency entries, and
    /// decrement the comment counters of the parent row and the board.
    async fn delete_comment_row(&self, board: &str, comment_id: i64, parent_id: i64)
        -> BbsResult<()>;

    /// One transaction: delete the given rows, nothing else. Used by the
    /// administrative bulk path, which intentionally skips counter and index
    /// maintenance.
    async fn delete_rows(&self, board: &str, ids: &[i64]) -> BbsResult<()>;

    async fn writes_by_ids(&self, board: &str, ids: &[i64]) -> BbsResult<Vec<WriteRow>>;

    /// Execute a listing query, paginated.
    async fn search_writes(
        &self,
        query: &WriteQuery,
        offset: i64,
        limit: i64,
    ) -> BbsResult<Vec<WriteRow>>;

    /// Count of the filtered-but-unpaginated query. Recomputed per call, not
    /// cached, so it stays consistent with concurrent edits.
    async fn count_writes(&self, query: &WriteQuery) -> BbsResult<i64>;

    /// Minimum sequence number present in the board partition (0 when empty).
    async fn min_seq(&self, board: &str) -> BbsResult<i64>;

    /// (good, bad) reaction counts for a post.
    async fn reaction_counts(&self, board: &str, write_id: i64) -> BbsResult<(i64, i64)>;
}

/// The cross-board recency index behind "latest posts" widgets.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RecencyIndex: Send + Sync {
    /// Newest-first page of index entries matching the filter.
    async fn list(&self, query: &RecencyQuery, offset: i64, limit: i64)
        -> BbsResult<Vec<RecencyEntry>>;

    async fn count(&self, query: &RecencyQuery) -> BbsResult<i64>;

    async fn entries_by_ids(&self, ids: &[i64]) -> BbsResult<Vec<RecencyEntry>>;

    async fn delete_entries(&self, ids: &[i64]) -> BbsResult<()>;
}

/// External points ledger, consumed via its delete/save contract only.
/// Its internal accounting rules are out of scope here.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PointLedger: Send + Sync {
    /// Reverse the entry keyed by `(member, board, write_id, reason)`.
    /// Returns true when an entry existed and was reversed.
    async fn delete_point(
        &self,
        member_id: &str,
        board: &str,
        write_id: i64,
        reason: PointReason,
    ) -> BbsResult<bool>;

    /// Record a compensating entry. Only called when `delete_point` found
    /// nothing to reverse ("penalize once").
    async fn save_point(
        &self,
        member_id: &str,
        delta: i64,
        memo: &str,
        rel_table: &str,
        rel_id: i64,
        reason: PointReason,
    ) -> BbsResult<()>;
}

/// External attachment store. Only its deletion/query contract is used.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Remove every file attached to the post, thumbnails included.
    /// Irreversible.
    async fn delete_board_files(&self, board: &str, write_id: i64) -> BbsResult<()>;

    /// Attached files split into (images, others).
    async fn get_board_files_by_type(
        &self,
        board: &str,
        write_id: i64,
    ) -> BbsResult<(Vec<BoardFile>, Vec<BoardFile>)>;
}

/// Key-prefixed list cache. Engines invalidate `latest-{board}` after a
/// successful commit; invalidation is best-effort and failures are swallowed
/// at the call site (bounded staleness, not a correctness violation).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ListCache: Send + Sync {
    fn put(&self, key: &str, value: String);

    fn get(&self, key: &str) -> Option<String>;

    /// Drops every entry whose key starts with `prefix`; returns how many.
    fn delete_prefix(&self, prefix: &str) -> BbsResult<usize>;
}

/// Short-lived per-row capabilities established by a prior password or owner
/// challenge. Injected instead of ambient session state.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionGrants: Send + Sync {
    fn has(&self, purpose: GrantPurpose, board: &str, write_id: i64) -> bool;

    fn grant(&self, purpose: GrantPurpose, board: &str, write_id: i64);

    fn revoke(&self, purpose: GrantPurpose, board: &str, write_id: i64);
}

/// Read-only member lookups needed for authorization and decoration.
/// Registration/authentication live elsewhere.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Permission level of a member, None for unknown ids.
    async fn level_of(&self, member_id: &str) -> BbsResult<Option<u8>>;

    /// Path of the member's profile image, when one exists.
    async fn image_path(&self, member_id: &str) -> Option<String>;

    /// Path of the member's icon, when one exists.
    async fn icon_path(&self, member_id: &str) -> Option<String>;
}
