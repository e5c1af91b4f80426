//! # Domain Models
//!
//! These structs represent the core entities of rustbb.
//! Posts and comments share one row shape (`WriteRow`), distinguished by the
//! `is_comment` flag, the classic BBS layout this engine preserves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single post or comment row in a board's logical partition.
///
/// `num` is a signed ordering value distinct from `id`: top-level posts get
/// negative, monotonically decreasing values and comments share their
/// parent's. The partitioned search window arithmetic depends on this sign
/// convention, so it must be preserved exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteRow {
    pub id: i64,
    pub board: String,
    /// Self for top-level rows, else the id of the post this comment hangs on.
    pub parent_id: i64,
    /// Signed sequence number (negative for top-level posts).
    pub num: i64,
    /// Reply-thread suffix for top-level reply posts ("A", "AA", ...).
    pub reply_path: String,
    /// Comment nesting/order path; its length is the nesting depth (max 5).
    pub comment_path: String,
    pub is_comment: bool,
    /// None means the row was written by an anonymous guest.
    pub member_id: Option<String>,
    pub author_name: String,
    /// Denormalised count of direct comments (top-level rows only).
    pub comment_count: i64,
    pub subject: String,
    pub content: String,
    /// Comma-separated option flags, e.g. "secret,html1".
    pub options: String,
    pub ip: String,
    pub created_at: DateTime<Utc>,
}

impl WriteRow {
    pub fn is_anonymous(&self) -> bool {
        self.member_id.is_none()
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.split(',').any(|o| o.trim() == option)
    }

    pub fn is_secret(&self) -> bool {
        self.has_option("secret")
    }

    /// True when `member_id` matches the row's author. Anonymous rows are
    /// owned by nobody.
    pub fn owned_by(&self, member_id: Option<&str>) -> bool {
        match (self.member_id.as_deref(), member_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A named collection of posts with its own configuration and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// The partition key / URL slug (e.g. "free", "notice").
    pub slug: String,
    pub group_id: String,
    pub title: String,
    /// Live count of non-deleted top-level posts.
    pub post_count: i64,
    /// Live count of non-deleted comments.
    pub comment_count: i64,
    /// Pinned post ids, small and ordered.
    pub notice_ids: Vec<i64>,
    /// Refuse single-post deletion once the post has this many comments
    /// (0 = no limit).
    pub delete_comment_limit: i64,
    /// Points awarded for authoring a post; reversed on deletion.
    pub write_point: i64,
    /// Points awarded for authoring a comment; reversed on deletion.
    pub comment_point: i64,
    /// Posts per page (0 = use the global default).
    pub page_rows: i64,
    /// Minimum member level allowed to write comments.
    pub comment_level: u8,
}

impl Board {
    pub fn is_notice(&self, write_id: i64) -> bool {
        self.notice_ids.contains(&write_id)
    }
}

/// One row of the cross-board recency index ("latest posts" widgets).
/// Independent lifecycle from the write row: created on authoring, deleted on
/// post deletion, never updated on edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyEntry {
    pub id: i64,
    pub board: String,
    pub write_id: i64,
    pub parent_id: i64,
    pub member_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecencyEntry {
    pub fn is_comment(&self) -> bool {
        self.parent_id != self.write_id
    }
}

/// A member's bookmark of a specific post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapEntry {
    pub board: String,
    pub write_id: i64,
    pub member_id: String,
}

/// A file attached to a post, as reported by the attachment store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFile {
    pub source_name: String,
    pub path: String,
    pub size: i64,
}

/// Administrative scope of an acting member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    Super,
    Group,
    Board,
}

/// The member (or guest) performing a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actor {
    pub member_id: Option<String>,
    pub level: u8,
    pub admin: Option<AdminRole>,
}

impl Actor {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn member(id: impl Into<String>, level: u8) -> Self {
        Self {
            member_id: Some(id.into()),
            level,
            admin: None,
        }
    }

    pub fn super_admin(id: impl Into<String>) -> Self {
        Self {
            member_id: Some(id.into()),
            level: 10,
            admin: Some(AdminRole::Super),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin.is_some()
    }

    pub fn is_super(&self) -> bool {
        self.admin == Some(AdminRole::Super)
    }

    pub fn owns(&self, row: &WriteRow) -> bool {
        row.owned_by(self.member_id.as_deref())
    }
}

/// Reason tag keying a point-ledger entry to the action that earned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointReason {
    Write,
    Comment,
}

impl PointReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Comment => "comment",
        }
    }
}

impl std::fmt::Display for PointReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-lived capability established by a prior password/owner challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantPurpose {
    DeletePost,
    DeleteComment,
    ViewSecretComment,
}

/// Searchable columns for the free-text filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
    Subject,
    Content,
    SubjectContent,
    AuthorName,
    MemberId,
}

impl SearchField {
    /// Accepts the wire names used by list endpoints.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "subject" => Some(Self::Subject),
            "content" => Some(Self::Content),
            "subject_content" => Some(Self::SubjectContent),
            "author_name" => Some(Self::AuthorName),
            "member_id" => Some(Self::MemberId),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilter {
    pub field: SearchField,
    pub text: String,
}

/// Sortable columns. An allow-list rather than a free string so the storage
/// adapter never interpolates caller input into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Id,
    Num,
    CreatedAt,
    Subject,
    AuthorName,
    CommentCount,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            "num" => Some(Self::Num),
            "created_at" => Some(Self::CreatedAt),
            "subject" => Some(Self::Subject),
            "author_name" => Some(Self::AuthorName),
            "comment_count" => Some(Self::CommentCount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

/// Half-open `[start, end)` slice of the signed sequence-number space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqWindow {
    pub start: i64,
    pub end: i64,
}

/// A board-scoped listing query, assembled by the listing engine and executed
/// verbatim by the storage adapter.
#[derive(Debug, Clone, Default)]
pub struct WriteQuery {
    pub board: String,
    pub search: Option<SearchFilter>,
    /// Restrict matches to a sequence-number window (search mode only).
    pub window: Option<SeqWindow>,
    /// Search mode: the final rows are the parent posts of all matches, so a
    /// comment hit pulls in its thread's top post instead of surfacing bare.
    pub parents_of_matches: bool,
    /// Plain listing mode: non-comment rows only.
    pub top_level_only: bool,
    /// Ids excluded from the result (pinned notices, unless requested).
    pub exclude_ids: Vec<i64>,
    /// None falls back to the board default ordering (`num ASC, reply_path ASC`).
    pub sort: Option<SortSpec>,
}

/// Kind filter for the recency index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecencyKind {
    Write,
    Comment,
}

/// Filter for cross-board recency listings.
#[derive(Debug, Clone, Default)]
pub struct RecencyQuery {
    pub group_id: Option<String>,
    pub member_id: Option<String>,
    pub kind: Option<RecencyKind>,
}
