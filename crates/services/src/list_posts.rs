//! Listing/Search Engine.
//!
//! Browsing a large post set stays cheap because a search never scans the
//! whole partition: it is restricted to one window `[start, start + W)` of
//! the signed sequence-number space (top-level rows carry negative `num`
//! values). Comment matches are folded into their parent post via a
//! distinct-parents subquery, so search results are always top-level posts.
//! Plain (non-search) listings skip the window and simply exclude comments.

use chrono::Utc;
use domains::{
    Actor, BbsResult, Board, BoardFile, GrantPurpose, SearchFilter, SeqWindow, SortSpec,
    WriteQuery, WriteRow,
};
use serde::Serialize;

use crate::display;
use crate::Ports;

/// Caller-facing listing parameters.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub search: Option<SearchFilter>,
    pub sort: Option<SortSpec>,
    /// 1-based page number.
    pub page: i64,
    /// Override of the board / global page size.
    pub per_page: Option<i64>,
    /// Include pinned notice posts in the regular flow.
    pub include_notices: bool,
    /// Search-window anchor; None starts at the partition minimum.
    pub window_start: Option<i64>,
    /// Attach the file summary to each post.
    pub with_files: bool,
}

/// A post plus the derived display fields every list view needs.
#[derive(Debug, Clone, Serialize)]
pub struct DecoratedPost {
    pub write: WriteRow,
    /// Descending display number, independent of the DB ordering.
    pub ordinal: i64,
    pub author_name: String,
    pub member_image_path: Option<String>,
    pub member_icon_path: Option<String>,
    pub thumbnail: Option<String>,
    pub good: i64,
    pub bad: i64,
    pub images: Vec<BoardFile>,
    pub files: Vec<BoardFile>,
    pub comments: Vec<DecoratedComment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecoratedComment {
    pub id: i64,
    pub parent_id: i64,
    pub author_name: String,
    pub member_id: Option<String>,
    pub member_image_path: Option<String>,
    pub member_icon_path: Option<String>,
    pub display_ip: String,
    /// Real content, or the fixed placeholder when redacted.
    pub content: String,
    pub is_secret: bool,
    /// True when the viewer sees the placeholder instead of the content.
    pub is_secret_content: bool,
    /// Viewer may reply: nesting depth below the cap and level sufficient.
    pub is_reply: bool,
    pub is_edit: bool,
    pub is_del: bool,
    pub created_at: chrono::DateTime<Utc>,
}

/// One page of the listing plus window navigation.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub posts: Vec<DecoratedPost>,
    pub total_count: i64,
    /// Previous search window anchor, None at the partition minimum.
    pub prev_window_start: Option<i64>,
    /// Next search window anchor, None once it would cross zero.
    pub next_window_start: Option<i64>,
}

/// Global fallbacks the engine reads when a board leaves a field at 0.
#[derive(Debug, Clone, Copy)]
pub struct ListingDefaults {
    pub search_window: i64,
    pub page_rows: i64,
    pub name_cut: usize,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        Self {
            search_window: 10_000,
            page_rows: 15,
            name_cut: 0,
        }
    }
}

/// Maximum comment nesting depth (= `comment_path` length).
const MAX_COMMENT_DEPTH: usize = 5;

pub struct PostListing {
    ports: Ports,
    defaults: ListingDefaults,
}

impl PostListing {
    pub fn new(ports: Ports, defaults: ListingDefaults) -> Self {
        Self { ports, defaults }
    }

    /// Paginated, decorated board listing honoring search partitioning,
    /// explicit sort, and notice exclusion.
    pub async fn list_posts(
        &self,
        board: &str,
        req: &ListRequest,
        actor: &Actor,
    ) -> BbsResult<PostPage> {
        let board = self.ports.store.get_board(board).await?;

        let mut query = WriteQuery {
            board: board.slug.clone(),
            search: req.search.clone(),
            sort: req.sort,
            ..Default::default()
        };

        let mut prev_window_start = None;
        let mut next_window_start = None;
        if query.search.is_some() {
            let width = self.defaults.search_window;
            let min = self.ports.store.min_seq(&board.slug).await?;
            let start = req.window_start.unwrap_or(min);
            if start > min {
                prev_window_start = Some(start - width);
            }
            // sequence numbers are negative by convention; a window starting
            // at or past zero has nothing left to scan
            if start + width < 0 {
                next_window_start = Some(start + width);
            }
            query.window = Some(SeqWindow {
                start,
                end: start + width,
            });
            query.parents_of_matches = true;
        } else {
            query.top_level_only = true;
        }

        if !req.include_notices {
            query.exclude_ids = board.notice_ids.clone();
        }

        let per_page = req.per_page.unwrap_or(if board.page_rows > 0 {
            board.page_rows
        } else {
            self.defaults.page_rows
        });
        let page = req.page.max(1);
        let offset = (page - 1) * per_page;

        let rows = self
            .ports
            .store
            .search_writes(&query, offset, per_page)
            .await?;
        let total_count = self.ports.store.count_writes(&query).await?;

        let posts = self
            .decorate(&board, rows, total_count, offset, actor, req.with_files)
            .await?;

        Ok(PostPage {
            posts,
            total_count,
            prev_window_start,
            next_window_start,
        })
    }

    /// The board's pinned posts, decorated like any listing row but outside
    /// the paginated flow. Callers show them on the first page only.
    pub async fn get_notice_posts(
        &self,
        board: &str,
        actor: &Actor,
        with_files: bool,
    ) -> BbsResult<Vec<DecoratedPost>> {
        let board = self.ports.store.get_board(board).await?;
        if board.notice_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .ports
            .store
            .writes_by_ids(&board.slug, &board.notice_ids)
            .await?;
        let total = rows.len() as i64;
        self.decorate(&board, rows, total, 0, actor, with_files).await
    }

    async fn decorate(
        &self,
        board: &Board,
        rows: Vec<WriteRow>,
        total_count: i64,
        offset: i64,
        actor: &Actor,
        with_files: bool,
    ) -> BbsResult<Vec<DecoratedPost>> {
        let mut out = Vec::with_capacity(rows.len());
        for (index, write) in rows.into_iter().enumerate() {
            let ordinal = total_count - offset - index as i64;

            let (member_image_path, member_icon_path) =
                self.member_media(write.member_id.as_deref()).await;
            let (good, bad) = self
                .ports
                .store
                .reaction_counts(&board.slug, write.id)
                .await?;

            // files are always fetched for thumbnail derivation; the summary
            // itself is attached only on request
            let (images, others) = self
                .ports
                .files
                .get_board_files_by_type(&board.slug, write.id)
                .await?;
            let thumbnail = images
                .first()
                .map(|f| f.path.clone())
                .or_else(|| display::first_img_src(&write.content));

            let mut comments = Vec::new();
            for comment in self.ports.store.comments_of(&board.slug, write.id).await? {
                comments.push(self.decorate_comment(board, &write, comment, actor).await?);
            }

            out.push(DecoratedPost {
                author_name: display::cut_name(&write.author_name, self.defaults.name_cut),
                ordinal,
                member_image_path,
                member_icon_path,
                thumbnail,
                good,
                bad,
                images: if with_files { images } else { Vec::new() },
                files: if with_files { others } else { Vec::new() },
                comments,
                write,
            });
        }
        Ok(out)
    }

    async fn decorate_comment(
        &self,
        board: &Board,
        parent: &WriteRow,
        comment: WriteRow,
        actor: &Actor,
    ) -> BbsResult<DecoratedComment> {
        let (member_image_path, member_icon_path) =
            self.member_media(comment.member_id.as_deref()).await;

        let is_secret = comment.is_secret();
        let redacted = is_secret
            && !actor.is_admin()
            && !actor.owns(&comment)
            && !actor.owns(parent)
            && !self
                .ports
                .grants
                .has(GrantPurpose::ViewSecretComment, &board.slug, comment.id);
        let content = if redacted {
            display::SECRET_PLACEHOLDER.to_string()
        } else {
            comment.content.clone()
        };

        Ok(DecoratedComment {
            id: comment.id,
            parent_id: comment.parent_id,
            author_name: display::cut_name(&comment.author_name, self.defaults.name_cut),
            member_id: comment.member_id.clone(),
            member_image_path,
            member_icon_path,
            display_ip: display::mask_ip(&comment.ip, actor.is_admin()),
            content,
            is_secret,
            is_secret_content: redacted,
            is_reply: comment.comment_path.chars().count() < MAX_COMMENT_DEPTH
                && actor.level >= board.comment_level,
            is_edit: actor.is_admin() || actor.owns(&comment),
            is_del: actor.is_admin() || actor.owns(&comment) || comment.is_anonymous(),
            created_at: comment.created_at,
        })
    }

    async fn member_media(&self, member_id: Option<&str>) -> (Option<String>, Option<String>) {
        match member_id {
            Some(id) => (
                self.ports.members.image_path(id).await,
                self.ports.members.icon_path(id).await,
            ),
            None => (None, None),
        }
    }
}
