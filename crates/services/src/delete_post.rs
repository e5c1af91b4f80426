//! Post Deletion Engine.
//!
//! Deleting a post cascades across everything that references it: its direct
//! comments, attachments, ledger awards, scraps, recency-index rows, the
//! board's notice flag and counters, and finally the board's "latest" cache
//! prefix. All row mutations land in one storage transaction; the ledger and
//! attachment collaborators are driven before the commit and propagate their
//! failures as storage errors.

use domains::{Actor, BbsError, BbsResult, Board, GrantPurpose, WriteRow};
use serde::Serialize;

use crate::Ports;

/// How many rows a deletion removed, split by kind.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DeletedCounts {
    pub posts: i64,
    pub comments: i64,
}

pub struct PostDeletion {
    ports: Ports,
}

impl PostDeletion {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }

    /// Delete a top-level post and everything hanging off it.
    ///
    /// Pre-mutation checks run in order: authorization, "replies exist"
    /// conflict, comment-threshold conflict. Any failure leaves the store
    /// untouched.
    pub async fn delete_post(
        &self,
        board: &str,
        post_id: i64,
        actor: &Actor,
    ) -> BbsResult<DeletedCounts> {
        let board = self.ports.store.get_board(board).await?;
        let write = self
            .ports
            .store
            .get_write(&board.slug, post_id)
            .await?
            .ok_or_else(|| BbsError::not_found("post", post_id))?;
        if write.is_comment {
            return Err(BbsError::TypeMismatch(format!(
                "{post_id} is a comment, not a post"
            )));
        }

        self.authorize(&board, &write, actor).await?;

        if self.ports.store.has_reply_posts(&write).await? {
            return Err(BbsError::Conflict(
                "replies to this post exist; delete the replies first".into(),
            ));
        }
        if board.delete_comment_limit > 0 {
            let live = self
                .ports
                .store
                .live_comment_count(&board.slug, post_id)
                .await?;
            if live >= board.delete_comment_limit {
                return Err(BbsError::Conflict(format!(
                    "this post has {live} comments (limit {}); it can no longer be deleted",
                    board.delete_comment_limit
                )));
            }
        }

        // The root row has parent_id == its own id, so this set is the post
        // plus its direct comments, ordered by id for determinism.
        let rows = self.ports.store.thread_rows(&board.slug, post_id).await?;
        let mut counts = DeletedCounts::default();
        for row in &rows {
            self.ports.reverse_or_compensate(&board, row).await?;
            if row.is_comment {
                counts.comments += 1;
            } else {
                self.ports.files.delete_board_files(&board.slug, row.id).await?;
                counts.posts += 1;
            }
        }

        self.ports
            .store
            .delete_post_cascade(&board.slug, post_id, counts.posts, counts.comments)
            .await?;

        self.ports.invalidate_latest(&board.slug);
        tracing::info!(
            board = %board.slug,
            post_id,
            posts = counts.posts,
            comments = counts.comments,
            "post deleted"
        );
        Ok(counts)
    }

    async fn authorize(&self, board: &Board, write: &WriteRow, actor: &Actor) -> BbsResult<()> {
        if actor.is_super() {
            return Ok(());
        }
        if actor.is_admin() {
            // A lesser admin may not delete a higher-level member's post.
            if let Some(author) = write.member_id.as_deref() {
                let author_level = self
                    .ports
                    .members
                    .level_of(author)
                    .await?
                    .unwrap_or(1);
                if author_level > actor.level {
                    return Err(BbsError::PermissionDenied(
                        "cannot delete a post written by a higher-level member".into(),
                    ));
                }
            }
            return Ok(());
        }
        if write.is_anonymous() {
            if self
                .ports
                .grants
                .has(GrantPurpose::DeletePost, &board.slug, write.id)
            {
                return Ok(());
            }
            return Err(BbsError::ChallengeRequired {
                challenge: format!("/bbs/password/delete/{}/{}", board.slug, write.id),
            });
        }
        if actor.owns(write) {
            Ok(())
        } else {
            Err(BbsError::PermissionDenied(
                "only your own posts can be deleted".into(),
            ))
        }
    }
}
