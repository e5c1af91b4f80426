//! Comment Deletion Engine.
//!
//! A comment deletion is deliberately narrow: the row goes away, the parent
//! post's denormalised `comment_count` drops by one, and the author's ledger
//! award is reversed. Comments carry no attachments, recency entries or
//! scraps, so nothing else is touched.

use domains::{Actor, BbsError, BbsResult, Board, GrantPurpose, WriteRow};

use crate::Ports;

pub struct CommentDeletion {
    ports: Ports,
}

impl CommentDeletion {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }

    pub async fn delete_comment(
        &self,
        board: &str,
        comment_id: i64,
        actor: &Actor,
    ) -> BbsResult<()> {
        let board = self.ports.store.get_board(board).await?;
        let comment = self
            .ports
            .store
            .get_write(&board.slug, comment_id)
            .await?
            .ok_or_else(|| BbsError::not_found("comment", comment_id))?;
        if !comment.is_comment {
            return Err(BbsError::TypeMismatch(format!(
                "{comment_id} is a post, not a comment"
            )));
        }

        self.authorize(&board, &comment, actor)?;

        self.ports.reverse_or_compensate(&board, &comment).await?;
        self.ports
            .store
            .delete_comment_row(&board.slug, comment.id, comment.parent_id)
            .await?;

        tracing::info!(board = %board.slug, comment_id, parent_id = comment.parent_id, "comment deleted");
        Ok(())
    }

    fn authorize(&self, board: &Board, comment: &WriteRow, actor: &Actor) -> BbsResult<()> {
        if actor.is_admin() {
            return Ok(());
        }
        if comment.is_anonymous() {
            if self
                .ports
                .grants
                .has(GrantPurpose::DeleteComment, &board.slug, comment.id)
            {
                return Ok(());
            }
            return Err(BbsError::ChallengeRequired {
                challenge: format!("/bbs/password/comment-delete/{}/{}", board.slug, comment.id),
            });
        }
        if actor.owns(comment) {
            Ok(())
        } else {
            Err(BbsError::PermissionDenied(
                "only your own comments can be deleted".into(),
            ))
        }
    }
}
