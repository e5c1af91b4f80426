//! Bulk Deletion Engine.
//!
//! The administrative batch path: reverse every selected row's ledger award,
//! drop its attachments, delete the rows in one transaction, invalidate the
//! board's "latest" cache prefix. It intentionally performs none of the
//! single-post cascade's counter, recency, scrap or notice maintenance; that
//! asymmetry is a documented property of the admin batch tooling.

use domains::{Actor, BbsError, BbsResult};

use crate::Ports;

pub struct BatchDeletion {
    ports: Ports,
}

impl BatchDeletion {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }

    /// Delete an arbitrary set of rows from one board. The caller is assumed
    /// pre-authorized at a coarser grain; only an admin check runs here.
    /// Returns how many rows were actually found and removed.
    pub async fn delete_posts(
        &self,
        board: &str,
        ids: &[i64],
        actor: &Actor,
    ) -> BbsResult<usize> {
        if !actor.is_admin() {
            return Err(BbsError::PermissionDenied(
                "batch deletion is an administrator operation".into(),
            ));
        }
        let board = self.ports.store.get_board(board).await?;
        let rows = self.ports.store.writes_by_ids(&board.slug, ids).await?;
        if rows.is_empty() {
            return Ok(0);
        }

        for row in &rows {
            self.ports.reverse_or_compensate(&board, row).await?;
            self.ports.files.delete_board_files(&board.slug, row.id).await?;
        }

        let row_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        self.ports.store.delete_rows(&board.slug, &row_ids).await?;

        self.ports.invalidate_latest(&board.slug);
        tracing::info!(board = %board.slug, removed = row_ids.len(), "batch deletion finished");
        Ok(row_ids.len())
    }
}
