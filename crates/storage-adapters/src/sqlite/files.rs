//! rustbb/crates/storage-adapters/src/sqlite/files.rs
//!
//! `AttachmentStore` over the shared pool. Rows are authoritative; the files
//! on disk are removed best-effort, a missing file is not an error.

use async_trait::async_trait;
use domains::{AttachmentStore, BbsResult, BoardFile};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::warn;

use super::db_err;

pub struct SqliteAttachmentStore {
    pool: SqlitePool,
}

impl SqliteAttachmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn files_of(&self, board: &str, write_id: i64) -> BbsResult<Vec<BoardFile>> {
        let rows = sqlx::query(
            "SELECT source_name, path, size FROM board_files \
             WHERE board = ? AND write_id = ? ORDER BY file_no",
        )
        .bind(board)
        .bind(write_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows
            .iter()
            .map(|r| BoardFile {
                source_name: r.get("source_name"),
                path: r.get("path"),
                size: r.get("size"),
            })
            .collect())
    }
}

fn is_image(file: &BoardFile) -> bool {
    mime_guess::from_path(&file.source_name)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

#[async_trait]
impl AttachmentStore for SqliteAttachmentStore {
    async fn delete_board_files(&self, board: &str, write_id: i64) -> BbsResult<()> {
        for file in self.files_of(board, write_id).await? {
            if let Err(err) = tokio::fs::remove_file(&file.path).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %file.path, %err, "attached file not removed");
                }
            }
        }
        sqlx::query("DELETE FROM board_files WHERE board = ? AND write_id = ?")
            .bind(board)
            .bind(write_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_board_files_by_type(
        &self,
        board: &str,
        write_id: i64,
    ) -> BbsResult<(Vec<BoardFile>, Vec<BoardFile>)> {
        let (images, others) = self
            .files_of(board, write_id)
            .await?
            .into_iter()
            .partition(is_image);
        Ok((images, others))
    }
}
