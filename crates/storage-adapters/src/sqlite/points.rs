//! rustbb/crates/storage-adapters/src/sqlite/points.rs
//!
//! `PointLedger` over the shared pool. Entries are keyed for reversal by
//! `(member, rel_table, rel_id, reason)`, where `rel_table` is the board slug.

use async_trait::async_trait;
use domains::{BbsResult, PointLedger, PointReason};
use sqlx::sqlite::SqlitePool;

use super::db_err;

pub struct SqlitePointLedger {
    pool: SqlitePool,
}

impl SqlitePointLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PointLedger for SqlitePointLedger {
    async fn delete_point(
        &self,
        member_id: &str,
        board: &str,
        write_id: i64,
        reason: PointReason,
    ) -> BbsResult<bool> {
        let result = sqlx::query(
            "DELETE FROM points \
             WHERE member_id = ? AND rel_table = ? AND rel_id = ? AND reason = ?",
        )
        .bind(member_id)
        .bind(board)
        .bind(write_id)
        .bind(reason.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_point(
        &self,
        member_id: &str,
        delta: i64,
        memo: &str,
        rel_table: &str,
        rel_id: i64,
        reason: PointReason,
    ) -> BbsResult<()> {
        sqlx::query(
            "INSERT INTO points (member_id, delta, memo, rel_table, rel_id, reason) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(member_id)
        .bind(delta)
        .bind(memo)
        .bind(rel_table)
        .bind(rel_id)
        .bind(reason.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
