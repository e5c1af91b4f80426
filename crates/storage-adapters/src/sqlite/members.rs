//! rustbb/crates/storage-adapters/src/sqlite/members.rs

use async_trait::async_trait;
use domains::{BbsResult, MemberDirectory};
use sqlx::sqlite::SqlitePool;

use super::db_err;

/// Read-only member lookups. Media lookups return None on any failure since
/// they only feed list decoration.
pub struct SqliteMemberDirectory {
    pool: SqlitePool,
}

impl SqliteMemberDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn media_column(&self, column: &str, member_id: &str) -> Option<String> {
        let sql = format!("SELECT {column} FROM members WHERE id = ?");
        sqlx::query_scalar::<_, Option<String>>(&sql)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .flatten()
    }
}

#[async_trait]
impl MemberDirectory for SqliteMemberDirectory {
    async fn level_of(&self, member_id: &str) -> BbsResult<Option<u8>> {
        let level = sqlx::query_scalar::<_, i64>("SELECT level FROM members WHERE id = ?")
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(level.map(|l| l.clamp(0, u8::MAX as i64) as u8))
    }

    async fn image_path(&self, member_id: &str) -> Option<String> {
        self.media_column("image_path", member_id).await
    }

    async fn icon_path(&self, member_id: &str) -> Option<String> {
        self.media_column("icon_path", member_id).await
    }
}
