//! rustbb/crates/storage-adapters/src/sqlite/mod.rs
//!
//! One shared `SqlitePool` backs every persistent port. The schema is applied
//! idempotently at pool creation, which also makes `sqlite::memory:` fixtures
//! trivial in tests.

mod files;
mod members;
mod points;
mod recency;
mod writes;

pub use files::SqliteAttachmentStore;
pub use members::SqliteMemberDirectory;
pub use points::SqlitePointLedger;

use domains::{BbsError, BbsResult, Board, WriteRow};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SCHEMA: &str = include_str!("../schema.sql");

/// Persistence adapter implementing `WriteStore` and `RecencyIndex`.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects and applies the schema. `sqlite::memory:` works for tests.
    pub async fn connect(url: &str, max_connections: u32) -> BbsResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(BbsError::storage)?;
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(BbsError::storage)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Shared handle for the sibling adapters (ledger, files, members).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }
}

pub(crate) fn db_err(err: sqlx::Error) -> BbsError {
    BbsError::storage(err)
}

/// Maps the comma-separated `notice_ids` column back to an id list.
pub(crate) fn parse_notice_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect()
}

pub(crate) fn join_notice_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn map_board(row: &SqliteRow) -> Board {
    Board {
        slug: row.get("slug"),
        group_id: row.get("group_id"),
        title: row.get("title"),
        post_count: row.get("post_count"),
        comment_count: row.get("comment_count"),
        notice_ids: parse_notice_ids(&row.get::<String, _>("notice_ids")),
        delete_comment_limit: row.get("delete_comment_limit"),
        write_point: row.get("write_point"),
        comment_point: row.get("comment_point"),
        page_rows: row.get("page_rows"),
        comment_level: row.get::<i64, _>("comment_level") as u8,
    }
}

pub(crate) fn map_write(row: &SqliteRow) -> WriteRow {
    WriteRow {
        id: row.get("id"),
        board: row.get("board"),
        parent_id: row.get("parent_id"),
        num: row.get("num"),
        reply_path: row.get("reply_path"),
        comment_path: row.get("comment_path"),
        is_comment: row.get("is_comment"),
        member_id: row.get("member_id"),
        author_name: row.get("author_name"),
        comment_count: row.get("comment_count"),
        subject: row.get("subject"),
        content: row.get("content"),
        options: row.get("options"),
        ip: row.get("ip"),
        created_at: row.get("created_at"),
    }
}
