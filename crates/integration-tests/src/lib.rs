//! rustbb/crates/integration-tests/src/lib.rs
//!
//! End-to-end fixtures: every engine wired to a real in-memory sqlite store,
//! with the dashmap cache and grant adapters kept reachable so tests can
//! pre-load and inspect them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use services::{
    BatchDeletion, CommentDeletion, ListingDefaults, Ports, PostDeletion, PostListing, RecencyFeed,
};
use sqlx::SqlitePool;
use storage_adapters::{
    MemoryGrants, MemoryListCache, SqliteAttachmentStore, SqliteMemberDirectory, SqlitePointLedger,
    SqliteStore,
};

pub struct TestBbs {
    pub pool: SqlitePool,
    pub ports: Ports,
    pub listing: PostListing,
    pub post_deletion: PostDeletion,
    pub comment_deletion: CommentDeletion,
    pub batch_deletion: BatchDeletion,
    pub recency: RecencyFeed,
    pub cache: Arc<MemoryListCache>,
    pub grants: Arc<MemoryGrants>,
}

impl TestBbs {
    pub async fn new() -> Self {
        let store = Arc::new(
            SqliteStore::connect("sqlite::memory:", 1)
                .await
                .expect("in-memory sqlite"),
        );
        let pool = store.pool();
        let cache = Arc::new(MemoryListCache::new());
        let grants = Arc::new(MemoryGrants::new());
        let ports = Ports {
            store: store.clone(),
            recency: store.clone(),
            ledger: Arc::new(SqlitePointLedger::new(pool.clone())),
            files: Arc::new(SqliteAttachmentStore::new(pool.clone())),
            cache: cache.clone(),
            grants: grants.clone(),
            members: Arc::new(SqliteMemberDirectory::new(pool.clone())),
        };
        Self {
            pool,
            listing: PostListing::new(ports.clone(), ListingDefaults::default()),
            post_deletion: PostDeletion::new(ports.clone()),
            comment_deletion: CommentDeletion::new(ports.clone()),
            batch_deletion: BatchDeletion::new(ports.clone()),
            recency: RecencyFeed::new(ports.clone(), 15, 0),
            ports,
            cache,
            grants,
        }
    }

    pub async fn add_board(&self, slug: &str) {
        sqlx::query(
            "INSERT INTO boards (slug, group_id, title, notice_ids, write_point, comment_point) \
             VALUES (?, 'community', ?, '', 5, 1)",
        )
        .bind(slug)
        .bind(format!("{slug} board"))
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn set_board(&self, slug: &str, column: &str, value: i64) {
        let sql = format!("UPDATE boards SET {column} = ? WHERE slug = ?");
        sqlx::query(&sql)
            .bind(value)
            .bind(slug)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn set_notices(&self, slug: &str, notice_ids: &str) {
        sqlx::query("UPDATE boards SET notice_ids = ? WHERE slug = ?")
            .bind(notice_ids)
            .bind(slug)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn add_post(&self, board: &str, id: i64, member: Option<&str>) {
        self.add_post_at(board, id, member, Utc::now()).await;
    }

    pub async fn add_post_at(
        &self,
        board: &str,
        id: i64,
        member: Option<&str>,
        created_at: DateTime<Utc>,
    ) {
        sqlx::query(
            "INSERT INTO writes (id, board, parent_id, num, is_comment, member_id, author_name, \
             subject, content, ip, created_at) \
             VALUES (?, ?, ?, ?, 0, ?, ?, ?, ?, '10.1.2.3', ?)",
        )
        .bind(id)
        .bind(board)
        .bind(id)
        .bind(-id)
        .bind(member)
        .bind(member.unwrap_or("guest"))
        .bind(format!("post {id}"))
        .bind(format!("content of post {id}"))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn add_comment(
        &self,
        board: &str,
        id: i64,
        parent: i64,
        path: &str,
        member: Option<&str>,
    ) {
        sqlx::query(
            "INSERT INTO writes (id, board, parent_id, num, comment_path, is_comment, member_id, \
             author_name, subject, content, options, ip, created_at) \
             VALUES (?, ?, ?, ?, ?, 1, ?, ?, '', ?, '', '10.1.2.3', ?)",
        )
        .bind(id)
        .bind(board)
        .bind(parent)
        .bind(-parent)
        .bind(path)
        .bind(member)
        .bind(member.unwrap_or("guest"))
        .bind(format!("comment {id}"))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .unwrap();
        sqlx::query(
            "UPDATE writes SET comment_count = comment_count + 1 WHERE board = ? AND id = ?",
        )
        .bind(board)
        .bind(parent)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn set_options(&self, board: &str, id: i64, options: &str) {
        sqlx::query("UPDATE writes SET options = ? WHERE board = ? AND id = ?")
            .bind(options)
            .bind(board)
            .bind(id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// A top-level reply post on the same sequence number as `num`.
    pub async fn add_reply_post(&self, board: &str, id: i64, num: i64, reply_path: &str) {
        sqlx::query(
            "INSERT INTO writes (id, board, parent_id, num, reply_path, is_comment, author_name, \
             subject, content, ip, created_at) \
             VALUES (?, ?, ?, ?, ?, 0, 'tester', 'a reply post', 'reply body', '10.1.2.3', ?)",
        )
        .bind(id)
        .bind(board)
        .bind(id)
        .bind(num)
        .bind(reply_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn add_recency(&self, board: &str, write_id: i64, parent_id: i64, member: Option<&str>) {
        sqlx::query(
            "INSERT INTO recency_index (board, write_id, parent_id, member_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(board)
        .bind(write_id)
        .bind(parent_id)
        .bind(member)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn award_points(&self, member: &str, board: &str, write_id: i64, reason: &str) {
        sqlx::query(
            "INSERT INTO points (member_id, delta, memo, rel_table, rel_id, reason) \
             VALUES (?, 5, 'seeded award', ?, ?, ?)",
        )
        .bind(member)
        .bind(board)
        .bind(write_id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn add_file(&self, board: &str, write_id: i64, file_no: i64, source_name: &str) {
        sqlx::query(
            "INSERT INTO board_files (board, write_id, file_no, source_name, path, size) \
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(board)
        .bind(write_id)
        .bind(file_no)
        .bind(source_name)
        .bind(format!("/tmp/rustbb-it-{board}-{write_id}-{file_no}"))
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn scalar(&self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
