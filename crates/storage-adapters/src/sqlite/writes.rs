//! rustbb/crates/storage-adapters/src/sqlite/writes.rs
//!
//! `WriteStore` over the shared pool. Listing SQL is assembled with
//! `QueryBuilder` from the allow-listed enums in `domains`; caller-supplied
//! text only ever reaches the database as a bind parameter.

use async_trait::async_trait;
use domains::{
    BbsError, BbsResult, Board, SearchField, SortDir, SortField, SortSpec, WriteQuery, WriteRow,
    WriteStore,
};
use sqlx::{QueryBuilder, Row, Sqlite};

use super::{db_err, join_notice_ids, map_board, map_write, parse_notice_ids, SqliteStore};

/// Appends the free-text predicate for `field` against table alias `alias`.
fn push_search(
    qb: &mut QueryBuilder<'_, Sqlite>,
    alias: &str,
    field: SearchField,
    text: &str,
) {
    let like = format!("%{text}%");
    match field {
        SearchField::Subject => {
            qb.push(format!("{alias}.subject LIKE "));
            qb.push_bind(like);
        }
        SearchField::Content => {
            qb.push(format!("{alias}.content LIKE "));
            qb.push_bind(like);
        }
        SearchField::SubjectContent => {
            qb.push(format!("({alias}.subject LIKE "));
            qb.push_bind(like.clone());
            qb.push(format!(" OR {alias}.content LIKE "));
            qb.push_bind(like);
            qb.push(")");
        }
        SearchField::AuthorName => {
            qb.push(format!("{alias}.author_name LIKE "));
            qb.push_bind(like);
        }
        SearchField::MemberId => {
            qb.push(format!("{alias}.member_id = "));
            qb.push_bind(text.to_owned());
        }
    }
}

/// Appends the full WHERE clause for a listing query over alias `w`.
///
/// In `parents_of_matches` mode the search and window predicates apply to an
/// inner scan, and the outer rows are the distinct parents of its matches;
/// a comment hit therefore surfaces as its thread's top post.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &WriteQuery) {
    qb.push("WHERE w.board = ");
    qb.push_bind(query.board.clone());

    if query.parents_of_matches {
        qb.push(" AND w.id IN (SELECT DISTINCT m.parent_id FROM writes m WHERE m.board = ");
        qb.push_bind(query.board.clone());
        if let Some(search) = &query.search {
            qb.push(" AND ");
            push_search(qb, "m", search.field, &search.text);
        }
        if let Some(win) = query.window {
            qb.push(" AND m.num >= ");
            qb.push_bind(win.start);
            qb.push(" AND m.num < ");
            qb.push_bind(win.end);
        }
        qb.push(")");
    } else {
        if let Some(search) = &query.search {
            qb.push(" AND ");
            push_search(qb, "w", search.field, &search.text);
        }
        if let Some(win) = query.window {
            qb.push(" AND w.num >= ");
            qb.push_bind(win.start);
            qb.push(" AND w.num < ");
            qb.push_bind(win.end);
        }
        if query.top_level_only {
            qb.push(" AND w.is_comment = 0");
        }
    }

    if !query.exclude_ids.is_empty() {
        qb.push(" AND w.id NOT IN (");
        let mut ids = qb.separated(", ");
        for id in &query.exclude_ids {
            ids.push_bind(*id);
        }
        qb.push(")");
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, sort: Option<SortSpec>) {
    match sort {
        Some(spec) => {
            let col = match spec.field {
                SortField::Id => "id",
                SortField::Num => "num",
                SortField::CreatedAt => "created_at",
                SortField::Subject => "subject",
                SortField::AuthorName => "author_name",
                SortField::CommentCount => "comment_count",
            };
            let dir = match spec.dir {
                SortDir::Asc => "ASC",
                SortDir::Desc => "DESC",
            };
            qb.push(format!(" ORDER BY w.{col} {dir}, w.id ASC"));
        }
        None => {
            qb.push(" ORDER BY w.num ASC, w.reply_path ASC");
        }
    }
}

#[async_trait]
impl WriteStore for SqliteStore {
    async fn get_board(&self, board: &str) -> BbsResult<Board> {
        let row = sqlx::query("SELECT * FROM boards WHERE slug = ?")
            .bind(board)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| map_board(&r))
            .ok_or_else(|| BbsError::not_found("board", board))
    }

    async fn get_write(&self, board: &str, id: i64) -> BbsResult<Option<WriteRow>> {
        let row = sqlx::query("SELECT * FROM writes WHERE board = ? AND id = ?")
            .bind(board)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(|r| map_write(&r)))
    }

    async fn thread_rows(&self, board: &str, parent_id: i64) -> BbsResult<Vec<WriteRow>> {
        let rows = sqlx::query("SELECT * FROM writes WHERE board = ? AND parent_id = ? ORDER BY id")
            .bind(board)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_write).collect())
    }

    async fn has_reply_posts(&self, write: &WriteRow) -> BbsResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM writes \
             WHERE board = ? AND num = ? AND is_comment = 0 AND id <> ? \
               AND reply_path LIKE ? || '%' AND LENGTH(reply_path) > LENGTH(?))",
        )
        .bind(&write.board)
        .bind(write.num)
        .bind(write.id)
        .bind(&write.reply_path)
        .bind(&write.reply_path)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(exists)
    }

    async fn comments_of(&self, board: &str, parent_id: i64) -> BbsResult<Vec<WriteRow>> {
        let rows = sqlx::query(
            "SELECT * FROM writes \
             WHERE board = ? AND parent_id = ? AND is_comment = 1 \
             ORDER BY comment_path, id",
        )
        .bind(board)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(map_write).collect())
    }

    async fn live_comment_count(&self, board: &str, parent_id: i64) -> BbsResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM writes WHERE board = ? AND parent_id = ? AND is_comment = 1",
        )
        .bind(board)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn delete_post_cascade(
        &self,
        board: &str,
        post_id: i64,
        posts_removed: i64,
        comments_removed: i64,
    ) -> BbsResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM writes WHERE board = ? AND parent_id = ?")
            .bind(board)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM recency_index WHERE board = ? AND parent_id = ?")
            .bind(board)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM scraps WHERE board = ? AND write_id = ?")
            .bind(board)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let notice_raw = sqlx::query_scalar::<_, String>(
            "SELECT notice_ids FROM boards WHERE slug = ?",
        )
        .bind(board)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        let kept: Vec<i64> = parse_notice_ids(&notice_raw)
            .into_iter()
            .filter(|id| *id != post_id)
            .collect();

        sqlx::query(
            "UPDATE boards SET notice_ids = ?, \
             post_count = MAX(post_count - ?, 0), \
             comment_count = MAX(comment_count - ?, 0) \
             WHERE slug = ?",
        )
        .bind(join_notice_ids(&kept))
        .bind(posts_removed)
        .bind(comments_removed)
        .bind(board)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)
    }

    async fn delete_comment_row(
        &self,
        board: &str,
        comment_id: i64,
        parent_id: i64,
    ) -> BbsResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM writes WHERE board = ? AND id = ?")
            .bind(board)
            .bind(comment_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            "UPDATE writes SET comment_count = MAX(comment_count - 1, 0) \
             WHERE board = ? AND id = ?",
        )
        .bind(board)
        .bind(parent_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM recency_index WHERE board = ? AND write_id = ?")
            .bind(board)
            .bind(comment_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            "UPDATE boards SET comment_count = MAX(comment_count - 1, 0) WHERE slug = ?",
        )
        .bind(board)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)
    }

    async fn delete_rows(&self, board: &str, ids: &[i64]) -> BbsResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM writes WHERE board = ");
        qb.push_bind(board.to_owned());
        qb.push(" AND id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        qb.push(")");
        qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }

    async fn writes_by_ids(&self, board: &str, ids: &[i64]) -> BbsResult<Vec<WriteRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM writes WHERE board = ");
        qb.push_bind(board.to_owned());
        qb.push(" AND id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY id");
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(rows.iter().map(map_write).collect())
    }

    async fn search_writes(
        &self,
        query: &WriteQuery,
        offset: i64,
        limit: i64,
    ) -> BbsResult<Vec<WriteRow>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT w.* FROM writes w ");
        push_filters(&mut qb, query);
        push_order(&mut qb, query.sort);
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(rows.iter().map(map_write).collect())
    }

    async fn count_writes(&self, query: &WriteQuery) -> BbsResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM writes w ");
        push_filters(&mut qb, query);
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn min_seq(&self, board: &str) -> BbsResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MIN(num), 0) FROM writes WHERE board = ?")
            .bind(board)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn reaction_counts(&self, board: &str, write_id: i64) -> BbsResult<(i64, i64)> {
        let row = sqlx::query(
            "SELECT \
             COALESCE(SUM(CASE WHEN kind = 'good' THEN 1 ELSE 0 END), 0) AS good, \
             COALESCE(SUM(CASE WHEN kind = 'bad' THEN 1 ELSE 0 END), 0) AS bad \
             FROM reactions WHERE board = ? AND write_id = ?",
        )
        .bind(board)
        .bind(write_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok((row.get("good"), row.get("bad")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{comment, insert_board, insert_write, memory_store, post};
    use domains::{SearchField, SearchFilter, SeqWindow, WriteQuery, WriteStore};

    #[tokio::test]
    async fn get_board_parses_notice_ids() {
        let store = memory_store().await;
        insert_board(&store, "free", "3, 7").await;

        let board = store.get_board("free").await.unwrap();
        assert_eq!(board.notice_ids, vec![3, 7]);
        assert!(store.get_board("nope").await.is_err());
    }

    #[tokio::test]
    async fn thread_rows_include_the_post_itself_ordered_by_id() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        insert_write(&store, &post("free", 1, Some("alice"))).await;
        insert_write(&store, &comment("free", 3, 1, "AA")).await;
        insert_write(&store, &comment("free", 2, 1, "AB")).await;

        let rows = store.thread_rows("free", 1).await.unwrap();
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn reply_detection_requires_a_longer_path_on_the_same_num() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        let base = post("free", 1, None);
        insert_write(&store, &base).await;
        assert!(!store.has_reply_posts(&base).await.unwrap());

        let mut reply = post("free", 2, None);
        reply.num = base.num;
        reply.reply_path = "A".into();
        insert_write(&store, &reply).await;
        assert!(store.has_reply_posts(&base).await.unwrap());

        // A comment on the same num is not a reply post.
        assert!(!store.has_reply_posts(&reply).await.unwrap());
    }

    #[tokio::test]
    async fn cascade_removes_thread_scraps_recency_and_notice_flag() {
        let store = memory_store().await;
        insert_board(&store, "free", "1, 9").await;
        insert_write(&store, &post("free", 1, Some("alice"))).await;
        insert_write(&store, &comment("free", 2, 1, "AA")).await;
        sqlx::query(
            "INSERT INTO recency_index (board, write_id, parent_id, member_id, created_at) \
             VALUES ('free', 1, 1, 'alice', '2026-01-01T00:00:00Z'), \
                    ('free', 2, 1, 'bob', '2026-01-01T00:00:00Z')",
        )
        .execute(&store.pool())
        .await
        .unwrap();
        sqlx::query("INSERT INTO scraps (board, write_id, member_id) VALUES ('free', 1, 'carol')")
            .execute(&store.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE boards SET post_count = 4, comment_count = 2 WHERE slug = 'free'")
            .execute(&store.pool())
            .await
            .unwrap();

        store.delete_post_cascade("free", 1, 1, 1).await.unwrap();

        assert!(store.get_write("free", 1).await.unwrap().is_none());
        assert!(store.get_write("free", 2).await.unwrap().is_none());
        let recency = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recency_index")
            .fetch_one(&store.pool())
            .await
            .unwrap();
        assert_eq!(recency, 0);
        let scraps = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scraps")
            .fetch_one(&store.pool())
            .await
            .unwrap();
        assert_eq!(scraps, 0);

        let board = store.get_board("free").await.unwrap();
        assert_eq!(board.notice_ids, vec![9]);
        assert_eq!(board.post_count, 3);
        assert_eq!(board.comment_count, 1);
    }

    #[tokio::test]
    async fn comment_removal_decrements_the_parent_and_board_counters() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        let mut parent = post("free", 1, Some("alice"));
        parent.comment_count = 2;
        insert_write(&store, &parent).await;
        insert_write(&store, &comment("free", 2, 1, "AA")).await;
        sqlx::query("UPDATE boards SET comment_count = 5 WHERE slug = 'free'")
            .execute(&store.pool())
            .await
            .unwrap();

        store.delete_comment_row("free", 2, 1).await.unwrap();

        assert!(store.get_write("free", 2).await.unwrap().is_none());
        let parent = store.get_write("free", 1).await.unwrap().unwrap();
        assert_eq!(parent.comment_count, 1);
        assert_eq!(store.get_board("free").await.unwrap().comment_count, 4);
    }

    #[tokio::test]
    async fn search_folds_comment_matches_into_parent_posts() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        insert_write(&store, &post("free", 1, None)).await;
        insert_write(&store, &post("free", 2, None)).await;
        let mut c = comment("free", 3, 2, "AA");
        c.content = "the needle is here".into();
        insert_write(&store, &c).await;

        let query = WriteQuery {
            board: "free".into(),
            search: Some(SearchFilter {
                field: SearchField::Content,
                text: "needle".into(),
            }),
            window: Some(SeqWindow {
                start: -10_000,
                end: 0,
            }),
            parents_of_matches: true,
            ..WriteQuery::default()
        };

        let rows = store.search_writes(&query, 0, 10).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(store.count_writes(&query).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn window_bound_is_half_open() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        insert_write(&store, &post("free", 1, None)).await; // num -1
        insert_write(&store, &post("free", 2, None)).await; // num -2

        let query = WriteQuery {
            board: "free".into(),
            search: Some(SearchFilter {
                field: SearchField::Subject,
                text: "subject".into(),
            }),
            window: Some(SeqWindow { start: -2, end: -1 }),
            parents_of_matches: true,
            ..WriteQuery::default()
        };
        let rows = store.search_writes(&query, 0, 10).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn plain_listing_skips_comments_and_excluded_ids() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        insert_write(&store, &post("free", 1, None)).await;
        insert_write(&store, &post("free", 2, None)).await;
        insert_write(&store, &post("free", 3, None)).await;
        insert_write(&store, &comment("free", 4, 3, "AA")).await;

        let query = WriteQuery {
            board: "free".into(),
            top_level_only: true,
            exclude_ids: vec![2],
            ..WriteQuery::default()
        };
        let rows = store.search_writes(&query, 0, 10).await.unwrap();
        // Default ordering is num ascending, so newest (most negative) first.
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(store.count_writes(&query).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn min_seq_is_zero_for_an_empty_partition() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        assert_eq!(store.min_seq("free").await.unwrap(), 0);
        insert_write(&store, &post("free", 5, None)).await;
        assert_eq!(store.min_seq("free").await.unwrap(), -5);
    }

    #[tokio::test]
    async fn reaction_counts_split_by_kind() {
        let store = memory_store().await;
        insert_board(&store, "free", "").await;
        insert_write(&store, &post("free", 1, None)).await;
        sqlx::query(
            "INSERT INTO reactions (board, write_id, member_id, kind) VALUES \
             ('free', 1, 'a', 'good'), ('free', 1, 'b', 'good'), ('free', 1, 'c', 'bad')",
        )
        .execute(&store.pool())
        .await
        .unwrap();

        assert_eq!(store.reaction_counts("free", 1).await.unwrap(), (2, 1));
        assert_eq!(store.reaction_counts("free", 2).await.unwrap(), (0, 0));
    }
}
