//! rustbb/crates/storage-adapters/src/sqlite/recency.rs
//!
//! `RecencyIndex` over the shared pool. Entries are served newest-first by
//! their autoincrement id; the group filter joins `boards` on the slug.

use async_trait::async_trait;
use domains::{BbsResult, RecencyEntry, RecencyIndex, RecencyKind, RecencyQuery};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::{db_err, SqliteStore};

fn map_entry(row: &SqliteRow) -> RecencyEntry {
    RecencyEntry {
        id: row.get("id"),
        board: row.get("board"),
        write_id: row.get("write_id"),
        parent_id: row.get("parent_id"),
        member_id: row.get("member_id"),
        created_at: row.get("created_at"),
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &RecencyQuery) {
    qb.push("FROM recency_index r ");
    if query.group_id.is_some() {
        qb.push("JOIN boards b ON b.slug = r.board ");
    }
    qb.push("WHERE 1 = 1");
    if let Some(group) = &query.group_id {
        qb.push(" AND b.group_id = ");
        qb.push_bind(group.clone());
    }
    if let Some(member) = &query.member_id {
        qb.push(" AND r.member_id = ");
        qb.push_bind(member.clone());
    }
    match query.kind {
        Some(RecencyKind::Write) => {
            qb.push(" AND r.parent_id = r.write_id");
        }
        Some(RecencyKind::Comment) => {
            qb.push(" AND r.parent_id <> r.write_id");
        }
        None => {}
    }
}

#[async_trait]
impl RecencyIndex for SqliteStore {
    async fn list(
        &self,
        query: &RecencyQuery,
        offset: i64,
        limit: i64,
    ) -> BbsResult<Vec<RecencyEntry>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT r.* ");
        push_filters(&mut qb, query);
        qb.push(" ORDER BY r.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(rows.iter().map(map_entry).collect())
    }

    async fn count(&self, query: &RecencyQuery) -> BbsResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) ");
        push_filters(&mut qb, query);
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn entries_by_ids(&self, ids: &[i64]) -> BbsResult<Vec<RecencyEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM recency_index WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY id DESC");
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(rows.iter().map(map_entry).collect())
    }

    async fn delete_entries(&self, ids: &[i64]) -> BbsResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM recency_index WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        qb.push(")");
        qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }
}
