//! rustbb/cmd/seed/src/main.rs
//!
//! Development fixture loader: creates a couple of boards, members, and a
//! small thread so a fresh database has something to list and delete.

use anyhow::Context;
use chrono::Utc;
use configs::AppConfig;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use storage_adapters::SqliteStore;
use tracing_subscriber::EnvFilter;

async fn seed_boards(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO boards \
         (slug, group_id, title, notice_ids, write_point, comment_point, page_rows) VALUES \
         ('free', 'community', 'Free Board', '1', 5, 1, 0), \
         ('qna', 'support', 'Questions', '', 10, 2, 20)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_members(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO members (id, level, image_path) VALUES \
         ('admin', 10, NULL), \
         ('alice', 2, '/data/member/alice.png'), \
         ('bob', 1, NULL)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_thread(pool: &SqlitePool) -> anyhow::Result<()> {
    let now = Utc::now();
    for (id, member, subject) in [
        (1_i64, Some("alice"), "Welcome to rustbb"),
        (2, Some("bob"), "First real post"),
        (3, None, "Anonymous hello"),
    ] {
        sqlx::query(
            "INSERT OR IGNORE INTO writes \
             (id, board, parent_id, num, is_comment, member_id, author_name, subject, content, \
              ip, created_at) \
             VALUES (?, 'free', ?, ?, 0, ?, ?, ?, 'seeded content', '127.0.0.1', ?)",
        )
        .bind(id)
        .bind(id)
        .bind(-id)
        .bind(member)
        .bind(member.unwrap_or("guest"))
        .bind(subject)
        .bind(now)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO recency_index (board, write_id, parent_id, member_id, created_at) \
             VALUES ('free', ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(id)
        .bind(member)
        .bind(now)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        "INSERT OR IGNORE INTO writes \
         (id, board, parent_id, num, comment_path, is_comment, member_id, author_name, subject, \
          content, ip, created_at) \
         VALUES (4, 'free', 2, -2, 'AA', 1, 'alice', 'alice', '', 'a seeded comment', \
                 '127.0.0.1', ?)",
    )
    .bind(now)
    .execute(pool)
    .await?;
    sqlx::query("UPDATE writes SET comment_count = 1 WHERE board = 'free' AND id = 2")
        .execute(pool)
        .await?;
    sqlx::query("UPDATE boards SET post_count = 3, comment_count = 1 WHERE slug = 'free'")
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::load().context("loading configuration")?;
    let store = SqliteStore::connect(cfg.database.url.expose_secret(), 2)
        .await
        .context("connecting to the database")?;
    let pool = store.pool();

    seed_boards(&pool).await.context("seeding boards")?;
    seed_members(&pool).await.context("seeding members")?;
    seed_thread(&pool).await.context("seeding the demo thread")?;

    tracing::info!("seed data applied");
    Ok(())
}
