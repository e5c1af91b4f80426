//! rustbb/crates/api-adapters/tests/board_handlers.rs
//!
//! Handler-level tests over the real router wired to an in-memory sqlite
//! store. Exercises the wire contract: routes, identity headers, and the
//! error-to-status mapping.

use std::sync::Arc;

use api_adapters::web::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use services::{
    BatchDeletion, CommentDeletion, ListingDefaults, Ports, PostDeletion, PostListing, RecencyFeed,
};
use sqlx::SqlitePool;
use storage_adapters::{
    MemoryGrants, MemoryListCache, SqliteAttachmentStore, SqliteMemberDirectory, SqlitePointLedger,
    SqliteStore,
};
use tower::ServiceExt;

async fn app() -> (Router, SqlitePool) {
    let store = Arc::new(
        SqliteStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory sqlite"),
    );
    let pool = store.pool();
    let ports = Ports {
        store: store.clone(),
        recency: store.clone(),
        ledger: Arc::new(SqlitePointLedger::new(pool.clone())),
        files: Arc::new(SqliteAttachmentStore::new(pool.clone())),
        cache: Arc::new(MemoryListCache::new()),
        grants: Arc::new(MemoryGrants::new()),
        members: Arc::new(SqliteMemberDirectory::new(pool.clone())),
    };
    let state = AppState {
        listing: Arc::new(PostListing::new(ports.clone(), ListingDefaults::default())),
        post_deletion: Arc::new(PostDeletion::new(ports.clone())),
        comment_deletion: Arc::new(CommentDeletion::new(ports.clone())),
        batch_deletion: Arc::new(BatchDeletion::new(ports.clone())),
        recency: Arc::new(RecencyFeed::new(ports, 15, 0)),
    };
    (router(state), pool)
}

async fn seed_board(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO boards (slug, group_id, title, notice_ids, write_point, comment_point) \
         VALUES ('free', 'community', 'Free Board', '', 5, 1)",
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_post(pool: &SqlitePool, id: i64, member: Option<&str>) {
    sqlx::query(
        "INSERT INTO writes (id, board, parent_id, num, is_comment, member_id, author_name, \
         subject, content, ip, created_at) \
         VALUES (?, 'free', ?, ?, 0, ?, 'tester', ?, 'body', '10.0.0.1', ?)",
    )
    .bind(id)
    .bind(id)
    .bind(-id)
    .bind(member)
    .bind(format!("post {id}"))
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_comment(pool: &SqlitePool, id: i64, parent: i64, member: Option<&str>) {
    sqlx::query(
        "INSERT INTO writes (id, board, parent_id, num, comment_path, is_comment, member_id, \
         author_name, subject, content, ip, created_at) \
         VALUES (?, 'free', ?, ?, 'AA', 1, ?, 'tester', '', 'a comment', '10.0.0.1', ?)",
    )
    .bind(id)
    .bind(parent)
    .bind(-parent)
    .bind(member)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .unwrap();
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn listing_returns_a_decorated_page() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    for id in 1..=3 {
        seed_post(&pool, id, None).await;
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/boards/free/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total_count"], 3);
    let posts = body["posts"].as_array().unwrap();
    let ids: Vec<i64> = posts.iter().map(|p| p["write"]["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    let ordinals: Vec<i64> = posts.iter().map(|p| p["ordinal"].as_i64().unwrap()).collect();
    assert_eq!(ordinals, vec![3, 2, 1]);
}

#[tokio::test]
async fn unknown_search_field_is_a_bad_request() {
    let (app, pool) = app().await;
    seed_board(&pool).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/boards/free/posts?q=hello&field=password")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_sort_name_falls_back_to_the_default_ordering() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    for id in 1..=3 {
        seed_post(&pool, id, None).await;
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/boards/free/posts?sort=password&dir=sideways")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let ids: Vec<i64> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["write"]["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn guest_deleting_an_anonymous_post_gets_the_challenge_path() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    seed_post(&pool, 1, None).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/boards/free/posts/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(response).await;
    assert_eq!(body["challenge"], "/bbs/password/delete/free/1");
}

#[tokio::test]
async fn super_admin_deletes_a_post_with_its_comments() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    seed_post(&pool, 1, Some("alice")).await;
    seed_comment(&pool, 2, 1, Some("bob")).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/boards/free/posts/1")
                .header("x-rustbb-member", "root")
                .header("x-rustbb-admin", "super")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["posts"], 1);
    assert_eq!(body["comments"], 1);

    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM writes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn owner_deletion_compensates_an_unreversed_award() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    seed_post(&pool, 1, Some("alice")).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/boards/free/posts/1")
                .header("x-rustbb-member", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // No award existed to reverse, so a negative entry lands instead.
    let delta = sqlx::query_scalar::<_, i64>(
        "SELECT delta FROM points WHERE member_id = 'alice' AND reason = 'write'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(delta, -5);
}

#[tokio::test]
async fn comment_endpoint_rejects_a_top_level_post() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    seed_post(&pool, 1, Some("alice")).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/boards/free/comments/1")
                .header("x-rustbb-member", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_deletion_is_admin_only() {
    let (app, pool) = app().await;
    seed_board(&pool).await;
    seed_post(&pool, 1, Some("alice")).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/boards/free/posts/batch-delete")
                .header("x-rustbb-member", "alice")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"ids":[1]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_board_is_not_found() {
    let (app, _pool) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/boards/nope/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
