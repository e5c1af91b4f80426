//! rustbb/crates/api-adapters/src/web/mod.rs
//!
//! Router assembly and shared handler state.

mod actor;
mod error;
mod handlers;

pub use actor::CurrentActor;
pub use error::ApiError;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use services::{BatchDeletion, CommentDeletion, PostDeletion, PostListing, RecencyFeed};
use tower_http::trace::TraceLayer;

/// State shared across all handler invocations.
#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<PostListing>,
    pub post_deletion: Arc<PostDeletion>,
    pub comment_deletion: Arc<CommentDeletion>,
    pub batch_deletion: Arc<BatchDeletion>,
    pub recency: Arc<RecencyFeed>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/boards/{board}/posts", get(handlers::list_posts))
        .route("/boards/{board}/notices", get(handlers::list_notices))
        .route("/boards/{board}/posts/{id}", delete(handlers::delete_post))
        .route(
            "/boards/{board}/comments/{id}",
            delete(handlers::delete_comment),
        )
        .route(
            "/boards/{board}/posts/batch-delete",
            post(handlers::batch_delete),
        )
        .route(
            "/latest",
            get(handlers::list_latest).delete(handlers::delete_latest),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
