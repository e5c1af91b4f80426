//! rustbb/crates/api-adapters/src/web/handlers.rs
//!
//! Thin translations from HTTP to the engines: parse and validate the wire
//! parameters, call one engine method, serialize the result. No board logic
//! lives here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{
    BbsError, RecencyKind, RecencyQuery, SearchField, SearchFilter, SortDir, SortField, SortSpec,
};
use serde::{Deserialize, Serialize};
use services::{DecoratedPost, DeletedCounts, ListRequest, PostPage, RecencyPage};

use super::actor::CurrentActor;
use super::error::ApiError;
use super::AppState;

fn bad_request(msg: String) -> ApiError {
    ApiError(BbsError::TypeMismatch(msg))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Free-text search; empty or absent means a plain listing.
    q: Option<String>,
    field: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
    page: Option<i64>,
    per_page: Option<i64>,
    window_start: Option<i64>,
    #[serde(default)]
    with_files: bool,
    #[serde(default)]
    include_notices: bool,
}

impl ListParams {
    fn into_request(self) -> Result<ListRequest, ApiError> {
        let search = match self.q {
            Some(text) if !text.trim().is_empty() => {
                let field = match self.field.as_deref() {
                    Some(name) => SearchField::parse(name)
                        .ok_or_else(|| bad_request(format!("unknown search field: {name}")))?,
                    None => SearchField::SubjectContent,
                };
                Some(SearchFilter { field, text })
            }
            _ => None,
        };

        // An unrecognized sort name or direction is ignored rather than
        // rejected; the board's default ordering applies.
        let sort = self.sort.as_deref().and_then(SortField::parse).map(|field| {
            let dir = match self.dir.as_deref() {
                Some("desc") => SortDir::Desc,
                _ => SortDir::Asc,
            };
            SortSpec { field, dir }
        });

        Ok(ListRequest {
            search,
            sort,
            page: self.page.unwrap_or(1),
            per_page: self.per_page,
            include_notices: self.include_notices,
            window_start: self.window_start,
            with_files: self.with_files,
        })
    }
}

pub async fn list_posts(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Query(params): Query<ListParams>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<PostPage>, ApiError> {
    let req = params.into_request()?;
    let page = state.listing.list_posts(&board, &req, &actor).await?;
    Ok(Json(page))
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    #[serde(default)]
    with_files: bool,
}

pub async fn list_notices(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Query(params): Query<NoticeParams>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<DecoratedPost>>, ApiError> {
    let notices = state
        .listing
        .get_notice_posts(&board, &actor, params.with_files)
        .await?;
    Ok(Json(notices))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path((board, id)): Path<(String, i64)>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<DeletedCounts>, ApiError> {
    let counts = state.post_deletion.delete_post(&board, id, &actor).await?;
    Ok(Json(counts))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((board, id)): Path<(String, i64)>,
    CurrentActor(actor): CurrentActor,
) -> Result<StatusCode, ApiError> {
    state
        .comment_deletion
        .delete_comment(&board, id, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct IdsBody {
    ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct RemovedBody {
    removed: usize,
}

pub async fn batch_delete(
    State(state): State<AppState>,
    Path(board): Path<String>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<IdsBody>,
) -> Result<Json<RemovedBody>, ApiError> {
    let removed = state
        .batch_deletion
        .delete_posts(&board, &body.ids, &actor)
        .await?;
    Ok(Json(RemovedBody { removed }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestParams {
    group: Option<String>,
    member: Option<String>,
    kind: Option<String>,
    page: Option<i64>,
    per_page: Option<i64>,
}

pub async fn list_latest(
    State(state): State<AppState>,
    Query(params): Query<LatestParams>,
) -> Result<Json<RecencyPage>, ApiError> {
    let kind = match params.kind.as_deref() {
        Some("write") => Some(RecencyKind::Write),
        Some("comment") => Some(RecencyKind::Comment),
        Some(other) => return Err(bad_request(format!("unknown recency kind: {other}"))),
        None => None,
    };
    let query = RecencyQuery {
        group_id: params.group,
        member_id: params.member,
        kind,
    };
    let page = state
        .recency
        .list_recent(&query, params.page.unwrap_or(1), params.per_page)
        .await?;
    Ok(Json(page))
}

pub async fn delete_latest(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<IdsBody>,
) -> Result<Json<RemovedBody>, ApiError> {
    let removed = state.recency.delete_entries(&body.ids, &actor).await?;
    Ok(Json(RemovedBody { removed }))
}
