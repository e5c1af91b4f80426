//! rustbb/crates/api-adapters/src/web/error.rs
//!
//! Domain-error to HTTP mapping. Challenge redirects ride on a 403 with the
//! challenge path in the body; storage failures are logged server-side and
//! never leak their detail to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::BbsError;
use serde::Serialize;
use tracing::error;

pub struct ApiError(pub BbsError);

impl From<BbsError> for ApiError {
    fn from(err: BbsError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    challenge: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, challenge) = match &self.0 {
            BbsError::PermissionDenied(_) => (StatusCode::FORBIDDEN, None),
            BbsError::ChallengeRequired { challenge } => {
                (StatusCode::FORBIDDEN, Some(challenge.clone()))
            }
            BbsError::Conflict(_) => (StatusCode::CONFLICT, None),
            BbsError::NotFound { .. } => (StatusCode::NOT_FOUND, None),
            BbsError::TypeMismatch(_) => (StatusCode::BAD_REQUEST, None),
            BbsError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(err = %self.0, "request failed in storage");
            "internal storage failure".to_owned()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorBody { error, challenge })).into_response()
    }
}
