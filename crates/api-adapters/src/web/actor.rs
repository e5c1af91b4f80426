//! rustbb/crates/api-adapters/src/web/actor.rs

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use domains::{Actor, AdminRole};

pub const MEMBER_HEADER: &str = "x-rustbb-member";
pub const LEVEL_HEADER: &str = "x-rustbb-level";
pub const ADMIN_HEADER: &str = "x-rustbb-admin";

/// Identity extractor. Authentication terminates upstream and forwards the
/// session as trusted headers; absent headers mean an anonymous guest.
pub struct CurrentActor(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let member_id = header(MEMBER_HEADER);
        let level = header(LEVEL_HEADER)
            .and_then(|v| v.parse().ok())
            .unwrap_or(u8::from(member_id.is_some()));
        // Admin scope is meaningless without an identity.
        let admin = match (member_id.is_some(), header(ADMIN_HEADER).as_deref()) {
            (true, Some("super")) => Some(AdminRole::Super),
            (true, Some("group")) => Some(AdminRole::Group),
            (true, Some("board")) => Some(AdminRole::Board),
            _ => None,
        };

        Ok(Self(Actor {
            member_id,
            level,
            admin,
        }))
    }
}
