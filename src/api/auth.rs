//! Caller identity.
//!
//! Requests arrive through a gateway that has already authenticated the
//! caller and forwards who they are in two headers. Handlers receive the
//! result as an [`Actor`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::warn;

use crate::models::Role;
use crate::services::Actor;

use super::response::ApiErrorResponse;

/// Header carrying the caller's employee display code.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiErrorResponse> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| ApiErrorResponse::unauthenticated(format!("missing {} header", name)))?;
    let value = value
        .to_str()
        .map_err(|_| ApiErrorResponse::unauthenticated(format!("{} header is not text", name)))?
        .trim();
    if value.is_empty() {
        return Err(ApiErrorResponse::unauthenticated(format!("{} header is empty", name)));
    }
    Ok(value)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let employee_id = header_value(parts, ACTOR_ID_HEADER)?;
        let role = header_value(parts, ACTOR_ROLE_HEADER)?;
        let role: Role = role.parse().map_err(|err: String| {
            warn!(path = %parts.uri.path(), error = %err, "Rejected actor role");
            ApiErrorResponse::unauthenticated(err)
        })?;
        Ok(Actor::new(employee_id, role))
    }
}
