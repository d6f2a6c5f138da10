//! Bearer-token authentication.
//!
//! [`AuthContext`] is an extractor: any handler that declares it requires a
//! valid `Authorization: Bearer <token>` header, resolved against the token
//! store into a `{user_id, email, role}` principal. Routes that mix public
//! and authenticated methods on one path stay on a single router this way —
//! no per-subtree middleware split.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository::auth as tokens;

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<ApiContext>()
            .cloned()
            .ok_or(ApiError::Internal("missing API context".into()))?;

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let conn = ctx.state.open_db()?;
        let principal = tokens::lookup_token(&conn, token)?.ok_or(ApiError::Unauthorized)?;

        Ok(AuthContext {
            user_id: principal.user_id,
            email: principal.email,
            role: principal.role,
        })
    }
}
