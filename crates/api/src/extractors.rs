//! Request extractors.
//!
//! The auth middleware resolves bearer tokens before routing and stashes
//! the resulting user in request extensions; handlers that need a caller
//! identity opt in through [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use netabase_common::AppError;
use netabase_db::entities::user;

/// Extractor for handlers that require an authenticated caller.
///
/// Rejects with 401 when the middleware resolved no user for the request,
/// using the standard error body.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(Self)
            .ok_or(AppError::Unauthorized)
    }
}
