//! API endpoints.

mod auth;
mod news;
mod parties;
mod politicians;
mod ratings;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/parties", parties::router())
        .nest("/politicians", politicians::router())
        .nest("/ratings", ratings::router())
        .nest("/news", news::router())
}
