//! News aggregation endpoint.

use axum::{extract::State, routing::get, Json, Router};
use netabase_core::NewsDigest;

use crate::middleware::AppState;

/// Aggregate politics news from the configured RSS sources.
async fn list(State(state): State<AppState>) -> Json<NewsDigest> {
    Json(state.news_service.aggregate().await)
}

/// Create the news router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
