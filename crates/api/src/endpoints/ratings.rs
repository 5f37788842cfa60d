//! Rating endpoints (retrieve/update/delete by id).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use netabase_common::AppResult;
use netabase_core::{RatingInput, RatingWithContext};
use serde::Serialize;

use crate::extractors::AuthUser;
use crate::middleware::AppState;

/// Rating response.
#[derive(Serialize)]
pub struct RatingResponse {
    pub id: String,
    pub politician_id: String,
    pub politician_name: String,
    pub user_id: String,
    pub username: Option<String>,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RatingWithContext> for RatingResponse {
    fn from(ctx: RatingWithContext) -> Self {
        Self {
            id: ctx.rating.id,
            politician_id: ctx.rating.politician_id,
            politician_name: ctx.politician_name,
            user_id: ctx.rating.user_id,
            username: ctx.username,
            score: ctx.rating.score,
            comment: ctx.rating.comment,
            created_at: ctx.rating.created_at.to_rfc3339(),
            updated_at: ctx.rating.updated_at.to_rfc3339(),
        }
    }
}

/// Retrieve a rating. No authentication required.
async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RatingResponse>> {
    let rating = state.rating_service.get(&id).await?;
    Ok(Json(rating.into()))
}

/// Update a rating. Author only; anyone else gets a 403.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RatingInput>,
) -> AppResult<Json<RatingResponse>> {
    let updated = state.rating_service.update(&id, &user, &input).await?;
    Ok(Json(updated.into()))
}

/// Delete a rating. Author only.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.rating_service.delete(&id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the rating router.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(retrieve).put(update).delete(remove))
}
