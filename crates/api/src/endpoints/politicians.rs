//! Politician endpoints.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use netabase_common::{AppError, AppResult};
use netabase_db::repositories::{
    PoliticianListQuery, PoliticianOrder, RatingListQuery, RatingOrder,
};
use netabase_core::{PoliticianDetail, PoliticianListItem, RatingInput};
use serde::Deserialize;

use crate::endpoints::ratings::RatingResponse;
use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::{Paginated, Pagination};

/// Politician list request.
#[derive(Debug, Deserialize)]
pub struct ListPoliticiansQuery {
    /// Filter by party slug.
    pub party: Option<String>,
    pub is_active: Option<bool>,
    pub location: Option<String>,
    pub search: Option<String>,
    /// `name`, `age`, `views`, `average_rating` or `rating_count`,
    /// `-` prefix for descending.
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

pub(crate) fn parse_politician_ordering(
    ordering: Option<&str>,
) -> AppResult<(PoliticianOrder, bool)> {
    // Canonical default: most-viewed first
    let Some(raw) = ordering else {
        return Ok((PoliticianOrder::Views, true));
    };

    let (field, descending) = raw
        .strip_prefix('-')
        .map_or((raw, false), |stripped| (stripped, true));

    let order = match field {
        "name" => PoliticianOrder::Name,
        "age" => PoliticianOrder::Age,
        "views" => PoliticianOrder::Views,
        "average_rating" => PoliticianOrder::AverageRating,
        "rating_count" => PoliticianOrder::RatingCount,
        _ => {
            return Err(AppError::BadRequest(format!(
                "Unknown ordering field: {field}"
            )))
        }
    };

    Ok((order, descending))
}

/// List politicians with filters, search and aggregate ordering.
async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListPoliticiansQuery>,
) -> AppResult<Json<Paginated<PoliticianListItem>>> {
    let (order, descending) = parse_politician_ordering(query.ordering.as_deref())?;
    let pagination = Pagination::from_query(query.page, query.page_size);

    let list_query = PoliticianListQuery {
        party_slug: query.party,
        is_active: query.is_active,
        location: query.location,
        search: query.search,
        order,
        descending,
        limit: pagination.limit(),
        offset: pagination.offset(),
    };

    let (politicians, count) = state.politician_service.list(&list_query).await?;

    Ok(Json(Paginated::new(count, pagination, &uri, politicians)))
}

/// Get a politician's detail payload; counts the view as a side effect.
async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<PoliticianDetail>> {
    let detail = state.politician_service.get_detail(&slug).await?;
    Ok(Json(detail))
}

/// Rating list request.
#[derive(Debug, Deserialize)]
pub struct ListRatingsQuery {
    /// Filter to one score value.
    pub score: Option<i32>,
    /// `created_at`, `updated_at` or `score`, `-` prefix for descending.
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

fn parse_rating_ordering(ordering: Option<&str>) -> AppResult<(RatingOrder, bool)> {
    // Newest first by default
    let Some(raw) = ordering else {
        return Ok((RatingOrder::CreatedAt, true));
    };

    let (field, descending) = raw
        .strip_prefix('-')
        .map_or((raw, false), |stripped| (stripped, true));

    let order = match field {
        "created_at" => RatingOrder::CreatedAt,
        "updated_at" => RatingOrder::UpdatedAt,
        "score" => RatingOrder::Score,
        _ => {
            return Err(AppError::BadRequest(format!(
                "Unknown ordering field: {field}"
            )))
        }
    };

    Ok((order, descending))
}

/// List a politician's ratings. No authentication required.
async fn ratings_list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(slug): Path<String>,
    Query(query): Query<ListRatingsQuery>,
) -> AppResult<Json<Paginated<RatingResponse>>> {
    let (order, descending) = parse_rating_ordering(query.ordering.as_deref())?;
    let pagination = Pagination::from_query(query.page, query.page_size);

    let list_query = RatingListQuery {
        score: query.score,
        order,
        descending,
        limit: pagination.limit(),
        offset: pagination.offset(),
    };

    let (ratings, count) = state
        .rating_service
        .list_for_politician(&slug, &list_query)
        .await?;
    let results = ratings.into_iter().map(RatingResponse::from).collect();

    Ok(Json(Paginated::new(count, pagination, &uri, results)))
}

/// Submit the caller's rating for a politician: 201 on create, 200 when the
/// existing rating was overwritten.
async fn ratings_submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<RatingInput>,
) -> AppResult<(StatusCode, Json<RatingResponse>)> {
    let (stored, created) = state.rating_service.submit(&slug, &user, &input).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(stored.into())))
}

/// Create the politician router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(detail))
        .route("/{slug}/ratings", get(ratings_list).post(ratings_submit))
}
