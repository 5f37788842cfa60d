//! Party endpoints.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    routing::get,
    Json, Router,
};
use netabase_common::{AppError, AppResult};
use netabase_db::entities::party;
use netabase_db::repositories::{PartyListQuery, PartyOrder, PoliticianListQuery};
use netabase_core::PoliticianListItem;
use serde::{Deserialize, Serialize};

use crate::endpoints::politicians::parse_politician_ordering;
use crate::middleware::AppState;
use crate::response::{Paginated, Pagination};

/// Party response.
#[derive(Serialize)]
pub struct PartyResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub short_name: Option<String>,
    pub flag: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<party::Model> for PartyResponse {
    fn from(party: party::Model) -> Self {
        Self {
            id: party.id,
            name: party.name,
            slug: party.slug,
            short_name: party.short_name,
            flag: party.flag,
            created_at: party.created_at.to_rfc3339(),
            updated_at: party.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Party list request.
#[derive(Debug, Deserialize)]
pub struct ListPartiesQuery {
    pub search: Option<String>,
    /// `name` or `created_at`, `-` prefix for descending.
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

fn parse_party_ordering(ordering: Option<&str>) -> AppResult<(PartyOrder, bool)> {
    let Some(raw) = ordering else {
        return Ok((PartyOrder::Name, false));
    };

    let (field, descending) = raw
        .strip_prefix('-')
        .map_or((raw, false), |stripped| (stripped, true));

    let order = match field {
        "name" => PartyOrder::Name,
        "created_at" => PartyOrder::CreatedAt,
        _ => {
            return Err(AppError::BadRequest(format!(
                "Unknown ordering field: {field}"
            )))
        }
    };

    Ok((order, descending))
}

/// List parties.
async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListPartiesQuery>,
) -> AppResult<Json<Paginated<PartyResponse>>> {
    let (order, descending) = parse_party_ordering(query.ordering.as_deref())?;
    let pagination = Pagination::from_query(query.page, query.page_size);

    let list_query = PartyListQuery {
        search: query.search,
        order,
        descending,
        limit: pagination.limit(),
        offset: pagination.offset(),
    };

    let (parties, count) = state.party_service.list(&list_query).await?;
    let results = parties.into_iter().map(PartyResponse::from).collect();

    Ok(Json(Paginated::new(count, pagination, &uri, results)))
}

/// Get a party by slug (cached).
async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<PartyResponse>> {
    let party = state.party_service.get_detail(&slug).await?;
    Ok(Json(party.into()))
}

/// Politicians-of-a-party request.
#[derive(Debug, Deserialize)]
pub struct PartyPoliticiansQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// List the politicians of a party.
async fn politicians(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(slug): Path<String>,
    Query(query): Query<PartyPoliticiansQuery>,
) -> AppResult<Json<Paginated<PoliticianListItem>>> {
    // 404 for unknown parties rather than an empty page
    state.party_service.get(&slug).await?;

    // Default here is descending name, unlike the main politician list
    let (order, descending) = match query.ordering.as_deref() {
        Some(raw) => parse_politician_ordering(Some(raw))?,
        None => (netabase_db::repositories::PoliticianOrder::Name, true),
    };
    let pagination = Pagination::from_query(query.page, query.page_size);

    let list_query = PoliticianListQuery {
        party_slug: Some(slug),
        is_active: None,
        location: None,
        search: query.search,
        order,
        descending,
        limit: pagination.limit(),
        offset: pagination.offset(),
    };

    let (politicians, count) = state.politician_service.list(&list_query).await?;

    Ok(Json(Paginated::new(count, pagination, &uri, politicians)))
}

/// Create the party router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(detail))
        .route("/{slug}/politicians", get(politicians))
}
