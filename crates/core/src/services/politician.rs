//! Politician service.
//!
//! Owns the read-through detail cache and the view counter. A detail fetch
//! serves the cached payload when present, recomputes and caches it
//! otherwise, and in both cases bumps the persisted view counter by exactly
//! one with an atomic in-place UPDATE. The served payload may therefore be a
//! pre-increment snapshot; the counter itself never loses a read.

use chrono::Utc;
use netabase_common::{slugify, AppError, AppResult, DetailCache, IdGenerator};
use netabase_db::{
    entities::{initiative, politician, promise},
    repositories::{
        InitiativeRepository, PartyRepository, PoliticianListQuery, PoliticianListRow,
        PoliticianRepository, PromiseRepository, RatingRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One item of a politician listing.
#[derive(Debug, Clone, Serialize)]
pub struct PoliticianListItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub photo: Option<String>,
    pub age: i32,
    pub location: Option<String>,
    pub is_active: bool,
    pub views: i64,
    pub party_name: String,
    /// 0.0 when the politician has no ratings.
    pub average_rating: f64,
    pub rating_count: i64,
}

impl From<PoliticianListRow> for PoliticianListItem {
    fn from(row: PoliticianListRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            photo: row.photo,
            age: row.age,
            location: row.location,
            is_active: row.is_active,
            views: row.views,
            party_name: row.party_name,
            average_rating: rounded_average(row.average_rating),
            rating_count: row.rating_count,
        }
    }
}

/// Initiative as embedded in a detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiativeView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

impl From<initiative::Model> for InitiativeView {
    fn from(model: initiative::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Promise as embedded in a detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromiseView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: promise::PromiseStatus,
    pub created_at: String,
}

impl From<promise::Model> for PromiseView {
    fn from(model: promise::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Full politician detail payload; this is what the detail cache stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliticianDetail {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub photo: Option<String>,
    pub age: i32,
    pub education: String,
    pub criminal_record: Option<String>,
    pub party_id: String,
    pub party_name: String,
    pub party_position: Option<String>,
    pub criticism: Option<String>,
    pub location: Option<String>,
    pub biography: String,
    pub previous_party_history: Option<String>,
    pub is_active: bool,
    /// Snapshot at cache-fill time; the live counter keeps moving underneath.
    pub views: i64,
    pub average_rating: f64,
    pub rating_count: u64,
    pub initiatives: Vec<InitiativeView>,
    pub promises: Vec<PromiseView>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Round a mean score to two decimals; absent means no ratings, reported
/// as 0.0 rather than null.
fn rounded_average(average: Option<f64>) -> f64 {
    average.map_or(0.0, |avg| (avg * 100.0).round() / 100.0)
}

/// Input for creating a politician (admin/seed path, not exposed over HTTP).
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePoliticianInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub photo: Option<String>,

    #[validate(range(min = 18, max = 100, message = "Age must be between 18 and 100."))]
    pub age: i32,

    pub education: String,
    pub criminal_record: Option<String>,

    /// Slug of the party the politician belongs to.
    pub party: String,
    pub party_position: Option<String>,

    pub criticism: Option<String>,
    pub location: Option<String>,
    pub biography: String,
    pub previous_party_history: Option<String>,

    pub is_active: bool,
}

/// Politician service for business logic.
#[derive(Clone)]
pub struct PoliticianService {
    politician_repo: PoliticianRepository,
    party_repo: PartyRepository,
    rating_repo: RatingRepository,
    initiative_repo: InitiativeRepository,
    promise_repo: PromiseRepository,
    cache: DetailCache,
    id_gen: IdGenerator,
}

impl PoliticianService {
    /// Create a new politician service.
    #[must_use]
    pub fn new(
        politician_repo: PoliticianRepository,
        party_repo: PartyRepository,
        rating_repo: RatingRepository,
        initiative_repo: InitiativeRepository,
        promise_repo: PromiseRepository,
        cache: DetailCache,
    ) -> Self {
        Self {
            politician_repo,
            party_repo,
            rating_repo,
            initiative_repo,
            promise_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a politician.
    ///
    /// The slug is derived from the name here, once; the view counter
    /// starts at zero.
    pub async fn create(&self, input: CreatePoliticianInput) -> AppResult<politician::Model> {
        input.validate()?;

        let party = self
            .party_repo
            .find_by_slug(&input.party)
            .await?
            .ok_or_else(|| AppError::PartyNotFound(input.party.clone()))?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Name does not produce a usable slug.".to_string(),
            ));
        }

        if self.politician_repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A politician with slug '{slug}' already exists"
            )));
        }

        let model = politician::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(slug),
            photo: Set(input.photo),
            age: Set(input.age),
            education: Set(input.education),
            criminal_record: Set(input.criminal_record),
            party_id: Set(party.id),
            party_position: Set(input.party_position),
            criticism: Set(input.criticism),
            location: Set(input.location),
            biography: Set(input.biography),
            previous_party_history: Set(input.previous_party_history),
            is_active: Set(input.is_active),
            views: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.politician_repo.create(model).await
    }

    /// List politicians with aggregates and the total match count.
    pub async fn list(
        &self,
        query: &PoliticianListQuery,
    ) -> AppResult<(Vec<PoliticianListItem>, u64)> {
        let rows = self.politician_repo.list(query).await?;
        let count = self.politician_repo.count(query).await?;
        Ok((rows.into_iter().map(Into::into).collect(), count))
    }

    /// Get a politician's detail payload by slug.
    ///
    /// Read-through: a cache hit is served as-is (it may be stale relative
    /// to rating changes; rating mutations actively invalidate it), a miss
    /// loads and caches the payload. Either way the view counter is
    /// incremented by exactly one, independent of the cache.
    pub async fn get_detail(&self, slug: &str) -> AppResult<PoliticianDetail> {
        if let Some(detail) = self.cache.get::<PoliticianDetail>(slug).await? {
            self.politician_repo.increment_views(slug).await?;
            return Ok(detail);
        }

        let politician = self
            .politician_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::PoliticianNotFound(slug.to_string()))?;

        let detail = self.build_detail(politician).await?;
        self.cache.set(slug, &detail).await?;

        self.politician_repo.increment_views(slug).await?;

        Ok(detail)
    }

    /// Assemble the full detail payload for a politician.
    async fn build_detail(&self, politician: politician::Model) -> AppResult<PoliticianDetail> {
        let party = self
            .party_repo
            .find_by_id(&politician.party_id)
            .await?
            .ok_or_else(|| AppError::PartyNotFound(politician.party_id.clone()))?;

        let average = self.rating_repo.average_for(&politician.id).await?;
        let rating_count = self.rating_repo.count_by_politician(&politician.id).await?;
        let initiatives = self
            .initiative_repo
            .find_by_politician(&politician.id)
            .await?;
        let promises = self.promise_repo.find_by_politician(&politician.id).await?;

        Ok(PoliticianDetail {
            id: politician.id,
            name: politician.name,
            slug: politician.slug,
            photo: politician.photo,
            age: politician.age,
            education: politician.education,
            criminal_record: politician.criminal_record,
            party_id: politician.party_id,
            party_name: party.name,
            party_position: politician.party_position,
            criticism: politician.criticism,
            location: politician.location,
            biography: politician.biography,
            previous_party_history: politician.previous_party_history,
            is_active: politician.is_active,
            views: politician.views,
            average_rating: rounded_average(average),
            rating_count,
            initiatives: initiatives.into_iter().map(Into::into).collect(),
            promises: promises.into_iter().map(Into::into).collect(),
            created_at: politician.created_at.to_rfc3339(),
            updated_at: politician.updated_at.map(|t| t.to_rfc3339()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use netabase_db::repositories::PartyRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_cache() -> DetailCache {
        let config = fred::types::config::Config::default();
        let client = fred::clients::Client::new(config, None, None, None);
        DetailCache::new(Arc::new(client), "test:politician".to_string(), 900)
    }

    fn empty_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service_with(
        politician_db: Arc<sea_orm::DatabaseConnection>,
        party_db: Arc<sea_orm::DatabaseConnection>,
    ) -> PoliticianService {
        PoliticianService::new(
            PoliticianRepository::new(politician_db),
            PartyRepository::new(party_db),
            RatingRepository::new(empty_db()),
            InitiativeRepository::new(empty_db()),
            PromiseRepository::new(empty_db()),
            test_cache(),
        )
    }

    fn create_input(age: i32) -> CreatePoliticianInput {
        CreatePoliticianInput {
            name: "Jane Doe".to_string(),
            photo: None,
            age,
            education: "Law degree".to_string(),
            criminal_record: None,
            party: "civic-union".to_string(),
            party_position: None,
            criticism: None,
            location: Some("Kathmandu".to_string()),
            biography: "A politician.".to_string(),
            previous_party_history: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_underage() {
        let service = service_with(empty_db(), empty_db());

        let result = service.create(create_input(17)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_party() {
        let party_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<netabase_db::entities::party::Model>::new()])
                .into_connection(),
        );
        let service = service_with(empty_db(), party_db);

        let result = service.create(create_input(45)).await;
        assert!(matches!(result, Err(AppError::PartyNotFound(_))));
    }

    #[test]
    fn test_rounded_average_none_is_zero() {
        assert_eq!(rounded_average(None), 0.0);
    }

    #[test]
    fn test_rounded_average_two_decimals() {
        assert_eq!(rounded_average(Some(3.333_333)), 3.33);
        assert_eq!(rounded_average(Some(4.0)), 4.0);
        assert_eq!(rounded_average(Some(4.666_666)), 4.67);
    }

    #[test]
    fn test_list_item_from_row() {
        let row = PoliticianListRow {
            id: "pol1".to_string(),
            name: "Jane Doe".to_string(),
            slug: "jane-doe".to_string(),
            photo: None,
            age: 45,
            location: None,
            is_active: true,
            views: 10,
            party_name: "Civic Union".to_string(),
            average_rating: Some(3.666_666),
            rating_count: 3,
        };

        let item = PoliticianListItem::from(row);
        assert_eq!(item.average_rating, 3.67);
        assert_eq!(item.rating_count, 3);
    }
}
