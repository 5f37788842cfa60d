//! Party service.

use chrono::Utc;
use netabase_common::{slugify, AppError, AppResult, DetailCache, IdGenerator};
use netabase_db::{
    entities::party,
    repositories::{PartyListQuery, PartyRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a party (admin/seed path, not exposed over HTTP).
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(max = 50))]
    pub short_name: Option<String>,

    pub flag: Option<String>,
}

/// Party service for business logic.
#[derive(Clone)]
pub struct PartyService {
    party_repo: PartyRepository,
    cache: DetailCache,
    id_gen: IdGenerator,
}

impl PartyService {
    /// Create a new party service.
    #[must_use]
    pub fn new(party_repo: PartyRepository, cache: DetailCache) -> Self {
        Self {
            party_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a party.
    ///
    /// The slug is derived from the name here, once; it never changes
    /// afterwards.
    pub async fn create(&self, input: CreatePartyInput) -> AppResult<party::Model> {
        input.validate()?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Name does not produce a usable slug.".to_string(),
            ));
        }

        if self.party_repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A party with slug '{slug}' already exists"
            )));
        }

        let model = party::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(slug),
            short_name: Set(input.short_name),
            flag: Set(input.flag),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.party_repo.create(model).await
    }

    /// List parties with the total match count.
    pub async fn list(&self, query: &PartyListQuery) -> AppResult<(Vec<party::Model>, u64)> {
        let parties = self.party_repo.list(query).await?;
        let count = self.party_repo.count(query).await?;
        Ok((parties, count))
    }

    /// Get a party by slug, through the detail cache.
    ///
    /// Parties have no public write path, so TTL expiry is the only
    /// invalidation this payload needs.
    pub async fn get_detail(&self, slug: &str) -> AppResult<party::Model> {
        if let Some(party) = self.cache.get::<party::Model>(slug).await? {
            return Ok(party);
        }

        let party = self
            .party_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::PartyNotFound(slug.to_string()))?;

        self.cache.set(slug, &party).await?;

        Ok(party)
    }

    /// Get a party by slug, bypassing the cache.
    pub async fn get(&self, slug: &str) -> AppResult<party::Model> {
        self.party_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::PartyNotFound(slug.to_string()))
    }
}
