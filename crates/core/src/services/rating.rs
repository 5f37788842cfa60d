//! Rating service.
//!
//! One rating per (politician, user) pair is the central invariant of the
//! whole system. Submission is a true upsert against the unique index, so
//! concurrent duplicate submissions collapse into one row; every mutation
//! invalidates the politician's cached detail payload so aggregates are
//! recomputed on the next read.

use chrono::Utc;
use netabase_common::{AppError, AppResult, DetailCache, IdGenerator};
use netabase_db::{
    entities::{rating, user},
    repositories::{PoliticianRepository, RatingListQuery, RatingRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for submitting or updating a rating.
#[derive(Debug, Deserialize, Validate)]
pub struct RatingInput {
    #[validate(range(min = 1, max = 5, message = "Score must be an integer between 1 and 5."))]
    pub score: i32,

    #[validate(length(max = 2000, message = "Comment is too long."))]
    pub comment: Option<String>,
}

/// A rating with the display context its API representation needs.
#[derive(Debug, Clone)]
pub struct RatingWithContext {
    pub rating: rating::Model,
    pub username: Option<String>,
    pub politician_name: String,
}

/// Rating service for business logic.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: RatingRepository,
    politician_repo: PoliticianRepository,
    cache: DetailCache,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    ///
    /// `cache` is the politician detail cache; rating writes invalidate it.
    #[must_use]
    pub fn new(
        rating_repo: RatingRepository,
        politician_repo: PoliticianRepository,
        cache: DetailCache,
    ) -> Self {
        Self {
            rating_repo,
            politician_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit the caller's rating for a politician: create it, or overwrite
    /// the existing one in place.
    ///
    /// Returns the stored rating and whether it was newly created. The row
    /// outcome is decided by a single atomic `ON CONFLICT` upsert; a losing
    /// concurrent writer becomes an update, never a duplicate row and never
    /// a surfaced conflict.
    pub async fn submit(
        &self,
        politician_slug: &str,
        actor: &user::Model,
        input: &RatingInput,
    ) -> AppResult<(RatingWithContext, bool)> {
        input.validate()?;

        let politician = self
            .politician_repo
            .find_by_slug(politician_slug)
            .await?
            .ok_or_else(|| AppError::PoliticianNotFound(politician_slug.to_string()))?;

        // Probe for the 201-vs-200 distinction only; the upsert below is
        // what enforces uniqueness.
        let existing = self
            .rating_repo
            .find_by_politician_and_user(&politician.id, &actor.id)
            .await?;

        let now = Utc::now();
        let model = rating::ActiveModel {
            id: Set(self.id_gen.generate()),
            politician_id: Set(politician.id.clone()),
            user_id: Set(actor.id.clone()),
            score: Set(input.score),
            comment: Set(input.comment.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let stored = self.rating_repo.upsert(model).await?;

        self.cache.invalidate(&politician.slug).await?;

        tracing::debug!(
            politician = %politician.slug,
            user = %actor.id,
            created = existing.is_none(),
            "Stored rating"
        );

        Ok((
            RatingWithContext {
                rating: stored,
                username: Some(actor.username.clone()),
                politician_name: politician.name,
            },
            existing.is_none(),
        ))
    }

    /// Get a rating by ID with its author and politician names.
    pub async fn get(&self, rating_id: &str) -> AppResult<RatingWithContext> {
        let (rating, author) = self
            .rating_repo
            .find_by_id_with_user(rating_id)
            .await?
            .ok_or_else(|| AppError::RatingNotFound(rating_id.to_string()))?;

        let politician = self
            .politician_repo
            .find_by_id(&rating.politician_id)
            .await?
            .ok_or_else(|| AppError::PoliticianNotFound(rating.politician_id.clone()))?;

        Ok(RatingWithContext {
            rating,
            username: author.map(|u| u.username),
            politician_name: politician.name,
        })
    }

    /// Update a rating in place.
    ///
    /// Only the rating's author may update it; anyone else gets a 403
    /// regardless of role.
    pub async fn update(
        &self,
        rating_id: &str,
        actor: &user::Model,
        input: &RatingInput,
    ) -> AppResult<RatingWithContext> {
        input.validate()?;

        let rating = self
            .rating_repo
            .find_by_id(rating_id)
            .await?
            .ok_or_else(|| AppError::RatingNotFound(rating_id.to_string()))?;

        if rating.user_id != actor.id {
            return Err(AppError::Forbidden(
                "You can only modify your own rating.".to_string(),
            ));
        }

        let politician = self
            .politician_repo
            .find_by_id(&rating.politician_id)
            .await?
            .ok_or_else(|| AppError::PoliticianNotFound(rating.politician_id.clone()))?;

        let mut active: rating::ActiveModel = rating.into();
        active.score = Set(input.score);
        active.comment = Set(input.comment.clone());
        active.updated_at = Set(Utc::now().into());

        let updated = self.rating_repo.update(active).await?;

        self.cache.invalidate(&politician.slug).await?;

        Ok(RatingWithContext {
            rating: updated,
            username: Some(actor.username.clone()),
            politician_name: politician.name,
        })
    }

    /// Delete a rating.
    ///
    /// Same ownership rule as [`Self::update`].
    pub async fn delete(&self, rating_id: &str, actor: &user::Model) -> AppResult<()> {
        let rating = self
            .rating_repo
            .find_by_id(rating_id)
            .await?
            .ok_or_else(|| AppError::RatingNotFound(rating_id.to_string()))?;

        if rating.user_id != actor.id {
            return Err(AppError::Forbidden(
                "You can only delete your own rating.".to_string(),
            ));
        }

        let politician = self
            .politician_repo
            .find_by_id(&rating.politician_id)
            .await?
            .ok_or_else(|| AppError::PoliticianNotFound(rating.politician_id.clone()))?;

        self.rating_repo.delete(rating_id).await?;

        self.cache.invalidate(&politician.slug).await?;

        Ok(())
    }

    /// List a politician's ratings with authors, plus the total match count.
    pub async fn list_for_politician(
        &self,
        politician_slug: &str,
        query: &RatingListQuery,
    ) -> AppResult<(Vec<RatingWithContext>, u64)> {
        let politician = self
            .politician_repo
            .find_by_slug(politician_slug)
            .await?
            .ok_or_else(|| AppError::PoliticianNotFound(politician_slug.to_string()))?;

        let rows = self
            .rating_repo
            .find_by_politician(&politician.id, query)
            .await?;
        let count = self
            .rating_repo
            .count_by_politician_filtered(&politician.id, query.score)
            .await?;

        let ratings = rows
            .into_iter()
            .map(|(rating, author)| RatingWithContext {
                rating,
                username: author.map(|u| u.username),
                politician_name: politician.name.clone(),
            })
            .collect();

        Ok((ratings, count))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use netabase_common::DetailCache;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_cache() -> DetailCache {
        let config = fred::types::config::Config::default();
        let client = fred::clients::Client::new(config, None, None, None);
        DetailCache::new(Arc::new(client), "test:politician".to_string(), 900)
    }

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: None,
            email: None,
            google_sub: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_rating(id: &str, politician_id: &str, user_id: &str, score: i32) -> rating::Model {
        rating::Model {
            id: id.to_string(),
            politician_id: politician_id.to_string(),
            user_id: user_id.to_string(),
            score,
            comment: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn service_with(
        rating_db: Arc<sea_orm::DatabaseConnection>,
        politician_db: Arc<sea_orm::DatabaseConnection>,
    ) -> RatingService {
        RatingService::new(
            RatingRepository::new(rating_db),
            PoliticianRepository::new(politician_db),
            test_cache(),
        )
    }

    #[test]
    fn test_rating_input_rejects_out_of_range_score() {
        let low = RatingInput {
            score: 0,
            comment: None,
        };
        let high = RatingInput {
            score: 6,
            comment: None,
        };
        let ok = RatingInput {
            score: 5,
            comment: Some("ok".to_string()),
        };

        assert!(low.validate().is_err());
        assert!(high.validate().is_err());
        assert!(ok.validate().is_ok());
    }

    #[tokio::test]
    async fn test_submit_unknown_politician() {
        let rating_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let politician_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<netabase_db::entities::politician::Model>::new()])
                .into_connection(),
        );

        let service = service_with(rating_db, politician_db);
        let actor = create_test_user("u1", "alice");
        let input = RatingInput {
            score: 4,
            comment: None,
        };

        let result = service.submit("nobody", &actor, &input).await;
        match result {
            Err(AppError::PoliticianNotFound(slug)) => assert_eq!(slug, "nobody"),
            _ => panic!("Expected PoliticianNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_update_other_users_rating_forbidden() {
        let existing = create_test_rating("r1", "pol1", "u1", 3);

        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let politician_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(rating_db, politician_db);
        let intruder = create_test_user("u2", "mallory");
        let input = RatingInput {
            score: 1,
            comment: None,
        };

        let result = service.update("r1", &intruder, &input).await;
        match result {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("your own rating")),
            _ => panic!("Expected Forbidden error"),
        }
    }

    #[tokio::test]
    async fn test_delete_other_users_rating_forbidden() {
        let existing = create_test_rating("r1", "pol1", "u1", 3);

        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let politician_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(rating_db, politician_db);
        let intruder = create_test_user("u2", "mallory");

        let result = service.delete("r1", &intruder).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_for_politician_includes_authors() {
        use maplit::btreemap;
        use sea_orm::Value;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let politician = netabase_db::entities::politician::Model {
            id: "pol1".to_string(),
            name: "Politician 0".to_string(),
            slug: "politician-0".to_string(),
            photo: None,
            age: 45,
            education: "Law degree".to_string(),
            criminal_record: None,
            party_id: "p1".to_string(),
            party_position: None,
            criticism: None,
            location: None,
            biography: "A politician.".to_string(),
            previous_party_history: None,
            is_active: true,
            views: 10,
            created_at: now,
            updated_at: None,
        };

        // SelectTwo rows carry the rating under the A_ prefix and the joined
        // author under B_
        let joined_row = btreemap! {
            "A_id" => Value::from("r1"),
            "A_politician_id" => Value::from("pol1"),
            "A_user_id" => Value::from("u1"),
            "A_score" => Value::from(4),
            "A_comment" => Value::from(Some("solid".to_string())),
            "A_created_at" => Value::from(now),
            "A_updated_at" => Value::from(now),
            "B_id" => Value::from(Some("u1".to_string())),
            "B_username" => Value::from(Some("alice".to_string())),
            "B_password_hash" => Value::from(None::<String>),
            "B_email" => Value::from(None::<String>),
            "B_google_sub" => Value::from(None::<String>),
            "B_is_active" => Value::from(Some(true)),
            "B_created_at" => Value::from(Some(now)),
            "B_updated_at" => Value::from(None::<sea_orm::prelude::DateTimeWithTimeZone>),
        };
        let count_row = btreemap! {
            "num_items" => Value::from(1i64),
        };

        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[joined_row]])
                .append_query_results([[count_row]])
                .into_connection(),
        );
        let politician_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[politician]])
                .into_connection(),
        );

        let service = service_with(rating_db, politician_db);
        let query = RatingListQuery {
            score: None,
            order: netabase_db::repositories::RatingOrder::CreatedAt,
            descending: true,
            limit: 10,
            offset: 0,
        };

        let (ratings, count) = service
            .list_for_politician("politician-0", &query)
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating.score, 4);
        assert_eq!(ratings[0].username.as_deref(), Some("alice"));
        assert_eq!(ratings[0].politician_name, "Politician 0");
    }

    #[tokio::test]
    async fn test_get_rating_not_found() {
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<rating::Model>::new()])
                .into_connection(),
        );
        let politician_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(rating_db, politician_db);

        let result = service.get("missing").await;
        assert!(matches!(result, Err(AppError::RatingNotFound(_))));
    }
}
