//! Rating repository.

use std::sync::Arc;

use crate::entities::{rating, user, Rating, User};
use netabase_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Sortable columns for rating listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOrder {
    CreatedAt,
    UpdatedAt,
    Score,
}

/// Query parameters for a politician's rating listing.
#[derive(Debug, Clone)]
pub struct RatingListQuery {
    /// Filter to one score value.
    pub score: Option<i32>,
    pub order: RatingOrder,
    pub descending: bool,
    pub limit: u64,
    pub offset: u64,
}

/// Rating repository for database operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a rating by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<rating::Model>> {
        Rating::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a rating by ID, with its author.
    pub async fn find_by_id_with_user(
        &self,
        id: &str,
    ) -> AppResult<Option<(rating::Model, Option<user::Model>)>> {
        Rating::find_by_id(id)
            .find_also_related(User)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a rating by politician and user.
    pub async fn find_by_politician_and_user(
        &self,
        politician_id: &str,
        user_id: &str,
    ) -> AppResult<Option<rating::Model>> {
        Rating::find()
            .filter(rating::Column::PoliticianId.eq(politician_id))
            .filter(rating::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically create or update a rating.
    ///
    /// Runs a single `INSERT .. ON CONFLICT (politician_id, user_id) DO
    /// UPDATE` against the unique index, so a concurrent duplicate
    /// submission becomes an update of the existing row rather than a
    /// uniqueness violation or a second row. On conflict only score,
    /// comment and `updated_at` change; the row id and `created_at` stay.
    pub async fn upsert(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        Rating::insert(model)
            .on_conflict(
                OnConflict::columns([rating::Column::PoliticianId, rating::Column::UserId])
                    .update_columns([
                        rating::Column::Score,
                        rating::Column::Comment,
                        rating::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing rating in place.
    pub async fn update(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a rating.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let rating = self.find_by_id(id).await?;
        if let Some(r) = rating {
            r.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get ratings for a politician with their authors (paginated).
    pub async fn find_by_politician(
        &self,
        politician_id: &str,
        query: &RatingListQuery,
    ) -> AppResult<Vec<(rating::Model, Option<user::Model>)>> {
        let direction = if query.descending {
            Order::Desc
        } else {
            Order::Asc
        };

        let mut select = Rating::find()
            .find_also_related(User)
            .filter(rating::Column::PoliticianId.eq(politician_id));

        if let Some(score) = query.score {
            select = select.filter(rating::Column::Score.eq(score));
        }

        select = match query.order {
            RatingOrder::CreatedAt => select.order_by(rating::Column::CreatedAt, direction),
            RatingOrder::UpdatedAt => select.order_by(rating::Column::UpdatedAt, direction),
            RatingOrder::Score => select.order_by(rating::Column::Score, direction),
        };

        select
            .limit(query.limit)
            .offset(query.offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ratings for a politician matching a listing query.
    pub async fn count_by_politician_filtered(
        &self,
        politician_id: &str,
        score: Option<i32>,
    ) -> AppResult<u64> {
        let mut select = Rating::find().filter(rating::Column::PoliticianId.eq(politician_id));

        if let Some(score) = score {
            select = select.filter(rating::Column::Score.eq(score));
        }

        select
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all ratings on a politician.
    pub async fn count_by_politician(&self, politician_id: &str) -> AppResult<u64> {
        self.count_by_politician_filtered(politician_id, None).await
    }

    /// Mean score for a politician; `None` when no ratings exist.
    ///
    /// Rounding to two decimals happens at the service layer.
    pub async fn average_for(&self, politician_id: &str) -> AppResult<Option<f64>> {
        #[derive(FromQueryResult)]
        struct AvgRow {
            average: Option<f64>,
        }

        let row = Rating::find()
            .filter(rating::Column::PoliticianId.eq(politician_id))
            .select_only()
            .column_as(Expr::cust("AVG(\"rating\".\"score\")::float8"), "average")
            .into_model::<AvgRow>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.and_then(|r| r.average))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

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

    #[tokio::test]
    async fn test_find_by_id_found() {
        let rating = create_test_rating("r1", "pol1", "u1", 4);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating.clone()]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo.find_by_id("r1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().score, 4);
    }

    #[tokio::test]
    async fn test_find_by_politician_and_user_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<rating::Model>::new()])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo
            .find_by_politician_and_user("pol1", "u1")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_upsert_returns_final_row() {
        // The ON CONFLICT insert returns the row as stored, whether it was
        // created or overwritten.
        let stored = create_test_rating("r1", "pol1", "u1", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let model = rating::ActiveModel {
            id: sea_orm::Set("r-new".to_string()),
            politician_id: sea_orm::Set("pol1".to_string()),
            user_id: sea_orm::Set("u1".to_string()),
            score: sea_orm::Set(5),
            comment: sea_orm::Set(None),
            created_at: sea_orm::Set(Utc::now().into()),
            updated_at: sea_orm::Set(Utc::now().into()),
        };

        let result = repo.upsert(model).await.unwrap();

        // Existing row id wins on conflict
        assert_eq!(result.id, "r1");
        assert_eq!(result.score, 5);
    }

    #[tokio::test]
    async fn test_average_for_no_ratings() {
        let row = btreemap! {
            "average" => Value::from(None::<f64>),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo.average_for("pol1").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_average_for_with_ratings() {
        let row = btreemap! {
            "average" => Value::from(Some(4.0f64)),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo.average_for("pol1").await.unwrap();

        assert_eq!(result, Some(4.0));
    }
}
