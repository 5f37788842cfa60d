//! Promise repository.

use std::sync::Arc;

use crate::entities::{promise, Promise};
use netabase_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Promise repository for database operations.
#[derive(Clone)]
pub struct PromiseRepository {
    db: Arc<DatabaseConnection>,
}

impl PromiseRepository {
    /// Create a new promise repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get all promises of a politician, oldest first.
    pub async fn find_by_politician(&self, politician_id: &str) -> AppResult<Vec<promise::Model>> {
        Promise::find()
            .filter(promise::Column::PoliticianId.eq(politician_id))
            .order_by_asc(promise::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new promise.
    pub async fn create(&self, model: promise::ActiveModel) -> AppResult<promise::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::promise::PromiseStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_politician() {
        let p1 = promise::Model {
            id: "pr1".to_string(),
            politician_id: "pol1".to_string(),
            title: "New hospital".to_string(),
            description: "Build a hospital in the district.".to_string(),
            status: PromiseStatus::InProgress,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1]])
                .into_connection(),
        );

        let repo = PromiseRepository::new(db);
        let result = repo.find_by_politician("pol1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].status, PromiseStatus::InProgress);
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let stored = promise::Model {
            id: "pr1".to_string(),
            politician_id: "pol1".to_string(),
            title: "New hospital".to_string(),
            description: "Build a hospital in the district.".to_string(),
            status: PromiseStatus::Pending,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored.clone()]])
                .into_connection(),
        );

        let repo = PromiseRepository::new(db);
        let model = promise::ActiveModel {
            id: sea_orm::Set(stored.id.clone()),
            politician_id: sea_orm::Set(stored.politician_id.clone()),
            title: sea_orm::Set(stored.title.clone()),
            description: sea_orm::Set(stored.description.clone()),
            status: sea_orm::Set(PromiseStatus::Pending),
            created_at: sea_orm::Set(stored.created_at),
        };

        let created = repo.create(model).await.unwrap();
        assert_eq!(created.status, PromiseStatus::Pending);
    }
}
