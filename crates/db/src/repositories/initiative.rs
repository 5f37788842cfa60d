//! Initiative repository.

use std::sync::Arc;

use crate::entities::{initiative, Initiative};
use netabase_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Initiative repository for database operations.
#[derive(Clone)]
pub struct InitiativeRepository {
    db: Arc<DatabaseConnection>,
}

impl InitiativeRepository {
    /// Create a new initiative repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get all initiatives of a politician, oldest first.
    pub async fn find_by_politician(
        &self,
        politician_id: &str,
    ) -> AppResult<Vec<initiative::Model>> {
        Initiative::find()
            .filter(initiative::Column::PoliticianId.eq(politician_id))
            .order_by_asc(initiative::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new initiative.
    pub async fn create(&self, model: initiative::ActiveModel) -> AppResult<initiative::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
