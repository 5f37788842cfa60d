//! User repository.

use std::sync::Arc;

use crate::entities::{user, User};
use netabase_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username, case-insensitively.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                    .eq(username.to_lowercase()),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by Google OAuth subject.
    pub async fn find_by_google_sub(&self, google_sub: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::GoogleSub.eq(google_sub))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a username is already taken (case-insensitive).
    pub async fn username_taken(&self, username: &str) -> AppResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
