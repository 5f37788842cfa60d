//! Party repository.

use std::sync::Arc;

use crate::entities::{party, Party};
use crate::repositories::escape_like;
use netabase_common::{AppError, AppResult};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Sortable columns for party listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyOrder {
    Name,
    CreatedAt,
}

/// Query parameters for party listings.
#[derive(Debug, Clone)]
pub struct PartyListQuery {
    /// Case-insensitive substring match on name/short name.
    pub search: Option<String>,
    pub order: PartyOrder,
    pub descending: bool,
    pub limit: u64,
    pub offset: u64,
}

/// Party repository for database operations.
#[derive(Clone)]
pub struct PartyRepository {
    db: Arc<DatabaseConnection>,
}

impl PartyRepository {
    /// Create a new party repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a party by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<party::Model>> {
        Party::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a party by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<party::Model>> {
        Party::find()
            .filter(party::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new party.
    pub async fn create(&self, model: party::ActiveModel) -> AppResult<party::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn search_condition(search: &str) -> Condition {
        let pattern = format!("%{}%", escape_like(search));
        Condition::any()
            .add(Expr::col((party::Entity, party::Column::Name)).ilike(pattern.clone()))
            .add(Expr::col((party::Entity, party::Column::ShortName)).ilike(pattern))
    }

    /// List parties (paginated).
    pub async fn list(&self, query: &PartyListQuery) -> AppResult<Vec<party::Model>> {
        let mut select = Party::find();

        if let Some(search) = &query.search {
            select = select.filter(Self::search_condition(search));
        }

        let direction = if query.descending {
            Order::Desc
        } else {
            Order::Asc
        };

        select = match query.order {
            PartyOrder::Name => select.order_by(party::Column::Name, direction),
            PartyOrder::CreatedAt => select.order_by(party::Column::CreatedAt, direction),
        };

        select
            .limit(query.limit)
            .offset(query.offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count parties matching a listing query (pagination envelope total).
    pub async fn count(&self, query: &PartyListQuery) -> AppResult<u64> {
        let mut select = Party::find();

        if let Some(search) = &query.search {
            select = select.filter(Self::search_condition(search));
        }

        select
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_party(id: &str, name: &str, slug: &str) -> party::Model {
        party::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            short_name: None,
            flag: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_slug_found() {
        let party = create_test_party("p1", "Civic Union", "civic-union");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[party]])
                .into_connection(),
        );

        let repo = PartyRepository::new(db);
        let result = repo.find_by_slug("civic-union").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Civic Union");
    }

    #[tokio::test]
    async fn test_find_by_slug_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<party::Model>::new()])
                .into_connection(),
        );

        let repo = PartyRepository::new(db);
        let result = repo.find_by_slug("missing").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list() {
        let p1 = create_test_party("p1", "Civic Union", "civic-union");
        let p2 = create_test_party("p2", "Reform Front", "reform-front");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PartyRepository::new(db);
        let query = PartyListQuery {
            search: None,
            order: PartyOrder::Name,
            descending: false,
            limit: 10,
            offset: 0,
        };
        let result = repo.list(&query).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
