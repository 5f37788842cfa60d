//! Politician repository.

use std::sync::Arc;

use crate::entities::{party, politician, rating, Politician};
use crate::repositories::escape_like;
use netabase_common::{AppError, AppResult};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// One row of a politician listing, with party name and rating aggregates
/// computed in the same grouped query.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PoliticianListRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub photo: Option<String>,
    pub age: i32,
    pub location: Option<String>,
    pub is_active: bool,
    pub views: i64,
    pub party_name: String,
    /// NULL when the politician has no ratings.
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

/// Sortable columns for politician listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoliticianOrder {
    Name,
    Age,
    Views,
    AverageRating,
    RatingCount,
}

/// Query parameters for politician listings.
#[derive(Debug, Clone)]
pub struct PoliticianListQuery {
    /// Restrict to one party, by slug.
    pub party_slug: Option<String>,
    pub is_active: Option<bool>,
    /// Exact match on location.
    pub location: Option<String>,
    /// Case-insensitive substring match on name, party name, location.
    pub search: Option<String>,
    pub order: PoliticianOrder,
    pub descending: bool,
    pub limit: u64,
    pub offset: u64,
}

/// Politician repository for database operations.
#[derive(Clone)]
pub struct PoliticianRepository {
    db: Arc<DatabaseConnection>,
}

impl PoliticianRepository {
    /// Create a new politician repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a politician by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<politician::Model>> {
        Politician::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a politician by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<politician::Model>> {
        Politician::find()
            .filter(politician::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new politician.
    pub async fn create(&self, model: politician::ActiveModel) -> AppResult<politician::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the view counter atomically (single UPDATE query, no fetch).
    ///
    /// Safe under arbitrary concurrent invocations; the count never goes
    /// backwards and never loses increments to racing readers.
    pub async fn increment_views(&self, slug: &str) -> AppResult<()> {
        Politician::update_many()
            .col_expr(
                politician::Column::Views,
                Expr::col(politician::Column::Views).add(1),
            )
            .filter(politician::Column::Slug.eq(slug))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    fn filter_condition(query: &PoliticianListQuery) -> Condition {
        let mut condition = Condition::all();

        if let Some(party_slug) = &query.party_slug {
            condition = condition.add(party::Column::Slug.eq(party_slug));
        }
        if let Some(is_active) = query.is_active {
            condition = condition.add(politician::Column::IsActive.eq(is_active));
        }
        if let Some(location) = &query.location {
            condition = condition.add(politician::Column::Location.eq(location));
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", escape_like(search));
            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::col((politician::Entity, politician::Column::Name))
                            .ilike(pattern.clone()),
                    )
                    .add(Expr::col((party::Entity, party::Column::Name)).ilike(pattern.clone()))
                    .add(
                        Expr::col((politician::Entity, politician::Column::Location))
                            .ilike(pattern),
                    ),
            );
        }

        condition
    }

    /// List politicians with party name and rating aggregates (paginated).
    ///
    /// Aggregates are bulk-computed in one grouped query rather than per row.
    pub async fn list(&self, query: &PoliticianListQuery) -> AppResult<Vec<PoliticianListRow>> {
        let direction = if query.descending {
            Order::Desc
        } else {
            Order::Asc
        };

        let mut select = Politician::find()
            .select_only()
            .column(politician::Column::Id)
            .column(politician::Column::Name)
            .column(politician::Column::Slug)
            .column(politician::Column::Photo)
            .column(politician::Column::Age)
            .column(politician::Column::Location)
            .column(politician::Column::IsActive)
            .column(politician::Column::Views)
            .column_as(party::Column::Name, "party_name")
            .column_as(
                Expr::cust("AVG(\"rating\".\"score\")::float8"),
                "average_rating",
            )
            .column_as(rating::Column::Id.count(), "rating_count")
            .join(JoinType::InnerJoin, politician::Relation::Party.def())
            .join_rev(JoinType::LeftJoin, rating::Relation::Politician.def())
            .filter(Self::filter_condition(query))
            .group_by(politician::Column::Id)
            .group_by(party::Column::Name);

        select = match query.order {
            PoliticianOrder::Name => select.order_by(politician::Column::Name, direction),
            PoliticianOrder::Age => select.order_by(politician::Column::Age, direction),
            PoliticianOrder::Views => select.order_by(politician::Column::Views, direction),
            PoliticianOrder::AverageRating => {
                select.order_by(Expr::col(Alias::new("average_rating")), direction)
            }
            PoliticianOrder::RatingCount => {
                select.order_by(Expr::col(Alias::new("rating_count")), direction)
            }
        };

        select
            .limit(query.limit)
            .offset(query.offset)
            .into_model::<PoliticianListRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count politicians matching a listing query (pagination envelope total).
    pub async fn count(&self, query: &PoliticianListQuery) -> AppResult<u64> {
        Politician::find()
            .join(JoinType::InnerJoin, politician::Relation::Party.def())
            .filter(Self::filter_condition(query))
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
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_politician(id: &str, name: &str, slug: &str) -> politician::Model {
        politician::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            photo: None,
            age: 45,
            education: "Law degree".to_string(),
            criminal_record: None,
            party_id: "p1".to_string(),
            party_position: None,
            criticism: None,
            location: Some("Kathmandu".to_string()),
            biography: "A politician.".to_string(),
            previous_party_history: None,
            is_active: true,
            views: 10,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn default_query() -> PoliticianListQuery {
        PoliticianListQuery {
            party_slug: None,
            is_active: None,
            location: None,
            search: None,
            order: PoliticianOrder::Views,
            descending: true,
            limit: 10,
            offset: 0,
        }
    }

    #[tokio::test]
    async fn test_find_by_slug_found() {
        let politician = create_test_politician("pol1", "Jane Doe", "jane-doe");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[politician]])
                .into_connection(),
        );

        let repo = PoliticianRepository::new(db);
        let result = repo.find_by_slug("jane-doe").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().views, 10);
    }

    #[tokio::test]
    async fn test_increment_views_single_update() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PoliticianRepository::new(Arc::clone(&db));
        repo.increment_views("jane-doe").await.unwrap();

        // One UPDATE, no SELECT before it
        drop(repo);
        let log = Arc::try_unwrap(db)
            .map_err(|_| "connection still shared")
            .unwrap()
            .into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_list_maps_aggregates() {
        let row = btreemap! {
            "id" => Value::from("pol1"),
            "name" => Value::from("Jane Doe"),
            "slug" => Value::from("jane-doe"),
            "photo" => Value::from(None::<String>),
            "age" => Value::from(45),
            "location" => Value::from(Some("Kathmandu".to_string())),
            "is_active" => Value::from(true),
            "views" => Value::from(10i64),
            "party_name" => Value::from("Civic Union"),
            "average_rating" => Value::from(Some(4.0f64)),
            "rating_count" => Value::from(2i64),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = PoliticianRepository::new(db);
        let rows = repo.list(&default_query()).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].party_name, "Civic Union");
        assert_eq!(rows[0].average_rating, Some(4.0));
        assert_eq!(rows[0].rating_count, 2);
    }

    #[tokio::test]
    async fn test_list_no_ratings_yields_null_average() {
        let row = btreemap! {
            "id" => Value::from("pol2"),
            "name" => Value::from("John Roe"),
            "slug" => Value::from("john-roe"),
            "photo" => Value::from(None::<String>),
            "age" => Value::from(60),
            "location" => Value::from(None::<String>),
            "is_active" => Value::from(false),
            "views" => Value::from(0i64),
            "party_name" => Value::from("Reform Front"),
            "average_rating" => Value::from(None::<f64>),
            "rating_count" => Value::from(0i64),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = PoliticianRepository::new(db);
        let rows = repo.list(&default_query()).await.unwrap();

        assert_eq!(rows[0].average_rating, None);
        assert_eq!(rows[0].rating_count, 0);
    }
}
