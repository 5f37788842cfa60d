//! Politician entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "politician")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// URL-safe identifier derived from the name at creation, immutable
    #[sea_orm(unique)]
    pub slug: String,

    /// Photo reference (upload handling is out of band)
    pub photo: Option<String>,

    /// Validated to 18..=100 at the service layer
    pub age: i32,

    pub education: String,
    pub criminal_record: Option<String>,

    pub party_id: String,
    pub party_position: Option<String>,

    pub criticism: Option<String>,
    pub location: Option<String>,
    pub biography: String,
    pub previous_party_history: Option<String>,

    pub is_active: bool,

    /// Monotonically non-decreasing; incremented atomically on every
    /// detail fetch, never written read-modify-write
    pub views: i64,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id",
        on_delete = "Cascade"
    )]
    Party,

    #[sea_orm(has_many = "super::rating::Entity")]
    Rating,

    #[sea_orm(has_many = "super::initiative::Entity")]
    Initiative,

    #[sea_orm(has_many = "super::promise::Entity")]
    Promise,
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl Related<super::initiative::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Initiative.def()
    }
}

impl Related<super::promise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
