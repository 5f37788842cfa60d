//! Promise entity (child records of a politician, with progress status).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress status of a campaign promise.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PromiseStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promise")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub politician_id: String,

    pub title: String,
    pub description: String,

    pub status: PromiseStatus,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::politician::Entity",
        from = "Column::PoliticianId",
        to = "super::politician::Column::Id",
        on_delete = "Cascade"
    )]
    Politician,
}

impl Related<super::politician::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Politician.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
