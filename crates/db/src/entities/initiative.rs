//! Initiative entity (child records of a politician).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "initiative")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub politician_id: String,

    pub title: String,
    pub description: String,

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
