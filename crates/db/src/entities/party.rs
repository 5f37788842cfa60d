//! Party entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "party")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    /// URL-safe identifier derived from the name at creation, immutable
    #[sea_orm(unique)]
    pub slug: String,

    pub short_name: Option<String>,

    /// Flag image reference (upload handling is out of band)
    pub flag: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::politician::Entity")]
    Politician,
}

impl Related<super::politician::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Politician.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
