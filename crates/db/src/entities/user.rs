//! User entity (rating authors and authenticated accounts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique handle, matched case-insensitively at registration/login
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 hash; absent for Google-only accounts
    pub password_hash: Option<String>,

    pub email: Option<String>,

    /// Google OAuth subject for accounts created via Google sign-in
    pub google_sub: Option<String>,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rating::Entity")]
    Rating,
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
