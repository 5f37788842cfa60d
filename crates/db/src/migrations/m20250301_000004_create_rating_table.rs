//! Create rating table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rating::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rating::PoliticianId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rating::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Rating::Score).integer().not_null())
                    .col(ColumnDef::new(Rating::Comment).text())
                    .col(
                        ColumnDef::new(Rating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Rating::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_politician")
                            .from(Rating::Table, Rating::PoliticianId)
                            .to(Politician::Table, Politician::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_user")
                            .from(Rating::Table, Rating::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (politician_id, user_id) - one rating per user per
        // politician; the upsert's conflict target
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_politician_user")
                    .table(Rating::Table)
                    .col(Rating::PoliticianId)
                    .col(Rating::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's ratings)
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_user_id")
                    .table(Rating::Table)
                    .col(Rating::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (default rating list ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_created_at")
                    .table(Rating::Table)
                    .col(Rating::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rating {
    Table,
    Id,
    PoliticianId,
    UserId,
    Score,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Politician {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
