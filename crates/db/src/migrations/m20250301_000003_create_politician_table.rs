//! Create politician table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Politician::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Politician::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Politician::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Politician::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Politician::Photo).string_len(512))
                    .col(ColumnDef::new(Politician::Age).integer().not_null())
                    .col(ColumnDef::new(Politician::Education).text().not_null())
                    .col(ColumnDef::new(Politician::CriminalRecord).text())
                    .col(
                        ColumnDef::new(Politician::PartyId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Politician::PartyPosition).string_len(255))
                    .col(ColumnDef::new(Politician::Criticism).text())
                    .col(ColumnDef::new(Politician::Location).string_len(255))
                    .col(ColumnDef::new(Politician::Biography).text().not_null())
                    .col(ColumnDef::new(Politician::PreviousPartyHistory).text())
                    .col(
                        ColumnDef::new(Politician::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Politician::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Politician::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Politician::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_politician_party")
                            .from(Politician::Table, Politician::PartyId)
                            .to(Party::Table, Party::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: party_id (for party politician listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_politician_party_id")
                    .table(Politician::Table)
                    .col(Politician::PartyId)
                    .to_owned(),
            )
            .await?;

        // Index: views (default list ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_politician_views")
                    .table(Politician::Table)
                    .col(Politician::Views)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Politician::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Politician {
    Table,
    Id,
    Name,
    Slug,
    Photo,
    Age,
    Education,
    CriminalRecord,
    PartyId,
    PartyPosition,
    Criticism,
    Location,
    Biography,
    PreviousPartyHistory,
    IsActive,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Party {
    Table,
    Id,
}
