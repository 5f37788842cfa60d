//! Create initiative table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Initiative::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Initiative::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Initiative::PoliticianId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Initiative::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Initiative::Description).text().not_null())
                    .col(
                        ColumnDef::new(Initiative::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_initiative_politician")
                            .from(Initiative::Table, Initiative::PoliticianId)
                            .to(Politician::Table, Politician::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: politician_id (for detail payload assembly)
        manager
            .create_index(
                Index::create()
                    .name("idx_initiative_politician_id")
                    .table(Initiative::Table)
                    .col(Initiative::PoliticianId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Initiative::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Initiative {
    Table,
    Id,
    PoliticianId,
    Title,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Politician {
    Table,
    Id,
}
