//! Create promise table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Promise::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Promise::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Promise::PoliticianId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Promise::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Promise::Description).text().not_null())
                    .col(
                        ColumnDef::new(Promise::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Promise::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_promise_politician")
                            .from(Promise::Table, Promise::PoliticianId)
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
                    .name("idx_promise_politician_id")
                    .table(Promise::Table)
                    .col(Promise::PoliticianId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Promise::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Promise {
    Table,
    Id,
    PoliticianId,
    Title,
    Description,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Politician {
    Table,
    Id,
}
