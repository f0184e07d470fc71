use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quote::Table)
                    .if_not_exists()
                    .col(pk_auto(Quote::Id))
                    .col(string_len(Quote::Author, 100).default("").not_null())
                    .col(text(Quote::Text).not_null())
                    .col(boolean(Quote::IsUsed).default(false).not_null())
                    .col(timestamp_with_time_zone(Quote::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Quote::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Quote { Table, Id, Author, Text, IsUsed, CreatedAt }
