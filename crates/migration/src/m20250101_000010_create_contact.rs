//! The contact card is a singleton: the primary key is pinned to 1.
use sea_orm_migration::{prelude::*, schema::*};

const SINGLETON_ID: i32 = 1;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(integer(Contact::Id).primary_key().check(Expr::col(Contact::Id).eq(SINGLETON_ID)))
                    .col(string_len(Contact::Email, 254).not_null())
                    .col(json_binary(Contact::Phones).not_null())
                    .col(string_len(Contact::Instagram, 200).default("").not_null())
                    .col(string_len(Contact::Telegram, 200).default("").not_null())
                    .col(string_len(Contact::Whatsapp, 200).default("").not_null())
                    .col(json_binary(Contact::Schedule).not_null())
                    .col(timestamp_with_time_zone(Contact::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Contact::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contact::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Contact { Table, Id, Email, Phones, Instagram, Telegram, Whatsapp, Schedule, CreatedAt, UpdatedAt }
