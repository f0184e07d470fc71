//! Create `daily_quote` table.
//!
//! One row per calendar date; the unique date arbitrates concurrent rotations.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyQuote::Table)
                    .if_not_exists()
                    .col(pk_auto(DailyQuote::Id))
                    .col(integer(DailyQuote::QuoteId).not_null())
                    .col(date(DailyQuote::Date).unique_key().not_null())
                    .col(timestamp_with_time_zone(DailyQuote::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_quote_quote")
                            .from(DailyQuote::Table, DailyQuote::QuoteId)
                            .to(Quote::Table, Quote::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DailyQuote::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DailyQuote { Table, Id, QuoteId, Date, CreatedAt }

#[derive(DeriveIden)]
enum Quote { Table, Id }
