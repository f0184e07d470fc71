use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Master::Table)
                    .if_not_exists()
                    .col(pk_auto(Master::Id))
                    .col(string_len(Master::Name, 200).not_null())
                    .col(ColumnDef::new(Master::Image).string_len(200).null())
                    .col(string_len(Master::JobTitle, 200).not_null())
                    .col(ColumnDef::new(Master::FavoriteProductId).integer().null())
                    .col(integer(Master::Experience).not_null())
                    .col(timestamp_with_time_zone(Master::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Master::UpdatedAt).not_null())
                    .check(Expr::col(Master::Experience).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_master_favorite_product")
                            .from(Master::Table, Master::FavoriteProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Master::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Master { Table, Id, Name, Image, JobTitle, FavoriteProductId, Experience, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Product { Table, Id }
