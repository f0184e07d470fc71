//! Create `service_type` table.
//!
//! JSON columns hold the marketing payload (benefits, images, linked product ids).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceType::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceType::Id))
                    .col(string_len(ServiceType::Name, 255).not_null())
                    .col(text(ServiceType::Description).not_null())
                    .col(json_binary(ServiceType::ClientTypes).not_null())
                    .col(ColumnDef::new(ServiceType::MainImage).string_len(200).null())
                    .col(json_binary(ServiceType::Benefits).not_null())
                    .col(json_binary(ServiceType::BenefitsImages).not_null())
                    .col(string_len(ServiceType::Target, 100).not_null())
                    .col(json_binary(ServiceType::Products).not_null())
                    .col(string_len(ServiceType::Slug, 255).unique_key().not_null())
                    .col(timestamp_with_time_zone(ServiceType::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceType::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceType::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceType {
    Table,
    Id,
    Name,
    Description,
    ClientTypes,
    MainImage,
    Benefits,
    BenefitsImages,
    Target,
    Products,
    Slug,
    CreatedAt,
    UpdatedAt,
}
