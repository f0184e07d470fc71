use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: index on service_type_id
        manager
            .create_index(
                Index::create()
                    .name("idx_service_service_type")
                    .table(Service::Table)
                    .col(Service::ServiceTypeId)
                    .to_owned(),
            )
            .await?;

        // MasterServiceType: reverse lookup by service type
        manager
            .create_index(
                Index::create()
                    .name("idx_master_service_type_service_type")
                    .table(MasterServiceType::Table)
                    .col(MasterServiceType::ServiceTypeId)
                    .to_owned(),
            )
            .await?;

        // Portfolio: lookups by service type and by service
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_service_type")
                    .table(Portfolio::Table)
                    .col(Portfolio::ServiceTypeId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_service")
                    .table(Portfolio::Table)
                    .col(Portfolio::ServiceId)
                    .to_owned(),
            )
            .await?;

        // Quote: rotation scans unused quotes
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_is_used")
                    .table(Quote::Table)
                    .col(Quote::IsUsed)
                    .to_owned(),
            )
            .await?;

        // ImageUpload: default listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_image_upload_created_at")
                    .table(ImageUpload::Table)
                    .col(ImageUpload::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_service_service_type").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_master_service_type_service_type").table(MasterServiceType::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_portfolio_service_type").table(Portfolio::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_portfolio_service").table(Portfolio::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_quote_is_used").table(Quote::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_image_upload_created_at").table(ImageUpload::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Service { Table, ServiceTypeId }

#[derive(DeriveIden)]
enum MasterServiceType { Table, ServiceTypeId }

#[derive(DeriveIden)]
enum Portfolio { Table, ServiceTypeId, ServiceId }

#[derive(DeriveIden)]
enum Quote { Table, IsUsed }

#[derive(DeriveIden)]
enum ImageUpload { Table, CreatedAt }
