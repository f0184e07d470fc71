use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(pk_auto(Service::Id))
                    .col(string_len(Service::Name, 255).not_null())
                    .col(integer(Service::ServiceTypeId).not_null())
                    .col(ColumnDef::new(Service::Description).text().null())
                    .col(ColumnDef::new(Service::PriceFrom).integer().null())
                    .col(ColumnDef::new(Service::PriceTo).integer().null())
                    .col(json_binary(Service::MainImages).not_null())
                    .col(ColumnDef::new(Service::Duration).string_len(100).null())
                    .col(json_binary(Service::Steps).not_null())
                    .col(string_len(Service::Target, 100).default("").not_null())
                    .col(json_binary(Service::ClientTypes).not_null())
                    .col(string_len(Service::Slug, 255).unique_key().not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .check(Expr::col(Service::PriceFrom).gte(0).or(Expr::col(Service::PriceFrom).is_null()))
                    .check(Expr::col(Service::PriceTo).gte(0).or(Expr::col(Service::PriceTo).is_null()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_service_type")
                            .from(Service::Table, Service::ServiceTypeId)
                            .to(ServiceType::Table, ServiceType::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    Name,
    ServiceTypeId,
    Description,
    PriceFrom,
    PriceTo,
    MainImages,
    Duration,
    Steps,
    Target,
    ClientTypes,
    Slug,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ServiceType { Table, Id }
