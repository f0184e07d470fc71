use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Portfolio::Table)
                    .if_not_exists()
                    .col(pk_auto(Portfolio::Id))
                    .col(string_len(Portfolio::Image, 200).not_null())
                    // master is a free-form object, not a reference to `master`
                    .col(json_binary(Portfolio::Master).not_null())
                    .col(integer(Portfolio::ServiceTypeId).not_null())
                    .col(integer(Portfolio::ServiceId).not_null())
                    .col(timestamp_with_time_zone(Portfolio::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Portfolio::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_portfolio_service_type")
                            .from(Portfolio::Table, Portfolio::ServiceTypeId)
                            .to(ServiceType::Table, ServiceType::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_portfolio_service")
                            .from(Portfolio::Table, Portfolio::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Portfolio::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Portfolio { Table, Id, Image, Master, ServiceTypeId, ServiceId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum ServiceType { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
