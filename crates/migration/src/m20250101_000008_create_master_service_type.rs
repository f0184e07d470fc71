//! Create `master_service_type` link table (masters <-> service types).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MasterServiceType::Table)
                    .if_not_exists()
                    .col(integer(MasterServiceType::MasterId).not_null())
                    .col(integer(MasterServiceType::ServiceTypeId).not_null())
                    .primary_key(
                        Index::create()
                            .col(MasterServiceType::MasterId)
                            .col(MasterServiceType::ServiceTypeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_master_service_type_master")
                            .from(MasterServiceType::Table, MasterServiceType::MasterId)
                            .to(Master::Table, Master::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_master_service_type_service_type")
                            .from(MasterServiceType::Table, MasterServiceType::ServiceTypeId)
                            .to(ServiceType::Table, ServiceType::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MasterServiceType::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MasterServiceType { Table, MasterId, ServiceTypeId }

#[derive(DeriveIden)]
enum Master { Table, Id }

#[derive(DeriveIden)]
enum ServiceType { Table, Id }
