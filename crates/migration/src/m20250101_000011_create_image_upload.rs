//! Create `image_upload` table.
//!
//! Paths are relative to the media root.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ImageUpload::Table)
                    .if_not_exists()
                    .col(pk_auto(ImageUpload::Id))
                    .col(string_len(ImageUpload::OriginalImage, 255).not_null())
                    .col(ColumnDef::new(ImageUpload::ProcessedImage).string_len(255).null())
                    .col(ColumnDef::new(ImageUpload::CroppedImage).string_len(255).null())
                    .col(boolean(ImageUpload::IsCompressed).default(true).not_null())
                    .col(boolean(ImageUpload::IsCropped).default(false).not_null())
                    .col(timestamp_with_time_zone(ImageUpload::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ImageUpload::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ImageUpload::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ImageUpload { Table, Id, OriginalImage, ProcessedImage, CroppedImage, IsCompressed, IsCropped, CreatedAt, UpdatedAt }
