//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user;
mod m20250101_000002_create_user_credentials;
mod m20250101_000003_create_token_blacklist;
mod m20250101_000004_create_product;
mod m20250101_000005_create_service_type;
mod m20250101_000006_create_service;
mod m20250101_000007_create_master;
mod m20250101_000008_create_master_service_type;
mod m20250101_000009_create_portfolio;
mod m20250101_000010_create_contact;
mod m20250101_000011_create_image_upload;
mod m20250101_000012_create_quote;
mod m20250101_000013_create_daily_quote;
mod m20250101_000020_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user::Migration),
            Box::new(m20250101_000002_create_user_credentials::Migration),
            Box::new(m20250101_000003_create_token_blacklist::Migration),
            Box::new(m20250101_000004_create_product::Migration),
            Box::new(m20250101_000005_create_service_type::Migration),
            Box::new(m20250101_000006_create_service::Migration),
            Box::new(m20250101_000007_create_master::Migration),
            Box::new(m20250101_000008_create_master_service_type::Migration),
            Box::new(m20250101_000009_create_portfolio::Migration),
            Box::new(m20250101_000010_create_contact::Migration),
            Box::new(m20250101_000011_create_image_upload::Migration),
            Box::new(m20250101_000012_create_quote::Migration),
            Box::new(m20250101_000013_create_daily_quote::Migration),
            // Indexes should always be applied last
            Box::new(m20250101_000020_add_indexes::Migration),
        ]
    }
}
