use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors, master, master_service_type, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_type")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub client_types: Json,
    pub main_image: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub benefits: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub benefits_images: Json,
    pub target: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub products: Json,
    #[sea_orm(unique)]
    pub slug: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Services, Portfolio, MasterLinks }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Services => Entity::has_many(crate::service::Entity).into(),
            Relation::Portfolio => Entity::has_many(crate::portfolio::Entity).into(),
            Relation::MasterLinks => Entity::has_many(master_service_type::Entity).into(),
        }
    }
}

impl Related<crate::service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Services.def() }
}

impl Related<master_service_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::MasterLinks.def() }
}

impl Related<master::Entity> for Entity {
    fn to() -> RelationDef { master_service_type::Relation::Master.def() }
    fn via() -> Option<RelationDef> { Some(master_service_type::Relation::ServiceType.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    validators::validate_required("name", name, 255)
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.trim().is_empty() {
        return Err(errors::ModelError::Validation("description is required".into()));
    }
    Ok(())
}

pub fn validate_target(target: &str) -> Result<(), errors::ModelError> {
    validators::validate_required("target", target, 100)
}

pub fn validate_client_types(value: &Value) -> Result<(), errors::ModelError> {
    validators::expect_array("client_types", value).map(|_| ())
}

/// Benefits are `{title, text, ...}` objects.
pub fn validate_benefits(value: &Value) -> Result<(), errors::ModelError> {
    validators::validate_objects_with_keys("benefits", value, &["title", "text"])
}

pub fn validate_benefits_images(value: &Value) -> Result<(), errors::ModelError> {
    validators::expect_array("benefits_images", value).map(|_| ())
}

/// Linked products are stored as a list of integer ids.
pub fn validate_products(value: &Value) -> Result<(), errors::ModelError> {
    let items = validators::expect_array("products", value)?;
    if items.iter().any(|v| !(v.is_i64() || v.is_u64())) {
        return Err(errors::ModelError::Validation("products must be a list of product ids".into()));
    }
    Ok(())
}

pub fn validate_main_image(value: Option<&str>) -> Result<(), errors::ModelError> {
    match value {
        Some(url) => validators::validate_http_url("main_image", url),
        None => Ok(()),
    }
}
