use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors, service_type, validators};

/// At most this many entries in `main_images`.
pub const MAX_MAIN_IMAGES: usize = 2;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub service_type_id: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price_from: Option<i32>,
    pub price_to: Option<i32>,
    #[sea_orm(column_type = "JsonBinary")]
    pub main_images: Json,
    pub duration: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub steps: Json,
    pub target: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub client_types: Json,
    #[sea_orm(unique)]
    pub slug: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceType, Portfolio }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceType => Entity::belongs_to(service_type::Entity)
                .from(Column::ServiceTypeId)
                .to(service_type::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Portfolio => Entity::has_many(crate::portfolio::Entity).into(),
        }
    }
}

impl Related<service_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::ServiceType.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    validators::validate_required("name", name, 255)
}

pub fn validate_main_images(value: &Value) -> Result<(), errors::ModelError> {
    let items = validators::expect_array("main_images", value)?;
    if items.len() > MAX_MAIN_IMAGES {
        return Err(errors::ModelError::Validation(format!("main_images may contain at most {MAX_MAIN_IMAGES} images")));
    }
    Ok(())
}

/// Steps are objects that carry at least a `text`.
pub fn validate_steps(value: &Value) -> Result<(), errors::ModelError> {
    validators::validate_objects_with_keys("steps", value, &["text"])
}

pub fn validate_client_types(value: &Value) -> Result<(), errors::ModelError> {
    let items = validators::expect_array("client_types", value)?;
    if items.iter().any(|v| !v.is_string()) {
        return Err(errors::ModelError::Validation("client_types must be a list of strings".into()));
    }
    Ok(())
}

pub fn validate_duration(value: Option<&str>) -> Result<(), errors::ModelError> {
    match value {
        Some(d) if d.trim().is_empty() => Err(errors::ModelError::Validation("duration must not be blank".into())),
        Some(d) => validators::validate_max_len("duration", d, 100),
        None => Ok(()),
    }
}

pub fn validate_target(value: &str) -> Result<(), errors::ModelError> {
    validators::validate_max_len("target", value, 100)
}

/// Both prices are non-negative; when both are set and non-zero, `from <= to`.
pub fn validate_prices(price_from: Option<i32>, price_to: Option<i32>) -> Result<(), errors::ModelError> {
    if let Some(p) = price_from { validators::validate_non_negative("price_from", p)?; }
    if let Some(p) = price_to { validators::validate_non_negative("price_to", p)?; }
    if let (Some(from), Some(to)) = (price_from, price_to) {
        if from != 0 && to != 0 && from > to {
            return Err(errors::ModelError::Validation("price_from must not exceed price_to".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn main_images_are_capped() {
        assert!(validate_main_images(&json!(["a", "b"])).is_ok());
        assert!(validate_main_images(&json!(["a", "b", "c"])).is_err());
        assert!(validate_main_images(&json!("a")).is_err());
    }

    #[test]
    fn prices() {
        assert!(validate_prices(Some(1000), Some(2000)).is_ok());
        assert!(validate_prices(Some(3000), Some(2000)).is_err());
        assert!(validate_prices(Some(3000), Some(0)).is_ok());
        assert!(validate_prices(Some(-1), None).is_err());
        assert!(validate_prices(None, None).is_ok());
    }

    #[test]
    fn duration_and_client_types() {
        assert!(validate_duration(Some("  ")).is_err());
        assert!(validate_duration(Some("1 h")).is_ok());
        assert!(validate_duration(None).is_ok());
        assert!(validate_client_types(&json!(["men", "women"])).is_ok());
        assert!(validate_client_types(&json!(["men", 1])).is_err());
    }

    #[test]
    fn steps_need_text() {
        assert!(validate_steps(&json!([{"text": "wash"}, {"text": "cut", "title": "2"}])).is_ok());
        assert!(validate_steps(&json!([{"title": "2"}])).is_err());
    }
}
