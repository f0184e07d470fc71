use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors, service, service_type, validators};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub image: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub master: Json,
    pub service_type_id: i32,
    pub service_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceType, Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceType => Entity::belongs_to(service_type::Entity)
                .from(Column::ServiceTypeId)
                .to(service_type::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<service_type::Entity> for Entity {
    fn to() -> RelationDef { Relation::ServiceType.def() }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub const UNKNOWN_MASTER: &str = "Unknown master";

impl Model {
    pub fn master_name(&self) -> String { master_name(&self.master) }
}

/// `master.name` when the value is an object; otherwise the raw value as text.
pub fn master_name(master: &Value) -> String {
    match master {
        Value::Object(obj) => obj
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_MASTER.to_string()),
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Null => UNKNOWN_MASTER.to_string(),
        Value::String(_) => UNKNOWN_MASTER.to_string(),
        other => other.to_string(),
    }
}

pub fn validate_image(image: &str) -> Result<(), errors::ModelError> {
    validators::validate_required("image", image, 200)
}

/// The master must be an object with a non-empty `name`.
pub fn validate_master(value: &Value) -> Result<(), errors::ModelError> {
    let Some(obj) = value.as_object() else {
        return Err(errors::ModelError::Validation("master must be an object".into()));
    };
    match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => Ok(()),
        _ => Err(errors::ModelError::Validation("master must have a non-empty 'name'".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn master_validation() {
        assert!(validate_master(&json!({"name": "Anna", "photo": "x"})).is_ok());
        assert!(validate_master(&json!({"name": "  "})).is_err());
        assert!(validate_master(&json!({"title": "Anna"})).is_err());
        assert!(validate_master(&json!("Anna")).is_err());
    }

    #[test]
    fn master_name_fallbacks() {
        assert_eq!(master_name(&json!({"name": "Anna"})), "Anna");
        assert_eq!(master_name(&json!({"title": "x"})), UNKNOWN_MASTER);
        assert_eq!(master_name(&json!("Boris")), "Boris");
        assert_eq!(master_name(&json!(null)), UNKNOWN_MASTER);
        assert_eq!(master_name(&json!(42)), "42");
    }
}
