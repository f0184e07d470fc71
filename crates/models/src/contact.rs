//! Salon contact details. The table holds at most one row.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors, validators};

/// The only id the table accepts.
pub const SINGLETON_ID: i32 = 1;
pub const MAX_PHONES: usize = 5;
pub const MAX_PHONE_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub email: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub phones: Json,
    pub instagram: String,
    pub telegram: String,
    pub whatsapp: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub schedule: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 1..=5 entries, the first one non-blank, each at most 20 characters.
pub fn validate_phones(value: &Value) -> Result<(), errors::ModelError> {
    let items = validators::expect_array("phones", value)?;
    if items.is_empty() {
        return Err(errors::ModelError::Validation("at least one phone is required".into()));
    }
    if items.len() > MAX_PHONES {
        return Err(errors::ModelError::Validation(format!("at most {MAX_PHONES} phones are allowed")));
    }
    for (idx, item) in items.iter().enumerate() {
        let Some(phone) = item.as_str() else {
            return Err(errors::ModelError::Validation("phones must be strings".into()));
        };
        if idx == 0 && phone.trim().is_empty() {
            return Err(errors::ModelError::Validation("the first phone must not be blank".into()));
        }
        if phone.chars().count() > MAX_PHONE_LEN {
            return Err(errors::ModelError::Validation(format!("each phone must be at most {MAX_PHONE_LEN} characters")));
        }
    }
    Ok(())
}

/// Entries are `{week_day, hours}` objects.
pub fn validate_schedule(value: &Value) -> Result<(), errors::ModelError> {
    validators::validate_objects_with_keys("schedule", value, &["week_day", "hours"])
}

pub fn validate_links(instagram: &str, telegram: &str, whatsapp: &str) -> Result<(), errors::ModelError> {
    validators::validate_optional_url("instagram", instagram)?;
    validators::validate_optional_url("telegram", telegram)?;
    validators::validate_optional_url("whatsapp", whatsapp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phones_rules() {
        assert!(validate_phones(&json!(["+7 900 000-00-00"])).is_ok());
        assert!(validate_phones(&json!(["+7 900 000-00-00", ""])).is_ok());
        assert!(validate_phones(&json!([])).is_err());
        assert!(validate_phones(&json!([""])).is_err());
        assert!(validate_phones(&json!(["1", "2", "3", "4", "5", "6"])).is_err());
        assert!(validate_phones(&json!(["123456789012345678901"])).is_err());
        assert!(validate_phones(&json!([79000000000u64])).is_err());
    }

    #[test]
    fn schedule_rules() {
        assert!(validate_schedule(&json!([{"week_day": "Mon-Fri", "hours": "10-21"}])).is_ok());
        assert!(validate_schedule(&json!([{"week_day": "Mon"}])).is_err());
    }

    #[test]
    fn links_may_be_blank() {
        assert!(validate_links("", "", "").is_ok());
        assert!(validate_links("https://instagram.com/salon", "", "").is_ok());
        assert!(validate_links("instagram.com/salon", "", "").is_err());
    }
}
