//! Catalog resources: CRUD, filtering and list/detail views.

pub mod service_types;
pub mod services;
pub mod masters;
pub mod products;
pub mod portfolio;
pub mod contacts;

use serde::{Deserialize, Deserializer};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// How a write request treats absent fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: required fields must be present.
    Create,
    /// PUT: required fields must be present; they replace the stored values.
    Replace,
    /// PATCH: only the provided fields change.
    Patch,
}

impl WriteMode {
    pub fn is_partial(self) -> bool { matches!(self, WriteMode::Patch) }
}

/// Enforce presence of a required field unless the write is partial.
pub(crate) fn require<T>(mode: WriteMode, field: &str, value: Option<T>) -> Result<Option<T>, ServiceError> {
    if value.is_none() && !mode.is_partial() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent field (`None`).
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Query parameters common to every list endpoint.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub pagination: Pagination,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        image: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_null_from_absent() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.image, None);
        let null: Probe = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(null.image, Some(None));
        let set: Probe = serde_json::from_str(r#"{"image": "https://x.io/a.png"}"#).unwrap();
        assert_eq!(set.image, Some(Some("https://x.io/a.png".into())));
    }

    #[test]
    fn require_respects_mode() {
        assert!(require::<i32>(WriteMode::Create, "name", None).is_err());
        assert!(require::<i32>(WriteMode::Replace, "name", None).is_err());
        assert!(require::<i32>(WriteMode::Patch, "name", None).unwrap().is_none());
    }
}
