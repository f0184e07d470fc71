use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors;

/// Accepted upload extensions (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image_upload")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Paths are relative to the media root.
    pub original_image: String,
    pub processed_image: Option<String>,
    pub cropped_image: Option<String>,
    pub is_compressed: bool,
    pub is_cropped: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Returns the lower-cased extension of `filename` if it is accepted.
pub fn validate_extension(filename: &str) -> Result<String, errors::ModelError> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(errors::ModelError::Validation(format!(
            "unsupported file extension; allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(validate_extension("Photo.JPG").unwrap(), "jpg");
        assert_eq!(validate_extension("a.b.webp").unwrap(), "webp");
        assert!(validate_extension("doc.pdf").is_err());
        assert!(validate_extension("noext").is_err());
    }
}
