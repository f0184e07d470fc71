//! Field-level validation shared by the catalog entities.
//!
//! Every helper names the offending field in its error so that messages can be
//! surfaced to API clients unchanged.
use serde_json::Value;

use crate::errors::ModelError;

fn invalid(msg: impl Into<String>) -> ModelError { ModelError::Validation(msg.into()) }

/// Non-blank string no longer than `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    validate_max_len(field, value, max)
}

pub fn validate_max_len(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.chars().count() > max {
        return Err(invalid(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

/// Absolute http(s) URL with a non-empty host part.
pub fn validate_http_url(field: &str, value: &str) -> Result<(), ModelError> {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .ok_or_else(|| invalid(format!("{field} must be an http(s) URL")))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(invalid(format!("{field} must be an http(s) URL")));
    }
    validate_max_len(field, value, 200)
}

/// Blank, or a valid http(s) URL.
pub fn validate_optional_url(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() { return Ok(()); }
    validate_http_url(field, value)
}

pub fn validate_email(value: &str) -> Result<(), ModelError> {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return Err(invalid("invalid email"));
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || value.chars().any(char::is_whitespace)
    {
        return Err(invalid("invalid email"));
    }
    validate_max_len("email", value, 254)
}

pub fn validate_non_negative(field: &str, value: i32) -> Result<(), ModelError> {
    if value < 0 {
        return Err(invalid(format!("{field} must be >= 0")));
    }
    Ok(())
}

/// The value must be a JSON array; returns its items.
pub fn expect_array<'a>(field: &str, value: &'a Value) -> Result<&'a Vec<Value>, ModelError> {
    value.as_array().ok_or_else(|| invalid(format!("{field} must be a list")))
}

/// Every item must be an object containing each of `keys`.
pub fn validate_objects_with_keys(field: &str, value: &Value, keys: &[&str]) -> Result<(), ModelError> {
    for item in expect_array(field, value)? {
        let Some(obj) = item.as_object() else {
            return Err(invalid(format!("each {field} item must be an object")));
        };
        for key in keys {
            if !obj.contains_key(*key) {
                return Err(invalid(format!("each {field} item must contain '{key}'")));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_rejects_blank_and_long_values() {
        assert!(validate_required("name", "  ", 10).is_err());
        assert!(validate_required("name", "abcdefghijk", 10).is_err());
        assert!(validate_required("name", "Стрижка", 10).is_ok());
    }

    #[test]
    fn url_checks() {
        assert!(validate_http_url("image", "https://cdn.example.com/a.png").is_ok());
        assert!(validate_http_url("image", "ftp://cdn.example.com/a.png").is_err());
        assert!(validate_http_url("image", "https:///a.png").is_err());
        assert!(validate_http_url("image", "https://cdn.example.com/a b.png").is_err());
        assert!(validate_optional_url("instagram", "").is_ok());
    }

    #[test]
    fn email_checks() {
        assert!(validate_email("salon@example.com").is_ok());
        assert!(validate_email("salon@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn objects_with_keys() {
        let ok = json!([{"title": "a", "text": "b"}]);
        assert!(validate_objects_with_keys("benefits", &ok, &["title", "text"]).is_ok());
        let missing = json!([{"title": "a"}]);
        assert!(validate_objects_with_keys("benefits", &missing, &["title", "text"]).is_err());
        assert!(validate_objects_with_keys("benefits", &json!({"title": "a"}), &["title"]).is_err());
        assert!(validate_objects_with_keys("benefits", &json!(["x"]), &["title"]).is_err());
    }
}
