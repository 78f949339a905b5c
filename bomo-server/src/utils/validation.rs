//! Input validation helpers
//!
//! Centralized text limits and validation functions for tag payloads.

use shared::error::{AppError, ErrorCode};
use shared::models::MAX_TAG_NAME_LEN;
use thiserror::Error;

/// Search terms longer than this are rejected instead of scanned
pub const MAX_SEARCH_LEN: usize = 100;

/// A field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let code = match err.field {
            "color" => ErrorCode::TagInvalidColor,
            _ => ErrorCode::ValidationFailed,
        };
        AppError::with_message(code, err.message).with_detail("field", err.field)
    }
}

/// Validate that a required string is non-empty (after trimming) and within
/// `max_len` characters. Returns the trimmed value.
pub fn validate_required_text(
    value: &str,
    field: &'static str,
    max_len: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("{field} must not be empty")));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(ValidationError::new(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Tag names: trimmed, 1..=50 characters
pub fn validate_tag_name(value: &str) -> Result<String, ValidationError> {
    validate_required_text(value, "name", MAX_TAG_NAME_LEN)
}

/// Colors are `#RRGGBB` hex
pub fn validate_color(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ValidationError::new(
            "color",
            format!("color must be a #RRGGBB hex value, got '{value}'"),
        ));
    }
    Ok(())
}

/// Optional search term; blank means "no filter"
pub fn validate_search_term(value: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::new(
            "search",
            format!("search is too long (max {MAX_SEARCH_LEN})"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Case-folded name used for uniqueness and search
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
