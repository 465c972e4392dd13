//! Form field checks: a required field must be non-empty, IDs must be
//! positive integers. Blank optional fields mean "not set".

use chrono::NaiveDate;
use rental_core::ApiError;

pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} is required")));
    }
    Ok(value)
}

pub fn id(field: &str, value: &str) -> Result<u32, ApiError> {
    let value = required(field, value)?;
    match value.parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidInput(format!(
            "{field} must be a positive whole number, got {value:?}"
        ))),
    }
}

pub fn optional_id(field: &str, value: &str) -> Result<Option<u32>, ApiError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    id(field, value).map(Some)
}

/// Non-negative count; blank is `None`.
pub fn optional_count(field: &str, value: &str) -> Result<Option<u32>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ApiError::InvalidInput(format!("{field} must be a whole number, got {value:?}")))
}

/// `YYYY-MM-DD`; blank is `None`.
pub fn optional_date(field: &str, value: &str) -> Result<Option<NaiveDate>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::InvalidInput(format!("{field} must look like YYYY-MM-DD, got {value:?}")))
}

/// Blank is `None`, anything else is trimmed.
pub fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
