//! Request and parameter validation.
//!
//! Validation failures are caller mistakes, detected at the boundary
//! nearest the caller before any handler runs. They surface as 400s with
//! a human-readable message and are never logged as server faults.

use serde_json::Value;

use crate::api::ApiRequest;
use crate::error::ValidationError;

/// Check that every required parameter is present on the request:
/// query args for GET, JSON body keys for POST.
///
/// Returns `Ok(())` when all are present, the listing error when some are
/// missing, and the shape error when the request is neither GET with
/// query parameters nor POST with a JSON object body.
pub fn validate_params(request: &ApiRequest, required: &[&str]) -> Result<(), ValidationError> {
    let missing: Vec<String> = match request {
        ApiRequest::Get { query } => required
            .iter()
            .filter(|name| !query.contains_key(**name))
            .map(|name| name.to_string())
            .collect(),
        ApiRequest::PostJson { body } => {
            let Some(object) = body.as_object() else {
                return Err(ValidationError::UnsupportedShape);
            };
            required
                .iter()
                .filter(|name| !object.contains_key(**name))
                .map(|name| name.to_string())
                .collect()
        }
        ApiRequest::Unsupported => return Err(ValidationError::UnsupportedShape),
    };

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingParameters { params: missing })
    }
}

/// Check that a raw document contains all required fields. Dot notation
/// descends into nested objects (`"queryResult.intent"`).
pub fn validate_document_fields(
    document: &Value,
    required_fields: &[&str],
) -> Result<(), ValidationError> {
    let mut missing = Vec::new();

    for field in required_fields {
        let mut cursor = document;
        let mut found = true;
        for part in field.split('.') {
            match cursor.get(part) {
                Some(next) => cursor = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if !found {
            missing.push(field.to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { fields: missing })
    }
}

/// Check that `value` is one of the allowed values.
pub fn validate_enum_value(
    value: &str,
    allowed: &[&str],
    field: &str,
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let mut sorted: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
    sorted.sort();
    Err(ValidationError::InvalidEnumValue {
        field: field.to_string(),
        value: value.to_string(),
        allowed: sorted,
    })
}

/// Check that a numeric value falls inside the optional bounds.
pub fn validate_numeric_range(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    field: &str,
) -> Result<(), ValidationError> {
    if let Some(min) = min {
        if value < min {
            return Err(ValidationError::ValueTooLow {
                field: field.to_string(),
                min,
                actual: value,
            });
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::ValueTooHigh {
                field: field.to_string(),
                max,
                actual: value,
            });
        }
    }
    Ok(())
}

/// Check that a string's character count falls inside the optional bounds.
pub fn validate_string_length(
    value: &str,
    min: Option<usize>,
    max: Option<usize>,
    field: &str,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if let Some(min) = min {
        if actual < min {
            return Err(ValidationError::StringTooShort {
                field: field.to_string(),
                min,
                actual,
            });
        }
    }
    if let Some(max) = max {
        if actual > max {
            return Err(ValidationError::StringTooLong {
                field: field.to_string(),
                max,
                actual,
            });
        }
    }
    Ok(())
}

/// Check that a list's length falls inside the optional bounds.
pub fn validate_list_length<T>(
    values: &[T],
    min: Option<usize>,
    max: Option<usize>,
    field: &str,
) -> Result<(), ValidationError> {
    let actual = values.len();
    if let Some(min) = min {
        if actual < min {
            return Err(ValidationError::ListTooShort {
                field: field.to_string(),
                min,
                actual,
            });
        }
    }
    if let Some(max) = max {
        if actual > max {
            return Err(ValidationError::ListTooLong {
                field: field.to_string(),
                max,
                actual,
            });
        }
    }
    Ok(())
}
