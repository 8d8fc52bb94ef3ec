//! Value validators shared by the entity schemas

use super::fields::{FieldDescriptor, FieldError};
use super::value::Value;

fn one_of(field: &FieldDescriptor, value: Value, allowed: &[&str]) -> Result<Value, FieldError> {
    match &value {
        Value::Text(s) if allowed.contains(&s.as_str()) => Ok(value),
        other => Err(FieldError::InvalidValue {
            field: field.attribute,
            value: other.to_string(),
            reason: format!("expected one of {}", allowed.join(", ")),
        }),
    }
}

/// Deal status
pub fn deal_status(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    one_of(field, value, &["open", "won", "lost", "deleted"])
}

/// Lead label color
pub fn lead_label_color(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    one_of(field, value, &["green", "blue", "red", "yellow", "purple", "gray"])
}

/// Goal tracking interval
pub fn goal_interval(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    one_of(field, value, &["weekly", "monthly", "quarterly", "yearly"])
}

/// Outcome of a logged phone call
pub fn call_outcome(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    one_of(
        field,
        value,
        &["connected", "no_answer", "left_message", "left_voicemail", "wrong_number", "busy"],
    )
}

/// Organization relationship type
pub fn relationship_type(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    one_of(field, value, &["parent", "related"])
}

/// Lead and deal visibility: 1 owner only, 3 owner's group, 5 and 7 wider
pub fn visible_to(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    match value {
        Value::Integer(1 | 3 | 5 | 7) => Ok(value),
        other => Err(FieldError::InvalidValue {
            field: field.attribute,
            value: other.to_string(),
            reason: "expected 1, 3, 5 or 7".to_string(),
        }),
    }
}

/// Percentage between 0 and 100
pub fn percentage(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    match value.as_f64() {
        Some(p) if (0.0..=100.0).contains(&p) => Ok(value),
        _ => Err(FieldError::InvalidValue {
            field: field.attribute,
            value: value.to_string(),
            reason: "expected a number between 0 and 100".to_string(),
        }),
    }
}

/// Trims surrounding whitespace and rejects empty text
pub fn non_empty_text(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    match value {
        Value::Text(s) if !s.trim().is_empty() => Ok(Value::Text(s.trim().to_string())),
        other => Err(FieldError::InvalidValue {
            field: field.attribute,
            value: other.to_string(),
            reason: "must not be empty".to_string(),
        }),
    }
}

/// Activity priority
pub fn activity_priority(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    match value {
        Value::Integer(0..=3) => Ok(value),
        other => Err(FieldError::InvalidValue {
            field: field.attribute,
            value: other.to_string(),
            reason: "expected a priority between 0 and 3".to_string(),
        }),
    }
}

/// Three-letter ISO currency code, upper-cased
pub fn currency_code(field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
    match value {
        Value::Text(s) if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(Value::Text(s.to_ascii_uppercase()))
        }
        other => Err(FieldError::InvalidValue {
            field: field.attribute,
            value: other.to_string(),
            reason: "expected a three-letter currency code".to_string(),
        }),
    }
}
