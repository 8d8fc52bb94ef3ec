//! Field descriptors
//!
//! A [`FieldDescriptor`] declares one attribute of an entity: its wire name, its
//! [`FieldKind`] and whether it can be written. Descriptors are `const` so each
//! entity schema is a plain static table.
//!
//! Descriptors do three jobs:
//!
//! - validate values assigned through [`Model::set`](super::Model::set)
//! - convert wire JSON into internal [`Value`]s (`to_internal_value`)
//! - convert internal values back into wire JSON (`to_record_value`)
//!
//! For every representable value `to_internal_value(to_record_value(v)) == v`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Timelike, Utc};
use serde_json::{Number, Value as JsonValue};
use thiserror::Error;

use super::types::StructKind;
use super::value::Value;

/// Errors raised while assigning or decoding a field value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{descriptor} '{field}' does not accept {got} value {value}")]
    InvalidType {
        field: &'static str,
        descriptor: String,
        got: &'static str,
        value: String,
    },

    #[error("'{field}' is read-only")]
    ReadOnly { field: &'static str },

    #[error("invalid value for '{field}': {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{entity} has no field '{name}'")]
    UnknownField { entity: &'static str, name: String },
}

/// Element type of a list field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Integer,
    Text,
    /// Ids that are numeric on some endpoints and UUIDs on others
    IntegerOrText,
    Struct(StructKind),
}

/// Value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bytes,
    /// Integer or float
    Number,
    Float,
    Integer,
    Boolean,
    DateTime,
    Date,
    Time,
    Duration,
    /// Free-form JSON, passed through untouched
    Json,
    Struct(StructKind),
    List(ElementKind),
}

/// Transforming check run after type validation
pub type Validator = fn(&FieldDescriptor, Value) -> Result<Value, FieldError>;

/// Declaration of one entity attribute
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Name used by callers (`model.set(attribute, ..)`)
    pub attribute: &'static str,
    /// Key in the API payload
    pub field_name: &'static str,
    pub kind: FieldKind,
    pub readonly: bool,
    pub validate_type: bool,
    /// Value lives under the record's `custom_fields` object
    pub custom: bool,
    pub validators: &'static [Validator],
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Text => "Text",
            Self::IntegerOrText => "IntegerOrText",
            Self::Struct(kind) => kind.name(),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Integer, Value::Integer(_)) => true,
            (Self::Text, Value::Text(_)) => true,
            (Self::IntegerOrText, Value::Integer(_) | Value::Text(_)) => true,
            (Self::Struct(kind), Value::Struct(s)) => s.kind() == *kind,
            (_, Value::Json(json)) => self.from_wire(json).is_ok(),
            _ => false,
        }
    }

    fn from_wire(&self, wire: &JsonValue) -> Result<Value, String> {
        match (self, wire) {
            (Self::Integer | Self::IntegerOrText, JsonValue::Number(n)) if n.is_i64() => {
                Ok(Value::Integer(n.as_i64().unwrap_or_default()))
            }
            (Self::Text | Self::IntegerOrText, JsonValue::String(s)) => Ok(Value::Text(s.clone())),
            (Self::Struct(kind), json) => kind
                .parse(json)
                .map(Value::Struct)
                .map_err(|e| e.to_string()),
            (kind, other) => Err(format!("{} is not a valid {} element", other, kind.name())),
        }
    }

    fn coerce(&self, value: Value) -> Result<Value, String> {
        match value {
            Value::Json(json) => self.from_wire(&json),
            other => Ok(other),
        }
    }
}

impl FieldKind {
    /// Class-style name used in error messages, e.g. `IntegerField`
    pub fn descriptor_name(&self) -> String {
        match self {
            Self::Text => "TextField".to_string(),
            Self::Bytes => "BytesField".to_string(),
            Self::Number => "NumberField".to_string(),
            Self::Float => "FloatField".to_string(),
            Self::Integer => "IntegerField".to_string(),
            Self::Boolean => "BooleanField".to_string(),
            Self::DateTime => "DatetimeField".to_string(),
            Self::Date => "DateField".to_string(),
            Self::Time => "TimeField".to_string(),
            Self::Duration => "DurationField".to_string(),
            Self::Json => "JsonField".to_string(),
            Self::Struct(kind) => format!("{}Field", kind.name()),
            Self::List(element) => format!("ListField<{}>", element.name()),
        }
    }

    /// Value used when the wire value is absent or null
    pub fn missing_value(&self) -> Value {
        match self {
            Self::List(_) => Value::List(Vec::new()),
            Self::Struct(kind) => Value::Struct(kind.empty()),
            _ => Value::Null,
        }
    }
}

impl FieldDescriptor {
    pub const fn new(field_name: &'static str, kind: FieldKind) -> Self {
        Self {
            attribute: field_name,
            field_name,
            kind,
            readonly: false,
            validate_type: true,
            custom: false,
            validators: &[],
        }
    }

    pub const fn text(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Text)
    }

    pub const fn bytes(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Bytes)
    }

    pub const fn number(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Number)
    }

    pub const fn float(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Float)
    }

    pub const fn integer(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Integer)
    }

    pub const fn boolean(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Boolean)
    }

    pub const fn datetime(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::DateTime)
    }

    pub const fn date(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Date)
    }

    pub const fn time(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Time)
    }

    pub const fn duration(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Duration)
    }

    pub const fn json(field_name: &'static str) -> Self {
        Self::new(field_name, FieldKind::Json)
    }

    pub const fn structured(field_name: &'static str, kind: StructKind) -> Self {
        Self::new(field_name, FieldKind::Struct(kind))
    }

    pub const fn list(field_name: &'static str, element: ElementKind) -> Self {
        Self::new(field_name, FieldKind::List(element))
    }

    pub const fn readonly(self) -> Self {
        Self {
            readonly: true,
            ..self
        }
    }

    /// Skip kind validation; unparseable wire values become the missing value
    pub const fn unchecked(self) -> Self {
        Self {
            validate_type: false,
            ..self
        }
    }

    /// Expose the field under a different attribute name
    pub const fn named(self, attribute: &'static str) -> Self {
        Self { attribute, ..self }
    }

    /// Custom field: `field_name` is the Pipedrive field key (a hash), the
    /// value is read from and written to `custom_fields`
    pub const fn custom(self, attribute: &'static str) -> Self {
        Self {
            attribute,
            custom: true,
            ..self
        }
    }

    pub const fn with_validators(self, validators: &'static [Validator]) -> Self {
        Self { validators, ..self }
    }

    pub fn missing_value(&self) -> Value {
        self.kind.missing_value()
    }

    /// Whether `value` may be assigned to this field
    pub fn accepts(&self, value: &Value) -> bool {
        use FieldKind as K;

        match (self.kind, value) {
            (_, Value::Null) => true,
            (K::Json, _) => true,
            (K::Text, Value::Text(_)) => true,
            (K::Bytes, Value::Bytes(_)) => true,
            (K::Number, Value::Integer(_) | Value::Float(_)) => true,
            (K::Float, Value::Float(_)) => true,
            (K::Integer, Value::Integer(_)) => true,
            (K::Integer, Value::Text(s)) => is_digits(s),
            (K::Boolean, Value::Boolean(_)) => true,
            (K::DateTime, Value::DateTime(_)) => true,
            (K::DateTime, Value::Text(s)) => parse_datetime(s).is_some(),
            (K::Date, Value::Date(_)) => true,
            (K::Date, Value::Text(s)) => parse_date(s).is_some(),
            (K::Time, Value::Time(_)) => true,
            (K::Time, Value::Text(s)) => parse_time(s).is_some(),
            (K::Duration, Value::Duration(_)) => true,
            (K::Duration, Value::Text(s)) => parse_duration(s).is_some(),
            (K::Struct(kind), Value::Struct(s)) => s.kind() == kind,
            (K::Struct(kind), Value::Json(json)) => kind.parse(json).is_ok(),
            (K::List(element), Value::List(items)) => items.iter().all(|i| element.accepts(i)),
            (K::List(element), Value::Json(JsonValue::Array(items))) => {
                items.iter().all(|i| element.from_wire(i).is_ok())
            }
            (K::List(_), Value::Json(_)) => false,
            // Raw wire values are accepted when they convert
            (_, Value::Json(json)) => self.from_wire(json).is_ok(),
            _ => false,
        }
    }

    /// Check and normalize a value assigned by the caller
    pub fn clean(&self, value: Value) -> Result<Value, FieldError> {
        if self.readonly {
            return Err(FieldError::ReadOnly {
                field: self.attribute,
            });
        }
        if self.validate_type && !self.accepts(&value) {
            return Err(FieldError::InvalidType {
                field: self.attribute,
                descriptor: self.kind.descriptor_name(),
                got: value.type_name(),
                value: value.to_string(),
            });
        }

        let value = self.coerce(value)?;
        if value.is_null() {
            return Ok(value);
        }
        self.validators
            .iter()
            .try_fold(value, |value, validator| validator(self, value))
    }

    fn coerce(&self, value: Value) -> Result<Value, FieldError> {
        use FieldKind as K;

        let converted = match (self.kind, &value) {
            (K::Json, _) => return Ok(value),
            (_, Value::Json(json)) => self.from_wire(json),
            (K::Integer | K::DateTime | K::Date | K::Time | K::Duration, Value::Text(s)) => {
                self.from_wire(&JsonValue::String(s.clone()))
            }
            (K::List(element), Value::List(items)) => items
                .iter()
                .cloned()
                .map(|item| element.coerce(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            _ => return Ok(value),
        };

        match converted {
            Ok(converted) => Ok(converted),
            Err(reason) if self.validate_type => Err(self.invalid_value(&value.to_string(), reason)),
            Err(reason) => {
                log::warn!("{} '{}': {}", self.kind.descriptor_name(), self.attribute, reason);
                Ok(value)
            }
        }
    }

    /// Convert a wire value into its internal representation
    pub fn to_internal_value(&self, wire: &JsonValue) -> Result<Value, FieldError> {
        match self.from_wire(wire) {
            Ok(value) => Ok(value),
            Err(reason) if self.validate_type => Err(self.invalid_value(&wire.to_string(), reason)),
            Err(reason) => {
                log::warn!(
                    "{} '{}': {}, using the missing value",
                    self.kind.descriptor_name(),
                    self.attribute,
                    reason
                );
                Ok(self.missing_value())
            }
        }
    }

    /// Convert an internal value into its wire representation
    pub fn to_record_value(&self, value: &Value) -> JsonValue {
        match (self.kind, value) {
            (FieldKind::List(_), Value::Null) => JsonValue::Array(Vec::new()),
            (FieldKind::Struct(_), Value::Null) => JsonValue::Object(Default::default()),
            (_, value) => value_to_json(value),
        }
    }

    fn invalid_value(&self, value: &str, reason: String) -> FieldError {
        FieldError::InvalidValue {
            field: self.attribute,
            value: value.to_string(),
            reason,
        }
    }

    fn from_wire(&self, wire: &JsonValue) -> Result<Value, String> {
        use FieldKind as K;

        if wire.is_null() {
            return Ok(self.missing_value());
        }
        let unexpected = || format!("unexpected {} value {}", self.kind.descriptor_name(), wire);

        match (self.kind, wire) {
            (K::Json, json) => Ok(Value::Json(json.clone())),

            (K::Text, JsonValue::String(s)) => Ok(Value::Text(s.clone())),
            (K::Text, JsonValue::Number(n)) => Ok(Value::Text(n.to_string())),
            (K::Text, JsonValue::Bool(b)) => Ok(Value::Text(b.to_string())),

            (K::Bytes, JsonValue::String(s)) => Ok(Value::Bytes(s.as_bytes().to_vec())),

            (K::Number, JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Value::Integer(i)),
                None => n.as_f64().map(Value::Float).ok_or_else(unexpected),
            },
            (K::Number, JsonValue::String(s)) => {
                if let Ok(i) = s.trim().parse::<i64>() {
                    Ok(Value::Integer(i))
                } else {
                    s.trim().parse::<f64>().map(Value::Float).map_err(|_| unexpected())
                }
            }

            (K::Float, JsonValue::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(unexpected),
            (K::Float, JsonValue::String(s)) => {
                s.trim().parse::<f64>().map(Value::Float).map_err(|_| unexpected())
            }

            (K::Integer, JsonValue::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(Value::Integer(i)),
                (None, Some(f)) if f.fract() == 0.0 && (I64_MIN_F64..I64_MAX_F64).contains(&f) => {
                    Ok(Value::Integer(f as i64))
                }
                _ => Err(unexpected()),
            },
            // v1 expands related records: `{"name": "Acme", "value": 5}`
            (K::Integer, JsonValue::Object(map)) => match related_id(map) {
                Some(id) => self.from_wire(id),
                None => Err(unexpected()),
            },
            (K::Integer, JsonValue::String(s)) if s.is_empty() => Ok(Value::Null),
            (K::Integer, JsonValue::String(s)) if is_digits(s) => {
                s.parse::<i64>().map(Value::Integer).map_err(|e| e.to_string())
            }

            (K::Boolean, JsonValue::Bool(b)) => Ok(Value::Boolean(*b)),
            (K::Boolean, JsonValue::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Value::Boolean(false)),
                Some(1) => Ok(Value::Boolean(true)),
                _ => Err(unexpected()),
            },

            (K::DateTime | K::Date | K::Time | K::Duration, JsonValue::String(s)) if s.is_empty() => {
                Ok(Value::Null)
            }
            (K::DateTime, JsonValue::String(s)) => {
                parse_datetime(s).map(Value::DateTime).ok_or_else(unexpected)
            }
            (K::Date, JsonValue::String(s)) => parse_date(s).map(Value::Date).ok_or_else(unexpected),
            (K::Time, JsonValue::String(s)) => parse_time(s).map(Value::Time).ok_or_else(unexpected),
            (K::Duration, JsonValue::String(s)) => {
                parse_duration(s).map(Value::Duration).ok_or_else(unexpected)
            }

            (K::Struct(kind), json) => kind
                .parse(json)
                .map(Value::Struct)
                .map_err(|e| format!("{}: {}", unexpected(), e)),

            (K::List(element), JsonValue::Array(items)) => items
                .iter()
                .map(|item| element.from_wire(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),

            _ => Err(unexpected()),
        }
    }
}

/// Serialize an internal value the way the API expects it
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::DateTime(dt) => JsonValue::String(format_datetime(dt)),
        Value::Date(d) => JsonValue::String(format_date(d)),
        Value::Time(t) => JsonValue::String(format_time(t)),
        Value::Duration(d) => JsonValue::String(format_duration(d)),
        Value::Struct(s) => s.to_json(),
        Value::List(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Json(json) => json.clone(),
    }
}

/// `2014-09-05T12:34:56.000Z`
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `HH:MM`, or `HH:MM:SS` when seconds are set
pub fn format_time(time: &NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// `HH:MM` (`HH:MM:SS` when seconds are set), hours are not wrapped at 24
pub fn format_duration(duration: &TimeDelta) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    let (hours, minutes, rest) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if rest == 0 {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, rest)
    }
}

/// ISO-8601 datetime; naive values are taken as UTC and a bare date is
/// midnight
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD` only
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `HH:MM`, seconds tolerated
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// `HH:MM` (or `HH:MM:SS`) with hours possibly above 23
pub fn parse_duration(s: &str) -> Option<TimeDelta> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| !is_digits(p)) {
        return None;
    }
    let hours: i64 = parts[0].parse().ok()?;
    let minutes: i64 = parts[1].parse().ok()?;
    let seconds: i64 = parts.get(2).map_or(Some(0), |s| s.parse().ok())?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    let total = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
    TimeDelta::try_seconds(total)
}

const I64_MIN_F64: f64 = i64::MIN as f64;
/// 2^63, the first float above `i64::MAX`
const I64_MAX_F64: f64 = i64::MAX as f64;

/// Id of an expanded related record: its `value`, else its `id`
fn related_id(map: &serde_json::Map<String, JsonValue>) -> Option<&JsonValue> {
    ["value", "id"]
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|id| id.is_i64() || id.is_u64())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::types::{Address, LabelValue, Struct};
    use chrono::TimeZone;
    use serde_json::json;

    const LABEL_IDS: FieldDescriptor = FieldDescriptor::list("label_ids", ElementKind::IntegerOrText);
    const PHONES: FieldDescriptor =
        FieldDescriptor::list("phones", ElementKind::Struct(StructKind::LabelValue));

    fn round_trip(descriptor: &FieldDescriptor, value: Value) {
        let wire = descriptor.to_record_value(&value);
        assert_eq!(descriptor.to_internal_value(&wire).unwrap(), value, "wire: {}", wire);
    }

    #[test]
    fn test_readonly_rejects_any_write() {
        let field = FieldDescriptor::integer("count").readonly();
        assert_eq!(
            field.clean(Value::Integer(1)),
            Err(FieldError::ReadOnly { field: "count" })
        );
        assert!(field.clean(Value::Null).is_err());
    }

    #[test]
    fn test_integer_rejects_bool_and_float() {
        let field = FieldDescriptor::integer("count");
        assert!(matches!(
            field.clean(Value::Boolean(true)),
            Err(FieldError::InvalidType { got: "Boolean", .. })
        ));
        assert!(field.clean(Value::Float(1.5)).is_err());
        assert!(field.clean(Value::from("12a")).is_err());
    }

    #[test]
    fn test_integer_coerces_digit_strings() {
        let field = FieldDescriptor::integer("count");
        assert_eq!(field.clean(Value::from("42")).unwrap(), Value::Integer(42));
        assert_eq!(field.clean(Value::Integer(7)).unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_number_accepts_int_and_float_but_not_bool() {
        let field = FieldDescriptor::number("value");
        assert!(field.clean(Value::Integer(3)).is_ok());
        assert!(field.clean(Value::Float(3.5)).is_ok());
        assert!(field.clean(Value::Boolean(false)).is_err());
        assert!(field.clean(Value::from("3")).is_err());
    }

    #[test]
    fn test_float_only_accepts_float() {
        let field = FieldDescriptor::float("acv");
        assert!(field.clean(Value::Float(1.0)).is_ok());
        assert!(field.clean(Value::Integer(1)).is_err());
    }

    #[test]
    fn test_date_rejects_datetime() {
        let field = FieldDescriptor::date("expected_close_date");
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert!(field.clean(Value::DateTime(now)).is_err());
        assert!(field.clean(Value::from("2025-01-02T03:04:05Z")).is_err());
        assert_eq!(
            field.clean(Value::from("2025-01-02")).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_datetime_accepts_iso_text() {
        let field = FieldDescriptor::datetime("due");
        let expected = Utc.with_ymd_and_hms(2025, 2, 10, 18, 6, 6).unwrap();
        assert_eq!(field.clean(Value::from("2025-02-10T18:06:06Z")).unwrap(), Value::DateTime(expected));
        assert_eq!(field.clean(Value::from("2025-02-10 18:06:06")).unwrap(), Value::DateTime(expected));
        assert!(field.clean(Value::from("yesterday")).is_err());
    }

    #[test]
    fn test_time_and_duration_accept_hh_mm() {
        let time = FieldDescriptor::time("due_time");
        assert_eq!(
            time.clean(Value::from("09:30")).unwrap(),
            Value::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
        );
        assert!(time.clean(Value::from("25:00")).is_err());

        let duration = FieldDescriptor::duration("duration");
        assert_eq!(
            duration.clean(Value::from("26:15")).unwrap(),
            Value::Duration(TimeDelta::minutes(26 * 60 + 15))
        );
        assert!(duration.clean(Value::from("1:75")).is_err());
        assert!(duration.clean(Value::Integer(90)).is_err());
    }

    #[test]
    fn test_struct_field_accepts_matching_struct_or_object() {
        let field = FieldDescriptor::structured("address", StructKind::Address);
        let address = Address {
            locality: Some("Tartu".into()),
            ..Default::default()
        };
        assert!(field.clean(Value::from(address.clone())).is_ok());
        assert_eq!(
            field.clean(Value::from(json!({"locality": "Tartu"}))).unwrap(),
            Value::from(address)
        );
        assert!(field.clean(Value::from(LabelValue::default())).is_err());
        assert!(field.clean(Value::from("Tartu")).is_err());
    }

    #[test]
    fn test_list_field_validates_every_element() {
        assert!(LABEL_IDS.clean(Value::List(vec![1.into(), "a-uuid".into()])).is_ok());
        assert!(LABEL_IDS.clean(Value::List(vec![1.into(), true.into()])).is_err());
        assert_eq!(
            LABEL_IDS.clean(Value::from(json!([1, 2]))).unwrap(),
            Value::List(vec![1.into(), 2.into()])
        );
        assert!(LABEL_IDS.clean(Value::from(json!([1, 2.5]))).is_err());

        let phones = PHONES.clean(Value::from(json!([{"value": "+372 555", "primary": true}]))).unwrap();
        let Value::List(items) = phones else { panic!("expected a list") };
        assert!(matches!(items[0], Value::Struct(Struct::LabelValue(_))));
    }

    #[test]
    fn test_null_is_always_assignable() {
        assert_eq!(FieldDescriptor::integer("n").clean(Value::Null).unwrap(), Value::Null);
        assert_eq!(FieldDescriptor::date("d").clean(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(LABEL_IDS.to_internal_value(&json!(null)).unwrap(), Value::List(vec![]));
        let address = FieldDescriptor::structured("address", StructKind::Address);
        assert_eq!(
            address.to_internal_value(&json!(null)).unwrap(),
            Value::Struct(StructKind::Address.empty())
        );
        assert_eq!(FieldDescriptor::text("t").to_internal_value(&json!(null)).unwrap(), Value::Null);
        assert_eq!(LABEL_IDS.to_record_value(&Value::Null), json!([]));
    }

    #[test]
    fn test_datetime_wire_format() {
        let field = FieldDescriptor::datetime("add_time");
        let dt = Utc.with_ymd_and_hms(2014, 9, 5, 12, 34, 56).unwrap();
        assert_eq!(field.to_record_value(&Value::DateTime(dt)), json!("2014-09-05T12:34:56.000Z"));
        assert_eq!(
            field.to_internal_value(&json!("2014-09-05T14:34:56+02:00")).unwrap(),
            Value::DateTime(dt)
        );
    }

    #[test]
    fn test_round_trips() {
        let dt = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 1).unwrap()
            + TimeDelta::milliseconds(250);
        round_trip(&FieldDescriptor::datetime("a"), Value::DateTime(dt));
        round_trip(
            &FieldDescriptor::date("b"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        );
        round_trip(
            &FieldDescriptor::time("c"),
            Value::Time(NaiveTime::from_hms_opt(7, 5, 0).unwrap()),
        );
        round_trip(&FieldDescriptor::duration("d"), Value::Duration(TimeDelta::minutes(125)));
        round_trip(
            &FieldDescriptor::structured("e", StructKind::Address),
            Value::from(Address {
                route: Some("Main".into()),
                postal_code: Some("10111".into()),
                ..Default::default()
            }),
        );
        round_trip(&LABEL_IDS, Value::List(vec![5.into(), "x".into()]));
        round_trip(&FieldDescriptor::number("f"), Value::Float(12.5));
        round_trip(&FieldDescriptor::boolean("g"), Value::Boolean(true));
    }

    #[test]
    fn test_integer_reads_expanded_related_record() {
        let org_id = FieldDescriptor::integer("org_id");
        assert_eq!(
            org_id
                .to_internal_value(&json!({"name": "Acme", "people_count": 2, "owner_id": 9, "value": 5}))
                .unwrap(),
            Value::Integer(5)
        );
        let user_id = FieldDescriptor::integer("user_id");
        assert_eq!(
            user_id.to_internal_value(&json!({"id": 1, "name": "Ann", "value": 1})).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(user_id.to_internal_value(&json!({"id": 4, "name": "Bo"})).unwrap(), Value::Integer(4));
        assert!(user_id.to_internal_value(&json!({"name": "Nobody"})).is_err());
        assert_eq!(
            user_id.clean(Value::from(json!({"name": "Ann", "value": 3}))).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_integer_rejects_out_of_range_floats() {
        let field = FieldDescriptor::integer("count");
        assert_eq!(field.to_internal_value(&json!(12.0)).unwrap(), Value::Integer(12));
        assert!(field.to_internal_value(&json!(1e30)).is_err());
        assert!(field.to_internal_value(&json!(-1e30)).is_err());
    }

    #[test]
    fn test_seconds_survive_round_trips() {
        round_trip(
            &FieldDescriptor::time("due_time"),
            Value::Time(NaiveTime::from_hms_opt(7, 5, 30).unwrap()),
        );
        round_trip(&FieldDescriptor::duration("duration"), Value::Duration(TimeDelta::seconds(90)));
        assert_eq!(format_duration(&TimeDelta::seconds(90)), "00:01:30");
        assert_eq!(format_duration(&TimeDelta::minutes(90)), "01:30");
        assert_eq!(format_time(&NaiveTime::from_hms_opt(11, 30, 0).unwrap()), "11:30");
    }

    #[test]
    fn test_unchecked_field_falls_back_to_missing_value() {
        let strict = FieldDescriptor::datetime("when");
        assert!(strict.to_internal_value(&json!("not a date")).is_err());

        let lenient = FieldDescriptor::datetime("when").unchecked();
        assert_eq!(lenient.to_internal_value(&json!("not a date")).unwrap(), Value::Null);
        assert!(lenient.clean(Value::Boolean(true)).is_ok());
    }

    #[test]
    fn test_validators_run_after_type_check() {
        fn upper(_: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
            Ok(match value {
                Value::Text(s) => Value::Text(s.to_uppercase()),
                other => other,
            })
        }
        const CODE: FieldDescriptor = FieldDescriptor::text("code").with_validators(&[upper]);

        assert_eq!(CODE.clean(Value::from("eur")).unwrap(), Value::from("EUR"));
        assert!(CODE.clean(Value::Integer(1)).is_err());
    }

    #[test]
    fn test_error_message_names_field_and_value() {
        let err = FieldDescriptor::integer("count")
            .clean(Value::Boolean(true))
            .unwrap_err();
        assert_eq!(err.to_string(), "IntegerField 'count' does not accept Boolean value true");
    }
}
