//! Field types and the values they store.
//!
//! Raw input arrives as [`serde_json::Value`]. Each [`FieldType`] decides whether
//! a raw value is acceptable and normalizes it into a [`StoredValue`], which is
//! what collections hold and what the storage layer writes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use vellum_types::ContentId;

use crate::{FieldError, FieldResult};

/// Canonical stored and exported form of a `date` value.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical stored and exported form of a `datetime` value.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STRING_MAX_CHARS: usize = 255;

/// The data type of a field.
///
/// Each variant is stored in its own table (see [`FieldType::table`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Short string, at most 255 characters.
    String,
    /// Unbounded string.
    Text,
    Integer,
    Double,
    /// Accepts exactly `true`, `false`, `0`, `1`, `"0"` and `"1"`.
    Boolean,
    Date,
    Datetime,
    /// Reference to another, already persisted, content.
    Entity,
}

impl FieldType {
    /// Every field type, in table creation order.
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Text,
        FieldType::Integer,
        FieldType::Double,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Entity,
    ];

    /// The canonical machine name of this type.
    #[must_use]
    pub const fn machine_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Entity => "entity",
        }
    }

    /// The table holding rows of this type.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::String => "field_string",
            Self::Text => "field_text",
            Self::Integer => "field_integer",
            Self::Double => "field_double",
            Self::Boolean => "field_boolean",
            Self::Date => "field_date",
            Self::Datetime => "field_datetime",
            Self::Entity => "field_entity",
        }
    }

    /// Checks whether `raw` is an acceptable value for this type.
    #[must_use]
    pub fn is_valid(&self, raw: &Value) -> bool {
        self.prepare_value(raw).is_ok()
    }

    /// Validates `raw` and converts it to its stored form.
    pub fn prepare_value(&self, raw: &Value) -> FieldResult<StoredValue> {
        if raw.is_null() {
            return Err(FieldError::invalid(*self, "null is not a value"));
        }

        match self {
            Self::String => match raw {
                Value::String(s) if s.chars().count() <= STRING_MAX_CHARS => {
                    Ok(StoredValue::String(s.clone()))
                }
                Value::String(_) => Err(FieldError::invalid(
                    *self,
                    format!("longer than {STRING_MAX_CHARS} characters"),
                )),
                other => Err(FieldError::invalid(*self, format!("expected a string, got {other}"))),
            },
            Self::Text => match raw {
                Value::String(s) => Ok(StoredValue::Text(s.clone())),
                other => Err(FieldError::invalid(*self, format!("expected a string, got {other}"))),
            },
            Self::Integer => parse_integer(raw)
                .map(StoredValue::Integer)
                .ok_or_else(|| FieldError::invalid(*self, format!("{raw} is not an integer"))),
            Self::Double => parse_double(raw)
                .map(StoredValue::Double)
                .ok_or_else(|| FieldError::invalid(*self, format!("{raw} is not numeric"))),
            Self::Boolean => parse_boolean(raw)
                .map(StoredValue::Boolean)
                .ok_or_else(|| FieldError::invalid(*self, format!("{raw} is not a boolean"))),
            Self::Date => parse_datetime(raw)
                .map(|dt| StoredValue::Date(dt.date()))
                .ok_or_else(|| FieldError::invalid(*self, format!("{raw} is not a date"))),
            Self::Datetime => parse_datetime(raw)
                .map(StoredValue::Datetime)
                .ok_or_else(|| FieldError::invalid(*self, format!("{raw} is not a date-time"))),
            Self::Entity => parse_integer(raw)
                .filter(|id| *id > 0)
                .map(|id| StoredValue::Entity(ContentId::from_raw(id)))
                .ok_or_else(|| {
                    FieldError::invalid(*self, format!("{raw} is not the id of a persisted content"))
                }),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.machine_name())
    }
}

fn parse_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_double(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn parse_boolean(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Parses any accepted date or datetime input, truncated to whole seconds.
fn parse_datetime(raw: &Value) -> Option<NaiveDateTime> {
    parse_datetime_precise(raw)?.with_nanosecond(0)
}

fn parse_datetime_precise(raw: &Value) -> Option<NaiveDateTime> {
    match raw {
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0).map(|dt| dt.naive_utc()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
                return Some(date.and_time(NaiveTime::MIN));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return Some(dt);
            }
            DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

/// A validated, normalized field value.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    String(String),
    Text(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    /// Naive UTC date-time, second precision.
    Datetime(NaiveDateTime),
    Entity(ContentId),
}

impl StoredValue {
    /// The field type this value belongs to.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::String(_) => FieldType::String,
            Self::Text(_) => FieldType::Text,
            Self::Integer(_) => FieldType::Integer,
            Self::Double(_) => FieldType::Double,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Date(_) => FieldType::Date,
            Self::Datetime(_) => FieldType::Datetime,
            Self::Entity(_) => FieldType::Entity,
        }
    }

    /// Converts the value to its external representation.
    ///
    /// Dates and date-times are rendered with [`DATE_FORMAT`] and
    /// [`DATETIME_FORMAT`]; entity references as the bare content id.
    #[must_use]
    pub fn to_export_value(&self) -> Value {
        match self {
            Self::String(s) | Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Double(d) => Value::from(*d),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            Self::Datetime(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
            Self::Entity(id) => Value::from(id.get()),
        }
    }

    /// Returns the string content of `string` and `text` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Datetime(dt) => Some(*dt),
            Self::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_content_id(&self) -> Option<ContentId> {
        match self {
            Self::Entity(id) => Some(*id),
            _ => None,
        }
    }
}
