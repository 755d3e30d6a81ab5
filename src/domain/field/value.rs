//! Raw field values as delivered by the form store

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<FixedOffset>),
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Bool(b) => Value::Bool(*b),
            Self::DateTime(dt) => Value::String(format_iso8601(dt)),
        }
    }

    /// String rendering used when a scalar is spliced into text
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => String::new(),
            Self::DateTime(dt) => format_iso8601(dt),
        }
    }
}

/// Untyped field value: closed over the shapes a store can produce
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawFieldValue {
    #[default]
    Null,
    Scalar(Scalar),
    Sequence(Vec<RawFieldValue>),
    KeyedMap(BTreeMap<String, RawFieldValue>),
}

impl RawFieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::Scalar(Scalar::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }

    pub fn datetime(value: DateTime<FixedOffset>) -> Self {
        Self::Scalar(Scalar::DateTime(value))
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawFieldValue)>,
    {
        Self::KeyedMap(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `null` or the empty string
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Scalar(Scalar::Text(s)) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Member of a keyed map, skipping explicit nulls
    pub fn member(&self, key: &str) -> Option<&RawFieldValue> {
        match self {
            Self::KeyedMap(map) => map.get(key).filter(|v| !v.is_null()),
            _ => None,
        }
    }

    /// First element of a sequence, skipping an explicit null
    pub fn first(&self) -> Option<&RawFieldValue> {
        match self {
            Self::Sequence(items) => items.first().filter(|v| !v.is_null()),
            _ => None,
        }
    }

    /// Text rendering; null and structured values become the empty string
    pub fn to_text(&self) -> String {
        match self {
            Self::Scalar(scalar) => scalar.to_text(),
            _ => String::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(scalar) => scalar.to_json(),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::KeyedMap(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for RawFieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::integer(i),
                None => n.as_f64().map(Self::float).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::text(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::KeyedMap(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<RawFieldValue> for Value {
    fn from(value: RawFieldValue) -> Self {
        value.to_json()
    }
}

/// ISO-8601 with explicit offset, e.g. `2025-03-01T09:30:00+00:00`
pub fn format_iso8601(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}
