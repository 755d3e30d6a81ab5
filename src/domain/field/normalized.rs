//! Normalized, JSON-safe field values

use serde::Serialize;
use serde_json::Value;

/// Composite name split into its parts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameValue {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
}

/// One uploaded file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetValue {
    pub filename: Option<String>,
    pub url: Option<String>,
}

/// Output of field normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedFieldValue {
    Null,
    /// String, number or boolean
    Scalar(Value),
    Name(NameValue),
    Assets(Vec<AssetValue>),
    List(Vec<Value>),
    /// Structured value passed through unchanged
    Structured(Value),
}

impl NormalizedFieldValue {
    /// Wrap an arbitrary JSON value in the matching variant
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Array(_) | Value::Object(_) => Self::Structured(value),
            scalar => Self::Scalar(scalar),
        }
    }

    pub fn number(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(|n| Self::Scalar(Value::Number(n)))
            .unwrap_or(Self::Null)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Value::String(value.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(v) | Self::Structured(v) => v.clone(),
            Self::Name(name) => serde_json::json!({
                "firstName": name.first_name,
                "lastName": name.last_name,
                "fullName": name.full_name,
            }),
            Self::Assets(assets) => Value::Array(
                assets
                    .iter()
                    .map(|a| serde_json::json!({ "filename": a.filename, "url": a.url }))
                    .collect(),
            ),
            Self::List(items) => Value::Array(items.clone()),
        }
    }
}
