//! Field value normalization
//!
//! Maps a `(type tag, raw value)` pair to a [`NormalizedFieldValue`] through a
//! dispatch table of [`NormalizationRule`]s. Tags without a registered rule use
//! the fallback rule, so new field types degrade to a readable value instead of
//! failing.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use super::normalized::{AssetValue, NameValue, NormalizedFieldValue};
use super::type_tag::FieldTypeTag;
use super::value::{format_iso8601, RawFieldValue, Scalar};

/// How a field's raw value is shaped for output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationRule {
    /// Numeric-looking values become floats, anything else null
    Numeric,
    /// Dropdown / radio: `value` member or first entry
    SingleChoice,
    /// Checkboxes: each entry's `value` member, order preserved
    MultiChoice,
    /// Date objects rendered as ISO-8601
    DateTime,
    /// `{firstName, lastName, fullName}`
    Name,
    /// `phoneNumber`, falling back to `number`
    Phone,
    /// `email`, falling back to the first entry
    Email,
    /// `[{filename, url}]`
    FileUpload,
    /// Strings unchanged, anything else JSON-encoded into a string
    Passthrough,
}

impl NormalizationRule {
    /// Apply the rule to a non-blank raw value
    pub fn apply(self, raw: &RawFieldValue) -> NormalizedFieldValue {
        match self {
            Self::Numeric => numeric(raw),
            Self::SingleChoice => single_choice(raw),
            Self::MultiChoice => multi_choice(raw),
            Self::DateTime => date_time(raw),
            Self::Name => name(raw),
            Self::Phone => match raw {
                RawFieldValue::KeyedMap(_) => member_or_null(raw, &["phoneNumber", "number"]),
                _ => pass_through(raw),
            },
            Self::Email => match raw {
                RawFieldValue::KeyedMap(_) => member_or_null(raw, &["email"]),
                RawFieldValue::Sequence(_) => raw
                    .first()
                    .map(|v| NormalizedFieldValue::from_json(v.to_json()))
                    .unwrap_or(NormalizedFieldValue::Null),
                _ => pass_through(raw),
            },
            Self::FileUpload => file_upload(raw),
            Self::Passthrough => stringify(raw),
        }
    }
}

/// Dispatch table from field type to normalization rule
#[derive(Debug, Clone)]
pub struct FieldValueTransformer {
    rules: HashMap<FieldTypeTag, NormalizationRule>,
    fallback: NormalizationRule,
}

static DEFAULT_TRANSFORMER: Lazy<FieldValueTransformer> = Lazy::new(FieldValueTransformer::default);

impl FieldValueTransformer {
    /// Empty table; every tag uses the fallback rule
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: NormalizationRule::Passthrough,
        }
    }

    /// Register (or replace) the rule for a tag
    pub fn with_rule(mut self, tag: FieldTypeTag, rule: NormalizationRule) -> Self {
        self.rules.insert(tag, rule);
        self
    }

    /// Rule used for tags without a registered entry
    pub fn with_fallback(mut self, rule: NormalizationRule) -> Self {
        self.fallback = rule;
        self
    }

    pub fn rule_for(&self, tag: &FieldTypeTag) -> NormalizationRule {
        self.rules.get(tag).copied().unwrap_or(self.fallback)
    }

    /// Normalize a raw value for the given field type
    ///
    /// `null` and the empty string short-circuit to null before dispatch.
    pub fn normalize(&self, tag: &FieldTypeTag, raw: &RawFieldValue) -> NormalizedFieldValue {
        if raw.is_blank() {
            return NormalizedFieldValue::Null;
        }

        self.rule_for(tag).apply(raw)
    }
}

impl Default for FieldValueTransformer {
    fn default() -> Self {
        Self::empty()
            .with_rule(FieldTypeTag::Number, NormalizationRule::Numeric)
            .with_rule(FieldTypeTag::Dropdown, NormalizationRule::SingleChoice)
            .with_rule(FieldTypeTag::Radio, NormalizationRule::SingleChoice)
            .with_rule(FieldTypeTag::Checkboxes, NormalizationRule::MultiChoice)
            .with_rule(FieldTypeTag::Date, NormalizationRule::DateTime)
            .with_rule(FieldTypeTag::Name, NormalizationRule::Name)
            .with_rule(FieldTypeTag::Phone, NormalizationRule::Phone)
            .with_rule(FieldTypeTag::Email, NormalizationRule::Email)
            .with_rule(FieldTypeTag::FileUpload, NormalizationRule::FileUpload)
    }
}

/// Normalize with the built-in table, parsing the tag name
pub fn normalize(type_tag: &str, raw: &RawFieldValue) -> NormalizedFieldValue {
    DEFAULT_TRANSFORMER.normalize(&FieldTypeTag::parse(type_tag), raw)
}

fn pass_through(raw: &RawFieldValue) -> NormalizedFieldValue {
    NormalizedFieldValue::from_json(raw.to_json())
}

fn member_or_null(raw: &RawFieldValue, keys: &[&str]) -> NormalizedFieldValue {
    keys.iter()
        .find_map(|key| raw.member(key))
        .map(|v| NormalizedFieldValue::from_json(v.to_json()))
        .unwrap_or(NormalizedFieldValue::Null)
}

fn numeric(raw: &RawFieldValue) -> NormalizedFieldValue {
    let parsed = match raw {
        RawFieldValue::Scalar(Scalar::Integer(i)) => Some(*i as f64),
        RawFieldValue::Scalar(Scalar::Float(f)) => Some(*f),
        RawFieldValue::Scalar(Scalar::Text(s)) => parse_numeric(s),
        _ => None,
    };

    parsed
        .map(NormalizedFieldValue::number)
        .unwrap_or(NormalizedFieldValue::Null)
}

/// Decimal or exponent notation with optional sign and surrounding whitespace
fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();

    if trimmed.is_empty()
        || !trimmed.chars().any(|c| c.is_ascii_digit())
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn single_choice(raw: &RawFieldValue) -> NormalizedFieldValue {
    match raw {
        RawFieldValue::KeyedMap(_) => member_or_null(raw, &["value"]),
        RawFieldValue::Sequence(_) => raw
            .first()
            .map(|v| NormalizedFieldValue::from_json(v.to_json()))
            .unwrap_or(NormalizedFieldValue::Null),
        _ => pass_through(raw),
    }
}

fn multi_choice(raw: &RawFieldValue) -> NormalizedFieldValue {
    match raw {
        RawFieldValue::Sequence(items) => {
            NormalizedFieldValue::List(items.iter().map(choice_value).collect())
        }
        // Keys are kept, members unwrapped like list entries
        RawFieldValue::KeyedMap(entries) => NormalizedFieldValue::Structured(Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), choice_value(item)))
                .collect(),
        )),
        _ => pass_through(raw),
    }
}

fn choice_value(item: &RawFieldValue) -> Value {
    match item.member("value") {
        Some(value) => value.to_json(),
        None => item.to_json(),
    }
}

fn date_time(raw: &RawFieldValue) -> NormalizedFieldValue {
    match raw {
        RawFieldValue::Scalar(Scalar::DateTime(dt)) => NormalizedFieldValue::text(format_iso8601(dt)),
        _ => pass_through(raw),
    }
}

fn name(raw: &RawFieldValue) -> NormalizedFieldValue {
    match raw {
        RawFieldValue::KeyedMap(_) => {
            let first_name = raw.member("firstName").map(RawFieldValue::to_text);
            let last_name = raw.member("lastName").map(RawFieldValue::to_text);
            let full_name = format!(
                "{} {}",
                first_name.as_deref().unwrap_or(""),
                last_name.as_deref().unwrap_or("")
            )
            .trim()
            .to_string();

            NormalizedFieldValue::Name(NameValue {
                first_name,
                last_name,
                full_name,
            })
        }
        _ => pass_through(raw),
    }
}

fn file_upload(raw: &RawFieldValue) -> NormalizedFieldValue {
    let assets: Vec<AssetValue> = match raw {
        RawFieldValue::Sequence(items) => items.iter().filter_map(asset).collect(),
        single => asset(single).into_iter().collect(),
    };

    if assets.is_empty() {
        NormalizedFieldValue::Null
    } else {
        NormalizedFieldValue::Assets(assets)
    }
}

fn asset(raw: &RawFieldValue) -> Option<AssetValue> {
    match raw {
        RawFieldValue::KeyedMap(_) => Some(AssetValue {
            filename: raw.member("filename").map(RawFieldValue::to_text),
            url: raw.member("url").map(RawFieldValue::to_text),
        }),
        RawFieldValue::Scalar(Scalar::Text(filename)) if !filename.is_empty() => Some(AssetValue {
            filename: Some(filename.clone()),
            url: None,
        }),
        _ => None,
    }
}

fn stringify(raw: &RawFieldValue) -> NormalizedFieldValue {
    match raw {
        RawFieldValue::Scalar(Scalar::Text(s)) => NormalizedFieldValue::text(s.clone()),
        other => NormalizedFieldValue::Scalar(Value::String(other.to_json().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    fn raw(value: Value) -> RawFieldValue {
        RawFieldValue::from(value)
    }

    #[test]
    fn test_blank_values_short_circuit() {
        for tag in ["Number", "Name", "FileUpload", "SingleLineText"] {
            assert!(normalize(tag, &RawFieldValue::Null).is_null());
            assert!(normalize(tag, &RawFieldValue::text("")).is_null());
        }
    }

    #[test]
    fn test_numeric() {
        assert_eq!(normalize("Number", &raw(json!("42.5"))).to_json(), json!(42.5));
        assert_eq!(normalize("Number", &raw(json!(" 7 "))).to_json(), json!(7.0));
        assert_eq!(normalize("Number", &raw(json!("1e3"))).to_json(), json!(1000.0));
        assert_eq!(normalize("Number", &raw(json!(3))).to_json(), json!(3.0));
        assert!(normalize("Number", &raw(json!("abc"))).is_null());
        assert!(normalize("Number", &raw(json!("inf"))).is_null());
        assert!(normalize("Number", &raw(json!("."))).is_null());
        assert!(normalize("Number", &raw(json!(true))).is_null());
        assert!(normalize("Number", &raw(json!(["1"]))).is_null());
    }

    #[test]
    fn test_single_choice() {
        assert_eq!(
            normalize("Dropdown", &raw(json!({"value": "red", "label": "Red"}))).to_json(),
            json!("red")
        );
        assert_eq!(
            normalize("Radio", &raw(json!(["first", "second"]))).to_json(),
            json!("first")
        );
        assert_eq!(normalize("Radio", &raw(json!("plain"))).to_json(), json!("plain"));
        assert!(normalize("Dropdown", &raw(json!({"label": "Red"}))).is_null());
    }

    #[test]
    fn test_multi_choice_preserves_order() {
        let result = normalize("Checkboxes", &raw(json!([{"value": "a"}, "b", {"value": "c"}])));
        assert_eq!(result.to_json(), json!(["a", "b", "c"]));

        let unlabeled = normalize("Checkboxes", &raw(json!([{"label": "x"}])));
        assert_eq!(unlabeled.to_json(), json!([{"label": "x"}]));
    }

    #[test]
    fn test_multi_choice_keyed_members() {
        let result = normalize(
            "Checkboxes",
            &raw(json!({"first": {"value": "a", "label": "A"}, "second": "b", "third": {"label": "c"}})),
        );

        assert_eq!(
            result.to_json(),
            json!({"first": "a", "second": "b", "third": {"label": "c"}})
        );
    }

    #[test]
    fn test_date() {
        let dt = DateTime::parse_from_rfc3339("2025-01-15T08:00:00+03:00").unwrap();
        assert_eq!(
            normalize("Date", &RawFieldValue::datetime(dt)).to_json(),
            json!("2025-01-15T08:00:00+03:00")
        );
        assert_eq!(
            normalize("Date", &raw(json!("2025-01-15"))).to_json(),
            json!("2025-01-15")
        );
    }

    #[test]
    fn test_name() {
        let result = normalize("Name", &raw(json!({"firstName": "Jane", "lastName": "Doe"})));
        assert_eq!(
            result.to_json(),
            json!({"firstName": "Jane", "lastName": "Doe", "fullName": "Jane Doe"})
        );

        let partial = normalize("Name", &raw(json!({"lastName": "Doe"})));
        assert_eq!(
            partial.to_json(),
            json!({"firstName": null, "lastName": "Doe", "fullName": "Doe"})
        );

        assert_eq!(normalize("Name", &raw(json!("Jane Doe"))).to_json(), json!("Jane Doe"));
    }

    #[test]
    fn test_phone() {
        assert_eq!(
            normalize("Phone", &raw(json!({"phoneNumber": "+966 5555", "country": "SA"}))).to_json(),
            json!("+966 5555")
        );
        assert_eq!(
            normalize("Phone", &raw(json!({"number": "5555"}))).to_json(),
            json!("5555")
        );
        assert!(normalize("Phone", &raw(json!({"country": "SA"}))).is_null());
        assert_eq!(normalize("Phone", &raw(json!("5555"))).to_json(), json!("5555"));
    }

    #[test]
    fn test_email() {
        assert_eq!(
            normalize("Email", &raw(json!({"email": "a@example.com"}))).to_json(),
            json!("a@example.com")
        );
        assert_eq!(
            normalize("Email", &raw(json!(["b@example.com", "c@example.com"]))).to_json(),
            json!("b@example.com")
        );
        assert_eq!(
            normalize("Email", &raw(json!("d@example.com"))).to_json(),
            json!("d@example.com")
        );
    }

    #[test]
    fn test_file_upload() {
        let result = normalize(
            "FileUpload",
            &raw(json!([
                {"filename": "cv.pdf", "url": "https://cdn.example.com/cv.pdf", "size": 1200},
                {"filename": "photo.jpg"}
            ])),
        );

        assert_eq!(
            result.to_json(),
            json!([
                {"filename": "cv.pdf", "url": "https://cdn.example.com/cv.pdf"},
                {"filename": "photo.jpg", "url": null}
            ])
        );
        assert!(normalize("FileUpload", &raw(json!([]))).is_null());
    }

    #[test]
    fn test_default_rule() {
        assert_eq!(
            normalize("SingleLineText", &raw(json!("hello"))).to_json(),
            json!("hello")
        );
        assert_eq!(normalize("Rating", &raw(json!(4))).to_json(), json!("4"));
        assert_eq!(
            normalize("Agree", &raw(json!({"checked": true}))).to_json(),
            json!(r#"{"checked":true}"#)
        );
    }

    #[test]
    fn test_custom_rule_registration() {
        let transformer = FieldValueTransformer::default()
            .with_rule(FieldTypeTag::Rating, NormalizationRule::Numeric);

        assert_eq!(
            transformer
                .normalize(&FieldTypeTag::Rating, &raw(json!("4")))
                .to_json(),
            json!(4.0)
        );
        assert_eq!(
            transformer.rule_for(&FieldTypeTag::Other("Signature".into())),
            NormalizationRule::Passthrough
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let value = raw(json!({"firstName": "Jane", "lastName": "Doe"}));
        assert_eq!(normalize("Name", &value), normalize("Name", &value));
    }
}
