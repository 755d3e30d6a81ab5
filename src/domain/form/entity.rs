//! Form and submission entities

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::field::{FieldTypeTag, RawFieldValue};

/// Publication status of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Enabled,
    Disabled,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scale metadata carried by rating fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingScale {
    pub min_value: i64,
    pub max_value: i64,
    /// `star`, `emoji` or `nps`
    pub rating_type: String,
}

/// Metadata for one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub handle: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_tag: FieldTypeTag,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingScale>,
}

impl FieldDescriptor {
    pub fn new(handle: impl Into<String>, label: impl Into<String>, type_tag: FieldTypeTag) -> Self {
        Self {
            handle: handle.into(),
            label: label.into(),
            type_tag,
            required: false,
            instructions: None,
            rating: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_rating(mut self, rating: RatingScale) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// A page of a multi-page form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPage {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub sort_order: u32,
    #[serde(default)]
    pub field_handles: Vec<String>,
}

/// A form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: u64,
    #[serde(default = "Uuid::new_v4")]
    pub uid: Uuid,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub status: FormStatus,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub pages: Vec<FormPage>,
}

impl Form {
    pub fn field(&self, handle: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.handle == handle)
    }

    /// Fields of a page, in page order; handles missing from the form are skipped
    pub fn page_fields<'a>(&'a self, page: &'a FormPage) -> impl Iterator<Item = &'a FieldDescriptor> {
        page.field_handles.iter().filter_map(|handle| self.field(handle))
    }
}

fn default_submission_status() -> String {
    "live".to_string()
}

/// A stored form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: u64,
    #[serde(default = "Uuid::new_v4")]
    pub uid: Uuid,
    pub form_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_submission_status")]
    pub status: String,
    #[serde(default)]
    pub is_spam: bool,
    #[serde(default)]
    pub is_incomplete: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    /// Raw values keyed by field handle
    #[serde(default)]
    pub values: BTreeMap<String, RawFieldValue>,
}
