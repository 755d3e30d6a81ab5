//! Form response types and list parameters

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::envelope::format_timestamp;
use super::error::ApiError;
use crate::domain::form::{FieldDescriptor, Form, FormPage, FormQuery, FormStatus, DEFAULT_PAGE_SIZE};

/// `GET /forms` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormsQueryParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// `enabled` (default), `disabled` or `all`
    pub status: Option<String>,
}

impl FormsQueryParams {
    pub fn into_query(self) -> Result<FormQuery, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => Some(FormStatus::Enabled),
            Some("all") => None,
            Some(other) => Some(FormStatus::parse(other).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "Invalid status '{}'. Expected one of: enabled, disabled, all",
                    other
                ))
            })?),
        };

        Ok(FormQuery {
            status,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Form as listed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: u64,
    pub uid: Uuid,
    pub handle: String,
    pub title: String,
    pub status: FormStatus,
    pub date_created: String,
    pub date_updated: String,
    pub submission_count: usize,
}

impl FormSummary {
    pub fn new(form: &Form, submission_count: usize) -> Self {
        Self {
            id: form.id,
            uid: form.uid,
            handle: form.handle.clone(),
            title: form.title.clone(),
            status: form.status,
            date_created: format_timestamp(form.date_created),
            date_updated: format_timestamp(form.date_updated),
            submission_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldResponse {
    pub handle: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
    pub instructions: Option<String>,
}

impl From<&FieldDescriptor> for FormFieldResponse {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            handle: field.handle.clone(),
            label: field.label.clone(),
            type_name: field.type_tag.to_string(),
            required: field.required,
            instructions: field.instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFieldResponse {
    pub handle: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPageResponse {
    pub id: u64,
    pub name: String,
    pub sort_order: u32,
    pub fields: Vec<PageFieldResponse>,
}

impl FormPageResponse {
    fn new(form: &Form, page: &FormPage) -> Self {
        Self {
            id: page.id,
            name: page.name.clone(),
            sort_order: page.sort_order,
            fields: form
                .page_fields(page)
                .map(|field| PageFieldResponse {
                    handle: field.handle.clone(),
                    label: field.label.clone(),
                    type_name: field.type_tag.to_string(),
                })
                .collect(),
        }
    }
}

/// Single form with its layout
#[derive(Debug, Clone, Serialize)]
pub struct FormDetail {
    #[serde(flatten)]
    pub summary: FormSummary,
    pub fields: Vec<FormFieldResponse>,
    pub pages: Vec<FormPageResponse>,
}

impl FormDetail {
    pub fn new(form: &Form, submission_count: usize) -> Self {
        let mut pages: Vec<&FormPage> = form.pages.iter().collect();
        pages.sort_by_key(|page| page.sort_order);

        Self {
            summary: FormSummary::new(form, submission_count),
            fields: form.fields.iter().map(FormFieldResponse::from).collect(),
            pages: pages
                .into_iter()
                .map(|page| FormPageResponse::new(form, page))
                .collect(),
        }
    }
}
