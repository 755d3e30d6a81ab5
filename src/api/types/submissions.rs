//! Submission response types and list parameters

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::envelope::format_timestamp;
use super::error::ApiError;
use super::forms::FormSummary;
use crate::domain::field::{should_skip, FieldTypeTag, FieldValueTransformer, NormalizedFieldValue};
use crate::domain::form::{Form, Submission, SubmissionQuery, DEFAULT_PAGE_SIZE};

/// `GET /submissions` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionsQueryParams {
    pub form_id: Option<u64>,
    /// Takes precedence over `formId`
    pub form_handle: Option<String>,
    /// `live` (default), any other status, or `all`
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl SubmissionsQueryParams {
    /// Handle to resolve before building the query, if any
    pub fn form_handle(&self) -> Option<&str> {
        self.form_handle
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    /// Build the store query; `resolved_form_id` is the id of `formHandle` when given
    pub fn into_query(self, resolved_form_id: Option<u64>) -> Result<SubmissionQuery, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => Some("live".to_string()),
            Some("all") => None,
            Some(other) => Some(other.to_string()),
        };

        let created_from = self
            .date_from
            .as_deref()
            .map(|v| parse_date_bound("dateFrom", v, DateBound::Start))
            .transpose()?;
        let created_to = self
            .date_to
            .as_deref()
            .map(|v| parse_date_bound("dateTo", v, DateBound::End))
            .transpose()?;

        Ok(SubmissionQuery {
            form_id: resolved_form_id.or(self.form_id),
            status,
            created_from,
            created_to,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
            ..Default::default()
        })
    }
}

/// Which end of a range a bare date stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD`
///
/// A bare date used as an end bound covers the whole day.
pub fn parse_date_bound(
    param: &str,
    value: &str,
    bound: DateBound,
) -> Result<DateTime<Utc>, ApiError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = match bound {
            DateBound::Start => NaiveTime::MIN,
            DateBound::End => NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        };
        return Ok(date.and_time(time).and_utc());
    }

    Err(ApiError::bad_request(format!(
        "Invalid {} '{}'. Expected YYYY-MM-DD or an ISO-8601 timestamp",
        param, value
    )))
}

/// One submitted field value
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionField {
    pub label: String,
    pub handle: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: NormalizedFieldValue,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: u64,
    pub uid: Uuid,
    pub form_id: u64,
    pub form_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: String,
    pub date_created: String,
    pub date_updated: String,
    pub fields: BTreeMap<String, SubmissionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormSummary>,
}

impl SubmissionResponse {
    /// Shape a submission against its form layout
    pub fn new(
        submission: &Submission,
        form: Option<&Form>,
        transformer: &FieldValueTransformer,
    ) -> Self {
        let mut fields = BTreeMap::new();

        for (handle, raw) in &submission.values {
            let field = match form.and_then(|f| f.field(handle)) {
                Some(descriptor) if should_skip(&descriptor.type_tag) => continue,
                Some(descriptor) => {
                    let rating = descriptor
                        .rating
                        .as_ref()
                        .filter(|_| descriptor.type_tag == FieldTypeTag::Rating);

                    SubmissionField {
                        label: descriptor.label.clone(),
                        handle: handle.clone(),
                        type_name: descriptor.type_tag.to_string(),
                        value: transformer.normalize(&descriptor.type_tag, raw),
                        required: descriptor.required,
                        min_value: rating.map(|r| r.min_value.to_string()),
                        max_value: rating.map(|r| r.max_value.to_string()),
                        rating_type: rating.map(|r| r.rating_type.clone()),
                    }
                }
                None => SubmissionField {
                    label: handle.clone(),
                    handle: handle.clone(),
                    type_name: "unknown".to_string(),
                    value: NormalizedFieldValue::from_json(raw.to_json()),
                    required: false,
                    min_value: None,
                    max_value: None,
                    rating_type: None,
                },
            };

            fields.insert(handle.clone(), field);
        }

        Self {
            id: submission.id,
            uid: submission.uid,
            form_id: submission.form_id,
            form_handle: form.map(|f| f.handle.clone()),
            title: submission.title.clone(),
            status: submission.status.clone(),
            date_created: format_timestamp(submission.date_created),
            date_updated: format_timestamp(submission.date_updated),
            fields,
            form: None,
        }
    }

    pub fn with_form(mut self, summary: FormSummary) -> Self {
        self.form = Some(summary);
        self
    }
}
