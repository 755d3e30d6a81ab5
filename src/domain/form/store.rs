//! Form store trait and query types

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{Form, FormStatus, Submission};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// How a single form is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormLookup {
    Id(u64),
    Handle(String),
}

impl FormLookup {
    /// Numeric strings address by id, anything else by handle
    pub fn parse(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Handle(value.to_string()),
        }
    }
}

impl std::fmt::Display for FormLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "ID {}", id),
            Self::Handle(handle) => write!(f, "handle '{}'", handle),
        }
    }
}

/// Form listing filter
#[derive(Debug, Clone, PartialEq)]
pub struct FormQuery {
    /// `None` lists every status
    pub status: Option<FormStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for FormQuery {
    fn default() -> Self {
        Self {
            status: Some(FormStatus::Enabled),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Submission listing filter; results are ordered newest first
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionQuery {
    pub form_id: Option<u64>,
    /// `None` lists every status
    pub status: Option<String>,
    /// Inclusive lower bound on creation time
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub created_to: Option<DateTime<Utc>>,
    pub include_spam: bool,
    pub include_incomplete: bool,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SubmissionQuery {
    fn default() -> Self {
        Self {
            form_id: None,
            status: Some("live".to_string()),
            created_from: None,
            created_to: None,
            include_spam: false,
            include_incomplete: false,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl SubmissionQuery {
    /// Whether a submission passes every filter except pagination
    pub fn matches(&self, submission: &Submission) -> bool {
        if self.form_id.is_some_and(|id| id != submission.form_id) {
            return false;
        }

        if self
            .status
            .as_deref()
            .is_some_and(|status| status != submission.status)
        {
            return false;
        }

        if self.created_from.is_some_and(|from| submission.date_created < from) {
            return false;
        }

        if self.created_to.is_some_and(|to| submission.date_created > to) {
            return false;
        }

        (self.include_spam || !submission.is_spam)
            && (self.include_incomplete || !submission.is_incomplete)
    }
}

/// Read access to the host platform's forms and submissions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FormStore: Send + Sync {
    /// Lists forms matching the query
    async fn list_forms(&self, query: &FormQuery) -> Result<Page<Form>, DomainError>;

    /// Finds a single form by id or handle, regardless of status
    async fn find_form(&self, lookup: &FormLookup) -> Result<Option<Form>, DomainError>;

    /// Counts all submissions of a form
    async fn count_submissions(&self, form_id: u64) -> Result<usize, DomainError>;

    /// Lists submissions matching the query, newest first
    async fn list_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Page<Submission>, DomainError>;

    /// Finds a single submission by id
    async fn find_submission(&self, id: u64) -> Result<Option<Submission>, DomainError>;
}
