//! In-memory form store
//!
//! Holds forms and submissions for local development and tests. Data can be
//! seeded from a JSON file shaped as `{"forms": [...], "submissions": [...]}`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::domain::form::{Form, FormLookup, FormQuery, FormStore, Page, Submission, SubmissionQuery};
use crate::domain::DomainError;

/// Seed file contents
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// In-memory implementation of FormStore
pub struct InMemoryFormStore {
    forms: RwLock<BTreeMap<u64, Form>>,
    submissions: RwLock<BTreeMap<u64, Submission>>,
}

impl InMemoryFormStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self {
            forms: RwLock::new(BTreeMap::new()),
            submissions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates a store holding the given data
    pub fn with_data(seed: SeedData) -> Self {
        Self {
            forms: RwLock::new(seed.forms.into_iter().map(|f| (f.id, f)).collect()),
            submissions: RwLock::new(seed.submissions.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    /// Loads a JSON seed file
    pub fn from_seed_file(path: &str) -> Result<Self, DomainError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!("Failed to read seed file '{}': {}", path, e))
        })?;

        let seed: SeedData = serde_json::from_str(&contents).map_err(|e| {
            DomainError::configuration(format!("Invalid seed file '{}': {}", path, e))
        })?;

        info!(
            path = %path,
            forms = seed.forms.len(),
            submissions = seed.submissions.len(),
            "Loaded form store seed"
        );

        Ok(Self::with_data(seed))
    }

    pub fn insert_form(&self, form: Form) -> Result<(), DomainError> {
        let mut forms = self
            .forms
            .write()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        forms.insert(form.id, form);
        Ok(())
    }

    pub fn insert_submission(&self, submission: Submission) -> Result<(), DomainError> {
        let mut submissions = self
            .submissions
            .write()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        submissions.insert(submission.id, submission);
        Ok(())
    }
}

impl Default for InMemoryFormStore {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> Page<T> {
    let total = items.len();
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page::new(items, total)
}

#[async_trait]
impl FormStore for InMemoryFormStore {
    async fn list_forms(&self, query: &FormQuery) -> Result<Page<Form>, DomainError> {
        let forms = self
            .forms
            .read()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        let matching: Vec<Form> = forms
            .values()
            .filter(|f| query.status.is_none_or(|status| f.status == status))
            .cloned()
            .collect();

        Ok(paginate(matching, query.limit, query.offset))
    }

    async fn find_form(&self, lookup: &FormLookup) -> Result<Option<Form>, DomainError> {
        let forms = self
            .forms
            .read()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        let form = match lookup {
            FormLookup::Id(id) => forms.get(id).cloned(),
            FormLookup::Handle(handle) => forms.values().find(|f| &f.handle == handle).cloned(),
        };

        Ok(form)
    }

    async fn count_submissions(&self, form_id: u64) -> Result<usize, DomainError> {
        let submissions = self
            .submissions
            .read()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        Ok(submissions.values().filter(|s| s.form_id == form_id).count())
    }

    async fn list_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Page<Submission>, DomainError> {
        let submissions = self
            .submissions
            .read()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        let mut matching: Vec<Submission> = submissions
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.date_created
                .cmp(&a.date_created)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(paginate(matching, query.limit, query.offset))
    }

    async fn find_submission(&self, id: u64) -> Result<Option<Submission>, DomainError> {
        let submissions = self
            .submissions
            .read()
            .map_err(|_| DomainError::internal("Failed to acquire lock"))?;

        Ok(submissions.get(&id).cloned())
    }
}
