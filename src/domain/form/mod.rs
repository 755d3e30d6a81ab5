//! Forms and submissions owned by the host platform

mod entity;
mod store;

pub use entity::{FieldDescriptor, Form, FormPage, FormStatus, RatingScale, Submission};
pub use store::{FormLookup, FormQuery, FormStore, Page, SubmissionQuery, DEFAULT_PAGE_SIZE};
#[cfg(test)]
pub use store::MockFormStore;
