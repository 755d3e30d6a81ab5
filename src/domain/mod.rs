//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;
pub mod field;
pub mod form;

pub use api_key::{
    ApiKeyInfo, ApiKeyPermissions, ApiKeyRecord, ApiKeyValidationError, Environment, KeyProvider,
    KeyTier,
};
pub use error::DomainError;
pub use field::{FieldTypeTag, FieldValueTransformer, NormalizedFieldValue, RawFieldValue};
pub use form::{FieldDescriptor, Form, FormLookup, FormQuery, FormStore, Page, Submission, SubmissionQuery};
