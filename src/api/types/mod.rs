//! Request and response types for the REST API

pub mod envelope;
pub mod error;
pub mod forms;
pub mod query;
pub mod submissions;

pub use envelope::{success, ErrorCode, ErrorEnvelope, ResponseMeta, SuccessEnvelope};
pub use error::ApiError;
pub use forms::{FormDetail, FormSummary, FormsQueryParams};
pub use query::Query;
pub use submissions::{SubmissionResponse, SubmissionsQueryParams};
