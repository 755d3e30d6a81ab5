//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod form_store;
pub mod logging;
pub mod observability;
