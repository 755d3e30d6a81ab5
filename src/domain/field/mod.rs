//! Form field values and their normalization

mod normalized;
mod transformer;
mod type_tag;
mod value;

pub use normalized::{AssetValue, NameValue, NormalizedFieldValue};
pub use transformer::{normalize, FieldValueTransformer, NormalizationRule};
pub use type_tag::{should_skip, FieldTypeTag};
pub use value::{format_iso8601, RawFieldValue, Scalar};
