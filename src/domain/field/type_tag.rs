//! Field type tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a form field
///
/// Tags are the short type names used by the host platform (`Number`,
/// `Dropdown`, ...). Unknown names are kept verbatim in [`FieldTypeTag::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldTypeTag {
    Number,
    Dropdown,
    Radio,
    Checkboxes,
    Date,
    Name,
    Phone,
    Email,
    FileUpload,
    Rating,
    Html,
    Heading,
    Section,
    Summary,
    Paragraph,
    Other(String),
}

impl FieldTypeTag {
    /// Parse a tag; fully qualified class names resolve to their last segment
    pub fn parse(name: &str) -> Self {
        let short = name
            .rsplit(|c: char| c == '\\' || c == '/')
            .next()
            .unwrap_or(name)
            .trim();

        match short {
            "Number" => Self::Number,
            "Dropdown" => Self::Dropdown,
            "Radio" => Self::Radio,
            "Checkboxes" => Self::Checkboxes,
            "Date" => Self::Date,
            "Name" => Self::Name,
            "Phone" => Self::Phone,
            "Email" => Self::Email,
            "FileUpload" => Self::FileUpload,
            "Rating" => Self::Rating,
            "Html" => Self::Html,
            "Heading" => Self::Heading,
            "Section" => Self::Section,
            "Summary" => Self::Summary,
            "Paragraph" => Self::Paragraph,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Number => "Number",
            Self::Dropdown => "Dropdown",
            Self::Radio => "Radio",
            Self::Checkboxes => "Checkboxes",
            Self::Date => "Date",
            Self::Name => "Name",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::FileUpload => "FileUpload",
            Self::Rating => "Rating",
            Self::Html => "Html",
            Self::Heading => "Heading",
            Self::Section => "Section",
            Self::Summary => "Summary",
            Self::Paragraph => "Paragraph",
            Self::Other(name) => name,
        }
    }

    /// Layout-only types that never carry submitted data
    pub fn is_layout_only(&self) -> bool {
        matches!(
            self,
            Self::Html | Self::Heading | Self::Section | Self::Summary | Self::Paragraph
        )
    }
}

/// Skip policy: whether a field of this type is excluded from output
pub fn should_skip(tag: &FieldTypeTag) -> bool {
    tag.is_layout_only()
}

impl From<String> for FieldTypeTag {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for FieldTypeTag {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<FieldTypeTag> for String {
    fn from(tag: FieldTypeTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for FieldTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
