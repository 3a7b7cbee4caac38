//! Error types for the bibdata model.

use thiserror::Error;

/// Main error type for record extraction and serialization.
#[derive(Debug, Error)]
pub enum BibdataError {
    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The revision date text of a `date` element is not a calendar date.
    #[error("Invalid revision date '{text}': {source}")]
    InvalidDate {
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    /// YAML serialization or deserialization failed.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for bibdata operations.
pub type Result<T> = std::result::Result<T, BibdataError>;
