//! Error types for the converter.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the converter library.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Record or collection extraction or serialization failed.
    #[error(transparent)]
    Bibdata(#[from] bibdata::BibdataError),

    /// Failed to read the source file.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stylesheet or template the renderer needs could not be loaded.
    #[error("Cannot load {kind} from {}: {source}", .path.display())]
    RenderDependency {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unknown target format name.
    #[error("Unsupported target format: '{0}'. Expected xml, yaml or html")]
    UnsupportedFormat(String),

    /// YAML source text could not be parsed.
    #[error("YAML parsing failed: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// XML source text could not be parsed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
