//! Conversion options and constants.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bibdata::Format;

use crate::error::{ConvertError, Result};

/// Stylesheet shipped with the crate.
pub const DEFAULT_STYLESHEET: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/templates/index-style.css");

/// Template directory shipped with the crate.
pub const DEFAULT_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Page template looked up in the template directory.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Optional per-record template looked up in the template directory.
pub const DOCUMENT_TEMPLATE: &str = "document.html";

/// Environment variables read by [`ConvertOptions::from_env`].
pub const ENV_STYLESHEET: &str = "BIBDATA_STYLESHEET";
pub const ENV_TEMPLATE_DIR: &str = "BIBDATA_TEMPLATE_DIR";
pub const ENV_OUTDIR: &str = "BIBDATA_OUTDIR";
pub const ENV_PREFIX: &str = "BIBDATA_PREFIX";

/// What a source file is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    /// Bibdata XML markup.
    Xml,
    /// YAML mapping.
    #[default]
    Yaml,
    /// HTML presentation page.
    Html,
}

impl TargetFormat {
    /// Extension used when none is configured.
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Xml => "rxl",
            Self::Yaml => "yaml",
            Self::Html => "html",
        }
    }

    /// Serialization format for records and collections.
    ///
    /// HTML output is a rendered page, not a serialization.
    pub fn format(self) -> Option<Format> {
        match self {
            Self::Xml => Some(Format::Markup),
            Self::Yaml => Some(Format::SerializedMapping),
            Self::Html => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Html => "html",
        }
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xml" | "rxl" => Ok(Self::Xml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "html" => Ok(Self::Html),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub target: TargetFormat,
    /// Directory receiving one file per record of a collection.
    pub outdir: Option<PathBuf>,
    /// Prepended to each per-record file name.
    pub prefix: Option<String>,
    /// Overrides the target's default extension.
    pub extension: Option<String>,
    pub stylesheet: PathBuf,
    pub template_dir: PathBuf,
    /// When false, output paths are computed but nothing is written.
    pub write: bool,
}

impl ConvertOptions {
    pub fn new(target: TargetFormat) -> Self {
        Self {
            target,
            outdir: None,
            prefix: None,
            extension: None,
            stylesheet: PathBuf::from(DEFAULT_STYLESHEET),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            write: true,
        }
    }

    /// Options with defaults taken from `BIBDATA_*` environment variables.
    pub fn from_env(target: TargetFormat) -> Self {
        Self::from_lookup(target, |key| std::env::var(key).ok())
    }

    fn from_lookup(target: TargetFormat, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let mut options = Self::new(target);
        if let Some(stylesheet) = var(ENV_STYLESHEET) {
            options.stylesheet = stylesheet.into();
        }
        if let Some(template_dir) = var(ENV_TEMPLATE_DIR) {
            options.template_dir = template_dir.into();
        }
        options.outdir = var(ENV_OUTDIR).map(PathBuf::from);
        options.prefix = var(ENV_PREFIX);
        options
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: impl Into<PathBuf>) -> Self {
        self.stylesheet = stylesheet.into();
        self
    }

    pub fn with_template_dir(mut self, template_dir: impl Into<PathBuf>) -> Self {
        self.template_dir = template_dir.into();
        self
    }

    pub fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Output extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .unwrap_or_else(|| self.target.default_extension())
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new(TargetFormat::default())
    }
}
