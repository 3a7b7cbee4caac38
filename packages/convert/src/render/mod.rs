//! Renderers turning source text into an artifact.
//!
//! A renderer receives the raw source text together with the stylesheet and
//! template directory of the conversion. [`BibdataRenderer`] parses the source
//! into a [`Record`] or [`Collection`]; [`HtmlRenderer`] produces a finished
//! page.

mod html;
mod source;

use std::path::Path;

use bibdata::{Collection, Format, Record, Serializable};

use crate::config::TargetFormat;
use crate::error::Result;

pub use html::HtmlRenderer;
pub use source::{parse_source, BibdataRenderer};

/// The result of rendering a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// A finished presentation document.
    Document(String),
    Record(Record),
    Collection(Collection),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Record(_) => "record",
            Self::Collection(_) => "collection",
        }
    }

    /// Text written to the primary output file.
    ///
    /// Documents are written as they are; `format` only applies to records
    /// and collections.
    pub fn to_text(&self, format: Format) -> Result<String> {
        let text = match self {
            Self::Document(text) => text.clone(),
            Self::Record(record) => record.serialize(format)?.into_text()?,
            Self::Collection(collection) => collection.serialize(format)?.into_text()?,
        };
        Ok(text)
    }
}

/// Turns source text into an [`Artifact`].
pub trait Renderer {
    /// Load the stylesheet and templates the renderer depends on.
    ///
    /// Called once when a pipeline is built, before any source is read.
    fn load(&mut self, _stylesheet: &Path, _template_dir: &Path) -> Result<()> {
        Ok(())
    }

    fn render(&self, source: &str, stylesheet: &Path, template_dir: &Path) -> Result<Artifact>;
}

/// The built-in renderer for a target format.
pub fn renderer_for(target: TargetFormat) -> Box<dyn Renderer> {
    match target {
        TargetFormat::Html => Box::new(HtmlRenderer::default()),
        TargetFormat::Xml | TargetFormat::Yaml => Box::new(BibdataRenderer),
    }
}
