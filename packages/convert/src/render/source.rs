//! Parsing source text as markup or YAML.

use std::path::Path;

use bibdata::collection::is_collection;
use bibdata::xml::{ns, select_first};
use bibdata::{Collection, Record};
use roxmltree::Document;
use serde_yaml_ng::Value;

use super::{Artifact, Renderer};
use crate::error::Result;

/// Renders source text into a [`Record`] or [`Collection`] artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct BibdataRenderer;

impl Renderer for BibdataRenderer {
    fn render(&self, source: &str, _stylesheet: &Path, _template_dir: &Path) -> Result<Artifact> {
        parse_source(source)
    }
}

/// Parse a record or collection from markup or YAML.
///
/// Text starting with `<` is markup. A markup root that is neither a record
/// nor a collection is searched for a `bibdata` child. A YAML mapping with an
/// `items` key is a collection.
pub fn parse_source(source: &str) -> Result<Artifact> {
    if source.trim_start().starts_with('<') {
        parse_markup(source)
    } else {
        parse_yaml(source)
    }
}

fn parse_markup(source: &str) -> Result<Artifact> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();

    if is_collection(root) {
        return Ok(Artifact::Collection(Collection::from_xml(root)?));
    }

    let node = select_first(root, &ns("./bibdata"))
        .map(|bibdata| bibdata.node())
        .unwrap_or(root);
    Ok(Artifact::Record(Record::from_xml(node)?))
}

fn parse_yaml(source: &str) -> Result<Artifact> {
    let value: Value = serde_yaml_ng::from_str(source)?;
    if value.get("items").is_some() {
        Ok(Artifact::Collection(Collection::from_serialized_mapping(
            source,
        )?))
    } else {
        Ok(Artifact::Record(Record::from_serialized_mapping(source)?))
    }
}
