//! Output formats shared by records and collections.

use chrono::NaiveDate;
use serde_yaml_ng::Value;

use crate::error::Result;

/// Serialization format of a record or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Bibdata XML markup.
    Markup,
    /// Ordered field-name to value mapping.
    Mapping,
    /// The mapping as a YAML document.
    SerializedMapping,
}

/// Output of [`Serializable::serialize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Serialized {
    /// Markup or YAML text.
    Text(String),
    /// An ordered mapping.
    Mapping(Value),
}

impl Serialized {
    /// Turn the output into text, rendering mappings as YAML.
    pub fn into_text(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Mapping(value) => yaml_document(&value),
        }
    }
}

/// Something that can be written out as bibdata markup or as a mapping.
pub trait Serializable {
    /// Markup with `fetched` stamped as the retrieval date.
    fn to_markup_on(&self, fetched: NaiveDate) -> String;

    /// The mapping form as a YAML value.
    fn to_mapping_value(&self) -> Result<Value>;

    /// Markup stamped with today's date.
    ///
    /// The output changes from day to day; use [`to_markup_on`](Self::to_markup_on)
    /// where reproducible output matters.
    fn to_markup(&self) -> String {
        self.to_markup_on(chrono::Local::now().date_naive())
    }

    /// The mapping form as a YAML document.
    fn to_serialized_mapping(&self) -> Result<String> {
        yaml_document(&self.to_mapping_value()?)
    }

    /// Serialize in the given format.
    fn serialize(&self, format: Format) -> Result<Serialized> {
        Ok(match format {
            Format::Markup => Serialized::Text(self.to_markup()),
            Format::Mapping => Serialized::Mapping(self.to_mapping_value()?),
            Format::SerializedMapping => Serialized::Text(self.to_serialized_mapping()?),
        })
    }
}

/// Render a value as a YAML document with a start marker.
pub(crate) fn yaml_document<T: serde::Serialize>(value: &T) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(value)?;
    Ok(format!("---\n{yaml}"))
}

/// Escape text for use in element content or quoted attributes.
pub fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(text)
}
