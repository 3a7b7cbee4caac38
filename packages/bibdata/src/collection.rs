//! Collections of bibdata records.
//!
//! A collection document wraps each member in a `partOf` relation:
//!
//! ```xml
//! <relaton-collection xmlns="https://open.ribose.com/relaton-xml">
//!   <title>Standards</title>
//!   <contributor>
//!     <role type="author"/>
//!     <organization><name>ISO</name></organization>
//!   </contributor>
//!   <relation type="partOf">
//!     <bibdata type="standard">...</bibdata>
//!   </relation>
//! </relaton-collection>
//! ```
//!
//! Members may be records or nested collections.

use chrono::NaiveDate;
use roxmltree::{Document, Node};
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};

use crate::config::{COLLECTION_NS, COLLECTION_TAG};
use crate::error::Result;
use crate::format::{escape, Serializable};
use crate::record::{Record, RecordConfig};
use crate::xml::{first_element_child, get_tag_name, ns, select_all, select_first, select_text};

/// A member of a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionItem {
    Record(Record),
    Collection(Collection),
}

/// An ordered collection of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub title: Option<String>,
    pub author: Option<String>,
    pub items: Vec<CollectionItem>,
}

/// YAML shape of a collection; items without `items` are records.
#[derive(Debug, Deserialize)]
struct CollectionConfig {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    items: Vec<ItemConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemConfig {
    Collection(CollectionConfig),
    Record(RecordConfig),
}

impl From<CollectionConfig> for Collection {
    fn from(config: CollectionConfig) -> Self {
        Self {
            title: config.title,
            author: config.author,
            items: config
                .items
                .into_iter()
                .map(|item| match item {
                    ItemConfig::Collection(nested) => CollectionItem::Collection(nested.into()),
                    ItemConfig::Record(record) => CollectionItem::Record(Record::new(record)),
                })
                .collect(),
        }
    }
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new(title: Option<String>, author: Option<String>) -> Self {
        Self {
            title,
            author,
            items: Vec::new(),
        }
    }

    /// Append a record.
    pub fn push_record(&mut self, record: Record) {
        self.items.push(CollectionItem::Record(record));
    }

    /// Append a nested collection.
    pub fn push_collection(&mut self, collection: Collection) {
        self.items.push(CollectionItem::Collection(collection));
    }

    /// Parse a collection from `relaton-collection` XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Self::from_xml(doc.root_element())
    }

    /// Extract a collection from a `relaton-collection` element.
    pub fn from_xml(source: Node<'_, '_>) -> Result<Self> {
        let title = select_text(source, &ns("./title"));
        let author = select_first(source, &ns("./contributor/role[@type='author']"))
            .and_then(|role| role.parent())
            .and_then(|contributor| select_text(contributor, &ns("./organization/name")));

        let mut collection = Self::new(title, author);
        for relation in select_all(source, &ns("./relation[@type='partOf']")) {
            let Some(member) = first_element_child(relation.node()) else {
                continue;
            };
            if is_collection(member) {
                collection.push_collection(Self::from_xml(member)?);
            } else {
                collection.push_record(Record::from_xml(member)?);
            }
        }

        tracing::debug!(
            items = collection.items.len(),
            "extracted bibdata collection"
        );
        Ok(collection)
    }

    /// Rebuild a collection from its YAML mapping.
    pub fn from_serialized_mapping(yaml: &str) -> Result<Self> {
        let config: CollectionConfig = serde_yaml_ng::from_str(yaml)?;
        Ok(config.into())
    }

    /// All records, descending into nested collections, in document order.
    #[must_use]
    pub fn items_flattened(&self) -> Vec<&Record> {
        let mut records = Vec::new();
        self.collect_records(&mut records);
        records
    }

    fn collect_records<'a>(&'a self, records: &mut Vec<&'a Record>) {
        for item in &self.items {
            match item {
                CollectionItem::Record(record) => records.push(record),
                CollectionItem::Collection(nested) => nested.collect_records(records),
            }
        }
    }

    /// Flattened records ordered by document number.
    ///
    /// Records with the same number keep their document order.
    #[must_use]
    pub fn sorted_records(&self) -> Vec<&Record> {
        let mut records = self.items_flattened();
        records.sort_by_key(|record| record.sort_key());
        records
    }
}

impl Serializable for Collection {
    fn to_markup_on(&self, fetched: NaiveDate) -> String {
        let mut ret = format!("<{COLLECTION_TAG} xmlns=\"{COLLECTION_NS}\">\n");
        if let Some(title) = &self.title {
            ret.push_str(&format!("<title>{}</title>\n", escape(title)));
        }
        if let Some(author) = &self.author {
            ret.push_str(&format!(
                "<contributor><role type='author'/><organization><name>{}</name></organization></contributor>\n",
                escape(author)
            ));
        }
        for item in &self.items {
            let member = match item {
                CollectionItem::Record(record) => record.to_markup_on(fetched),
                CollectionItem::Collection(nested) => nested.to_markup_on(fetched),
            };
            ret.push_str(&format!("<relation type='partOf'>\n{member}</relation>\n"));
        }
        ret.push_str(&format!("</{COLLECTION_TAG}>\n"));
        ret
    }

    fn to_mapping_value(&self) -> Result<Value> {
        let mut mapping = Mapping::new();
        if let Some(title) = &self.title {
            mapping.insert("title".into(), title.as_str().into());
        }
        if let Some(author) = &self.author {
            mapping.insert("author".into(), author.as_str().into());
        }
        let items = self
            .items
            .iter()
            .map(|item| match item {
                CollectionItem::Record(record) => record.to_mapping_value(),
                CollectionItem::Collection(nested) => nested.to_mapping_value(),
            })
            .collect::<Result<Vec<Value>>>()?;
        mapping.insert("items".into(), Value::Sequence(items));
        Ok(Value::Mapping(mapping))
    }
}

/// Whether `node` is a `relaton-collection` element.
pub fn is_collection(node: Node<'_, '_>) -> bool {
    node.is_element() && get_tag_name(node) == COLLECTION_TAG
}
