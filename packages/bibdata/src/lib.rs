//! Bibdata - bibliographic record model.
//!
//! This crate extracts bibliographic metadata ("bibdata") records from XML,
//! derives file-name-safe identifier codes and sort keys from them, and writes
//! them back out as bibdata markup or as a YAML mapping.
//!
//! # Example
//!
//! ```
//! use bibdata::{Record, Serializable};
//!
//! let xml = r#"<bibdata type="standard">
//!   <docidentifier>ISO 1234:2020</docidentifier>
//!   <date type="published"><on>2021-06-01</on></date>
//! </bibdata>"#;
//!
//! let record = Record::parse(xml).unwrap();
//! assert_eq!(record.identifier_code(), "iso-1234-2020");
//! assert_eq!(record.sort_key(), 1234);
//! assert!(record
//!     .to_markup()
//!     .contains("<date type='published'><on>2021-06-01</on></date>"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Query path rewriting and evaluation over `roxmltree`
//! - [`record`]: The record model
//! - [`collection`]: Collections of records
//! - [`format`]: Output formats shared by records and collections

pub mod collection;
pub mod config;
pub mod error;
pub mod format;
pub mod record;
pub mod xml;

pub use collection::{Collection, CollectionItem};
pub use error::{BibdataError, Result};
pub use format::{escape, Format, Serializable, Serialized};
pub use record::{identifier_code, DateType, FieldValue, Record, RecordConfig};
