//! End-to-end tests for extraction and serialization of bibdata fixtures.

use std::fs;
use std::path::Path;

use bibdata::{Collection, DateType, Format, Record, Serializable, Serialized};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn fetched() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

#[test]
fn test_record_fixture_extraction() {
    let record = Record::parse(&load_fixture("cc-18001.xml")).unwrap();

    assert_eq!(record.docidentifier(), Some("CC 18001"));
    assert_eq!(record.doctype(), Some("standard"));
    assert_eq!(record.revision_date(), NaiveDate::from_ymd_opt(2018, 10, 25));
    assert_eq!(record.date_type(), &DateType::Published);
    assert_eq!(record.stage(), Some("published"));
    assert_eq!(record.technical_committee(), Some("DATETIME"));
    assert_eq!(
        record.r#abstract(),
        Some("This standard specifies representations of dates & times.")
    );
    assert_eq!(record.uri(), Some("https://standards.calconnect.org/csd/cc-18001.html"));
    assert_eq!(record.xml_uri(), None);
    assert_eq!(record.rxl_uri(), Some("https://standards.calconnect.org/csd/cc-18001.rxl"));
    assert_eq!(record.copyright_owner(), Some("CalConnect"));
    assert_eq!(record.contributor_publisher_org(), Some("CalConnect"));
    assert_eq!(record.identifier_code(), "cc-18001");
    assert_eq!(record.sort_key(), 18001);
}

#[test]
fn test_record_fixture_markup() {
    let record = Record::parse(&load_fixture("cc-18001.xml")).unwrap();
    let markup = record.to_markup_on(fetched());

    assert!(markup.starts_with("<bibdata type='standard'>\n<fetched>2024-03-01</fetched>\n"));
    assert!(markup.contains("<date type='published'><on>2018-10-25</on></date>"));
    assert!(markup.contains("dates &amp; times"));
    assert_eq!(markup.matches("<language>en</language>").count(), 2);
    assert!(markup.ends_with("</bibdata>\n"));

    let reparsed = Record::parse(&markup).unwrap();
    assert_eq!(reparsed, record);
}

#[test]
fn test_record_fixture_yaml_roundtrip() {
    let record = Record::parse(&load_fixture("cc-18001.xml")).unwrap();

    let yaml = record
        .serialize(Format::SerializedMapping)
        .unwrap()
        .into_text()
        .unwrap();
    assert!(yaml.starts_with("---\ndocidentifier: CC 18001\ndoctype: standard\n"));
    assert!(yaml.contains("revisionDate:"));
    assert!(yaml.contains("\ndateType: published\n"));

    assert_eq!(Record::from_serialized_mapping(&yaml).unwrap(), record);
}

#[test]
fn test_mapping_format_is_structured() {
    let record = Record::parse(&load_fixture("cc-18001.xml")).unwrap();
    let Serialized::Mapping(value) = record.serialize(Format::Mapping).unwrap() else {
        panic!("expected a mapping");
    };
    assert_eq!(value["edition"].as_str(), Some("1"));
    assert_eq!(record.to_mapping().len(), 22);
}

#[test]
fn test_collection_fixture() {
    let collection = Collection::parse(&load_fixture("registry.xml")).unwrap();

    let codes: Vec<String> = collection
        .items_flattened()
        .iter()
        .map(|record| record.identifier_code())
        .collect();
    assert_eq!(codes, vec!["cc-51004", "cc-18001", "cc-dir-10005-2019", ""]);

    let sorted: Vec<u64> = collection
        .sorted_records()
        .iter()
        .map(|record| record.sort_key())
        .collect();
    assert_eq!(sorted, vec![10005, 18001, 51004, 999_999]);
}

#[test]
fn test_collection_fixture_yaml_roundtrip() {
    let collection = Collection::parse(&load_fixture("registry.xml")).unwrap();
    let yaml = collection.to_serialized_mapping().unwrap();
    assert_eq!(Collection::from_serialized_mapping(&yaml).unwrap(), collection);
}
