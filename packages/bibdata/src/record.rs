//! The bibdata record: one bibliographic description with its identifiers,
//! titles, dates, contributors and related URIs.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::config::{
    BASIC_DATE_FORMAT, FILENAME_UNSAFE_CHARS, ISO_DATE_FORMAT, UNNUMBERED_SORT_KEY,
};
use crate::error::{BibdataError, Result};
use crate::format::{escape, Serializable};
use crate::xml::{ns, select_first, select_text};

/// Document number pattern: `<publisher/series> <number>[:<year>]`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOC_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_/]+)\s+([0-9]+):?([0-9]*)").expect("valid regex")
});

/// Kind of the date a record is revised on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateType {
    /// Publication date.
    Published,
    /// Circulation date; the default when the source names no date type.
    #[default]
    Circulated,
    /// Any other `type` found on the source date element.
    Other(String),
}

impl DateType {
    /// Get the string value used in markup and mappings.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Published => "published",
            Self::Circulated => "circulated",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for DateType {
    fn from(value: &str) -> Self {
        match value {
            "published" => Self::Published,
            "circulated" => Self::Circulated,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DateType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<DateType> for String {
    fn from(value: DateType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field values for constructing a [`Record`] directly.
///
/// Field names in YAML are the camelCase names used by [`Record::to_mapping`],
/// so a serialized mapping deserializes back into a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordConfig {
    pub docidentifier: Option<String>,
    pub doctype: Option<String>,
    pub title: Option<String>,
    pub stage: Option<String>,
    pub technical_committee: Option<String>,
    pub r#abstract: Option<String>,
    pub revision_date: Option<NaiveDate>,
    /// Defaults to [`DateType::Circulated`] when absent.
    pub date_type: Option<DateType>,
    pub uri: Option<String>,
    pub xml_uri: Option<String>,
    pub pdf_uri: Option<String>,
    pub html_uri: Option<String>,
    pub doc_uri: Option<String>,
    pub rxl_uri: Option<String>,
    pub language: Option<String>,
    pub script: Option<String>,
    pub edition: Option<String>,
    pub copyright_from: Option<String>,
    pub copyright_owner: Option<String>,
    pub contributor_author_role: Option<String>,
    pub contributor_author_org: Option<String>,
    pub contributor_publisher_role: Option<String>,
    pub contributor_publisher_org: Option<String>,
    pub relation: Option<String>,
}

/// A single value in a record mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Date(date) => write!(f, "{}", date.format(ISO_DATE_FORMAT)),
        }
    }
}

/// A bibliographic record.
///
/// Every field except the date type is optional. The identifier is fixed at
/// construction; the other fields can be reassigned through their setters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    docidentifier: Option<String>,
    doctype: Option<String>,
    title: Option<String>,
    stage: Option<String>,
    technical_committee: Option<String>,
    r#abstract: Option<String>,
    revision_date: Option<NaiveDate>,
    date_type: DateType,
    uri: Option<String>,
    xml_uri: Option<String>,
    pdf_uri: Option<String>,
    html_uri: Option<String>,
    doc_uri: Option<String>,
    rxl_uri: Option<String>,
    language: Option<String>,
    script: Option<String>,
    edition: Option<String>,
    copyright_from: Option<String>,
    copyright_owner: Option<String>,
    contributor_author_role: Option<String>,
    contributor_author_org: Option<String>,
    contributor_publisher_role: Option<String>,
    contributor_publisher_org: Option<String>,
    relation: Option<String>,
}

/// Generate getters and setters for optional text fields.
macro_rules! text_fields {
    ($($field:ident, $setter:ident, $doc:literal;)*) => {
        impl Record {
            $(
                #[doc = $doc]
                #[must_use]
                pub fn $field(&self) -> Option<&str> {
                    self.$field.as_deref()
                }

                #[doc = concat!("Replace: ", $doc)]
                pub fn $setter(&mut self, value: Option<String>) {
                    self.$field = value;
                }
            )*
        }
    };
}

text_fields! {
    doctype, set_doctype, "Document type, from the `type` attribute of the root.";
    title, set_title, "Main title.";
    stage, set_stage, "Publication status.";
    technical_committee, set_technical_committee, "Responsible technical committee.";
    r#abstract, set_abstract, "Abstract.";
    uri, set_uri, "Untyped URI of the document.";
    xml_uri, set_xml_uri, "URI of the XML representation.";
    pdf_uri, set_pdf_uri, "URI of the PDF representation.";
    html_uri, set_html_uri, "URI of the HTML representation.";
    doc_uri, set_doc_uri, "URI of the Word representation.";
    rxl_uri, set_rxl_uri, "URI of the bibdata (RXL) representation.";
    language, set_language, "Document language.";
    script, set_script, "Document script.";
    edition, set_edition, "Edition.";
    copyright_from, set_copyright_from, "First year of copyright.";
    copyright_owner, set_copyright_owner, "Copyright holder organization.";
    contributor_author_role, set_contributor_author_role, "Text of the author role.";
    contributor_author_org, set_contributor_author_org, "Author organization name.";
    contributor_publisher_role, set_contributor_publisher_role, "Text of the publisher role.";
    contributor_publisher_org, set_contributor_publisher_org, "Publisher organization name.";
    relation, set_relation, "Relation to another record.";
}

impl Record {
    /// Build a record from explicit field values.
    ///
    /// # Examples
    /// ```
    /// use bibdata::{DateType, Record, RecordConfig};
    ///
    /// let record = Record::new(RecordConfig {
    ///     docidentifier: Some("ISO/IEC 9999".to_string()),
    ///     ..Default::default()
    /// });
    /// assert_eq!(record.date_type(), &DateType::Circulated);
    /// assert!(record.revision_date().is_none());
    /// ```
    #[must_use]
    pub fn new(config: RecordConfig) -> Self {
        Self {
            docidentifier: config.docidentifier,
            doctype: config.doctype,
            title: config.title,
            stage: config.stage,
            technical_committee: config.technical_committee,
            r#abstract: config.r#abstract,
            revision_date: config.revision_date,
            date_type: config.date_type.unwrap_or_default(),
            uri: config.uri,
            xml_uri: config.xml_uri,
            pdf_uri: config.pdf_uri,
            html_uri: config.html_uri,
            doc_uri: config.doc_uri,
            rxl_uri: config.rxl_uri,
            language: config.language,
            script: config.script,
            edition: config.edition,
            copyright_from: config.copyright_from,
            copyright_owner: config.copyright_owner,
            contributor_author_role: config.contributor_author_role,
            contributor_author_org: config.contributor_author_org,
            contributor_publisher_role: config.contributor_publisher_role,
            contributor_publisher_org: config.contributor_publisher_org,
            relation: config.relation,
        }
    }

    /// Parse a record from bibdata XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Self::from_xml(doc.root_element())
    }

    /// Extract a record from a `bibdata` (or `bibitem`) element.
    ///
    /// Missing elements leave their field empty. A date element whose text
    /// isn't a calendar date fails the whole extraction.
    pub fn from_xml(source: Node<'_, '_>) -> Result<Self> {
        let text = |path: &str| select_text(source, &ns(path));

        // Published date wins over circulated, which wins over any date.
        let date = select_first(source, &ns("./date[@type = 'published']"))
            .or_else(|| select_first(source, &ns("./date[@type = 'circulated']")))
            .or_else(|| select_first(source, &ns("./date")));
        let date_type = date
            .and_then(|d| d.attribute("type"))
            .map(DateType::from)
            .unwrap_or_default();
        let revision_date = date
            .map(|d| parse_revision_date(&d.text()))
            .transpose()?;

        let (contributor_author_role, contributor_author_org) = contributor(source, "author");
        let (contributor_publisher_role, contributor_publisher_org) =
            contributor(source, "publisher");

        let record = Self::new(RecordConfig {
            docidentifier: text("./docidentifier"),
            doctype: text("./@type"),
            title: text("./title"),
            stage: text("./status"),
            technical_committee: text("./editorialgroup/technical-committee"),
            r#abstract: text("./abstract"),
            revision_date,
            date_type: Some(date_type),
            uri: text("./uri[not(@type)]"),
            xml_uri: text("./uri[@type='xml']"),
            pdf_uri: text("./uri[@type='pdf']"),
            html_uri: text("./uri[@type='html']"),
            doc_uri: text("./uri[@type='doc']"),
            rxl_uri: text("./uri[@type='rxl']"),
            language: text("./language"),
            script: text("./script"),
            edition: text("./edition"),
            copyright_from: text("./copyright/from"),
            copyright_owner: text("./copyright/owner/organization/name"),
            contributor_author_role,
            contributor_author_org,
            contributor_publisher_role,
            contributor_publisher_org,
            relation: None,
        });

        tracing::debug!(
            docidentifier = record.docidentifier.as_deref().unwrap_or_default(),
            date_type = %record.date_type,
            "extracted bibdata record"
        );

        Ok(record)
    }

    /// Rebuild a record from its YAML mapping (see [`Serializable::to_serialized_mapping`]).
    pub fn from_serialized_mapping(yaml: &str) -> Result<Self> {
        let config: RecordConfig = serde_yaml_ng::from_str(yaml)?;
        Ok(Self::new(config))
    }

    /// Human-readable document identifier (e.g. "ISO 1234:2020").
    #[must_use]
    pub fn docidentifier(&self) -> Option<&str> {
        self.docidentifier.as_deref()
    }

    /// Revision date.
    #[must_use]
    pub fn revision_date(&self) -> Option<NaiveDate> {
        self.revision_date
    }

    /// Replace the revision date.
    pub fn set_revision_date(&mut self, value: Option<NaiveDate>) {
        self.revision_date = value;
    }

    /// Kind of the revision date.
    #[must_use]
    pub fn date_type(&self) -> &DateType {
        &self.date_type
    }

    /// Replace the kind of the revision date.
    pub fn set_date_type(&mut self, value: DateType) {
        self.date_type = value;
    }

    /// File-name-safe form of the identifier.
    ///
    /// Distinct identifiers may map to the same code.
    ///
    /// # Examples
    /// ```
    /// use bibdata::{Record, RecordConfig};
    ///
    /// let record = Record::new(RecordConfig {
    ///     docidentifier: Some("ISO/IEC 9999:2020".to_string()),
    ///     ..Default::default()
    /// });
    /// assert_eq!(record.identifier_code(), "iso-iec-9999-2020");
    /// ```
    #[must_use]
    pub fn identifier_code(&self) -> String {
        self.docidentifier
            .as_deref()
            .map(identifier_code)
            .unwrap_or_default()
    }

    /// Document number used to order records.
    ///
    /// Records without a recognizable number get [`UNNUMBERED_SORT_KEY`].
    /// Numbers too large for `u64` saturate to `u64::MAX`, so they still sort
    /// after every smaller number.
    #[must_use]
    pub fn sort_key(&self) -> u64 {
        self.docidentifier
            .as_deref()
            .and_then(|id| DOC_NUMBER_PATTERN.captures(id))
            .and_then(|caps| caps.get(2))
            // The group is all digits, so parsing only fails on overflow
            .map(|number| number.as_str().parse().unwrap_or(u64::MAX))
            .unwrap_or(UNNUMBERED_SORT_KEY)
    }

    /// Present fields in declaration order.
    #[must_use]
    pub fn to_mapping(&self) -> IndexMap<&'static str, FieldValue> {
        let text = |value: &Option<String>| value.clone().map(FieldValue::Text);

        let entries = [
            ("docidentifier", text(&self.docidentifier)),
            ("doctype", text(&self.doctype)),
            ("title", text(&self.title)),
            ("stage", text(&self.stage)),
            ("technicalCommittee", text(&self.technical_committee)),
            ("abstract", text(&self.r#abstract)),
            ("revisionDate", self.revision_date.map(FieldValue::Date)),
            (
                "dateType",
                Some(FieldValue::Text(self.date_type.as_str().to_string())),
            ),
            ("uri", text(&self.uri)),
            ("xmlUri", text(&self.xml_uri)),
            ("pdfUri", text(&self.pdf_uri)),
            ("htmlUri", text(&self.html_uri)),
            ("docUri", text(&self.doc_uri)),
            ("rxlUri", text(&self.rxl_uri)),
            ("language", text(&self.language)),
            ("script", text(&self.script)),
            ("edition", text(&self.edition)),
            ("copyrightFrom", text(&self.copyright_from)),
            ("copyrightOwner", text(&self.copyright_owner)),
            ("contributorAuthorRole", text(&self.contributor_author_role)),
            ("contributorAuthorOrg", text(&self.contributor_author_org)),
            (
                "contributorPublisherRole",
                text(&self.contributor_publisher_role),
            ),
            (
                "contributorPublisherOrg",
                text(&self.contributor_publisher_org),
            ),
            ("relation", text(&self.relation)),
        ];

        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

impl Serializable for Record {
    /// Bibdata markup.
    ///
    /// `language` and `script` are written twice: once unconditionally (empty
    /// when unset) right after the URIs, and again near the end when set.
    /// Consumers of earlier output depend on both positions.
    fn to_markup_on(&self, fetched: NaiveDate) -> String {
        let mut ret = match &self.doctype {
            Some(doctype) => format!("<bibdata type='{}'>\n", escape(doctype)),
            None => "<bibdata>\n".to_string(),
        };
        ret.push_str(&format!("<fetched>{fetched}</fetched>\n"));
        push_element(&mut ret, "title", &self.title);
        push_element(&mut ret, "docidentifier", &self.docidentifier);
        push_element(&mut ret, "uri", &self.uri);
        for (kind, uri) in [
            ("xml", &self.xml_uri),
            ("html", &self.html_uri),
            ("pdf", &self.pdf_uri),
            ("doc", &self.doc_uri),
            ("rxl", &self.rxl_uri),
        ] {
            if let Some(uri) = uri {
                ret.push_str(&format!("<uri type='{kind}'>{}</uri>\n", escape(uri)));
            }
        }

        ret.push_str(&format!(
            "<language>{}</language>\n",
            escape(self.language.as_deref().unwrap_or_default())
        ));
        ret.push_str(&format!(
            "<script>{}</script>\n",
            escape(self.script.as_deref().unwrap_or_default())
        ));

        if let Some(from) = &self.copyright_from {
            ret.push_str(&format!("<copyright><from>{}</from>\n", escape(from)));
            if let Some(owner) = &self.copyright_owner {
                ret.push_str(&format!(
                    "<owner><organization><name>{}</name></organization></owner>\n",
                    escape(owner)
                ));
            }
            ret.push_str("</copyright>\n");
        }

        push_contributor(
            &mut ret,
            "author",
            &self.contributor_author_role,
            &self.contributor_author_org,
        );
        push_contributor(
            &mut ret,
            "publisher",
            &self.contributor_publisher_role,
            &self.contributor_publisher_org,
        );

        if let Some(date) = self.revision_date {
            ret.push_str(&format!(
                "<date type='{}'><on>{date}</on></date>\n",
                escape(self.date_type.as_str())
            ));
        }
        push_element(&mut ret, "edition", &self.edition);
        push_element(&mut ret, "language", &self.language);
        push_element(&mut ret, "script", &self.script);
        push_element(&mut ret, "abstract", &self.r#abstract);
        push_element(&mut ret, "status", &self.stage);
        if let Some(committee) = &self.technical_committee {
            ret.push_str(&format!(
                "<editorialgroup><technical-committee>{}</technical-committee></editorialgroup>\n",
                escape(committee)
            ));
        }
        ret.push_str("</bibdata>\n");
        ret
    }

    fn to_mapping_value(&self) -> Result<Value> {
        Ok(serde_yaml_ng::to_value(self.to_mapping())?)
    }
}

/// Lowercase `identifier` and replace every file-name-unsafe character with `-`.
///
/// Only the characters in [`FILENAME_UNSAFE_CHARS`] are replaced; the result
/// is safe as a file name but not as markup.
///
/// # Arguments
/// * `identifier` - Document identifier, e.g. "ISO/IEC 9999:2020"
///
/// # Returns
/// The identifier code; applying it again leaves it unchanged
///
/// # Examples
/// ```
/// use bibdata::identifier_code;
///
/// assert_eq!(identifier_code("CC/DIR 10005:2019"), "cc-dir-10005-2019");
/// assert_eq!(identifier_code("cc-dir-10005-2019"), "cc-dir-10005-2019");
/// assert_eq!(identifier_code(""), "");
/// ```
#[must_use]
pub fn identifier_code(identifier: &str) -> String {
    identifier
        .to_lowercase()
        .chars()
        .map(|c| if FILENAME_UNSAFE_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Parse the text of a `date` element.
fn parse_revision_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, BASIC_DATE_FORMAT))
        .or_else(|e| {
            chrono::DateTime::parse_from_rfc3339(text)
                .map(|datetime| datetime.date_naive())
                .map_err(|_| e)
        })
        .map_err(|source| BibdataError::InvalidDate {
            text: text.to_string(),
            source,
        })
}

/// Role text and organization name of the first contributor with `role`.
///
/// The organization is looked up next to the role element, not from the
/// record root.
fn contributor(source: Node<'_, '_>, role: &str) -> (Option<String>, Option<String>) {
    let Some(role_node) = select_first(source, &ns(&format!("./contributor/role[@type='{role}']")))
    else {
        return (None, None);
    };
    let organization = role_node
        .parent()
        .and_then(|contributor| select_text(contributor, &ns("./organization/name")));
    (Some(role_node.text()), organization)
}

fn push_element(out: &mut String, tag: &str, value: &Option<String>) {
    if let Some(value) = value {
        out.push_str(&format!("<{tag}>{}</{tag}>\n", escape(value)));
    }
}

fn push_contributor(out: &mut String, role: &str, lead: &Option<String>, org: &Option<String>) {
    if lead.is_none() {
        return;
    }
    out.push_str("<contributor>\n");
    out.push_str(&format!("<role type='{role}'/>\n"));
    if let Some(org) = org {
        out.push_str(&format!(
            "<organization><name>{}</name></organization>\n",
            escape(org)
        ));
    }
    out.push_str("</contributor>\n");
}
