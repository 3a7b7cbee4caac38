//! HTML presentation of records and collections.
//!
//! The page is built from `index.html` in the template directory. Each record
//! is rendered through `document.html` when the directory has one, otherwise
//! through the bundled document template. Templates use `{{ name }}`
//! placeholders; unknown names render as empty text.
//!
//! Page placeholders: `title`, `author`, `stylesheet`, `documents`.
//! Document placeholders: every key of [`Record::to_mapping`] plus
//! `identifierCode`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use bibdata::{escape, Record};
use regex::{Captures, Regex};

use super::{parse_source, Artifact, Renderer};
use crate::config::{DOCUMENT_TEMPLATE, INDEX_TEMPLATE};
use crate::error::{ConvertError, Result};

const BUNDLED_DOCUMENT_TEMPLATE: &str = include_str!("../../templates/document.html");

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid regex")
});

/// Stylesheet and templates read from disk.
#[derive(Debug, Clone, PartialEq)]
struct Templates {
    stylesheet: String,
    index: String,
    document: String,
}

impl Templates {
    fn load(stylesheet: &Path, template_dir: &Path) -> Result<Self> {
        let read = |kind: &'static str, path: &Path| {
            fs::read_to_string(path).map_err(|source| ConvertError::RenderDependency {
                kind,
                path: path.to_path_buf(),
                source,
            })
        };

        let stylesheet = read("stylesheet", stylesheet)?;
        let index = read("template", &template_dir.join(INDEX_TEMPLATE))?;
        let document_path = template_dir.join(DOCUMENT_TEMPLATE);
        let document = if document_path.is_file() {
            read("template", &document_path)?
        } else {
            BUNDLED_DOCUMENT_TEMPLATE.to_string()
        };

        tracing::debug!(template_dir = %template_dir.display(), "loaded HTML templates");
        Ok(Self {
            stylesheet,
            index,
            document,
        })
    }
}

/// Renders a record or collection source into an HTML page.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    templates: Option<Templates>,
}

impl HtmlRenderer {
    fn page(&self, templates: &Templates, source: &str) -> Result<String> {
        let (title, author, records): (Option<String>, Option<String>, Vec<Record>) =
            match parse_source(source)? {
                Artifact::Collection(collection) => {
                    let records = collection.sorted_records().into_iter().cloned().collect();
                    (collection.title, collection.author, records)
                }
                Artifact::Record(record) => {
                    (record.title().map(String::from), None, vec![record])
                }
                Artifact::Document(text) => return Ok(text),
            };

        let documents: String = records
            .iter()
            .map(|record| fill(&templates.document, &document_values(record)))
            .collect();

        let values = HashMap::from([
            ("title", escape(title.as_deref().unwrap_or_default()).into_owned()),
            ("author", escape(author.as_deref().unwrap_or_default()).into_owned()),
            ("stylesheet", templates.stylesheet.clone()),
            ("documents", documents),
        ]);
        Ok(fill(&templates.index, &values))
    }
}

impl Renderer for HtmlRenderer {
    fn load(&mut self, stylesheet: &Path, template_dir: &Path) -> Result<()> {
        self.templates = Some(Templates::load(stylesheet, template_dir)?);
        Ok(())
    }

    fn render(&self, source: &str, stylesheet: &Path, template_dir: &Path) -> Result<Artifact> {
        let page = match &self.templates {
            Some(templates) => self.page(templates, source)?,
            None => self.page(&Templates::load(stylesheet, template_dir)?, source)?,
        };
        Ok(Artifact::Document(page))
    }
}

fn document_values(record: &Record) -> HashMap<&'static str, String> {
    let mut values: HashMap<&'static str, String> = record
        .to_mapping()
        .into_iter()
        .map(|(key, value)| (key, escape(&value.to_string()).into_owned()))
        .collect();
    values.insert("identifierCode", escape(&record.identifier_code()).into_owned());
    values
}

fn fill(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_STYLESHEET, DEFAULT_TEMPLATE_DIR};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const COLLECTION: &str = r#"<relaton-collection xmlns="https://open.ribose.com/relaton-xml">
  <title>Standards &amp; Guides</title>
  <contributor><role type="author"/><organization><name>CalConnect</name></organization></contributor>
  <relation type="partOf">
    <bibdata type="standard"><title>Timezone</title><docidentifier>CC 51004</docidentifier></bibdata>
  </relation>
  <relation type="partOf">
    <bibdata type="standard"><title>Calendar</title><docidentifier>CC 18001</docidentifier></bibdata>
  </relation>
</relaton-collection>"#;

    fn custom_templates(dir: &Path) {
        fs::write(dir.join("style.css"), "body { margin: 0; }").unwrap();
        fs::write(
            dir.join(INDEX_TEMPLATE),
            "<h1>{{ title }}</h1><p>{{author}}</p><style>{{ stylesheet }}</style>{{ documents }}{{ missing }}",
        )
        .unwrap();
        fs::write(
            dir.join(DOCUMENT_TEMPLATE),
            "[{{ identifierCode }}|{{ docidentifier }}|{{ dateType }}]",
        )
        .unwrap();
    }

    #[test]
    fn test_fill_placeholders() {
        let values = HashMap::from([("name", "bibdata".to_string())]);
        assert_eq!(fill("a {{ name }} b {{name}} {{ other }}", &values), "a bibdata b bibdata ");
    }

    #[test]
    fn test_document_values_are_escaped() {
        let record = Record::new(bibdata::RecordConfig {
            docidentifier: Some("R&D 'Q' 1".to_string()),
            ..Default::default()
        });
        let values = document_values(&record);

        assert_eq!(values["docidentifier"], "R&amp;D &apos;Q&apos; 1");
        assert_eq!(values["identifierCode"], "r&amp;d-&apos;q&apos;-1");
        assert_eq!(
            fill(r#"<article id="{{ identifierCode }}">"#, &values),
            r#"<article id="r&amp;d-&apos;q&apos;-1">"#
        );
    }

    #[test]
    fn test_render_collection_with_custom_templates() {
        let dir = tempdir().unwrap();
        custom_templates(dir.path());

        let mut renderer = HtmlRenderer::default();
        renderer.load(&dir.path().join("style.css"), dir.path()).unwrap();
        let artifact = renderer.render(COLLECTION, Path::new("unused.css"), Path::new("unused")).unwrap();

        assert_eq!(
            artifact,
            Artifact::Document(
                "<h1>Standards &amp; Guides</h1><p>CalConnect</p><style>body { margin: 0; }</style>\
                 [cc-18001|CC 18001|circulated][cc-51004|CC 51004|circulated]"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_render_without_load_reads_templates() {
        let dir = tempdir().unwrap();
        custom_templates(dir.path());

        let artifact = HtmlRenderer::default()
            .render(
                "<bibdata><title>Solo</title><docidentifier>CC 1</docidentifier></bibdata>",
                &dir.path().join("style.css"),
                dir.path(),
            )
            .unwrap();

        let Artifact::Document(page) = artifact else {
            panic!("expected a document");
        };
        assert!(page.starts_with("<h1>Solo</h1><p></p>"));
        assert!(page.ends_with("[cc-1|CC 1|circulated]"));
    }

    #[test]
    fn test_bundled_templates() {
        let mut renderer = HtmlRenderer::default();
        renderer
            .load(Path::new(DEFAULT_STYLESHEET), Path::new(DEFAULT_TEMPLATE_DIR))
            .unwrap();
        let artifact = renderer
            .render(COLLECTION, Path::new(DEFAULT_STYLESHEET), Path::new(DEFAULT_TEMPLATE_DIR))
            .unwrap();

        let Artifact::Document(page) = artifact else {
            panic!("expected a document");
        };
        assert!(page.contains("Standards &amp; Guides"));
        assert!(page.contains("CC 51004"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_missing_stylesheet() {
        let dir = tempdir().unwrap();
        custom_templates(dir.path());

        let err = HtmlRenderer::default()
            .load(&dir.path().join("absent.css"), dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::RenderDependency { kind: "stylesheet", .. }
        ));
    }

    #[test]
    fn test_missing_index_template() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();

        let err = HtmlRenderer::default()
            .load(&dir.path().join("style.css"), dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::RenderDependency { kind: "template", .. }
        ));
    }

    #[test]
    fn test_bundled_document_template_fallback() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();
        fs::write(dir.path().join(INDEX_TEMPLATE), "{{ documents }}").unwrap();

        let templates = Templates::load(&dir.path().join("style.css"), dir.path()).unwrap();
        assert_eq!(templates.document, BUNDLED_DOCUMENT_TEMPLATE);
    }
}
