//! Default-namespace rewriting of query paths.
//!
//! Bibdata sources come both with and without a default namespace. Unprefixed
//! names in a query only ever match un-namespaced elements, so every path is
//! rewritten to bind its tag names to a prefix that the query evaluator
//! resolves to the document's default namespace.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::DEFAULT_NS_PREFIX;

/// Name directly after a child step: `/tag`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CHILD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([a-zA-Z])").expect("valid regex"));

/// Name directly after an axis separator: `::tag`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static AXIS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::([a-zA-Z])").expect("valid regex"));

/// Comparison predicate: `[tag=` or `[tag =`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PREDICATE_COMPARISON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([a-zA-Z][a-z0-9A-Z@/]* ?=)").expect("valid regex"));

/// Existence predicate: `[tag]`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PREDICATE_EXISTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([a-zA-Z][a-z0-9A-Z@/]*\])").expect("valid regex"));

/// Bind every tag name in `path` to the default namespace prefix.
///
/// # Examples
/// ```
/// use bibdata::xml::ns;
///
/// assert_eq!(ns("./docidentifier"), "./xmlns:docidentifier");
/// assert_eq!(ns("./uri[@type='pdf']"), "./xmlns:uri[@type='pdf']");
/// assert_eq!(ns("./@type"), "./@type");
/// ```
pub fn ns(path: &str) -> String {
    ns_with_prefix(path, DEFAULT_NS_PREFIX)
}

/// Bind every tag name in `path` to `prefix`.
///
/// Pure text rewriting: syntax tokens and anything that doesn't match one of
/// the four name positions pass through unchanged.
///
/// # Arguments
/// * `path` - Query path with unprefixed names
/// * `prefix` - Namespace prefix to bind the names to
///
/// # Returns
/// The rewritten path
///
/// # Examples
/// ```
/// use bibdata::xml::ns_with_prefix;
///
/// assert_eq!(
///     ns_with_prefix("/doc/date[type='published']", "ns"),
///     "/ns:doc/ns:date[ns:type='published']"
/// );
/// ```
pub fn ns_with_prefix(path: &str, prefix: &str) -> String {
    let path = CHILD_NAME.replace_all(path, format!("/{prefix}:${{1}}"));
    let path = AXIS_NAME.replace_all(&path, format!("::{prefix}:${{1}}"));
    let path = PREDICATE_COMPARISON.replace_all(&path, format!("[{prefix}:${{1}}"));
    let path = PREDICATE_EXISTS.replace_all(&path, format!("[{prefix}:${{1}}"));
    path.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_child_steps() {
        assert_eq!(
            ns_with_prefix("/doc/date", "ns"),
            "/ns:doc/ns:date"
        );
    }

    #[test]
    fn test_comparison_predicate() {
        assert_eq!(
            ns_with_prefix("/doc/date[type='published']", "ns"),
            "/ns:doc/ns:date[ns:type='published']"
        );
        assert_eq!(
            ns("./date[type = 'published']"),
            "./xmlns:date[xmlns:type = 'published']"
        );
    }

    #[test]
    fn test_existence_predicate() {
        assert_eq!(ns("./contributor[role]"), "./xmlns:contributor[xmlns:role]");
    }

    #[test]
    fn test_descendant_axis() {
        assert_eq!(ns(".::title"), ".::xmlns:title");
        assert_eq!(
            ns("./descendant::title"),
            "./xmlns:descendant::xmlns:title"
        );
    }

    #[test]
    fn test_attribute_segments_untouched() {
        assert_eq!(ns("./@type"), "./@type");
        assert_eq!(ns("./uri[@type='xml']"), "./xmlns:uri[@type='xml']");
        assert_eq!(ns("./uri[not(@type)]"), "./xmlns:uri[not(@type)]");
        assert_eq!(
            ns("./date[@type = 'published']"),
            "./xmlns:date[@type = 'published']"
        );
    }

    #[test]
    fn test_numeric_predicate_untouched() {
        assert_eq!(ns("./title[1]"), "./xmlns:title[1]");
    }

    #[test]
    fn test_hyphenated_names() {
        assert_eq!(
            ns("./editorialgroup/technical-committee"),
            "./xmlns:editorialgroup/xmlns:technical-committee"
        );
    }

    #[test]
    fn test_malformed_paths_pass_through() {
        assert_eq!(ns(""), "");
        assert_eq!(ns("]]=[["), "]]=[[");
        assert_eq!(ns("///"), "///");
        assert_eq!(ns("/1/2"), "/1/2");
    }

    #[test]
    fn test_deterministic() {
        let path = "./contributor/role[@type='author']";
        assert_eq!(ns(path), ns(path));
    }
}
