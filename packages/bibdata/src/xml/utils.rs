//! Helpers for navigating `roxmltree` nodes.

use roxmltree::Node;

/// Get the tag name without namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bibdata::xml::get_tag_name;
///
/// let xml = r#"<relaton-collection xmlns="https://open.ribose.com/relaton-xml"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "relaton-collection");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get the text content of a node and all its descendants, trimmed.
///
/// # Arguments
/// * `node` - Node to collect text from
///
/// # Returns
/// Concatenated descendant text, or an empty string for nodes without text
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bibdata::xml::get_text;
///
/// let xml = "<date type=\"published\">\n  <on>2021-06-01</on>\n</date>";
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_text(doc.root_element()), "2021-06-01");
/// ```
pub fn get_text(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}

/// Get all element children of a node.
///
/// Excludes text nodes, comments and processing instructions.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the first element child of a node.
///
/// # Arguments
/// * `node` - Parent node
///
/// # Returns
/// The first child that is an element, skipping text and comments
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bibdata::xml::{first_element_child, get_tag_name};
///
/// let xml = "<relation type=\"partOf\">\n  <!-- member --><bibdata/></relation>";
/// let doc = Document::parse(xml).unwrap();
/// let member = first_element_child(doc.root_element());
/// assert_eq!(member.map(get_tag_name), Some("bibdata"));
/// ```
pub fn first_element_child<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    element_children(node).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:bibdata xmlns:ns="http://example.com"><ns:title/></ns:bibdata>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "bibdata");
    }

    #[test]
    fn test_get_text_concatenates_descendants() {
        let xml = "<date type=\"published\">\n  <on>2021-06-01</on>\n</date>";
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "2021-06-01");
    }

    #[test]
    fn test_get_text_empty_element() {
        let doc = Document::parse("<role type=\"author\"/>").unwrap();
        assert_eq!(get_text(doc.root_element()), "");
    }

    #[test]
    fn test_element_children() {
        let xml = "<relation>text<bibdata/><!-- note --><bibdata/></relation>";
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(element_children(root).count(), 2);
        assert_eq!(
            first_element_child(root).map(get_tag_name),
            Some("bibdata")
        );
    }
}
