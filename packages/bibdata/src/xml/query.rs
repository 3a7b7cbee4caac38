//! Minimal path queries over `roxmltree` documents.
//!
//! Supports the abbreviated location paths used for bibdata extraction:
//!
//! - `.` and `..` steps, `/` child steps, `//` and `descendant::` steps
//! - `@name` attribute steps (last step only)
//! - predicates `[@a]`, `[@a='v']`, `[name]`, `[name='v']`, `[not(...)]`
//!   and a 1-based position `[n]`
//!
//! A name prefix is resolved against the document: the default prefix
//! (`xmlns`) stands for the default namespace of the root element, so a
//! rewritten path (see [`ns`](super::ns)) matches both namespaced and plain
//! documents. Unprefixed names only match elements without a namespace.
//!
//! Paths that can't be parsed select nothing; evaluation never fails.

use std::collections::HashSet;

use roxmltree::{Node, NodeId};

use crate::config::DEFAULT_NS_PREFIX;

/// A node or attribute selected by a query.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a, 'input> {
    /// An element (or the document root).
    Element(Node<'a, 'input>),
    /// An attribute value together with the element carrying it.
    Attribute {
        owner: Node<'a, 'input>,
        value: &'a str,
    },
}

impl<'a, 'input> Selection<'a, 'input> {
    /// The text of the selection, trimmed.
    ///
    /// Elements yield the concatenation of all descendant text nodes.
    pub fn text(&self) -> String {
        match self {
            Self::Element(node) => super::get_text(*node),
            Self::Attribute { value, .. } => value.trim().to_string(),
        }
    }

    /// The element of the selection; the owner element for attributes.
    pub fn node(&self) -> Node<'a, 'input> {
        match self {
            Self::Element(node) | Self::Attribute { owner: node, .. } => *node,
        }
    }

    /// The parent element of the selection.
    pub fn parent(&self) -> Option<Node<'a, 'input>> {
        match self {
            Self::Element(node) => node.parent_element(),
            Self::Attribute { owner, .. } => Some(*owner),
        }
    }

    /// Value of an attribute on the selected element.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        match self {
            Self::Element(node) => node.attribute(name),
            Self::Attribute { .. } => None,
        }
    }
}

/// Select the first match of `path` relative to `node`.
///
/// # Arguments
/// * `node` - Context node the path is evaluated against
/// * `path` - Query path, usually passed through [`ns`](super::ns) first
///
/// # Returns
/// The first element or attribute matched, or `None`
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bibdata::xml::{ns, select_first};
///
/// let xml = r#"<bibdata xmlns="urn:x"><uri type="pdf">a.pdf</uri></bibdata>"#;
/// let doc = Document::parse(xml).unwrap();
/// let uri = select_first(doc.root_element(), &ns("./uri[@type='pdf']"));
/// assert_eq!(uri.map(|s| s.text()), Some("a.pdf".to_string()));
/// ```
pub fn select_first<'a, 'input>(
    node: Node<'a, 'input>,
    path: &str,
) -> Option<Selection<'a, 'input>> {
    select_all(node, path).into_iter().next()
}

/// Select every match of `path` relative to `node`, in document order.
///
/// A path that cannot be parsed matches nothing.
///
/// # Arguments
/// * `node` - Context node the path is evaluated against
/// * `path` - Query path
///
/// # Returns
/// All matches in document order, possibly empty
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bibdata::xml::{ns, select_all};
///
/// let xml = r#"<bibdata><uri>a</uri><uri type="pdf">b</uri></bibdata>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert_eq!(select_all(doc.root_element(), &ns("./uri")).len(), 2);
/// assert!(select_all(doc.root_element(), "./uri[").is_empty());
/// ```
pub fn select_all<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Selection<'a, 'input>> {
    match QueryPath::parse(path) {
        Some(query) => query.evaluate(node),
        None => {
            tracing::debug!(path, "unparsable query path, treating as no match");
            Vec::new()
        }
    }
}

/// Text of the first match of `path`.
///
/// # Arguments
/// * `node` - Context node the path is evaluated against
/// * `path` - Query path
///
/// # Returns
/// The trimmed text of the first match, or `None` when nothing matches
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use bibdata::xml::{ns, select_text};
///
/// let xml = r#"<bibdata type="standard"><title> Calendars </title></bibdata>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert_eq!(select_text(root, &ns("./title")), Some("Calendars".to_string()));
/// assert_eq!(select_text(root, "./@type"), Some("standard".to_string()));
/// assert_eq!(select_text(root, &ns("./edition")), None);
/// ```
pub fn select_text(node: Node<'_, '_>, path: &str) -> Option<String> {
    select_first(node, path).map(|s| s.text())
}

#[derive(Debug, Clone, PartialEq)]
enum Axis {
    Child,
    Descendant,
    SelfNode,
    Parent,
    Attribute,
}

#[derive(Debug, Clone, PartialEq)]
struct QName {
    prefix: Option<String>,
    local: String,
}

#[derive(Debug, Clone, PartialEq)]
enum NameTest {
    Any,
    Name(QName),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Attribute(QName),
    Child(QName),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    Exists(Operand),
    Equals(Operand, String),
    Not(Box<Predicate>),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}

/// A parsed location path.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPath {
    absolute: bool,
    steps: Vec<Step>,
}

impl QueryPath {
    /// Parse a location path; `None` if it is malformed.
    pub fn parse(path: &str) -> Option<Self> {
        Parser::new(path).parse_path()
    }

    /// Evaluate the path against a context node.
    pub fn evaluate<'a, 'input>(&self, context: Node<'a, 'input>) -> Vec<Selection<'a, 'input>> {
        let mut current: Vec<Node<'a, 'input>> = if self.absolute {
            vec![context.document().root()]
        } else {
            vec![context]
        };

        for (index, step) in self.steps.iter().enumerate() {
            if step.axis == Axis::Attribute {
                // Attribute steps can only end a path.
                if index + 1 != self.steps.len() {
                    return Vec::new();
                }
                return current
                    .into_iter()
                    .flat_map(|node| attribute_matches(node, step))
                    .collect();
            }

            let mut seen: HashSet<NodeId> = HashSet::new();
            let mut next = Vec::new();
            for node in current {
                for candidate in step_matches(node, step) {
                    if seen.insert(candidate.id()) {
                        next.push(candidate);
                    }
                }
            }
            current = next;
        }

        current.into_iter().map(Selection::Element).collect()
    }
}

fn step_matches<'a, 'input>(node: Node<'a, 'input>, step: &Step) -> Vec<Node<'a, 'input>> {
    let candidates: Vec<Node<'a, 'input>> = match step.axis {
        Axis::Child => node.children().filter(|n| n.is_element()).collect(),
        Axis::Descendant => node
            .descendants()
            .skip(1)
            .filter(|n| n.is_element())
            .collect(),
        Axis::SelfNode => vec![node],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Attribute => Vec::new(),
    };

    let named: Vec<Node<'a, 'input>> = candidates
        .into_iter()
        .filter(|n| match &step.test {
            NameTest::Any => true,
            NameTest::Name(name) => element_has_name(*n, name),
        })
        .collect();

    apply_predicates(named, &step.predicates)
}

fn apply_predicates<'a, 'input>(
    mut nodes: Vec<Node<'a, 'input>>,
    predicates: &[Predicate],
) -> Vec<Node<'a, 'input>> {
    for predicate in predicates {
        nodes = nodes
            .iter()
            .enumerate()
            .filter(|(position, node)| predicate_holds(**node, *position + 1, predicate))
            .map(|(_, node)| *node)
            .collect();
    }
    nodes
}

fn attribute_matches<'a, 'input>(node: Node<'a, 'input>, step: &Step) -> Vec<Selection<'a, 'input>> {
    if !node.is_element() {
        return Vec::new();
    }
    node.attributes()
        .filter(|attr| match &step.test {
            NameTest::Any => true,
            NameTest::Name(name) => {
                attr.name() == name.local
                    && resolve_prefix(node, name.prefix.as_deref())
                        .is_some_and(|ns| attr.namespace() == ns)
            }
        })
        .map(|attr| Selection::Attribute {
            owner: node,
            value: attr.value(),
        })
        .collect()
}

fn predicate_holds(node: Node<'_, '_>, position: usize, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Position(n) => position == *n,
        Predicate::Exists(operand) => !operand_values(node, operand).is_empty(),
        Predicate::Equals(operand, literal) => operand_values(node, operand)
            .iter()
            .any(|value| value == literal),
        Predicate::Not(inner) => !predicate_holds(node, position, inner),
    }
}

fn operand_values(node: Node<'_, '_>, operand: &Operand) -> Vec<String> {
    match operand {
        Operand::Attribute(name) => {
            let Some(ns) = resolve_prefix(node, name.prefix.as_deref()) else {
                return Vec::new();
            };
            node.attributes()
                .filter(|attr| attr.name() == name.local && attr.namespace() == ns)
                .map(|attr| attr.value().to_string())
                .collect()
        }
        Operand::Child(name) => node
            .children()
            .filter(|child| child.is_element() && element_has_name(*child, name))
            .map(super::get_text)
            .collect(),
    }
}

fn element_has_name(node: Node<'_, '_>, name: &QName) -> bool {
    if !node.is_element() || node.tag_name().name() != name.local {
        return false;
    }
    resolve_prefix(node, name.prefix.as_deref())
        .is_some_and(|ns| node.tag_name().namespace() == ns)
}

/// Resolve a name prefix to a namespace URI.
///
/// `Some(None)` means "no namespace"; `None` means the prefix is unbound and
/// nothing can match.
fn resolve_prefix<'a>(node: Node<'a, '_>, prefix: Option<&str>) -> Option<Option<&'a str>> {
    match prefix {
        None => Some(None),
        Some(DEFAULT_NS_PREFIX) => {
            let root = node.document().root_element();
            Some(root.lookup_namespace_uri(None))
        }
        Some(prefix) => node.lookup_namespace_uri(Some(prefix)).map(Some),
    }
}

struct Parser<'p> {
    input: &'p str,
    pos: usize,
}

impl<'p> Parser<'p> {
    fn new(input: &'p str) -> Self {
        Self {
            input: input.trim(),
            pos: 0,
        }
    }

    fn rest(&self) -> &'p str {
        &self.input[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_path(&mut self) -> Option<QueryPath> {
        if self.input.is_empty() {
            return None;
        }

        let mut steps = Vec::new();
        let mut absolute = false;
        let mut axis = Axis::Child;

        if self.eat("//") {
            absolute = true;
            axis = Axis::Descendant;
        } else if self.eat("/") {
            absolute = true;
            if self.rest().is_empty() {
                return Some(QueryPath { absolute, steps });
            }
        }

        loop {
            steps.push(self.parse_step(axis)?);
            if self.rest().is_empty() {
                break;
            }
            axis = if self.eat("//") {
                Axis::Descendant
            } else if self.eat("/") {
                Axis::Child
            } else {
                return None;
            };
        }

        Some(QueryPath { absolute, steps })
    }

    fn parse_step(&mut self, default_axis: Axis) -> Option<Step> {
        if self.eat("..") {
            return Some(self.finish_step(Axis::Parent, NameTest::Any));
        }
        if self.eat(".") {
            // `.::name` treats the context itself as the axis origin.
            if self.eat("::") {
                let test = self.parse_name_test()?;
                return self.parse_predicates(Step {
                    axis: Axis::Descendant,
                    test,
                    predicates: Vec::new(),
                });
            }
            return Some(self.finish_step(Axis::SelfNode, NameTest::Any));
        }
        if self.eat("@") {
            let test = self.parse_name_test()?;
            return self.parse_predicates(Step {
                axis: Axis::Attribute,
                test,
                predicates: Vec::new(),
            });
        }

        let mut axis = default_axis;
        let mut test = self.parse_name_test()?;

        if self.eat("::") {
            let NameTest::Name(axis_name) = test else {
                return None;
            };
            // Rewritten paths carry a prefix on the axis name too.
            axis = match axis_name.local.as_str() {
                "child" => Axis::Child,
                "descendant" | "descendant-or-self" => Axis::Descendant,
                "self" => Axis::SelfNode,
                "parent" => Axis::Parent,
                "attribute" => Axis::Attribute,
                _ => return None,
            };
            test = self.parse_name_test()?;
        }

        self.parse_predicates(Step {
            axis,
            test,
            predicates: Vec::new(),
        })
    }

    fn finish_step(&self, axis: Axis, test: NameTest) -> Step {
        Step {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    fn parse_predicates(&mut self, mut step: Step) -> Option<Step> {
        while self.eat("[") {
            let end = self.predicate_end()?;
            let body = &self.input[self.pos..end];
            step.predicates.push(parse_predicate(body)?);
            self.pos = end + 1;
        }
        Some(step)
    }

    /// Index of the `]` closing the predicate that starts at `self.pos`.
    fn predicate_end(&self) -> Option<usize> {
        let mut quote: Option<char> = None;
        let mut depth = 0usize;
        for (offset, c) in self.rest().char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => quote = Some(c),
                (None, '[') => depth += 1,
                (None, ']') if depth == 0 => return Some(self.pos + offset),
                (None, ']') => depth -= 1,
                _ => {}
            }
        }
        None
    }

    fn parse_name_test(&mut self) -> Option<NameTest> {
        if self.eat("*") {
            return Some(NameTest::Any);
        }
        let first = self.parse_ncname()?;
        // A single colon separates a prefix; `::` is an axis separator.
        if self.rest().starts_with(':') && !self.rest().starts_with("::") {
            self.pos += 1;
            let local = self.parse_ncname()?;
            return Some(NameTest::Name(QName {
                prefix: Some(first),
                local,
            }));
        }
        Some(NameTest::Name(QName {
            prefix: None,
            local: first,
        }))
    }

    fn parse_ncname(&mut self) -> Option<String> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        Some(rest[..end].to_string())
    }
}

fn parse_predicate(body: &str) -> Option<Predicate> {
    let body = body.trim();

    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        let position: usize = body.parse().ok()?;
        return (position > 0).then_some(Predicate::Position(position));
    }

    if let Some(inner) = body
        .strip_prefix("not(")
        .and_then(|inner| inner.strip_suffix(')'))
    {
        return Some(Predicate::Not(Box::new(parse_predicate(inner)?)));
    }

    if let Some((lhs, rhs)) = body.split_once('=') {
        let operand = parse_operand(lhs.trim())?;
        let literal = parse_literal(rhs.trim())?;
        return Some(Predicate::Equals(operand, literal));
    }

    Some(Predicate::Exists(parse_operand(body)?))
}

fn parse_operand(text: &str) -> Option<Operand> {
    let (is_attribute, name) = match text.strip_prefix('@') {
        Some(name) => (true, name),
        None => (false, text),
    };

    let mut parser = Parser::new(name);
    let NameTest::Name(qname) = parser.parse_name_test()? else {
        return None;
    };
    if !parser.rest().is_empty() {
        return None;
    }

    Some(if is_attribute {
        Operand::Attribute(qname)
    } else {
        Operand::Child(qname)
    })
}

fn parse_literal(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    (!inner.contains(quote)).then(|| inner.to_string())
}
