// crates/pipeline-gate-core/src/document/xml.rs
// ============================================================================
// Module: XML Document Backing
// Description: Owned XML element tree with XPath 1.0 subset resolution.
// Purpose: Provide ordered, non-failing node resolution for the XML format.
// Dependencies: roxmltree
// ============================================================================

//! ## Overview
//! The XML backing parses bodies with `roxmltree` and converts them into an
//! owned element tree so a [`crate::document::ResponseDocument`] carries no
//! borrowed lifetimes. Path resolution supports the XPath 1.0 element and
//! attribute addressing subset used by gate expressions: absolute `/` steps,
//! `//` descendant steps, element name or `*` tests, 1-based `[n]` index
//! predicates, and a terminal `@attr` or `text()` selection.
//!
//! Path text is parsed eagerly at configuration time; at evaluation time an
//! unmatched path resolves to an empty node list, never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::DocumentError;
use crate::document::DocumentFormat;
use crate::document::ResolvedNode;

// ============================================================================
// SECTION: Element Tree
// ============================================================================

/// One XML attribute, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name as written, including any prefix.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

/// Owned XML element subtree.
///
/// # Invariants
/// - `children` holds element children only; `text` holds the concatenated
///   direct text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name as written, including any prefix.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<XmlAttribute>,
    /// Element children in document order.
    pub children: Vec<XmlElement>,
    /// Concatenated direct text content.
    pub text: String,
}

impl XmlElement {
    /// Returns the value of the named attribute when present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|attr| attr.name == name).map(|attr| attr.value.as_str())
    }

    /// Returns the XPath string value: the element's text content followed by
    /// the string values of its children, in document order.
    #[must_use]
    pub fn string_value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Appends the subtree's text content to `out`.
    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses an XML body into an owned element tree.
///
/// # Errors
///
/// Returns [`DocumentError::Malformed`] when the body is not well-formed XML.
pub fn parse(body: &str) -> Result<XmlElement, DocumentError> {
    let document = roxmltree::Document::parse(body).map_err(|err| DocumentError::Malformed {
        format: DocumentFormat::Xml,
        detail: err.to_string(),
    })?;
    Ok(convert(document.root_element()))
}

/// Converts a borrowed `roxmltree` node into an owned element.
fn convert(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let mut text = String::new();
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }
    XmlElement {
        name: qualified_name(node),
        attributes: node
            .attributes()
            .map(|attr| XmlAttribute {
                name: attr.name().to_string(),
                value: attr.value().to_string(),
            })
            .collect(),
        children,
        text,
    }
}

/// Returns the element name as written in the source.
fn qualified_name(node: roxmltree::Node<'_, '_>) -> String {
    node.tag_name().name().to_string()
}

// ============================================================================
// SECTION: Path Model
// ============================================================================

/// Step axis within a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Direct children (`/`).
    Child,
    /// Any descendant (`//`).
    Descendant,
}

/// Element name test within a step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    /// Match a specific element name.
    Name(String),
    /// Match any element (`*`).
    Any,
}

/// One element-selecting step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ElementStep {
    /// Axis connecting this step to its context.
    axis: Axis,
    /// Element name test.
    name: NameTest,
    /// Optional 1-based index predicate, applied per context.
    index: Option<usize>,
}

/// Terminal value selection applied to the final element set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LeafStep {
    /// Select the named attribute (`@attr`).
    Attribute(String),
    /// Select the direct text content (`text()`).
    Text,
}

/// Parsed path within the supported XPath subset.
#[derive(Debug, Clone, PartialEq, Eq)]
struct XmlPath {
    /// Element-selecting steps in order.
    steps: Vec<ElementStep>,
    /// Optional terminal value selection.
    leaf: Option<LeafStep>,
}

// ============================================================================
// SECTION: Path Parsing
// ============================================================================

/// Validates path text against the supported XPath subset.
///
/// # Errors
///
/// Returns [`DocumentError::InvalidPath`] when the text falls outside the
/// subset.
pub fn validate_path(path: &str) -> Result<(), DocumentError> {
    parse_path(path).map(|_| ())
}

/// Parses path text into the subset path model.
fn parse_path(path: &str) -> Result<XmlPath, DocumentError> {
    let reject = |detail: &str| DocumentError::InvalidPath {
        format: DocumentFormat::Xml,
        path: path.to_string(),
        detail: detail.to_string(),
    };

    let trimmed = path.trim();
    if !trimmed.starts_with('/') {
        return Err(reject("path must be absolute"));
    }

    let mut steps = Vec::new();
    let mut leaf = None;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let axis = if let Some(tail) = rest.strip_prefix("//") {
            rest = tail;
            Axis::Descendant
        } else if let Some(tail) = rest.strip_prefix('/') {
            rest = tail;
            Axis::Child
        } else {
            return Err(reject("expected `/` between steps"));
        };

        let end = rest.find('/').unwrap_or(rest.len());
        let segment = &rest[.. end];
        rest = &rest[end ..];

        if segment.is_empty() {
            return Err(reject("empty step"));
        }

        if let Some(attr) = segment.strip_prefix('@') {
            if axis == Axis::Descendant {
                return Err(reject("attribute selection requires a `/` separator"));
            }
            if !rest.is_empty() {
                return Err(reject("attribute selection must be the final step"));
            }
            if attr.is_empty() || !is_name(attr) {
                return Err(reject("invalid attribute name"));
            }
            leaf = Some(LeafStep::Attribute(attr.to_string()));
            break;
        }

        if segment == "text()" {
            if axis == Axis::Descendant {
                return Err(reject("text selection requires a `/` separator"));
            }
            if !rest.is_empty() {
                return Err(reject("text selection must be the final step"));
            }
            leaf = Some(LeafStep::Text);
            break;
        }

        let (name_part, index) = split_index(segment).ok_or_else(|| reject("invalid predicate"))?;
        let name = if name_part == "*" {
            NameTest::Any
        } else if is_name(name_part) {
            NameTest::Name(name_part.to_string())
        } else {
            return Err(reject("invalid element name"));
        };
        steps.push(ElementStep {
            axis,
            name,
            index,
        });
    }

    if steps.is_empty() {
        return Err(reject("path selects no element"));
    }
    Ok(XmlPath {
        steps,
        leaf,
    })
}

/// Splits an optional trailing `[n]` predicate off a step segment.
fn split_index(segment: &str) -> Option<(&str, Option<usize>)> {
    match segment.find('[') {
        None => Some((segment, None)),
        Some(open) => {
            let inner = segment[open ..].strip_prefix('[')?.strip_suffix(']')?;
            let index: usize = inner.parse().ok()?;
            if index == 0 {
                return None;
            }
            Some((&segment[.. open], Some(index)))
        }
    }
}

/// Returns true when the text is a plausible XML name.
fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':'))
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves a subset path against the root element, in document order.
///
/// Paths were validated at configuration time; text that fails to parse here
/// resolves to an empty list, matching the "not found" policy.
#[must_use]
pub fn resolve(root: &XmlElement, raw_path: &str) -> Vec<ResolvedNode> {
    let Ok(path) = parse_path(raw_path) else {
        return Vec::new();
    };

    let mut current: Vec<&XmlElement> = Vec::new();
    for (position, step) in path.steps.iter().enumerate() {
        let pools: Vec<Vec<&XmlElement>> = if position == 0 {
            match step.axis {
                Axis::Child => vec![vec![root]],
                Axis::Descendant => vec![subtree(root)],
            }
        } else {
            current
                .iter()
                .map(|context| match step.axis {
                    Axis::Child => context.children.iter().collect(),
                    Axis::Descendant => descendants(context),
                })
                .collect()
        };

        let mut next = Vec::new();
        for pool in pools {
            let matched: Vec<&XmlElement> = pool
                .into_iter()
                .filter(|element| match &step.name {
                    NameTest::Name(name) => element.name == *name,
                    NameTest::Any => true,
                })
                .collect();
            match step.index {
                Some(index) => {
                    if let Some(element) = matched.get(index - 1) {
                        next.push(*element);
                    }
                }
                None => next.extend(matched),
            }
        }
        current = next;
        if current.is_empty() {
            return Vec::new();
        }
    }

    match &path.leaf {
        None => current.into_iter().cloned().map(ResolvedNode::XmlElement).collect(),
        Some(LeafStep::Attribute(name)) => current
            .into_iter()
            .filter_map(|element| element.attribute(name))
            .map(|value| ResolvedNode::XmlText(value.to_string()))
            .collect(),
        Some(LeafStep::Text) => current
            .into_iter()
            .filter(|element| !element.text.is_empty())
            .map(|element| ResolvedNode::XmlText(element.text.clone()))
            .collect(),
    }
}

/// Returns the element and all its descendants, in document order.
fn subtree(root: &XmlElement) -> Vec<&XmlElement> {
    let mut out = vec![root];
    out.extend(descendants(root));
    out
}

/// Returns all descendants of an element, in document order.
fn descendants(root: &XmlElement) -> Vec<&XmlElement> {
    let mut out = Vec::new();
    for child in &root.children {
        out.push(child);
        out.extend(descendants(child));
    }
    out
}
